use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{RewriteContext, RewriteStage, replace_all_owned};

// `//host/…` references are protocol-relative and belong to other hosts.
static ROOT_RELATIVE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(src|href)=["']/([^"'/][^"']*)["']"#)
        .expect("root-relative attribute pattern is valid")
});

/// Turns `src="/x"` and `href="/x"` into absolute serving-origin URLs.
pub struct RootRelativeStage;

impl RewriteStage for RootRelativeStage {
    fn name(&self) -> &'static str {
        "root-relative"
    }

    fn apply(&self, body: String, context: &RewriteContext) -> String {
        replace_all_owned(&ROOT_RELATIVE_ATTR, body, |caps: &Captures| {
            format!(r#"{}="{}/{}""#, &caps[1], context.serving_origin, &caps[2])
        })
    }
}
