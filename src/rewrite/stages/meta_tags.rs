use regex::Regex;
use std::sync::LazyLock;

use super::{RewriteContext, RewriteStage, replace_all_owned};
use crate::rewrite::render::escape_attr;

static ROBOTS_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=['"]robots['"][^>]*>"#).expect("robots pattern is valid")
});

static VERIFICATION_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=['"]google-site-verification['"][^>]*>"#)
        .expect("verification pattern is valid")
});

static CANONICAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel=['"]canonical['"][^>]*>"#).expect("canonical pattern is valid")
});

static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("head pattern is valid")
});

/// Drops upstream SEO tags and injects the mirror's own after `<head>`.
pub struct MetaTagStage {
    robots_tag: String,
    verification_tag: String,
}

impl MetaTagStage {
    pub fn new(robots_tag: &str, verification_tag: &str) -> Self {
        Self {
            robots_tag: robots_tag.to_string(),
            verification_tag: verification_tag.to_string(),
        }
    }

    pub fn strip(body: String) -> String {
        let body = replace_all_owned(&ROBOTS_META, body, "");
        let body = replace_all_owned(&VERIFICATION_META, body, "");
        replace_all_owned(&CANONICAL_LINK, body, "")
    }

    fn inject(&self, body: String, canonical_url: &str) -> String {
        let Some(head) = HEAD_OPEN.find(&body) else {
            tracing::debug!(stage = self.name(), "No <head> tag, skipping meta injection");
            return body;
        };

        let tags = format!(
            "\n{}\n{}\n<link rel=\"canonical\" href=\"{}\" />",
            self.robots_tag,
            self.verification_tag,
            escape_attr(canonical_url)
        );

        let mut output = String::with_capacity(body.len() + tags.len());
        output.push_str(&body[..head.end()]);
        output.push_str(&tags);
        output.push_str(&body[head.end()..]);
        output
    }
}

impl RewriteStage for MetaTagStage {
    fn name(&self) -> &'static str {
        "meta-tags"
    }

    fn apply(&self, body: String, context: &RewriteContext) -> String {
        self.inject(Self::strip(body), &context.canonical_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ROBOTS_TAG, DEFAULT_VERIFICATION_TAG};

    fn stage() -> MetaTagStage {
        MetaTagStage::new(DEFAULT_ROBOTS_TAG, DEFAULT_VERIFICATION_TAG)
    }

    fn context() -> RewriteContext {
        RewriteContext::new(
            "gesseh.net",
            "https://mirror.example",
            "https://mirror.example/series/a/?p=2",
        )
    }

    fn count(body: &str) -> (usize, usize, usize) {
        (
            ROBOTS_META.find_iter(body).count(),
            VERIFICATION_META.find_iter(body).count(),
            CANONICAL_LINK.find_iter(body).count(),
        )
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html><HEAD>
<meta name="robots" content="noindex, nofollow">
<meta content="abc" name='google-site-verification'/>
<link rel='canonical' href='https://gesseh.net/series/a/' />
<title>x</title>
</head><body></body></html>"#;

    #[test]
    fn test_replaces_seo_tags() {
        let out = stage().apply(PAGE.to_string(), &context());

        assert_eq!(count(&out), (1, 1, 1));
        assert!(!out.contains("noindex"));
        assert!(!out.contains("gesseh.net"));
        assert!(out.contains(&format!(
            "<HEAD>\n{}\n{}\n<link rel=\"canonical\" href=\"https://mirror.example/series/a/?p=2\" />",
            DEFAULT_ROBOTS_TAG, DEFAULT_VERIFICATION_TAG
        )));
    }

    #[test]
    fn test_is_idempotent_in_tag_counts() {
        let once = stage().apply(PAGE.to_string(), &context());
        let twice = stage().apply(once.clone(), &context());

        assert_eq!(count(&once), (1, 1, 1));
        assert_eq!(count(&twice), (1, 1, 1));
    }

    #[test]
    fn test_without_head_only_strips() {
        let body = r#"<meta name="robots" content="noindex"><p>fragment</p>"#;
        let out = stage().apply(body.to_string(), &context());

        assert_eq!(out, "<p>fragment</p>");
    }

    #[test]
    fn test_head_with_attributes_but_not_header() {
        let body = r#"<header>x</header><head lang="ar"><title>t</title></head>"#;
        let out = stage().apply(body.to_string(), &context());

        assert!(out.starts_with("<header>x</header><head lang=\"ar\">\n<meta name='robots'"));
        assert_eq!(count(&out), (1, 1, 1));
    }
}
