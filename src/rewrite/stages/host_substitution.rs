use regex::{NoExpand, Regex};

use super::{ContentKind, RewriteContext, RewriteStage, replace_all_owned};

/// Points absolute and protocol-relative upstream references at the serving origin.
pub struct HostSubstitutionStage;

impl HostSubstitutionStage {
    fn patterns(target_host: &str) -> Result<(Regex, Regex), regex::Error> {
        let host = regex::escape(target_host);
        Ok((
            Regex::new(&format!(r"(?i)https?://{}", host))?,
            Regex::new(&format!(r"(?i)//{}", host))?,
        ))
    }
}

impl RewriteStage for HostSubstitutionStage {
    fn name(&self) -> &'static str {
        "host-substitution"
    }

    fn applies_to(&self, kind: ContentKind) -> bool {
        kind.is_text()
    }

    fn apply(&self, body: String, context: &RewriteContext) -> String {
        if context.target_host.is_empty() {
            return body;
        }

        let (absolute, protocol_relative) = match Self::patterns(&context.target_host) {
            Ok(patterns) => patterns,
            Err(e) => {
                tracing::warn!(stage = self.name(), "Cannot build host pattern: {}", e);
                return body;
            }
        };

        let origin = context.serving_origin.as_str();
        let body = replace_all_owned(&absolute, body, NoExpand(origin));
        replace_all_owned(&protocol_relative, body, NoExpand(origin))
    }
}
