use regex::{Captures, NoExpand, Regex};

use super::{RewriteContext, RewriteStage, replace_all_owned};
use crate::{Result, codec::PayloadCodec, rewrite::render::escape_attr};

/// Unwraps anchors that bounce through the redirector.
///
/// `<a href="https://redirector/go/?url=<encoded>">` becomes
/// `<a href="<decoded target>">`, with upstream references in the decoded
/// target pointed at the serving origin. Links that fail to decode stay as-is.
pub struct IndirectLinkStage {
    link: Regex,
}

impl IndirectLinkStage {
    pub fn new(redirector_host: &str) -> Result<Self> {
        let host = regex::escape(redirector_host.trim());
        let target = format!(r#"https?://{}/[^"']+\?url="#, host);
        let pattern = format!(
            r#"(?i)<a\s+([^>]*?)href=(?:"{target}([^"']+)"|'{target}([^"']+)')([^>]*)>"#,
            target = target
        );

        Ok(Self {
            link: Regex::new(&pattern)?,
        })
    }

    fn decode_target(encoded: &str, upstream: &Regex, context: &RewriteContext) -> Option<String> {
        let unquoted = urlencoding::decode(encoded).ok()?;
        let decoded = match PayloadCodec::decode(&unquoted) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(stage = "indirect-link", "Leaving undecodable link: {}", e);
                return None;
            }
        };

        Some(
            upstream
                .replace_all(&decoded, NoExpand(&context.serving_origin))
                .into_owned(),
        )
    }
}

impl RewriteStage for IndirectLinkStage {
    fn name(&self) -> &'static str {
        "indirect-link"
    }

    fn apply(&self, body: String, context: &RewriteContext) -> String {
        if !self.link.is_match(&body) {
            return body;
        }

        let upstream = match Regex::new(&format!(
            r"(?i)https?://(?:www\.)?{}",
            regex::escape(&context.target_host)
        )) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(stage = self.name(), "Skipping indirect links: {}", e);
                return body;
            }
        };

        replace_all_owned(&self.link, body, |caps: &Captures| {
            let encoded = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();

            match Self::decode_target(encoded, &upstream, context) {
                Some(target) => format!(
                    r#"<a {}href="{}"{}>"#,
                    &caps[1],
                    escape_attr(&target),
                    caps.get(4).map(|m| m.as_str()).unwrap_or_default()
                ),
                None => caps[0].to_string(),
            }
        })
    }
}
