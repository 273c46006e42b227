use regex::{NoExpand, Regex};

use super::{RewriteContext, RewriteStage, replace_all_owned};
use crate::Result;

/// Swaps the site's "home" anchor for a fixed link to an external hub page.
pub struct HomeAnchorStage {
    anchor: Option<Regex>,
    replacement: String,
}

impl HomeAnchorStage {
    /// `anchor` is matched case-insensitively, with any run of whitespace
    /// standing in for each space.
    pub fn new(anchor: &str, replacement: &str) -> Result<Self> {
        let anchor = anchor.trim();
        let anchor = if anchor.is_empty() {
            None
        } else {
            let pattern = regex::escape(anchor).replace(' ', r"\s+");
            Some(Regex::new(&format!("(?i){}", pattern))?)
        };

        Ok(Self {
            anchor,
            replacement: replacement.to_string(),
        })
    }
}

impl RewriteStage for HomeAnchorStage {
    fn name(&self) -> &'static str {
        "home-anchor"
    }

    fn apply(&self, body: String, _context: &RewriteContext) -> String {
        match &self.anchor {
            Some(anchor) => replace_all_owned(anchor, body, NoExpand(&self.replacement)),
            None => body,
        }
    }
}
