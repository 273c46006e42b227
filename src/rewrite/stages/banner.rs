use super::{RewriteContext, RewriteStage};

/// Prepends the promotional banner.
pub struct BannerStage {
    html: String,
}

impl BannerStage {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
        }
    }
}

impl RewriteStage for BannerStage {
    fn name(&self) -> &'static str {
        "banner"
    }

    fn apply(&self, body: String, _context: &RewriteContext) -> String {
        if self.html.is_empty() {
            return body;
        }
        format!("{}\n{}", self.html, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BANNER_HTML;

    #[test]
    fn test_prepends_banner() {
        let ctx = RewriteContext::new("gesseh.net", "https://m.example", "");
        let out = BannerStage::new(DEFAULT_BANNER_HTML).apply("<html></html>".to_string(), &ctx);

        assert_eq!(out, format!("{}\n<html></html>", DEFAULT_BANNER_HTML));
        assert!(out.contains("https://z.3isk.news/all-turkish-series-esheeq/"));
    }
}
