use crate::config::MirrorConfig;

/// Per-request values the rewrite stages work against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteContext {
    /// Upstream host as it appears in markup, e.g. `gesseh.net`.
    pub target_host: String,

    /// Origin the client talks to, e.g. `https://mirror.example`.
    pub serving_origin: String,

    /// Serving origin + original path + query.
    pub canonical_url: String,
}

impl RewriteContext {
    pub fn new(
        target_host: impl Into<String>,
        serving_origin: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self {
            target_host: target_host.into(),
            serving_origin: serving_origin.into(),
            canonical_url: canonical_url.into(),
        }
    }

    /// Build the context for an inbound request.
    pub fn for_request(
        config: &MirrorConfig,
        host: Option<&str>,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let host = host
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(&config.fallback_host);
        let serving_origin = format!("{}://{}", config.serving_scheme, host);
        let canonical_url = format!("{}{}{}", serving_origin, path, query_suffix(query));

        Self::new(config.target_host(), serving_origin, canonical_url)
    }
}

/// `?query` for a non-empty query, otherwise nothing.
pub fn query_suffix(query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("?{}", q),
        _ => String::new(),
    }
}
