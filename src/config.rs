//! Process-wide mirror settings.
//!
//! Everything that the rewriting core treats as a constant lives here and is
//! read once at startup. Values come from environment variables; unset
//! variables fall back to the production deployment's values.

use std::time::Duration;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_TARGET_ORIGIN: &str = "https://gesseh.net";
pub const DEFAULT_REDIRECTOR_HOST: &str = "arbandroid.com";
pub const DEFAULT_FALLBACK_HOST: &str = "your-domain.com";

pub const DEFAULT_ROBOTS_TAG: &str = "<meta name='robots' content='index, follow, max-image-preview:large, max-snippet:-1, max-video-preview:-1' />";
pub const DEFAULT_VERIFICATION_TAG: &str = "<meta name='google-site-verification' content='HWrhtgkCPV2OT-OWRzV60Vdl1pWxt35-aEZ7NNDTHWs' />";

pub const DEFAULT_BANNER_HTML: &str = r#"
<div style="width:100%;background:#ff004c;color:#fff;padding:15px;text-align:center;font-size:20px;font-weight:bold;direction:rtl;">
  <a href="https://z.3isk.news/all-turkish-series-esheeq/" style="color:#fff;text-decoration:none;">مسلسلات تركية مترجمة</a>
</div>
"#;

pub const DEFAULT_HOME_ANCHOR: &str = r#"<a title="الرئيسية" href="/">الرئيسية</a>"#;
pub const DEFAULT_HOME_REPLACEMENT: &str =
    r#"<a title="قصة عشق الاصلي" href="https://z.3isk.news/video/">قصة عشق الاصلي</a>"#;

const ESTREAM_PLAIN: &str = "https://arabveturk.com/{id}.html";
const ESTREAM_EMBED: &str = "https://arabveturk.com/embed-{id}.html";

/// Template for "estream" servers.
///
/// Deployments disagreed on the path shape, so both are kept selectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EstreamTemplate {
    /// `https://arabveturk.com/{id}.html`
    #[default]
    Plain,
    /// `https://arabveturk.com/embed-{id}.html`
    Embed,
    Custom(String),
}

impl EstreamTemplate {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "plain" => Ok(Self::Plain),
            "embed" => Ok(Self::Embed),
            other if other.contains("{id}") => Ok(Self::Custom(other.to_string())),
            other => Err(Error::InvalidConfig(format!(
                "estream template must be 'plain', 'embed' or contain {{id}}: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => ESTREAM_PLAIN,
            Self::Embed => ESTREAM_EMBED,
            Self::Custom(t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub listen_host: String,
    pub listen_port: u16,

    /// Origin whose pages are mirrored.
    pub target_origin: Url,

    /// Host of the link-shortener whose `?url=` targets get unwrapped.
    pub redirector_host: String,

    pub estream_template: EstreamTemplate,

    /// Scheme used when building the serving origin from the Host header.
    pub serving_scheme: String,

    /// Used when a request arrives without a Host header.
    pub fallback_host: String,

    pub robots_tag: String,
    pub verification_tag: String,
    pub banner_html: String,
    pub home_anchor: String,
    pub home_replacement: String,

    pub cache_control: Option<String>,
    pub upstream_timeout: Duration,
    pub cors_allowed_origin: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: 8080,
            target_origin: Url::parse(DEFAULT_TARGET_ORIGIN)
                .expect("default origin is a valid URL"),
            redirector_host: DEFAULT_REDIRECTOR_HOST.to_string(),
            estream_template: EstreamTemplate::default(),
            serving_scheme: "https".to_string(),
            fallback_host: DEFAULT_FALLBACK_HOST.to_string(),
            robots_tag: DEFAULT_ROBOTS_TAG.to_string(),
            verification_tag: DEFAULT_VERIFICATION_TAG.to_string(),
            banner_html: DEFAULT_BANNER_HTML.to_string(),
            home_anchor: DEFAULT_HOME_ANCHOR.to_string(),
            home_replacement: DEFAULT_HOME_REPLACEMENT.to_string(),
            cache_control: None,
            upstream_timeout: Duration::from_secs(30),
            cors_allowed_origin: "*".to_string(),
        }
    }
}

impl MirrorConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.listen_host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.listen_port = port
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("PORT is not a port number: {}", port)))?;
        }
        if let Some(origin) = lookup("MIRROR_TARGET_ORIGIN") {
            config.target_origin = Url::parse(&origin)?;
        }
        if let Some(host) = lookup("MIRROR_REDIRECTOR_HOST") {
            config.redirector_host = host;
        }
        if let Some(template) = lookup("MIRROR_ESTREAM_TEMPLATE") {
            config.estream_template = EstreamTemplate::parse(&template)?;
        }
        if let Some(scheme) = lookup("MIRROR_SERVING_SCHEME") {
            config.serving_scheme = scheme;
        }
        if let Some(host) = lookup("MIRROR_FALLBACK_HOST") {
            config.fallback_host = host;
        }
        if let Some(tag) = lookup("MIRROR_ROBOTS_TAG") {
            config.robots_tag = tag;
        }
        if let Some(tag) = lookup("MIRROR_VERIFICATION_TAG") {
            config.verification_tag = tag;
        }
        if let Some(html) = lookup("MIRROR_BANNER_HTML") {
            config.banner_html = html;
        }
        if let Some(anchor) = lookup("MIRROR_HOME_ANCHOR") {
            config.home_anchor = anchor;
        }
        if let Some(anchor) = lookup("MIRROR_HOME_REPLACEMENT") {
            config.home_replacement = anchor;
        }
        config.cache_control = lookup("MIRROR_CACHE_CONTROL").filter(|v| !v.is_empty());
        if let Some(secs) = lookup("MIRROR_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::InvalidConfig(format!("upstream timeout is not a number: {}", secs))
            })?;
            config.upstream_timeout = Duration::from_secs(secs);
        }
        if let Some(origin) = lookup("CORS_ALLOWED_ORIGIN") {
            config.cors_allowed_origin = origin;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_origin.host_str().is_none() {
            return Err(Error::InvalidConfig(format!(
                "target origin has no host: {}",
                self.target_origin
            )));
        }
        if self.redirector_host.trim().is_empty() {
            return Err(Error::InvalidConfig("redirector host is empty".to_string()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Host (with a non-default port) of the target origin, as it appears in markup.
    pub fn target_host(&self) -> String {
        let host = self.target_origin.host_str().unwrap_or_default();
        match self.target_origin.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Target origin without a trailing slash, e.g. `https://gesseh.net`.
    pub fn target_base(&self) -> String {
        self.target_origin.as_str().trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.target_host(), "gesseh.net");
        assert_eq!(config.target_base(), "https://gesseh.net");
        assert_eq!(config.estream_template, EstreamTemplate::Plain);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert!(config.cache_control.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = MirrorConfig::from_lookup(lookup_from(&[
            ("MIRROR_TARGET_ORIGIN", "http://127.0.0.1:9000"),
            ("MIRROR_ESTREAM_TEMPLATE", "embed"),
            ("MIRROR_CACHE_CONTROL", "public, max-age=300"),
            ("MIRROR_UPSTREAM_TIMEOUT_SECS", "5"),
            ("PORT", "3000"),
        ]))
        .unwrap();

        assert_eq!(config.target_host(), "127.0.0.1:9000");
        assert_eq!(config.target_base(), "http://127.0.0.1:9000");
        assert_eq!(
            config.estream_template.as_str(),
            "https://arabveturk.com/embed-{id}.html"
        );
        assert_eq!(config.cache_control.as_deref(), Some("public, max-age=300"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.listen_port, 3000);
    }

    #[test]
    fn test_custom_estream_template() {
        let template = EstreamTemplate::parse("https://mirror.example/e/{id}").unwrap();
        assert_eq!(template.as_str(), "https://mirror.example/e/{id}");

        assert!(EstreamTemplate::parse("https://mirror.example/e/").is_err());
    }

    #[test]
    fn test_invalid_values_fail() {
        let bad_origin = lookup_from(&[("MIRROR_TARGET_ORIGIN", "not a url")]);
        assert!(MirrorConfig::from_lookup(bad_origin).is_err());
        let bad_timeout = lookup_from(&[("MIRROR_UPSTREAM_TIMEOUT_SECS", "soon")]);
        assert!(MirrorConfig::from_lookup(bad_timeout).is_err());
        assert!(MirrorConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
    }
}
