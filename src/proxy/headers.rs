use reqwest::{
    RequestBuilder,
    header::{REFERER, USER_AGENT},
};

use crate::config::MirrorConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Headers sent with every upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamHeaders {
    pub referer: String,
    pub user_agent: String,
}

impl UpstreamHeaders {
    /// The upstream sees itself as referer and the client's own user agent.
    pub fn for_request(config: &MirrorConfig, user_agent: Option<&str>) -> Self {
        Self {
            referer: config.target_base(),
            user_agent: user_agent
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(DEFAULT_USER_AGENT)
                .to_string(),
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(REFERER, self.referer.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_client_user_agent() {
        let headers =
            UpstreamHeaders::for_request(&MirrorConfig::default(), Some("Googlebot/2.1"));

        assert_eq!(headers.referer, "https://gesseh.net");
        assert_eq!(headers.user_agent, "Googlebot/2.1");
    }

    #[test]
    fn test_default_user_agent() {
        let config = MirrorConfig::default();

        assert_eq!(
            UpstreamHeaders::for_request(&config, None).user_agent,
            DEFAULT_USER_AGENT
        );
        assert_eq!(
            UpstreamHeaders::for_request(&config, Some("  ")).user_agent,
            DEFAULT_USER_AGENT
        );
    }
}
