use crate::{Result, config::MirrorConfig, proxy::ProxyClient, rewrite::ContentPipeline};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub client: ProxyClient,
    pub pipeline: Arc<ContentPipeline>,
    pub config: Arc<MirrorConfig>,
}

impl AppState {
    pub fn new(config: MirrorConfig) -> Result<Self> {
        Ok(Self {
            client: ProxyClient::new(config.upstream_timeout)?,
            pipeline: Arc::new(ContentPipeline::from_config(&config)?),
            config: Arc::new(config),
        })
    }
}
