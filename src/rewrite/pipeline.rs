use bytes::Bytes;

use super::{
    classifier::ContentKind,
    context::RewriteContext,
    stages::{RewriteStage, default_stages},
};
use crate::{Result, config::MirrorConfig};

/// Runs the rewrite stages over one response body.
pub struct ContentPipeline {
    stages: Vec<Box<dyn RewriteStage>>,
}

impl ContentPipeline {
    pub fn new(stages: Vec<Box<dyn RewriteStage>>) -> Self {
        Self { stages }
    }

    /// Pipeline with the standard stage order for this deployment.
    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        Ok(Self::new(default_stages(config)?))
    }

    /// Rewrite an HTML page.
    pub fn rewrite(&self, body: &str, context: &RewriteContext) -> String {
        self.run(ContentKind::Html, body.to_string(), context)
    }

    /// Rewrite an XML, RSS or plain-text body.
    pub fn rewrite_textual(&self, body: &str, context: &RewriteContext) -> String {
        self.run(ContentKind::Textual, body.to_string(), context)
    }

    /// Process raw upstream bytes according to their content kind.
    ///
    /// Binary content is returned untouched; text is decoded lossily.
    pub fn process(&self, kind: ContentKind, body: Bytes, context: &RewriteContext) -> Bytes {
        if !kind.is_text() {
            return body;
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        Bytes::from(self.run(kind, text, context))
    }

    fn run(&self, kind: ContentKind, body: String, context: &RewriteContext) -> String {
        self.stages
            .iter()
            .filter(|stage| stage.applies_to(kind))
            .fold(body, |body, stage| {
                tracing::trace!(stage = stage.name(), kind = kind.as_str(), "Applying stage");
                stage.apply(body, context)
            })
    }
}
