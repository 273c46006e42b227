use std::sync::Arc;

use super::{RewriteContext, RewriteStage};
use crate::{
    codec::PayloadCodec,
    rewrite::{
        locator::{BlockLocator, BlockSpan},
        provider::ProviderResolver,
        render::BlockRenderer,
    },
};

/// Replaces located server blocks with rendered markup.
///
/// Each block is handled on its own; a block whose payload is missing,
/// undecodable or resolves to no servers is kept byte for byte.
pub struct BlockStage {
    locator: Box<dyn BlockLocator>,
    renderer: Box<dyn BlockRenderer>,
    resolver: Arc<ProviderResolver>,
}

impl BlockStage {
    pub fn new(
        locator: Box<dyn BlockLocator>,
        renderer: Box<dyn BlockRenderer>,
        resolver: Arc<ProviderResolver>,
    ) -> Self {
        Self {
            locator,
            renderer,
            resolver,
        }
    }

    fn render_block(&self, body: &str, span: &BlockSpan) -> Option<String> {
        let Some(encoded) = span.payload_text(body) else {
            tracing::debug!(stage = self.name(), "Block has no payload");
            return None;
        };

        let payload = match PayloadCodec::decode_payload(encoded) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(stage = self.name(), "Keeping block with bad payload: {}", e);
                return None;
            }
        };

        let rendered = self.renderer.render(&payload, &self.resolver);
        if rendered.is_none() {
            tracing::warn!(
                stage = self.name(),
                servers = payload.servers.len(),
                "Keeping block with no usable servers"
            );
        }
        rendered
    }
}

impl RewriteStage for BlockStage {
    fn name(&self) -> &'static str {
        self.locator.name()
    }

    fn apply(&self, body: String, _context: &RewriteContext) -> String {
        let spans = self.locator.find_blocks(&body);
        if spans.is_empty() {
            return body;
        }

        let mut output = String::with_capacity(body.len());
        let mut last = 0;
        let mut replaced = 0;

        for span in &spans {
            output.push_str(&body[last..span.range.start]);
            match self.render_block(&body, span) {
                Some(html) => {
                    output.push_str(&html);
                    replaced += 1;
                }
                None => output.push_str(span.text(&body)),
            }
            last = span.range.end;
        }
        output.push_str(&body[last..]);

        tracing::debug!(
            stage = self.name(),
            renderer = self.renderer.name(),
            found = spans.len(),
            replaced,
            "Processed server blocks"
        );

        output
    }
}
