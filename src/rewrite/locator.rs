//! Locating server blocks in raw markup.
//!
//! Blocks are found by bounded, non-greedy patterns anchored on the upstream
//! site's markup. Everything pattern-specific stays behind [`BlockLocator`].

use regex::Regex;
use std::{ops::Range, sync::LazyLock};

static EMBED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*class="[^"]*embed[^"]*"[^>]*>.*?post=([^"'&\s]+).*?</div>"#)
        .expect("embed block pattern is valid")
});

static PLAYER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)(<script[^>]*type=["']litespeed/javascript["'][^>]*>.*?</script>\s*<div class="secContainer bg">.*?)<div class="singleInfo""#,
    )
    .expect("player block pattern is valid")
});

static POST_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)post=([^"'\s]+)"#).expect("post parameter pattern is valid")
});

/// A located block within a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    /// Bytes to replace.
    pub range: Range<usize>,
    /// Encoded payload inside the block, if one was found.
    pub payload: Option<Range<usize>>,
}

impl BlockSpan {
    pub fn text<'a>(&self, body: &'a str) -> &'a str {
        &body[self.range.clone()]
    }

    pub fn payload_text<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.payload.clone().map(|r| &body[r])
    }
}

pub trait BlockLocator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Find the first block starting at or after `from`.
    fn find_block(&self, body: &str, from: usize) -> Option<BlockSpan>;

    /// All non-overlapping blocks, in document order.
    fn find_blocks(&self, body: &str) -> Vec<BlockSpan> {
        let mut spans = Vec::new();
        let mut from = 0;

        while from <= body.len() {
            let Some(span) = self.find_block(body, from) else {
                break;
            };
            if span.range.end <= from {
                break;
            }
            from = span.range.end;
            spans.push(span);
        }

        spans
    }
}

/// `<div class="…embed…">` containers carrying a `post=` payload.
pub struct EmbedBlockLocator;

impl BlockLocator for EmbedBlockLocator {
    fn name(&self) -> &'static str {
        "embed-block"
    }

    fn find_block(&self, body: &str, from: usize) -> Option<BlockSpan> {
        let caps = EMBED_BLOCK.captures_at(body, from)?;
        let whole = caps.get(0)?;

        Some(BlockSpan {
            range: whole.range(),
            payload: caps.get(1).map(|m| m.range()),
        })
    }
}

/// Lazy-loaded player script followed by the `secContainer bg` container,
/// up to the `singleInfo` section.
pub struct PlayerBlockLocator;

impl BlockLocator for PlayerBlockLocator {
    fn name(&self) -> &'static str {
        "player-block"
    }

    fn find_block(&self, body: &str, from: usize) -> Option<BlockSpan> {
        // The closing `singleInfo` marker belongs to the page, not the block.
        let range = PLAYER_BLOCK.captures_at(body, from)?.get(1)?.range();

        let payload = POST_PARAM.captures(&body[range.clone()]).and_then(|caps| {
            caps.get(1)
                .map(|m| range.start + m.start()..range.start + m.end())
        });

        Some(BlockSpan { range, payload })
    }
}
