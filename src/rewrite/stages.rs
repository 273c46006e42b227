pub mod banner;
pub mod block;
pub mod home_anchor;
pub mod host_substitution;
pub mod indirect_link;
pub mod meta_tags;
pub mod root_relative;

use regex::{Regex, Replacer};
use std::{borrow::Cow, sync::Arc};

use super::{
    classifier::ContentKind,
    context::RewriteContext,
    locator::{EmbedBlockLocator, PlayerBlockLocator},
    provider::ProviderResolver,
    render::{CopyRowRenderer, EmbedButtonRenderer},
};
use crate::{Result, config::MirrorConfig};

pub use banner::BannerStage;
pub use block::BlockStage;
pub use home_anchor::HomeAnchorStage;
pub use host_substitution::HostSubstitutionStage;
pub use indirect_link::IndirectLinkStage;
pub use meta_tags::MetaTagStage;
pub use root_relative::RootRelativeStage;

/// One textual pass over a response body.
///
/// Stages never fail: anything they cannot handle is left as it was.
pub trait RewriteStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this stage runs for the given content.
    fn applies_to(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Html
    }

    fn apply(&self, body: String, context: &RewriteContext) -> String;
}

/// Stages in the order they must run.
pub fn default_stages(config: &MirrorConfig) -> Result<Vec<Box<dyn RewriteStage>>> {
    let resolver = Arc::new(ProviderResolver::new(&config.estream_template));

    let stages: Vec<Box<dyn RewriteStage>> = vec![
        Box::new(HostSubstitutionStage),
        Box::new(RootRelativeStage),
        Box::new(HomeAnchorStage::new(
            &config.home_anchor,
            &config.home_replacement,
        )?),
        Box::new(IndirectLinkStage::new(&config.redirector_host)?),
        Box::new(BlockStage::new(
            Box::new(EmbedBlockLocator),
            Box::new(EmbedButtonRenderer),
            resolver.clone(),
        )),
        Box::new(BlockStage::new(
            Box::new(PlayerBlockLocator),
            Box::new(CopyRowRenderer),
            resolver,
        )),
        Box::new(MetaTagStage::new(
            &config.robots_tag,
            &config.verification_tag,
        )),
        Box::new(BannerStage::new(&config.banner_html)),
    ];

    Ok(stages)
}

/// `Regex::replace_all` over an owned body, reusing it when nothing matched.
pub(crate) fn replace_all_owned<R: Replacer>(re: &Regex, body: String, rep: R) -> String {
    let replaced = match re.replace_all(&body, rep) {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };
    replaced.unwrap_or(body)
}
