pub mod classifier;
pub mod context;
pub mod locator;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod stages;

pub use classifier::{ContentClassifier, ContentKind};
pub use context::RewriteContext;
pub use locator::{BlockLocator, BlockSpan};
pub use pipeline::ContentPipeline;
pub use provider::ProviderResolver;
pub use render::{BlockRenderer, ResolvedServer};
