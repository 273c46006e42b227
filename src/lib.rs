pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod rewrite;
pub mod server;

pub use config::MirrorConfig;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
