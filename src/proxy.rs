pub mod client;
pub mod headers;

pub use client::{ProxyClient, UpstreamResponse};
pub use headers::UpstreamHeaders;
