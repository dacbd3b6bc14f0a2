//! gofin-ingest: prompt construction, the upstream model client and reply decoding.

pub mod client;
pub mod prompt;
pub mod reply;
pub mod types;

pub use client::{ChatCompletionsClient, ClientSettings, ModelClient, UpstreamError};
pub use prompt::{build_prompt, Prompt};
pub use reply::parse_reply;
pub use types::{ModelReply, RawModelTransaction};
