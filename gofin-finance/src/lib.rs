//! gofin-finance: classification rules, normalization, batch filtering and the ingest pipeline

pub mod batch;
pub mod classify;
pub mod endpoint;
pub mod normalize;
pub mod pipeline;

pub use classify::{classify_kind, recognize_kind, FallbackPolicy};
pub use endpoint::{IngestRequest, IngestResponse};
pub use pipeline::{IngestPipeline, PipelineSettings};
