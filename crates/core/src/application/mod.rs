// Application Layer - decoding, mapping, and query orchestration

pub mod decode;
pub mod mapper;
pub mod service;

// Re-exports
pub use service::GpuQueryService;
