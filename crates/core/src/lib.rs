// gpuprobe Core - Domain Logic & Ports
// NO infrastructure dependencies (hexagonal layout)

pub mod application;
pub mod context;
pub mod domain;
pub mod error;
pub mod port;

// Re-exports (library facade)
pub use application::GpuQueryService;
pub use context::{cancel_channel, CancelSource, CancelToken, QueryContext};
pub use domain::{DeviceRecord, DeviceSelector, ProcessRecord, QueryKind, RawRow};
pub use error::{ProbeError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
