// gpuprobe Infrastructure - nvidia-smi Adapter
// Implements: QueryRunner

pub mod smi_runner;

pub use smi_runner::{SmiConfig, SmiRunner, SMI_BINARY};
