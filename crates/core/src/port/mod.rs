// Port Layer - interface between the domain and the diagnostics tool

pub mod query_runner;

// Re-exports
pub use query_runner::{QueryError, QueryRunner};
