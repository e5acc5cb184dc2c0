// Domain Layer - Pure record types and query vocabulary

pub mod query;
pub mod record;
pub mod row;
pub mod selector;

// Re-exports
pub use query::QueryKind;
pub use record::{DeviceRecord, ProcessRecord};
pub use row::RawRow;
pub use selector::DeviceSelector;
