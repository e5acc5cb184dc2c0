// Core Error Types

use crate::application::decode::DecodeError;
use crate::domain::QueryKind;
use crate::port::query_runner::QueryError;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Everything a query can fail with, across all layers.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The diagnostics tool could not be run to completion.
    #[error("query execution failed: {0}")]
    Execution(#[from] QueryError),

    /// The tool ran but its output was not well-formed CSV.
    #[error("malformed output: {0}")]
    MalformedCsv(#[from] DecodeError),

    /// A row decoded cleanly but its width does not match the query schema.
    /// `line` is the 1-based data row number.
    #[error("{kind} row {line}: expected {expected} fields, got {actual}")]
    SchemaMismatch {
        kind: QueryKind,
        line: usize,
        expected: usize,
        actual: usize,
    },
}

impl ProbeError {
    /// True when the query stopped because the caller asked it to, either
    /// via token or deadline, rather than because something went wrong.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ProbeError::Execution(QueryError::Cancelled)
                | ProbeError::Execution(QueryError::DeadlineExceeded(_))
        )
    }
}
