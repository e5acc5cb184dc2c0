// Query Runner Port - runs one telemetry query against the external tool

use std::time::Duration;

use async_trait::async_trait;

use crate::context::QueryContext;
use crate::domain::{DeviceSelector, QueryKind};

/// Executes telemetry queries by invoking the external diagnostics tool.
///
/// Implementations own the process plumbing; callers only see raw stdout
/// bytes or a `QueryError`. Cancellation and deadlines come in through the
/// context and must not leak a running child process.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Runs one query and returns the tool's raw stdout on success.
    ///
    /// # Arguments
    /// * `ctx` - Deadline and cancellation bounds for this invocation
    /// * `kind` - Which query to run
    /// * `selectors` - Devices to restrict the query to; empty means all
    ///
    /// # Errors
    /// * `QueryError::Spawn` - The tool binary could not be started
    /// * `QueryError::NonZeroExit` - The tool ran and reported failure
    /// * `QueryError::Cancelled` / `DeadlineExceeded` - The context ended
    ///   the query first
    async fn run_query(
        &self,
        ctx: &QueryContext,
        kind: QueryKind,
        selectors: &[DeviceSelector],
    ) -> Result<Vec<u8>, QueryError>;
}

/// Failures raised while executing the external tool.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The binary could not be spawned at all (missing, not executable).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran to completion but exited non-zero. `status` is the
    /// rendered exit status; `stderr` is the tool's trimmed diagnostics.
    #[error("{program} failed ({status}): {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    /// The caller's token cancelled the query before the tool finished.
    #[error("query cancelled")]
    Cancelled,

    /// The context deadline elapsed before the tool finished.
    #[error("query deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The tool started but its output could not be collected.
    #[error("failed to collect output of {program}: {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub mod mocks {
    use std::sync::Mutex;

    use super::*;

    /// Scripted behavior for [`MockQueryRunner`].
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Succeed with this raw stdout.
        Output(Vec<u8>),
        /// Fail as if the tool exited non-zero.
        NonZeroExit { status: String, stderr: String },
        /// Fail as if the caller's token fired first.
        Cancelled,
    }

    /// One query the mock received, with selectors flattened to text.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedQuery {
        pub kind: QueryKind,
        pub selectors: Vec<String>,
    }

    /// Test double that records every query and replays a fixed behavior.
    pub struct MockQueryRunner {
        behavior: MockBehavior,
        calls: Mutex<Vec<RecordedQuery>>,
    }

    impl MockQueryRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Shorthand for a mock that succeeds with `stdout`.
        pub fn with_output(stdout: impl Into<Vec<u8>>) -> Self {
            Self::new(MockBehavior::Output(stdout.into()))
        }

        /// Every query received so far, in order.
        pub fn calls(&self) -> Vec<RecordedQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryRunner for MockQueryRunner {
        async fn run_query(
            &self,
            _ctx: &QueryContext,
            kind: QueryKind,
            selectors: &[DeviceSelector],
        ) -> Result<Vec<u8>, QueryError> {
            self.calls.lock().unwrap().push(RecordedQuery {
                kind,
                selectors: selectors.iter().map(|s| s.as_str().to_string()).collect(),
            });

            match &self.behavior {
                MockBehavior::Output(bytes) => Ok(bytes.clone()),
                MockBehavior::NonZeroExit { status, stderr } => Err(QueryError::NonZeroExit {
                    program: "mock".to_string(),
                    status: status.clone(),
                    stderr: stderr.clone(),
                }),
                MockBehavior::Cancelled => Err(QueryError::Cancelled),
            }
        }
    }
}
