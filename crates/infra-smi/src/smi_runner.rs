// nvidia-smi query runner implementation
// reason: async-trait, tokio for async process management

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use gpuprobe_core::context::{CancelToken, QueryContext};
use gpuprobe_core::domain::{DeviceSelector, QueryKind};
use gpuprobe_core::port::query_runner::{QueryError, QueryRunner};

/// Default binary, resolved through PATH.
pub const SMI_BINARY: &str = "nvidia-smi";

/// Columns of the device query, in record field order.
const DEVICE_QUERY_FLAG: &str = "--query-gpu=index,uuid,utilization.gpu,memory.total,\
                                 memory.used,memory.free,driver_version,name,gpu_serial,\
                                 power.draw,power.limit,temperature.gpu,timestamp";

/// Columns of the compute-process query, in record field order.
const PROCESS_QUERY_FLAG: &str =
    "--query-compute-apps=timestamp,gpu_name,gpu_uuid,pid,name,used_memory";

/// Machine-readable output: CSV, no header row, no unit suffixes.
const FORMAT_FLAG: &str = "--format=csv,noheader,nounits";

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct SmiConfig {
    /// Binary to invoke. A bare name is resolved through PATH.
    pub binary: String,
}

impl Default for SmiConfig {
    fn default() -> Self {
        Self {
            binary: SMI_BINARY.to_string(),
        }
    }
}

/// Runs telemetry queries by spawning the nvidia-smi binary.
///
/// The child always gets a closed stdin and piped stdout/stderr. On
/// cancellation or deadline the child is killed rather than left running
/// (`kill_on_drop`).
pub struct SmiRunner {
    config: SmiConfig,
}

impl SmiRunner {
    pub fn new() -> Self {
        Self::with_config(SmiConfig::default())
    }

    pub fn with_config(config: SmiConfig) -> Self {
        Self { config }
    }

    /// Builds the argv tail for one query. Selectors collapse into a single
    /// comma-joined value behind one `-i` flag.
    fn build_args(&self, kind: QueryKind, selectors: &[DeviceSelector]) -> Vec<String> {
        let query_flag = match kind {
            QueryKind::Devices => DEVICE_QUERY_FLAG,
            QueryKind::ComputeProcesses => PROCESS_QUERY_FLAG,
        };

        let mut args = vec![query_flag.to_string(), FORMAT_FLAG.to_string()];
        if !selectors.is_empty() {
            let joined = selectors
                .iter()
                .map(DeviceSelector::as_str)
                .collect::<Vec<_>>()
                .join(",");
            args.push("-i".to_string());
            args.push(joined);
        }
        args
    }
}

impl Default for SmiRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryRunner for SmiRunner {
    async fn run_query(
        &self,
        ctx: &QueryContext,
        kind: QueryKind,
        selectors: &[DeviceSelector],
    ) -> Result<Vec<u8>, QueryError> {
        let program = self.config.binary.clone();
        let args = self.build_args(kind, selectors);

        // A context that arrives already cancelled never spawns.
        if ctx.token().map(CancelToken::is_cancelled).unwrap_or(false) {
            return Err(QueryError::Cancelled);
        }

        let started = Instant::now();
        info!(
            program = %program,
            kind = %kind,
            selectors = ?selectors,
            timeout = ?ctx.timeout(),
            "Starting telemetry query"
        );

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| QueryError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping the unfinished wait future drops the child handle, which
        // kills the process. No child outlives its query.
        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|source| QueryError::Output {
                    program: program.clone(),
                    source,
                })?
            }
            _ = wait_for_cancel(ctx.token()) => {
                info!(program = %program, kind = %kind, "Telemetry query cancelled");
                return Err(QueryError::Cancelled);
            }
            timeout = wait_for_deadline(ctx.timeout()) => {
                warn!(
                    program = %program,
                    kind = %kind,
                    timeout_ms = %timeout.as_millis(),
                    "Telemetry query deadline exceeded"
                );
                return Err(QueryError::DeadlineExceeded(timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                program = %program,
                kind = %kind,
                status = %output.status,
                stderr = %stderr,
                "Telemetry tool reported failure"
            );
            return Err(QueryError::NonZeroExit {
                program,
                status: output.status.to_string(),
                stderr,
            });
        }

        info!(
            program = %program,
            kind = %kind,
            duration_ms = %started.elapsed().as_millis(),
            stdout_bytes = %output.stdout.len(),
            "Telemetry query completed"
        );
        Ok(output.stdout)
    }
}

/// Pending forever when no token is attached.
async fn wait_for_cancel(token: Option<&CancelToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

/// Pending forever when no deadline is attached.
async fn wait_for_deadline(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(timeout) => {
            tokio::time::sleep(timeout).await;
            timeout
        }
        None => std::future::pending::<Duration>().await,
    }
}
