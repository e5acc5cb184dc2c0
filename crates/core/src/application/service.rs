// Query Service - the crate's primary API surface

use std::sync::Arc;

use tracing::debug;

use crate::application::{decode, mapper};
use crate::context::QueryContext;
use crate::domain::{DeviceRecord, DeviceSelector, ProcessRecord, QueryKind, RawRow};
use crate::error::Result;
use crate::port::QueryRunner;

/// Runs telemetry queries through a [`QueryRunner`] and maps the output
/// into typed records.
///
/// The service holds no state besides the runner, so one instance can be
/// shared across tasks.
pub struct GpuQueryService {
    runner: Arc<dyn QueryRunner>,
}

impl GpuQueryService {
    pub fn new(runner: Arc<dyn QueryRunner>) -> Self {
        Self { runner }
    }

    /// Lists device telemetry for the selected devices, or for all devices
    /// when `selectors` is empty. Records preserve the tool's row order.
    pub async fn list_devices(
        &self,
        ctx: &QueryContext,
        selectors: &[DeviceSelector],
    ) -> Result<Vec<DeviceRecord>> {
        let rows = self.fetch_rows(ctx, QueryKind::Devices, selectors).await?;
        mapper::map_device_rows(rows)
    }

    /// Lists compute processes on the selected devices, or on all devices
    /// when `selectors` is empty. An idle fleet yields an empty list, not
    /// an error.
    pub async fn list_processes(
        &self,
        ctx: &QueryContext,
        selectors: &[DeviceSelector],
    ) -> Result<Vec<ProcessRecord>> {
        let rows = self
            .fetch_rows(ctx, QueryKind::ComputeProcesses, selectors)
            .await?;
        mapper::map_process_rows(rows)
    }

    async fn fetch_rows(
        &self,
        ctx: &QueryContext,
        kind: QueryKind,
        selectors: &[DeviceSelector],
    ) -> Result<Vec<RawRow>> {
        let raw = self.runner.run_query(ctx, kind, selectors).await?;
        let rows = decode::decode_rows(&raw)?;
        debug!(kind = %kind, rows = rows.len(), "decoded query output");
        Ok(rows)
    }
}
