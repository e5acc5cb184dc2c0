// Query Kind - which of the two telemetry queries to run

use super::{DeviceRecord, ProcessRecord};

/// The two supported query shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Per-device telemetry (utilization, memory, power, ...).
    Devices,
    /// Compute processes currently holding device contexts.
    ComputeProcesses,
}

impl QueryKind {
    /// Positional row width this query is expected to produce.
    pub fn expected_fields(&self) -> usize {
        match self {
            QueryKind::Devices => DeviceRecord::FIELD_COUNT,
            QueryKind::ComputeProcesses => ProcessRecord::FIELD_COUNT,
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::Devices => write!(f, "DEVICES"),
            QueryKind::ComputeProcesses => write!(f, "COMPUTE_PROCESSES"),
        }
    }
}
