// Record Models - typed rows of diagnostics output

use serde::{Deserialize, Serialize};

/// One row of device telemetry.
///
/// Every field is the trimmed text emitted by the diagnostics tool; this
/// layer performs no numeric parsing. Memory fields are MiB and power fields
/// are watts, with the unit suffixes already stripped at query time
/// (`nounits`). Field declaration order is the positional row schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Zero-based index of the device. Can change at each boot.
    pub index: String,
    /// Globally unique immutable identifier of the device. Does not
    /// correspond to any physical label on the board.
    pub uuid: String,
    /// Percent of time over the past sample period during which one or more
    /// kernels was executing. The sample period may be between 1 second and
    /// 1/6 second depending on the product.
    #[serde(rename = "utilizationGPU")]
    pub utilization_gpu: String,
    /// Total installed device memory, MiB.
    pub memory_total: String,
    /// Memory allocated by active contexts, MiB.
    pub memory_used: String,
    /// Free device memory, MiB.
    pub memory_free: String,
    /// Version of the installed display driver.
    pub driver_version: String,
    /// Official product name of the device.
    pub name: String,
    /// Serial number physically printed on the board.
    pub serial: String,
    /// Last measured board power draw in watts. Averaged over 1 sec on
    /// newer devices, instantaneous on older ones.
    pub power_draw: String,
    /// Software power limit in watts.
    pub power_limit: String,
    /// Core temperature in degrees C.
    pub temperature: String,
    /// When the query was made, "YYYY/MM/DD HH:MM:SS.msec".
    pub timestamp: String,
}

impl DeviceRecord {
    /// Positional width of a device-info row.
    pub const FIELD_COUNT: usize = 13;
}

impl std::fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} %, {} MiB, {} MiB, {} MiB, {}, {}, {}, {} W, {} W, {}, {}",
            self.index,
            self.uuid,
            self.utilization_gpu,
            self.memory_total,
            self.memory_used,
            self.memory_free,
            self.driver_version,
            self.name,
            self.serial,
            self.power_draw,
            self.power_limit,
            self.temperature,
            self.timestamp,
        )
    }
}

/// One process holding a compute context on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// When the query was made, "YYYY/MM/DD HH:MM:SS.msec".
    pub timestamp: String,
    /// Official product name of the device the context lives on.
    pub name: String,
    /// Globally unique immutable identifier of the device.
    pub uuid: String,
    /// Process ID of the compute application.
    pub pid: String,
    /// Process name.
    pub process_name: String,
    /// Memory used on the device by the context, MiB. Not reported on
    /// Windows in WDDM mode, where the OS manages device memory.
    pub used_memory: String,
}

impl ProcessRecord {
    /// Positional width of a compute-process row.
    pub const FIELD_COUNT: usize = 6;
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {} MiB",
            self.timestamp, self.name, self.uuid, self.pid, self.process_name, self.used_memory,
        )
    }
}
