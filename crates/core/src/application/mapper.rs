// Record Mapper - positional rows into typed records

use crate::domain::{DeviceRecord, ProcessRecord, QueryKind, RawRow};
use crate::error::{ProbeError, Result};

/// Maps decoded rows onto device records, preserving row order.
///
/// Fails on the first row whose width is not exactly
/// [`DeviceRecord::FIELD_COUNT`]; no partial results are returned.
pub fn map_device_rows(rows: Vec<RawRow>) -> Result<Vec<DeviceRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| map_device_row(i + 1, row))
        .collect()
}

/// Maps decoded rows onto compute-process records, preserving row order.
pub fn map_process_rows(rows: Vec<RawRow>) -> Result<Vec<ProcessRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| map_process_row(i + 1, row))
        .collect()
}

fn map_device_row(line: usize, row: RawRow) -> Result<DeviceRecord> {
    let fields: [String; DeviceRecord::FIELD_COUNT] =
        row.into_fields().try_into().map_err(|fields: Vec<String>| {
            schema_mismatch(QueryKind::Devices, line, fields.len())
        })?;
    let [index, uuid, utilization_gpu, memory_total, memory_used, memory_free, driver_version, name, serial, power_draw, power_limit, temperature, timestamp] =
        fields;

    Ok(DeviceRecord {
        index,
        uuid,
        utilization_gpu,
        memory_total,
        memory_used,
        memory_free,
        driver_version,
        name,
        serial,
        power_draw,
        power_limit,
        temperature,
        timestamp,
    })
}

fn map_process_row(line: usize, row: RawRow) -> Result<ProcessRecord> {
    let fields: [String; ProcessRecord::FIELD_COUNT] =
        row.into_fields().try_into().map_err(|fields: Vec<String>| {
            schema_mismatch(QueryKind::ComputeProcesses, line, fields.len())
        })?;
    let [timestamp, name, uuid, pid, process_name, used_memory] = fields;

    Ok(ProcessRecord {
        timestamp,
        name,
        uuid,
        pid,
        process_name,
        used_memory,
    })
}

fn schema_mismatch(kind: QueryKind, line: usize, actual: usize) -> ProbeError {
    ProbeError::SchemaMismatch {
        kind,
        line,
        expected: kind.expected_fields(),
        actual,
    }
}
