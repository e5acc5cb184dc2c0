//! Device Query Integration Tests
//!
//! Exercises the full decode + map pipeline over a scripted runner,
//! using output captured from an eight-device node.

use std::sync::Arc;

use gpuprobe_core::port::query_runner::mocks::{MockBehavior, MockQueryRunner};
use gpuprobe_core::{
    DeviceSelector, GpuQueryService, ProbeError, QueryContext, QueryKind,
};

const FLEET_OUTPUT: &str = concat!(
    "0, GPU-fd189414-e0f6-58a0-7031-fefe0ce43b1d, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923001828, 67.07, 400.00, 30, 2024/03/08 13:49:49.053\n",
    "1, GPU-121ebc1f-3e5d-139d-7aac-57311d5bafc7, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923002004, 65.34, 400.00, 30, 2024/03/08 13:49:49.057\n",
    "2, GPU-b74d1aeb-0aab-b3ca-ff55-94e24cbe0cd6, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923001316, 66.55, 400.00, 31, 2024/03/08 13:49:49.061\n",
    "3, GPU-401e53f2-8f44-1fc5-469d-8e36c1d6c9c5, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923000738, 69.24, 400.00, 32, 2024/03/08 13:49:49.065\n",
    "4, GPU-8b63b1f2-98e1-b24e-f59f-d725d51b3a2b, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923001130, 64.87, 400.00, 30, 2024/03/08 13:49:49.069\n",
    "5, GPU-67fc57fc-34ad-4126-2f66-0b8d29144c75, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923002217, 68.02, 400.00, 31, 2024/03/08 13:49:49.073\n",
    "6, GPU-105ee81f-dddd-aaf0-2e30-ca1593fdbf18, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923000989, 66.91, 400.00, 29, 2024/03/08 13:49:49.077\n",
    "7, GPU-349fa89c-151d-340e-c147-94506daf1357, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923001555, 65.73, 400.00, 33, 2024/03/08 13:49:49.081\n",
);

fn fleet_service() -> (GpuQueryService, Arc<MockQueryRunner>) {
    let runner = Arc::new(MockQueryRunner::with_output(FLEET_OUTPUT));
    (GpuQueryService::new(runner.clone()), runner)
}

#[tokio::test]
async fn test_eight_device_node_maps_in_order() {
    let (service, _runner) = fleet_service();

    let records = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 8);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.index, i.to_string());
        assert_eq!(record.driver_version, "535.104.12");
        assert_eq!(record.name, "NVIDIA A800-SXM4-80GB");
        assert_eq!(record.memory_total, "81920");
    }
    assert_eq!(records[5].uuid, "GPU-67fc57fc-34ad-4126-2f66-0b8d29144c75");
    assert_eq!(records[5].power_draw, "68.02");
    assert_eq!(records[7].temperature, "33");

    println!("✅ Eight-device output maps to eight ordered records");
}

#[tokio::test]
async fn test_selectors_reach_the_runner_verbatim() {
    let (service, runner) = fleet_service();
    let selectors = [
        DeviceSelector::index(2),
        DeviceSelector::uuid("GPU-b74d1aeb-0aab-b3ca-ff55-94e24cbe0cd6"),
    ];

    service
        .list_devices(&QueryContext::unbounded(), &selectors)
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, QueryKind::Devices);
    assert_eq!(
        calls[0].selectors,
        vec![
            "2".to_string(),
            "GPU-b74d1aeb-0aab-b3ca-ff55-94e24cbe0cd6".to_string(),
        ],
    );

    println!("✅ Selectors pass through to the runner untouched");
}

#[tokio::test]
async fn test_display_keeps_the_legacy_line_format() {
    let (service, _runner) = fleet_service();

    let records = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap();

    assert_eq!(
        records[0].to_string(),
        "0, GPU-fd189414-e0f6-58a0-7031-fefe0ce43b1d, 0 %, 81920 MiB, 2 MiB, \
         81226 MiB, 535.104.12, NVIDIA A800-SXM4-80GB, 1321923001828, 67.07 W, \
         400.00 W, 30, 2024/03/08 13:49:49.053",
    );

    println!("✅ Device records render the legacy one-line format");
}

#[tokio::test]
async fn test_json_round_trip_preserves_wire_names() {
    let (service, _runner) = fleet_service();

    let records = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap();

    let json = serde_json::to_value(&records).unwrap();
    let first = &json[0];
    assert_eq!(first["utilizationGPU"], "0");
    assert_eq!(first["memoryTotal"], "81920");
    assert_eq!(first["powerDraw"], "67.07");

    let parsed: Vec<gpuprobe_core::DeviceRecord> = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, records);

    println!("✅ JSON uses the legacy field names and round-trips");
}

#[tokio::test]
async fn test_short_row_is_a_schema_mismatch_with_row_number() {
    // Row 3 lost its timestamp column.
    let drifted = concat!(
        "0, GPU-a, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 1, 67.07, 400.00, 30, 2024/03/08 13:49:49.053\n",
        "1, GPU-b, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 2, 65.34, 400.00, 30, 2024/03/08 13:49:49.057\n",
        "2, GPU-c, 0, 81920, 2, 81226, 535.104.12, NVIDIA A800-SXM4-80GB, 3, 66.55, 400.00, 31\n",
    );
    let service = GpuQueryService::new(Arc::new(MockQueryRunner::with_output(drifted)));

    let err = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap_err();
    match err {
        ProbeError::SchemaMismatch {
            kind,
            line,
            expected,
            actual,
        } => {
            assert_eq!(kind, QueryKind::Devices);
            assert_eq!(line, 3);
            assert_eq!(expected, 13);
            assert_eq!(actual, 12);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    println!("✅ A drifted row fails fast with its row number");
}

#[tokio::test]
async fn test_unterminated_quote_is_malformed_output() {
    let service = GpuQueryService::new(Arc::new(MockQueryRunner::with_output(
        "0, \"GPU-broken, 0, 81920\n",
    )));

    let err = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::MalformedCsv(_)));

    println!("✅ Unbalanced quoting is rejected as malformed output");
}

#[tokio::test]
async fn test_tool_failure_keeps_its_diagnostics() {
    let service = GpuQueryService::new(Arc::new(MockQueryRunner::new(
        MockBehavior::NonZeroExit {
            status: "exit status: 6".to_string(),
            stderr: "Unable to determine the device handle for GPU 0".to_string(),
        },
    )));

    let err = service
        .list_devices(&QueryContext::unbounded(), &[])
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("exit status: 6"), "message: {message}");

    match err {
        ProbeError::Execution(inner) => {
            assert!(inner.to_string().contains("device handle"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    println!("✅ Tool failures keep exit status and stderr diagnostics");
}
