//! Integration tests for the serial link.
//!
//! These tests drive a complete `SerialLink` against the in-memory device:
//! - Commands → writer → device (ordering, newline handling, queue policy)
//! - Device → reader → inbound queue → TelemetryView
//! - Reader → ThrottledRecorder → record file
//! - Connect / disconnect lifecycle and reconnect
//!
//! Run with: `cargo test --test link_integration`

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use valvelink::link::{
    ConnectionState, LinkConfig, LinkError, OutboundCapacity, SerialLink, ThreadExit,
    WriteFailurePolicy,
};
use valvelink::telemetry::{DisplayConfig, TelemetryView};
use valvelink::transport::{MemoryConnector, MemoryDevice, MemoryTransport, TransportError};

// ============================================================================
// Test Helpers
// ============================================================================

const READ_TIMEOUT: Duration = Duration::from_millis(20);
const WAIT: Duration = Duration::from_secs(2);

/// Link config with short timeouts and no record file.
fn test_config() -> LinkConfig {
    LinkConfig::new("/dev/memory0")
        .with_read_timeout(READ_TIMEOUT)
        .with_writer_poll_interval(Duration::from_millis(20))
        .with_join_timeout(Duration::from_millis(500))
        .with_record_path(None)
}

/// Link wired to a fresh in-memory device.
fn create_link(config: LinkConfig) -> (SerialLink, MemoryDevice) {
    let (transport, device) = MemoryTransport::pair(READ_TIMEOUT);
    let link = SerialLink::with_connector(config, MemoryConnector::new(transport));
    (link, device)
}

/// Poll `view` until it holds `count` samples or the wait expires.
fn wait_for_samples(view: &mut TelemetryView, count: usize) {
    let deadline = Instant::now() + WAIT;
    while view.store().len() < count && Instant::now() < deadline {
        view.tick();
        thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// Command Flow
// ============================================================================

#[test]
fn test_commands_arrive_in_submission_order() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();

    link.send("A").unwrap();
    link.send("B").unwrap();
    link.send("C").unwrap();

    let written: Vec<Vec<u8>> = (0..3)
        .map(|_| device.recv_written(WAIT).expect("command not written"))
        .collect();
    assert_eq!(
        written,
        vec![b"A\n".to_vec(), b"B\n".to_vec(), b"C\n".to_vec()]
    );
    link.disconnect();
    assert_eq!(link.stats().commands_written, 3);
}

#[test]
fn test_terminated_command_is_not_doubled() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();

    link.send("ignseq 15\n").unwrap();
    link.send("incrementopen").unwrap();

    assert_eq!(device.recv_written(WAIT).unwrap(), b"ignseq 15\n");
    assert_eq!(device.recv_written(WAIT).unwrap(), b"incrementopen\n");
}

#[test]
fn test_commands_queued_before_connect_are_sent_after() {
    let (mut link, device) = create_link(test_config());
    link.send("cycleoxvalve 2").unwrap();
    assert!(device.recv_written(Duration::from_millis(50)).is_none());

    link.connect().unwrap();
    assert_eq!(device.recv_written(WAIT).unwrap(), b"cycleoxvalve 2\n");
}

#[test]
fn test_command_sender_works_from_another_thread() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();

    let sender = link.command_sender();
    thread::spawn(move || sender.send("cyclefuelvalve 2").unwrap())
        .join()
        .unwrap();

    assert_eq!(device.recv_written(WAIT).unwrap(), b"cyclefuelvalve 2\n");
}

#[test]
fn test_bounded_queue_rejects_without_blocking() {
    let config = test_config().with_outbound_capacity(OutboundCapacity::Bounded(2));
    let (link, _device) = create_link(config);

    link.send("one").unwrap();
    link.send("two").unwrap();

    let start = Instant::now();
    let err = link.send("three").unwrap_err();
    assert!(matches!(err, LinkError::OutboundFull { capacity: 2 }));
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_write_failure_does_not_stop_later_commands() {
    let (mut link, device) = create_link(test_config());
    device.fail_next_writes(1);
    link.connect().unwrap();

    link.send("lost").unwrap();
    link.send("kept").unwrap();

    assert_eq!(device.recv_written(WAIT).unwrap(), b"kept\n");
    link.disconnect();
    let stats = link.stats();
    assert_eq!(stats.write_failures, 1);
    assert_eq!(stats.commands_written, 1);
}

#[test]
fn test_retry_policy_delivers_after_transient_failure() {
    let config = test_config().with_write_failure(WriteFailurePolicy::Retry { attempts: 2 });
    let (mut link, device) = create_link(config);
    device.fail_next_writes(2);
    link.connect().unwrap();

    link.send("ignseq 15").unwrap();

    assert_eq!(device.recv_written(WAIT).unwrap(), b"ignseq 15\n");
    link.disconnect();
    assert_eq!(link.stats().write_failures, 2);
}

// ============================================================================
// Telemetry Flow
// ============================================================================

#[test]
fn test_telemetry_reaches_view_in_order() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();
    let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());

    for i in 0..50 {
        device.emit_line(&format!("{} {}", i, 100 - i));
    }
    wait_for_samples(&mut view, 50);

    let samples = view.store().samples();
    assert_eq!(samples.len(), 50);
    assert_eq!(samples[0].elapsed_ms, 0.0);
    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(sample.ox_pos, i as i32);
        assert_eq!(sample.fuel_pos, 100 - i as i32);
    }
    assert!(samples
        .windows(2)
        .all(|pair| pair[0].elapsed_ms <= pair[1].elapsed_ms));
}

#[test]
fn test_malformed_lines_are_dropped_and_reader_survives() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();
    let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());

    device.emit_line("boot ok");
    device.emit_line("1 2 3");
    device.emit_raw(vec![0xff, 0xfe, b'\n']);
    device.emit_line("");
    device.emit_line("42 7");
    wait_for_samples(&mut view, 1);

    assert_eq!(view.store().len(), 1);
    let latest = view.store().latest().unwrap();
    assert_eq!((latest.ox_pos, latest.fuel_pos), (42, 7));
    assert!(link.is_connected());
    link.disconnect();
    assert_eq!(link.stats().lines_dropped, 2);
}

#[test]
fn test_view_decimates_large_history() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();
    let mut view = TelemetryView::new(
        link.telemetry(),
        DisplayConfig {
            target_points: 100,
            ..Default::default()
        },
    );

    for i in 0..1000 {
        device.emit_line(&format!("{} {}", i, i));
    }
    wait_for_samples(&mut view, 1000);

    let series = view.series();
    assert_eq!(series.len(), 100);
    assert_eq!(series.ox_pos[0], 0);
    assert_eq!(series.ox_pos[1], 10);
    assert!(view.tick().is_none());
}

// ============================================================================
// Recording
// ============================================================================

#[test]
fn test_recording_is_throttled_and_appended() {
    let temp_dir = TempDir::new().unwrap();
    let record_path = temp_dir.path().join("ServoData.csv");
    std::fs::write(&record_path, "1,1\n").unwrap();

    let config = test_config().with_record_path(Some(record_path.clone()));
    let (mut link, device) = create_link(config);
    link.connect().unwrap();
    let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());

    thread::sleep(Duration::from_millis(40));
    for i in 0..200 {
        device.emit_line(&format!("{} {}", i, i + 1));
    }
    wait_for_samples(&mut view, 200);
    link.disconnect();

    let content = std::fs::read_to_string(&record_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "1,1");
    assert!(lines.len() >= 2, "burst left no record");
    assert!(lines.len() < 50, "burst was not throttled: {}", lines.len());
    assert_eq!(lines[1], "0,1");
    assert_eq!(view.store().len(), 200);
    assert_eq!(link.stats().records_written as usize, lines.len() - 1);
}

#[test]
fn test_unwritable_record_path_fails_connect() {
    let temp_dir = TempDir::new().unwrap();
    let record_path = temp_dir.path().join("missing").join("ServoData.csv");

    let (transport, device) = MemoryTransport::pair(READ_TIMEOUT);
    let config = test_config().with_record_path(Some(record_path));
    let mut link = SerialLink::with_connector(config, MemoryConnector::new(transport));

    let err = link.connect().unwrap_err();
    assert!(matches!(err, LinkError::Recorder(_)));
    assert_eq!(link.state(), ConnectionState::Disconnected);
    assert!(device.is_closed());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_connect_failure_leaves_link_disconnected() {
    let mut link = SerialLink::with_connector(test_config(), MemoryConnector::unavailable());

    let err = link.connect().unwrap_err();
    assert!(matches!(
        err,
        LinkError::Connect(TransportError::Open { .. })
    ));
    assert!(!link.is_connected());
}

#[test]
fn test_connect_is_idempotent() {
    let (mut link, _device) = create_link(test_config());
    link.connect().unwrap();
    link.connect().unwrap();
    assert!(link.is_connected());
}

#[test]
fn test_disconnect_is_bounded_and_closes_transport() {
    let (mut link, device) = create_link(test_config());
    link.connect().unwrap();

    let start = Instant::now();
    let report = link.disconnect();

    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(report.is_clean());
    assert_eq!(report.reader, ThreadExit::Joined);
    assert!(device.is_closed());
    assert_eq!(link.state(), ConnectionState::Disconnected);
}

#[test]
fn test_disconnect_when_idle_is_noop() {
    let (mut link, _device) = create_link(test_config());
    let report = link.disconnect();
    assert_eq!(report.reader, ThreadExit::NotRunning);
    assert_eq!(report.writer, ThreadExit::NotRunning);
}

#[test]
fn test_reconnect_keeps_telemetry_receiver() {
    let (mut link, device) = create_link(test_config());
    let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());

    link.connect().unwrap();
    device.emit_line("1 1");
    wait_for_samples(&mut view, 1);
    link.disconnect();

    link.connect().unwrap();
    device.emit_line("2 2");
    wait_for_samples(&mut view, 2);

    let samples = view.store().samples();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].ox_pos, 2);
}

#[test]
fn test_elapsed_time_keeps_increasing_across_reconnect() {
    let (mut link, device) = create_link(test_config());
    let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());

    link.connect().unwrap();
    device.emit_line("1 1");
    wait_for_samples(&mut view, 1);
    thread::sleep(Duration::from_millis(50));
    device.emit_line("2 2");
    wait_for_samples(&mut view, 2);
    link.disconnect();

    link.connect().unwrap();
    device.emit_line("3 3");
    wait_for_samples(&mut view, 3);

    let elapsed: Vec<f64> = view.store().samples().iter().map(|s| s.elapsed_ms).collect();
    assert_eq!(elapsed.len(), 3);
    assert_eq!(elapsed[0], 0.0);
    assert!(elapsed[1] >= 50.0);
    assert!(
        elapsed.windows(2).all(|pair| pair[0] <= pair[1]),
        "elapsed time went backwards: {:?}",
        elapsed
    );
}

#[test]
fn test_drop_disconnects() {
    let (transport, device) = MemoryTransport::pair(READ_TIMEOUT);
    {
        let mut link =
            SerialLink::with_connector(test_config(), MemoryConnector::new(Arc::clone(&transport)));
        link.connect().unwrap();
        assert!(!device.is_closed());
    }
    assert!(device.is_closed());
}
