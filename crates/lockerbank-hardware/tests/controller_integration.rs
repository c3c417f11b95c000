//! Integration tests for LinkController and AccessGate
//!
//! These tests drive the public API end to end against the recording and
//! simulated transports.

use lockerbank_hardware::mock::{RecordingHandle, RecordingTransport};
use lockerbank_hardware::{
    AccessGate, CommandAction, ErrorKind, LinkConfig, LinkController, LinkMode, LinkState,
    LockerStatus, RetryPolicy,
};
use lockerbank_protocol::CommandFrame;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn recording_controller() -> (Arc<LinkController>, RecordingHandle) {
    let (transport, handle) = RecordingTransport::new();
    let controller = LinkController::with_transport(LinkConfig::default(), transport.into());
    (Arc::new(controller), handle)
}

#[tokio::test(start_paused = true)]
async fn test_simulated_open_is_fast_and_successful() {
    let controller = LinkController::connect(LinkConfig::simulated()).await;
    assert_eq!(controller.state(), LinkState::Simulated);

    let start = Instant::now();
    let result = controller.open_locker(5, None, None).await;

    assert!(start.elapsed() <= Duration::from_millis(150));
    assert!(result.success);
    assert_eq!(result.action, CommandAction::Open);
    assert_eq!(result.logical_locker_id, Some(5));
    assert!(!result.frame.unwrap_or_default().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_simulated_status_and_test() {
    let controller = LinkController::connect(LinkConfig::simulated()).await;

    let status = controller.get_status(3).await;
    assert!(status.success);
    assert_eq!(status.status, Some(LockerStatus::Closed));

    let test = controller.test_connection().await;
    assert!(test.success);
    let diagnostics = test.diagnostics.unwrap();
    assert_eq!(diagnostics.mode, LinkMode::Simulated);
    assert!(diagnostics.connected);
    assert_eq!(diagnostics.port, "/dev/ttyUSB0");
    assert_eq!(diagnostics.baud_rate, 9600);
}

#[tokio::test]
async fn test_close_sends_same_frame_as_open() {
    let (controller, handle) = recording_controller();

    let open = controller.open_locker(14, None, None).await;
    let close = controller.close_locker(14, None, None).await;

    assert_eq!(open.frame, close.frame);
    assert_eq!(close.action, CommandAction::Close);
    let sends = handle.sends();
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[0], sends[1]);
}

#[tokio::test]
async fn test_wire_bytes_are_a_valid_frame() {
    let (controller, handle) = recording_controller();

    let result = controller.open_locker(40, None, None).await;
    let sent = &handle.sends()[0];

    let frame = CommandFrame::from_bytes(sent).unwrap();
    assert_eq!(frame.address(), 7);
    assert_eq!(frame.locker_number(), 14);
    assert_eq!(result.frame, Some(hex::encode_upper(sent)));
}

#[tokio::test]
async fn test_bad_access_code_sends_nothing() {
    let (controller, handle) = recording_controller();
    let gate = AccessGate::new(Arc::clone(&controller));

    let result = gate.access_with_code("12ab5678", 1, None, None).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Invalid access code format"));
    assert_eq!(result.error_kind, Some(ErrorKind::InvalidAccessCode));
    assert_eq!(handle.send_count(), 0);
    assert!(handle.wire().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_opens_do_not_interleave() {
    let (controller, handle) = recording_controller();
    handle.set_delay(Duration::from_millis(2));

    let tasks: Vec<_> = (1..=16)
        .map(|id| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.open_locker(id, None, None).await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().success);
    }

    assert_eq!(handle.overlaps(), 0);
    assert_eq!(handle.send_count(), 16);
    assert_eq!(handle.wire(), handle.sends().concat());
}

#[tokio::test]
async fn test_join_of_gate_and_controller_is_serialized() {
    let (controller, handle) = recording_controller();
    let gate = AccessGate::new(Arc::clone(&controller));

    let (a, b, c) = tokio::join!(
        controller.open_locker(1, None, None),
        gate.access_with_code("87654321", 2, None, None),
        controller.get_status(3),
    );

    assert!(a.success && b.success && c.success);
    assert_eq!(handle.overlaps(), 0);
    assert_eq!(handle.wire(), handle.sends().concat());
}

#[tokio::test]
async fn test_disconnected_link_fails_every_operation() {
    let config = LinkConfig::live("/dev/lockerbank-missing-adapter");
    let controller = Arc::new(LinkController::connect(config).await);
    assert_eq!(controller.state(), LinkState::Disconnected);

    let results = vec![
        controller.open_locker(1, None, None).await,
        controller.close_locker(1, None, None).await,
        controller.get_status(1).await,
        controller.test_connection().await,
        AccessGate::new(Arc::clone(&controller))
            .access_with_code("12345678", 1, None, None)
            .await,
    ];

    for result in results {
        assert!(!result.success, "{:?}", result.action);
        assert_eq!(result.error_kind, Some(ErrorKind::LinkUnavailable));
        assert!(result.error.is_some());
    }

    assert!(!controller.send("5A5A0000000400010104").await);
    assert!(!controller.session().connected);
    assert!(!controller.reconnect().await);
}

#[tokio::test(start_paused = true)]
async fn test_connect_spends_exactly_the_configured_attempts() {
    let mut config = LinkConfig::live("/dev/lockerbank-missing-adapter");
    config.retry = RetryPolicy::attempts(3);

    let start = Instant::now();
    let controller = LinkController::connect(config).await;
    let elapsed = start.elapsed();

    // 500 ms after the first failure, 1000 ms after the second, none after the third
    assert_eq!(controller.state(), LinkState::Disconnected);
    assert!(elapsed >= Duration::from_millis(1500), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3500), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_commands_fail_fast_while_reconnecting() {
    let mut config = LinkConfig::live("/dev/lockerbank-missing-adapter");
    config.retry = RetryPolicy {
        max_attempts: 4,
        initial_backoff_ms: 300,
        ..RetryPolicy::default()
    };
    let controller = Arc::new(LinkController::connect(config).await);

    let reconnect = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.reconnect().await }
    });
    tokio::task::yield_now().await;

    let start = Instant::now();
    let result = controller.open_locker(1, None, None).await;

    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(result.error_kind, Some(ErrorKind::LinkUnavailable));
    assert!(!controller.send("5A5A0000000400010104").await);
    assert!(!reconnect.await.unwrap());
}

#[tokio::test]
async fn test_disconnected_validation_still_wins() {
    let controller = LinkController::connect(LinkConfig::live("/dev/lockerbank-missing")).await;

    let result = controller.open_locker(1, Some(32), Some(0)).await;
    assert_eq!(result.error_kind, Some(ErrorKind::InvalidAddressRange));
}

#[tokio::test]
async fn test_write_failure_is_transmission_error() {
    let (controller, handle) = recording_controller();
    handle.fail_writes(true);

    let result = controller.open_locker(1, Some(2), Some(3)).await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::TransmissionError));
    assert_eq!(result.frame.as_deref(), Some("5A5A0002000400010304"));
    assert!(result.physical_address.is_some());
    assert_eq!(controller.state(), LinkState::Connected);

    handle.fail_writes(false);
    assert!(controller.open_locker(1, Some(2), Some(3)).await.success);
}

#[tokio::test]
async fn test_result_json_shape() {
    let (controller, handle) = recording_controller();
    handle.set_response(Some("OK"));

    let result = controller.open_locker(1, None, None).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["action"], "open");
    assert_eq!(json["logical_locker_id"], 1);
    assert_eq!(json["physical_address"]["locker_number"], 0);
    assert_eq!(json["frame"], "5A5A0000000400010005");
    assert_eq!(json["response"], "OK");
    assert!(json["timestamp"].is_string());
    assert!(json.get("error").is_none());
}
