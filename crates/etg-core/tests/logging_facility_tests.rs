#![allow(clippy::unwrap_used, clippy::expect_used)]

use etg_core::errors::{ExError, ExErrorKind};
use etg_core::logging_facility::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use etg_core::logging_facility::test_capture::init_test_capture;
use etg_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_log_op_start_with_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, version = 4_u64);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("version"), Some("4"));
    assert!(events[0]
        .component
        .as_deref()
        .unwrap()
        .contains("logging_facility_tests"));
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42_u64);

    let end_events: Vec<_> = capture
        .events_for(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1);
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::NotFound).with_message("no snapshots");
    log_op_error!(op_name, err, duration_ms = 10_u64);

    let error_events: Vec<_> = capture
        .events_for(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1);
    let event = &error_events[0];
    assert_eq!(event.level, tracing::Level::ERROR);
    assert_eq!(event.field("err_code"), Some("ERR_NOT_FOUND"));
    assert_eq!(event.field("err_kind"), Some("NotFound"));
}

#[test]
fn test_assert_event_exists() {
    let capture = init_test_capture();
    log_op_start!("test_assert_event_exists_unique_4");
    capture.assert_event_exists("test_assert_event_exists_unique_4", EVENT_START);
}
