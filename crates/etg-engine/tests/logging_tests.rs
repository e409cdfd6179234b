// Boundary logging emitted by engine operations.

use chrono::Utc;
use etg_core::logging_facility::init_test_capture;
use etg_core::model::{CardBatch, CardRecord};
use etg_engine::SnapshotUpdater;
use etg_store::{SnapshotStore, TableMerger};
use tempfile::TempDir;

#[test]
fn test_update_logs_start_and_end() {
    let capture = init_test_capture();
    let temp_dir = TempDir::new().unwrap();
    let today = Utc::now().date_naive();
    let updater =
        SnapshotUpdater::new(SnapshotStore::new(temp_dir.path()), TableMerger::new(today));

    updater
        .update(&CardBatch::new(vec![CardRecord::new("a", "Alpha")], today), None)
        .unwrap();

    capture.assert_event_exists("snapshot_update", "start");
    capture.assert_event_exists("snapshot_update", "end");
    let end = capture
        .events_for("snapshot_update")
        .into_iter()
        .find(|e| e.event.as_deref() == Some("end"))
        .unwrap();
    assert!(end.field("duration_ms").is_some());
}

#[test]
fn test_failed_increment_logs_error_code() {
    let capture = init_test_capture();
    let temp_dir = TempDir::new().unwrap();
    let updater = SnapshotUpdater::new(
        SnapshotStore::new(temp_dir.path()),
        TableMerger::new(Utc::now().date_naive()),
    );

    assert!(updater.increment(None).is_err());

    capture.assert_event_exists("snapshot_increment", "end_error");
    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("snapshot_increment")
            && e.field("err_code") == Some("ERR_NOT_FOUND")
    });
    assert!(errors >= 1);
}
