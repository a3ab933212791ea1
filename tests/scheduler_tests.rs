//! Scheduler behavior: startup drain, recovery, periodic ticks, shutdown.

mod support;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use powerpos::core::dlq::DeadLetterQueue;
use powerpos::core::domain::{FailedExtraction, Trade};
use powerpos::core::service::shutdown_channel;

use support::rig::{Rig, RigOptions, DEFAULT_NOW};
use support::source::ScriptedTradeSource;

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn seeded_entry(time: &str, retry_count: u32) -> FailedExtraction {
    FailedExtraction::new(
        utc(time),
        utc("2025-12-09T12:00:00Z"),
        retry_count,
        "All retry attempts exhausted",
    )
}

async fn wait_for<F: Fn() -> bool>(condition: F, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn startup_drains_dlq_then_runs_initial_extraction() {
    let source = ScriptedTradeSource::always(vec![Trade::flat(
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        10.0,
    )]);
    let rig = Rig::new(source, RigOptions::default());
    rig.dlq
        .enqueue(seeded_entry("2025-12-09T10:00:00Z", 5))
        .unwrap();

    let (trigger, shutdown) = shutdown_channel();
    let scheduler = rig.scheduler(Duration::from_secs(300), shutdown);
    let handle = tokio::spawn(async move { scheduler.run().await });

    wait_for(|| rig.audit_rows().len() >= 2, "recovery and initial run").await;
    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    assert_eq!(rig.dlq.count().unwrap(), 0);

    let rows = rig.audit_rows();
    assert!(
        rows[0].contains(",RecoveredFromDLQ,6,"),
        "unexpected row: {}",
        rows[0]
    );
    assert!(rows[1].contains(",Done,1,"), "unexpected row: {}", rows[1]);

    // One snapshot from the replay, one from the initial run.
    assert_eq!(rig.report_files().len(), 2);
}

#[tokio::test]
async fn failed_recovery_re_enqueues_with_incremented_retry_count() {
    let source = ScriptedTradeSource::always_failing("still down");
    let rig = Rig::new(source, RigOptions::default());
    let seeded_time = utc("2025-12-09T10:00:00Z");
    rig.dlq.enqueue(seeded_entry("2025-12-09T10:00:00Z", 2)).unwrap();

    let (trigger, shutdown) = shutdown_channel();
    let scheduler = rig.scheduler(Duration::from_secs(300), shutdown);
    let handle = tokio::spawn(async move { scheduler.run().await });

    // One replay row plus the initial run's three attempts.
    wait_for(|| rig.audit_rows().len() >= 4, "replay and initial run").await;
    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    let entries = rig.dlq.peek_all().unwrap();
    assert_eq!(entries.len(), 2);

    let replayed = entries
        .iter()
        .find(|e| e.extraction_time_utc == seeded_time)
        .expect("seeded entry still queued");
    assert_eq!(replayed.retry_count, 3);
    assert_eq!(replayed.failed_at_utc, utc(DEFAULT_NOW));

    let rows = rig.audit_rows();
    assert!(rows[0].contains(",Failed,3,"), "unexpected row: {}", rows[0]);
}

#[tokio::test]
async fn drain_replays_entries_oldest_first() {
    let source = ScriptedTradeSource::always(vec![Trade::flat(
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        1.0,
    )]);
    let rig = Rig::new(source, RigOptions::default());
    rig.dlq.enqueue(seeded_entry("2025-12-09T11:00:00Z", 3)).unwrap();
    rig.dlq.enqueue(seeded_entry("2025-12-08T10:00:00Z", 3)).unwrap();

    let (trigger, shutdown) = shutdown_channel();
    let scheduler = rig.scheduler(Duration::from_secs(300), shutdown);
    let handle = tokio::spawn(async move { scheduler.run().await });

    wait_for(|| rig.source.fetch_count() >= 3, "two replays and initial run").await;
    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    let dates = rig.source.requested_dates();
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
    assert_eq!(dates[1], NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
    assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
}

#[tokio::test]
async fn periodic_ticks_keep_extracting() {
    let source = ScriptedTradeSource::always(vec![Trade::flat(
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        1.0,
    )]);
    let rig = Rig::new(source, RigOptions::default());

    let (trigger, shutdown) = shutdown_channel();
    let scheduler = rig.scheduler(Duration::from_millis(50), shutdown);
    let handle = tokio::spawn(async move { scheduler.run().await });

    wait_for(|| rig.source.fetch_count() >= 3, "initial run plus ticks").await;
    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    assert!(rig.source.fetch_count() >= 3);
}

#[tokio::test]
async fn cancelled_drain_requeues_entries_unchanged() {
    let source = ScriptedTradeSource::always(vec![Trade::flat(
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        1.0,
    )]);
    let rig = Rig::new(source, RigOptions::default());
    rig.dlq.enqueue(seeded_entry("2025-12-08T10:00:00Z", 4)).unwrap();
    rig.dlq.enqueue(seeded_entry("2025-12-09T10:00:00Z", 7)).unwrap();

    let (trigger, shutdown) = shutdown_channel();
    trigger.trigger();

    let scheduler = rig.scheduler(Duration::from_secs(300), shutdown);
    tokio::time::timeout(Duration::from_secs(2), scheduler.run())
        .await
        .expect("scheduler did not stop");

    // Nothing replayed, nothing lost, retry counts untouched.
    assert_eq!(rig.source.fetch_count(), 0);
    let entries = rig.dlq.peek_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].retry_count, 4);
    assert_eq!(entries[1].retry_count, 7);
}

#[tokio::test]
async fn already_cancelled_scheduler_does_no_work() {
    let source = ScriptedTradeSource::always(vec![Trade::flat(
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
        1.0,
    )]);
    let rig = Rig::new(source, RigOptions::default());

    let (trigger, shutdown) = shutdown_channel();
    trigger.trigger();

    let scheduler = rig.scheduler(Duration::from_secs(300), shutdown);
    tokio::time::timeout(Duration::from_secs(2), scheduler.run())
        .await
        .expect("scheduler did not stop");

    assert_eq!(rig.source.fetch_count(), 0);
    assert!(rig.audit_rows().is_empty());
}
