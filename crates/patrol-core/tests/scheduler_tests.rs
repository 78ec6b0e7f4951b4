mod common;

use std::time::Duration;

use common::{create_monthly_plan, create_site, create_test_engine, march};
use jiff::{
    civil::{date, time},
    tz::TimeZone,
};
use patrol_core::{params::ListOrders, Scheduler, SweepSchedule};
use tokio::time::Instant;

#[tokio::test]
async fn test_run_now_publishes_report() {
    let (_temp_dir, engine, _clock) = create_test_engine(march(15)).await;
    let site = create_site(&engine).await;
    let plan = create_monthly_plan(&engine, &site, 15).await;

    let handle = Scheduler::start(engine.clone(), SweepSchedule::default());
    let mut reports = handle.reports();
    assert!(reports.borrow().is_none());
    assert!(handle.is_running());

    handle.run_now();
    tokio::time::timeout(Duration::from_secs(10), reports.changed())
        .await
        .expect("Sweep did not run in time")
        .expect("Scheduler went away");

    let report = reports
        .borrow_and_update()
        .clone()
        .expect("Report should be published");
    assert_eq!(report.fired.len(), 1);
    assert_eq!(report.fired[0].plan_id, plan.id);

    handle.stop().await.expect("Failed to stop scheduler");
}

#[tokio::test]
async fn test_stop_before_first_sweep() {
    let (_temp_dir, engine, _clock) = create_test_engine(march(15)).await;

    let handle = Scheduler::start(engine, SweepSchedule::default());
    let reports = handle.reports();
    handle.stop().await.expect("Failed to stop scheduler");

    assert!(reports.borrow().is_none(), "No sweep ran");
}

#[tokio::test]
async fn test_stop_waits_for_running_sweep() {
    let (_temp_dir, engine, _clock) = create_test_engine(march(15)).await;
    let site = create_site(&engine).await;
    for _ in 0..20 {
        create_monthly_plan(&engine, &site, 15).await;
    }

    let handle = Scheduler::start(engine.clone(), SweepSchedule::default());
    let reports = handle.reports();
    handle.run_now();
    tokio::time::sleep(Duration::from_millis(5)).await;
    handle.stop().await.expect("Failed to stop scheduler");

    let report = reports
        .borrow()
        .clone()
        .expect("The requested sweep finishes before the loop exits");
    assert_eq!(report.fired.len(), 20);
    assert!(report.failed.is_empty());

    // Every fired plan has its order and nothing was left half-done
    let orders = engine
        .list_orders(&ListOrders::default())
        .await
        .expect("Failed to list orders");
    assert_eq!(orders.len(), report.fired.len());
    for order in &orders {
        assert_eq!(order.total_checks, 3);
    }
}

#[tokio::test(start_paused = true)]
async fn test_interval_schedule_sweeps_repeatedly() {
    let (_temp_dir, engine, _clock) = create_test_engine(march(15)).await;
    let site = create_site(&engine).await;
    let plan = create_monthly_plan(&engine, &site, 15).await;

    let handle = Scheduler::start(engine, SweepSchedule::Every(Duration::from_secs(3600)));
    let mut reports = handle.reports();

    reports.changed().await.expect("Scheduler went away");
    let first = reports
        .borrow_and_update()
        .clone()
        .expect("First report");
    assert_eq!(first.fired.len(), 1);

    // The clock has not moved to another day, so the plan stays quiet
    reports.changed().await.expect("Scheduler went away");
    let second = reports
        .borrow_and_update()
        .clone()
        .expect("Second report");
    assert!(second.fired.is_empty());
    assert_eq!(second.skipped, vec![plan.id]);

    handle.stop().await.expect("Failed to stop scheduler");
}

#[tokio::test(start_paused = true)]
async fn test_daily_deadline_follows_wall_clock_jump() {
    let (_temp_dir, engine, clock) = create_test_engine(march(15)).await;
    let site = create_site(&engine).await;
    create_monthly_plan(&engine, &site, 15).await;

    // The evening before, thirteen hours ahead of the 09:00:30 sweep
    clock.set(
        date(2024, 3, 14)
            .at(20, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .expect("valid test instant"),
    );
    let handle = Scheduler::start(engine, SweepSchedule::DailyAt(time(9, 0, 30, 0)));
    let mut reports = handle.reports();
    let started = Instant::now();

    // Host resumes from suspend at the deadline's morning
    tokio::time::sleep(Duration::from_secs(1)).await;
    clock.set(march(15));

    reports.changed().await.expect("Scheduler went away");
    assert!(
        started.elapsed() < Duration::from_secs(180),
        "Sweep ran after {:?} instead of right after the clock jump",
        started.elapsed()
    );
    let report = reports.borrow_and_update().clone().expect("Report");
    assert_eq!(report.fired.len(), 1);

    handle.stop().await.expect("Failed to stop scheduler");
}
