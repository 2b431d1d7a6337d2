//! Tests for the non-interactive `run` loop.
//!
//! Covers both step limits and the deferred pops that have to be drained
//! once the last tick is done.

use std::time::Duration;

use loopviz_cli::{Format, Session, StepLimit, run_scenario};
use loopviz_core::CallStackMode;

#[tokio::test]
async fn until_idle_stops_when_queues_drain() {
    let session = Session::default();
    let scenario = session.catalog.get("starvation").unwrap();
    let mut scheduler = session.scheduler(Format::Text);
    let mut output = Vec::new();

    run_scenario(
        &mut scheduler,
        scenario,
        StepLimit::UntilIdle(100),
        Duration::ZERO,
        &mut output,
    )
    .await
    .unwrap();

    // Five promise callbacks, then the promoted timer.
    assert_eq!(scheduler.time(), 6);
    assert!(scheduler.is_idle());

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("• Executing setTimeout(0)"));
    assert!(text.ends_with("stopped at t=6 (idle: true)\n"));
}

#[tokio::test]
async fn until_idle_honours_its_bound() {
    let session = Session::default();
    let scenario = session.catalog.get("starvation").unwrap();
    let mut scheduler = session.scheduler(Format::Text);
    let mut output = Vec::new();

    run_scenario(
        &mut scheduler,
        scenario,
        StepLimit::UntilIdle(2),
        Duration::ZERO,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(scheduler.time(), 2);
    assert!(!scheduler.is_idle());
}

#[tokio::test]
async fn exactly_keeps_ticking_after_idle() {
    let session = Session::default();
    let scenario = session.catalog.get("main").unwrap();
    let mut scheduler = session.scheduler(Format::Text);
    let mut output = Vec::new();

    run_scenario(
        &mut scheduler,
        scenario,
        StepLimit::Exactly(5),
        Duration::ZERO,
        &mut output,
    )
    .await
    .unwrap();

    // `main` is idle from t=3 on; the remaining ticks still advance the clock.
    assert_eq!(scheduler.time(), 5);
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("┌─ t=5 "));
    assert!(text.ends_with("stopped at t=5 (idle: true)\n"));
}

#[tokio::test(start_paused = true)]
async fn deferred_pops_are_drained_after_last_tick() {
    let session = Session::default().with_call_stack(Some(CallStackMode::Deferred));
    let scenario = session.catalog.get("starvation").unwrap();
    let mut scheduler = session.scheduler(Format::Json);
    let mut output = Vec::new();

    run_scenario(
        &mut scheduler,
        scenario,
        StepLimit::UntilIdle(100),
        Duration::ZERO,
        &mut output,
    )
    .await
    .unwrap();

    assert!(scheduler.call_stack().is_empty());

    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let pops = lines.iter().filter(|l| l["kind"] == "pop_scheduled").count();
    assert_eq!(pops, 6);

    let stack_sizes: Vec<usize> = lines
        .iter()
        .filter(|l| l["kind"] == "render")
        .map(|r| r["call_stack"].as_array().map_or(0, Vec::len))
        .collect();
    // No time passes between ticks, so every dispatched label piles up.
    assert_eq!(stack_sizes.iter().max(), Some(&6));
    assert_eq!(stack_sizes.last(), Some(&0));
}
