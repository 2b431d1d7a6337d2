//! Non-interactive stepping through a loaded scenario.

use std::time::Duration;

use tokio::io::AsyncWrite;
use tracing::debug;

use loopviz_scheduler::{Scenario, Scheduler};

use crate::pacing::PopTimers;
use crate::render::{Renderer, flush};

/// How many ticks a run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepLimit {
    Exactly(usize),
    /// Stop once idle, or after this many ticks.
    UntilIdle(usize),
}

/// Load `scenario` and step it, waiting `interval` between ticks.
///
/// Deferred pops fire during the waits. Any still armed after the last
/// tick are drained before returning, so the call stack ends empty.
pub async fn run_scenario<W>(
    scheduler: &mut Scheduler<Renderer>,
    scenario: &Scenario,
    limit: StepLimit,
    interval: Duration,
    output: &mut W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut pops = PopTimers::new();

    scheduler.load_scenario(scenario);
    flush(scheduler, output).await?;

    let (max, stop_when_idle) = match limit {
        StepLimit::Exactly(n) => (n, false),
        StepLimit::UntilIdle(n) => (n, true),
    };

    for _ in 0..max {
        if stop_when_idle && scheduler.is_idle() {
            debug!(time = scheduler.time(), "idle, stopping early");
            break;
        }
        scheduler.step();
        pops.arm_from(scheduler);
        flush(scheduler, output).await?;

        pops.wait(interval, scheduler).await;
        flush(scheduler, output).await?;
    }

    pops.drain(scheduler).await;
    let summary = format!("stopped at t={} (idle: {})", scheduler.time(), scheduler.is_idle());
    scheduler.sink_mut().note(&summary);
    flush(scheduler, output).await
}
