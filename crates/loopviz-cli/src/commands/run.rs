//! `loopviz run` — load a scenario and step through it.

use std::time::Duration;

use tracing::info;

use loopviz_cli::{Format, Session, StepLimit, run_scenario};

pub async fn run(
    session: &Session,
    scenario: &str,
    limit: StepLimit,
    interval: Duration,
    format: Format,
) -> anyhow::Result<()> {
    let scenario = session.catalog.get(scenario)?;
    let mut scheduler = session.scheduler(format);
    let mut stdout = tokio::io::stdout();

    run_scenario(&mut scheduler, scenario, limit, interval, &mut stdout).await?;

    info!(scenario = %scenario.name, ticks = scheduler.time(), "run finished");
    Ok(())
}
