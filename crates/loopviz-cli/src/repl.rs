//! Interactive command loop.
//!
//! Reads one command per line and applies it to the scheduler. Deferred
//! call-stack pops race against operator input, so stepping faster than
//! the visual delay shows the stack growing.

use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use loopviz_core::Notification;
use loopviz_scheduler::{NotificationSink, ScenarioCatalog, Scheduler};

use crate::pacing::PopTimers;
use crate::render::{Renderer, flush};

/// Largest tick count a single `step` command accepts.
pub const MAX_STEP_COUNT: usize = 10_000;

pub const HELP: &str = "\
commands:
  step [n]        advance n ticks (default 1, at most 10000)
  load <name>     reset and load a scenario
  reset           clear everything
  state           show the current queues
  check           run the starvation check now
  scenarios       list loadable scenarios
  help            show this message
  quit            leave";

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Step(usize),
    Load(String),
    Reset,
    State,
    Check,
    Scenarios,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("invalid step count: {0}")]
    InvalidCount(String),

    #[error("step count {0} exceeds the limit of {max}", max = MAX_STEP_COUNT)]
    TooManySteps(usize),

    #[error("usage: load <scenario>")]
    MissingScenario,
}

impl FromStr for ReplCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let arg = parts.next();

        match head {
            "step" | "s" => match arg {
                None => Ok(ReplCommand::Step(1)),
                Some(n) => match n.parse::<usize>() {
                    Ok(count) if count > MAX_STEP_COUNT => Err(CommandError::TooManySteps(count)),
                    Ok(count) => Ok(ReplCommand::Step(count)),
                    Err(_) => Err(CommandError::InvalidCount(n.to_string())),
                },
            },
            "load" | "l" => arg
                .map(|name| ReplCommand::Load(name.to_string()))
                .ok_or(CommandError::MissingScenario),
            "reset" | "r" => Ok(ReplCommand::Reset),
            "state" => Ok(ReplCommand::State),
            "check" => Ok(ReplCommand::Check),
            "scenarios" | "ls" => Ok(ReplCommand::Scenarios),
            "help" | "?" => Ok(ReplCommand::Help),
            "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Apply one command. Returns `false` when the loop should stop.
pub fn execute(
    command: ReplCommand,
    catalog: &ScenarioCatalog,
    scheduler: &mut Scheduler<Renderer>,
) -> bool {
    match command {
        ReplCommand::Step(n) => {
            for _ in 0..n {
                scheduler.step();
            }
        }
        ReplCommand::Load(name) => match catalog.get(&name) {
            Ok(scenario) => scheduler.load_scenario(scenario),
            Err(e) => scheduler.sink_mut().note(&e.to_string()),
        },
        ReplCommand::Reset => scheduler.reset(),
        ReplCommand::State => {
            let snapshot = scheduler.snapshot();
            scheduler.sink_mut().notify(Notification::Render(snapshot));
        }
        ReplCommand::Check => {
            if !scheduler.detect_starvation() {
                scheduler.sink_mut().note("no starvation");
            }
        }
        ReplCommand::Scenarios => {
            let lines: Vec<String> = catalog
                .iter()
                .map(|s| format!("  {:<14} {}", s.name, s.description))
                .collect();
            for line in lines {
                scheduler.sink_mut().note(&line);
            }
        }
        ReplCommand::Help => scheduler.sink_mut().note(HELP),
        ReplCommand::Quit => return false,
    }
    true
}

/// Run the command loop until `quit` or end of input.
pub async fn run_repl<R, W>(
    catalog: &ScenarioCatalog,
    scheduler: &mut Scheduler<Renderer>,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut pops = PopTimers::new();
    info!("repl started");

    loop {
        pops.arm_from(scheduler);
        flush(scheduler, output).await?;

        let next_pop = pops.next_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<ReplCommand>() {
                    Ok(command) => {
                        debug!(?command, "command");
                        if !execute(command, catalog, scheduler) {
                            break;
                        }
                    }
                    Err(e) => scheduler.sink_mut().note(&e.to_string()),
                }
            }
            _ = sleep_until(next_pop.unwrap_or_else(Instant::now)), if next_pop.is_some() => {
                pops.fire_due(Instant::now(), scheduler);
            }
        }
    }

    flush(scheduler, output).await?;
    info!("repl finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Format;

    #[test]
    fn parse_commands() {
        assert_eq!("step".parse::<ReplCommand>(), Ok(ReplCommand::Step(1)));
        assert_eq!("step 4".parse::<ReplCommand>(), Ok(ReplCommand::Step(4)));
        assert_eq!("s".parse::<ReplCommand>(), Ok(ReplCommand::Step(1)));
        assert_eq!(
            "load starvation".parse::<ReplCommand>(),
            Ok(ReplCommand::Load("starvation".to_string()))
        );
        assert_eq!("  reset ".parse::<ReplCommand>(), Ok(ReplCommand::Reset));
        assert_eq!("q".parse::<ReplCommand>(), Ok(ReplCommand::Quit));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "step many".parse::<ReplCommand>(),
            Err(CommandError::InvalidCount("many".to_string()))
        );
        assert_eq!("load".parse::<ReplCommand>(), Err(CommandError::MissingScenario));
        assert_eq!(
            "step 1000000000".parse::<ReplCommand>(),
            Err(CommandError::TooManySteps(1_000_000_000))
        );
        assert_eq!(
            "jump".parse::<ReplCommand>(),
            Err(CommandError::Unknown("jump".to_string()))
        );
    }

    #[test]
    fn execute_unknown_scenario_reports_without_reset() {
        let catalog = ScenarioCatalog::builtin();
        let mut scheduler = Scheduler::new(Renderer::new(Format::Text));
        execute(ReplCommand::Load("main".to_string()), &catalog, &mut scheduler);
        scheduler.step();
        scheduler.sink_mut().take_output();

        assert!(execute(ReplCommand::Load("ghost".to_string()), &catalog, &mut scheduler));
        assert_eq!(scheduler.time(), 1);
        assert_eq!(scheduler.sink_mut().take_output(), "unknown scenario: ghost\n");
    }

    #[test]
    fn execute_check_reports_quiet_result() {
        let catalog = ScenarioCatalog::builtin();
        let mut scheduler = Scheduler::new(Renderer::new(Format::Text));
        execute(ReplCommand::Check, &catalog, &mut scheduler);
        assert_eq!(scheduler.sink_mut().take_output(), "no starvation\n");
    }

    #[test]
    fn step_count_bound_is_inclusive() {
        let max = format!("step {MAX_STEP_COUNT}");
        assert_eq!(max.parse::<ReplCommand>(), Ok(ReplCommand::Step(MAX_STEP_COUNT)));
        let over = format!("step {}", MAX_STEP_COUNT + 1);
        assert_eq!(
            over.parse::<ReplCommand>(),
            Err(CommandError::TooManySteps(MAX_STEP_COUNT + 1))
        );
    }

    #[test]
    fn execute_quit_stops() {
        let catalog = ScenarioCatalog::builtin();
        let mut scheduler = Scheduler::new(Renderer::new(Format::Text));
        assert!(!execute(ReplCommand::Quit, &catalog, &mut scheduler));
    }

    #[tokio::test]
    async fn repl_runs_script_to_end_of_input() {
        let catalog = ScenarioCatalog::builtin();
        let mut scheduler = Scheduler::new(Renderer::new(Format::Text));
        let input: &[u8] = b"load main\nstep 2\n\nbogus\n";
        let mut output = Vec::new();

        run_repl(&catalog, &mut scheduler, input, &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("• main() executed"));
        assert!(text.contains("• Executing Promise.then()"));
        assert!(text.contains("• Executing setTimeout(1)"));
        assert!(text.contains("unknown command: bogus"));
        assert_eq!(scheduler.time(), 2);
    }
}
