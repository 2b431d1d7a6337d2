use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use loopviz_cli::{Format, Session, StepLimit};
use loopviz_core::CallStackMode;
use loopviz_core::config::parse_duration;

mod commands;

#[derive(Parser)]
#[command(
    name = "loopviz",
    about = "loopviz — step through a simulated event loop",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scenario and step through it non-interactively.
    Run {
        /// Scenario to load (built-in: main, starvation)
        #[arg(short, long, default_value = "main")]
        scenario: String,
        /// Number of ticks to run
        #[arg(short = 'n', long, default_value_t = 5, conflicts_with = "until_idle")]
        steps: usize,
        /// Step until every queue and timer is empty
        #[arg(long)]
        until_idle: bool,
        /// Upper bound on ticks for --until-idle
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
        /// Real time to wait between ticks ("0ms", "500ms", "1s").
        /// Deferred call-stack pops fire while waiting.
        #[arg(long, default_value = "0ms", value_parser = parse_interval)]
        interval: Duration,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Interactive mode: read step/load/reset commands from stdin.
    Repl {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List the scenarios that can be loaded.
    Scenarios {
        /// Path to loopviz.toml (default: ./loopviz.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Path to loopviz.toml (default: ./loopviz.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: Format,
    /// Pop the call stack after the visual delay instead of on the next
    /// dispatch. Fast stepping lets the stack grow.
    #[arg(long)]
    deferred: bool,
}

impl SessionArgs {
    fn session(&self) -> anyhow::Result<Session> {
        let mode = self.deferred.then_some(CallStackMode::Deferred);
        Ok(Session::load(self.config.as_deref())?.with_call_stack(mode))
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration: {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the rendering; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("loopviz=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            steps,
            until_idle,
            max_steps,
            interval,
            session,
        } => {
            let limit = if until_idle {
                StepLimit::UntilIdle(max_steps)
            } else {
                StepLimit::Exactly(steps)
            };
            commands::run::run(&session.session()?, &scenario, limit, interval, session.format).await
        }
        Commands::Repl { session } => {
            commands::repl::repl(&session.session()?, session.format).await
        }
        Commands::Scenarios { config } => {
            commands::scenarios::list(&Session::load(config.as_deref())?)
        }
    }
}
