//! `loopviz repl` — interactive stepping on stdin.

use tokio::io::BufReader;

use loopviz_cli::repl::HELP;
use loopviz_cli::{Format, Session, run_repl};

pub async fn repl(session: &Session, format: Format) -> anyhow::Result<()> {
    let mut scheduler = session.scheduler(format);
    scheduler.sink_mut().note(HELP);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_repl(&session.catalog, &mut scheduler, stdin, &mut stdout).await
}
