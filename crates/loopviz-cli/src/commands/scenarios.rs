use loopviz_cli::Session;

pub fn list(session: &Session) -> anyhow::Result<()> {
    for scenario in session.catalog.iter() {
        println!("{:<14} {}", scenario.name, scenario.description);
        println!(
            "{:<14} {} microtask(s), {} macrotask(s), {} timer(s)",
            "",
            scenario.microtasks.len(),
            scenario.macrotasks.len(),
            scenario.timers.len()
        );
    }
    Ok(())
}
