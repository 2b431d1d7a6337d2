//! Demo scenarios that seed the scheduler.
//!
//! Two scenarios are built in (`main`, `starvation`). More can be declared
//! in `loopviz.toml` and are collected with the built-ins in a
//! [`ScenarioCatalog`].

use std::fmt;

use loopviz_core::{ConfigError, CoreError, CoreResult, ScenarioConfig};

/// A timer to arm when a scenario loads, `delay` ticks after the load tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSeed {
    pub label: String,
    pub delay: u64,
}

impl TimerSeed {
    pub fn new(label: impl Into<String>, delay: u64) -> Self {
        Self {
            label: label.into(),
            delay,
        }
    }
}

/// Initial contents of the queues plus the line logged on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub opening_log: String,
    pub microtasks: Vec<String>,
    pub macrotasks: Vec<String>,
    pub timers: Vec<TimerSeed>,
}

impl Scenario {
    /// A script that resolves one promise and arms two timers.
    pub fn main() -> Self {
        Self {
            name: ScenarioName::Main.to_string(),
            description: "One promise callback and two timers (1 and 3 ticks)".to_string(),
            opening_log: "main() executed".to_string(),
            microtasks: vec!["Promise.then()".to_string()],
            macrotasks: Vec::new(),
            timers: vec![
                TimerSeed::new("setTimeout(1)", 1),
                TimerSeed::new("setTimeout(3)", 3),
            ],
        }
    }

    /// A burst of promise callbacks queued ahead of a zero-delay timer.
    pub fn starvation() -> Self {
        Self {
            name: ScenarioName::Starvation.to_string(),
            description: "Five promise callbacks holding back a setTimeout(0)".to_string(),
            opening_log: "🔥 Infinite microtask loop started".to_string(),
            microtasks: vec!["Promise.then()".to_string(); 5],
            macrotasks: Vec::new(),
            timers: vec![TimerSeed::new("setTimeout(0)", 1)],
        }
    }

    pub fn builtin(name: ScenarioName) -> Self {
        match name {
            ScenarioName::Main => Self::main(),
            ScenarioName::Starvation => Self::starvation(),
        }
    }
}

impl From<&ScenarioConfig> for Scenario {
    fn from(config: &ScenarioConfig) -> Self {
        let name = config.name.trim().to_string();
        Self {
            description: config.description.clone().unwrap_or_default(),
            opening_log: config
                .log
                .clone()
                .unwrap_or_else(|| format!("{name} loaded")),
            microtasks: config.microtasks.clone(),
            macrotasks: config.macrotasks.clone(),
            timers: config
                .timers
                .iter()
                .map(|t| TimerSeed::new(t.label.clone(), t.delay))
                .collect(),
            name,
        }
    }
}

/// Names of the built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioName {
    Main,
    Starvation,
}

impl ScenarioName {
    pub const ALL: [ScenarioName; 2] = [ScenarioName::Main, ScenarioName::Starvation];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioName::Main => "main",
            ScenarioName::Starvation => "starvation",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in scenarios followed by the ones declared in config.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Catalog holding only the built-ins.
    pub fn builtin() -> Self {
        Self {
            scenarios: ScenarioName::ALL.into_iter().map(Scenario::builtin).collect(),
        }
    }

    /// Built-ins plus `extra`. Names must be unique across both.
    pub fn with_configured(extra: &[ScenarioConfig]) -> CoreResult<Self> {
        let mut catalog = Self::builtin();
        for config in extra {
            catalog.add(Scenario::from(config))?;
        }
        Ok(catalog)
    }

    pub fn add(&mut self, scenario: Scenario) -> CoreResult<()> {
        if scenario.name.is_empty() {
            return Err(ConfigError::EmptyScenarioName.into());
        }
        if self.scenarios.iter().any(|s| s.name == scenario.name) {
            return Err(ConfigError::DuplicateScenario(scenario.name).into());
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    pub fn get(&self, name: &str) -> CoreResult<&Scenario> {
        let name = name.trim();
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CoreError::UnknownScenario(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
