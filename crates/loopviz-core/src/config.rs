//! loopviz.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default microtask backlog above which starvation is reported.
pub const DEFAULT_STARVATION_THRESHOLD: usize = 3;
/// Default time a dispatched label stays on the call stack in deferred mode.
pub const DEFAULT_VISUAL_DELAY: Duration = Duration::from_millis(300);
/// Default length of the call-stack highlight pulse.
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopvizConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default, rename = "scenario", skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioConfig>,
}

/// How the call stack entry of a dispatched task is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStackMode {
    /// The previous entry is popped synchronously when the next task is
    /// dispatched. The stack never holds more than one label.
    #[default]
    PopOnDispatch,
    /// The entry is popped by the shell after the visual delay. Stepping
    /// faster than the delay lets the stack grow.
    Deferred,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub starvation_threshold: Option<usize>,
    pub visual_delay: Option<String>,
    pub highlight: Option<String>,
    pub call_stack: Option<CallStackMode>,
}

impl PolicyConfig {
    pub fn starvation_threshold(&self) -> usize {
        self.starvation_threshold.unwrap_or(DEFAULT_STARVATION_THRESHOLD)
    }

    pub fn visual_delay(&self) -> Result<Duration, ConfigError> {
        resolve_duration("visual_delay", self.visual_delay.as_deref(), DEFAULT_VISUAL_DELAY)
    }

    pub fn highlight(&self) -> Result<Duration, ConfigError> {
        resolve_duration("highlight", self.highlight.as_deref(), DEFAULT_HIGHLIGHT)
    }

    pub fn call_stack(&self) -> CallStackMode {
        self.call_stack.unwrap_or_default()
    }
}

/// A user-defined scenario declared with `[[scenario]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub description: Option<String>,
    /// Line logged when the scenario is loaded.
    pub log: Option<String>,
    #[serde(default)]
    pub microtasks: Vec<String>,
    #[serde(default)]
    pub macrotasks: Vec<String>,
    #[serde(default)]
    pub timers: Vec<TimerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    pub label: String,
    /// Ticks after load at which the timer fires.
    pub delay: u64,
}

impl LoopvizConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check durations and scenario names without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.visual_delay()?;
        self.policy.highlight()?;

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            let name = scenario.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyScenarioName);
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateScenario(name.to_string()));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for LoopvizConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: LoopvizConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn resolve_duration(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: LoopvizConfig = "".parse().unwrap();
        assert_eq!(config.policy.starvation_threshold(), 3);
        assert_eq!(config.policy.visual_delay().unwrap(), Duration::from_millis(300));
        assert_eq!(config.policy.highlight().unwrap(), Duration::from_millis(400));
        assert_eq!(config.policy.call_stack(), CallStackMode::PopOnDispatch);
        assert!(config.scenarios.is_empty());
    }

    #[test]
    fn parse_policy_and_scenarios() {
        let toml_str = r#"
[policy]
starvation_threshold = 5
visual_delay = "1s"
highlight = "250ms"
call_stack = "deferred"

[[scenario]]
name = "two-timers"
description = "Two timers racing"
log = "script started"
microtasks = ["queueMicrotask()"]
timers = [
    { label = "setTimeout(2)", delay = 2 },
    { label = "setTimeout(1)", delay = 1 },
]
"#;
        let config: LoopvizConfig = toml_str.parse().unwrap();
        assert_eq!(config.policy.starvation_threshold(), 5);
        assert_eq!(config.policy.visual_delay().unwrap(), Duration::from_secs(1));
        assert_eq!(config.policy.highlight().unwrap(), Duration::from_millis(250));
        assert_eq!(config.policy.call_stack(), CallStackMode::Deferred);

        assert_eq!(config.scenarios.len(), 1);
        let scenario = &config.scenarios[0];
        assert_eq!(scenario.name, "two-timers");
        assert_eq!(scenario.log.as_deref(), Some("script started"));
        assert!(scenario.macrotasks.is_empty());
        assert_eq!(scenario.timers.len(), 2);
        assert_eq!(scenario.timers[1].delay, 1);
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = "[policy]\nvisual_delay = \"soon\"\n"
            .parse::<LoopvizConfig>()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration { field: "visual_delay", .. }
        ));
    }

    #[test]
    fn duplicate_scenarios_are_rejected() {
        let toml_str = r#"
[[scenario]]
name = "burst"

[[scenario]]
name = "burst"
"#;
        let err = toml_str.parse::<LoopvizConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateScenario(name) if name == "burst"));
    }

    #[test]
    fn blank_scenario_name_is_rejected() {
        let err = "[[scenario]]\nname = \"  \"\n"
            .parse::<LoopvizConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyScenarioName));
    }

    #[test]
    fn unknown_call_stack_mode_fails_to_parse() {
        let err = "[policy]\ncall_stack = \"sometimes\"\n"
            .parse::<LoopvizConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loopviz.toml");
        std::fs::write(&path, "[policy]\nstarvation_threshold = 1\n").unwrap();

        let config = LoopvizConfig::from_file(&path).unwrap();
        assert_eq!(config.policy.starvation_threshold(), 1);
    }

    #[test]
    fn from_file_missing_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = LoopvizConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = LoopvizConfig::default();
        config.policy.call_stack = Some(CallStackMode::Deferred);
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("deferred"));
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
        assert_eq!(parse_duration("2s"), Some(Duration::from_secs(2)));
        assert_eq!(parse_duration("1m"), Some(Duration::from_secs(60)));
        assert_eq!(parse_duration("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration("fast"), None);
    }
}
