//! Fixed scheduling and presentation constants, resolved from config.

use std::time::Duration;

use loopviz_core::config::{DEFAULT_HIGHLIGHT, DEFAULT_STARVATION_THRESHOLD, DEFAULT_VISUAL_DELAY};
use loopviz_core::{CallStackMode, ConfigError, PolicyConfig};

/// Resolved policy a [`Scheduler`](crate::Scheduler) runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Starvation is reported when more than this many microtasks are
    /// pending alongside at least one macrotask.
    pub starvation_threshold: usize,
    /// How long a dispatched label stays visible in deferred mode.
    pub visual_delay: Duration,
    /// Length of the call-stack highlight pulse.
    pub highlight: Duration,
    pub call_stack: CallStackMode,
}

impl Policy {
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            starvation_threshold: config.starvation_threshold(),
            visual_delay: config.visual_delay()?,
            highlight: config.highlight()?,
            call_stack: config.call_stack(),
        })
    }

    pub fn with_call_stack(mut self, mode: CallStackMode) -> Self {
        self.call_stack = mode;
        self
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            visual_delay: DEFAULT_VISUAL_DELAY,
            highlight: DEFAULT_HIGHLIGHT,
            call_stack: CallStackMode::PopOnDispatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_config_defaults() {
        let from_config = Policy::from_config(&PolicyConfig::default()).unwrap();
        assert_eq!(from_config, Policy::default());
        assert_eq!(from_config.starvation_threshold, 3);
        assert_eq!(from_config.visual_delay, Duration::from_millis(300));
    }

    #[test]
    fn from_config_propagates_bad_durations() {
        let config = PolicyConfig {
            highlight: Some("a while".to_string()),
            ..PolicyConfig::default()
        };
        assert!(Policy::from_config(&config).is_err());
    }
}
