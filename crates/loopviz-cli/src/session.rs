//! Resolves `loopviz.toml` into what a run needs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use loopviz_core::{CallStackMode, CoreResult, LoopvizConfig};
use loopviz_scheduler::{Policy, ScenarioCatalog, Scheduler};

use crate::render::{Format, Renderer};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "loopviz.toml";

/// Policy plus every scenario the operator can load.
#[derive(Debug, Clone)]
pub struct Session {
    pub policy: Policy,
    pub catalog: ScenarioCatalog,
}

impl Session {
    /// Load from `path`, or from `./loopviz.toml` if it exists, or defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let resolved: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.is_file().then_some(local)
            }
        };

        let config = match &resolved {
            Some(p) => {
                info!(path = %p.display(), "loading config");
                LoopvizConfig::from_file(p)
                    .with_context(|| format!("loading {}", p.display()))?
            }
            None => {
                debug!("no config file, using defaults");
                LoopvizConfig::default()
            }
        };

        Ok(Self::from_config(&config)?)
    }

    pub fn from_config(config: &LoopvizConfig) -> CoreResult<Self> {
        Ok(Self {
            policy: Policy::from_config(&config.policy)?,
            catalog: ScenarioCatalog::with_configured(&config.scenarios)?,
        })
    }

    /// Override the call-stack mode from the command line.
    pub fn with_call_stack(mut self, mode: Option<CallStackMode>) -> Self {
        if let Some(mode) = mode {
            self.policy = self.policy.with_call_stack(mode);
        }
        self
    }

    /// A fresh scheduler rendering in `format`.
    pub fn scheduler(&self, format: Format) -> Scheduler<Renderer> {
        Scheduler::with_policy(self.policy, Renderer::new(format))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            catalog: ScenarioCatalog::builtin(),
        }
    }
}
