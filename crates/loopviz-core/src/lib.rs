//! loopviz-core — shared types for the event-loop visualizer.
//!
//! Holds the value types that cross crate boundaries: tasks and timers,
//! the render [`Snapshot`], the [`Notification`] stream the scheduler emits
//! to its rendering collaborator, and the `loopviz.toml` configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CallStackMode, LoopvizConfig, PolicyConfig, ScenarioConfig, TimerConfig};
pub use error::{ConfigError, CoreError, CoreResult};
pub use types::*;
