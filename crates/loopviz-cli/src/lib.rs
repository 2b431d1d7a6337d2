//! loopviz-cli — terminal shell for the event-loop simulation.
//!
//! The scheduler only emits notifications. This crate is the collaborator
//! on the other side: it renders them as text or JSON lines, keeps the
//! deferred call-stack pops on a real clock, and reads operator commands.
//!
//! # Modules
//!
//! - **`render`** — [`Renderer`], a `NotificationSink` that formats output
//! - **`session`** — config loading into a policy and scenario catalog
//! - **`pacing`** — tokio timers for deferred call-stack pops
//! - **`repl`** — the interactive command loop
//! - **`runner`** — non-interactive `run` over a fixed number of ticks

pub mod pacing;
pub mod render;
pub mod repl;
pub mod runner;
pub mod session;

pub use pacing::PopTimers;
pub use render::{Format, Renderer, flush};
pub use repl::{ReplCommand, run_repl};
pub use runner::{StepLimit, run_scenario};
pub use session::Session;
