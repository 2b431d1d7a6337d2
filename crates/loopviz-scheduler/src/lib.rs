//! loopviz-scheduler — the event-loop state machine.
//!
//! Advances a simulated event loop one discrete tick at a time. Each tick:
//!
//! - Promotes due timers into the macrotask queue
//! - Dispatches at most one task, microtasks strictly before macrotasks
//! - Reports macrotask starvation when nothing was dispatched
//!
//! # Architecture
//!
//! ```text
//! Scheduler<S: NotificationSink>
//!   ├── clock (logical ticks)
//!   ├── call stack
//!   ├── microtask queue (FIFO)
//!   ├── macrotask queue (FIFO)
//!   ├── TimerSet (sorted by due tick, stable)
//!   └── sink ──► renderer (snapshots, log lines, highlights)
//! ```
//!
//! The scheduler never renders anything itself. Everything a viewer sees
//! goes through the [`NotificationSink`] it was built with.

pub mod policy;
pub mod scenario;
pub mod scheduler;
pub mod sink;
pub mod timer_set;

pub use policy::Policy;
pub use scenario::{Scenario, ScenarioCatalog, ScenarioName, TimerSeed};
pub use scheduler::{Dispatch, Scheduler, StepOutcome};
pub use sink::{NotificationSink, NullSink};
pub use timer_set::TimerSet;
