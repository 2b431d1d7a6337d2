//! Shared types used across loopviz crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical clock value. One tick per scheduler step.
pub type Tick = u64;

/// A unit of work waiting in the microtask or macrotask queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    label: String,
    created_at: Tick,
}

impl Task {
    pub fn new(label: impl Into<String>, created_at: Tick) -> Self {
        Self {
            label: label.into(),
            created_at,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tick at which the task was enqueued.
    pub fn created_at(&self) -> Tick {
        self.created_at
    }
}

/// A delayed unit of work that becomes a macrotask once `due_time` is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    label: String,
    due_time: Tick,
}

impl Timer {
    pub fn new(label: impl Into<String>, due_time: Tick) -> Self {
        Self {
            label: label.into(),
            due_time,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Absolute tick at which the timer fires.
    pub fn due_time(&self) -> Tick {
        self.due_time
    }

    /// Whether the timer has fired by `now`.
    pub fn is_due(&self, now: Tick) -> bool {
        self.due_time <= now
    }
}

/// A visual region of the event-loop diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[serde(rename = "callstack")]
    CallStack,
    Microtasks,
    Macrotasks,
    Timers,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::CallStack => "callstack",
            Region::Microtasks => "microtasks",
            Region::Macrotasks => "macrotasks",
            Region::Timers => "timers",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The queue a dispatched task was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    Microtasks,
    Macrotasks,
}

impl QueueKind {
    pub fn region(&self) -> Region {
        match self {
            QueueKind::Microtasks => Region::Microtasks,
            QueueKind::Macrotasks => Region::Macrotasks,
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.region().as_str())
    }
}

/// Read-only view of the scheduler handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: Tick,
    pub call_stack: Vec<String>,
    pub microtasks: Vec<String>,
    pub macrotasks: Vec<String>,
    pub timers: Vec<String>,
    pub starving: bool,
}

/// Events the scheduler emits to its rendering collaborator.
///
/// The collaborator only observes; it has no write access back into the
/// scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Full state after a state-changing operation.
    Render(Snapshot),
    /// Append-only log line.
    Log { line: String },
    /// The log panel should be emptied.
    LogCleared,
    /// Transient visual pulse on a region.
    Highlight { region: Region, duration_ms: u64 },
    /// Region enters the "starving" visual state.
    Starving { region: Region },
    /// Region leaves the "starving" visual state.
    StarvingCleared { region: Region },
    /// The shell should call `pop_call_stack` after `delay_ms`.
    PopScheduled { delay_ms: u64 },
}

impl Notification {
    pub fn log(line: impl Into<String>) -> Self {
        Notification::Log { line: line.into() }
    }

    /// The log line carried by this notification, if any.
    pub fn as_log(&self) -> Option<&str> {
        match self {
            Notification::Log { line } => Some(line),
            _ => None,
        }
    }

    pub fn as_render(&self) -> Option<&Snapshot> {
        match self {
            Notification::Render(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_due_at_and_after_due_time() {
        let timer = Timer::new("setTimeout(3)", 3);
        assert!(!timer.is_due(2));
        assert!(timer.is_due(3));
        assert!(timer.is_due(4));
    }

    #[test]
    fn region_names_match_diagram_ids() {
        assert_eq!(Region::CallStack.to_string(), "callstack");
        assert_eq!(Region::Macrotasks.to_string(), "macrotasks");
        assert_eq!(QueueKind::Microtasks.region(), Region::Microtasks);
    }

    #[test]
    fn notification_serializes_with_kind_tag() {
        let json = serde_json::to_value(Notification::Highlight {
            region: Region::CallStack,
            duration_ms: 400,
        })
        .unwrap();
        assert_eq!(json["kind"], "highlight");
        assert_eq!(json["region"], "callstack");
        assert_eq!(json["duration_ms"], 400);
    }

    #[test]
    fn render_notification_flattens_snapshot() {
        let snapshot = Snapshot {
            time: 2,
            call_stack: vec!["Promise.then()".to_string()],
            ..Snapshot::default()
        };
        let json = serde_json::to_value(Notification::Render(snapshot)).unwrap();
        assert_eq!(json["kind"], "render");
        assert_eq!(json["time"], 2);
        assert_eq!(json["call_stack"][0], "Promise.then()");
    }

    #[test]
    fn log_accessor() {
        assert_eq!(Notification::log("main() executed").as_log(), Some("main() executed"));
        assert_eq!(Notification::LogCleared.as_log(), None);
    }
}
