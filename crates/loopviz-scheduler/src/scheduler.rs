//! Scheduler — the discrete-tick event loop.
//!
//! The `Scheduler` owns every queue and the logical clock. Nothing happens
//! unless the operator calls one of its control operations:
//! - `step` advances the clock by one tick and dispatches at most one task
//! - `load_scenario` resets and seeds the queues
//! - `reset` returns to the empty initial state
//!
//! Every operation is total. Queue removals are guarded by emptiness checks
//! and there is no input the scheduler can reject.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, warn};

use loopviz_core::{CallStackMode, Notification, QueueKind, Region, Snapshot, Task, Tick, Timer};

use crate::policy::Policy;
use crate::scenario::{Scenario, ScenarioName};
use crate::sink::{NotificationSink, NullSink};
use crate::timer_set::TimerSet;

/// A task taken off a queue and pushed onto the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub label: String,
    pub source: QueueKind,
}

/// What a single `step` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Clock value after the step.
    pub time: Tick,
    /// Labels of timers moved into the macrotask queue, in firing order.
    pub promoted: Vec<String>,
    pub dispatched: Option<Dispatch>,
    /// Whether starvation was reported on this step.
    pub starvation: bool,
}

/// The event-loop state machine.
///
/// One instance per session. Notifications go to `S`; the scheduler keeps
/// no reference to any renderer beyond that.
pub struct Scheduler<S = NullSink> {
    policy: Policy,
    time: Tick,
    call_stack: VecDeque<String>,
    microtasks: VecDeque<Task>,
    macrotasks: VecDeque<Task>,
    timers: TimerSet,
    /// Macrotask region is shown as starving. Cleared only by `reset`.
    starving: bool,
    sink: S,
}

impl<S: NotificationSink> Scheduler<S> {
    /// Create an empty scheduler with the default policy.
    pub fn new(sink: S) -> Self {
        Self::with_policy(Policy::default(), sink)
    }

    pub fn with_policy(policy: Policy, sink: S) -> Self {
        Self {
            policy,
            time: 0,
            call_stack: VecDeque::new(),
            microtasks: VecDeque::new(),
            macrotasks: VecDeque::new(),
            timers: TimerSet::new(),
            starving: false,
            sink,
        }
    }

    /// Advance the clock by one tick.
    ///
    /// Due timers are promoted first. Then one microtask is dispatched if any
    /// are pending, otherwise one macrotask. If both queues are empty the
    /// starvation check runs instead.
    pub fn step(&mut self) -> StepOutcome {
        self.time += 1;
        let promoted = self.promote_timers();

        let dispatched = if let Some(task) = self.microtasks.pop_front() {
            Some(self.dispatch(task, QueueKind::Microtasks))
        } else if let Some(task) = self.macrotasks.pop_front() {
            Some(self.dispatch(task, QueueKind::Macrotasks))
        } else {
            None
        };

        let starvation = if dispatched.is_none() {
            let fired = self.detect_starvation();
            self.render();
            fired
        } else {
            false
        };

        debug!(
            time = self.time,
            promoted = promoted.len(),
            dispatched = dispatched.as_ref().map(|d| d.label.as_str()),
            "step"
        );

        StepOutcome {
            time: self.time,
            promoted,
            dispatched,
            starvation,
        }
    }

    /// Step until every queue and timer is empty, at most `max_steps` times.
    pub fn run_until_idle(&mut self, max_steps: usize) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();
        while !self.is_idle() && outcomes.len() < max_steps {
            outcomes.push(self.step());
        }
        outcomes
    }

    /// Report starvation if more than `starvation_threshold` microtasks are
    /// pending while a macrotask waits. Never touches the queues.
    pub fn detect_starvation(&mut self) -> bool {
        if self.microtasks.len() > self.policy.starvation_threshold && !self.macrotasks.is_empty() {
            warn!(
                microtasks = self.microtasks.len(),
                macrotasks = self.macrotasks.len(),
                "macrotask starvation detected"
            );
            self.starving = true;
            self.sink.notify(Notification::Starving {
                region: Region::Macrotasks,
            });
            self.log("⚠️ Macrotask starvation detected");
            true
        } else {
            false
        }
    }

    /// Remove the oldest call-stack entry and re-render.
    ///
    /// In deferred mode the shell calls this once per `PopScheduled`
    /// notification after the visual delay. Returns `None` on an empty stack.
    pub fn pop_call_stack(&mut self) -> Option<String> {
        let label = self.call_stack.pop_front()?;
        debug!(%label, remaining = self.call_stack.len(), "call stack popped");
        self.render();
        Some(label)
    }

    /// Reset, then seed the queues from `scenario`.
    pub fn load_scenario(&mut self, scenario: &Scenario) {
        self.reset();
        self.log(scenario.opening_log.clone());

        let now = self.time;
        self.microtasks
            .extend(scenario.microtasks.iter().map(|label| Task::new(label.clone(), now)));
        self.macrotasks
            .extend(scenario.macrotasks.iter().map(|label| Task::new(label.clone(), now)));
        for seed in &scenario.timers {
            self.timers
                .insert(Timer::new(seed.label.clone(), now + seed.delay));
        }

        info!(
            scenario = %scenario.name,
            microtasks = self.microtasks.len(),
            macrotasks = self.macrotasks.len(),
            timers = self.timers.len(),
            "scenario loaded"
        );
        self.render();
    }

    pub fn load_builtin(&mut self, name: ScenarioName) {
        self.load_scenario(&Scenario::builtin(name));
    }

    /// Return to the empty initial state. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.time = 0;
        self.call_stack.clear();
        self.microtasks.clear();
        self.macrotasks.clear();
        self.timers.clear();
        if self.starving {
            self.starving = false;
            self.sink.notify(Notification::StarvingCleared {
                region: Region::Macrotasks,
            });
        }
        self.sink.notify(Notification::LogCleared);
        debug!("scheduler reset");
        self.render();
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn call_stack(&self) -> &VecDeque<String> {
        &self.call_stack
    }

    pub fn microtasks(&self) -> &VecDeque<Task> {
        &self.microtasks
    }

    pub fn macrotasks(&self) -> &VecDeque<Task> {
        &self.macrotasks
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn is_starving(&self) -> bool {
        self.starving
    }

    /// No pending work: both queues and the timer set are empty.
    pub fn is_idle(&self) -> bool {
        self.microtasks.is_empty() && self.macrotasks.is_empty() && self.timers.is_empty()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            call_stack: self.call_stack.iter().cloned().collect(),
            microtasks: labels(&self.microtasks),
            macrotasks: labels(&self.macrotasks),
            timers: self.timers.labels(),
            starving: self.starving,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Move every due timer into the macrotask queue, earliest first.
    fn promote_timers(&mut self) -> Vec<String> {
        let mut promoted = Vec::new();
        while let Some(timer) = self.timers.pop_due(self.time) {
            let label = timer.label().to_string();
            debug!(%label, due = timer.due_time(), time = self.time, "timer promoted");
            self.macrotasks.push_back(Task::new(label.clone(), self.time));
            self.log(format!("Timer expired → {label}"));
            promoted.push(label);
        }
        promoted
    }

    fn dispatch(&mut self, task: Task, source: QueueKind) -> Dispatch {
        if self.policy.call_stack == CallStackMode::PopOnDispatch {
            self.call_stack.clear();
        }
        let label = task.label().to_string();
        self.call_stack.push_back(label.clone());
        debug!(%label, %source, waited = self.time - task.created_at(), "dispatch");

        self.render();
        self.sink.notify(Notification::Highlight {
            region: Region::CallStack,
            duration_ms: millis(self.policy.highlight),
        });
        self.log(format!("Executing {label}"));

        if self.policy.call_stack == CallStackMode::Deferred {
            self.sink.notify(Notification::PopScheduled {
                delay_ms: millis(self.policy.visual_delay),
            });
        }

        Dispatch { label, source }
    }

    fn render(&mut self) {
        let snapshot = self.snapshot();
        self.sink.notify(Notification::Render(snapshot));
    }

    fn log(&mut self, line: impl Into<String>) {
        self.sink.notify(Notification::log(line));
    }
}

impl Default for Scheduler<NullSink> {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

fn labels(tasks: &VecDeque<Task>) -> Vec<String> {
    tasks.iter().map(|t| t.label().to_string()).collect()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
