//! Real-time pacing for deferred call-stack pops.
//!
//! In deferred mode every dispatch asks the shell to pop the call stack
//! after the visual delay. Those pops run on tokio's clock and are never
//! cancelled, not even by `reset`. They only ever touch the call stack.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

use loopviz_scheduler::Scheduler;

use crate::render::Renderer;

/// Pending pop deadlines, earliest first.
#[derive(Debug, Default)]
pub struct PopTimers {
    deadlines: VecDeque<Instant>,
}

impl PopTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a pop for every delay the renderer collected.
    pub fn arm_from(&mut self, scheduler: &mut Scheduler<Renderer>) {
        let now = Instant::now();
        for delay in scheduler.sink_mut().take_scheduled_pops() {
            self.arm(now + delay);
        }
    }

    pub fn arm(&mut self, deadline: Instant) {
        let idx = self.deadlines.partition_point(|d| *d <= deadline);
        self.deadlines.insert(idx, deadline);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.front().copied()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Pop the call stack once for every deadline at or before `now`.
    pub fn fire_due(&mut self, now: Instant, scheduler: &mut Scheduler<Renderer>) -> usize {
        let mut fired = 0;
        while self.deadlines.front().is_some_and(|d| *d <= now) {
            self.deadlines.pop_front();
            let popped = scheduler.pop_call_stack();
            debug!(?popped, "deferred pop fired");
            fired += 1;
        }
        fired
    }

    /// Sleep for `interval`, firing any pops that come due meanwhile.
    pub async fn wait(&mut self, interval: Duration, scheduler: &mut Scheduler<Renderer>) {
        let until = Instant::now() + interval;
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= until) {
            sleep_until(deadline).await;
            self.fire_due(deadline, scheduler);
        }
        sleep_until(until).await;
    }

    /// Sleep until every armed pop has fired.
    pub async fn drain(&mut self, scheduler: &mut Scheduler<Renderer>) {
        while let Some(deadline) = self.next_deadline() {
            sleep_until(deadline).await;
            self.fire_due(deadline, scheduler);
        }
    }
}
