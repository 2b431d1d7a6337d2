//! Pending timers ordered by due tick.

use std::collections::VecDeque;

use loopviz_core::{Tick, Timer};

/// Timers sorted ascending by `due_time`; equal due times keep insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct TimerSet {
    timers: VecDeque<Timer>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every timer due at or before `timer`.
    pub fn insert(&mut self, timer: Timer) {
        let idx = self
            .timers
            .partition_point(|t| t.due_time() <= timer.due_time());
        self.timers.insert(idx, timer);
    }

    /// Remove and return the front timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<Timer> {
        if self.timers.front()?.is_due(now) {
            self.timers.pop_front()
        } else {
            None
        }
    }

    /// Due tick of the earliest timer.
    pub fn next_due(&self) -> Option<Tick> {
        self.timers.front().map(Timer::due_time)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.timers.iter().map(|t| t.label().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
