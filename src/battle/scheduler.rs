//! Virtual-clock interval timers for a battle session.
//!
//! Timers never run callbacks. Advancing the clock yields due fires one at a
//! time, earliest first (ties in registration order), and the session turns
//! each into a command that it applies against the current battle state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// One per equipped ability slot
    Attack { slot: usize },
    BossAttack,
    PatternActivation,
    /// Runs only while the boss regenerates
    Regeneration,
    /// Runs only while a pattern countdown is live
    Countdown,
    /// One per slot holding a heal-over-time ability
    HealOverTime { slot: usize },
}

/// A timer fire popped from the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    pub kind: TimerKind,
    pub at_ms: u64,
    pub interval_ms: u64,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    interval_ms: u64,
    next_fire_ms: u64,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    timers: Vec<Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Starts (or restarts) a timer. The first fire is one interval from now.
    pub fn start(&mut self, kind: TimerKind, interval_ms: u64) {
        self.stop(kind);
        let interval_ms = interval_ms.max(1);
        self.timers.push(Timer {
            kind,
            interval_ms,
            next_fire_ms: self.now_ms + interval_ms,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Starts a timer only if it is not already running.
    pub fn ensure(&mut self, kind: TimerKind, interval_ms: u64) {
        if !self.is_running(kind) {
            self.start(kind, interval_ms);
        }
    }

    pub fn stop(&mut self, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Pops the earliest fire due at or before `until_ms` and moves the clock
    /// to it. Returns `None` once nothing else is due.
    pub fn next_due(&mut self, until_ms: u64) -> Option<TimerFire> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_fire_ms <= until_ms)
            .min_by_key(|t| (t.next_fire_ms, t.seq))?;

        let fire = TimerFire {
            kind: timer.kind,
            at_ms: timer.next_fire_ms,
            interval_ms: timer.interval_ms,
        };
        timer.next_fire_ms += timer.interval_ms;
        self.now_ms = fire.at_ms;
        Some(fire)
    }

    /// Moves the clock forward without firing anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
