//! Per-side game clock with increment.
//!
//! Every method takes `now` explicitly; the registry passes `Utc::now()` and
//! tests pass fixed instants.

use chrono::{DateTime, TimeDelta, Utc};

use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    pub initial: TimeDelta,
    pub increment: TimeDelta,
}

impl TimeControl {
    pub fn from_seconds(initial: u64, increment: u64) -> Self {
        let seconds = |s: u64| {
            i64::try_from(s)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX)
        };
        Self {
            initial: seconds(initial),
            increment: seconds(increment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCharge {
    InTime,
    Expired,
}

#[derive(Debug, Clone)]
pub struct SideClock {
    remaining: [TimeDelta; 2],
    increment: TimeDelta,
    /// Start of the current turn; `None` until both seats are filled.
    turn_started: Option<DateTime<Utc>>,
}

impl SideClock {
    pub fn new(control: TimeControl) -> Self {
        Self {
            remaining: [control.initial; 2],
            increment: control.increment,
            turn_started: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.turn_started.is_none() {
            self.turn_started = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.turn_started.is_some()
    }

    /// Charges the time since the turn started to `mover`, then adds the
    /// increment. An expired side is left at zero and gets no increment.
    pub fn charge(&mut self, mover: Color, now: DateTime<Utc>) -> ClockCharge {
        let Some(started) = self.turn_started else {
            return ClockCharge::InTime;
        };
        let left = self.remaining[mover.index()] - (now - started).max(TimeDelta::zero());
        if left <= TimeDelta::zero() {
            self.remaining[mover.index()] = TimeDelta::zero();
            self.turn_started = None;
            return ClockCharge::Expired;
        }
        self.remaining[mover.index()] = left.checked_add(&self.increment).unwrap_or(TimeDelta::MAX);
        self.turn_started = Some(now);
        ClockCharge::InTime
    }

    /// Time left for `color` at `now`, counting the running turn against
    /// `side_to_move`.
    pub fn remaining(&self, color: Color, side_to_move: Color, now: DateTime<Utc>) -> TimeDelta {
        let stored = self.remaining[color.index()];
        match self.turn_started {
            Some(started) if color == side_to_move => {
                (stored - (now - started).max(TimeDelta::zero())).max(TimeDelta::zero())
            }
            _ => stored,
        }
    }

    pub fn has_expired(&self, side_to_move: Color, now: DateTime<Utc>) -> bool {
        self.is_running() && self.remaining(side_to_move, side_to_move, now) <= TimeDelta::zero()
    }

    /// Freezes both sides; used once the game is over.
    pub fn stop(&mut self, side_to_move: Color, now: DateTime<Utc>) {
        if self.turn_started.is_some() {
            self.remaining[side_to_move.index()] = self.remaining(side_to_move, side_to_move, now);
            self.turn_started = None;
        }
    }
}
