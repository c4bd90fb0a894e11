//! Millisecond countdown driven by tick deltas.

use serde::{Deserialize, Serialize};

/// Countdown consumed by successive tick deltas.
///
/// A timer reports expiry exactly once, on the tick where the elapsed time
/// reaches the armed duration. A default timer is already expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    remaining_ms: u32,
    running: bool,
}

impl Timer {
    /// Creates a running timer.
    #[must_use]
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            remaining_ms: duration_ms,
            running: true,
        }
    }

    /// Re-arms the timer with a new duration.
    pub fn reset(&mut self, duration_ms: u32) {
        *self = Self::new(duration_ms);
    }

    /// Stops the timer without reporting expiry.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Advances the timer by `diff_ms`.
    ///
    /// Returns true on the tick the countdown crosses zero.
    pub fn tick(&mut self, diff_ms: u32) -> bool {
        if !self.running {
            return false;
        }
        if diff_ms >= self.remaining_ms {
            self.remaining_ms = 0;
            self.running = false;
            true
        } else {
            self.remaining_ms -= diff_ms;
            false
        }
    }

    /// Time left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining_ms
    }

    /// Whether the countdown is still in progress.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the countdown has run out (or was never armed).
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        !self.running
    }
}
