//! Staged removal: visible countdown, hidden countdown, then removal.

use crate::timer::Timer;
use crate::world::UnitControl;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wayward_common::EntityId;

/// Phase of a pending despawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DespawnState {
    /// Nothing pending
    #[default]
    Inactive,
    /// A despawn delay is stored; the entity is still visible
    Scheduled,
    /// The entity is invisible and about to be removed
    Hidden,
    /// Removal was requested
    Removed,
}

/// Two-phase delayed removal.
///
/// A despawn is armed with [`schedule`](Self::schedule) and begins counting
/// down once [`start`](Self::start) is called. When the delay runs out the
/// entity is hidden for `hidden_phase_ms`, then removed.
#[derive(Debug, Clone, Default)]
pub struct DespawnScheduler {
    state: DespawnState,
    started: bool,
    delay_ms: u32,
    respawn_ms: u32,
    countdown: Timer,
    hidden_phase_ms: u32,
}

impl DespawnScheduler {
    /// Creates an inactive scheduler.
    #[must_use]
    pub fn new(hidden_phase_ms: u32) -> Self {
        Self {
            hidden_phase_ms,
            ..Self::default()
        }
    }

    /// Arms a despawn. A zero delay disarms.
    pub fn schedule(&mut self, delay_ms: u32, respawn_ms: u32) {
        self.delay_ms = delay_ms;
        self.respawn_ms = respawn_ms;
        self.started = false;
        self.countdown.clear();
        self.state = if delay_ms == 0 {
            DespawnState::Inactive
        } else {
            DespawnState::Scheduled
        };
    }

    /// Begins the visible countdown of an armed despawn.
    pub fn start(&mut self) {
        if self.state != DespawnState::Scheduled || self.started {
            return;
        }
        debug!(delay_ms = self.delay_ms, "Despawn countdown started");
        self.started = true;
        self.countdown.reset(self.delay_ms);
    }

    /// Advances the countdown, hiding and then removing `me`.
    pub fn update<U: UnitControl + ?Sized>(&mut self, diff_ms: u32, me: EntityId, unit: &mut U) {
        match self.state {
            DespawnState::Scheduled if self.started => {
                if self.countdown.tick(diff_ms) {
                    debug!(entity = %me, "Despawn hiding entity");
                    unit.set_visible(me, false);
                    self.state = DespawnState::Hidden;
                    self.countdown.reset(self.hidden_phase_ms);
                }
            },
            DespawnState::Hidden => {
                if self.countdown.tick(diff_ms) {
                    debug!(entity = %me, respawn_ms = self.respawn_ms, "Despawn removing entity");
                    self.state = DespawnState::Removed;
                    unit.despawn(me, self.respawn_ms);
                }
            },
            _ => {},
        }
    }

    /// Drops any pending despawn.
    pub fn reset(&mut self) {
        *self = Self::new(self.hidden_phase_ms);
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> DespawnState {
        self.state
    }

    /// Whether a despawn is armed but not yet counting.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state == DespawnState::Scheduled && !self.started
    }

    /// Whether the visible or hidden countdown is running.
    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.countdown.is_running()
    }

    /// Stored despawn delay.
    #[must_use]
    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Stored respawn delay.
    #[must_use]
    pub const fn respawn_ms(&self) -> u32 {
        self.respawn_ms
    }

    /// Time left in the current phase.
    #[must_use]
    pub const fn remaining_ms(&self) -> u32 {
        self.countdown.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWorld;

    fn scheduler() -> (DespawnScheduler, EntityId, MockWorld) {
        let me = EntityId::new();
        (DespawnScheduler::new(5000), me, MockWorld::new(me))
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut despawn, me, mut world) = scheduler();
        assert_eq!(despawn.state(), DespawnState::Inactive);

        despawn.schedule(5000, 0);
        assert_eq!(despawn.state(), DespawnState::Scheduled);
        despawn.start();

        for _ in 0..4 {
            despawn.update(1000, me, &mut world);
        }
        assert_eq!(despawn.state(), DespawnState::Scheduled);
        despawn.update(1000, me, &mut world);
        assert_eq!(despawn.state(), DespawnState::Hidden);
        assert_eq!(despawn.remaining_ms(), 5000);
        assert!(!world.is_visible());

        for _ in 0..4 {
            despawn.update(1000, me, &mut world);
        }
        assert!(world.despawns().is_empty());
        despawn.update(1000, me, &mut world);
        assert_eq!(despawn.state(), DespawnState::Removed);
        assert_eq!(world.despawns(), &[(me, 0)]);
    }

    #[test]
    fn test_armed_does_not_count() {
        let (mut despawn, me, mut world) = scheduler();
        despawn.schedule(1000, 30_000);
        assert!(despawn.is_armed());
        despawn.update(10_000, me, &mut world);
        assert_eq!(despawn.state(), DespawnState::Scheduled);
        assert!(world.is_visible());
    }

    #[test]
    fn test_respawn_delay_forwarded() {
        let (mut despawn, me, mut world) = scheduler();
        despawn.schedule(100, 30_000);
        despawn.start();
        despawn.update(100, me, &mut world);
        despawn.update(5000, me, &mut world);
        assert_eq!(world.despawns(), &[(me, 30_000)]);

        despawn.update(5000, me, &mut world);
        assert_eq!(world.despawns().len(), 1);
    }

    #[test]
    fn test_zero_delay_disarms() {
        let (mut despawn, _, _) = scheduler();
        despawn.schedule(0, 0);
        assert_eq!(despawn.state(), DespawnState::Inactive);
        despawn.start();
        assert!(!despawn.is_counting());
    }

    #[test]
    fn test_start_without_schedule_is_noop() {
        let (mut despawn, me, mut world) = scheduler();
        despawn.start();
        despawn.update(60_000, me, &mut world);
        assert_eq!(despawn.state(), DespawnState::Inactive);
    }

    #[test]
    fn test_reset() {
        let (mut despawn, _, _) = scheduler();
        despawn.schedule(500, 0);
        despawn.start();
        despawn.reset();
        assert_eq!(despawn.state(), DespawnState::Inactive);
        assert_eq!(despawn.delay_ms(), 0);
    }
}
