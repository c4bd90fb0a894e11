//! Borrowed view of an entity's collaborators, handed to sub-controllers.

use crate::config::BehaviorConfig;
use crate::despawn::DespawnScheduler;
use crate::events::{BehaviorEvent, EventQueue};
use crate::motion::MotionMaster;
use crate::paths::PathRepository;
use crate::world::World;
use serde::{Deserialize, Serialize};
use wayward_common::{EntityId, Position};

/// Remembered run/walk choice, re-applied after pauses, evades and follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gait {
    run: bool,
}

impl Gait {
    /// Records and applies a gait.
    pub fn set(&mut self, motion: &mut dyn MotionMaster, run: bool) {
        self.run = run;
        motion.set_walk(!run);
    }

    /// Applies the remembered gait again.
    pub fn reapply(&self, motion: &mut dyn MotionMaster) {
        motion.set_walk(!self.run);
    }

    /// Whether the entity runs.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.run
    }
}

/// Everything a sub-controller may touch during one operation.
pub struct BehaviorContext<'a> {
    /// The controlled entity
    pub me: EntityId,
    /// Motion collaborator
    pub motion: &'a mut dyn MotionMaster,
    /// World collaborator
    pub world: &'a mut dyn World,
    /// Path repository
    pub paths: &'a dyn PathRepository,
    /// Pending notifications
    pub events: &'a mut EventQueue,
    /// The entity's despawn scheduler
    pub despawn: &'a mut DespawnScheduler,
    /// Remembered gait
    pub gait: &'a mut Gait,
    /// Tuning constants
    pub config: &'a BehaviorConfig,
    /// Whether the entity is charmed
    pub charmed: bool,
}

impl BehaviorContext<'_> {
    /// Not piloted by a party and not charmed.
    #[must_use]
    pub fn is_ai_controlled(&self) -> bool {
        !self.charmed && !self.world.is_controlled_by_party(self.me)
    }

    /// Whether the entity is engaged in combat.
    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.world.is_in_combat(self.me)
    }

    /// Current position of the entity.
    #[must_use]
    pub fn position(&self) -> Position {
        self.world.position(self.me).unwrap_or_default()
    }

    /// Queues a notification for the event engine.
    pub fn emit(&mut self, event: BehaviorEvent) {
        self.events.push(event);
    }

    /// Records and applies a gait.
    pub fn set_run(&mut self, run: bool) {
        self.gait.set(self.motion, run);
    }

    /// Applies the remembered gait again.
    pub fn reapply_gait(&mut self) {
        self.gait.reapply(self.motion);
    }
}
