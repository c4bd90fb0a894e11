//! Shared fixture for sub-controller tests.

use crate::config::BehaviorConfig;
use crate::context::{BehaviorContext, Gait};
use crate::despawn::DespawnScheduler;
use crate::events::EventQueue;
use crate::mock::{straight_path, MockMotion, MockWorld};
use crate::paths::PathStore;
use wayward_common::{EntityId, PathId, Position};

/// Owns everything a [`BehaviorContext`] borrows.
pub(crate) struct Harness {
    pub me: EntityId,
    pub motion: MockMotion,
    pub world: MockWorld,
    pub paths: PathStore,
    pub events: EventQueue,
    pub despawn: DespawnScheduler,
    pub gait: Gait,
    pub config: BehaviorConfig,
    pub charmed: bool,
}

impl Harness {
    /// Path 1 has five nodes, path 2 has three.
    pub fn new() -> Self {
        let me = EntityId::new();
        let config = BehaviorConfig::default();
        let paths = PathStore::new();
        paths
            .insert(PathId::new(1), straight_path(5, 10.0))
            .expect("path 1");
        paths
            .insert(PathId::new(2), straight_path(3, 5.0))
            .expect("path 2");

        Self {
            me,
            motion: MockMotion::new(),
            world: MockWorld::new(me),
            paths,
            events: EventQueue::new(),
            despawn: DespawnScheduler::new(config.hidden_phase_ms),
            gait: Gait::default(),
            config,
            charmed: false,
        }
    }

    /// Adds a party `distance` units from the entity.
    pub fn add_party(&mut self, distance: f32) -> EntityId {
        let party = EntityId::new();
        self.world.add_entity(party, Position::new(distance, 0.0, 0.0));
        self.world.set_party(party, true);
        party
    }

    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut BehaviorContext<'_>) -> R) -> R {
        let mut ctx = BehaviorContext {
            me: self.me,
            motion: &mut self.motion,
            world: &mut self.world,
            paths: &self.paths,
            events: &mut self.events,
            despawn: &mut self.despawn,
            gait: &mut self.gait,
            config: &self.config,
            charmed: self.charmed,
        };
        f(&mut ctx)
    }
}
