//! Following a target until an arrival marker is nearby, then crediting it.

use crate::context::BehaviorContext;
use crate::events::BehaviorEvent;
use crate::timer::Timer;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use wayward_common::{EntityId, MarkerKind, QuestId};

/// How a follow reward is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RewardKind {
    /// Reward the party and its group for an event at the entity
    #[default]
    Individual,
    /// Group-style completion of the quest named by the reward id
    Group,
}

/// An active follow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowSpec {
    /// Followed entity, resolved against the world on every use
    pub target: EntityId,
    /// Follow distance
    pub distance: f32,
    /// Follow angle (radians)
    pub angle: f32,
    /// Kind of entity that marks the destination
    pub marker: MarkerKind,
    /// Reward or quest id granted on arrival
    pub reward_id: u32,
    /// How the reward is granted
    pub reward_kind: RewardKind,
}

/// Follow state of one entity. At most one follow is active.
#[derive(Debug, Clone, Default)]
pub struct FollowController {
    spec: Option<FollowSpec>,
    arrival_check: Timer,
}

impl FollowController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts following, replacing any previous follow.
    ///
    /// Returns false (and keeps the previous follow) when the target is
    /// absent or cannot be resolved.
    #[allow(clippy::too_many_arguments)]
    pub fn set_follow(
        &mut self,
        ctx: &mut BehaviorContext<'_>,
        target: Option<EntityId>,
        distance: f32,
        angle: f32,
        reward_id: u32,
        marker: MarkerKind,
        reward_kind: RewardKind,
    ) -> bool {
        let Some(target) = target.filter(|t| ctx.world.position(*t).is_some()) else {
            warn!(entity = %ctx.me, "Follow target is absent, ignoring");
            return false;
        };

        let spec = FollowSpec {
            target,
            distance: if distance >= 0.0 { distance } else { ctx.config.pet_follow_distance },
            angle: if angle >= 0.0 { angle } else { ctx.config.pet_follow_angle },
            marker,
            reward_id,
            reward_kind,
        };
        debug!(entity = %ctx.me, target = %target, "Following");

        self.spec = Some(spec);
        self.arrival_check.reset(ctx.config.follow_arrival_check_ms);
        ctx.reapply_gait();
        ctx.motion.move_follow(spec.target, spec.distance, spec.angle);
        true
    }

    /// Periodically looks for the arrival marker and completes the follow.
    pub fn update(&mut self, ctx: &mut BehaviorContext<'_>, diff_ms: u32) {
        let Some(spec) = self.spec else {
            return;
        };
        if !self.arrival_check.tick(diff_ms) {
            return;
        }

        let marker = ctx
            .world
            .nearest_of_kind(ctx.me, spec.marker, ctx.config.interaction_distance);
        if marker.is_none() {
            trace!(entity = %ctx.me, "Follow marker not in range");
            self.arrival_check.reset(ctx.config.follow_arrival_check_ms);
            return;
        }

        if ctx.world.is_party(spec.target) {
            match spec.reward_kind {
                RewardKind::Individual => ctx.world.reward_party_at_event(spec.target, spec.reward_id, ctx.me),
                RewardKind::Group => {
                    ctx.world
                        .group_event_happens(spec.target, QuestId::new(spec.reward_id), ctx.me);
                },
            }
        }
        debug!(entity = %ctx.me, target = %spec.target, "Follow completed");

        self.clear();
        ctx.despawn.schedule(ctx.config.follow_despawn_ms, 0);
        ctx.motion.stop_moving();
        ctx.motion.move_idle();
        ctx.despawn.start();
        ctx.emit(BehaviorEvent::FollowCompleted);
    }

    /// Drops the active follow without rewarding.
    pub fn clear(&mut self) {
        self.spec = None;
        self.arrival_check.clear();
    }

    /// The active follow, if any.
    #[must_use]
    pub const fn spec(&self) -> Option<&FollowSpec> {
        self.spec.as_ref()
    }

    /// The followed entity, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.spec.map(|spec| spec.target)
    }
}
