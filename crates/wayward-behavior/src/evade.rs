//! Leaving combat: picking where to go and re-arming the non-combat posture.

use crate::context::BehaviorContext;
use crate::escort::EscortController;
use crate::events::BehaviorEvent;
use crate::follow::FollowController;
use tracing::debug;

/// Movement chosen when an evade begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvadeOutcome {
    /// Evade handling is disabled; only the notification was sent
    Suppressed,
    /// Base evade cleanup refused the evade
    Aborted,
    /// Escort heads back to its anchor
    ReturningToAnchor,
    /// Follow movement was reissued
    ResumedFollow,
    /// Following the charmer or owner
    FollowingOwner,
    /// Moving to the home location
    ReturningHome,
}

/// Evade state of one entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvadeOrchestrator {
    disabled: bool,
}

impl EvadeOrchestrator {
    /// Creates an orchestrator with evade handling enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { disabled: false }
    }

    /// Turns evade handling off or on.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether evade handling is off.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Runs one evade. Priority: escort return, follow, owner, home.
    pub fn enter(
        &self,
        ctx: &mut BehaviorContext<'_>,
        escort: &mut EscortController,
        follow: &FollowController,
    ) -> EvadeOutcome {
        if self.disabled {
            ctx.emit(BehaviorEvent::Evade);
            return EvadeOutcome::Suppressed;
        }
        if !ctx.world.clear_for_evade(ctx.me) {
            return EvadeOutcome::Aborted;
        }

        ctx.world.set_evading(ctx.me, true);
        ctx.emit(BehaviorEvent::Evade);
        ctx.reapply_gait();

        let resumable = follow
            .spec()
            .copied()
            .filter(|spec| ctx.world.position(spec.target).is_some());

        let outcome = if escort.state().is_escorting() {
            escort.begin_return(ctx);
            EvadeOutcome::ReturningToAnchor
        } else if let Some(spec) = resumable {
            ctx.motion.move_follow(spec.target, spec.distance, spec.angle);
            ctx.world.set_evading(ctx.me, false);
            EvadeOutcome::ResumedFollow
        } else if let Some(owner) = ctx.world.charmer_or_owner(ctx.me) {
            ctx.motion
                .move_follow(owner, ctx.config.pet_follow_distance, ctx.config.pet_follow_angle);
            ctx.world.set_evading(ctx.me, false);
            EvadeOutcome::FollowingOwner
        } else {
            ctx.motion.move_targeted_home();
            EvadeOutcome::ReturningHome
        };
        debug!(entity = %ctx.me, ?outcome, "Evading");

        reset_posture(ctx, escort);
        outcome
    }
}

/// Re-arms the non-combat posture and tells the engine.
pub fn reset_posture(ctx: &mut BehaviorContext<'_>, escort: &EscortController) {
    // Escort movement after combat keeps its own gait.
    if !escort.state().is_escorting() {
        ctx.reapply_gait();
    }
    ctx.emit(BehaviorEvent::Reset);
}
