//! Public control surface.
//!
//! These are the operations higher-level spawn/combat code and the script
//! engine use to steer an entity. They are plain state transitions: misuse
//! is logged and ignored, and any call may be made from inside an event
//! handler.

use crate::escort::EscortState;
use crate::follow::RewardKind;
use wayward_common::{EntityId, MarkerKind, PathId, QuestId};

/// Operations available to event handlers and external callers.
pub trait ControlSurface {
    /// The controlled entity.
    fn entity(&self) -> EntityId;

    /// Starts walking a waypoint path.
    ///
    /// `path` of `None` restarts the currently loaded path id, if any.
    /// Ignored while the entity is in combat.
    fn start_path(&mut self, run: bool, path: Option<PathId>, repeat: bool, invoker: Option<EntityId>);

    /// Pauses the escort for `delay_ms`. A forced pause halts motion at once.
    fn pause_path(&mut self, delay_ms: u32, forced: bool);

    /// Stops the escort, scheduling a despawn and optionally recording a quest.
    fn stop_path(&mut self, despawn_ms: u32, quest: Option<QuestId>, failed: bool);

    /// Moves back towards the last reached waypoint.
    fn resume_path(&mut self);

    /// Replaces the list of parties the escort is tied to.
    fn set_escort_targets(&mut self, targets: Vec<EntityId>);

    /// Follows `target` until a marker of kind `marker` is nearby.
    ///
    /// Negative `distance` or `angle` select the pet defaults.
    fn set_follow(
        &mut self,
        target: Option<EntityId>,
        distance: f32,
        angle: f32,
        reward_id: u32,
        marker: MarkerKind,
        reward_kind: RewardKind,
    );

    /// Switches between running and walking.
    fn set_run(&mut self, run: bool);
    /// Enables or disables flight.
    fn set_fly(&mut self, fly: bool);
    /// Enables or disables swimming.
    fn set_swim(&mut self, swim: bool);

    /// Allows or forbids chasing the combat victim.
    fn set_combat_move(&mut self, on: bool);
    /// Turns evade handling off (only the notification is sent).
    fn set_evade_disabled(&mut self, disabled: bool);
    /// Health below which incoming damage is clamped. Zero disables.
    fn set_invincibility_floor(&mut self, floor: u32);
    /// Turns melee auto-attack on or off.
    fn set_auto_attack(&mut self, on: bool);

    /// Arms a despawn of `delay_ms`, respawning after `respawn_ms`.
    fn set_despawn_time(&mut self, delay_ms: u32, respawn_ms: u32);
    /// Starts an armed despawn.
    fn start_despawn(&mut self);

    /// Writes a script data slot.
    fn set_data(&mut self, id: u32, value: u32);
    /// Reads a script data slot. Always zero for the generic controller.
    fn get_data(&self, id: u32) -> u32;
    /// Requests a script action.
    fn do_action(&mut self, param: i32);

    /// Starts attacking `victim`.
    fn attack_start(&mut self, victim: EntityId);

    /// Current escort flags.
    fn escort_state(&self) -> EscortState;
    /// Currently loaded path id.
    fn path_id(&self) -> Option<PathId>;
    /// Whether the entity may chase its victim.
    fn can_combat_move(&self) -> bool;
}
