//! World collaborators: queries against externally owned world state.
//!
//! The behavior core never mutates another entity directly. It reads the
//! world through [`WorldQuery`], asks for quest bookkeeping through
//! [`QuestService`], and drives its own entity through [`UnitControl`].

use serde::{Deserialize, Serialize};
use wayward_common::{EntityId, MarkerKind, PathId, Position, QuestId};

/// Status of a quest for one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Quest not taken
    #[default]
    None,
    /// Quest taken and not yet complete
    Incomplete,
    /// Objectives complete
    Complete,
    /// Quest failed
    Failed,
    /// Quest turned in
    Rewarded,
}

/// Read-only queries against the world.
pub trait WorldQuery {
    /// Current position of an entity, if it still exists.
    fn position(&self, entity: EntityId) -> Option<Position>;

    /// Distance between two entities, if both exist.
    fn distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        Some(self.position(a)?.distance(&self.position(b)?))
    }

    /// Whether `from` can see `to`.
    fn has_line_of_sight(&self, from: EntityId, to: EntityId) -> bool;

    /// Nearest living entity of `kind` within `radius` of `origin`.
    fn nearest_of_kind(&self, origin: EntityId, kind: MarkerKind, radius: f32) -> Option<EntityId>;

    /// Whether the entity is a controlling party (a player).
    fn is_party(&self, entity: EntityId) -> bool;

    /// Whether the entity is a party or is owned/charmed by one.
    fn is_party_controlled(&self, entity: EntityId) -> bool;

    /// Members of the party's group, the party included. Empty when ungrouped.
    fn group_members(&self, party: EntityId) -> Vec<EntityId>;

    /// Current combat victim of an entity.
    fn victim_of(&self, entity: EntityId) -> Option<EntityId>;

    /// Whether `a` is friendly towards `b`.
    fn is_friendly(&self, a: EntityId, b: EntityId) -> bool;
}

/// Quest status and reward calls.
pub trait QuestService {
    /// Whether the party is close enough to `source` to share group rewards.
    fn is_at_reward_distance(&self, party: EntityId, source: EntityId) -> bool;
    /// Whether the party is currently a corpse.
    fn has_corpse(&self, party: EntityId) -> bool;
    /// Status of a quest for a party.
    fn quest_status(&self, party: EntityId, quest: QuestId) -> QuestStatus;
    /// Group-style completion credited by `source`.
    fn group_event_happens(&mut self, party: EntityId, quest: QuestId, source: EntityId);
    /// Individual completion of an event/exploration objective.
    fn area_explored_or_event_happens(&mut self, party: EntityId, quest: QuestId);
    /// Fails a quest.
    fn fail_quest(&mut self, party: EntityId, quest: QuestId);
    /// Grants a reward to the party (and its group) for an event at `source`.
    fn reward_party_at_event(&mut self, party: EntityId, reward: u32, source: EntityId);
}

/// The controlled entity's own state and actions.
pub trait UnitControl {
    /// Whether the unit is engaged in combat.
    fn is_in_combat(&self, unit: EntityId) -> bool;
    /// Whether the unit is dead.
    fn is_dead(&self, unit: EntityId) -> bool;
    /// Whether an external controller (player) pilots the unit.
    fn is_controlled_by_party(&self, unit: EntityId) -> bool;
    /// Whether the unit is in evade mode.
    fn is_in_evade_mode(&self, unit: EntityId) -> bool;
    /// Current charmer, if any.
    fn charmer(&self, unit: EntityId) -> Option<EntityId>;
    /// Current charmer or owner, if any.
    fn charmer_or_owner(&self, unit: EntityId) -> Option<EntityId>;
    /// Reselects a combat victim; `None` when there is nothing to fight.
    fn update_victim(&mut self, unit: EntityId) -> Option<EntityId>;
    /// Current health.
    fn health(&self, unit: EntityId) -> u32;
    /// Whether the unit uses the passive react state.
    fn is_passive(&self, unit: EntityId) -> bool;
    /// Whether the unit's template allows assisting parties.
    fn can_assist(&self, unit: EntityId) -> bool;
    /// Whether the unit is confused or fleeing.
    fn is_confused_or_fleeing(&self, unit: EntityId) -> bool;
    /// The unit's own idle waypoint path, if it has one.
    fn waypoint_path(&self, unit: EntityId) -> Option<PathId>;

    /// Shows or hides the unit.
    fn set_visible(&mut self, unit: EntityId, visible: bool);
    /// Sets the transient "evading" movement-state flag.
    fn set_evading(&mut self, unit: EntityId, evading: bool);
    /// Base evade cleanup (auras, threat). Returns false to abort the evade.
    fn clear_for_evade(&mut self, unit: EntityId) -> bool;
    /// Restores the unit's template faction.
    fn restore_faction(&mut self, unit: EntityId);
    /// Interrupts non-melee casts.
    fn interrupt_non_melee_spells(&mut self, unit: EntityId);
    /// Stops the current cast.
    fn cast_stop(&mut self, unit: EntityId);
    /// Starts attacking a victim. Returns false if the attack was refused.
    fn attack(&mut self, unit: EntityId, victim: EntityId) -> bool;
    /// Puts `other` in combat with the unit without switching victims.
    fn join_combat(&mut self, unit: EntityId, other: EntityId);
    /// Swings at the current victim if the attack timer is ready.
    fn melee_attack_if_ready(&mut self, unit: EntityId);
    /// Removes the unit from the world, respawning after `respawn_delay_ms`.
    fn despawn(&mut self, unit: EntityId, respawn_delay_ms: u32);
}

/// Everything the behavior core needs from the world.
pub trait World: WorldQuery + QuestService + UnitControl {}

impl<T: WorldQuery + QuestService + UnitControl + ?Sized> World for T {}
