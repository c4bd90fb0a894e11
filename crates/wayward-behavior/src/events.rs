//! Behavior events and the script engine seam.
//!
//! Every lifecycle hook and every waypoint transition is forwarded to an
//! [`EventEngine`] as a [`BehaviorEvent`]. Events raised while a handler is
//! running are queued and delivered in order before the outermost public
//! call returns.

use crate::control::ControlSurface;
use crate::motion::{MovementKind, PointId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;
use wayward_common::{EntityId, PathId, QuestId, SpellId};

/// An event forwarded to the script engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BehaviorEvent {
    /// Entity respawned
    Respawn,
    /// Entity finished an evade and reset its posture
    Reset,
    /// Entity arrived home after an evade
    ReachedHome,
    /// Entity entered combat
    Aggro {
        /// Initial victim
        victim: EntityId,
    },
    /// Entity died
    Death {
        /// Killer, if known
        killer: Option<EntityId>,
    },
    /// Entity killed something
    Kill {
        /// The victim
        victim: EntityId,
    },
    /// Entity entered evade mode
    Evade,
    /// Entity was hit by a spell
    SpellHit {
        /// Caster of the spell
        caster: EntityId,
        /// Spell
        spell: SpellId,
    },
    /// Entity's spell hit a target
    SpellHitTarget {
        /// Target hit
        target: EntityId,
        /// Spell
        spell: SpellId,
    },
    /// Entity took damage
    Damaged {
        /// Source of the damage
        attacker: Option<EntityId>,
        /// Incoming damage, before the invincibility clamp
        amount: u32,
    },
    /// Entity dealt damage
    DamagedTarget {
        /// Damaged entity
        target: EntityId,
        /// Damage dealt
        amount: u32,
    },
    /// Entity was healed
    ReceiveHeal {
        /// Healer
        healer: EntityId,
        /// Amount healed
        amount: u32,
    },
    /// Someone emoted at the entity
    ReceiveEmote {
        /// Emoting entity
        source: EntityId,
        /// Emote id
        emote: u32,
    },
    /// Entity summoned a unit
    SummonedUnit {
        /// The summon
        summon: EntityId,
    },
    /// Entity was summoned
    JustSummoned {
        /// Summoner
        summoner: EntityId,
    },
    /// A unit summoned by this entity despawned
    SummonDespawned {
        /// The summon
        summon: EntityId,
    },
    /// Corpse was removed
    CorpseRemoved {
        /// Respawn delay in milliseconds
        respawn_delay_ms: u32,
    },
    /// A passenger boarded
    PassengerBoarded {
        /// Passenger
        passenger: EntityId,
        /// Seat index
        seat: i8,
    },
    /// A passenger left
    PassengerRemoved {
        /// Passenger
        passenger: EntityId,
    },
    /// A charm was applied or removed
    Charmed {
        /// Whether the charm was applied
        applied: bool,
    },
    /// A point movement finished
    MovementInform {
        /// Movement kind that finished
        kind: MovementKind,
        /// Point identifier
        point: PointId,
    },
    /// Escort began its first waypoint
    WaypointStart {
        /// Waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Escort reached a waypoint
    WaypointReached {
        /// Waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Escort paused
    WaypointPaused {
        /// Last reached waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Escort resumed after a pause
    WaypointResumed {
        /// Last reached waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Escort was stopped
    WaypointStopped {
        /// Last reached waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Escort ended
    WaypointEnded {
        /// Last reached waypoint number
        point: u32,
        /// Path
        path: Option<PathId>,
    },
    /// Follow reached its destination marker
    FollowCompleted,
    /// A script action was requested
    ActionDone {
        /// Action parameter
        param: i32,
    },
    /// A script data slot was written
    DataSet {
        /// Slot
        id: u32,
        /// Value
        value: u32,
    },
    /// A party opened gossip
    GossipHello {
        /// Party
        party: EntityId,
    },
    /// A party chose a gossip option
    GossipSelect {
        /// Party
        party: EntityId,
        /// Menu id
        menu: u32,
        /// Option id
        option: u32,
    },
    /// A party accepted a quest from the entity
    QuestAccepted {
        /// Party
        party: EntityId,
        /// Quest
        quest: QuestId,
    },
    /// A party turned in a quest at the entity
    QuestRewarded {
        /// Party
        party: EntityId,
        /// Quest
        quest: QuestId,
        /// Chosen reward option
        option: u32,
    },
    /// A dummy spell effect hit the entity
    DummyEffect {
        /// Caster
        caster: EntityId,
        /// Spell
        spell: SpellId,
        /// Effect index
        effect_index: u8,
    },
    /// A world event started
    GameEventStart {
        /// World event id
        id: u16,
    },
    /// A world event ended
    GameEventEnd {
        /// World event id
        id: u16,
    },
    /// A party clicked the entity
    SpellClick {
        /// Clicker
        clicker: EntityId,
    },
    /// A party entered an area trigger tied to the entity
    AreaTrigger {
        /// Party
        party: EntityId,
        /// Trigger id
        trigger: u32,
    },
    /// A unit came into line of sight
    UnitInLineOfSight {
        /// The unit
        unit: EntityId,
    },
}

impl BehaviorEvent {
    /// Whether this is a waypoint-path event.
    #[must_use]
    pub const fn is_waypoint(&self) -> bool {
        matches!(
            self,
            Self::WaypointStart { .. }
                | Self::WaypointReached { .. }
                | Self::WaypointPaused { .. }
                | Self::WaypointResumed { .. }
                | Self::WaypointStopped { .. }
                | Self::WaypointEnded { .. }
        )
    }
}

/// FIFO of events waiting for delivery.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<BehaviorEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event.
    pub fn push(&mut self, event: BehaviorEvent) {
        trace!(?event, "Queued behavior event");
        self.pending.push_back(event);
    }

    /// Takes the oldest pending event.
    pub fn pop(&mut self) -> Option<BehaviorEvent> {
        self.pending.pop_front()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending event.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Script engine hosted by a behavior controller.
///
/// Handlers receive the controller's [`ControlSurface`] and may call any
/// control operation, including ones that raise further events.
pub trait EventEngine {
    /// Called once when the controller is initialized.
    fn on_initialize(&mut self, _me: EntityId) {}

    /// Called at the start of every update tick.
    fn on_update(&mut self, _diff_ms: u32, _control: &mut dyn ControlSurface) {}

    /// Handles one event.
    fn process(&mut self, event: &BehaviorEvent, control: &mut dyn ControlSurface);
}

/// Engine that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl EventEngine for NullEngine {
    fn process(&mut self, _event: &BehaviorEvent, _control: &mut dyn ControlSurface) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(BehaviorEvent::Respawn);
        queue.push(BehaviorEvent::Evade);
        queue.push(BehaviorEvent::Reset);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(BehaviorEvent::Respawn));
        assert_eq!(queue.pop(), Some(BehaviorEvent::Evade));
        assert_eq!(queue.pop(), Some(BehaviorEvent::Reset));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut queue = EventQueue::new();
        queue.push(BehaviorEvent::FollowCompleted);
        queue.clear();
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_is_waypoint() {
        let ev = BehaviorEvent::WaypointEnded {
            point: 4,
            path: Some(PathId::new(1)),
        };
        assert!(ev.is_waypoint());
        assert!(!BehaviorEvent::Evade.is_waypoint());
    }
}
