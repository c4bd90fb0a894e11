//! Movement commands issued to the external motion collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;
use wayward_common::{EntityId, PathId, Position};

/// Identifier attached to a point movement, echoed back on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointId {
    /// A node of the current waypoint path
    Waypoint(u32),
    /// The out-of-combat anchor the entity returns to after an evade
    Anchor,
}

impl PointId {
    /// Returns the waypoint number, if this is a waypoint.
    #[must_use]
    pub const fn waypoint(self) -> Option<u32> {
        match self {
            Self::Waypoint(id) => Some(id),
            Self::Anchor => None,
        }
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waypoint(id) => write!(f, "waypoint {id}"),
            Self::Anchor => f.write_str("anchor"),
        }
    }
}

/// Kind of movement generator running on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementKind {
    /// Standing still
    #[default]
    Idle,
    /// Wandering around the spawn point
    Random,
    /// Walking a stored waypoint path
    Waypoint,
    /// Moving to a single point
    Point,
    /// Following another entity
    Follow,
    /// Chasing a combat victim
    Chase,
    /// Returning to the home location
    Home,
    /// Anything else (fleeing, confused, ...)
    Other,
}

/// Priority slot of the motion stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementSlot {
    /// Default movement
    Idle,
    /// Movement currently driven by behavior
    Active,
    /// Movement imposed by effects
    Controlled,
}

/// Motion collaborator: path-finding and steering live behind this trait.
///
/// Arrivals are reported back asynchronously through
/// [`BehaviorController::movement_inform`](crate::BehaviorController::movement_inform).
pub trait MotionMaster {
    /// Moves to a point; `id` is echoed back on arrival.
    fn move_point(&mut self, id: PointId, target: Position);
    /// Follows a target continuously.
    fn move_follow(&mut self, target: EntityId, distance: f32, angle: f32);
    /// Chases a combat victim.
    fn move_chase(&mut self, target: EntityId);
    /// Switches to idle movement.
    fn move_idle(&mut self);
    /// Moves back to the designated home location.
    fn move_targeted_home(&mut self);
    /// Starts the entity's own stored waypoint path.
    fn move_path(&mut self, path: PathId, repeat: bool);
    /// Halts motion immediately.
    fn stop_moving(&mut self);
    /// Expires the active movement generator.
    fn movement_expired(&mut self);
    /// Clears every movement generator.
    fn clear(&mut self);
    /// Kind of the movement currently running.
    fn current_kind(&self) -> MovementKind;
    /// Kind of the movement held in a slot.
    fn slot_kind(&self, slot: MovementSlot) -> MovementKind;
    /// Switches between walking and running.
    fn set_walk(&mut self, walk: bool);
    /// Enables or disables gravity (flying).
    fn set_disable_gravity(&mut self, disable: bool);
    /// Enables or disables swimming.
    fn set_swim(&mut self, swim: bool);
}
