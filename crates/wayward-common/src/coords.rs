//! World position type.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Snapshot of a location in the world with a facing angle (radians).
///
/// Positions are plain values: storing one copies it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in world units
    pub x: f32,
    /// Y coordinate in world units
    pub y: f32,
    /// Z coordinate (height) in world units
    pub z: f32,
    /// Facing angle in radians
    #[serde(default)]
    pub facing: f32,
}

impl Position {
    /// Creates a position with zero facing.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, facing: 0.0 }
    }

    /// Returns the same location with a different facing.
    #[must_use]
    pub const fn with_facing(mut self, facing: f32) -> Self {
        self.facing = facing;
        self
    }

    /// Returns the location as a vector, dropping the facing.
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Creates a position from a vector.
    #[must_use]
    pub fn from_vec3(v: Vec3, facing: f32) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            facing,
        }
    }

    /// Straight-line distance to another position.
    #[must_use]
    pub fn distance(&self, other: &Position) -> f32 {
        self.to_vec3().distance(other.to_vec3())
    }

    /// Angle in the XY plane from this position towards another.
    #[must_use]
    pub fn angle_to(&self, other: &Position) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Returns whether another position lies within `range` of this one.
    #[must_use]
    pub fn is_within(&self, other: &Position, range: f32) -> bool {
        self.to_vec3().distance_squared(other.to_vec3()) <= range * range
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(v, 0.0)
    }
}
