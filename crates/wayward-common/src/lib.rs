//! # Wayward Common
//!
//! Common types shared by the Wayward crates:
//! - ID types (EntityId, PathId, QuestId, ...)
//! - World positions
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(EntityId::from_raw(42).raw(), 42);
        assert_eq!(PathId::new(7).raw(), 7);
        assert_eq!(QuestId::new(9).raw(), 9);
    }

    #[test]
    fn test_path_error_converts() {
        let err: WaywardError = PathError::UnknownPath(PathId::new(3)).into();
        assert_eq!(err.to_string(), "Path error: Unknown path 3");
    }
}
