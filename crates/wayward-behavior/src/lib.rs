//! # Wayward Behavior
//!
//! Per-entity behavior control for scripted non-player entities.
//!
//! A [`BehaviorController`] owns the behavior state of one entity and drives:
//! - Escort along waypoint paths with pause, resume, return-to-anchor and
//!   quest credit for the escorting parties
//! - Following a target until a marker is reached
//! - Evade handling with a fixed priority order
//! - Two-stage despawn (hide, then remove)
//!
//! Lifecycle hooks are turned into [`BehaviorEvent`]s and delivered to an
//! [`EventEngine`], which may call back into the [`ControlSurface`] while
//! handling them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod context;
pub mod control;
pub mod controller;
pub mod despawn;
pub mod escort;
pub mod evade;
pub mod events;
pub mod follow;
pub mod mock;
pub mod motion;
pub mod paths;
pub mod timer;
pub mod world;

#[cfg(test)]
mod test_support;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::control::*;
    pub use crate::controller::*;
    pub use crate::despawn::*;
    pub use crate::escort::*;
    pub use crate::evade::*;
    pub use crate::events::*;
    pub use crate::follow::*;
    pub use crate::motion::*;
    pub use crate::paths::*;
    pub use crate::timer::*;
    pub use crate::world::*;
}

pub use prelude::*;
