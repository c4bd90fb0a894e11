//! Waypoint paths and the shared path repository.
//!
//! Paths are authored in RON:
//!
//! ```ron
//! (
//!     paths: [
//!         (id: 7, nodes: [
//!             (id: 1, position: (x: 0.0, y: 0.0, z: 0.0)),
//!             (id: 2, position: (x: 10.0, y: 0.0, z: 0.0), wait_ms: 2000),
//!         ]),
//!     ],
//! )
//! ```
//!
//! The store hands out `Arc<WaypointPath>` so a reload never invalidates a
//! path an escort is walking.

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use wayward_common::{PathError, PathId, Position};

/// One stop along a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointNode {
    /// Ordinal, 1-based
    pub id: u32,
    /// Where to go
    pub position: Position,
    /// Suggested wait on arrival, in milliseconds
    #[serde(default)]
    pub wait_ms: u32,
}

impl WaypointNode {
    /// Creates a node without a wait.
    #[must_use]
    pub const fn new(id: u32, position: Position) -> Self {
        Self {
            id,
            position,
            wait_ms: 0,
        }
    }

    /// Sets the wait.
    #[must_use]
    pub const fn with_wait(mut self, wait_ms: u32) -> Self {
        self.wait_ms = wait_ms;
        self
    }
}

/// An ordered collection of waypoint nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    id: PathId,
    nodes: Vec<WaypointNode>,
}

impl WaypointPath {
    /// Builds a path, ordering nodes by id.
    ///
    /// Fails for an empty node list. Id gaps are tolerated and logged.
    pub fn new(id: PathId, mut nodes: Vec<WaypointNode>) -> Result<Self, PathError> {
        if nodes.is_empty() {
            return Err(PathError::EmptyPath(id));
        }
        nodes.sort_by_key(|node| node.id);

        let path = Self { id, nodes };
        if let Some(gap) = path.first_gap() {
            error!(path = %id, expected = gap, "Waypoint ids are not contiguous");
        }
        Ok(path)
    }

    /// Path id.
    #[must_use]
    pub const fn id(&self) -> PathId {
        self.id
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: empty paths are rejected on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at a 0-based index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WaypointNode> {
        self.nodes.get(index)
    }

    /// All nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    /// First expected id that is missing, if ids are not `1..=len`.
    #[must_use]
    pub fn first_gap(&self) -> Option<u32> {
        self.nodes
            .iter()
            .zip(1u32..)
            .find(|(node, expected)| node.id != *expected)
            .map(|(_, expected)| expected)
    }
}

/// Lookup of waypoint paths by id.
pub trait PathRepository {
    /// Resolves a path.
    fn lookup(&self, id: PathId) -> Result<Arc<WaypointPath>, PathError>;
}

/// One path in a path file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDefinition {
    /// Path id
    pub id: u32,
    /// Nodes
    pub nodes: Vec<WaypointNode>,
}

/// Contents of a path file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathFile {
    /// Paths defined in the file
    #[serde(default)]
    pub paths: Vec<PathDefinition>,
}

/// In-memory path repository with shared read access.
#[derive(Debug, Default)]
pub struct PathStore {
    paths: RwLock<AHashMap<PathId, Arc<WaypointPath>>>,
}

impl PathStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a path, replacing any previous one with the same id.
    pub fn insert(&self, id: PathId, nodes: Vec<WaypointNode>) -> Result<(), PathError> {
        let path = WaypointPath::new(id, nodes)?;
        debug!(path = %id, nodes = path.len(), "Registered waypoint path");
        self.paths.write().insert(id, Arc::new(path));
        Ok(())
    }

    /// Loads paths from RON text. Returns how many were registered.
    ///
    /// The whole file is validated before anything is registered.
    pub fn load_str(&self, text: &str) -> Result<usize, PathError> {
        let file: PathFile = ron::from_str(text).map_err(|e| PathError::Parse(e.to_string()))?;

        let mut parsed: AHashMap<PathId, Arc<WaypointPath>> = AHashMap::with_capacity(file.paths.len());
        for def in file.paths {
            let id = PathId::new(def.id);
            if parsed.contains_key(&id) {
                return Err(PathError::Duplicate(id));
            }
            parsed.insert(id, Arc::new(WaypointPath::new(id, def.nodes)?));
        }

        let count = parsed.len();
        self.paths.write().extend(parsed);
        Ok(count)
    }

    /// Loads paths from a RON file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, PathError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let count = self.load_str(&text)?;
        info!("Loaded {count} waypoint paths from {}", path.display());
        Ok(count)
    }

    /// Number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    /// Whether no path is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }
}

impl PathRepository for PathStore {
    fn lookup(&self, id: PathId) -> Result<Arc<WaypointPath>, PathError> {
        self.paths
            .read()
            .get(&id)
            .cloned()
            .ok_or(PathError::UnknownPath(id))
    }
}
