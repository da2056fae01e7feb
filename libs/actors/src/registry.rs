//! Actor Registry
//!
//! Name-based actor discovery. Registration order is the scheduling order
//! used by [`crate::ActorSystem::tick`].

use indexmap::IndexMap;
use std::fmt;

/// Unique actor identifier, assigned by the owning system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    index: usize,
}

impl ActorId {
    /// Create from an arena slot
    pub fn from_index(index: usize) -> Self {
        Self { index }
    }

    /// Arena slot of this actor
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.index)
    }
}

/// Ordered name → actor mapping for top-level actors
#[derive(Debug, Default, Clone)]
pub struct ActorRegistry {
    actors: IndexMap<String, ActorId>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self {
            actors: IndexMap::new(),
        }
    }

    /// Register an actor under `name`, returning the actor it replaced.
    ///
    /// A replaced name keeps its original position in the round-robin order.
    pub fn register(&mut self, name: impl Into<String>, id: ActorId) -> Option<ActorId> {
        let name = name.into();
        tracing::debug!(actor_id = %id, name = %name, "Registering actor");
        self.actors.insert(name, id)
    }

    /// Find actor by name
    pub fn lookup(&self, name: &str) -> Option<ActorId> {
        self.actors.get(name).copied()
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    /// Registered actors in registration order
    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.values().copied().collect()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Drop every registration, returning the ids in registration order
    pub fn drain(&mut self) -> Vec<ActorId> {
        self.actors.drain(..).map(|(_, id)| id).collect()
    }
}
