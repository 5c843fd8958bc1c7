//! Opaque entity handle.

use std::fmt;

/// Reference to a game object tracked by the index.
///
/// Carries no payload: the index only shadows the entity's position and
/// category and never owns entity data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef(pub u64);

impl EntityRef {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityRef {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
