//! Identifiers
//!
//! Opaque handles for entities, agents, and world partitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discrete simulation step counter.
pub type Step = u64;

/// Handle to a world entity.
///
/// This is a weak reference: holding one never keeps the entity alive, and
/// callers must check liveness through the world before using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ent_{:06}", self.0)
    }
}

/// Stable opaque identity assigned to an agent at creation.
///
/// Unlike [`EntityId`], which a host may recycle, an `AgentKey` is never
/// reused, so schedules derived from it cannot collide after respawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentKey(pub Uuid);

impl AgentKey {
    /// Creates a fresh random key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a key from raw bits, for hosts that need reproducible runs.
    pub fn from_u128(bits: u128) -> Self {
        Self(Uuid::from_u128(bits))
    }

    /// Deterministic position of this key inside a window of `window` slots.
    pub fn slot(&self, window: u32) -> u32 {
        if window == 0 {
            return 0;
        }
        (self.0.as_u128() % window as u128) as u32
    }
}

impl Default for AgentKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0.simple())
    }
}

/// A world partition, e.g. a dimension. Perception state never crosses
/// partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionId(pub String);

impl PartitionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartitionId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
