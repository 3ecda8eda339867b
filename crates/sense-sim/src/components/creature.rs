//! Creature Components
//!
//! Position and identity shared by every simulated entity, plus the
//! wandering state of non-mob creatures.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use sense_events::{Coord, EntityId, EntityKind, PartitionId};

/// Stable simulation id, handed to the perception engine as a weak handle
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub EntityId);

/// Component: an entity's current position
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Coord);

/// Component: the world partition an entity lives in
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition(pub PartitionId);

/// Marker for entities that can still be perceived
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Alive;

/// A perceivable non-mob creature: player, villager, livestock or wildlife
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub kind: EntityKind,
}

impl Creature {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }
}

/// Horizontal wander direction, kept at unit length
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub dx: f64,
    pub dz: f64,
}

impl Heading {
    /// Heading for an angle in radians.
    pub fn from_angle(angle: f64) -> Self {
        Self {
            dx: angle.cos(),
            dz: angle.sin(),
        }
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self { dx: 1.0, dz: 0.0 }
    }
}
