//! Mob Components
//!
//! Hostile agents driven by the perception engine.

use bevy_ecs::prelude::*;

use sense_core::{PerceptionController, PerceptionOutput};
use sense_events::EntityId;

/// Marker component identifying an entity as a mob, with its profile kind
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Mob {
    pub kind: String,
}

impl Mob {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// The mob's perception state machine
#[derive(Component, Debug, Clone)]
pub struct Perceiver(pub PerceptionController);

/// What the perception engine decided for this mob on the current step
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LastPerception(pub PerceptionOutput);

/// A player the mob is fighting at close range.
///
/// Set by the targeting layer, never by perception. While present the
/// perception controller stands aside.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectTarget(pub Option<EntityId>);

impl DirectTarget {
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}
