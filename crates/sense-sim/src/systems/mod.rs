//! ECS Systems
//!
//! One step runs, in order: clock, world index, creature noises, direct
//! targeting, perception, movement, wandering, culling, logging, upkeep.

pub mod clock;
pub mod index;
pub mod lifecycle;
pub mod logging;
pub mod movement;
pub mod perception;
pub mod sound;
pub mod targeting;

pub use clock::{advance_clock, maintain_engine};
pub use index::build_world_index;
pub use lifecycle::cull_creatures;
pub use logging::log_decisions;
pub use movement::{apply_movement, wander_creatures};
pub use perception::update_perception;
pub use sound::emit_creature_sounds;
pub use targeting::acquire_direct_targets;
