//! ECS Components
//!
//! Creatures that can be perceived, and the mobs that perceive them.

pub mod creature;
pub mod mob;

pub use creature::*;
pub use mob::*;
