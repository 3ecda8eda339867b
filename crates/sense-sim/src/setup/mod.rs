//! World Setup
//!
//! Terrain layout and creature spawning.

pub mod creatures;
pub mod world;

pub use creatures::*;
pub use world::*;
