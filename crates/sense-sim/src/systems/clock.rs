//! Clock and engine upkeep.

use bevy_ecs::prelude::*;

use crate::{Engine, SimClock};

pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

/// Sweeps expired noises and cache entries after everyone has acted.
pub fn maintain_engine(clock: Res<SimClock>, engine: Res<Engine>) {
    engine.0.maintain(clock.step);
}
