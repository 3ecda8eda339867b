//! Perception System
//!
//! Steps every mob's perception controller. Mobs are independent, so the
//! query runs in parallel; each writes only its own components.

use bevy_ecs::prelude::*;

use sense_core::AgentView;

use crate::components::{Alive, DirectTarget, EntityRef, LastPerception, Partition, Perceiver, Position};
use crate::world_index::WorldIndex;
use crate::{Engine, SimClock};

/// System: run one perception step for every alive mob
pub fn update_perception(
    clock: Res<SimClock>,
    engine: Res<Engine>,
    index: Res<WorldIndex>,
    mut mobs: Query<
        (
            &EntityRef,
            &Position,
            &Partition,
            &DirectTarget,
            &mut Perceiver,
            &mut LastPerception,
        ),
        With<Alive>,
    >,
) {
    let step = clock.step;
    let context = &engine.0;
    let world: &WorldIndex = &index;

    mobs.par_iter_mut().for_each(
        |(entity, position, partition, direct, mut perceiver, mut last)| {
            let agent = AgentView {
                entity: entity.0,
                partition: &partition.0,
                position: position.0,
                has_direct_target: direct.is_set(),
            };
            last.0 = perceiver.0.tick(context, world, &agent, step);
        },
    );
}
