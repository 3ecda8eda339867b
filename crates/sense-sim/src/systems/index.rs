//! World Index System
//!
//! Rebuilds the per-step entity snapshot the perception engine queries.

use bevy_ecs::prelude::*;

use sense_core::EntitySighting;
use sense_events::EntityKind;

use crate::components::{Alive, Creature, EntityRef, Partition, Position};
use crate::world_index::WorldIndex;
use crate::SimClock;

/// System: snapshot every alive entity into the world index
pub fn build_world_index(
    clock: Res<SimClock>,
    mut index: ResMut<WorldIndex>,
    query: Query<(&EntityRef, &Position, &Partition, Option<&Creature>), With<Alive>>,
) {
    index.begin_step(clock.is_night());
    for (entity, position, partition, creature) in query.iter() {
        index.insert(
            &partition.0,
            EntitySighting {
                id: entity.0,
                kind: creature.map_or(EntityKind::Mob, |c| c.kind),
                position: position.0,
            },
        );
    }
}
