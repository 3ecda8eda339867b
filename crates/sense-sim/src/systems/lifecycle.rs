//! Culling System
//!
//! A mob standing next to its direct target strikes it. Struck creatures
//! stop being alive, which is what perception sees as a target loss.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use tracing::debug;

use sense_core::{EntityQuery, SoundEmitter};
use sense_events::{BlockPos, EntityId, SoundCategory};

use crate::components::{Alive, DirectTarget, EntityRef, Mob, Partition, Position};
use crate::world_index::WorldIndex;
use crate::{Engine, SimClock};

/// A mob within this distance of its direct target lands a hit
pub const STRIKE_RANGE: f64 = 1.0;

/// System: remove creatures struck by mobs this step
pub fn cull_creatures(
    mut commands: Commands,
    clock: Res<SimClock>,
    engine: Res<Engine>,
    index: Res<WorldIndex>,
    mobs: Query<(&EntityRef, &Position, &Partition, &DirectTarget), (With<Mob>, With<Alive>)>,
    victims: Query<(Entity, &EntityRef), With<Alive>>,
) {
    let mut hits: Vec<(EntityId, EntityId, Position, &Partition)> = mobs
        .iter()
        .filter_map(|(mob, position, partition, direct)| {
            let target = direct.0?;
            let at = index.position_of(&partition.0, target)?;
            (at.distance_squared(&position.0) <= STRIKE_RANGE * STRIKE_RANGE)
                .then_some((target, mob.0, *position, partition))
        })
        .collect();
    if hits.is_empty() {
        return;
    }
    hits.sort_by_key(|(target, striker, ..)| (*target, *striker));
    hits.dedup_by_key(|(target, ..)| *target);

    let by_id: HashMap<EntityId, Entity> = victims.iter().map(|(e, r)| (r.0, e)).collect();
    for (target, striker, position, partition) in hits {
        let Some(&entity) = by_id.get(&target) else {
            continue;
        };
        commands.entity(entity).remove::<Alive>();
        engine.0.acoustic().emit(
            &partition.0,
            BlockPos::containing(position.0),
            SoundCategory::Combat.default_intensity(),
            Some(striker),
            SoundCategory::Combat,
            clock.step,
        );
        debug!(target = target.0, striker = striker.0, "creature struck down");
    }
}
