//! Creature Noise System
//!
//! Creatures make noise as they go about their business: footsteps on a
//! fixed rhythm, occasional voices, and players breaking things. An
//! explosion also destroys the torches and campfires around it.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::debug;

use sense_core::{PerceptionContext, SoundEmitter};
use sense_events::{BlockPos, EntityKind, PartitionId, SoundCategory};

use crate::components::{Alive, Creature, EntityRef, Partition, Position};
use crate::world_index::WorldIndex;
use crate::{Engine, SimClock, SimRng};

/// Noise constants
pub mod constants {
    /// Steps between footsteps of one creature
    pub const FOOTSTEP_INTERVAL: u64 = 8;
    /// Per-step chance a villager or player speaks
    pub const VOICE_CHANCE: f32 = 0.01;
    /// Per-step chance a player hits a block
    pub const IMPACT_CHANCE: f32 = 0.02;
    /// Per-step chance a player sets off an explosion
    pub const DETONATION_CHANCE: f32 = 0.0005;
    /// Attractor blocks this many voxels from an explosion are destroyed
    pub const BLAST_RADIUS: i32 = 3;
}

/// System: register creature noises with the acoustic registry
///
/// Creatures are visited in id order so random draws are reproducible.
pub fn emit_creature_sounds(
    clock: Res<SimClock>,
    engine: Res<Engine>,
    mut rng: ResMut<SimRng>,
    mut index: ResMut<WorldIndex>,
    query: Query<(&EntityRef, &Position, &Partition, &Creature), With<Alive>>,
) {
    let step = clock.step;
    let emitter = engine.0.acoustic();

    let mut blasts = Vec::new();

    let mut creatures: Vec<_> = query.iter().collect();
    creatures.sort_by_key(|(entity, ..)| entity.0);

    for (entity, position, partition, creature) in creatures {
        let block = BlockPos::containing(position.0);
        let emit = |category: SoundCategory| {
            emitter.emit(
                &partition.0,
                block,
                category.default_intensity(),
                Some(entity.0),
                category,
                step,
            );
        };

        if (step + entity.0 .0) % constants::FOOTSTEP_INTERVAL == 0 {
            emit(SoundCategory::Locomotion);
        }

        let speaks = matches!(creature.kind, EntityKind::Player | EntityKind::Villager);
        if speaks && rng.0.gen::<f32>() < constants::VOICE_CHANCE {
            emit(SoundCategory::Vocal);
        }

        if creature.kind == EntityKind::Player {
            if rng.0.gen::<f32>() < constants::IMPACT_CHANCE {
                emit(SoundCategory::Impact);
            }
            if rng.0.gen::<f32>() < constants::DETONATION_CHANCE {
                emit(SoundCategory::Detonation);
                blasts.push((&partition.0, block));
            }
        }
    }

    for (partition, center) in blasts {
        detonate(&mut index, &engine.0, partition, center);
    }
}

/// Destroys the attractor blocks around an explosion and drops every cached
/// region that sampled them. Returns the number of blocks destroyed.
pub fn detonate(index: &mut WorldIndex, engine: &PerceptionContext, partition: &PartitionId, center: BlockPos) -> usize {
    let destroyed = index
        .terrain_mut()
        .remove_features_within(partition, center, constants::BLAST_RADIUS);
    for pos in &destroyed {
        engine.block_changed(partition, *pos);
    }
    if !destroyed.is_empty() {
        debug!(%partition, %center, destroyed = destroyed.len(), "explosion destroyed attractors");
    }
    destroyed.len()
}
