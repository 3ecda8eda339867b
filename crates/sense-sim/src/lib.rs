//! Mob Senses Simulation Host
//!
//! Drives a population of mobs through the perception engine inside a
//! small seeded world of players, villagers, settlements and attractor
//! blocks.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use sense_core::{PerceptionContext, PerceptionOutput};
use sense_events::{DecisionRecord, Step};
use tracing::warn;

pub mod components;
pub mod logger;
pub mod setup;
pub mod systems;
pub mod terrain;
pub mod world_index;

pub use components::*;
pub use logger::DecisionLog;
pub use setup::{SpawnConfig, SpawnSummary};
pub use terrain::Terrain;
pub use world_index::WorldIndex;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// The shared perception backbone
#[derive(Resource, Debug)]
pub struct Engine(pub PerceptionContext);

/// Simulation clock resource
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub step: Step,
    /// Steps per full day; the second half of each day is night
    pub day_length: Step,
}

impl SimClock {
    pub fn new(day_length: Step) -> Self {
        Self { step: 0, day_length }
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    pub fn is_night(&self) -> bool {
        if self.day_length == 0 {
            return false;
        }
        self.step % self.day_length >= self.day_length / 2
    }
}

/// Everything needed to build a reproducible run
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub seed: u64,
    pub day_length: Step,
    pub spawn: SpawnConfig,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            day_length: 400,
            spawn: SpawnConfig::default(),
        }
    }
}

/// Builds the ECS world: terrain, creatures, mobs and all resources.
pub fn create_world(settings: &SimSettings, engine: PerceptionContext, log: DecisionLog) -> (World, SpawnSummary) {
    let mut world = World::new();
    let mut rng = SmallRng::seed_from_u64(settings.seed);

    let terrain = setup::create_terrain(&mut rng);
    let summary = setup::spawn_all(&mut world, &mut rng, &engine, &settings.spawn);

    world.insert_resource(SimClock::new(settings.day_length));
    world.insert_resource(SimRng(rng));
    world.insert_resource(Engine(engine));
    world.insert_resource(WorldIndex::new(terrain));
    world.insert_resource(log);

    (world, summary)
}

/// Stops every mob's perception behavior, logging `Released` for each mob
/// that was tracking something. Returns the number released.
pub fn release_all(world: &mut World) -> usize {
    let step = world.resource::<SimClock>().step;

    let mut records = Vec::new();
    let mut query = world.query::<(&mut Perceiver, &mut LastPerception)>();
    for (mut perceiver, mut last) in query.iter_mut(world) {
        let target = perceiver.0.current_target();
        if let Some(transition) = perceiver.0.reset() {
            let record = DecisionRecord::new(step, perceiver.0.key(), transition);
            records.push(match target {
                Some(target) => record.with_target(target),
                None => record,
            });
        }
        last.0 = PerceptionOutput::default();
    }
    records.sort_by_key(|r| r.agent);

    let mut log = world.resource_mut::<DecisionLog>();
    for record in &records {
        if let Err(e) = log.log(record) {
            warn!("Failed to write decision record: {}", e);
            break;
        }
    }
    records.len()
}

/// The per-step system order.
pub fn build_schedule() -> Schedule {
    use systems::*;

    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_clock,
            build_world_index,
            emit_creature_sounds,
            acquire_direct_targets,
            update_perception,
            apply_movement,
            wander_creatures,
            cull_creatures,
            log_decisions,
            maintain_engine,
        )
            .chain(),
    );
    schedule
}
