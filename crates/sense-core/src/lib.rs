//! Perception engine: what should each mob pursue right now?
//!
//! The engine sits between the world and the movement layer. Agents query a
//! shared [`PerceptionContext`] on a staggered schedule, fuse the channels
//! their profile enables, and hand the winning target to the host.
//!
//! # Architecture
//!
//! ```text
//!  gameplay noises ──▶ AcousticRegistry ─┐
//!  world blocks ─────▶ RegionFeatureCache ┼──▶ PerceptionController ──▶ MovementIntent
//!  entities / POIs ──────────────────────┘        (one per agent)
//! ```
//!
//! # Modules
//!
//! - [`acoustic`]: Decaying noise store and the `SoundEmitter` ingress
//! - [`region_cache`]: TTL-bound region scans for light and heat
//! - [`profile`]: Per agent-kind channel settings
//! - [`scoring`]: Channel scorers and the running selection
//! - [`controller`]: Per-agent scheduling and state machine
//! - [`context`]: The shared backbone passed into agent updates
//! - [`world`]: Adapter traits the host implements

pub mod acoustic;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod profile;
pub mod region_cache;
pub mod scoring;
pub mod world;

pub use acoustic::{AcousticRegistry, SoundEmitter};
pub use config::{
    default_config_toml, AcousticConfig, CacheConfig, PerceptionConfig, SchedulingConfig,
    ScoringConfig, SmellCondition,
};
pub use context::PerceptionContext;
pub use controller::{MovementIntent, PerceptionController, PerceptionOutput, PerceptionState};
pub use error::{PerceptionError, Result};
pub use profile::{builtin_profiles, ChannelSettings, PerceptionProfile, ProfileSet, DEFAULT_PROFILE};
pub use region_cache::{RegionCacheEntry, RegionFeatureCache, RegionKey};
pub use scoring::{AgentView, Selection};
pub use world::{
    BlockSampler, EntityQuery, EntitySighting, PoiQuery, PointOfInterest, WorldConditions,
    WorldView,
};
