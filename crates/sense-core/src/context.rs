//! Perception Context
//!
//! The shared backbone for one world: acoustic registry, light and heat
//! caches, profiles and config. Owned by the host and passed into every
//! agent update.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

use sense_events::{AgentKey, BlockPos, FeatureKind, PartitionId, Step};

use crate::acoustic::AcousticRegistry;
use crate::config::PerceptionConfig;
use crate::controller::PerceptionController;
use crate::error::Result;
use crate::profile::ProfileSet;
use crate::region_cache::RegionFeatureCache;

#[derive(Debug)]
pub struct PerceptionContext {
    config: Arc<PerceptionConfig>,
    acoustic: AcousticRegistry,
    light: RegionFeatureCache,
    heat: RegionFeatureCache,
    profiles: ProfileSet,
}

impl PerceptionContext {
    /// Validates the config and builds empty stores.
    pub fn new(config: PerceptionConfig) -> Result<Self> {
        config.validate()?;
        let profiles = ProfileSet::new(config.profiles.clone());
        Ok(Self {
            acoustic: AcousticRegistry::new(&config.acoustic),
            light: RegionFeatureCache::new(FeatureKind::Light, config.cache.clone()),
            heat: RegionFeatureCache::new(FeatureKind::Heat, config.cache.clone()),
            profiles,
            config: Arc::new(config),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(PerceptionConfig::from_file(path)?)
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn acoustic(&self) -> &AcousticRegistry {
        &self.acoustic
    }

    pub fn light(&self) -> &RegionFeatureCache {
        &self.light
    }

    pub fn heat(&self) -> &RegionFeatureCache {
        &self.heat
    }

    pub fn cache(&self, kind: FeatureKind) -> &RegionFeatureCache {
        match kind {
            FeatureKind::Light => &self.light,
            FeatureKind::Heat => &self.heat,
        }
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// A controller for an agent of `kind`, using the `default` profile for
    /// unknown kinds.
    pub fn spawn_controller(&self, kind: &str, key: AgentKey) -> PerceptionController {
        PerceptionController::new(key, self.profiles.get_or_default(kind), &self.config.scheduling)
    }

    /// Per-step housekeeping: sweeps expired noises every step and drops
    /// expired cache entries every `invalidate_interval` steps.
    pub fn maintain(&self, step: Step) {
        self.acoustic.sweep(step);

        let interval = self.config.cache.invalidate_interval;
        if interval > 0 && step % interval == 0 {
            let removed = self.light.invalidate_expired(step) + self.heat.invalidate_expired(step);
            if removed > 0 {
                trace!(step, removed, "invalidated expired region entries");
            }
        }
    }

    /// Drops every cached light and heat entry whose scan sampled `pos`, so
    /// the next query sees the changed block. Returns the number removed.
    pub fn block_changed(&self, partition: &PartitionId, pos: BlockPos) -> usize {
        let removed = self.light.invalidate_at(partition, pos) + self.heat.invalidate_at(partition, pos);
        if removed > 0 {
            trace!(%partition, %pos, removed, "block change invalidated regions");
        }
        removed
    }

    /// Forgets everything known about one partition.
    pub fn clear_partition(&self, partition: &PartitionId) {
        debug!(%partition, "clearing perception state");
        self.acoustic.clear(partition);
        self.light.clear(partition);
        self.heat.clear(partition);
    }

    pub fn clear_all(&self) {
        self.acoustic.clear_all();
        self.light.clear_all();
        self.heat.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PerceptionError;
    use crate::world::BlockSampler;
    use sense_events::SoundCategory;

    struct NoBlocks;

    impl BlockSampler for NoBlocks {
        fn attraction(&self, _kind: FeatureKind, _partition: &PartitionId, _pos: BlockPos) -> Option<f32> {
            None
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PerceptionConfig::default();
        config.cache.region_size = 0;
        assert!(matches!(
            PerceptionContext::new(config),
            Err(PerceptionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_spawn_controller_uses_kind_profile() {
        let ctx = PerceptionContext::new(PerceptionConfig::default()).unwrap();
        let zombie = ctx.spawn_controller("zombie", AgentKey::from_u128(3));
        assert!(zombie.profile().smell.enabled);

        let unknown = ctx.spawn_controller("ghast", AgentKey::from_u128(3));
        assert!(!unknown.profile().smell.enabled);
        assert_eq!(unknown.state().stagger_offset, 3);
    }

    #[test]
    fn test_maintain_sweeps_every_step() {
        let ctx = PerceptionContext::new(PerceptionConfig::default()).unwrap();
        let p = PartitionId::from("overworld");
        ctx.acoustic().insert(&p, BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Vocal, 5);

        ctx.maintain(104);
        assert_eq!(ctx.acoustic().len(&p), 1);
        ctx.maintain(105);
        assert!(ctx.acoustic().is_empty());
    }

    #[test]
    fn test_block_changed_invalidates_both_caches() {
        let ctx = PerceptionContext::new(PerceptionConfig::default()).unwrap();
        let p = PartitionId::from("overworld");
        let world = NoBlocks;
        let center = BlockPos::new(4, 64, 4).center();

        ctx.light().find_best(&world, &p, center, 16.0, 0);
        ctx.heat().find_best(&world, &p, center, 16.0, 0);
        assert_eq!(ctx.block_changed(&p, BlockPos::new(4, 64, 4)), 2);
        assert!(ctx.light().is_empty() && ctx.heat().is_empty());
        assert_eq!(ctx.block_changed(&p, BlockPos::new(4, 64, 4)), 0);
    }

    #[test]
    fn test_clear_partition() {
        let ctx = PerceptionContext::new(PerceptionConfig::default()).unwrap();
        let p = PartitionId::from("nether");
        ctx.acoustic().insert(&p, BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Vocal, 0);
        ctx.clear_partition(&p);
        assert!(ctx.acoustic().is_empty());
    }
}
