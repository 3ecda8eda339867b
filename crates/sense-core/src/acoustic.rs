//! Acoustic Registry
//!
//! Per-partition store of short-lived noises. Any subsystem may register a
//! noise through [`SoundEmitter`]; agents query the registry on their
//! perception turn.

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

use sense_events::{AcousticEvent, BlockPos, Coord, EntityId, PartitionId, SoundCategory, Step};

use crate::config::AcousticConfig;

/// The single write entry point for noises from outside the engine.
pub trait SoundEmitter {
    fn emit(
        &self,
        partition: &PartitionId,
        position: BlockPos,
        volume: f32,
        source: Option<EntityId>,
        category: SoundCategory,
        step: Step,
    );
}

/// Concurrent store of acoustic events.
///
/// The outer map is sharded by partition; each partition's list has its own
/// lock, so contention stays local to the partition being touched.
#[derive(Debug)]
pub struct AcousticRegistry {
    partitions: DashMap<PartitionId, RwLock<Vec<AcousticEvent>>>,
    decay_window: Step,
    base_range: f64,
}

impl AcousticRegistry {
    pub fn new(config: &AcousticConfig) -> Self {
        Self::with_settings(config.decay_window, config.base_range)
    }

    pub fn with_settings(decay_window: Step, base_range: f64) -> Self {
        Self {
            partitions: DashMap::new(),
            decay_window,
            base_range: base_range.max(0.0),
        }
    }

    pub fn decay_window(&self) -> Step {
        self.decay_window
    }

    pub fn base_range(&self) -> f64 {
        self.base_range
    }

    /// Appends an event. No deduplication: overlapping events are expected.
    pub fn insert(
        &self,
        partition: &PartitionId,
        position: BlockPos,
        intensity: f32,
        source: Option<EntityId>,
        category: SoundCategory,
        step: Step,
    ) {
        let event = AcousticEvent::new(position, intensity, step, source, category);
        if let Some(events) = self.partitions.get(partition) {
            events.write().push(event);
            return;
        }
        self.partitions
            .entry(partition.clone())
            .or_default()
            .write()
            .push(event);
    }

    /// Live events whose effective range covers the listener, capped by
    /// the listener's own `max_range`.
    pub fn query_in_range(
        &self,
        partition: &PartitionId,
        listener: Coord,
        max_range: f64,
        step: Step,
    ) -> Vec<AcousticEvent> {
        let Some(events) = self.partitions.get(partition) else {
            return Vec::new();
        };
        let events = events.read();
        events
            .iter()
            .filter(|event| self.audible(event, &listener, max_range, step).is_some())
            .cloned()
            .collect()
    }

    /// The loudest audible event, scored as
    /// `effective_volume × (1 − distance / effective_range)`.
    ///
    /// Events from `ignore_source` are skipped. Among exact ties the first
    /// inserted wins; callers should not depend on that.
    pub fn best_event(
        &self,
        partition: &PartitionId,
        listener: Coord,
        max_range: f64,
        step: Step,
        ignore_source: Option<EntityId>,
    ) -> Option<(AcousticEvent, f32)> {
        let events = self.partitions.get(partition)?;
        let events = events.read();

        let mut best: Option<(&AcousticEvent, f32)> = None;
        for event in events.iter() {
            if ignore_source.is_some() && event.source_id == ignore_source {
                continue;
            }
            let Some((distance_sq, effective_range)) =
                self.audible(event, &listener, max_range, step)
            else {
                continue;
            };
            let falloff = 1.0 - distance_sq.sqrt() / effective_range;
            let score = event.effective_volume(step, self.decay_window) as f64 * falloff;
            if score <= 0.0 {
                continue;
            }
            let score = score as f32;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((event, score));
            }
        }

        best.map(|(event, score)| (event.clone(), score))
    }

    /// Drops every event whose age has reached the decay window. Returns the
    /// number removed.
    pub fn sweep(&self, step: Step) -> usize {
        let mut removed = 0;
        for partition in self.partitions.iter() {
            let mut events = partition.value().write();
            let before = events.len();
            events.retain(|event| !event.is_expired(step, self.decay_window));
            removed += before - events.len();
        }
        if removed > 0 {
            trace!(step, removed, "swept expired acoustic events");
        }
        removed
    }

    pub fn clear(&self, partition: &PartitionId) {
        self.partitions.remove(partition);
    }

    pub fn clear_all(&self) {
        self.partitions.clear();
    }

    /// Number of stored events in a partition, expired or not.
    pub fn len(&self, partition: &PartitionId) -> usize {
        self.partitions
            .get(partition)
            .map(|events| events.read().len())
            .unwrap_or(0)
    }

    pub fn total_len(&self) -> usize {
        self.partitions
            .iter()
            .map(|partition| partition.value().read().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Squared distance and effective range when the event reaches the
    /// listener. Filters on squared distance only.
    fn audible(
        &self,
        event: &AcousticEvent,
        listener: &Coord,
        max_range: f64,
        step: Step,
    ) -> Option<(f64, f64)> {
        if event.is_expired(step, self.decay_window) {
            return None;
        }
        let effective_range = event.effective_range(self.base_range);
        if effective_range <= 0.0 || max_range <= 0.0 {
            return None;
        }
        let distance_sq = event.position.center().distance_squared(listener);
        let reach = effective_range.min(max_range);
        (distance_sq <= reach * reach).then_some((distance_sq, effective_range))
    }
}

impl SoundEmitter for AcousticRegistry {
    fn emit(
        &self,
        partition: &PartitionId,
        position: BlockPos,
        volume: f32,
        source: Option<EntityId>,
        category: SoundCategory,
        step: Step,
    ) {
        self.insert(partition, position, volume, source, category, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> PartitionId {
        PartitionId::from("overworld")
    }

    fn registry() -> AcousticRegistry {
        AcousticRegistry::with_settings(100, 32.0)
    }

    /// Listener `distance` units east of the center of the block at the origin.
    fn listener_at(distance: f64) -> Coord {
        BlockPos::new(0, 64, 0).center().offset(distance, 0.0, 0.0)
    }

    #[test]
    fn test_event_heard_then_decays() {
        let registry = registry();
        registry.insert(&overworld(), BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Detonation, 0);

        let (event, score) = registry
            .best_event(&overworld(), listener_at(10.0), 64.0, 0, None)
            .expect("event should be heard at distance 10");
        assert_eq!(event.category, SoundCategory::Detonation);
        assert!(score > 0.0);

        assert!(registry
            .best_event(&overworld(), listener_at(10.0), 64.0, 100, None)
            .is_none());
        assert!(registry.query_in_range(&overworld(), listener_at(10.0), 64.0, 100).is_empty());
    }

    #[test]
    fn test_unknown_partition_is_empty() {
        let registry = registry();
        let nether = PartitionId::from("nether");
        assert!(registry.query_in_range(&nether, Coord::ORIGIN, 32.0, 0).is_empty());
        assert!(registry.best_event(&nether, Coord::ORIGIN, 32.0, 0, None).is_none());
        assert_eq!(registry.len(&nether), 0);
    }

    #[test]
    fn test_effective_range_limits_reach() {
        let registry = registry();
        // Half intensity reaches 16 units
        registry.insert(&overworld(), BlockPos::new(0, 64, 0), 0.5, None, SoundCategory::Impact, 0);

        assert_eq!(registry.query_in_range(&overworld(), listener_at(15.0), 64.0, 0).len(), 1);
        assert!(registry.query_in_range(&overworld(), listener_at(17.0), 64.0, 0).is_empty());
    }

    #[test]
    fn test_listener_range_limits_reach() {
        let registry = registry();
        registry.insert(&overworld(), BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Impact, 0);

        assert!(registry.query_in_range(&overworld(), listener_at(20.0), 10.0, 0).is_empty());
        assert_eq!(registry.query_in_range(&overworld(), listener_at(20.0), 32.0, 0).len(), 1);
    }

    #[test]
    fn test_best_event_prefers_louder_and_closer() {
        let registry = registry();
        let p = overworld();
        registry.insert(&p, BlockPos::new(20, 64, 0), 0.8, None, SoundCategory::Combat, 0);
        registry.insert(&p, BlockPos::new(4, 64, 0), 0.8, None, SoundCategory::Vocal, 0);

        let (event, _) = registry.best_event(&p, listener_at(0.0), 64.0, 0, None).unwrap();
        assert_eq!(event.category, SoundCategory::Vocal);
    }

    #[test]
    fn test_best_event_ignores_own_noise() {
        let registry = registry();
        let p = overworld();
        let me = EntityId(7);
        registry.insert(&p, BlockPos::new(0, 64, 0), 1.0, Some(me), SoundCategory::Locomotion, 0);

        assert!(registry.best_event(&p, listener_at(2.0), 32.0, 0, Some(me)).is_none());
        assert!(registry.best_event(&p, listener_at(2.0), 32.0, 0, None).is_some());
    }

    #[test]
    fn test_exact_ties_keep_first_inserted() {
        let registry = registry();
        let p = overworld();
        registry.insert(&p, BlockPos::new(0, 64, 0), 1.0, Some(EntityId(1)), SoundCategory::Vocal, 0);
        registry.insert(&p, BlockPos::new(0, 64, 0), 1.0, Some(EntityId(2)), SoundCategory::Vocal, 0);

        let (event, _) = registry.best_event(&p, listener_at(3.0), 32.0, 0, None).unwrap();
        assert_eq!(event.source_id, Some(EntityId(1)));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let registry = registry();
        let p = overworld();
        registry.insert(&p, BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Generic, 0);
        registry.insert(&p, BlockPos::new(1, 64, 0), 1.0, None, SoundCategory::Generic, 50);

        assert_eq!(registry.sweep(99), 0);
        assert_eq!(registry.sweep(100), 1);
        assert_eq!(registry.len(&p), 1);
        assert_eq!(registry.sweep(150), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_partition() {
        let registry = registry();
        let nether = PartitionId::from("nether");
        registry.insert(&overworld(), BlockPos::new(0, 0, 0), 1.0, None, SoundCategory::Generic, 0);
        registry.insert(&nether, BlockPos::new(0, 0, 0), 1.0, None, SoundCategory::Generic, 0);

        registry.clear(&nether);
        assert_eq!(registry.len(&nether), 0);
        assert_eq!(registry.len(&overworld()), 1);

        registry.clear_all();
        assert_eq!(registry.total_len(), 0);
    }

    #[test]
    fn test_emit_clamps_volume() {
        let registry = registry();
        registry.emit(&overworld(), BlockPos::new(0, 64, 0), 1.3, None, SoundCategory::Detonation, 0);

        let events = registry.query_in_range(&overworld(), listener_at(31.0), 64.0, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].intensity, 1.0);
        assert!(registry.query_in_range(&overworld(), listener_at(33.0), 64.0, 0).is_empty());
    }
}
