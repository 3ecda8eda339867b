//! Region Feature Cache
//!
//! Caches the result of sampled volumetric scans for static attractors,
//! one entry per coarse region. Agents in the same neighborhood share one
//! scan per TTL window instead of scanning per agent per query.
//!
//! The scan volume is the region's bounds grown by a margin wide enough for
//! the querying range: at least `scan_margin`, at least the range, rounded
//! up to the sampling stride. An entry is a pure function of world state,
//! its region key and its margin, so two agents racing to rebuild the same
//! stale region store equivalent entries. A query that needs a wider margin
//! than the cached entry covers rebuilds it wider.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

use sense_events::{BlockPos, Coord, FeatureKind, FeatureSource, PartitionId, Step};

use crate::config::CacheConfig;
use crate::world::BlockSampler;

/// Coarse grid cell used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RegionKey {
    /// The region containing `point` for regions of edge `region_size`.
    pub fn containing(point: &Coord, region_size: u32) -> Self {
        let size = region_size.max(1) as f64;
        Self {
            x: (point.x / size).floor() as i32,
            y: (point.y / size).floor() as i32,
            z: (point.z / size).floor() as i32,
        }
    }

    /// Lowest voxel inside this region.
    pub fn min_block(&self, region_size: u32) -> BlockPos {
        let size = region_size as i32;
        BlockPos::new(self.x * size, self.y * size, self.z * size)
    }
}

/// Raw scan result for one region. Never mutated; replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCacheEntry {
    pub region_key: RegionKey,
    pub sources: Vec<FeatureSource>,
    pub created_step: Step,
    /// Voxels scanned beyond the region bounds on every side
    pub margin: u32,
}

impl RegionCacheEntry {
    /// Authoritative while `step − created_step < ttl`.
    pub fn is_live(&self, step: Step, ttl: Step) -> bool {
        step.saturating_sub(self.created_step) < ttl
    }

    /// Whether the scan that built this entry sampled the volume around `pos`.
    pub fn covers(&self, pos: BlockPos, region_size: u32) -> bool {
        let origin = self.region_key.min_block(region_size);
        let size = region_size as i32;
        let margin = self.margin as i32;
        let inside = |v: i32, lo: i32| v >= lo - margin && v < lo + size + margin;
        inside(pos.x, origin.x) && inside(pos.y, origin.y) && inside(pos.z, origin.z)
    }
}

type RegionMap = DashMap<RegionKey, Arc<RegionCacheEntry>>;

/// Region cache for one feature kind.
#[derive(Debug)]
pub struct RegionFeatureCache {
    kind: FeatureKind,
    settings: CacheConfig,
    partitions: DashMap<PartitionId, RegionMap>,
    scans: AtomicU64,
}

impl RegionFeatureCache {
    pub fn new(kind: FeatureKind, settings: CacheConfig) -> Self {
        Self {
            kind,
            settings,
            partitions: DashMap::new(),
            scans: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn settings(&self) -> &CacheConfig {
        &self.settings
    }

    /// Number of volumetric scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    /// Best source within `range` of `center`, scored as
    /// `weight × (1 − distance / range)`.
    ///
    /// Rebuilds the region's entry first if it is missing, past its TTL, or
    /// scanned with a margin narrower than `range`.
    pub fn find_best<S>(
        &self,
        sampler: &S,
        partition: &PartitionId,
        center: Coord,
        range: f64,
        step: Step,
    ) -> Option<(FeatureSource, f32)>
    where
        S: BlockSampler + ?Sized,
    {
        if range <= 0.0 {
            return None;
        }
        let key = RegionKey::containing(&center, self.settings.region_size);
        let entry = self.entry_covering(sampler, partition, key, self.margin_for(range), step);

        let mut best: Option<(FeatureSource, f32)> = None;
        for source in &entry.sources {
            let Some(score) = source.score_from(&center, range) else {
                continue;
            };
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*source, score));
            }
        }
        best
    }

    /// The live entry for a region at the configured margin, rebuilding it
    /// when stale or missing.
    pub fn entry<S>(
        &self,
        sampler: &S,
        partition: &PartitionId,
        key: RegionKey,
        step: Step,
    ) -> Arc<RegionCacheEntry>
    where
        S: BlockSampler + ?Sized,
    {
        self.entry_covering(sampler, partition, key, self.margin_for(0.0), step)
    }

    /// The live entry for a region scanned at least `margin` voxels past its
    /// bounds. A live but narrower entry is rebuilt at `margin`.
    pub fn entry_covering<S>(
        &self,
        sampler: &S,
        partition: &PartitionId,
        key: RegionKey,
        margin: u32,
        step: Step,
    ) -> Arc<RegionCacheEntry>
    where
        S: BlockSampler + ?Sized,
    {
        if let Some(entry) = self.cached(partition, key) {
            if entry.is_live(step, self.settings.ttl) && entry.margin >= margin {
                return entry;
            }
        }

        let entry = Arc::new(self.scan(sampler, partition, key, margin, step));
        self.store(partition, key, Arc::clone(&entry));
        entry
    }

    /// Scan margin that covers `range` from anywhere inside a region.
    pub fn margin_for(&self, range: f64) -> u32 {
        let stride = self.settings.sampling_stride.max(1);
        let needed = self.settings.scan_margin.max(range.max(0.0).ceil() as u32);
        needed.div_ceil(stride) * stride
    }

    /// Removes entries past their TTL. Returns the number removed.
    ///
    /// Stale entries are also caught lazily on access, so this only bounds
    /// memory and can run on any schedule.
    pub fn invalidate_expired(&self, step: Step) -> usize {
        let ttl = self.settings.ttl;
        let mut removed = 0;
        for regions in self.partitions.iter() {
            let before = regions.len();
            regions.retain(|_, entry| entry.is_live(step, ttl));
            removed += before - regions.len();
        }
        if removed > 0 {
            trace!(kind = self.kind.as_str(), step, removed, "invalidated expired regions");
        }
        removed
    }

    /// Drops every entry whose scan sampled `pos`, e.g. after a block change
    /// there. Returns the number removed.
    pub fn invalidate_at(&self, partition: &PartitionId, pos: BlockPos) -> usize {
        let Some(regions) = self.partitions.get(partition) else {
            return 0;
        };
        let region_size = self.settings.region_size;
        let before = regions.len();
        regions.retain(|_, entry| !entry.covers(pos, region_size));
        before - regions.len()
    }

    pub fn clear(&self, partition: &PartitionId) {
        self.partitions.remove(partition);
    }

    pub fn clear_all(&self) {
        self.partitions.clear();
    }

    /// Number of cached regions across all partitions.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|regions| regions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, partition: &PartitionId, key: RegionKey) -> Option<Arc<RegionCacheEntry>> {
        let regions = self.partitions.get(partition)?;
        let entry = regions.get(&key)?;
        let cached = Arc::clone(entry.value());
        Some(cached)
    }

    fn store(&self, partition: &PartitionId, key: RegionKey, entry: Arc<RegionCacheEntry>) {
        if let Some(regions) = self.partitions.get(partition) {
            regions.insert(key, entry);
            return;
        }
        self.partitions
            .entry(partition.clone())
            .or_default()
            .insert(key, entry);
    }

    /// Samples every `sampling_stride`-th voxel of the region grown by
    /// `margin` on each side.
    fn scan<S>(
        &self,
        sampler: &S,
        partition: &PartitionId,
        key: RegionKey,
        margin: u32,
        step: Step,
    ) -> RegionCacheEntry
    where
        S: BlockSampler + ?Sized,
    {
        let size = self.settings.region_size as i32;
        let extent = margin as i32;
        let stride = self.settings.sampling_stride.max(1) as usize;
        let origin = key.min_block(self.settings.region_size);

        let (x0, x1) = (origin.x - extent, origin.x + size + extent);
        let (y0, y1) = (origin.y - extent, origin.y + size + extent);
        let (z0, z1) = (origin.z - extent, origin.z + size + extent);

        let mut sources = Vec::new();
        for x in (x0..x1).step_by(stride) {
            for y in (y0..y1).step_by(stride) {
                for z in (z0..z1).step_by(stride) {
                    let pos = BlockPos::new(x, y, z);
                    if let Some(source) = sampler
                        .attraction(self.kind, partition, pos)
                        .and_then(|weight| FeatureSource::new(pos, weight))
                    {
                        sources.push(source);
                    }
                }
            }
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        trace!(
            kind = self.kind.as_str(),
            partition = %partition,
            region = ?key,
            margin,
            step,
            found = sources.len(),
            "rebuilt region cache entry"
        );

        RegionCacheEntry {
            region_key: key,
            sources,
            created_step: step,
            margin,
        }
    }
}
