//! Configuration loading for the perception engine.
//!
//! All tunables are read from a TOML file. Every section falls back to its
//! documented defaults, so partial files are fine. The engine treats the
//! loaded values as read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use sense_events::{EntityKind, Step};

use crate::error::{PerceptionError, Result};
use crate::profile::{builtin_profiles, PerceptionProfile};

/// Complete perception configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionConfig {
    /// Acoustic event decay and reach
    #[serde(default)]
    pub acoustic: AcousticConfig,
    /// Region cache sizing and lifetime
    #[serde(default)]
    pub cache: CacheConfig,
    /// Per-agent throttling
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    /// Channel base values
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Profiles by agent kind. Replaces the built-in set when present.
    #[serde(default = "builtin_profiles")]
    pub profiles: BTreeMap<String, PerceptionProfile>,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            acoustic: AcousticConfig::default(),
            cache: CacheConfig::default(),
            scheduling: SchedulingConfig::default(),
            scoring: ScoringConfig::default(),
            profiles: builtin_profiles(),
        }
    }
}

impl PerceptionConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the values the engine divides or strides by.
    pub fn validate(&self) -> Result<()> {
        if self.acoustic.decay_window == 0 {
            return Err(PerceptionError::InvalidConfig(
                "acoustic.decay_window must be at least 1 step".into(),
            ));
        }
        if self.acoustic.base_range.is_nan() || self.acoustic.base_range < 0.0 {
            return Err(PerceptionError::InvalidConfig(format!(
                "acoustic.base_range must be non-negative, got {}",
                self.acoustic.base_range
            )));
        }
        if self.cache.region_size == 0 {
            return Err(PerceptionError::InvalidConfig(
                "cache.region_size must be positive".into(),
            ));
        }
        if self.cache.sampling_stride == 0 {
            return Err(PerceptionError::InvalidConfig(
                "cache.sampling_stride must be positive".into(),
            ));
        }
        if self.cache.ttl == 0 {
            return Err(PerceptionError::InvalidConfig(
                "cache.ttl must be at least 1 step".into(),
            ));
        }
        if self.cache.sampling_stride > self.cache.region_size {
            return Err(PerceptionError::InvalidConfig(format!(
                "cache.sampling_stride ({}) should be <= cache.region_size ({})",
                self.cache.sampling_stride, self.cache.region_size
            )));
        }
        Ok(())
    }
}

/// Acoustic registry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticConfig {
    /// Steps until an event has fully decayed and is swept
    pub decay_window: Step,
    /// Reach of a full-intensity event in world units
    pub base_range: f64,
}

impl Default for AcousticConfig {
    fn default() -> Self {
        Self {
            decay_window: 100,
            base_range: 32.0,
        }
    }
}

/// Region feature cache settings, shared by the light and heat caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Edge length of a cached region in world units
    pub region_size: u32,
    /// Steps a region entry stays authoritative
    pub ttl: Step,
    /// Only every n-th voxel along each axis is sampled
    pub sampling_stride: u32,
    /// Minimum reach of a scan past the region's bounds; wider ranges widen it
    pub scan_margin: u32,
    /// Steps between opportunistic sweeps of expired entries
    pub invalidate_interval: Step,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            region_size: 32,
            ttl: 200,
            sampling_stride: 2,
            scan_margin: 16,
            invalidate_interval: 100,
        }
    }
}

/// Per-agent throttling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Steps an idle agent reuses its last gate result before evaluating again
    pub cooldown: u32,
    /// Steps a tracking agent waits before re-evaluating its target
    pub recheck_interval: u32,
    /// Stagger offsets are spread over this many steps
    pub stagger_window: u32,
    /// A tracked position closer than this counts as reached
    pub reach_distance: f64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            cooldown: 20,
            recheck_interval: 40,
            stagger_window: 20,
            reach_distance: 1.5,
        }
    }
}

/// When the smell channel may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmellCondition {
    /// Only while it is night in the agent's partition
    #[default]
    Night,
    Always,
    Never,
}

/// Base values for the channel scoring formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplier that keeps direct adversaries above every other channel
    pub base_player_priority: f32,
    /// Base value of a point of interest
    pub structure_base_value: f32,
    pub smell_condition: SmellCondition,
    /// Smell base value by entity kind name; missing kinds are not smelled
    pub smell_base_values: BTreeMap<String, f32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut smell_base_values = BTreeMap::new();
        smell_base_values.insert(EntityKind::Player.as_str().to_string(), 1.0);
        smell_base_values.insert(EntityKind::Villager.as_str().to_string(), 0.8);
        smell_base_values.insert(EntityKind::Livestock.as_str().to_string(), 0.5);
        smell_base_values.insert(EntityKind::Wildlife.as_str().to_string(), 0.3);

        Self {
            base_player_priority: 100.0,
            structure_base_value: 1.0,
            smell_condition: SmellCondition::Night,
            smell_base_values,
        }
    }
}

impl ScoringConfig {
    /// Smell base value for a kind; zero for kinds that are not smelled.
    pub fn smell_base_value(&self, kind: EntityKind) -> f32 {
        self.smell_base_values
            .get(kind.as_str())
            .copied()
            .filter(|v| *v > 0.0)
            .unwrap_or(0.0)
    }

    /// Kinds with a positive smell value, i.e. the smell channel's query set.
    pub fn smelled_kinds(&self) -> Vec<EntityKind> {
        EntityKind::all()
            .iter()
            .copied()
            .filter(|k| k.is_warm_blooded() && self.smell_base_value(*k) > 0.0)
            .collect()
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Perception Configuration

[acoustic]
decay_window = 100
base_range = 32.0

[cache]
region_size = 32
ttl = 200
sampling_stride = 2
scan_margin = 16
invalidate_interval = 100

[scheduling]
cooldown = 20
recheck_interval = 40
stagger_window = 20
reach_distance = 1.5

[scoring]
base_player_priority = 100.0
structure_base_value = 1.0
smell_condition = "night"

[scoring.smell_base_values]
player = 1.0
villager = 0.8
livestock = 0.5
wildlife = 0.3

# Profiles replace the built-in set when any are listed.
# Channels not listed keep their defaults (player and sound on).
[profiles.default]

[profiles.zombie]
smell = { enabled = true, range = 24.0, weight = 0.8 }
structure = { enabled = true, range = 64.0, weight = 0.3, speed = 0.8 }

[profiles.skeleton]
player = { enabled = true, range = 20.0, weight = 1.0, speed = 1.0 }
light = { enabled = true, range = 16.0, weight = 0.6 }

[profiles.spider]
smell = { enabled = true, range = 16.0, weight = 1.0, speed = 1.3 }
heat = { enabled = true, range = 12.0, weight = 0.5 }

[profiles.night_stalker]
player = { enabled = true, range = 24.0, weight = 1.2, speed = 1.4 }
sound = { enabled = true, range = 40.0, weight = 1.2 }
smell = { enabled = true, range = 32.0, weight = 1.0 }
light = { enabled = true, range = 16.0, weight = 0.8 }
heat = { enabled = true, range = 16.0, weight = 0.6 }
structure = { enabled = true, range = 96.0, weight = 0.4 }
"#
    .to_string()
}
