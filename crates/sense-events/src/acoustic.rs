//! Acoustic Event Types
//!
//! Short-lived noises registered by gameplay and heard by agents.

use serde::{Deserialize, Serialize};

use crate::geometry::BlockPos;
use crate::ids::{EntityId, Step};

/// What produced a noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    #[default]
    Generic,
    Impact,
    Structural,
    Vocal,
    Combat,
    Locomotion,
    Detonation,
}

impl SoundCategory {
    /// Conventional loudness for emitters that have no better figure.
    pub fn default_intensity(self) -> f32 {
        match self {
            SoundCategory::Detonation => 1.0,
            SoundCategory::Combat => 0.8,
            SoundCategory::Structural => 0.7,
            SoundCategory::Impact => 0.6,
            SoundCategory::Vocal => 0.5,
            SoundCategory::Generic => 0.4,
            SoundCategory::Locomotion => 0.3,
        }
    }

    /// Returns all category variants.
    pub fn all() -> &'static [SoundCategory] {
        &[
            SoundCategory::Generic,
            SoundCategory::Impact,
            SoundCategory::Structural,
            SoundCategory::Vocal,
            SoundCategory::Combat,
            SoundCategory::Locomotion,
            SoundCategory::Detonation,
        ]
    }
}

/// A noise at a voxel, fading linearly over the registry's decay window.
///
/// Immutable once created. `intensity` is clamped to `[0, 1]` on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticEvent {
    pub position: BlockPos,
    pub intensity: f32,
    pub created_step: Step,
    pub source_id: Option<EntityId>,
    pub category: SoundCategory,
}

impl AcousticEvent {
    pub fn new(
        position: BlockPos,
        intensity: f32,
        created_step: Step,
        source_id: Option<EntityId>,
        category: SoundCategory,
    ) -> Self {
        Self {
            position,
            intensity: clamp_unit(intensity),
            created_step,
            source_id,
            category,
        }
    }

    /// Steps elapsed since creation. Zero for steps before creation.
    pub fn age(&self, step: Step) -> Step {
        step.saturating_sub(self.created_step)
    }

    pub fn is_expired(&self, step: Step, decay_window: Step) -> bool {
        self.age(step) >= decay_window
    }

    /// `intensity × max(0, 1 − age / decay_window)`.
    pub fn effective_volume(&self, step: Step, decay_window: Step) -> f32 {
        if decay_window == 0 {
            return 0.0;
        }
        let remaining = 1.0 - self.age(step) as f64 / decay_window as f64;
        (self.intensity as f64 * remaining.max(0.0)) as f32
    }

    /// `base_range × intensity`; never exceeds `base_range`.
    pub fn effective_range(&self, base_range: f64) -> f64 {
        base_range.max(0.0) * self.intensity as f64
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        let raw: AcousticEvent = serde_json::from_str(line)?;
        Ok(Self::new(
            raw.position,
            raw.intensity,
            raw.created_step,
            raw.source_id,
            raw.category,
        ))
    }
}

/// Clamps to `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
