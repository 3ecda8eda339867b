//! Static Feature Types
//!
//! Attractors found by scanning the world: light and heat emitting blocks.

use serde::{Deserialize, Serialize};

use crate::acoustic::clamp_unit;
use crate::geometry::{BlockPos, Coord};

/// Which attractor a scan looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Light,
    Heat,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Light => "light",
            FeatureKind::Heat => "heat",
        }
    }
}

/// An attractor found by a region scan. Immutable once scanned; the distance
/// to a query point is computed per query and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSource {
    pub position: BlockPos,
    pub attraction_weight: f32,
}

impl FeatureSource {
    /// Clamps the weight to `(0, 1]`; returns `None` for non-positive weights.
    pub fn new(position: BlockPos, attraction_weight: f32) -> Option<Self> {
        let attraction_weight = clamp_unit(attraction_weight);
        (attraction_weight > 0.0).then_some(Self {
            position,
            attraction_weight,
        })
    }

    pub fn distance_to(&self, point: &Coord) -> f64 {
        self.position.center().distance(point)
    }

    /// `weight × (1 − distance / range)`; `None` when out of range or not positive.
    pub fn score_from(&self, point: &Coord, range: f64) -> Option<f32> {
        if range <= 0.0 {
            return None;
        }
        let center = self.position.center();
        let distance_sq = center.distance_squared(point);
        if distance_sq > range * range {
            return None;
        }
        let score = self.attraction_weight as f64 * (1.0 - distance_sq.sqrt() / range);
        (score > 0.0).then_some(score as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_weight_rejected() {
        assert!(FeatureSource::new(BlockPos::new(0, 0, 0), 0.0).is_none());
        assert!(FeatureSource::new(BlockPos::new(0, 0, 0), -1.0).is_none());
        let clamped = FeatureSource::new(BlockPos::new(0, 0, 0), 3.0).unwrap();
        assert_eq!(clamped.attraction_weight, 1.0);
    }

    #[test]
    fn test_score_falls_off_with_distance() {
        let source = FeatureSource::new(BlockPos::new(0, 0, 0), 1.0).unwrap();
        let at = source.position.center();

        assert_eq!(source.score_from(&at, 16.0), Some(1.0));
        let half = source.score_from(&at.offset(8.0, 0.0, 0.0), 16.0).unwrap();
        assert!((half - 0.5).abs() < 1e-6);
        assert_eq!(source.score_from(&at.offset(16.0, 0.0, 0.0), 16.0), None);
        assert_eq!(source.score_from(&at.offset(20.0, 0.0, 0.0), 16.0), None);
    }
}
