//! Spatial Types
//!
//! Continuous world coordinates, voxel positions, and axis-aligned boxes.
//!
//! # Example
//!
//! ```
//! use sense_events::{BlockPos, Coord};
//!
//! let listener = Coord::new(10.5, 64.5, 0.5);
//! let block = BlockPos::new(0, 64, 0);
//! assert_eq!(BlockPos::containing(listener), BlockPos::new(10, 64, 0));
//! assert_eq!(block.center().distance(&listener), 10.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A continuous position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    pub const ORIGIN: Coord = Coord {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance. Used on every filtering path.
    #[inline]
    pub fn distance_squared(&self, other: &Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn distance(&self, other: &Coord) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Moves from `self` toward `target` by at most `step` units.
    pub fn step_toward(&self, target: &Coord, step: f64) -> Coord {
        let distance = self.distance(target);
        if distance <= step || distance == 0.0 {
            return *target;
        }
        let t = step / distance;
        Coord {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
            z: self.z + (target.z - self.z) * t,
        }
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Coord {
        Coord::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Integer voxel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The voxel that contains a continuous position.
    pub fn containing(coord: Coord) -> Self {
        Self {
            x: coord.x.floor() as i32,
            y: coord.y.floor() as i32,
            z: coord.z.floor() as i32,
        }
    }

    /// Center of the voxel in world space.
    pub fn center(&self) -> Coord {
        Coord::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> BlockPos {
        BlockPos::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Coord,
    pub max: Coord,
}

impl Aabb {
    pub fn new(min: Coord, max: Coord) -> Self {
        Self { min, max }
    }

    /// A cube of half-extent `radius` centered on `center`.
    pub fn around(center: Coord, radius: f64) -> Self {
        Self {
            min: center.offset(-radius, -radius, -radius),
            max: center.offset(radius, radius, radius),
        }
    }

    pub fn contains(&self, point: &Coord) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Coord::new(0.0, 0.0, 0.0);
        let b = Coord::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_block_containing_negative() {
        let pos = BlockPos::containing(Coord::new(-0.5, 10.2, -31.9));
        assert_eq!(pos, BlockPos::new(-1, 10, -32));
    }

    #[test]
    fn test_step_toward_stops_at_target() {
        let from = Coord::ORIGIN;
        let to = Coord::new(1.0, 0.0, 0.0);
        assert_eq!(from.step_toward(&to, 5.0), to);

        let partial = from.step_toward(&Coord::new(10.0, 0.0, 0.0), 2.0);
        assert!((partial.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_aabb_contains() {
        let aabb = Aabb::around(Coord::ORIGIN, 4.0);
        assert!(aabb.contains(&Coord::new(4.0, -4.0, 0.0)));
        assert!(!aabb.contains(&Coord::new(4.1, 0.0, 0.0)));
    }
}
