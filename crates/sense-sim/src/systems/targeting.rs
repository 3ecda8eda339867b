//! Direct Targeting System
//!
//! The close-combat layer. A mob that gets within striking distance of a
//! visible player locks onto it directly; perception then stands aside.

use bevy_ecs::prelude::*;

use sense_core::EntityQuery;
use sense_events::{Aabb, EntityKind};

use crate::components::{Alive, DirectTarget, Mob, Partition, Position};
use crate::world_index::WorldIndex;

/// Targeting constants
pub mod constants {
    /// A visible player this close is locked onto
    pub const ACQUIRE_RANGE: f64 = 4.0;
    /// A locked player further away than this is let go
    pub const DROP_RANGE: f64 = 8.0;
}

/// System: acquire, keep or drop each mob's direct target
pub fn acquire_direct_targets(
    index: Res<WorldIndex>,
    mut mobs: Query<(&Position, &Partition, &mut DirectTarget), (With<Mob>, With<Alive>)>,
) {
    for (position, partition, mut direct) in mobs.iter_mut() {
        let partition = &partition.0;

        if let Some(target) = direct.0 {
            let keep = index.position_of(partition, target).map_or(false, |p| {
                p.distance_squared(&position.0) <= constants::DROP_RANGE * constants::DROP_RANGE
            });
            if keep {
                continue;
            }
            direct.0 = None;
        }

        let bounds = Aabb::around(position.0, constants::ACQUIRE_RANGE);
        let range_sq = constants::ACQUIRE_RANGE * constants::ACQUIRE_RANGE;
        direct.0 = index
            .entities_in_box(partition, &bounds, &[EntityKind::Player])
            .into_iter()
            .map(|s| (s.position.distance_squared(&position.0), s))
            .filter(|(d, s)| {
                *d <= range_sq && index.has_line_of_sight(partition, &position.0, &s.position)
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, s)| s.id);
    }
}
