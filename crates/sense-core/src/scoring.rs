//! Channel Scoring
//!
//! One function per channel turning world state into an optional candidate,
//! and the running selection that fuses them.

use sense_events::{Aabb, Channel, Coord, EntityId, EntityKind, PartitionId, PerceptionTarget, Step};

use crate::config::{ScoringConfig, SmellCondition};
use crate::context::PerceptionContext;
use crate::profile::ChannelSettings;
use crate::world::{EntitySighting, WorldView};

/// The agent being evaluated, as seen by the scorers.
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    /// The agent's own entity, so it never perceives itself
    pub entity: EntityId,
    pub partition: &'a PartitionId,
    pub position: Coord,
    /// Set when the host has given the agent a directly visible target
    pub has_direct_target: bool,
}

/// Running best across channels.
///
/// A candidate replaces the current best only with a strictly greater
/// score, so among equal scores the channel offered first wins. The best
/// score is updated on every adoption.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    best: Option<PerceptionTarget>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate. Non-positive and non-finite scores are never
    /// detections. Returns true when the candidate was adopted.
    pub fn offer(&mut self, candidate: PerceptionTarget) -> bool {
        if !candidate.score.is_finite() || candidate.score <= 0.0 {
            return false;
        }
        match self.best {
            Some(best) if candidate.score <= best.score => false,
            _ => {
                self.best = Some(candidate);
                true
            }
        }
    }

    pub fn best_score(&self) -> Option<f32> {
        self.best.map(|b| b.score)
    }

    pub fn into_best(self) -> Option<PerceptionTarget> {
        self.best
    }
}

/// `1 − distance / range` when within range.
pub fn falloff(distance_sq: f64, range: f64) -> Option<f64> {
    if range <= 0.0 || distance_sq > range * range {
        return None;
    }
    Some(1.0 - distance_sq.sqrt() / range)
}

/// Nearest visible player, scored `(1 − d/r) × base_player_priority × weight`.
pub fn score_player<W: WorldView + ?Sized>(
    world: &W,
    agent: &AgentView<'_>,
    settings: &ChannelSettings,
    scoring: &ScoringConfig,
) -> Option<PerceptionTarget> {
    let sighting = nearest(
        world.entities_in_box(
            agent.partition,
            &Aabb::around(agent.position, settings.range),
            &[EntityKind::Player],
        ),
        agent,
        settings.range,
        |s| world.has_line_of_sight(agent.partition, &agent.position, &s.position),
    )?;
    let (sighting, distance_sq) = sighting;
    let raw = falloff(distance_sq, settings.range)? * scoring.base_player_priority as f64;
    Some(PerceptionTarget::entity(
        sighting.id,
        sighting.position,
        Channel::Player,
        (raw * settings.weight as f64) as f32,
    ))
}

/// Loudest audible noise, weighted by the agent's sound weight.
pub fn score_sound(
    context: &PerceptionContext,
    agent: &AgentView<'_>,
    settings: &ChannelSettings,
    step: Step,
) -> Option<PerceptionTarget> {
    let (event, score) = context.acoustic().best_event(
        agent.partition,
        agent.position,
        settings.range,
        step,
        Some(agent.entity),
    )?;
    Some(PerceptionTarget::at_position(
        event.position.center(),
        Channel::Sound,
        score * settings.weight,
    ))
}

/// Nearest smellable living entity, scored
/// `(1 − d/r) × base_value(kind) × weight`. Gated on the configured
/// condition; obstruction is ignored.
pub fn score_smell<W: WorldView + ?Sized>(
    world: &W,
    agent: &AgentView<'_>,
    settings: &ChannelSettings,
    scoring: &ScoringConfig,
) -> Option<PerceptionTarget> {
    let gate_open = match scoring.smell_condition {
        SmellCondition::Always => true,
        SmellCondition::Never => false,
        SmellCondition::Night => world.is_night(agent.partition),
    };
    if !gate_open {
        return None;
    }
    let kinds = scoring.smelled_kinds();
    if kinds.is_empty() {
        return None;
    }

    let (sighting, distance_sq) = nearest(
        world.entities_in_box(
            agent.partition,
            &Aabb::around(agent.position, settings.range),
            &kinds,
        ),
        agent,
        settings.range,
        |s| scoring.smell_base_value(s.kind) > 0.0,
    )?;
    let raw = falloff(distance_sq, settings.range)? * scoring.smell_base_value(sighting.kind) as f64;
    Some(PerceptionTarget::entity(
        sighting.id,
        sighting.position,
        Channel::Smell,
        (raw * settings.weight as f64) as f32,
    ))
}

/// Best cached light or heat source, weighted by the channel weight.
pub fn score_feature<W: WorldView + ?Sized>(
    context: &PerceptionContext,
    world: &W,
    agent: &AgentView<'_>,
    channel: Channel,
    settings: &ChannelSettings,
    step: Step,
) -> Option<PerceptionTarget> {
    let cache = match channel {
        Channel::Light => context.light(),
        Channel::Heat => context.heat(),
        _ => return None,
    };
    let (source, score) =
        cache.find_best(world, agent.partition, agent.position, settings.range, step)?;
    Some(PerceptionTarget::at_position(
        source.position.center(),
        channel,
        score * settings.weight,
    ))
}

/// Nearest point of interest, scored `(1 − d/r) × base_value × weight`.
pub fn score_structure<W: WorldView + ?Sized>(
    world: &W,
    agent: &AgentView<'_>,
    settings: &ChannelSettings,
    scoring: &ScoringConfig,
) -> Option<PerceptionTarget> {
    let poi = world.nearest_point_of_interest(agent.partition, &agent.position, settings.range)?;
    let raw = falloff(poi.position.distance_squared(&agent.position), settings.range)?
        * scoring.structure_base_value as f64;
    Some(PerceptionTarget::at_position(
        poi.position,
        Channel::Structure,
        (raw * settings.weight as f64) as f32,
    ))
}

/// Closest sighting within `range` passing `accept`, excluding the agent.
fn nearest(
    sightings: Vec<EntitySighting>,
    agent: &AgentView<'_>,
    range: f64,
    mut accept: impl FnMut(&EntitySighting) -> bool,
) -> Option<(EntitySighting, f64)> {
    let range_sq = range * range;
    let mut best: Option<(EntitySighting, f64)> = None;
    for sighting in sightings {
        if sighting.id == agent.entity {
            continue;
        }
        let distance_sq = sighting.position.distance_squared(&agent.position);
        if distance_sq > range_sq {
            continue;
        }
        if best.map_or(false, |(_, d)| distance_sq >= d) {
            continue;
        }
        if accept(&sighting) {
            best = Some((sighting, distance_sq));
        }
    }
    best
}
