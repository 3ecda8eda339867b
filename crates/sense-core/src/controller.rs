//! Perception Controller
//!
//! Per-agent driver. On a staggered, throttled schedule it evaluates every
//! enabled channel, keeps the winning target until it has to be
//! re-evaluated, and hands a movement intent to the host.

use std::sync::Arc;
use tracing::debug;

use sense_events::{AgentKey, Channel, Coord, EntityId, PerceptionTarget, Step, Transition};

use crate::config::SchedulingConfig;
use crate::context::PerceptionContext;
use crate::profile::PerceptionProfile;
use crate::scoring::{
    score_feature, score_player, score_smell, score_sound, score_structure, AgentView, Selection,
};
use crate::world::WorldView;

/// Where the host should move the agent this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntent {
    pub destination: Coord,
    /// Speed multiplier of the channel that produced the target
    pub speed: f64,
    /// Set when pursuing an entity rather than a fixed point
    pub entity: Option<EntityId>,
}

/// Result of one controller step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerceptionOutput {
    pub target: Option<PerceptionTarget>,
    pub movement: Option<MovementIntent>,
    pub transition: Option<Transition>,
}

/// Short-lived state owned by one agent's update path.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionState {
    pub target_position: Option<Coord>,
    /// Identifier only; liveness is checked through the world every step
    pub target_entity: Option<EntityId>,
    pub active_channel: Option<Channel>,
    pub target_score: f32,
    /// Fixed at creation from the agent key
    pub stagger_offset: u32,
    pub ticks_until_recheck: u32,
    pub cooldown: u32,
    /// Result of the last full evaluation, reused while on cooldown
    pub last_decision: bool,
}

impl PerceptionState {
    fn new(stagger_offset: u32) -> Self {
        Self {
            target_position: None,
            target_entity: None,
            active_channel: None,
            target_score: 0.0,
            stagger_offset,
            ticks_until_recheck: 0,
            // First evaluation is spread over the stagger window too
            cooldown: stagger_offset,
            last_decision: false,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active_channel.is_some()
            && (self.target_position.is_some() || self.target_entity.is_some())
    }
}

/// Drives one agent's perception.
#[derive(Debug, Clone)]
pub struct PerceptionController {
    key: AgentKey,
    profile: Arc<PerceptionProfile>,
    scheduling: SchedulingConfig,
    state: PerceptionState,
}

impl PerceptionController {
    pub fn new(key: AgentKey, profile: Arc<PerceptionProfile>, scheduling: &SchedulingConfig) -> Self {
        let stagger_offset = key.slot(scheduling.stagger_window);
        Self {
            key,
            profile,
            scheduling: scheduling.clone(),
            state: PerceptionState::new(stagger_offset),
        }
    }

    pub fn key(&self) -> AgentKey {
        self.key
    }

    pub fn profile(&self) -> &PerceptionProfile {
        &self.profile
    }

    pub fn state(&self) -> &PerceptionState {
        &self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    pub fn current_target(&self) -> Option<PerceptionTarget> {
        let channel = self.state.active_channel?;
        let position = self.state.target_position?;
        Some(PerceptionTarget {
            position: Some(position),
            entity: self.state.target_entity,
            channel,
            score: self.state.target_score,
        })
    }

    /// Advances the agent by one step.
    pub fn tick<W>(
        &mut self,
        context: &PerceptionContext,
        world: &W,
        agent: &AgentView<'_>,
        step: Step,
    ) -> PerceptionOutput
    where
        W: WorldView + ?Sized,
    {
        // A directly acquired target always takes precedence
        if agent.has_direct_target {
            if self.is_tracking() {
                debug!(agent = %self.key, step, "yielding to direct target");
                self.clear_target();
                return self.output(Some(Transition::Yielded));
            }
            return PerceptionOutput::default();
        }

        if self.is_tracking() {
            if let Some(transition) = self.check_target(world, agent) {
                return self.output(Some(transition));
            }
            let transition = self.recheck(context, world, agent, step);
            return self.output(transition);
        }

        if self.can_act(context, world, agent, step) && self.is_tracking() {
            if let Some(target) = self.current_target() {
                debug!(
                    agent = %self.key,
                    step,
                    channel = %target.channel,
                    score = target.score,
                    "acquired target"
                );
            }
            return self.output(Some(Transition::Acquired));
        }
        PerceptionOutput::default()
    }

    /// Cheap per-step gate. While the cooldown runs it returns the cached
    /// result of the last full evaluation; otherwise it evaluates, adopts
    /// the winner and restarts the cooldown.
    pub fn can_act<W>(
        &mut self,
        context: &PerceptionContext,
        world: &W,
        agent: &AgentView<'_>,
        step: Step,
    ) -> bool
    where
        W: WorldView + ?Sized,
    {
        if self.state.cooldown > 0 {
            self.state.cooldown -= 1;
            return self.state.last_decision;
        }

        let best = self.evaluate(context, world, agent, step);
        self.state.cooldown = self.scheduling.cooldown;
        self.state.last_decision = best.is_some();
        if let Some(target) = best {
            self.adopt(target);
        }
        self.state.last_decision
    }

    /// Full channel evaluation in priority order. Pure: reads the world and
    /// shared stores, never touches controller state.
    ///
    /// A candidate replaces the running best only with a strictly greater
    /// score. A direct adversary ends the evaluation.
    pub fn evaluate<W>(
        &self,
        context: &PerceptionContext,
        world: &W,
        agent: &AgentView<'_>,
        step: Step,
    ) -> Option<PerceptionTarget>
    where
        W: WorldView + ?Sized,
    {
        let scoring = &context.config().scoring;
        let mut selection = Selection::new();

        for channel in self.profile.active_channels() {
            let settings = self.profile.channel(channel);
            let candidate = match channel {
                Channel::Player => score_player(world, agent, settings, scoring),
                Channel::Sound => score_sound(context, agent, settings, step),
                Channel::Smell => score_smell(world, agent, settings, scoring),
                Channel::Light | Channel::Heat => {
                    score_feature(context, world, agent, channel, settings, step)
                }
                Channel::Structure => score_structure(world, agent, settings, scoring),
            };
            let Some(candidate) = candidate else {
                continue;
            };
            if selection.offer(candidate) && channel == Channel::Player {
                break;
            }
        }

        selection.into_best()
    }

    /// Stops the behavior and restores the initial schedule.
    pub fn reset(&mut self) -> Option<Transition> {
        let was_tracking = self.is_tracking();
        self.state = PerceptionState::new(self.state.stagger_offset);
        was_tracking.then_some(Transition::Released)
    }

    /// Liveness and reach checks on the current target.
    fn check_target<W>(&mut self, world: &W, agent: &AgentView<'_>) -> Option<Transition>
    where
        W: WorldView + ?Sized,
    {
        if let Some(entity) = self.state.target_entity {
            let position = world
                .is_alive(agent.partition, entity)
                .then(|| world.position_of(agent.partition, entity))
                .flatten();
            let Some(position) = position else {
                debug!(agent = %self.key, %entity, "tracked entity gone");
                self.lose_target();
                return Some(Transition::Lost);
            };
            self.state.target_position = Some(position);
            return None;
        }

        let position = self.state.target_position?;
        let reach = self.scheduling.reach_distance;
        if position.distance_squared(&agent.position) < reach * reach {
            debug!(agent = %self.key, "reached target position");
            self.lose_target();
            return Some(Transition::Reached);
        }
        None
    }

    /// Counts down the recheck timer and re-evaluates when it runs out.
    fn recheck<W>(
        &mut self,
        context: &PerceptionContext,
        world: &W,
        agent: &AgentView<'_>,
        step: Step,
    ) -> Option<Transition>
    where
        W: WorldView + ?Sized,
    {
        self.state.ticks_until_recheck = self.state.ticks_until_recheck.saturating_sub(1);
        if self.state.ticks_until_recheck > 0 {
            return None;
        }

        let previous = self.current_target();
        match self.evaluate(context, world, agent, step) {
            Some(target) => {
                self.adopt(target);
                let changed = previous.map_or(true, |p| !same_target(&p, &target));
                if changed {
                    debug!(
                        agent = %self.key,
                        step,
                        channel = %target.channel,
                        score = target.score,
                        "retargeted"
                    );
                }
                changed.then_some(Transition::Retargeted)
            }
            None => {
                debug!(agent = %self.key, step, "nothing perceived on recheck");
                self.lose_target();
                Some(Transition::Lost)
            }
        }
    }

    fn adopt(&mut self, target: PerceptionTarget) {
        self.state.target_position = target.position;
        self.state.target_entity = target.entity;
        self.state.active_channel = Some(target.channel);
        self.state.target_score = target.score;
        self.state.ticks_until_recheck =
            self.scheduling.recheck_interval + self.state.stagger_offset;
    }

    fn clear_target(&mut self) {
        self.state.target_position = None;
        self.state.target_entity = None;
        self.state.active_channel = None;
        self.state.target_score = 0.0;
        self.state.last_decision = false;
    }

    /// Back to idle; the next evaluation waits for a full cooldown.
    fn lose_target(&mut self) {
        self.clear_target();
        self.state.cooldown = self.scheduling.cooldown;
    }

    fn output(&self, transition: Option<Transition>) -> PerceptionOutput {
        let target = self.current_target();
        let movement = target.and_then(|t| {
            Some(MovementIntent {
                destination: t.position?,
                speed: self.profile.channel(t.channel).speed,
                entity: t.entity,
            })
        });
        PerceptionOutput {
            target,
            movement,
            transition,
        }
    }
}

fn same_target(a: &PerceptionTarget, b: &PerceptionTarget) -> bool {
    match (a.entity, b.entity) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.channel == b.channel && a.position == b.position,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerceptionConfig;
    use crate::profile::ChannelSettings;
    use crate::world::{BlockSampler, EntityQuery, EntitySighting, PoiQuery, PointOfInterest, WorldConditions};
    use sense_events::{Aabb, BlockPos, EntityKind, FeatureKind, PartitionId, SoundCategory};

    /// A world with a handful of players and nothing else.
    #[derive(Default)]
    struct Players(Vec<(EntityId, Coord)>);

    impl EntityQuery for Players {
        fn entities_in_box(
            &self,
            _partition: &PartitionId,
            bounds: &Aabb,
            kinds: &[EntityKind],
        ) -> Vec<EntitySighting> {
            if !kinds.contains(&EntityKind::Player) {
                return Vec::new();
            }
            self.0
                .iter()
                .filter(|(_, p)| bounds.contains(p))
                .map(|(id, p)| EntitySighting {
                    id: *id,
                    kind: EntityKind::Player,
                    position: *p,
                })
                .collect()
        }

        fn is_alive(&self, _partition: &PartitionId, id: EntityId) -> bool {
            self.0.iter().any(|(e, _)| *e == id)
        }

        fn position_of(&self, _partition: &PartitionId, id: EntityId) -> Option<Coord> {
            self.0.iter().find(|(e, _)| *e == id).map(|(_, p)| *p)
        }
    }

    impl BlockSampler for Players {
        fn attraction(&self, _: FeatureKind, _: &PartitionId, _: BlockPos) -> Option<f32> {
            None
        }
    }

    impl PoiQuery for Players {
        fn nearest_point_of_interest(&self, _: &PartitionId, _: &Coord, _: f64) -> Option<PointOfInterest> {
            None
        }
    }

    impl WorldConditions for Players {
        fn is_night(&self, _: &PartitionId) -> bool {
            false
        }
    }

    fn context() -> PerceptionContext {
        PerceptionContext::new(PerceptionConfig::default()).unwrap()
    }

    fn controller(stagger_window: u32) -> PerceptionController {
        let scheduling = SchedulingConfig {
            cooldown: 5,
            recheck_interval: 10,
            stagger_window,
            reach_distance: 1.5,
        };
        let profile = PerceptionProfile::disabled()
            .with_channel(Channel::Player, ChannelSettings::enabled(16.0, 1.0).with_speed(1.2))
            .with_channel(Channel::Sound, ChannelSettings::enabled(32.0, 1.0));
        PerceptionController::new(AgentKey::from_u128(1234), Arc::new(profile), &scheduling)
    }

    fn agent(partition: &PartitionId) -> AgentView<'_> {
        AgentView {
            entity: EntityId(1),
            partition,
            position: Coord::new(0.5, 64.0, 0.5),
            has_direct_target: false,
        }
    }

    #[test]
    fn test_stagger_offset_from_key() {
        let controller = controller(20);
        assert_eq!(controller.state().stagger_offset, 14);
        assert_eq!(controller.state().cooldown, 14);
        assert!(!controller.is_tracking());
    }

    #[test]
    fn test_first_evaluation_waits_for_stagger() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players(vec![(EntityId(9), Coord::new(8.5, 64.0, 0.5))]);
        let mut controller = controller(20);

        for step in 0..14 {
            let out = controller.tick(&ctx, &world, &agent(&partition), step);
            assert_eq!(out.transition, None, "step {step}");
        }
        let out = controller.tick(&ctx, &world, &agent(&partition), 14);
        assert_eq!(out.transition, Some(Transition::Acquired));

        let target = out.target.unwrap();
        assert_eq!(target.channel, Channel::Player);
        assert_eq!(target.entity, Some(EntityId(9)));
        assert_eq!(target.score, 50.0);
        assert_eq!(out.movement.unwrap().speed, 1.2);
    }

    #[test]
    fn test_gate_reuses_cached_result_during_cooldown() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players::default();
        let mut controller = controller(0);

        assert!(!controller.can_act(&ctx, &world, &agent(&partition), 0));
        assert_eq!(controller.state().cooldown, 5);

        // A noise appears, but the gate is still cooling down
        ctx.acoustic().insert(&partition, BlockPos::new(4, 64, 0), 1.0, None, SoundCategory::Impact, 1);
        for step in 1..=5 {
            assert!(!controller.can_act(&ctx, &world, &agent(&partition), step));
        }
        assert!(controller.can_act(&ctx, &world, &agent(&partition), 6));
        assert_eq!(controller.state().active_channel, Some(Channel::Sound));
    }

    #[test]
    fn test_recheck_is_staggered() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players(vec![(EntityId(9), Coord::new(8.5, 64.0, 0.5))]);
        let mut controller = controller(20);

        for step in 0..=14 {
            controller.tick(&ctx, &world, &agent(&partition), step);
        }
        assert_eq!(controller.state().ticks_until_recheck, 10 + 14);
    }

    #[test]
    fn test_yield_to_direct_target() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players(vec![(EntityId(9), Coord::new(8.5, 64.0, 0.5))]);
        let mut controller = controller(0);

        controller.tick(&ctx, &world, &agent(&partition), 0);
        assert!(controller.is_tracking());

        let mut direct = agent(&partition);
        direct.has_direct_target = true;
        let out = controller.tick(&ctx, &world, &direct, 1);
        assert_eq!(out.transition, Some(Transition::Yielded));
        assert!(out.movement.is_none());
        assert!(!controller.is_tracking());

        // Stays out of the way while the direct target lasts
        let out = controller.tick(&ctx, &world, &direct, 2);
        assert_eq!(out, PerceptionOutput::default());
    }

    #[test]
    fn test_reach_position_target() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players::default();
        let mut controller = controller(0);

        ctx.acoustic().insert(&partition, BlockPos::new(4, 64, 0), 1.0, None, SoundCategory::Impact, 0);
        let out = controller.tick(&ctx, &world, &agent(&partition), 0);
        assert_eq!(out.transition, Some(Transition::Acquired));
        let destination = out.movement.unwrap().destination;

        let mut arrived = agent(&partition);
        arrived.position = destination.offset(0.5, 0.0, 0.0);
        let out = controller.tick(&ctx, &world, &arrived, 1);
        assert_eq!(out.transition, Some(Transition::Reached));
        assert!(!controller.is_tracking());
        assert_eq!(controller.state().cooldown, 5);
    }

    #[test]
    fn test_reset_releases_target() {
        let ctx = context();
        let partition = PartitionId::from("overworld");
        let world = Players(vec![(EntityId(9), Coord::new(8.5, 64.0, 0.5))]);
        let mut controller = controller(20);

        for step in 0..=14 {
            controller.tick(&ctx, &world, &agent(&partition), step);
        }
        assert_eq!(controller.reset(), Some(Transition::Released));
        assert_eq!(controller.state().cooldown, 14);
        assert_eq!(controller.reset(), None);
    }
}
