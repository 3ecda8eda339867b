//! Perception Output Types
//!
//! Channels, entity kinds, targets and the decision records hosts log.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Coord;
use crate::ids::{AgentKey, EntityId, Step};

/// One perception modality.
///
/// Variants are declared in evaluation priority order; [`Channel::PRIORITY`]
/// is the order a controller evaluates them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Directly visible adversary
    Player,
    Sound,
    /// Warm-blooded creatures sensed through obstruction
    Smell,
    Light,
    Heat,
    /// Settlements and other points of interest
    Structure,
}

impl Channel {
    pub const PRIORITY: [Channel; 6] = [
        Channel::Player,
        Channel::Sound,
        Channel::Smell,
        Channel::Light,
        Channel::Heat,
        Channel::Structure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Player => "player",
            Channel::Sound => "sound",
            Channel::Smell => "smell",
            Channel::Light => "light",
            Channel::Heat => "heat",
            Channel::Structure => "structure",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classes of entity the world query layer can filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Villager,
    Livestock,
    Wildlife,
    Mob,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Villager => "villager",
            EntityKind::Livestock => "livestock",
            EntityKind::Wildlife => "wildlife",
            EntityKind::Mob => "mob",
        }
    }

    /// Kinds the smell channel can pick up.
    pub fn is_warm_blooded(&self) -> bool {
        !matches!(self, EntityKind::Mob)
    }

    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Player,
            EntityKind::Villager,
            EntityKind::Livestock,
            EntityKind::Wildlife,
            EntityKind::Mob,
        ]
    }
}

/// What an agent has decided to pursue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptionTarget {
    pub position: Option<Coord>,
    pub entity: Option<EntityId>,
    pub channel: Channel,
    pub score: f32,
}

impl PerceptionTarget {
    pub fn at_position(position: Coord, channel: Channel, score: f32) -> Self {
        Self {
            position: Some(position),
            entity: None,
            channel,
            score,
        }
    }

    pub fn entity(entity: EntityId, last_seen: Coord, channel: Channel, score: f32) -> Self {
        Self {
            position: Some(last_seen),
            entity: Some(entity),
            channel,
            score,
        }
    }
}

/// A change in an agent's perception state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Idle to tracking
    Acquired,
    /// Re-evaluation while tracking picked a different target
    Retargeted,
    /// Tracked entity is gone, or re-evaluation found nothing
    Lost,
    /// Tracked position reached
    Reached,
    /// A directly acquired target took over
    Yielded,
    /// Behavior stopped or reset by the host
    Released,
}

/// One logged perception decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub step: Step,
    pub agent: AgentKey,
    pub transition: Transition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PerceptionTarget>,
}

impl DecisionRecord {
    pub fn new(step: Step, agent: AgentKey, transition: Transition) -> Self {
        Self {
            step,
            agent,
            transition,
            target: None,
        }
    }

    pub fn with_target(mut self, target: PerceptionTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
