//! Perception Profiles
//!
//! Per agent-kind channel settings. A profile is plain data composed into
//! every agent of its kind; kinds select a profile, they never override
//! behavior.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use sense_events::Channel;

use crate::error::{PerceptionError, Result};

/// Name of the profile used when a kind has none of its own.
pub const DEFAULT_PROFILE: &str = "default";

/// Settings for one channel of one agent kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Whether the agent has this capability at all
    pub enabled: bool,
    /// Detection range in world units
    pub range: f64,
    /// Relative weight applied to the channel's raw score
    pub weight: f32,
    /// Movement speed multiplier while pursuing a target from this channel
    pub speed: f64,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            range: 16.0,
            weight: 1.0,
            speed: 1.0,
        }
    }
}

impl ChannelSettings {
    pub fn enabled(range: f64, weight: f32) -> Self {
        Self {
            enabled: true,
            range,
            weight,
            speed: 1.0,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Clamps negative or NaN tuning values to zero.
    pub fn sanitized(self) -> Self {
        Self {
            enabled: self.enabled,
            range: non_negative(self.range),
            weight: if self.weight.is_nan() { 0.0 } else { self.weight.max(0.0) },
            speed: non_negative(self.speed),
        }
    }

    /// Enabled and able to produce a positive score.
    pub fn is_active(&self) -> bool {
        self.enabled && self.range > 0.0 && self.weight > 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Channel settings for one agent kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionProfile {
    pub player: ChannelSettings,
    pub sound: ChannelSettings,
    pub smell: ChannelSettings,
    pub light: ChannelSettings,
    pub heat: ChannelSettings,
    pub structure: ChannelSettings,
}

impl Default for PerceptionProfile {
    /// Sight and hearing on, everything else off.
    fn default() -> Self {
        Self {
            player: ChannelSettings::enabled(16.0, 1.0).with_speed(1.2),
            sound: ChannelSettings::enabled(32.0, 1.0),
            smell: ChannelSettings {
                range: 24.0,
                weight: 0.8,
                ..ChannelSettings::default()
            },
            light: ChannelSettings {
                range: 16.0,
                weight: 0.6,
                ..ChannelSettings::default()
            },
            heat: ChannelSettings {
                range: 12.0,
                weight: 0.5,
                ..ChannelSettings::default()
            },
            structure: ChannelSettings {
                range: 64.0,
                weight: 0.3,
                speed: 0.8,
                ..ChannelSettings::default()
            },
        }
    }
}

impl PerceptionProfile {
    /// A profile with every channel switched off.
    pub fn disabled() -> Self {
        let off = ChannelSettings::default();
        Self {
            player: off,
            sound: off,
            smell: off,
            light: off,
            heat: off,
            structure: off,
        }
    }

    pub fn channel(&self, channel: Channel) -> &ChannelSettings {
        match channel {
            Channel::Player => &self.player,
            Channel::Sound => &self.sound,
            Channel::Smell => &self.smell,
            Channel::Light => &self.light,
            Channel::Heat => &self.heat,
            Channel::Structure => &self.structure,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelSettings {
        match channel {
            Channel::Player => &mut self.player,
            Channel::Sound => &mut self.sound,
            Channel::Smell => &mut self.smell,
            Channel::Light => &mut self.light,
            Channel::Heat => &mut self.heat,
            Channel::Structure => &mut self.structure,
        }
    }

    pub fn with_channel(mut self, channel: Channel, settings: ChannelSettings) -> Self {
        *self.channel_mut(channel) = settings;
        self
    }

    pub fn sanitized(mut self) -> Self {
        for channel in Channel::PRIORITY {
            let settings = self.channel_mut(channel);
            *settings = settings.sanitized();
        }
        self
    }

    /// Channels that can produce a candidate, in evaluation order.
    pub fn active_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::PRIORITY
            .into_iter()
            .filter(|c| self.channel(*c).is_active())
    }
}

/// Built-in profiles keyed by agent kind.
pub fn builtin_profiles() -> BTreeMap<String, PerceptionProfile> {
    let mut profiles = BTreeMap::new();

    profiles.insert(DEFAULT_PROFILE.to_string(), PerceptionProfile::default());

    // Shamblers follow the smell of the living and drift toward settlements
    profiles.insert(
        "zombie".to_string(),
        PerceptionProfile::default()
            .with_channel(Channel::Smell, ChannelSettings::enabled(24.0, 0.8))
            .with_channel(
                Channel::Structure,
                ChannelSettings::enabled(64.0, 0.3).with_speed(0.8),
            ),
    );

    profiles.insert(
        "skeleton".to_string(),
        PerceptionProfile::default()
            .with_channel(Channel::Player, ChannelSettings::enabled(20.0, 1.0))
            .with_channel(Channel::Light, ChannelSettings::enabled(16.0, 0.6)),
    );

    profiles.insert(
        "spider".to_string(),
        PerceptionProfile::default()
            .with_channel(Channel::Smell, ChannelSettings::enabled(16.0, 1.0).with_speed(1.3))
            .with_channel(Channel::Heat, ChannelSettings::enabled(12.0, 0.5)),
    );

    profiles.insert(
        "night_stalker".to_string(),
        PerceptionProfile {
            player: ChannelSettings::enabled(24.0, 1.2).with_speed(1.4),
            sound: ChannelSettings::enabled(40.0, 1.2),
            smell: ChannelSettings::enabled(32.0, 1.0),
            light: ChannelSettings::enabled(16.0, 0.8),
            heat: ChannelSettings::enabled(16.0, 0.6),
            structure: ChannelSettings::enabled(96.0, 0.4),
        },
    );

    profiles
}

/// Shared, immutable profiles. Agents of the same kind share one `Arc`.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: BTreeMap<String, Arc<PerceptionProfile>>,
}

impl ProfileSet {
    /// Sanitizes every profile and guarantees a `default` entry.
    pub fn new(profiles: BTreeMap<String, PerceptionProfile>) -> Self {
        let mut profiles: BTreeMap<String, Arc<PerceptionProfile>> = profiles
            .into_iter()
            .map(|(kind, profile)| (kind, Arc::new(profile.sanitized())))
            .collect();
        profiles
            .entry(DEFAULT_PROFILE.to_string())
            .or_insert_with(|| Arc::new(PerceptionProfile::default()));
        Self { profiles }
    }

    pub fn get(&self, kind: &str) -> Result<Arc<PerceptionProfile>> {
        self.profiles
            .get(kind)
            .cloned()
            .ok_or_else(|| PerceptionError::UnknownProfile(kind.to_string()))
    }

    /// Looks up a kind, falling back to the `default` profile.
    pub fn get_or_default(&self, kind: &str) -> Arc<PerceptionProfile> {
        self.profiles
            .get(kind)
            .or_else(|| self.profiles.get(DEFAULT_PROFILE))
            .cloned()
            .unwrap_or_else(|| Arc::new(PerceptionProfile::default()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::new(builtin_profiles())
    }
}
