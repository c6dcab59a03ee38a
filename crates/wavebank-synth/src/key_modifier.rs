//! Per-key overrides of velocity, patch and gain.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Preset a single key plays instead of the channel preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub bank: u16,
    pub program: u8,
}

/// Overrides applied to one key of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyModifier {
    /// Fixed velocity for the key.
    pub velocity: Option<u8>,
    pub patch: Option<Patch>,
    /// Linear gain of the key's voices.
    pub gain: f32,
}

impl Default for KeyModifier {
    fn default() -> Self {
        Self {
            velocity: None,
            patch: None,
            gain: 1.0,
        }
    }
}

impl KeyModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(mut self, velocity: u8) -> Self {
        self.velocity = Some(velocity.min(127));
        self
    }

    pub fn patch(mut self, bank: u16, program: u8) -> Self {
        self.patch = Some(Patch { bank, program });
        self
    }

    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }
}

/// Key modifiers of every channel, keyed by `(channel, key)`.
#[derive(Debug, Default)]
pub struct KeyModifierManager {
    mappings: DashMap<(usize, u8), KeyModifier>,
}

impl KeyModifierManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mapping(&self, channel: usize, key: u8, modifier: KeyModifier) {
        self.mappings.insert((channel, key), modifier);
    }

    pub fn delete_mapping(&self, channel: usize, key: u8) {
        self.mappings.remove(&(channel, key));
    }

    pub fn clear_mappings(&self) {
        self.mappings.clear();
    }

    /// Replace every mapping.
    pub fn set_mappings(&self, mappings: &[(usize, u8, KeyModifier)]) {
        self.mappings.clear();
        for (channel, key, modifier) in mappings {
            self.mappings.insert((*channel, *key), *modifier);
        }
    }

    /// All mappings, sorted by channel and key.
    pub fn mappings(&self) -> Vec<(usize, u8, KeyModifier)> {
        let mut out: Vec<_> = self
            .mappings
            .iter()
            .map(|entry| (entry.key().0, entry.key().1, *entry.value()))
            .collect();
        out.sort_by_key(|(channel, key, _)| (*channel, *key));
        out
    }

    pub fn get(&self, channel: usize, key: u8) -> Option<KeyModifier> {
        self.mappings.get(&(channel, key)).map(|m| *m.value())
    }

    pub fn velocity(&self, channel: usize, key: u8) -> Option<u8> {
        self.get(channel, key).and_then(|m| m.velocity)
    }

    /// Linear gain for the key, 1.0 when unmapped.
    pub fn gain(&self, channel: usize, key: u8) -> f32 {
        self.get(channel, key).map_or(1.0, |m| m.gain)
    }

    pub fn patch(&self, channel: usize, key: u8) -> Option<Patch> {
        self.get(channel, key).and_then(|m| m.patch)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
