//! Synthesizer configuration.

use serde::{Deserialize, Serialize};

use crate::system::{SynthSystem, DEFAULT_PERCUSSION};
use crate::{Error, Result};

/// Configuration for the patch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Output sample rate in Hz, used for the voice playback step
    pub sample_rate: f32,
    /// Total voice count above which the eviction policy runs
    pub voice_cap: usize,
    /// Number of MIDI channels
    pub channel_count: usize,
    /// MIDI system the synth starts in
    pub system: SynthSystem,
    /// Channel that starts as a drum channel (modulo 16)
    pub percussion_channel: usize,
    /// Drop quiet notes under load and kill instead of release on note-off
    pub high_performance: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            voice_cap: 350,
            channel_count: 16,
            system: SynthSystem::Gs,
            percussion_channel: DEFAULT_PERCUSSION,
            high_performance: false,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8000.0 || self.sample_rate > 384000.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.voice_cap == 0 {
            return Err(Error::InvalidConfig("voice_cap must be at least 1".into()));
        }
        if self.channel_count == 0 || self.channel_count > 256 {
            return Err(Error::InvalidConfig(format!(
                "channel_count {} out of range (1-256)",
                self.channel_count
            )));
        }
        if self.percussion_channel >= 16 {
            return Err(Error::InvalidConfig(format!(
                "percussion_channel {} out of range (0-15)",
                self.percussion_channel
            )));
        }
        Ok(())
    }

    /// Builder-style setter for the voice cap.
    pub fn voice_cap(mut self, cap: usize) -> Self {
        self.voice_cap = cap;
        self
    }

    /// Builder-style setter for the channel count.
    pub fn channels(mut self, count: usize) -> Self {
        self.channel_count = count;
        self
    }

    /// Builder-style setter for the starting system.
    pub fn system(mut self, system: SynthSystem) -> Self {
        self.system = system;
        self
    }
}
