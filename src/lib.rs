//! # wavebank - Wavetable MIDI Patch Engine
//!
//! SoundFont 2 / DLS patch parameters and the MIDI channel state that
//! drives them.
//!
//! ## Architecture
//!
//! wavebank is an umbrella crate that coordinates:
//! - **wavebank-core** - Configuration and the GM/GS/XG/GM2 bank-select rules
//! - **wavebank-midi** - Raw MIDI decoding, controller numbers, output events
//! - **wavebank-soundbank** - SF2 parsing, DLS articulation, zones, bank stack
//! - **wavebank-synth** - Modulator curves, compute engine, channels, SysEx
//!
//! ## Quick Start
//!
//! ```ignore
//! use wavebank::prelude::*;
//!
//! let manager = SoundBankManager::with_bank(SoundBank::load("GeneralUser.sf2")?);
//! let mut synth = Synthesizer::new(SynthConfig::default(), manager)?;
//!
//! synth.process_midi(&[0xC0, 19])?;       // church organ
//! synth.process_midi(&[0x90, 60, 100])?;  // middle C
//! let voices = synth.channel(0).unwrap().voices();
//! ```
//!
//! ## Feature Flags
//!
//! - `default` / `full` - Everything
//! - `soundbank` - Patch model and SF2/DLS parsing only
//! - `synth` - Channel state machine (implies `soundbank`)

pub mod error;
pub use error::{Error, Result};

/// Re-export of wavebank-core for direct access
pub use wavebank_core as core;

pub use wavebank_core::{SynthConfig, SynthSystem, DRUM_BANK};

// MIDI
pub use wavebank_midi as midi;

pub use wavebank_midi::{ChannelMessage, MidiEvent, MidiInput};

// Patch model
#[cfg(feature = "soundbank")]
pub use wavebank_soundbank as soundbank;

#[cfg(feature = "soundbank")]
pub use wavebank_soundbank::{
    Generator, GeneratorType, Modulator, Preset, PresetSource, SoundBank, SoundBankManager,
};

// Channel state machine
#[cfg(feature = "synth")]
pub use wavebank_synth as synth;

#[cfg(feature = "synth")]
pub use wavebank_synth::{
    ChannelProperty, EventSink, MidiChannel, SynthEvent, Synthesizer, SynthesizerSnapshot, Voice,
};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result, SynthConfig, SynthSystem};

    pub use crate::midi::controllers;

    #[cfg(feature = "soundbank")]
    pub use crate::soundbank::{PresetSource, SoundBank, SoundBankManager};

    #[cfg(feature = "synth")]
    pub use crate::synth::{MidiChannel, SynthEvent, Synthesizer, Voice};
}
