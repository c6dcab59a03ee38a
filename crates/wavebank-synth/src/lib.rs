//! MIDI channel state machine for wavebank.
//!
//! Turns MIDI input into voice parameters. The crate keeps every piece of
//! channel state a wavetable synthesizer needs and leaves rendering to the
//! caller:
//!
//! - **[`Synthesizer`]** - Channels, bank stack, SysEx and synth-wide tuning
//! - **[`MidiChannel`]** - Controllers, RPN/NRPN, bank/program, voices
//! - **[`Voice`]** - Generators, modulators and computed parameters of one sample layer
//! - **[`KeyModifierManager`]** - Per-key velocity, gain and patch overrides
//! - **[`VoiceEviction`]** - Voice cap policy
//! - **[`SynthesizerSnapshot`]** - Serializable state for save/restore
//! - **[`SynthEvent`]** - Notifications through an [`EventSink`]
//!
//! # Quick Start
//!
//! ```ignore
//! use wavebank_synth::{SynthConfig, SynthEvent, Synthesizer};
//! use wavebank_soundbank::{GeneratorType, SoundBank, SoundBankManager};
//!
//! let (tx, rx) = crossbeam_channel::unbounded::<SynthEvent>();
//! let manager = SoundBankManager::with_bank(SoundBank::load("GeneralUser.sf2")?);
//! let mut synth = Synthesizer::new(SynthConfig::default(), manager)?.with_events(tx);
//!
//! synth.process_midi(&[0xB0, 7, 90])?;
//! synth.process_midi(&[0x90, 60, 100])?;
//! for voice in synth.channel(0).unwrap().voices() {
//!     println!("{}: {}", voice.sample.name, voice.modulated(GeneratorType::InitialAttenuation));
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod controllers;
pub use controllers::{
    ControllerTable, CustomController, CustomControllers, DataEntryState, CONTROLLER_TABLE_SIZE,
    NON_CC_INDEX_OFFSET,
};

pub mod curves;

pub mod compute;
pub use compute::{compute_all, compute_for_source, EnvelopeRefresh};

mod voice;
pub use voice::{SampleCursor, Voice, VoiceHooks, VoiceParams, KILL_RELEASE_TIME, MIN_NOTE_LENGTH};

mod portamento;
pub use portamento::portamento_time_to_seconds;

mod key_modifier;
pub use key_modifier::{KeyModifier, KeyModifierManager, Patch};

mod events;
pub use events::{ChannelProperty, EventSink, SynthEvent};

pub mod channel;
pub use channel::{ChannelContext, ChannelVibrato, MidiChannel, OverrideBank};

mod eviction;
pub use eviction::{LowestPriorityEviction, VoiceEviction};

mod snapshot;
pub use snapshot::{ChannelSnapshot, SynthesizerSnapshot};

mod synthesizer;
pub use synthesizer::Synthesizer;

mod sysex;

pub use wavebank_core::{SynthConfig, SynthSystem};
