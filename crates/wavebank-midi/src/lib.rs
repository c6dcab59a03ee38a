//! MIDI message types for wavebank.
//!
//! - **[`MidiInput`]** - Decodes raw input bytes into channel messages or SysEx
//! - **[`MidiEvent`]** - Output events serialized through `midi-msg`
//! - **[`controllers`]** - Controller numbers
//!
//! # Example
//!
//! ```ignore
//! use wavebank_midi::{ChannelMessage, MidiInput};
//!
//! match MidiInput::parse(&[0x90, 60, 100], 0)? {
//!     MidiInput::Channel { channel, message: ChannelMessage::NoteOn { note, velocity } } => {
//!         // ...
//!     }
//!     _ => {}
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod controllers;

mod message;
pub use message::{ChannelMessage, MidiInput};

mod event;
pub use event::{MidiEvent, MidiEventBuilder, RawMidiEvent};

// Re-exported so callers can match on output events without a direct dependency
pub use midi_msg::{Channel, ChannelVoiceMsg, ControlChange};
