//! Notifications emitted by the synthesizer.
//!
//! Every state change a UI or exporter may care about is reported through
//! an [`EventSink`]. The sink is called synchronously from the control
//! methods, so implementations must not block; the crossbeam sender uses
//! `try_send` and drops events when a bounded channel is full.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use wavebank_soundbank::PresetListEntry;

/// Display state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelProperty {
    /// Voices currently in the channel (releasing included).
    pub voice_count: usize,
    /// 14-bit pitch wheel, 8192 is centered.
    pub pitch_bend: u16,
    /// Semitones.
    pub pitch_bend_range: f32,
    pub is_muted: bool,
    pub is_drum: bool,
    /// Semitones, fractional part included.
    pub transposition: f32,
    pub bank: u16,
    pub program: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthEvent {
    NoteOn { channel: usize, note: u8, velocity: u8 },
    NoteOff { channel: usize, note: u8 },
    ControllerChange { channel: usize, controller: u8, value: u8 },
    /// `bank` is the bank number as a sequencer would send it.
    ProgramChange { channel: usize, program: u8, bank: u16 },
    PitchWheel { channel: usize, msb: u8, lsb: u8 },
    ChannelPressure { channel: usize, pressure: u8 },
    PolyPressure { channel: usize, note: u8, pressure: u8 },
    DrumChange { channel: usize, is_drum: bool },
    MuteChannel { channel: usize, is_muted: bool },
    PresetListChange(Vec<PresetListEntry>),
    StopAll,
    ChannelProperties { channel: usize, property: ChannelProperty },
}

/// Receiver of [`SynthEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: SynthEvent);
}

impl EventSink for Vec<SynthEvent> {
    fn emit(&mut self, event: SynthEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<SynthEvent> {
    fn emit(&mut self, event: SynthEvent) {
        if self.try_send(event).is_err() {
            tracing::trace!("Event channel full or closed, dropping event");
        }
    }
}

/// Discards every event.
impl EventSink for () {
    fn emit(&mut self, _event: SynthEvent) {}
}
