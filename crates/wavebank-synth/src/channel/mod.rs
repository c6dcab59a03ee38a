//! MIDI channel state machine.
//!
//! A [`MidiChannel`] owns its controller table, bank/program state and
//! voices. Everything it needs from the synthesizer (preset lookup, key
//! modifiers, the clock, event and renderer sinks) is lent per call through
//! a [`ChannelContext`].
//!
//! The operations are split by concern:
//! - `controller` - CC dispatch, pitch wheel, pressure, resets
//! - `data_entry` - RPN / NRPN handling of CC6 and CC38
//! - `program` - bank select, program change, drum flag
//! - `note` - note on/off, voice release
//! - `tuning` - tuning, modulation depth, transposition, vibrato

mod controller;
mod data_entry;
mod note;
mod program;
mod tuning;

use crate::controllers::{
    ControllerTable, CustomController, CustomControllers, DataEntryState, CONTROLLER_TABLE_SIZE,
    NON_CC_INDEX_OFFSET,
};
use crate::events::{ChannelProperty, EventSink, SynthEvent};
use crate::key_modifier::KeyModifierManager;
use crate::voice::{Voice, VoiceHooks};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wavebank_core::{choose_bank, SynthSystem, DRUM_BANK};
use wavebank_soundbank::{Preset, PresetSource, SoundBank};
use wavebank_soundbank::modulator::source;

/// A bank consulted before the bank stack, with its bank number offset.
#[derive(Debug, Clone)]
pub struct OverrideBank {
    pub bank: Arc<SoundBank>,
    /// Added to this bank's bank numbers (bank 128 excluded).
    pub offset: u16,
}

/// Synthesizer state a channel operation may read or report to.
pub struct ChannelContext<'a> {
    pub presets: &'a dyn PresetSource,
    pub override_bank: Option<&'a OverrideBank>,
    pub key_modifiers: &'a KeyModifierManager,
    pub system: SynthSystem,
    /// Synth-wide transposition in semitones.
    pub transposition: f64,
    /// Seconds.
    pub current_time: f64,
    /// Output sample rate.
    pub sample_rate: f32,
    pub high_performance: bool,
    /// Voices across all channels.
    pub total_voices: usize,
    pub events: &'a mut dyn EventSink,
    pub hooks: &'a mut dyn VoiceHooks,
}

/// Channel vibrato set through GS NRPNs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelVibrato {
    /// Cents.
    pub depth: f32,
    /// Hz.
    pub rate: f32,
    /// Seconds.
    pub delay: f32,
}

impl ChannelVibrato {
    /// Applied before the first vibrato NRPN when all values are zero.
    pub const GS_DEFAULT: Self = Self {
        depth: 50.0,
        rate: 8.0,
        delay: 0.6,
    };

    pub fn is_off(&self) -> bool {
        self.depth == 0.0 && self.rate == 0.0 && self.delay == 0.0
    }
}

/// One MIDI channel.
#[derive(Debug, Clone)]
pub struct MidiChannel {
    number: usize,
    /// Channel that starts as (and resets to) a drum channel.
    is_percussion: bool,

    pub(crate) controllers: ControllerTable,
    pub(crate) locked: [bool; CONTROLLER_TABLE_SIZE],
    pub(crate) custom: CustomControllers,
    /// Sum of the custom tuning controllers, cents.
    pub(crate) tuning_cents: f32,
    /// Cents per key.
    pub(crate) key_tuning: [i8; 128],
    pub(crate) data_entry: DataEntryState,
    pub(crate) vibrato: ChannelVibrato,
    pub(crate) lock_gs_nrpn: bool,
    pub(crate) hold_pedal: bool,
    pub(crate) muted: bool,
    pub(crate) velocity_override: u8,
    pub(crate) key_shift: i32,

    pub(crate) drum: bool,
    pub(crate) preset: Option<Arc<Preset>>,
    pub(crate) lock_preset: bool,
    pub(crate) locked_system: SynthSystem,
    pub(crate) bank: u16,
    pub(crate) bank_lsb: u16,
    pub(crate) sent_bank: u16,
    pub(crate) preset_uses_override: bool,

    pub(crate) voices: Vec<Voice>,
}

impl MidiChannel {
    pub fn new(number: usize, is_percussion: bool) -> Self {
        Self {
            number,
            is_percussion,
            controllers: ControllerTable::new(),
            locked: [false; CONTROLLER_TABLE_SIZE],
            custom: CustomControllers::default(),
            tuning_cents: 0.0,
            key_tuning: [0; 128],
            data_entry: DataEntryState::Idle,
            vibrato: ChannelVibrato::default(),
            lock_gs_nrpn: false,
            hold_pedal: false,
            muted: false,
            velocity_override: 0,
            key_shift: 0,
            drum: is_percussion,
            preset: None,
            lock_preset: false,
            locked_system: SynthSystem::default(),
            bank: if is_percussion { DRUM_BANK } else { 0 },
            bank_lsb: 0,
            sent_bank: if is_percussion { DRUM_BANK } else { 0 },
            preset_uses_override: false,
            voices: Vec::new(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn is_percussion_channel(&self) -> bool {
        self.is_percussion
    }

    pub fn controllers(&self) -> &ControllerTable {
        &self.controllers
    }

    pub fn custom_controller(&self, controller: CustomController) -> f32 {
        self.custom.get(controller)
    }

    /// Total channel tuning in cents.
    pub fn tuning_cents(&self) -> f32 {
        self.tuning_cents
    }

    pub fn key_tuning(&self) -> &[i8; 128] {
        &self.key_tuning
    }

    pub fn data_entry_state(&self) -> DataEntryState {
        self.data_entry
    }

    pub fn vibrato(&self) -> ChannelVibrato {
        self.vibrato
    }

    pub fn is_vibrato_locked(&self) -> bool {
        self.lock_gs_nrpn
    }

    pub fn hold_pedal(&self) -> bool {
        self.hold_pedal
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_drum(&self) -> bool {
        self.drum
    }

    pub fn key_shift(&self) -> i32 {
        self.key_shift
    }

    pub fn velocity_override(&self) -> u8 {
        self.velocity_override
    }

    pub fn preset(&self) -> Option<&Arc<Preset>> {
        self.preset.as_ref()
    }

    pub fn program(&self) -> u8 {
        self.preset.as_ref().map_or(0, |p| p.program)
    }

    /// Bank number as a sequencer would send it to select the current preset.
    pub fn sent_bank(&self) -> u16 {
        self.sent_bank
    }

    pub fn preset_uses_override(&self) -> bool {
        self.preset_uses_override
    }

    pub fn is_preset_locked(&self) -> bool {
        self.lock_preset
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Mutable access for the renderer (cursor advance, `finished` marks).
    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Voices held by the hold pedal.
    pub fn sustained_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.sustained).count()
    }

    /// Drop voices the renderer marked finished. Returns how many were removed.
    pub fn remove_finished_voices(&mut self) -> usize {
        let before = self.voices.len();
        self.voices.retain(|v| !v.finished);
        before - self.voices.len()
    }

    /// Bank used for preset lookup: the MSB or the LSB, see [`choose_bank`].
    pub fn bank_select(&self) -> u16 {
        choose_bank(self.bank, self.bank_lsb)
    }

    /// XG bank rules apply to this channel.
    pub fn is_xg_channel(&self, system: SynthSystem) -> bool {
        system == SynthSystem::Xg || (self.lock_preset && self.locked_system == SynthSystem::Xg)
    }

    /// Lock or unlock a controller slot (CC number, or `128 + source` for
    /// the non-CC sources). Locked slots ignore every change.
    pub fn lock_controller(&mut self, slot: usize, locked: bool) {
        if let Some(l) = self.locked.get_mut(slot) {
            *l = locked;
        }
    }

    pub fn is_controller_locked(&self, slot: usize) -> bool {
        self.locked.get(slot).copied().unwrap_or(false)
    }

    /// Freeze the preset. The system in effect is remembered so the XG bank
    /// rules keep applying to a locked XG preset.
    pub fn set_preset_lock(&mut self, locked: bool, system: SynthSystem) {
        self.lock_preset = locked;
        if locked {
            self.locked_system = system;
        }
    }

    /// Replace the preset without a program change.
    pub fn set_preset(&mut self, preset: Arc<Preset>) {
        if self.lock_preset {
            return;
        }
        self.preset = Some(preset);
    }

    pub fn mute(&mut self, ctx: &mut ChannelContext<'_>, muted: bool) {
        if muted {
            self.stop_all(ctx, true);
        }
        self.muted = muted;
        self.send_property(ctx);
        ctx.events.emit(SynthEvent::MuteChannel {
            channel: self.number,
            is_muted: muted,
        });
    }

    /// Display state of the channel.
    pub fn property(&self) -> ChannelProperty {
        ChannelProperty {
            voice_count: self.voices.len(),
            pitch_bend: self.controllers.pitch_wheel(),
            pitch_bend_range: self.controllers.pitch_wheel_range(),
            is_muted: self.muted,
            is_drum: self.drum,
            transposition: self.key_shift as f32
                + self.custom.get(CustomController::TransposeFine) / 100.0,
            bank: self.sent_bank,
            program: self.program(),
        }
    }

    pub(crate) fn send_property(&self, ctx: &mut ChannelContext<'_>) {
        ctx.events.emit(SynthEvent::ChannelProperties {
            channel: self.number,
            property: self.property(),
        });
    }

    #[inline]
    pub(crate) fn pitch_wheel_slot() -> usize {
        NON_CC_INDEX_OFFSET + source::PITCH_WHEEL as usize
    }
}
