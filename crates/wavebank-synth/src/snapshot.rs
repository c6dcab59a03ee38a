//! Serializable copies of channel and synthesizer state.
//!
//! A snapshot records controller, lock, tuning and bank/program state, not
//! voices. Applying it replays the program change through the regular
//! preset resolution, so a snapshot taken with one bank stack can be
//! restored onto another.

use crate::channel::{ChannelContext, ChannelVibrato, MidiChannel};
use crate::controllers::{CustomControllers, CONTROLLER_TABLE_SIZE};
use crate::error::Result;
use crate::key_modifier::KeyModifier;
use crate::synthesizer::Synthesizer;
use serde::{Deserialize, Serialize};
use wavebank_core::{SynthSystem, DRUM_BANK};
use wavebank_midi::{controllers as cc, MidiEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub program: u8,
    /// Effective bank select.
    pub bank: u16,
    /// The bank came from the LSB.
    pub is_bank_lsb: bool,
    /// Bank number a sequencer would send for the current preset.
    pub sent_bank: u16,
    pub preset_uses_override: bool,
    pub patch_name: String,

    pub lock_preset: bool,
    pub locked_system: SynthSystem,

    pub controllers: Vec<i16>,
    pub locked: Vec<bool>,
    pub custom: CustomControllers,

    pub lock_vibrato: bool,
    pub vibrato: ChannelVibrato,
    pub key_shift: i32,
    pub key_tuning: Vec<i8>,

    pub muted: bool,
    pub velocity_override: u8,
    pub drum: bool,
}

impl ChannelSnapshot {
    pub fn capture(channel: &MidiChannel) -> Self {
        let bank = channel.bank_select();
        Self {
            program: channel.program(),
            bank,
            is_bank_lsb: bank != channel.bank,
            sent_bank: channel.sent_bank,
            preset_uses_override: channel.preset_uses_override,
            patch_name: channel
                .preset
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            lock_preset: channel.lock_preset,
            locked_system: channel.locked_system,
            controllers: channel.controllers.to_vec(),
            locked: channel.locked.to_vec(),
            custom: channel.custom,
            lock_vibrato: channel.lock_gs_nrpn,
            vibrato: channel.vibrato,
            key_shift: channel.key_shift,
            key_tuning: channel.key_tuning.to_vec(),
            muted: channel.muted,
            velocity_override: channel.velocity_override,
            drum: channel.drum,
        }
    }

    /// Restore the state onto `channel`.
    pub fn apply(&self, channel: &mut MidiChannel, ctx: &mut ChannelContext<'_>) -> Result<()> {
        channel.lock_preset = false;
        channel.mute(ctx, self.muted);
        channel.set_drums(ctx, self.drum)?;

        channel.controllers.copy_from(&self.controllers);
        for (slot, locked) in self.locked.iter().take(CONTROLLER_TABLE_SIZE).enumerate() {
            channel.locked[slot] = *locked;
        }
        channel.custom = self.custom;
        channel.update_tuning();

        channel.vibrato = self.vibrato;
        channel.set_vibrato_lock(self.lock_vibrato);
        channel.key_shift = self.key_shift;
        for (slot, cents) in channel.key_tuning.iter_mut().zip(&self.key_tuning) {
            *slot = *cents;
        }
        channel.velocity_override = self.velocity_override;

        if self.is_bank_lsb {
            channel.bank_lsb = self.bank;
        } else {
            channel.bank = self.bank;
            channel.bank_lsb = 0;
        }
        channel.program_change(ctx, self.program)?;
        channel.set_preset_lock(self.lock_preset, self.locked_system);
        Ok(())
    }
}

/// State of every channel plus the synth-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizerSnapshot {
    pub system: SynthSystem,
    /// Semitones.
    pub transposition: f64,
    /// Cents.
    pub master_tuning: f32,
    pub channels: Vec<ChannelSnapshot>,
    pub key_modifiers: Vec<(usize, u8, KeyModifier)>,
}

impl SynthesizerSnapshot {
    pub fn capture(synth: &Synthesizer) -> Self {
        synth.snapshot()
    }

    pub fn apply(&self, synth: &mut Synthesizer) -> Result<()> {
        synth.apply_snapshot(self)
    }

    /// Bank select and program change messages that put a fresh synthesizer
    /// on the same presets.
    ///
    /// Drum channels only get the program change; the drum flag itself is
    /// carried by the system messages.
    pub fn restore_messages(&self) -> Vec<MidiEvent> {
        let mut out = Vec::with_capacity(self.channels.len() * 2);
        for (number, channel) in self.channels.iter().enumerate() {
            let midi_channel = (number % 16) as u8;
            if channel.sent_bank != DRUM_BANK {
                out.push(MidiEvent::control_change(
                    midi_channel,
                    cc::BANK_SELECT,
                    channel.sent_bank.min(127) as u8,
                ));
            }
            out.push(MidiEvent::program_change(midi_channel, channel.program));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::Harness;
    use crate::controllers::CustomController;

    #[test]
    fn test_capture_apply_restores_state() {
        let mut h = Harness::new();
        let mut source = h.channel(0);
        source.set_bank_select(&mut h.ctx(), 8, false).unwrap();
        source.program_change(&mut h.ctx(), 0).unwrap();
        source.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 42, false).unwrap();
        source.lock_controller(cc::PAN as usize, true);
        source.set_tuning(12.0);
        source.set_key_tuning(60, -5);
        source.key_shift = 2;
        let snapshot = ChannelSnapshot::capture(&source);
        assert_eq!(snapshot.patch_name, "Bright");

        let mut target = h.channel(1);
        snapshot.apply(&mut target, &mut h.ctx()).unwrap();
        assert_eq!(target.preset().unwrap().name, "Bright");
        assert_eq!(target.controllers().cc(cc::MAIN_VOLUME), 42);
        assert!(target.is_controller_locked(cc::PAN as usize));
        assert_eq!(target.custom_controller(CustomController::ChannelTuning), 12.0);
        assert_eq!(target.tuning_cents(), 12.0);
        assert_eq!(target.key_tuning()[60], -5);
        assert_eq!(target.key_shift(), 2);
        assert_eq!(target.sent_bank(), 8);
    }

    #[test]
    fn test_apply_drum_and_lock() {
        let mut h = Harness::new();
        let mut source = h.channel(9);
        source.program_change(&mut h.ctx(), 32).unwrap();
        source.set_preset_lock(true, SynthSystem::Xg);
        let snapshot = ChannelSnapshot::capture(&source);

        let mut target = h.channel(2);
        snapshot.apply(&mut target, &mut h.ctx()).unwrap();
        assert!(target.is_drum());
        assert_eq!(target.preset().unwrap().name, "Jazz");
        assert!(target.is_preset_locked());
        assert!(target.is_xg_channel(SynthSystem::Gs));
    }

    #[test]
    fn test_snapshot_bincode() {
        let mut h = Harness::new();
        let channel = h.channel(9);
        let snapshot = SynthesizerSnapshot {
            system: SynthSystem::Gs,
            transposition: 0.0,
            master_tuning: 0.0,
            channels: vec![ChannelSnapshot::capture(&channel)],
            key_modifiers: vec![(9, 38, KeyModifier::new().gain(0.5))],
        };
        let bytes = bincode::serialize(&snapshot).unwrap();
        let back: SynthesizerSnapshot = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.channels[0].controllers.len(), CONTROLLER_TABLE_SIZE);
    }

    #[test]
    fn test_restore_messages() {
        let mut h = Harness::new();
        let mut melodic = h.channel(0);
        melodic.set_bank_select(&mut h.ctx(), 8, false).unwrap();
        melodic.program_change(&mut h.ctx(), 0).unwrap();
        let drums = h.channel(9);
        let mut channels = vec![ChannelSnapshot::capture(&melodic)];
        channels.extend((1..9).map(|_| ChannelSnapshot::capture(&MidiChannel::new(1, false))));
        channels.push(ChannelSnapshot::capture(&drums));
        let snapshot = SynthesizerSnapshot {
            system: SynthSystem::Gs,
            transposition: 0.0,
            master_tuning: 0.0,
            channels,
            key_modifiers: Vec::new(),
        };

        let bytes: Vec<Vec<u8>> = snapshot.restore_messages().iter().map(|e| e.to_bytes()).collect();
        assert_eq!(bytes[0], vec![0xB0, 0, 8]);
        assert_eq!(bytes[1], vec![0xC0, 0]);
        assert_eq!(bytes.last().unwrap(), &vec![0xC9, 0]);
    }
}
