//! Controller dispatch, pitch wheel, pressure and controller resets.

use super::{ChannelContext, MidiChannel};
use crate::compute::compute_for_source;
use crate::controllers::{
    is_resettable, CustomController, CustomControllers, DataEntryState, CONTROLLER_TABLE_SIZE,
    PORTAMENTO_CONTROL_UNSET, RESET_VALUES, VELOCITY_OVERRIDE,
};
use crate::error::Result;
use crate::events::SynthEvent;
use wavebank_midi::controllers as cc;
use wavebank_soundbank::modulator::source;

/// First channel mode message (All Sound Off). Resets never replay these.
const CHANNEL_MODE_START: u8 = cc::ALL_SOUND_OFF;

impl MidiChannel {
    /// Handle a control change.
    ///
    /// Controllers above 127 are channel configuration values and only
    /// accepted with `force`. Locked controllers ignore the change.
    pub fn controller_change(
        &mut self,
        ctx: &mut ChannelContext<'_>,
        controller: u8,
        value: u8,
        force: bool,
    ) -> Result<()> {
        if controller > 127 {
            if !force {
                return Ok(());
            }
            if controller == VELOCITY_OVERRIDE {
                self.velocity_override = value.min(127);
            }
            return Ok(());
        }
        let value = value & 0x7F;

        if cc::is_merged_lsb(controller) {
            let msb = controller - 32;
            if self.locked[msb as usize] {
                return Ok(());
            }
            let slot = &mut self.controllers[msb as usize];
            *slot = (*slot & 0x3F80) | value as i16;
            self.recompute(ctx, true, msb);
        }

        if self.locked[controller as usize] {
            return Ok(());
        }
        self.controllers[controller as usize] = (value as i16) << 7;

        match controller {
            cc::ALL_NOTES_OFF => self.stop_all(ctx, false),
            cc::ALL_SOUND_OFF => self.stop_all(ctx, true),
            cc::BANK_SELECT => self.set_bank_select(ctx, value as u16, false)?,
            cc::LSB_BANK_SELECT => self.set_bank_select(ctx, value as u16, true)?,
            cc::RPN_MSB | cc::RPN_LSB | cc::NRPN_MSB | cc::NRPN_LSB => {
                if let Some(state) = DataEntryState::for_controller(controller) {
                    self.data_entry = state;
                }
            }
            cc::DATA_ENTRY_MSB => self.data_entry_coarse(ctx, value)?,
            cc::LSB_DATA_ENTRY => self.data_entry_fine(ctx, value),
            cc::RESET_ALL_CONTROLLERS => self.reset_controllers_rp15(ctx)?,
            cc::SUSTAIN_PEDAL => {
                if value >= 64 {
                    self.hold_pedal = true;
                } else {
                    self.hold_pedal = false;
                    self.release_sustained(ctx);
                }
            }
            _ => self.recompute(ctx, true, controller),
        }

        ctx.events.emit(SynthEvent::ControllerChange {
            channel: self.number,
            controller,
            value,
        });
        Ok(())
    }

    /// Set the 14-bit pitch wheel.
    pub fn pitch_wheel(&mut self, ctx: &mut ChannelContext<'_>, msb: u8, lsb: u8) {
        let slot = Self::pitch_wheel_slot();
        if self.locked[slot] {
            return;
        }
        let bend = (lsb & 0x7F) as i16 | ((msb & 0x7F) as i16) << 7;
        ctx.events.emit(SynthEvent::PitchWheel {
            channel: self.number,
            msb,
            lsb,
        });
        self.controllers[slot] = bend;
        self.recompute(ctx, false, source::PITCH_WHEEL);
        self.send_property(ctx);
    }

    pub fn channel_pressure(&mut self, ctx: &mut ChannelContext<'_>, pressure: u8) {
        let pressure = pressure & 0x7F;
        self.controllers
            .set_non_cc(source::CHANNEL_PRESSURE, (pressure as i16) << 7);
        self.recompute(ctx, false, source::CHANNEL_PRESSURE);
        ctx.events.emit(SynthEvent::ChannelPressure {
            channel: self.number,
            pressure,
        });
    }

    /// Polyphonic aftertouch for the voices of one note.
    pub fn poly_pressure(&mut self, ctx: &mut ChannelContext<'_>, note: u8, pressure: u8) {
        let pressure = pressure & 0x7F;
        let controllers = &self.controllers;
        for voice in self.voices.iter_mut().filter(|v| v.midi_note == note) {
            voice.pressure = pressure;
            if let Some(refresh) = compute_for_source(voice, controllers, false, source::POLY_PRESSURE) {
                ctx.hooks.envelopes_changed(voice, refresh);
            }
        }
        ctx.events.emit(SynthEvent::PolyPressure {
            channel: self.number,
            note,
            pressure,
        });
    }

    /// Full channel reset: every unlocked controller back to its power-on
    /// value, vibrato off, tuning cleared (except the transposition) and the
    /// parameter numbers nulled.
    pub fn reset_controllers(&mut self, ctx: &mut ChannelContext<'_>) -> Result<()> {
        self.key_tuning = [0; 128];
        // CC6 replays below must not hit a live parameter
        self.reset_parameters();

        for i in 0..CONTROLLER_TABLE_SIZE {
            if self.locked[i] {
                continue;
            }
            let reset = RESET_VALUES[i];
            if self.controllers[i] != reset && i < CHANNEL_MODE_START as usize {
                if i == cc::PORTAMENTO_CONTROL as usize {
                    self.controllers[i] = PORTAMENTO_CONTROL_UNSET;
                } else {
                    self.controller_change(ctx, i as u8, (reset >> 7) as u8, false)?;
                }
            } else {
                self.controllers[i] = reset;
            }
        }

        self.vibrato = Default::default();
        self.hold_pedal = false;

        let transpose_fine = self.custom.get(CustomController::TransposeFine);
        self.custom = CustomControllers::default();
        self.custom.set(CustomController::TransposeFine, transpose_fine);
        self.update_tuning();

        self.reset_parameters();
        Ok(())
    }

    /// "Reset All Controllers" (CC121) following RP-15: the performance
    /// controllers are reset, the mix and sound controllers are kept.
    pub fn reset_controllers_rp15(&mut self, ctx: &mut ChannelContext<'_>) -> Result<()> {
        self.key_tuning = [0; 128];
        self.reset_parameters();
        self.pitch_wheel(ctx, 64, 0);
        self.vibrato = Default::default();

        for controller in 0..CHANNEL_MODE_START {
            if !is_resettable(controller) || self.locked[controller as usize] {
                continue;
            }
            let reset = RESET_VALUES[controller as usize];
            if self.controllers[controller as usize] == reset {
                continue;
            }
            if controller == cc::PORTAMENTO_CONTROL {
                self.controllers[controller as usize] = PORTAMENTO_CONTROL_UNSET;
            } else {
                self.controller_change(ctx, controller, (reset >> 7) as u8, false)?;
            }
        }
        // parameter numbers are back to null
        self.reset_parameters();
        Ok(())
    }

    /// Recompute the modulators of every voice that read one controller.
    pub(crate) fn recompute(&mut self, ctx: &mut ChannelContext<'_>, uses_cc: bool, index: u8) {
        let controllers = &self.controllers;
        for voice in self.voices.iter_mut() {
            if let Some(refresh) = compute_for_source(voice, controllers, uses_cc, index) {
                ctx.hooks.envelopes_changed(voice, refresh);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::Harness;
    use super::*;
    use wavebank_soundbank::GeneratorType;

    #[test]
    fn test_cc_stored_shifted() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 90, false).unwrap();
        assert_eq!(channel.controllers()[cc::MAIN_VOLUME as usize], 90 << 7);
        assert!(h.events.contains(&SynthEvent::ControllerChange {
            channel: 0,
            controller: 7,
            value: 90
        }));
    }

    #[test]
    fn test_merged_lsb_fills_low_bits() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.controller_change(&mut h.ctx(), cc::MODULATION_WHEEL, 10, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::LSB_MODULATION_WHEEL, 5, false).unwrap();
        assert_eq!(channel.controllers()[1], (10 << 7) | 5);
    }

    #[test]
    fn test_locked_controller_ignored() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.lock_controller(cc::MAIN_VOLUME as usize, true);
        channel.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 1, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::LSB_MAIN_VOLUME, 1, false).unwrap();
        assert_eq!(channel.controllers()[7], 100 << 7);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_velocity_override_needs_force() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.controller_change(&mut h.ctx(), VELOCITY_OVERRIDE, 90, false).unwrap();
        assert_eq!(channel.velocity_override(), 0);
        channel.controller_change(&mut h.ctx(), VELOCITY_OVERRIDE, 90, true).unwrap();
        assert_eq!(channel.velocity_override(), 90);
        // table slot 128 is a modulator source, not the override
        assert_eq!(channel.controllers()[128], 0);
    }

    #[test]
    fn test_volume_change_recomputes_voices() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 127).unwrap();
        let before = channel.voices()[0].modulated(GeneratorType::InitialAttenuation);
        channel.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 20, false).unwrap();
        let after = channel.voices()[0].modulated(GeneratorType::InitialAttenuation);
        assert!(after > before);
        assert_eq!(h.hooks.refreshed, 1);
    }

    #[test]
    fn test_pitch_wheel_sets_slot() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 100).unwrap();
        channel.pitch_wheel(&mut h.ctx(), 127, 127);
        assert_eq!(channel.controllers().pitch_wheel(), 16383);
        assert!(channel.voices()[0].modulated(GeneratorType::FineTune) > 0);
        assert!(h.events.contains(&SynthEvent::PitchWheel { channel: 0, msb: 127, lsb: 127 }));
    }

    #[test]
    fn test_channel_pressure_slot() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.channel_pressure(&mut h.ctx(), 100);
        assert_eq!(channel.controllers().non_cc(source::CHANNEL_PRESSURE), 100 << 7);
    }

    #[test]
    fn test_poly_pressure_only_matching_note() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 100).unwrap();
        channel.note_on(&mut h.ctx(), 64, 100).unwrap();
        channel.poly_pressure(&mut h.ctx(), 64, 90);
        assert_eq!(channel.voices()[0].pressure, 0);
        assert_eq!(channel.voices()[1].pressure, 90);
    }

    #[test]
    fn test_hold_pedal_sustains_then_releases() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 100).unwrap();
        channel.controller_change(&mut h.ctx(), cc::SUSTAIN_PEDAL, 127, false).unwrap();
        channel.note_off(&mut h.ctx(), 60);
        assert_eq!(channel.sustained_voice_count(), 1);
        assert!(!channel.voices()[0].is_in_release);

        channel.controller_change(&mut h.ctx(), cc::SUSTAIN_PEDAL, 0, false).unwrap();
        assert_eq!(channel.sustained_voice_count(), 0);
        assert!(channel.voices()[0].is_in_release);
        assert_eq!(h.hooks.released, 1);
    }

    #[test]
    fn test_all_sound_off_clears_voices() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 100).unwrap();
        channel.controller_change(&mut h.ctx(), cc::ALL_NOTES_OFF, 0, false).unwrap();
        assert_eq!(channel.voice_count(), 1);
        assert!(channel.voices()[0].is_in_release);
        channel.controller_change(&mut h.ctx(), cc::ALL_SOUND_OFF, 0, false).unwrap();
        assert_eq!(channel.voice_count(), 0);
    }

    #[test]
    fn test_rp15_reset_keeps_volume() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 30, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::MODULATION_WHEEL, 90, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::EXPRESSION, 10, false).unwrap();
        channel.pitch_wheel(&mut h.ctx(), 0, 0);
        channel.controller_change(&mut h.ctx(), cc::RESET_ALL_CONTROLLERS, 0, false).unwrap();

        assert_eq!(channel.controllers().cc(cc::MAIN_VOLUME), 30);
        assert_eq!(channel.controllers().cc(cc::MODULATION_WHEEL), 0);
        assert_eq!(channel.controllers().cc(cc::EXPRESSION), 127);
        assert_eq!(channel.controllers().pitch_wheel(), 8192);
        assert_eq!(channel.data_entry_state(), DataEntryState::Idle);
    }

    #[test]
    fn test_full_reset_restores_everything() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.controller_change(&mut h.ctx(), cc::MAIN_VOLUME, 30, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::PORTAMENTO_CONTROL, 60, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::RPN_MSB, 0, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::RPN_LSB, 0, false).unwrap();
        channel.controller_change(&mut h.ctx(), cc::DATA_ENTRY_MSB, 12, false).unwrap();
        channel.custom.set(CustomController::TransposeFine, 30.0);
        channel.custom.set(CustomController::ChannelTuning, 10.0);
        channel.lock_controller(cc::PAN as usize, true);
        channel.controllers[cc::PAN as usize] = 0;

        channel.reset_controllers(&mut h.ctx()).unwrap();
        assert_eq!(channel.controllers().cc(cc::MAIN_VOLUME), 100);
        assert_eq!(channel.controllers()[cc::PORTAMENTO_CONTROL as usize], PORTAMENTO_CONTROL_UNSET);
        assert_eq!(channel.controllers().pitch_wheel_range(), 2.0);
        assert_eq!(channel.controllers()[cc::PAN as usize], 0);
        assert_eq!(channel.custom_controller(CustomController::TransposeFine), 30.0);
        assert_eq!(channel.custom_controller(CustomController::ChannelTuning), 0.0);
        assert_eq!(channel.tuning_cents(), 30.0);
        assert_eq!(channel.data_entry_state(), DataEntryState::Idle);
    }
}
