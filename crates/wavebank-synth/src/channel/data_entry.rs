//! Registered and non-registered parameter handling (CC6 / CC38).
//!
//! RPNs cover bend range, tuning and modulation depth. The NRPNs are the
//! Roland GS part parameters: vibrato, and three sound controllers that map
//! onto CCs with default modulators (74, 73, 72), plus the drum reverb.

use super::{ChannelContext, ChannelVibrato, MidiChannel};
use crate::controllers::{CustomController, DataEntryState, NON_CC_INDEX_OFFSET};
use crate::error::Result;
use wavebank_midi::controllers as cc;
use wavebank_soundbank::modulator::source;

mod rpn {
    pub const PITCH_BEND_RANGE: u16 = 0x0000;
    pub const FINE_TUNING: u16 = 0x0001;
    pub const COARSE_TUNING: u16 = 0x0002;
    pub const MODULATION_DEPTH: u16 = 0x0005;
    pub const RESET_PARAMETERS: u16 = 0x3FFF;
}

mod nrpn {
    pub const PART_PARAMETER: u8 = 0x01;
    pub const DRUM_REVERB: u8 = 0x1D;

    pub const VIBRATO_RATE: u8 = 0x08;
    pub const VIBRATO_DEPTH: u8 = 0x09;
    pub const VIBRATO_DELAY: u8 = 0x0A;
    pub const TVF_CUTOFF: u8 = 0x20;
    pub const EG_ATTACK_TIME: u8 = 0x64;
    pub const EG_RELEASE_TIME: u8 = 0x66;
}

/// Cents per unit of the 14-bit fine tuning value (100 / 8192).
const FINE_TUNING_STEP: f32 = 0.012_207_031_25;

/// Neutral data value of the GS parameters.
const NRPN_DEFAULT_VALUE: u8 = 64;

impl MidiChannel {
    /// Selected RPN, from the 7-bit CC101 / CC100 values.
    fn registered_parameter(&self) -> u16 {
        ((self.controllers.cc(cc::RPN_MSB) as u16) << 7) | self.controllers.cc(cc::RPN_LSB) as u16
    }

    /// Data Entry MSB (CC6).
    pub(crate) fn data_entry_coarse(&mut self, ctx: &mut ChannelContext<'_>, value: u8) -> Result<()> {
        match self.data_entry {
            DataEntryState::Idle => Ok(()),
            DataEntryState::NrpCoarse | DataEntryState::NrpFine => self.gs_parameter(ctx, value),
            DataEntryState::RpCoarse | DataEntryState::RpFine => {
                match self.registered_parameter() {
                    rpn::PITCH_BEND_RANGE => {
                        self.controllers
                            .set_non_cc(source::PITCH_WHEEL_RANGE, (value as i16) << 7);
                        tracing::info!("Channel {} pitch bend range: {} semitones", self.number, value);
                        self.send_property(ctx);
                    }
                    rpn::COARSE_TUNING => {
                        let semitones = value as f32 - 64.0;
                        self.set_custom_controller(CustomController::TuningSemitones, semitones);
                        tracing::info!("Channel {} coarse tuning: {} semitones", self.number, semitones);
                    }
                    // raw value, completed by the LSB
                    rpn::FINE_TUNING => self.set_tuning(value as f32 - 64.0),
                    rpn::MODULATION_DEPTH => self.set_modulation_depth(value as f32 * 100.0),
                    rpn::RESET_PARAMETERS => self.reset_parameters(),
                    other => tracing::warn!(
                        "Unrecognized RPN for channel {}: 0x{:04X}, data value {}",
                        self.number,
                        other,
                        value
                    ),
                }
                Ok(())
            }
        }
    }

    /// Data Entry LSB (CC38).
    pub(crate) fn data_entry_fine(&mut self, ctx: &mut ChannelContext<'_>, value: u8) {
        if !self.data_entry.is_registered() {
            return;
        }
        match self.registered_parameter() {
            rpn::PITCH_BEND_RANGE => {
                if value == 0 {
                    return;
                }
                let slot = NON_CC_INDEX_OFFSET + source::PITCH_WHEEL_RANGE as usize;
                self.controllers[slot] |= value as i16;
                tracing::info!(
                    "Channel {} pitch bend range: {} semitones",
                    self.number,
                    self.controllers.pitch_wheel_range()
                );
                self.send_property(ctx);
            }
            rpn::FINE_TUNING => {
                let coarse = self.custom.get(CustomController::ChannelTuning) as i32;
                let fine = (coarse << 7) | value as i32;
                self.set_tuning(fine as f32 * FINE_TUNING_STEP);
            }
            rpn::MODULATION_DEPTH => {
                let current = self.custom.get(CustomController::ModulationMultiplier) * 50.0;
                self.set_modulation_depth(current + value as f32 / 128.0 * 100.0);
            }
            rpn::RESET_PARAMETERS => self.reset_parameters(),
            other => tracing::warn!(
                "Unrecognized RPN LSB for channel {}: 0x{:04X}, data value {}",
                self.number,
                other,
                value
            ),
        }
    }

    /// GS NRPN, addressed by the 7-bit CC99 / CC98 values.
    fn gs_parameter(&mut self, ctx: &mut ChannelContext<'_>, value: u8) -> Result<()> {
        if self.lock_gs_nrpn {
            return Ok(());
        }
        let msb = self.controllers.cc(cc::NRPN_MSB);
        let lsb = self.controllers.cc(cc::NRPN_LSB);

        match (msb, lsb) {
            (nrpn::PART_PARAMETER, nrpn::VIBRATO_RATE) => {
                if value != NRPN_DEFAULT_VALUE {
                    self.default_vibrato();
                    self.vibrato.rate = value as f32 / 64.0 * 8.0;
                    tracing::info!("Channel {} vibrato rate: {} Hz", self.number, self.vibrato.rate);
                }
            }
            (nrpn::PART_PARAMETER, nrpn::VIBRATO_DEPTH) => {
                if value != NRPN_DEFAULT_VALUE {
                    self.default_vibrato();
                    self.vibrato.depth = value as f32 / 2.0;
                    tracing::info!("Channel {} vibrato depth: {} cents", self.number, self.vibrato.depth);
                }
            }
            (nrpn::PART_PARAMETER, nrpn::VIBRATO_DELAY) => {
                if value != NRPN_DEFAULT_VALUE {
                    self.default_vibrato();
                    self.vibrato.delay = value as f32 / 64.0 / 3.0;
                    tracing::info!("Channel {} vibrato delay: {} s", self.number, self.vibrato.delay);
                }
            }
            (nrpn::PART_PARAMETER, nrpn::TVF_CUTOFF) => {
                self.controller_change(ctx, cc::BRIGHTNESS, value, false)?;
            }
            (nrpn::PART_PARAMETER, nrpn::EG_ATTACK_TIME) => {
                self.controller_change(ctx, cc::ATTACK_TIME, value, false)?;
            }
            (nrpn::PART_PARAMETER, nrpn::EG_RELEASE_TIME) => {
                self.controller_change(ctx, cc::RELEASE_TIME, value, false)?;
            }
            (nrpn::DRUM_REVERB, _) => {
                self.controller_change(ctx, cc::REVERB_DEPTH, value, false)?;
            }
            _ if value == NRPN_DEFAULT_VALUE => {}
            _ => tracing::warn!(
                "Unrecognized NRPN for channel {}: (0x{:02X} 0x{:02X}), data value {}",
                self.number,
                msb,
                lsb,
                value
            ),
        }
        Ok(())
    }

    fn default_vibrato(&mut self) {
        if self.vibrato.is_off() {
            self.vibrato = ChannelVibrato::GS_DEFAULT;
        }
    }

    /// Back to the idle data entry state (RPN 0x3FFF, resets).
    pub fn reset_parameters(&mut self) {
        if self.data_entry != DataEntryState::Idle {
            tracing::debug!("Channel {} data entry reset", self.number);
        }
        self.data_entry = DataEntryState::Idle;
    }
}
