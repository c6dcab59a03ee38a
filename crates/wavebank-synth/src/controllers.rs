//! Per-channel controller storage.
//!
//! The [`ControllerTable`] holds 147 signed 14-bit slots: the 128 MIDI CCs
//! (stored as `value << 7`, with merged LSBs in the low bits) followed by
//! the non-CC modulator sources at `128 + index` (pitch wheel, bend range,
//! channel pressure). [`CustomControllers`] carries the tuning values that
//! have no MIDI slot.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use wavebank_midi::controllers as cc;
use wavebank_soundbank::modulator::source;

/// Offset of the non-CC sources in the table.
pub const NON_CC_INDEX_OFFSET: usize = 128;

/// Number of slots in a controller table.
pub const CONTROLLER_TABLE_SIZE: usize = 147;

/// CC84 value meaning "no previous portamento key".
pub const PORTAMENTO_CONTROL_UNSET: i16 = 1;

/// Channel configuration pseudo-controller: fixed velocity for every note.
/// Only accepted with `force`.
pub const VELOCITY_OVERRIDE: u8 = 128;

const fn reset_values() -> [i16; CONTROLLER_TABLE_SIZE] {
    let mut t = [0i16; CONTROLLER_TABLE_SIZE];
    let sevens: [(usize, i16); 19] = [
        (cc::MAIN_VOLUME as usize, 100),
        (cc::BALANCE as usize, 64),
        (cc::EXPRESSION as usize, 127),
        (cc::PAN as usize, 64),
        (cc::PORTAMENTO_ON_OFF as usize, 127),
        (cc::FILTER_RESONANCE as usize, 64),
        (cc::RELEASE_TIME as usize, 64),
        (cc::ATTACK_TIME as usize, 64),
        (cc::BRIGHTNESS as usize, 64),
        (cc::DECAY_TIME as usize, 64),
        (cc::VIBRATO_RATE as usize, 64),
        (cc::VIBRATO_DEPTH as usize, 64),
        (cc::VIBRATO_DELAY as usize, 64),
        (cc::GENERAL_PURPOSE_6 as usize, 64),
        (cc::GENERAL_PURPOSE_8 as usize, 64),
        (cc::RPN_LSB as usize, 127),
        (cc::RPN_MSB as usize, 127),
        (cc::NRPN_LSB as usize, 127),
        (cc::NRPN_MSB as usize, 127),
    ];
    let mut i = 0;
    while i < sevens.len() {
        t[sevens[i].0] = sevens[i].1 << 7;
        i += 1;
    }
    t[cc::PORTAMENTO_CONTROL as usize] = PORTAMENTO_CONTROL_UNSET;
    t[NON_CC_INDEX_OFFSET + source::PITCH_WHEEL as usize] = 64 << 7;
    t[NON_CC_INDEX_OFFSET + source::PITCH_WHEEL_RANGE as usize] = 2 << 7;
    t
}

/// Power-on values of every slot.
pub const RESET_VALUES: [i16; CONTROLLER_TABLE_SIZE] = reset_values();

/// CCs that "Reset All Controllers" (CC121) leaves alone, per RP-15.
pub const NON_RESETTABLE_CCS: [u8; 21] = [
    cc::BANK_SELECT,
    cc::LSB_BANK_SELECT,
    cc::MAIN_VOLUME,
    cc::LSB_MAIN_VOLUME,
    cc::PAN,
    cc::LSB_PAN,
    cc::REVERB_DEPTH,
    cc::TREMOLO_DEPTH,
    cc::CHORUS_DEPTH,
    cc::DETUNE_DEPTH,
    cc::PHASER_DEPTH,
    cc::SOUND_VARIATION,
    cc::FILTER_RESONANCE,
    cc::RELEASE_TIME,
    cc::ATTACK_TIME,
    cc::BRIGHTNESS,
    cc::DECAY_TIME,
    cc::VIBRATO_RATE,
    cc::VIBRATO_DEPTH,
    cc::VIBRATO_DELAY,
    cc::SOUND_CONTROLLER_10,
];

/// Whether CC121 resets this controller.
#[inline]
pub fn is_resettable(controller: u8) -> bool {
    !NON_RESETTABLE_CCS.contains(&controller)
}

/// The 147-slot controller array of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerTable([i16; CONTROLLER_TABLE_SIZE]);

impl Default for ControllerTable {
    fn default() -> Self {
        Self(RESET_VALUES)
    }
}

impl ControllerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 7-bit value of a CC (the MSB part of its slot).
    #[inline]
    pub fn cc(&self, controller: u8) -> u8 {
        (self.0[controller as usize] >> 7) as u8
    }

    /// Slot of a non-CC source.
    #[inline]
    pub fn non_cc(&self, index: u8) -> i16 {
        self.0[NON_CC_INDEX_OFFSET + index as usize]
    }

    #[inline]
    pub fn set_non_cc(&mut self, index: u8, value: i16) {
        self.0[NON_CC_INDEX_OFFSET + index as usize] = value;
    }

    /// 14-bit pitch wheel position, 8192 is centered.
    #[inline]
    pub fn pitch_wheel(&self) -> u16 {
        self.non_cc(source::PITCH_WHEEL) as u16
    }

    /// Pitch bend range in semitones, fine part included.
    #[inline]
    pub fn pitch_wheel_range(&self) -> f32 {
        self.non_cc(source::PITCH_WHEEL_RANGE) as f32 / 128.0
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<i16> {
        self.0.to_vec()
    }

    /// Overwrite from a slice (a snapshot). Missing slots keep their value.
    pub fn copy_from(&mut self, values: &[i16]) {
        let n = values.len().min(CONTROLLER_TABLE_SIZE);
        self.0[..n].copy_from_slice(&values[..n]);
    }
}

impl Index<usize> for ControllerTable {
    type Output = i16;

    #[inline]
    fn index(&self, index: usize) -> &i16 {
        &self.0[index]
    }
}

impl IndexMut<usize> for ControllerTable {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut i16 {
        &mut self.0[index]
    }
}

/// Tuning values without a MIDI controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum CustomController {
    /// Cents, from the fine tuning RPN.
    ChannelTuning = 0,
    /// Cents, the fractional part of the channel transposition.
    TransposeFine = 1,
    /// Multiplier of the modulation depth (depth in cents / 50).
    ModulationMultiplier = 2,
    /// Cents, from master tuning SysEx.
    MasterTuning = 3,
    /// Semitones, from the coarse tuning RPN.
    TuningSemitones = 4,
}

pub const CUSTOM_CONTROLLER_COUNT: usize = 5;

/// Values of the custom controllers after a reset.
pub const CUSTOM_RESET_VALUES: [f32; CUSTOM_CONTROLLER_COUNT] = [0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomControllers([f32; CUSTOM_CONTROLLER_COUNT]);

impl Default for CustomControllers {
    fn default() -> Self {
        Self(CUSTOM_RESET_VALUES)
    }
}

impl CustomControllers {
    #[inline]
    pub fn get(&self, controller: CustomController) -> f32 {
        self.0[controller as usize]
    }

    #[inline]
    pub fn set(&mut self, controller: CustomController, value: f32) {
        self.0[controller as usize] = value;
    }

    /// Sum of every tuning source, in cents.
    pub fn tuning_cents(&self) -> f32 {
        self.get(CustomController::ChannelTuning)
            + self.get(CustomController::TransposeFine)
            + self.get(CustomController::MasterTuning)
            + self.get(CustomController::TuningSemitones) * 100.0
    }
}

/// Registered / non-registered parameter state (CC 98-101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataEntryState {
    #[default]
    Idle,
    RpCoarse,
    RpFine,
    NrpCoarse,
    NrpFine,
}

impl DataEntryState {
    /// State selected by a parameter-number CC, if it is one.
    pub fn for_controller(controller: u8) -> Option<Self> {
        match controller {
            cc::RPN_MSB => Some(Self::RpCoarse),
            cc::RPN_LSB => Some(Self::RpFine),
            cc::NRPN_MSB => Some(Self::NrpCoarse),
            cc::NRPN_LSB => Some(Self::NrpFine),
            _ => None,
        }
    }

    #[inline]
    pub fn is_registered(self) -> bool {
        matches!(self, Self::RpCoarse | Self::RpFine)
    }

    #[inline]
    pub fn is_non_registered(self) -> bool {
        matches!(self, Self::NrpCoarse | Self::NrpFine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_values() {
        let table = ControllerTable::new();
        assert_eq!(table.cc(cc::MAIN_VOLUME), 100);
        assert_eq!(table.cc(cc::EXPRESSION), 127);
        assert_eq!(table.cc(cc::RPN_MSB), 127);
        assert_eq!(table[cc::PORTAMENTO_CONTROL as usize], PORTAMENTO_CONTROL_UNSET);
        assert_eq!(table.pitch_wheel(), 8192);
        assert_eq!(table.pitch_wheel_range(), 2.0);
        assert_eq!(table.cc(cc::MODULATION_WHEEL), 0);
    }

    #[test]
    fn test_resettable_set() {
        assert!(!is_resettable(cc::MAIN_VOLUME));
        assert!(!is_resettable(cc::BANK_SELECT));
        assert!(is_resettable(cc::MODULATION_WHEEL));
        assert!(is_resettable(cc::EXPRESSION));
        assert!(is_resettable(cc::SUSTAIN_PEDAL));
    }

    #[test]
    fn test_custom_tuning_sum() {
        let mut custom = CustomControllers::default();
        assert_eq!(custom.get(CustomController::ModulationMultiplier), 1.0);
        custom.set(CustomController::ChannelTuning, 10.0);
        custom.set(CustomController::TransposeFine, 50.0);
        custom.set(CustomController::MasterTuning, -5.0);
        custom.set(CustomController::TuningSemitones, 2.0);
        assert_eq!(custom.tuning_cents(), 255.0);
    }

    #[test]
    fn test_data_entry_state_selection() {
        assert_eq!(DataEntryState::for_controller(101), Some(DataEntryState::RpCoarse));
        assert_eq!(DataEntryState::for_controller(98), Some(DataEntryState::NrpFine));
        assert_eq!(DataEntryState::for_controller(7), None);
        assert!(DataEntryState::NrpCoarse.is_non_registered());
        assert!(!DataEntryState::Idle.is_registered());
    }

    #[test]
    fn test_copy_from_snapshot() {
        let mut table = ControllerTable::new();
        let mut values = table.to_vec();
        values[cc::PAN as usize] = 10 << 7;
        table.copy_from(&values[..20]);
        assert_eq!(table.cc(cc::PAN), 10);
        assert_eq!(table.cc(cc::EXPRESSION), 127);
    }
}
