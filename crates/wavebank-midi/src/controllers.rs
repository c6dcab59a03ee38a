//! MIDI controller numbers.

pub const BANK_SELECT: u8 = 0;
pub const MODULATION_WHEEL: u8 = 1;
pub const BREATH_CONTROLLER: u8 = 2;
pub const FOOT_CONTROLLER: u8 = 4;
pub const PORTAMENTO_TIME: u8 = 5;
pub const DATA_ENTRY_MSB: u8 = 6;
pub const MAIN_VOLUME: u8 = 7;
pub const BALANCE: u8 = 8;
pub const PAN: u8 = 10;
pub const EXPRESSION: u8 = 11;
pub const EFFECT_CONTROL_1: u8 = 12;
pub const EFFECT_CONTROL_2: u8 = 13;
pub const GENERAL_PURPOSE_1: u8 = 16;
pub const GENERAL_PURPOSE_2: u8 = 17;
pub const GENERAL_PURPOSE_3: u8 = 18;
pub const GENERAL_PURPOSE_4: u8 = 19;
pub const LSB_BANK_SELECT: u8 = 32;
pub const LSB_MODULATION_WHEEL: u8 = 33;
pub const LSB_BREATH_CONTROLLER: u8 = 34;
pub const LSB_FOOT_CONTROLLER: u8 = 36;
pub const LSB_PORTAMENTO_TIME: u8 = 37;
pub const LSB_DATA_ENTRY: u8 = 38;
pub const LSB_MAIN_VOLUME: u8 = 39;
pub const LSB_BALANCE: u8 = 40;
pub const LSB_PAN: u8 = 42;
pub const LSB_EXPRESSION: u8 = 43;
pub const LSB_EFFECT_CONTROL_1: u8 = 44;
pub const LSB_EFFECT_CONTROL_2: u8 = 45;
pub const SUSTAIN_PEDAL: u8 = 64;
pub const PORTAMENTO_ON_OFF: u8 = 65;
pub const SOSTENUTO_PEDAL: u8 = 66;
pub const SOFT_PEDAL: u8 = 67;
pub const LEGATO_FOOTSWITCH: u8 = 68;
pub const HOLD_2_PEDAL: u8 = 69;
pub const SOUND_VARIATION: u8 = 70;
pub const FILTER_RESONANCE: u8 = 71;
pub const RELEASE_TIME: u8 = 72;
pub const ATTACK_TIME: u8 = 73;
pub const BRIGHTNESS: u8 = 74;
pub const DECAY_TIME: u8 = 75;
pub const VIBRATO_RATE: u8 = 76;
pub const VIBRATO_DEPTH: u8 = 77;
pub const VIBRATO_DELAY: u8 = 78;
pub const SOUND_CONTROLLER_10: u8 = 79;
pub const GENERAL_PURPOSE_5: u8 = 80;
pub const GENERAL_PURPOSE_6: u8 = 81;
pub const GENERAL_PURPOSE_7: u8 = 82;
pub const GENERAL_PURPOSE_8: u8 = 83;
pub const PORTAMENTO_CONTROL: u8 = 84;
pub const REVERB_DEPTH: u8 = 91;
pub const TREMOLO_DEPTH: u8 = 92;
pub const CHORUS_DEPTH: u8 = 93;
pub const DETUNE_DEPTH: u8 = 94;
pub const PHASER_DEPTH: u8 = 95;
pub const DATA_INCREMENT: u8 = 96;
pub const DATA_DECREMENT: u8 = 97;
pub const NRPN_LSB: u8 = 98;
pub const NRPN_MSB: u8 = 99;
pub const RPN_LSB: u8 = 100;
pub const RPN_MSB: u8 = 101;
pub const ALL_SOUND_OFF: u8 = 120;
pub const RESET_ALL_CONTROLLERS: u8 = 121;
pub const LOCAL_CONTROL: u8 = 122;
pub const ALL_NOTES_OFF: u8 = 123;
pub const OMNI_MODE_OFF: u8 = 124;
pub const OMNI_MODE_ON: u8 = 125;
pub const MONO_MODE_ON: u8 = 126;
pub const POLY_MODE_ON: u8 = 127;

/// True for the 14-bit LSB controllers (33-45) the synth merges into
/// their MSB slot. Data entry LSB (38) is excluded, it drives the
/// registered-parameter state machine instead.
#[inline]
pub fn is_merged_lsb(cc: u8) -> bool {
    (LSB_MODULATION_WHEEL..=LSB_EFFECT_CONTROL_2).contains(&cc) && cc != LSB_DATA_ENTRY
}
