//! SoundFont modulators.
//!
//! A modulator routes a controller (or a note property) through a curve onto
//! a generator. The packed 16-bit source enum is decoded once, at
//! construction:
//!
//! | Bits  | Field |
//! |-------|-------|
//! | 0-6   | index |
//! | 7     | CC flag |
//! | 8     | direction (1 = max to min) |
//! | 9     | polarity (1 = bipolar) |
//! | 10-15 | curve type |

use crate::generator::{GeneratorType, MAX_MODULATOR_DESTINATION};
use serde::{Deserialize, Serialize};

/// Non-CC source indices.
pub mod source {
    pub const NO_CONTROLLER: u8 = 0;
    pub const NOTE_ON_VELOCITY: u8 = 2;
    pub const NOTE_ON_KEY_NUM: u8 = 3;
    pub const POLY_PRESSURE: u8 = 10;
    pub const CHANNEL_PRESSURE: u8 = 13;
    pub const PITCH_WHEEL: u8 = 14;
    pub const PITCH_WHEEL_RANGE: u8 = 16;
    pub const LINK: u8 = 127;
}

/// Amount of the default velocity / volume / expression to attenuation
/// modulators, in centibels.
pub const DEFAULT_ATTENUATION_MOD_AMOUNT: f32 = 960.0;

/// Source curve shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveType {
    #[default]
    Linear = 0,
    Concave = 1,
    Convex = 2,
    Switch = 3,
}

impl CurveType {
    pub const ALL: [CurveType; 4] = [
        CurveType::Linear,
        CurveType::Concave,
        CurveType::Convex,
        CurveType::Switch,
    ];

    /// Curve type of a 2-bit (or wider, masked) value.
    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        Self::ALL[(bits & 0x3) as usize]
    }
}

/// How the modulator output is post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformType {
    #[default]
    Linear,
    Absolute,
}

impl TransformType {
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        if value == 2 {
            Self::Absolute
        } else {
            Self::Linear
        }
    }

    #[inline]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Linear => 0,
            Self::Absolute => 2,
        }
    }
}

/// Decoded modulator source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModulatorSource {
    /// CC number when `uses_cc`, otherwise one of [`source`].
    pub index: u8,
    pub uses_cc: bool,
    /// Max to min.
    pub negative: bool,
    pub bipolar: bool,
    pub curve: CurveType,
}

impl ModulatorSource {
    pub fn decode(raw: u16) -> Self {
        Self {
            index: (raw & 0x7F) as u8,
            uses_cc: (raw >> 7) & 1 == 1,
            negative: (raw >> 8) & 1 == 1,
            bipolar: (raw >> 9) & 1 == 1,
            curve: CurveType::from_bits(raw >> 10),
        }
    }

    #[inline]
    pub fn encode(&self) -> u16 {
        mod_source_enum(self.curve, self.bipolar, self.negative, self.uses_cc, self.index)
    }
}

/// Pack a modulator source.
#[inline]
pub const fn mod_source_enum(
    curve: CurveType,
    bipolar: bool,
    negative: bool,
    uses_cc: bool,
    index: u8,
) -> u16 {
    ((curve as u16) << 10)
        | ((bipolar as u16) << 9)
        | ((negative as u16) << 8)
        | ((uses_cc as u16) << 7)
        | (index as u16 & 0x7F)
}

/// A SoundFont modulator.
///
/// Identity is (source, secondary source, destination, transform). Two
/// identical modulators are never both kept; their amounts are summed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modulator {
    pub source_enum: u16,
    pub secondary_enum: u16,
    /// Raw destination operator as read from the bank.
    pub destination_raw: u16,
    /// Fractional for DLS-derived sustain modulators.
    pub amount: f32,
    pub transform: TransformType,

    pub source: ModulatorSource,
    pub secondary: ModulatorSource,
    /// `None` for destinations above 58; such modulators are never evaluated.
    pub destination: Option<GeneratorType>,
    /// Reverb/chorus send driven by CC91/CC93.
    pub is_effect: bool,

    /// Last computed contribution.
    #[serde(skip)]
    pub current_value: f32,
}

impl Modulator {
    pub fn new(
        source_enum: u16,
        secondary_enum: u16,
        destination: u16,
        amount: f32,
        transform: u16,
    ) -> Self {
        let target = if destination > MAX_MODULATOR_DESTINATION {
            None
        } else {
            GeneratorType::from_u16(destination)
        };
        let is_effect = (source_enum == 0x00DB || source_enum == 0x00DD)
            && secondary_enum == 0
            && matches!(
                target,
                Some(GeneratorType::ReverbEffectsSend) | Some(GeneratorType::ChorusEffectsSend)
            );
        Self {
            source_enum,
            secondary_enum,
            destination_raw: destination,
            amount,
            transform: TransformType::from_u16(transform),
            source: ModulatorSource::decode(source_enum),
            secondary: ModulatorSource::decode(secondary_enum),
            destination: target,
            is_effect,
            current_value: 0.0,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.destination.is_some()
    }

    /// Same routing, optionally also the same amount.
    pub fn is_identical(&self, other: &Modulator, check_amount: bool) -> bool {
        self.source_enum == other.source_enum
            && self.secondary_enum == other.secondary_enum
            && self.destination_raw == other.destination_raw
            && self.transform == other.transform
            && (!check_amount || self.amount == other.amount)
    }

    /// New modulator with this routing and the two amounts summed.
    pub fn sum_transform(&self, other: &Modulator) -> Modulator {
        Modulator::new(
            self.source_enum,
            self.secondary_enum,
            self.destination_raw,
            self.amount + other.amount,
            self.transform.to_u16(),
        )
    }

    /// Whether a change of this controller can affect the modulator.
    ///
    /// `uses_cc` selects between the CC slots and the non-CC sources.
    #[inline]
    pub fn depends_on(&self, uses_cc: bool, index: u8) -> bool {
        (self.source.uses_cc == uses_cc && self.source.index == index)
            || (self.secondary.uses_cc == uses_cc && self.secondary.index == index)
    }
}

impl PartialEq for Modulator {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other, true)
    }
}

/// Push `modulator` unless an identical one (ignoring amount) is present.
pub fn add_unique(list: &mut Vec<Modulator>, modulator: &Modulator) {
    if !list.iter().any(|m| m.is_identical(modulator, false)) {
        list.push(modulator.clone());
    }
}

/// Sum `modulator` into an identical entry, or push it.
pub fn add_or_sum(list: &mut Vec<Modulator>, modulator: &Modulator) {
    match list.iter_mut().find(|m| m.is_identical(modulator, false)) {
        Some(existing) => *existing = existing.sum_transform(modulator),
        None => list.push(modulator.clone()),
    }
}

const fn cc(curve: CurveType, bipolar: bool, negative: bool, index: u8) -> u16 {
    mod_source_enum(curve, bipolar, negative, true, index)
}

/// The SF2 default modulators followed by the engine's extra defaults.
pub fn default_modulators() -> Vec<Modulator> {
    use CurveType::*;
    use GeneratorType as G;
    let m = |src: u16, sec: u16, dest: GeneratorType, amount: f32| {
        Modulator::new(src, sec, dest as u16, amount, 0)
    };
    vec![
        // SF2 2.04 section 8.4
        m(
            mod_source_enum(Concave, false, true, false, source::NOTE_ON_VELOCITY),
            0,
            G::InitialAttenuation,
            DEFAULT_ATTENUATION_MOD_AMOUNT,
        ),
        m(0x0081, 0, G::VibLfoToPitch, 50.0),
        m(
            cc(Concave, false, true, 7),
            0,
            G::InitialAttenuation,
            DEFAULT_ATTENUATION_MOD_AMOUNT,
        ),
        m(0x000D, 0, G::VibLfoToPitch, 50.0),
        m(0x020E, 0x0010, G::FineTune, 12700.0),
        // half of the SF2 amount: full-width pan is too wide
        m(0x028A, 0, G::Pan, 500.0),
        m(
            cc(Concave, false, true, 11),
            0,
            G::InitialAttenuation,
            DEFAULT_ATTENUATION_MOD_AMOUNT,
        ),
        m(0x00DB, 0, G::ReverbEffectsSend, 200.0),
        m(0x00DD, 0, G::ChorusEffectsSend, 200.0),
        // extras
        m(
            mod_source_enum(Linear, false, false, false, source::POLY_PRESSURE),
            0,
            G::VibLfoToPitch,
            50.0,
        ),
        m(cc(Linear, false, false, 92), 0, G::ModLfoToVolume, 24.0),
        m(cc(Convex, true, false, 73), 0, G::AttackVolEnv, 6000.0),
        m(cc(Linear, true, false, 72), 0, G::ReleaseVolEnv, 3600.0),
        m(cc(Linear, true, false, 74), 0, G::InitialFilterFc, 6000.0),
        m(cc(Linear, true, false, 71), 0, G::InitialFilterQ, 250.0),
    ]
}

/// Zero-amount vibrato routes appended to DLS level 1 articulations, so the
/// SF2 defaults for mod wheel and channel pressure are cancelled out.
pub fn dls1_vibrato_modulators() -> [Modulator; 2] {
    [
        Modulator::new(0x0081, 0, GeneratorType::VibLfoToPitch as u16, 0.0, 0),
        Modulator::new(0x000D, 0, GeneratorType::VibLfoToPitch as u16, 0.0, 0),
    ]
}
