//! SoundFont generators: the (type, value) pairs that parameterize a voice.
//!
//! Every generator type has a `{min, max, default}` limit. Values read from
//! a file are never rejected; they are clamped when a voice is built or when
//! the modulated value is evaluated.

use serde::{Deserialize, Serialize};

/// Inclusive limits of a generator type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorLimits {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl GeneratorLimits {
    /// Limits used for types that declare none.
    pub const UNBOUNDED: Self = Self::new(0, 32768, 0);

    const fn new(min: i32, max: i32, default: i32) -> Self {
        Self { min, max, default }
    }

    #[inline]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

macro_rules! generator_types {
    ($($(#[$doc:meta])* $name:ident = $value:literal),* $(,)?) => {
        /// SoundFont 2.04 generator operator.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum GeneratorType {
            $($(#[$doc])* $name = $value),*
        }

        impl GeneratorType {
            /// Every type, indexed by its numeric value.
            pub const ALL: [GeneratorType; GENERATOR_COUNT] = [$(GeneratorType::$name),*];
        }
    };
}

/// Number of generator slots in a voice.
pub const GENERATOR_COUNT: usize = 60;

/// Largest generator number a modulator may target.
pub const MAX_MODULATOR_DESTINATION: u16 = 58;

generator_types! {
    StartAddrsOffset = 0,
    EndAddrOffset = 1,
    StartLoopAddrsOffset = 2,
    EndLoopAddrsOffset = 3,
    StartAddrsCoarseOffset = 4,
    ModLfoToPitch = 5,
    VibLfoToPitch = 6,
    ModEnvToPitch = 7,
    InitialFilterFc = 8,
    InitialFilterQ = 9,
    ModLfoToFilterFc = 10,
    ModEnvToFilterFc = 11,
    EndAddrsCoarseOffset = 12,
    ModLfoToVolume = 13,
    Unused1 = 14,
    ChorusEffectsSend = 15,
    ReverbEffectsSend = 16,
    Pan = 17,
    Unused2 = 18,
    Unused3 = 19,
    Unused4 = 20,
    DelayModLfo = 21,
    FreqModLfo = 22,
    DelayVibLfo = 23,
    FreqVibLfo = 24,
    DelayModEnv = 25,
    AttackModEnv = 26,
    HoldModEnv = 27,
    DecayModEnv = 28,
    SustainModEnv = 29,
    ReleaseModEnv = 30,
    KeyNumToModEnvHold = 31,
    KeyNumToModEnvDecay = 32,
    DelayVolEnv = 33,
    AttackVolEnv = 34,
    HoldVolEnv = 35,
    DecayVolEnv = 36,
    SustainVolEnv = 37,
    ReleaseVolEnv = 38,
    KeyNumToVolEnvHold = 39,
    KeyNumToVolEnvDecay = 40,
    /// Preset zones only: index of the instrument.
    Instrument = 41,
    Reserved1 = 42,
    /// Packed `lo | hi << 8`.
    KeyRange = 43,
    /// Packed `lo | hi << 8`.
    VelRange = 44,
    StartLoopAddrsCoarseOffset = 45,
    /// Forces the MIDI key (-1 = off).
    KeyNum = 46,
    /// Forces the velocity (-1 = off).
    Velocity = 47,
    /// Centibels. The only type left unclamped when zone values are summed.
    InitialAttenuation = 48,
    Reserved2 = 49,
    EndLoopAddrsCoarseOffset = 50,
    CoarseTune = 51,
    FineTune = 52,
    /// Instrument zones only: index of the sample.
    SampleId = 53,
    SampleModes = 54,
    Reserved3 = 55,
    ScaleTuning = 56,
    ExclusiveClass = 57,
    OverridingRootKey = 58,
    Unused5 = 59,
}

impl GeneratorType {
    /// Number of generator types.
    pub const COUNT: usize = GENERATOR_COUNT;

    /// Look up a type by its SF2 operator number.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Slot of this type in a 60-entry generator array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Types that describe zone structure rather than sound.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Instrument | Self::KeyRange | Self::VelRange | Self::SampleId
        )
    }

    /// Declared limits, if the type has any.
    pub fn limits(self) -> Option<GeneratorLimits> {
        use GeneratorType::*;
        let l = GeneratorLimits::new;
        let limits = match self {
            StartAddrsOffset | StartAddrsCoarseOffset => l(0, 32768, 0),
            EndAddrOffset | StartLoopAddrsOffset | EndLoopAddrsOffset => l(-32768, 32768, 0),
            ModLfoToPitch | VibLfoToPitch | ModEnvToPitch => l(-12000, 12000, 0),
            InitialFilterFc => l(1500, 13500, 13500),
            InitialFilterQ => l(0, 960, 0),
            ModLfoToFilterFc | ModEnvToFilterFc => l(-12000, 12000, 0),
            EndAddrsCoarseOffset => l(-32768, 32768, 0),
            ModLfoToVolume => l(-960, 960, 0),
            ChorusEffectsSend | ReverbEffectsSend => l(0, 1000, 0),
            Pan => l(-500, 500, 0),
            DelayModLfo | DelayVibLfo => l(-12000, 5000, -12000),
            FreqModLfo | FreqVibLfo => l(-16000, 4500, 0),
            DelayModEnv => l(-32768, 5000, -32768),
            AttackModEnv => l(-32768, 8000, -32768),
            HoldModEnv => l(-12000, 5000, -12000),
            DecayModEnv => l(-12000, 8000, -12000),
            SustainModEnv => l(0, 1000, 0),
            ReleaseModEnv => l(-7200, 8000, -12000),
            KeyNumToModEnvHold | KeyNumToModEnvDecay => l(-1200, 1200, 0),
            DelayVolEnv => l(-12000, 5000, -12000),
            AttackVolEnv => l(-12000, 8000, -12000),
            HoldVolEnv => l(-12000, 5000, -12000),
            DecayVolEnv => l(-12000, 8000, -12000),
            SustainVolEnv => l(0, 1440, 0),
            ReleaseVolEnv => l(-7200, 8000, -12000),
            KeyNumToVolEnvHold | KeyNumToVolEnvDecay => l(-1200, 1200, 0),
            StartLoopAddrsCoarseOffset => l(-32768, 32768, 0),
            KeyNum | Velocity => l(-1, 127, -1),
            InitialAttenuation => l(0, 1440, 0),
            EndLoopAddrsCoarseOffset => l(-32768, 32768, 0),
            CoarseTune => l(-120, 120, 0),
            FineTune => l(-12700, 12700, 0),
            SampleModes => l(0, 3, 0),
            ScaleTuning => l(0, 1200, 100),
            ExclusiveClass => l(0, 99999, 0),
            OverridingRootKey => l(-1, 127, -1),
            _ => return None,
        };
        Some(limits)
    }

    /// Declared limits, or [`GeneratorLimits::UNBOUNDED`].
    #[inline]
    pub fn limits_or_unbounded(self) -> GeneratorLimits {
        self.limits().unwrap_or(GeneratorLimits::UNBOUNDED)
    }

    /// Value a voice uses when no zone sets this type.
    #[inline]
    pub fn default_value(self) -> i32 {
        self.limits_or_unbounded().default
    }
}

/// One generator of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub kind: GeneratorType,
    pub value: i16,
}

impl Generator {
    /// Create a generator, rounding and clamping to the type's limits when
    /// it has any.
    pub fn new(kind: GeneratorType, value: f64) -> Self {
        let mut value = value.round();
        if let Some(limits) = kind.limits() {
            value = value.clamp(limits.min as f64, limits.max as f64);
        }
        Self {
            kind,
            value: saturate_i16(value),
        }
    }

    /// Create a generator without limit checks (rounded, saturated to i16).
    pub fn unclamped(kind: GeneratorType, value: f64) -> Self {
        Self {
            kind,
            value: saturate_i16(value.round()),
        }
    }

    /// Create a generator from the raw 16-bit amount found in a file.
    #[inline]
    pub fn from_raw(kind: GeneratorType, raw: u16) -> Self {
        Self {
            kind,
            value: raw as i16,
        }
    }

    /// Decode a key or velocity range amount into `(lo, hi)`.
    #[inline]
    pub fn range(&self) -> (u8, u8) {
        let raw = self.value as u16;
        ((raw & 0x7F) as u8, ((raw >> 8) & 0x7F) as u8)
    }
}

#[inline]
fn saturate_i16(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// First value of `kind` in a generator list.
pub fn find_generator(generators: &[Generator], kind: GeneratorType) -> Option<i16> {
    generators.iter().find(|g| g.kind == kind).map(|g| g.value)
}

/// Add two generator amounts and clamp the sum to the type's limits.
///
/// `initialAttenuation` is the exception: summed unclamped so that
/// velocity/volume modulators can still bring it back into range.
#[inline]
pub fn add_and_clamp(kind: GeneratorType, instrument: i32, preset: i32) -> i32 {
    let sum = instrument + preset;
    if kind == GeneratorType::InitialAttenuation {
        return sum;
    }
    kind.limits_or_unbounded().clamp(sum)
}
