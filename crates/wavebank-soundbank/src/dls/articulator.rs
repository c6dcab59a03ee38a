//! DLS connection block to SF2 conversion.
//!
//! Conversion order per block:
//!
//! 1. source, control and transform all zero: a plain generator
//! 2. control none and a known (source, destination) pair: a generator
//! 3. anything else: a modulator, or dropped with a warning when SF2 cannot
//!    express the source or destination

use super::constants::{destination as dst, source as src, KEY_TO_ENVELOPE_CORRECTION_LIMIT};
use crate::error::Result;
use crate::generator::{Generator, GeneratorType as G};
use crate::modulator::{dls1_vibrato_modulators, mod_source_enum, source, CurveType, Modulator};
use crate::riff::ByteReader;

/// One DLS connection block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub source: u16,
    pub control: u16,
    pub destination: u16,
    pub transform: u16,
    /// 16.16 fixed point.
    pub scale: i32,
}

impl Connection {
    /// Integer part of the scale.
    #[inline]
    pub fn value(&self) -> i32 {
        self.scale >> 16
    }
}

/// Generators and modulators of one articulation chunk.
#[derive(Debug, Clone, Default)]
pub struct Articulation {
    pub generators: Vec<Generator>,
    pub modulators: Vec<Modulator>,
}

impl Articulation {
    /// Convert a list of connection blocks.
    ///
    /// `dls_level_1` appends the zero-amount vibrato modulators, since DLS 1
    /// has no mod wheel or pressure vibrato.
    pub fn from_connections(connections: &[Connection], dls_level_1: bool) -> Self {
        let mut out = Articulation::default();
        for conn in connections {
            out.push_connection(conn);
        }
        if dls_level_1 {
            out.modulators.extend(dls1_vibrato_modulators());
        }
        out
    }

    fn push_connection(&mut self, conn: &Connection) {
        let value = conn.value() as f64;
        if conn.source == src::NONE && conn.control == src::NONE && conn.transform == 0 {
            self.push_plain_generator(conn.destination, value);
            return;
        }
        if conn.control == src::NONE && self.push_special_generator(conn.source, conn.destination, value) {
            return;
        }
        match convert_connection(conn) {
            Some(m) => self.modulators.push(m),
            None => tracing::warn!(
                "Dropping DLS articulator (source {:#x}, control {:#x}, destination {:#x})",
                conn.source,
                conn.control,
                conn.destination
            ),
        }
    }

    fn push_plain_generator(&mut self, destination: u16, value: f64) {
        let generator = match destination {
            dst::PAN => Generator::new(G::Pan, value),
            // percent to centibels, with the EMU 0.4 attenuation factor
            dst::GAIN => Generator::new(G::InitialAttenuation, -value * 10.0 / 0.4),
            dst::FILTER_CUTOFF => Generator::new(G::InitialFilterFc, value),
            dst::FILTER_Q => Generator::new(G::InitialFilterQ, value),

            dst::MOD_LFO_FREQ => Generator::new(G::FreqModLfo, value),
            dst::MOD_LFO_DELAY => Generator::new(G::DelayModLfo, value),
            dst::VIB_LFO_FREQ => Generator::new(G::FreqVibLfo, value),
            dst::VIB_LFO_DELAY => Generator::new(G::DelayVibLfo, value),

            dst::VOL_ENV_DELAY => Generator::new(G::DelayVolEnv, value),
            dst::VOL_ENV_ATTACK => Generator::new(G::AttackVolEnv, value),
            // hold and decay stay unclamped: a keyNum correction may follow
            dst::VOL_ENV_HOLD => Generator::unclamped(G::HoldVolEnv, value),
            dst::VOL_ENV_DECAY => Generator::unclamped(G::DecayVolEnv, value),
            dst::VOL_ENV_RELEASE => Generator::new(G::ReleaseVolEnv, value),
            dst::VOL_ENV_SUSTAIN => Generator::new(G::SustainVolEnv, 1000.0 - value),

            dst::MOD_ENV_DELAY => Generator::new(G::DelayModEnv, value),
            dst::MOD_ENV_ATTACK => Generator::new(G::AttackModEnv, value),
            dst::MOD_ENV_HOLD => Generator::unclamped(G::HoldModEnv, value),
            dst::MOD_ENV_DECAY => Generator::unclamped(G::DecayModEnv, value),
            dst::MOD_ENV_RELEASE => Generator::new(G::ReleaseModEnv, value),
            dst::MOD_ENV_SUSTAIN => Generator::new(G::SustainModEnv, 1000.0 - value),

            dst::REVERB_SEND => Generator::new(G::ReverbEffectsSend, value),
            dst::CHORUS_SEND => Generator::new(G::ChorusEffectsSend, value),
            dst::PITCH => {
                let semitones = (value / 100.0).floor();
                let cents = (value - semitones * 100.0).floor();
                self.generators.push(Generator::new(G::CoarseTune, semitones));
                Generator::new(G::FineTune, cents)
            }
            _ => return,
        };
        self.generators.push(generator);
    }

    /// Returns false when the pair is not a generator combo.
    fn push_special_generator(&mut self, source: u16, destination: u16, value: f64) -> bool {
        if let Some(kind) = special_combo(source, destination) {
            self.generators.push(Generator::new(kind, value));
            return true;
        }
        if source != src::KEY_NUM {
            return false;
        }
        match destination {
            // 12800 is the regular 100 cents per key
            dst::PITCH => self.generators.push(Generator::new(G::ScaleTuning, value / 128.0)),
            dst::VOL_ENV_HOLD => self.apply_key_to_envelope(value, G::KeyNumToVolEnvHold, G::HoldVolEnv),
            dst::VOL_ENV_DECAY => self.apply_key_to_envelope(value, G::KeyNumToVolEnvDecay, G::DecayVolEnv),
            dst::MOD_ENV_HOLD => self.apply_key_to_envelope(value, G::KeyNumToModEnvHold, G::HoldModEnv),
            dst::MOD_ENV_DECAY => self.apply_key_to_envelope(value, G::KeyNumToModEnvDecay, G::DecayModEnv),
            _ => return false,
        }
        true
    }

    /// keyNum scales are divided by -128. Small ones also shift the base
    /// envelope time already emitted.
    fn apply_key_to_envelope(&mut self, value: f64, key_to: G, real: G) {
        let key_to_value = value / -128.0;
        self.generators.push(Generator::new(key_to, key_to_value));
        if key_to_value <= KEY_TO_ENVELOPE_CORRECTION_LIMIT {
            let correction = ((60.0 / 128.0) * value).round() as i16;
            for g in self.generators.iter_mut().filter(|g| g.kind == real) {
                g.value = g.value.saturating_add(correction);
            }
        }
    }
}

/// Source/destination pairs that SF2 models as a dedicated generator.
fn special_combo(source: u16, destination: u16) -> Option<G> {
    match (source, destination) {
        (src::VIBRATO_LFO, dst::PITCH) => Some(G::VibLfoToPitch),
        (src::MOD_LFO, dst::PITCH) => Some(G::ModLfoToPitch),
        (src::MOD_LFO, dst::FILTER_CUTOFF) => Some(G::ModLfoToFilterFc),
        (src::MOD_LFO, dst::GAIN) => Some(G::ModLfoToVolume),
        (src::MOD_ENV, dst::FILTER_CUTOFF) => Some(G::ModEnvToFilterFc),
        (src::MOD_ENV, dst::PITCH) => Some(G::ModEnvToPitch),
        _ => None,
    }
}

/// SF2 source index and CC flag for a DLS source.
fn sf2_source(dls_source: u16) -> Option<(u8, bool)> {
    let mapped = match dls_source {
        src::KEY_NUM => (source::NOTE_ON_KEY_NUM, false),
        src::NONE => (source::NO_CONTROLLER, false),
        src::MODULATION_WHEEL => (1, true),
        src::PAN => (10, true),
        src::REVERB => (91, true),
        src::CHORUS => (93, true),
        src::EXPRESSION => (11, true),
        src::VOLUME => (7, true),
        src::VELOCITY => (source::NOTE_ON_VELOCITY, false),
        src::POLY_PRESSURE => (source::POLY_PRESSURE, false),
        src::CHANNEL_PRESSURE => (source::CHANNEL_PRESSURE, false),
        src::PITCH_WHEEL => (source::PITCH_WHEEL, false),
        src::PITCH_WHEEL_RANGE => (source::PITCH_WHEEL_RANGE, false),
        // LFOs, envelopes and tuning controls have no SF2 source
        _ => return None,
    };
    Some(mapped)
}

/// SF2 destination and converted amount for a DLS destination.
fn sf2_destination(destination: u16, amount: f32) -> Option<(G, f32)> {
    let kind = match destination {
        dst::PAN => G::Pan,
        dst::GAIN => return Some((G::InitialAttenuation, -amount)),
        dst::PITCH => G::FineTune,
        dst::KEY_NUM => G::OverridingRootKey,

        dst::VOL_ENV_DELAY => G::DelayVolEnv,
        dst::VOL_ENV_ATTACK => G::AttackVolEnv,
        dst::VOL_ENV_HOLD => G::HoldVolEnv,
        dst::VOL_ENV_DECAY => G::DecayVolEnv,
        dst::VOL_ENV_SUSTAIN => return Some((G::SustainVolEnv, 1000.0 - amount)),
        dst::VOL_ENV_RELEASE => G::ReleaseVolEnv,

        dst::MOD_ENV_DELAY => G::DelayModEnv,
        dst::MOD_ENV_ATTACK => G::AttackModEnv,
        dst::MOD_ENV_HOLD => G::HoldModEnv,
        dst::MOD_ENV_DECAY => G::DecayModEnv,
        dst::MOD_ENV_SUSTAIN => return Some((G::SustainModEnv, (1000.0 - amount) / 10.0)),
        dst::MOD_ENV_RELEASE => G::ReleaseModEnv,

        dst::FILTER_CUTOFF => G::InitialFilterFc,
        dst::FILTER_Q => G::InitialFilterQ,
        dst::CHORUS_SEND => G::ChorusEffectsSend,
        dst::REVERB_SEND => G::ReverbEffectsSend,

        dst::MOD_LFO_FREQ => G::FreqModLfo,
        dst::MOD_LFO_DELAY => G::DelayModLfo,
        dst::VIB_LFO_FREQ => G::FreqVibLfo,
        dst::VIB_LFO_DELAY => G::DelayVibLfo,
        _ => return None,
    };
    Some((kind, amount))
}

/// Convert a connection block into an SF2 modulator.
///
/// Returns `None` when the source, control or destination has no SF2
/// equivalent.
pub fn convert_connection(conn: &Connection) -> Option<Modulator> {
    let value = conn.value();
    let transform = conn.transform;

    let (destination, amount, primary, special) = match special_combo(conn.source, conn.destination) {
        Some(kind) => (kind, value as f32, (source::NO_CONTROLLER, false), true),
        None => {
            let (kind, amount) = sf2_destination(conn.destination, value as f32)?;
            (kind, amount, sf2_source(conn.source)?, false)
        }
    };
    let secondary = sf2_source(conn.control)?;

    let mut source_enum = if special {
        // the LFO/envelope itself becomes the generator; the source slot is a constant
        0
    } else {
        let output = transform & 0xF;
        let mut curve = (transform >> 10) & 0xF;
        if curve == CurveType::Linear as u16 && output != CurveType::Linear as u16 {
            curve = output;
        }
        let bipolar = (transform >> 14) & 1 == 1;
        let mut negative = (transform >> 15) & 1 == 1;
        // DLS gain is the inverse of SF2 attenuation
        if destination == G::InitialAttenuation && value < 0 {
            negative = true;
        }
        mod_source_enum(CurveType::from_bits(curve), bipolar, negative, primary.1, primary.0)
    };

    let amount = if destination == G::InitialAttenuation {
        amount.clamp(0.0, 960.0)
    } else {
        amount
    };

    let mut secondary_enum = mod_source_enum(
        CurveType::from_bits((transform >> 4) & 0xF),
        (transform >> 8) & 1 == 1,
        (transform >> 9) & 1 == 1,
        secondary.1,
        secondary.0,
    );
    if special {
        std::mem::swap(&mut source_enum, &mut secondary_enum);
    }

    Some(Modulator::new(source_enum, secondary_enum, destination as u16, amount, 0))
}

/// Read an `art1` / `art2` chunk payload.
pub fn read_articulation(data: &[u8], dls_level_1: bool) -> Result<Articulation> {
    let mut reader = ByteReader::new("art", data);
    let header_size = reader.read_u32()? as usize;
    let count = reader.read_u32()? as usize;
    // cbSize counts the two header fields; skip any extension
    reader.skip(header_size.saturating_sub(8))?;

    let mut connections = Vec::with_capacity(count.min(reader.remaining() / 12));
    for _ in 0..count {
        connections.push(Connection {
            source: reader.read_u16()?,
            control: reader.read_u16()?,
            destination: reader.read_u16()?,
            transform: reader.read_u16()?,
            scale: reader.read_i32()?,
        });
    }
    tracing::debug!("articulation: {} connection blocks", connections.len());
    Ok(Articulation::from_connections(&connections, dls_level_1))
}
