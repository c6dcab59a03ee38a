//! Real-time modulator evaluation.
//!
//! A voice starts from its static generator array; every modulator adds
//! its current contribution to one destination slot of
//! `modulated_generators`, clamping to the destination's limits after each
//! addition. [`compute_all`] runs at note-on, [`compute_for_source`] after
//! a single controller changes.

use crate::controllers::{ControllerTable, NON_CC_INDEX_OFFSET};
use crate::curves;
use crate::voice::Voice;
use wavebank_soundbank::modulator::source;
use wavebank_soundbank::{GeneratorType, Modulator, ModulatorSource, TransformType, GENERATOR_COUNT};

/// Effect sends (CC91/CC93) scale their amount to the 0-1000 range.
const EFFECT_MODULATOR_TRANSFORM_MULTIPLIER: f32 = 1000.0 / 200.0;

/// Raw value standing for "fully on" (no controller).
const NO_CONTROLLER_VALUE: i32 = 16383;

/// Which envelopes the renderer has to recalculate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeRefresh {
    pub volume: bool,
    pub modulation: bool,
}

impl EnvelopeRefresh {
    pub const ALL: Self = Self {
        volume: true,
        modulation: true,
    };
}

/// Per-voice source values that do not live in the controller table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSources {
    pub note: u8,
    pub velocity: u8,
    pub pressure: u8,
}

/// Generators whose change invalidates the volume envelope.
#[inline]
fn affects_volume_envelope(kind: GeneratorType) -> bool {
    kind == GeneratorType::InitialAttenuation
        || (GeneratorType::DelayVolEnv.index()..=GeneratorType::KeyNumToVolEnvDecay.index())
            .contains(&kind.index())
}

fn raw_source_value(controllers: &ControllerTable, src: &ModulatorSource, note: NoteSources) -> i32 {
    if src.uses_cc {
        return controllers[src.index as usize] as i32;
    }
    match src.index {
        source::NO_CONTROLLER => NO_CONTROLLER_VALUE,
        source::NOTE_ON_KEY_NUM => (note.note as i32) << 7,
        source::NOTE_ON_VELOCITY => (note.velocity as i32) << 7,
        source::POLY_PRESSURE => (note.pressure as i32) << 7,
        index => controllers
            .as_slice()
            .get(NON_CC_INDEX_OFFSET + index as usize)
            .map_or(0, |v| *v as i32),
    }
}

/// Evaluate one modulator and cache the result in `current_value`.
pub fn compute_modulator(controllers: &ControllerTable, modulator: &mut Modulator, note: NoteSources) -> f32 {
    if modulator.amount == 0.0 {
        modulator.current_value = 0.0;
        return 0.0;
    }

    let primary = curves::transform(
        &modulator.source,
        raw_source_value(controllers, &modulator.source, note),
    );
    let secondary = curves::transform(
        &modulator.secondary,
        raw_source_value(controllers, &modulator.secondary, note),
    );

    let mut amount = modulator.amount;
    if modulator.is_effect && amount <= 1000.0 {
        amount = (amount * EFFECT_MODULATOR_TRANSFORM_MULTIPLIER).min(1000.0);
    }

    let mut value = primary * secondary * amount;
    if modulator.transform == TransformType::Absolute {
        value = value.abs();
    }
    modulator.current_value = value;
    value
}

/// Add a contribution to a slot, clamped to the destination's limits.
#[inline]
fn accumulate(slot: i16, value: f32, kind: GeneratorType) -> i16 {
    let limits = kind.limits_or_unbounded();
    let sum = slot as f32 + value;
    // the cast truncates toward zero, like storing into a 16-bit slot
    sum.clamp(limits.min as f32, limits.max as f32)
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Recompute every modulator of the voice from scratch.
pub fn compute_all(voice: &mut Voice, controllers: &ControllerTable) -> EnvelopeRefresh {
    let note = voice.note_sources();
    voice.modulated_generators = voice.generators;
    for modulator in voice.modulators.iter_mut() {
        let Some(destination) = modulator.destination else {
            continue;
        };
        let value = compute_modulator(controllers, modulator, note);
        let slot = &mut voice.modulated_generators[destination.index()];
        *slot = accumulate(*slot, value, destination);
    }
    EnvelopeRefresh::ALL
}

/// Recompute the modulators that read one controller.
///
/// `uses_cc` and `index` name the controller the same way a
/// [`ModulatorSource`] does. Every dependent modulator is evaluated first,
/// then each touched destination is rebuilt from its generator value and
/// the cached contributions of all its modulators, so the result equals a
/// full recompute for those slots. Returns `None` when no modulator of the
/// voice reads the controller.
pub fn compute_for_source(
    voice: &mut Voice,
    controllers: &ControllerTable,
    uses_cc: bool,
    index: u8,
) -> Option<EnvelopeRefresh> {
    let note = voice.note_sources();
    let mut touched = [false; GENERATOR_COUNT];
    let mut any = false;

    for modulator in voice.modulators.iter_mut() {
        let Some(destination) = modulator.destination else {
            continue;
        };
        if modulator.depends_on(uses_cc, index) {
            compute_modulator(controllers, modulator, note);
            touched[destination.index()] = true;
            any = true;
        }
    }
    if !any {
        return None;
    }

    let mut volume = false;
    for kind in GeneratorType::ALL {
        if !touched[kind.index()] {
            continue;
        }
        let mut slot = voice.generators[kind.index()];
        for modulator in voice.modulators.iter().filter(|m| m.destination == Some(kind)) {
            slot = accumulate(slot, modulator.current_value, kind);
        }
        voice.modulated_generators[kind.index()] = slot;
        volume |= affects_volume_envelope(kind);
    }

    Some(EnvelopeRefresh {
        volume,
        modulation: true,
    })
}
