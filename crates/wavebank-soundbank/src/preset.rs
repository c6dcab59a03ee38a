//! Presets and zone resolution.
//!
//! [`Preset::zones_for_note`] walks preset zones, then the zones of each
//! matched instrument, applying global-zone inheritance at every level. The
//! bank's default modulators complete the instrument level; preset
//! modulators are summed on top. Results are memoized per (note, velocity).

use crate::generator::{add_and_clamp, find_generator, Generator, GeneratorType, GENERATOR_COUNT};
use crate::modulator::{add_or_sum, add_unique, Modulator};
use crate::sample::Sample;
use crate::zone::{global_zone, PresetZone, Range};
use dashmap::DashMap;
use std::sync::Arc;
use wavebank_core::{is_xg_drums, DRUM_BANK};

/// One playable layer for a note: a sample and its merged parameters.
#[derive(Debug, Clone)]
pub struct ZoneMatch {
    /// Instrument zone generators with the instrument's global zone applied.
    pub instrument_generators: Vec<Generator>,
    /// Preset zone generators with the preset's global zone applied.
    pub preset_generators: Vec<Generator>,
    pub modulators: Vec<Modulator>,
    pub sample: Arc<Sample>,
}

impl ZoneMatch {
    /// Union view: instrument values first, preset values for the rest.
    pub fn effective_generators(&self) -> Vec<Generator> {
        let mut out = self.instrument_generators.clone();
        add_unique_generators(&mut out, &self.preset_generators);
        out
    }

    /// Additive 60-slot array a voice starts from.
    ///
    /// Each slot is the instrument value (or the type default) plus the
    /// preset value, clamped to limits except for `initialAttenuation`.
    pub fn voice_generators(&self) -> [i16; GENERATOR_COUNT] {
        let mut out = [0i16; GENERATOR_COUNT];
        for kind in GeneratorType::ALL {
            let instrument = find_generator(&self.instrument_generators, kind)
                .map(i32::from)
                .unwrap_or_else(|| kind.default_value());
            let preset = find_generator(&self.preset_generators, kind).map_or(0, i32::from);
            let sum = add_and_clamp(kind, instrument, preset);
            out[kind.index()] = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
        out
    }
}

/// Append the generators of `from` whose types `main` does not define.
pub(crate) fn add_unique_generators(main: &mut Vec<Generator>, from: &[Generator]) {
    for g in from {
        if !main.iter().any(|m| m.kind == g.kind) {
            main.push(*g);
        }
    }
}

/// A preset of a sound bank.
#[derive(Debug)]
pub struct Preset {
    pub name: String,
    pub program: u8,
    pub bank: u16,
    zones: Vec<PresetZone>,
    pub library: u32,
    pub genre: u32,
    pub morphology: u32,
    default_modulators: Arc<[Modulator]>,
    memo: DashMap<(u8, u8), Arc<[ZoneMatch]>>,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        program: u8,
        bank: u16,
        zones: Vec<PresetZone>,
        default_modulators: Arc<[Modulator]>,
    ) -> Self {
        Self {
            name: name.into(),
            program,
            bank,
            zones,
            library: 0,
            genre: 0,
            morphology: 0,
            default_modulators,
            memo: DashMap::new(),
        }
    }

    /// Drum presets live in bank 128, or in the XG drum banks when allowed.
    pub fn is_drum_preset(&self, allow_xg: bool) -> bool {
        self.bank == DRUM_BANK || (allow_xg && is_xg_drums(self.bank))
    }

    pub fn zones(&self) -> &[PresetZone] {
        &self.zones
    }

    /// Mutable zone access. Drops every memoized lookup.
    pub fn zones_mut(&mut self) -> &mut Vec<PresetZone> {
        self.memo.clear();
        &mut self.zones
    }

    /// Replace the zones. Drops every memoized lookup.
    pub fn set_zones(&mut self, zones: Vec<PresetZone>) {
        self.memo.clear();
        self.zones = zones;
    }

    /// Modulators used to complete every instrument zone.
    pub fn default_modulators(&self) -> &[Modulator] {
        &self.default_modulators
    }

    /// Resolve the playable layers for a note.
    pub fn zones_for_note(&self, note: u8, velocity: u8) -> Arc<[ZoneMatch]> {
        let key = (note.min(127), velocity.min(127));
        if let Some(found) = self.memo.get(&key) {
            return Arc::clone(found.value());
        }
        let results: Arc<[ZoneMatch]> = self.resolve(key.0, key.1).into();
        self.memo.insert(key, Arc::clone(&results));
        results
    }

    fn resolve(&self, note: u8, velocity: u8) -> Vec<ZoneMatch> {
        let mut results = Vec::new();
        let global = global_zone(&self.zones);
        let global_gens = global.map_or(&[][..], |z| z.generators.as_slice());
        let global_mods = global.map_or(&[][..], |z| z.modulators.as_slice());
        let global_key = global.and_then(|z| z.key_range).unwrap_or(Range::FULL);
        let global_vel = global.and_then(|z| z.vel_range).unwrap_or(Range::FULL);

        for zone in &self.zones {
            let Some(instrument) = &zone.target else {
                continue;
            };
            if instrument.zones.is_empty() || !zone.matches(note, velocity, global_key, global_vel) {
                continue;
            }

            let mut preset_gens = zone.generators.clone();
            add_unique_generators(&mut preset_gens, global_gens);
            let mut preset_mods = zone.modulators.clone();
            for m in global_mods {
                add_unique(&mut preset_mods, m);
            }

            let inst_global = global_zone(&instrument.zones);
            let inst_gens = inst_global.map_or(&[][..], |z| z.generators.as_slice());
            let inst_mods = inst_global.map_or(&[][..], |z| z.modulators.as_slice());
            let inst_key = inst_global.and_then(|z| z.key_range).unwrap_or(Range::FULL);
            let inst_vel = inst_global.and_then(|z| z.vel_range).unwrap_or(Range::FULL);

            for inst_zone in &instrument.zones {
                let Some(sample) = &inst_zone.target else {
                    continue;
                };
                if !inst_zone.matches(note, velocity, inst_key, inst_vel) {
                    continue;
                }

                let mut instrument_generators = inst_zone.generators.clone();
                add_unique_generators(&mut instrument_generators, inst_gens);

                let mut modulators = inst_zone.modulators.clone();
                for m in inst_mods.iter().chain(self.default_modulators.iter()) {
                    add_unique(&mut modulators, m);
                }
                for m in &preset_mods {
                    add_or_sum(&mut modulators, m);
                }

                results.push(ZoneMatch {
                    instrument_generators,
                    preset_generators: preset_gens.clone(),
                    modulators,
                    sample: Arc::clone(sample),
                });
            }
        }
        results
    }
}
