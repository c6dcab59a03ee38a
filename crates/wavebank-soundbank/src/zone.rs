//! Preset and instrument zones.

use crate::generator::{Generator, GeneratorType};
use crate::instrument::Instrument;
use crate::modulator::Modulator;
use crate::sample::Sample;
use std::sync::Arc;

/// Inclusive key or velocity range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u8,
    pub max: u8,
}

impl Range {
    pub const FULL: Range = Range { min: 0, max: 127 };

    #[inline]
    pub fn contains(&self, value: u8) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::FULL
    }
}

/// A zone of a preset (`R = Instrument`) or an instrument (`R = Sample`).
///
/// Structural generators are lifted out of `generators` at construction:
/// key/velocity ranges become fields and the instrument/sample reference
/// becomes `target`. A zone without a target is global.
#[derive(Debug, Clone)]
pub struct Zone<R> {
    pub key_range: Option<Range>,
    pub vel_range: Option<Range>,
    pub generators: Vec<Generator>,
    pub modulators: Vec<Modulator>,
    pub target: Option<Arc<R>>,
}

pub type PresetZone = Zone<Instrument>;
pub type InstrumentZone = Zone<Sample>;

impl<R> Zone<R> {
    pub fn new(generators: Vec<Generator>, modulators: Vec<Modulator>, target: Option<Arc<R>>) -> Self {
        let mut key_range = None;
        let mut vel_range = None;
        let mut kept = Vec::with_capacity(generators.len());
        for g in generators {
            match g.kind {
                GeneratorType::KeyRange => {
                    let (min, max) = g.range();
                    key_range = Some(Range { min, max });
                }
                GeneratorType::VelRange => {
                    let (min, max) = g.range();
                    vel_range = Some(Range { min, max });
                }
                kind if kind.is_structural() => {}
                _ => kept.push(g),
            }
        }
        Self {
            key_range,
            vel_range,
            generators: kept,
            modulators,
            target,
        }
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.target.is_none()
    }

    /// Range test against this zone, falling back to the global zone's
    /// ranges for the ones it does not define.
    pub fn matches(&self, note: u8, velocity: u8, global_key: Range, global_vel: Range) -> bool {
        self.key_range.unwrap_or(global_key).contains(note)
            && self.vel_range.unwrap_or(global_vel).contains(velocity)
    }
}

/// The first zone, when it is global.
pub(crate) fn global_zone<R>(zones: &[Zone<R>]) -> Option<&Zone<R>> {
    zones.first().filter(|z| z.is_global())
}
