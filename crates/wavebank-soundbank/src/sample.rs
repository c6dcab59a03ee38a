//! Sample headers and PCM data.

use std::sync::Arc;

/// SF2 sample link type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    #[default]
    Mono,
    Right,
    Left,
    Linked,
    /// ROM sample, or any other type this engine does not play.
    Other(u16),
}

impl SampleType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::Mono,
            2 => Self::Right,
            4 => Self::Left,
            8 => Self::Linked,
            other => Self::Other(other),
        }
    }
}

/// One sample of a bank.
///
/// Loop points are relative to the first frame of `data`.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    pub sample_rate: u32,
    /// MIDI key of the recorded pitch.
    pub original_pitch: u8,
    /// Cents.
    pub pitch_correction: i8,
    pub link: u16,
    pub sample_type: SampleType,
    pub loop_start: u32,
    pub loop_end: u32,
    pub data: Arc<[i16]>,
}

impl Sample {
    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
