//! Voice cap enforcement.
//!
//! When a note-on pushes the voice total past the cap, the synthesizer asks
//! a [`VoiceEviction`] policy to remove the overflow. Evicted voices are
//! removed immediately, without a release.

use crate::channel::MidiChannel;
use crate::voice::Voice;
use std::cmp::Ordering;

/// Picks and removes voices when the voice cap is exceeded.
pub trait VoiceEviction: Send {
    /// Remove up to `overflow` voices across `channels`. Returns how many
    /// were removed.
    fn evict(&mut self, channels: &mut [MidiChannel], overflow: usize) -> usize;
}

/// Removes the voices that matter least: releasing ones first, then soft
/// ones; drum voices are kept longer. Ties go to the oldest voice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestPriorityEviction;

impl LowestPriorityEviction {
    const DRUM_BONUS: f32 = 5.0;
    const RELEASE_PENALTY: f32 = 10.0;
    const VELOCITY_DIVISOR: f32 = 25.0;

    fn priority(is_drum: bool, voice: &Voice) -> f32 {
        let mut priority = voice.velocity as f32 / Self::VELOCITY_DIVISOR;
        if is_drum {
            priority += Self::DRUM_BONUS;
        }
        if voice.is_in_release {
            priority -= Self::RELEASE_PENALTY;
        }
        priority
    }
}

impl VoiceEviction for LowestPriorityEviction {
    fn evict(&mut self, channels: &mut [MidiChannel], overflow: usize) -> usize {
        if overflow == 0 {
            return 0;
        }
        // (priority, start time, channel, voice index)
        let mut candidates: Vec<(f32, f64, usize, usize)> = channels
            .iter()
            .enumerate()
            .flat_map(|(ci, channel)| {
                let is_drum = channel.is_drum();
                channel
                    .voices()
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !v.finished)
                    .map(move |(vi, v)| (Self::priority(is_drum, v), v.start_time, ci, vi))
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        });

        let mut doomed: Vec<Vec<usize>> = vec![Vec::new(); channels.len()];
        let mut removed = 0;
        for (_, _, ci, vi) in candidates.into_iter().take(overflow) {
            doomed[ci].push(vi);
            removed += 1;
        }
        for (channel, mut indices) in channels.iter_mut().zip(doomed) {
            // highest index first so the others stay valid
            indices.sort_unstable_by(|a, b| b.cmp(a));
            for index in indices {
                channel.voices.remove(index);
            }
        }
        tracing::debug!("Evicted {} voices over the cap", removed);
        removed
    }
}
