//! A sounding layer of a note.
//!
//! A [`Voice`] is created per matched zone at note-on. It owns its static
//! generator array, the live `modulated_generators` the renderer reads, a
//! private copy of the zone's modulators and a cursor into the shared
//! sample data. Release is soft: the voice stays in its channel until the
//! renderer marks it `finished`.

use crate::compute::{EnvelopeRefresh, NoteSources};
use std::sync::Arc;
use wavebank_soundbank::{GeneratorType, Modulator, Sample, ZoneMatch, GENERATOR_COUNT};

/// Shortest audible note, in seconds. Earlier releases are postponed.
pub const MIN_NOTE_LENGTH: f64 = 0.03;

/// Shortest note cut by an exclusive class, in seconds.
pub const MIN_EXCLUSIVE_LENGTH: f64 = 0.07;

/// Volume release (timecents) forced on voices cut by an exclusive class.
pub const EXCLUSIVE_CUTOFF_TIME: i16 = -2320;

/// Modulation release (timecents) forced on voices cut by an exclusive class.
pub const EXCLUSIVE_MOD_CUTOFF_TIME: i16 = -1130;

/// Volume release (timecents) of a killed voice.
pub const KILL_RELEASE_TIME: i16 = -12000;

/// Frames per coarse sample offset unit.
const COARSE_OFFSET_FRAMES: i32 = 32768;

/// Playback state of a voice inside its sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCursor {
    /// Frames advanced per output frame at the root key.
    pub playback_step: f64,
    pub position: f64,
    pub root_key: u8,
    pub loop_start: usize,
    pub loop_end: usize,
    /// Last playable frame.
    pub end: usize,
    /// `sampleModes`: 0 no loop, 1 loop, 3 loop until release.
    pub looping_mode: i16,
    pub is_looping: bool,
}

impl SampleCursor {
    fn new(sample: &Sample, root_key: u8, playback_step: f64, looping_mode: i16) -> Self {
        Self {
            playback_step,
            position: 0.0,
            root_key,
            loop_start: sample.loop_start as usize,
            loop_end: sample.loop_end as usize,
            end: sample.len().saturating_sub(1),
            looping_mode,
            is_looping: looping_mode == 1 || looping_mode == 3,
        }
    }
}

/// Note-level inputs of [`Voice::new`].
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    /// Key as received, before the channel key shift.
    pub midi_note: u8,
    /// Key after the key shift.
    pub real_key: u8,
    pub velocity: u8,
    pub channel: usize,
    pub current_time: f64,
    /// Output sample rate.
    pub sample_rate: f32,
}

/// One playing (or releasing) sample layer.
#[derive(Debug, Clone)]
pub struct Voice {
    pub sample: Arc<Sample>,
    pub cursor: SampleCursor,
    /// Static parameters of the zone, attenuation already corrected.
    pub generators: [i16; GENERATOR_COUNT],
    /// `generators` plus every modulator contribution.
    pub modulated_generators: [i16; GENERATOR_COUNT],
    pub modulators: Vec<Modulator>,

    pub midi_note: u8,
    pub real_key: u8,
    /// Key the pitch is computed for (the `keyNum` generator, if set).
    pub target_key: u8,
    pub velocity: u8,
    pub pressure: u8,
    pub channel: usize,
    pub exclusive_class: i32,
    /// Linear gain from the key modifiers.
    pub gain: f32,

    /// Key the glide starts from.
    pub portamento_from_key: Option<u8>,
    /// Seconds.
    pub portamento_duration: f64,

    pub start_time: f64,
    pub is_in_release: bool,
    pub release_start_time: f64,
    /// Held by the hold pedal after its note-off.
    pub sustained: bool,
    /// Set by the renderer once the release has faded out.
    pub finished: bool,
}

impl Voice {
    /// Build a voice for one matched zone.
    pub fn new(zone: &ZoneMatch, params: VoiceParams) -> Self {
        let mut generators = zone.voice_generators();
        let att = GeneratorType::InitialAttenuation.index();
        // EMU hardware applies 40% of the declared attenuation
        generators[att] = (generators[att] as f32 * 0.4).floor() as i16;

        let sample = Arc::clone(&zone.sample);
        let root_key = match generators[GeneratorType::OverridingRootKey.index()] {
            key @ 0..=127 => key as u8,
            _ => sample.original_pitch,
        };
        let target_key = match generators[GeneratorType::KeyNum.index()] {
            key @ 0..=127 => key as u8,
            _ => params.real_key,
        };
        let velocity = match generators[GeneratorType::Velocity.index()] {
            vel @ 0..=127 => vel as u8,
            _ => params.velocity,
        };

        let playback_step = sample.sample_rate as f64 / params.sample_rate as f64
            * 2f64.powf(sample.pitch_correction as f64 / 1200.0);
        let looping_mode = generators[GeneratorType::SampleModes.index()];

        Self {
            cursor: SampleCursor::new(&sample, root_key, playback_step, looping_mode),
            sample,
            modulated_generators: generators,
            generators,
            modulators: zone.modulators.clone(),
            midi_note: params.midi_note,
            real_key: params.real_key,
            target_key,
            velocity,
            pressure: 0,
            channel: params.channel,
            exclusive_class: generators[GeneratorType::ExclusiveClass.index()] as i32,
            gain: 1.0,
            portamento_from_key: None,
            portamento_duration: 0.0,
            start_time: params.current_time,
            is_in_release: false,
            release_start_time: f64::INFINITY,
            sustained: false,
            finished: false,
        }
    }

    #[inline]
    pub fn note_sources(&self) -> NoteSources {
        NoteSources {
            note: self.real_key,
            velocity: self.velocity,
            pressure: self.pressure,
        }
    }

    #[inline]
    pub fn modulated(&self, kind: GeneratorType) -> i16 {
        self.modulated_generators[kind.index()]
    }

    /// Enter the release phase, no earlier than `min_length` after the start.
    pub fn release(&mut self, current_time: f64, min_length: f64) {
        self.is_in_release = true;
        self.sustained = false;
        self.release_start_time = current_time.max(self.start_time + min_length);
    }

    /// Fast release for a voice cut by a new note of its exclusive class.
    pub fn exclusive_release(&mut self, current_time: f64) {
        self.release(current_time, MIN_EXCLUSIVE_LENGTH);
        self.modulated_generators[GeneratorType::ReleaseVolEnv.index()] = EXCLUSIVE_CUTOFF_TIME;
        self.modulated_generators[GeneratorType::ReleaseModEnv.index()] = EXCLUSIVE_MOD_CUTOFF_TIME;
    }

    /// Near-instant release.
    pub fn kill(&mut self, current_time: f64) {
        self.modulated_generators[GeneratorType::ReleaseVolEnv.index()] = KILL_RELEASE_TIME;
        self.release(current_time, MIN_NOTE_LENGTH);
    }

    /// Apply the address offset generators to the cursor.
    ///
    /// Offsets are clamped into the sample, inverted loops are swapped and
    /// a loop shorter than one frame disables looping.
    pub fn apply_sample_offsets(&mut self) {
        use GeneratorType as G;
        let m = &self.modulated_generators;
        let offset = |fine: G, coarse: G| m[fine.index()] as i32 + m[coarse.index()] as i32 * COARSE_OFFSET_FRAMES;
        let start = offset(G::StartAddrsOffset, G::StartAddrsCoarseOffset);
        let end = offset(G::EndAddrOffset, G::EndAddrsCoarseOffset);
        let loop_start = offset(G::StartLoopAddrsOffset, G::StartLoopAddrsCoarseOffset);
        let loop_end = offset(G::EndLoopAddrsOffset, G::EndLoopAddrsCoarseOffset);

        let last = self.sample.len().saturating_sub(1) as i64;
        let clamp = |base: i64, delta: i32| (base + delta as i64).clamp(0, last) as usize;

        let cursor = &mut self.cursor;
        cursor.position = clamp(cursor.position as i64, start) as f64;
        cursor.end = clamp(cursor.end as i64, end);
        cursor.loop_start = clamp(cursor.loop_start as i64, loop_start);
        cursor.loop_end = clamp(cursor.loop_end as i64, loop_end);
        if cursor.loop_end < cursor.loop_start {
            std::mem::swap(&mut cursor.loop_start, &mut cursor.loop_end);
        }
        if cursor.loop_end - cursor.loop_start < 1 {
            cursor.looping_mode = 0;
            cursor.is_looping = false;
        }
    }
}

/// Renderer-side reactions to voice changes.
///
/// The channel calls these synchronously; every method defaults to doing
/// nothing.
pub trait VoiceHooks {
    /// Modulated generators changed; the named envelopes need a refresh.
    fn envelopes_changed(&mut self, _voice: &Voice, _refresh: EnvelopeRefresh) {}

    /// The voice was fully computed and is about to join its channel.
    fn voice_started(&mut self, _voice: &Voice) {}

    /// The voice entered its release phase.
    fn voice_released(&mut self, _voice: &Voice) {}
}

impl VoiceHooks for () {}
