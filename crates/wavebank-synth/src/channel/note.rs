//! Note on / note off and voice release.

use super::{ChannelContext, MidiChannel};
use crate::compute::compute_all;
use crate::controllers::PORTAMENTO_CONTROL_UNSET;
use crate::error::Result;
use crate::events::SynthEvent;
use crate::portamento::portamento_time_to_seconds;
use crate::voice::{Voice, VoiceParams, MIN_NOTE_LENGTH};
use std::sync::Arc;
use wavebank_midi::controllers as cc;
use wavebank_soundbank::Preset;

/// High performance mode drops notes softer than this...
const HIGH_PERFORMANCE_MIN_VELOCITY: u8 = 10;
/// ...and, past [`HIGH_PERFORMANCE_BUSY_VOICES`], softer than this.
const HIGH_PERFORMANCE_BUSY_VELOCITY: u8 = 40;
const HIGH_PERFORMANCE_BUSY_VOICES: usize = 200;

/// CC65 threshold (14-bit) for portamento on.
const PORTAMENTO_ON: i16 = 64 << 7;

impl MidiChannel {
    /// Key after the channel key shift, if it is still a MIDI key.
    fn shifted_key(&self, note: u8) -> Option<u8> {
        u8::try_from(note as i32 + self.key_shift)
            .ok()
            .filter(|k| *k <= 127)
    }

    /// Start a note. Returns the number of voices added.
    ///
    /// The caller owns the voice cap: when the returned count pushes the
    /// total over it, the overflow goes to the eviction policy.
    pub fn note_on(&mut self, ctx: &mut ChannelContext<'_>, note: u8, velocity: u8) -> Result<usize> {
        if velocity < 1 {
            self.note_off(ctx, note);
            return Ok(0);
        }
        let mut velocity = velocity.min(127);

        let dropped = ctx.high_performance
            && (velocity < HIGH_PERFORMANCE_MIN_VELOCITY
                || (ctx.total_voices > HIGH_PERFORMANCE_BUSY_VOICES && velocity < HIGH_PERFORMANCE_BUSY_VELOCITY));
        if dropped || self.muted {
            return Ok(0);
        }

        let Some(real_key) = self.shifted_key(note) else {
            return Ok(0);
        };

        if self.velocity_override > 0 {
            velocity = self.velocity_override;
        }
        if let Some(key_velocity) = ctx.key_modifiers.velocity(self.number, real_key) {
            velocity = key_velocity;
        }
        let gain = ctx.key_modifiers.gain(self.number, real_key);

        let (portamento_from_key, portamento_duration) = self.portamento(ctx, real_key)?;

        let Some(preset) = self.preset_for_key(ctx, real_key) else {
            tracing::warn!("Channel {} has no preset, note {} dropped", self.number, note);
            return Ok(0);
        };

        let params = VoiceParams {
            midi_note: note,
            real_key,
            velocity,
            channel: self.number,
            current_time: ctx.current_time,
            sample_rate: ctx.sample_rate,
        };
        let zones = preset.zones_for_note(real_key, velocity);
        let mut added = Vec::with_capacity(zones.len());
        for zone in zones.iter() {
            let mut voice = Voice::new(zone, params);
            voice.portamento_from_key = portamento_from_key;
            voice.portamento_duration = portamento_duration;
            voice.gain = gain;

            if voice.exclusive_class != 0 {
                for other in self
                    .voices
                    .iter_mut()
                    .filter(|v| v.exclusive_class == voice.exclusive_class && !v.is_in_release)
                {
                    other.exclusive_release(ctx.current_time);
                    ctx.hooks.voice_released(other);
                }
            }

            compute_all(&mut voice, &self.controllers);
            voice.apply_sample_offsets();
            ctx.hooks.voice_started(&voice);
            added.push(voice);
        }

        let count = added.len();
        self.voices.extend(added);
        self.send_property(ctx);
        ctx.events.emit(SynthEvent::NoteOn {
            channel: self.number,
            note,
            velocity,
        });
        Ok(count)
    }

    /// Glide start and duration for a new key, updating CC84.
    fn portamento(&mut self, ctx: &mut ChannelContext<'_>, real_key: u8) -> Result<(Option<u8>, f64)> {
        let time = self.controllers.cc(cc::PORTAMENTO_TIME);
        let control = self.controllers[cc::PORTAMENTO_CONTROL as usize];
        let from = (control >> 7) as u8;

        if self.drum
            || from == real_key
            || self.controllers[cc::PORTAMENTO_ON_OFF as usize] < PORTAMENTO_ON
            || time == 0
        {
            return Ok((None, 0.0));
        }

        let glide = if control != PORTAMENTO_CONTROL_UNSET {
            (Some(from), portamento_time_to_seconds(time, from.abs_diff(real_key)))
        } else {
            (None, 0.0)
        };
        // the next glide starts from this key
        self.controller_change(ctx, cc::PORTAMENTO_CONTROL, real_key, false)?;
        Ok(glide)
    }

    /// Preset for a key: its key modifier patch, else the channel preset.
    fn preset_for_key(&self, ctx: &ChannelContext<'_>, real_key: u8) -> Option<Arc<Preset>> {
        match ctx.key_modifiers.patch(self.number, real_key) {
            Some(patch) => ctx
                .presets
                .preset(patch.bank, patch.program, self.is_xg_channel(ctx.system)),
            None => self.preset.clone(),
        }
    }

    /// Release a note. With the hold pedal down its voices are marked
    /// sustained instead.
    pub fn note_off(&mut self, ctx: &mut ChannelContext<'_>, note: u8) {
        let Some(real_key) = self.shifted_key(note) else {
            tracing::warn!(
                "Note off for key {} out of range on channel {} (shift {})",
                note,
                self.number,
                self.key_shift
            );
            return;
        };

        if ctx.high_performance && !self.drum {
            self.kill_note(ctx, note);
        } else {
            let hold = self.hold_pedal;
            for voice in self
                .voices
                .iter_mut()
                .filter(|v| v.real_key == real_key && !v.is_in_release)
            {
                if hold {
                    voice.sustained = true;
                } else {
                    voice.release(ctx.current_time, MIN_NOTE_LENGTH);
                    ctx.hooks.voice_released(voice);
                }
            }
        }
        ctx.events.emit(SynthEvent::NoteOff {
            channel: self.number,
            note,
        });
    }

    /// Cut the voices of a note with a near-instant release.
    pub fn kill_note(&mut self, ctx: &mut ChannelContext<'_>, note: u8) {
        let Some(real_key) = self.shifted_key(note) else {
            return;
        };
        for voice in self.voices.iter_mut().filter(|v| v.real_key == real_key) {
            voice.kill(ctx.current_time);
            ctx.hooks.voice_released(voice);
        }
    }

    /// Release one voice by its index in [`Self::voices`].
    pub fn release_voice(&mut self, ctx: &mut ChannelContext<'_>, index: usize) {
        if let Some(voice) = self.voices.get_mut(index) {
            if !voice.is_in_release {
                voice.release(ctx.current_time, MIN_NOTE_LENGTH);
                ctx.hooks.voice_released(voice);
            }
        }
    }

    /// Release every voice, or with `force` drop them immediately.
    pub fn stop_all(&mut self, ctx: &mut ChannelContext<'_>, force: bool) {
        if force {
            self.voices.clear();
        } else {
            for voice in self.voices.iter_mut().filter(|v| !v.is_in_release) {
                voice.release(ctx.current_time, MIN_NOTE_LENGTH);
                ctx.hooks.voice_released(voice);
            }
        }
        self.send_property(ctx);
    }

    /// Release the voices the hold pedal kept alive.
    pub(crate) fn release_sustained(&mut self, ctx: &mut ChannelContext<'_>) {
        for voice in self.voices.iter_mut().filter(|v| v.sustained) {
            voice.release(ctx.current_time, MIN_NOTE_LENGTH);
            ctx.hooks.voice_released(voice);
        }
    }
}
