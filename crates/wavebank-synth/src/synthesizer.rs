//! The patch engine: channels, bank stack and synth-wide state.
//!
//! [`Synthesizer`] dispatches raw MIDI to its [`MidiChannel`]s and lends
//! each call a [`ChannelContext`] built from its own fields. It renders no
//! audio; a renderer reads the channels' voices between calls and reports
//! back through [`Synthesizer::remove_finished_voices`].
//!
//! # Example
//!
//! ```ignore
//! use wavebank_synth::{SynthConfig, Synthesizer};
//! use wavebank_soundbank::{SoundBank, SoundBankManager};
//!
//! let bank = SoundBank::load("font.sf2")?;
//! let mut synth = Synthesizer::new(SynthConfig::default(), SoundBankManager::with_bank(bank))?;
//! synth.process_midi(&[0x90, 60, 100])?;
//! ```

use crate::channel::{ChannelContext, ChannelVibrato, MidiChannel, OverrideBank};
use crate::error::{Error, Result};
use crate::events::{EventSink, SynthEvent};
use crate::eviction::{LowestPriorityEviction, VoiceEviction};
use crate::key_modifier::KeyModifierManager;
use crate::snapshot::{ChannelSnapshot, SynthesizerSnapshot};
use crate::voice::VoiceHooks;
use std::sync::Arc;
use wavebank_core::{SynthConfig, SynthSystem, DRUM_BANK};
use wavebank_midi::{ChannelMessage, MidiInput};
use wavebank_soundbank::{SoundBank, SoundBankManager};

pub struct Synthesizer {
    config: SynthConfig,
    pub(crate) channels: Vec<MidiChannel>,
    manager: SoundBankManager,
    override_bank: Option<OverrideBank>,
    key_modifiers: KeyModifierManager,
    system: SynthSystem,
    /// Semitones added to every melodic channel.
    transposition: f64,
    /// Cents.
    master_tuning: f32,
    /// Seconds.
    current_time: f64,
    events: Box<dyn EventSink + Send>,
    hooks: Box<dyn VoiceHooks + Send>,
    eviction: Box<dyn VoiceEviction>,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("config", &self.config)
            .field("system", &self.system)
            .field("channels", &self.channels.len())
            .field("voices", &self.voice_count())
            .finish()
    }
}

impl Synthesizer {
    /// Create the synthesizer with every channel on its default preset.
    pub fn new(config: SynthConfig, manager: SoundBankManager) -> Result<Self> {
        config.validate()?;
        let channels = (0..config.channel_count)
            .map(|n| MidiChannel::new(n, n % 16 == config.percussion_channel))
            .collect();
        let mut synth = Self {
            system: config.system,
            config,
            channels,
            manager,
            override_bank: None,
            key_modifiers: KeyModifierManager::new(),
            transposition: 0.0,
            master_tuning: 0.0,
            current_time: 0.0,
            events: Box::new(()),
            hooks: Box::new(()),
            eviction: Box::new(LowestPriorityEviction),
        };
        synth.reset_all_controllers()?;
        Ok(synth)
    }

    pub fn with_events(mut self, sink: impl EventSink + Send + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    pub fn with_hooks(mut self, hooks: impl VoiceHooks + Send + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_eviction(mut self, eviction: impl VoiceEviction + 'static) -> Self {
        self.eviction = Box::new(eviction);
        self
    }

    /// Run `f` on one channel with a context borrowed from `self`.
    pub fn with_channel<R>(
        &mut self,
        channel: usize,
        f: impl FnOnce(&mut MidiChannel, &mut ChannelContext<'_>) -> R,
    ) -> Result<R> {
        let total_voices = self.voice_count();
        let Self {
            config,
            channels,
            manager,
            override_bank,
            key_modifiers,
            system,
            transposition,
            current_time,
            events,
            hooks,
            ..
        } = self;
        let target = channels.get_mut(channel).ok_or(Error::InvalidChannel(channel))?;
        let mut ctx = ChannelContext {
            presets: &*manager,
            override_bank: override_bank.as_ref(),
            key_modifiers: &*key_modifiers,
            system: *system,
            transposition: *transposition,
            current_time: *current_time,
            sample_rate: config.sample_rate,
            high_performance: config.high_performance,
            total_voices,
            events: events.as_mut(),
            hooks: hooks.as_mut(),
        };
        Ok(f(target, &mut ctx))
    }

    // ---- accessors ----

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn system(&self) -> SynthSystem {
        self.system
    }

    pub fn channel(&self, channel: usize) -> Option<&MidiChannel> {
        self.channels.get(channel)
    }

    pub fn channels(&self) -> &[MidiChannel] {
        &self.channels
    }

    /// Mutable channel access for the renderer.
    pub fn channels_mut(&mut self) -> &mut [MidiChannel] {
        &mut self.channels
    }

    pub fn manager(&self) -> &SoundBankManager {
        &self.manager
    }

    pub fn key_modifiers(&self) -> &KeyModifierManager {
        &self.key_modifiers
    }

    pub fn transposition(&self) -> f64 {
        self.transposition
    }

    pub fn master_tuning(&self) -> f32 {
        self.master_tuning
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn set_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    pub fn advance(&mut self, seconds: f64) {
        self.current_time += seconds;
    }

    /// Voices across every channel.
    pub fn voice_count(&self) -> usize {
        self.channels.iter().map(MidiChannel::voice_count).sum()
    }

    /// Drop the voices the renderer marked finished.
    pub fn remove_finished_voices(&mut self) -> usize {
        self.channels.iter_mut().map(MidiChannel::remove_finished_voices).sum()
    }

    // ---- MIDI input ----

    /// Decode and execute one complete MIDI message.
    pub fn process_midi(&mut self, bytes: &[u8]) -> Result<()> {
        self.process_midi_with_offset(bytes, 0)
    }

    /// As [`Self::process_midi`], with the channel offset of a multi-port
    /// setup (port `n` usually maps to offset `16 * n`).
    pub fn process_midi_with_offset(&mut self, bytes: &[u8], channel_offset: usize) -> Result<()> {
        match MidiInput::parse(bytes, channel_offset)? {
            MidiInput::SysEx(payload) => self.system_exclusive(payload, channel_offset),
            MidiInput::Channel { channel, message } => match message {
                ChannelMessage::NoteOn { note, velocity } => self.note_on(channel, note, velocity),
                ChannelMessage::NoteOff { note, .. } => self.note_off(channel, note),
                ChannelMessage::PolyPressure { note, pressure } => {
                    self.with_channel(channel, |ch, ctx| ch.poly_pressure(ctx, note, pressure))
                }
                ChannelMessage::ControlChange { controller, value } => {
                    self.controller_change(channel, controller, value, false)
                }
                ChannelMessage::ProgramChange { program } => self.program_change(channel, program),
                ChannelMessage::ChannelPressure { pressure } => {
                    self.with_channel(channel, |ch, ctx| ch.channel_pressure(ctx, pressure))
                }
                ChannelMessage::PitchBend { lsb, msb } => {
                    self.with_channel(channel, |ch, ctx| ch.pitch_wheel(ctx, msb, lsb))
                }
            },
        }
    }

    pub fn note_on(&mut self, channel: usize, note: u8, velocity: u8) -> Result<()> {
        let added = self.with_channel(channel, |ch, ctx| ch.note_on(ctx, note, velocity))??;
        if added > 0 {
            self.enforce_voice_cap();
        }
        Ok(())
    }

    pub fn note_off(&mut self, channel: usize, note: u8) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.note_off(ctx, note))
    }

    pub fn kill_note(&mut self, channel: usize, note: u8) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.kill_note(ctx, note))
    }

    pub fn controller_change(&mut self, channel: usize, controller: u8, value: u8, force: bool) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.controller_change(ctx, controller, value, force))?
    }

    pub fn program_change(&mut self, channel: usize, program: u8) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.program_change(ctx, program))?
    }

    fn enforce_voice_cap(&mut self) {
        let total = self.voice_count();
        if total > self.config.voice_cap {
            let overflow = total - self.config.voice_cap;
            let removed = self.eviction.evict(&mut self.channels, overflow);
            if removed < overflow {
                tracing::warn!(
                    "Voice eviction removed {} of {} voices, {} over the cap",
                    removed,
                    overflow,
                    overflow - removed
                );
            }
        }
    }

    // ---- channel settings ----

    pub fn mute_channel(&mut self, channel: usize, muted: bool) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.mute(ctx, muted))
    }

    pub fn set_drums(&mut self, channel: usize, is_drum: bool) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.set_drums(ctx, is_drum))?
    }

    /// Lock or unlock the preset. Locking records the current system.
    pub fn set_preset_lock(&mut self, channel: usize, locked: bool) -> Result<()> {
        let system = self.system;
        self.with_channel(channel, |ch, _| ch.set_preset_lock(locked, system))
    }

    pub fn lock_controller(&mut self, channel: usize, slot: usize, locked: bool) -> Result<()> {
        self.with_channel(channel, |ch, _| ch.lock_controller(slot, locked))
    }

    pub fn set_vibrato(&mut self, channel: usize, vibrato: ChannelVibrato) -> Result<()> {
        self.with_channel(channel, |ch, _| ch.set_vibrato(vibrato))
    }

    pub fn disable_and_lock_gs_nrpn(&mut self, channel: usize) -> Result<()> {
        self.with_channel(channel, |ch, _| ch.disable_and_lock_gs_nrpn())
    }

    pub fn set_octave_tuning(&mut self, channel: usize, tuning: &[i8; 12]) -> Result<()> {
        self.with_channel(channel, |ch, _| ch.set_octave_tuning(tuning))
    }

    // ---- synth-wide state ----

    pub fn set_system(&mut self, system: SynthSystem) {
        if self.system != system {
            tracing::info!("System changed to {}", system);
        }
        self.system = system;
    }

    /// Back to power-on state: configured system, every controller reset,
    /// default presets reloaded (drums on the percussion channels).
    pub fn reset_all_controllers(&mut self) -> Result<()> {
        self.set_system(self.config.system);
        let load_presets = !self.manager.is_empty();
        if !load_presets {
            tracing::warn!("No sound banks loaded, channels keep no preset");
        }
        for channel in 0..self.channels.len() {
            self.with_channel(channel, |ch, ctx| ch.reset_to_defaults(ctx, load_presets))??;
        }
        Ok(())
    }

    /// Master tuning in cents, applied to every channel.
    pub fn set_master_tuning(&mut self, cents: f32) {
        let cents = cents.round();
        self.master_tuning = cents;
        for channel in &mut self.channels {
            channel.set_master_tuning(cents);
        }
        tracing::info!("Master tuning: {} cents", cents);
    }

    /// Transpose every channel; drum channels are left alone.
    pub fn transpose_all(&mut self, semitones: f64) -> Result<()> {
        self.transposition = 0.0;
        for channel in 0..self.channels.len() {
            self.with_channel(channel, |ch, ctx| ch.transpose(ctx, semitones, false))?;
        }
        self.transposition = semitones;
        Ok(())
    }

    pub fn transpose_channel(&mut self, channel: usize, semitones: f64, force: bool) -> Result<()> {
        self.with_channel(channel, |ch, ctx| ch.transpose(ctx, semitones, force))
    }

    /// Release (or with `force`, drop) the voices of every channel.
    pub fn stop_all_channels(&mut self, force: bool) -> Result<()> {
        for channel in 0..self.channels.len() {
            self.with_channel(channel, |ch, ctx| ch.stop_all(ctx, force))?;
        }
        self.events.emit(SynthEvent::StopAll);
        Ok(())
    }

    // ---- bank stack ----

    pub fn add_bank(&mut self, id: impl Into<String>, bank: SoundBank, bank_offset: u16) -> Result<()> {
        self.manager.add(id, bank, bank_offset);
        self.update_banks()
    }

    pub fn delete_bank(&mut self, id: &str) -> Result<()> {
        if self.manager.delete(id) {
            self.update_banks()?;
        }
        Ok(())
    }

    pub fn rearrange_banks(&mut self, order: &[&str]) -> Result<()> {
        self.manager.rearrange(order);
        self.update_banks()
    }

    /// Bank consulted before the stack (an embedded MIDI bank).
    pub fn set_override_bank(&mut self, bank: SoundBank, offset: u16) -> Result<()> {
        self.override_bank = Some(OverrideBank {
            bank: Arc::new(bank),
            offset,
        });
        self.update_banks()
    }

    pub fn clear_override_bank(&mut self) -> Result<()> {
        if self.override_bank.take().is_some() {
            self.update_banks()?;
        }
        Ok(())
    }

    /// Announce the new preset list and re-resolve every channel's preset.
    fn update_banks(&mut self) -> Result<()> {
        self.events
            .emit(SynthEvent::PresetListChange(self.manager.preset_list().to_vec()));
        if self.manager.is_empty() && self.override_bank.is_none() {
            return Ok(());
        }
        for channel in 0..self.channels.len() {
            self.with_channel(channel, |ch, ctx| {
                let program = ch.program();
                ch.program_change(ctx, program)
            })??;
        }
        Ok(())
    }

    // ---- snapshots ----

    pub fn snapshot(&self) -> SynthesizerSnapshot {
        SynthesizerSnapshot {
            system: self.system,
            transposition: self.transposition,
            master_tuning: self.master_tuning,
            channels: self.channels.iter().map(ChannelSnapshot::capture).collect(),
            key_modifiers: self.key_modifiers.mappings(),
        }
    }

    /// Restore a snapshot. Channels past the snapshot keep their state.
    pub fn apply_snapshot(&mut self, snapshot: &SynthesizerSnapshot) -> Result<()> {
        self.set_system(snapshot.system);
        self.transposition = snapshot.transposition;
        self.master_tuning = snapshot.master_tuning;
        self.key_modifiers.set_mappings(&snapshot.key_modifiers);
        for (channel, state) in snapshot.channels.iter().enumerate().take(self.channels.len()) {
            self.with_channel(channel, |ch, ctx| state.apply(ch, ctx))??;
        }
        Ok(())
    }
}

impl MidiChannel {
    /// Channel part of [`Synthesizer::reset_all_controllers`].
    pub(crate) fn reset_to_defaults(&mut self, ctx: &mut ChannelContext<'_>, load_preset: bool) -> Result<()> {
        self.reset_controllers(ctx)?;

        if !self.lock_preset {
            self.bank = if self.is_percussion_channel() { DRUM_BANK } else { 0 };
            self.bank_lsb = 0;
            self.drum = self.is_percussion_channel();
            if load_preset {
                self.program_change(ctx, 0)?;
            }
        } else {
            ctx.events.emit(SynthEvent::ProgramChange {
                channel: self.number(),
                program: self.program(),
                bank: self.sent_bank,
            });
        }
        ctx.events.emit(SynthEvent::DrumChange {
            channel: self.number(),
            is_drum: self.drum,
        });

        for controller in 0..128u8 {
            if self.locked[controller as usize] {
                ctx.events.emit(SynthEvent::ControllerChange {
                    channel: self.number(),
                    controller,
                    value: self.controllers.cc(controller),
                });
            }
        }
        if !self.locked[Self::pitch_wheel_slot()] {
            let bend = self.controllers.pitch_wheel();
            ctx.events.emit(SynthEvent::PitchWheel {
                channel: self.number(),
                msb: (bend >> 7) as u8,
                lsb: (bend & 0x7F) as u8,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::test_manager;
    use crossbeam_channel::unbounded;
    use wavebank_midi::controllers as cc;

    fn synth() -> Synthesizer {
        Synthesizer::new(SynthConfig::default(), test_manager()).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn test_default_presets() {
        let synth = synth();
        assert_eq!(synth.channels().len(), 16);
        assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Piano");
        let drums = synth.channel(9).unwrap();
        assert!(drums.is_drum());
        assert_eq!(drums.preset().unwrap().name, "Standard");
        assert_eq!(drums.sent_bank(), 128);
    }

    #[test]
    fn test_empty_stack_allowed() {
        let synth = Synthesizer::new(SynthConfig::default(), SoundBankManager::new()).unwrap();
        assert!(synth.channel(0).unwrap().preset().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SynthConfig::default().channels(0);
        assert!(matches!(
            Synthesizer::new(config, test_manager()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_process_midi_dispatch() {
        let mut synth = synth();
        synth.process_midi(&[0xC0, 16]).unwrap();
        synth.process_midi(&[0x90, 60, 100]).unwrap();
        synth.process_midi(&[0xB0, 7, 50]).unwrap();
        synth.process_midi(&[0xE0, 0, 0]).unwrap();
        let channel = synth.channel(0).unwrap();
        assert_eq!(channel.preset().unwrap().name, "Organ");
        assert_eq!(channel.voice_count(), 1);
        assert_eq!(channel.controllers().cc(7), 50);
        assert_eq!(channel.controllers().pitch_wheel(), 0);

        synth.process_midi(&[0x80, 60, 0]).unwrap();
        assert!(synth.channel(0).unwrap().voices()[0].is_in_release);
    }

    #[test]
    fn test_invalid_channel() {
        let config = SynthConfig::default().channels(4);
        let mut synth = Synthesizer::new(config, test_manager()).unwrap();
        assert!(matches!(
            synth.process_midi(&[0x95, 60, 100]),
            Err(Error::InvalidChannel(5))
        ));
        assert!(matches!(synth.process_midi(&[]), Err(Error::Midi(_))));
    }

    #[test]
    fn test_voice_cap_evicts_overflow() {
        let config = SynthConfig::default().voice_cap(2);
        let mut synth = Synthesizer::new(config, test_manager()).unwrap();
        synth.note_on(0, 60, 100).unwrap();
        synth.advance(0.1);
        synth.note_on(0, 62, 100).unwrap();
        synth.advance(0.1);
        synth.note_on(0, 64, 100).unwrap();
        assert_eq!(synth.voice_count(), 2);
        let keys: Vec<u8> = synth.channel(0).unwrap().voices().iter().map(|v| v.real_key).collect();
        assert_eq!(keys, vec![62, 64]);
    }

    /// Default policy that reports every overflow it is asked to remove.
    struct ReportingEviction(crossbeam_channel::Sender<usize>);

    impl VoiceEviction for ReportingEviction {
        fn evict(&mut self, channels: &mut [MidiChannel], overflow: usize) -> usize {
            let _ = self.0.send(overflow);
            LowestPriorityEviction.evict(channels, overflow)
        }
    }

    /// Never removes anything.
    struct KeepEverything;

    impl VoiceEviction for KeepEverything {
        fn evict(&mut self, _: &mut [MidiChannel], _: usize) -> usize {
            0
        }
    }

    #[test]
    fn test_voice_cap_holds_at_exactly_the_cap() {
        init_tracing();
        let (tx, rx) = unbounded();
        let config = SynthConfig::default().voice_cap(3);
        let mut synth = Synthesizer::new(config, test_manager())
            .unwrap()
            .with_eviction(ReportingEviction(tx));

        for (i, note) in [60u8, 62, 64].into_iter().enumerate() {
            synth.note_on(i, note, 100).unwrap();
        }
        assert_eq!(synth.voice_count(), 3);
        assert!(rx.try_recv().is_err());

        for (i, note) in [65u8, 67, 69, 71].into_iter().enumerate() {
            synth.note_on(i, note, 100).unwrap();
            assert_eq!(synth.voice_count(), 3);
        }
        let overflows: Vec<usize> = rx.try_iter().collect();
        assert_eq!(overflows, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_short_eviction_leaves_voices_over_the_cap() {
        init_tracing();
        let config = SynthConfig::default().voice_cap(1);
        let mut synth = Synthesizer::new(config, test_manager())
            .unwrap()
            .with_eviction(KeepEverything);
        synth.note_on(0, 60, 100).unwrap();
        synth.note_on(1, 62, 100).unwrap();
        assert_eq!(synth.voice_count(), 2);
    }

    #[test]
    fn test_stop_all_channels_releases_without_force() {
        let (tx, rx) = unbounded();
        let mut synth = synth().with_events(tx);
        synth.note_on(0, 60, 100).unwrap();
        synth.stop_all_channels(false).unwrap();
        assert!(synth.channel(0).unwrap().voices()[0].is_in_release);
        assert!(rx.try_iter().any(|e| e == SynthEvent::StopAll));
    }

    #[test]
    fn test_events_through_crossbeam() {
        let (tx, rx) = unbounded();
        let mut synth = synth().with_events(tx);
        synth.note_on(3, 60, 90).unwrap();
        let events: Vec<SynthEvent> = rx.try_iter().collect();
        assert!(events.contains(&SynthEvent::NoteOn {
            channel: 3,
            note: 60,
            velocity: 90
        }));
    }

    #[test]
    fn test_reset_all_controllers() {
        let (tx, rx) = unbounded();
        let mut synth = synth().with_events(tx);
        synth.set_drums(9, false).unwrap();
        synth.controller_change(0, cc::MAIN_VOLUME, 20, false).unwrap();
        synth.lock_controller(1, cc::PAN as usize, true).unwrap();
        synth.set_system(SynthSystem::Xg);
        rx.try_iter().for_each(drop);

        synth.reset_all_controllers().unwrap();
        assert_eq!(synth.system(), SynthSystem::Gs);
        assert!(synth.channel(9).unwrap().is_drum());
        assert_eq!(synth.channel(0).unwrap().controllers().cc(cc::MAIN_VOLUME), 100);
        let events: Vec<SynthEvent> = rx.try_iter().collect();
        assert!(events.contains(&SynthEvent::DrumChange { channel: 9, is_drum: true }));
        assert!(events.contains(&SynthEvent::ControllerChange {
            channel: 1,
            controller: cc::PAN,
            value: 64
        }));
        assert!(events.contains(&SynthEvent::PitchWheel { channel: 0, msb: 64, lsb: 0 }));
    }

    #[test]
    fn test_master_tuning_and_transpose_all() {
        let mut synth = synth();
        synth.set_master_tuning(-20.4);
        assert_eq!(synth.channel(3).unwrap().tuning_cents(), -20.0);

        synth.transpose_all(2.0).unwrap();
        assert_eq!(synth.transposition(), 2.0);
        assert_eq!(synth.channel(0).unwrap().key_shift(), 2);
        assert_eq!(synth.channel(9).unwrap().key_shift(), 0);

        // channel transposition is relative to the synth transposition
        synth.transpose_channel(1, 1.0, false).unwrap();
        assert_eq!(synth.channel(1).unwrap().key_shift(), 3);
    }

    #[test]
    fn test_stop_all_channels() {
        let mut synth = synth();
        synth.note_on(0, 60, 100).unwrap();
        synth.note_on(9, 36, 100).unwrap();
        synth.stop_all_channels(true).unwrap();
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn test_remove_finished() {
        let mut synth = synth();
        synth.note_on(0, 60, 100).unwrap();
        synth.channels_mut()[0].voices_mut()[0].finished = true;
        assert_eq!(synth.remove_finished_voices(), 1);
    }

    #[test]
    fn test_override_bank_and_clear() {
        let mut synth = synth();
        let embedded = SoundBank::from_presets(vec![crate::channel::tests::test_preset(
            "Embedded", 0, 0, Vec::new(),
        )]);
        synth.set_override_bank(embedded, 0).unwrap();
        assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Embedded");
        assert!(synth.channel(0).unwrap().preset_uses_override());
        synth.clear_override_bank().unwrap();
        assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Piano");
    }

    #[test]
    fn test_snapshot_round_trip_onto_fresh_synth() {
        let mut synth = synth();
        synth.program_change(2, 16).unwrap();
        synth.controller_change(2, cc::EXPRESSION, 80, false).unwrap();
        synth.set_master_tuning(15.0);
        let snapshot = synth.snapshot();

        let mut fresh = self::synth();
        fresh.apply_snapshot(&snapshot).unwrap();
        assert_eq!(fresh.channel(2).unwrap().preset().unwrap().name, "Organ");
        assert_eq!(fresh.channel(2).unwrap().controllers().cc(cc::EXPRESSION), 80);
        assert_eq!(fresh.master_tuning(), 15.0);
        assert_eq!(fresh.channel(2).unwrap().tuning_cents(), 15.0);
    }
}
