//! Synthesizer session tests
//!
//! Whole MIDI streams (system messages, bank and program changes, notes)
//! are fed to a `Synthesizer`, with events collected over a crossbeam
//! channel. Also covers the voice cap, bank stack updates and snapshots.
//!
//! Run with:
//! ```bash
//! cargo test -p wavebank --test synthesizer_tests
//! ```

mod helpers;

use crossbeam_channel::{unbounded, Receiver};
use helpers::{general_bank, general_manager, init_tracing, ramp, Sf2Builder, ZoneSpec};
use wavebank::prelude::*;
use wavebank::synth::{KeyModifier, SynthesizerSnapshot, VoiceEviction};

fn synth_with_events() -> (Synthesizer, Receiver<SynthEvent>) {
    init_tracing();
    let (tx, rx) = unbounded();
    let synth = Synthesizer::new(SynthConfig::default(), general_manager())
        .unwrap()
        .with_events(tx);
    (synth, rx)
}

fn drain(rx: &Receiver<SynthEvent>) -> Vec<SynthEvent> {
    rx.try_iter().collect()
}

/// A bank with a single preset named `name` at 0:0.
fn single_preset_bank(name: &str) -> SoundBank {
    let mut sf = Sf2Builder::new(name);
    let s = sf.sample(name, &ramp(), 60);
    let inst = sf.instrument(name, vec![ZoneSpec::new().sample(s)]);
    sf.preset(name, 0, 0, vec![ZoneSpec::new().instrument(inst)]);
    sf.bank()
}

// =============================================================================
// MIDI streams
// =============================================================================

#[test]
fn test_gs_session() {
    let (mut synth, rx) = synth_with_events();
    let stream: &[&[u8]] = &[
        // GS reset
        &[0xF0, 0x41, 0x10, 0x42, 0x12, 0x40, 0x00, 0x7F, 0x00, 0x41, 0xF7],
        &[0xB0, 0x00, 0x00],
        &[0xC0, 16],
        &[0xB0, 0x07, 90],
        &[0x90, 60, 100],
        &[0x99, 42, 90],
        &[0x80, 60, 0],
    ];
    for message in stream {
        synth.process_midi(message).unwrap();
    }

    assert_eq!(synth.system(), SynthSystem::Gs);
    assert_eq!(synth.voice_count(), 2);
    let events = drain(&rx);
    assert!(events.contains(&SynthEvent::ProgramChange {
        channel: 0,
        program: 16,
        bank: 0
    }));
    assert!(events.contains(&SynthEvent::NoteOn {
        channel: 9,
        note: 42,
        velocity: 90
    }));
    let note_off = events
        .iter()
        .position(|e| *e == SynthEvent::NoteOff { channel: 0, note: 60 });
    let note_on = events.iter().position(|e| {
        *e == SynthEvent::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100,
        }
    });
    assert!(note_on < note_off);
}

#[test]
fn test_xg_session() {
    let (mut synth, _rx) = synth_with_events();
    // XG system on
    synth
        .process_midi(&[0xF0, 0x43, 0x10, 0x4C, 0x00, 0x00, 0x7E, 0x00, 0xF7])
        .unwrap();
    assert_eq!(synth.system(), SynthSystem::Xg);

    // part 3 to the XG drum bank through a part parameter
    synth
        .process_midi(&[0xF0, 0x43, 0x10, 0x4C, 0x08, 0x03, 0x01, 0x7F, 0xF7])
        .unwrap();
    assert!(synth.channel(3).unwrap().is_drum());
    assert_eq!(synth.channel(3).unwrap().preset().unwrap().name, "Standard");
}

#[test]
fn test_gs_reset_clears_channel_state() {
    let (mut synth, rx) = synth_with_events();
    synth.process_midi(&[0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]).unwrap();
    assert_eq!(synth.system(), SynthSystem::Gm);
    synth.process_midi(&[0xC0, 16]).unwrap();
    synth.process_midi(&[0xB0, controllers::PAN, 10]).unwrap();
    drain(&rx);

    synth
        .process_midi(&[0xF0, 0x41, 0x10, 0x42, 0x12, 0x40, 0x00, 0x7F, 0x00, 0x41, 0xF7])
        .unwrap();
    assert_eq!(synth.system(), SynthSystem::Gs);
    let channel = synth.channel(0).unwrap();
    assert_eq!(channel.preset().unwrap().name, "Piano");
    assert_eq!(channel.controllers().cc(controllers::PAN), 64);
    assert!(drain(&rx).contains(&SynthEvent::DrumChange {
        channel: 9,
        is_drum: true
    }));
}

#[test]
fn test_invalid_messages() {
    let (mut synth, _rx) = synth_with_events();
    assert!(synth.process_midi(&[]).is_err());
    let mut narrow = Synthesizer::new(SynthConfig::default().channels(4), general_manager()).unwrap();
    assert!(narrow.process_midi(&[0x97, 60, 100]).is_err());
    // the offset moves the same message into range
    assert!(narrow.process_midi_with_offset(&[0x91, 60, 100], 2).is_ok());
    assert_eq!(narrow.channel(3).unwrap().voice_count(), 1);
}

// =============================================================================
// Voice cap
// =============================================================================

/// Drops the newest voices first.
struct NewestFirst;

impl VoiceEviction for NewestFirst {
    fn evict(&mut self, channels: &mut [MidiChannel], overflow: usize) -> usize {
        let mut left = overflow;
        for channel in channels.iter_mut().rev() {
            for voice in channel.voices_mut().iter_mut().rev() {
                if left == 0 {
                    break;
                }
                voice.finished = true;
                left -= 1;
            }
            channel.remove_finished_voices();
        }
        overflow - left
    }
}

#[test]
fn test_voice_cap_default_policy() {
    init_tracing();
    let mut synth = Synthesizer::new(SynthConfig::default().voice_cap(3), general_manager()).unwrap();
    synth.note_on(0, 60, 10).unwrap();
    for note in [62, 64, 65] {
        synth.note_on(0, note, 120).unwrap();
    }
    assert_eq!(synth.voice_count(), 3);
    // the soft note goes first
    let keys: Vec<u8> = synth.channel(0).unwrap().voices().iter().map(|v| v.midi_note).collect();
    assert_eq!(keys, vec![62, 64, 65]);
}

#[test]
fn test_voice_cap_custom_policy() {
    let mut synth = Synthesizer::new(SynthConfig::default().voice_cap(2), general_manager())
        .unwrap()
        .with_eviction(NewestFirst);
    synth.note_on(0, 60, 100).unwrap();
    synth.note_on(1, 62, 100).unwrap();
    synth.note_on(2, 64, 100).unwrap();
    assert_eq!(synth.voice_count(), 2);
    assert_eq!(synth.channel(2).unwrap().voice_count(), 0);
}

// =============================================================================
// Bank stack
// =============================================================================

#[test]
fn test_bank_stack_updates_channels() {
    let (mut synth, rx) = synth_with_events();
    synth.add_bank("grand", single_preset_bank("Grand"), 0).unwrap();
    assert!(drain(&rx)
        .iter()
        .any(|e| matches!(e, SynthEvent::PresetListChange(list) if list.iter().any(|p| p.name == "Piano"))));
    // the main bank still wins for 0:0
    assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Piano");

    synth.rearrange_banks(&["grand", "main"]).unwrap();
    assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Grand");
    // drums still come from the main bank
    assert_eq!(synth.channel(9).unwrap().preset().unwrap().name, "Standard");

    synth.delete_bank("grand").unwrap();
    assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Piano");
    let list = drain(&rx)
        .into_iter()
        .rev()
        .find_map(|e| match e {
            SynthEvent::PresetListChange(list) => Some(list),
            _ => None,
        })
        .unwrap();
    assert!(list.iter().all(|p| p.name != "Grand"));
}

#[test]
fn test_override_bank_wins() {
    let (mut synth, _rx) = synth_with_events();
    synth.set_override_bank(single_preset_bank("Embedded"), 0).unwrap();
    assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Embedded");
    assert!(synth.channel(0).unwrap().preset_uses_override());
    // no drum kit in the override: the stack supplies it
    assert_eq!(synth.channel(9).unwrap().preset().unwrap().name, "Standard");

    synth.clear_override_bank().unwrap();
    assert_eq!(synth.channel(0).unwrap().preset().unwrap().name, "Piano");
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_snapshot_through_bincode() {
    let (mut synth, _rx) = synth_with_events();
    synth.process_midi(&[0xC1, 16]).unwrap();
    synth.process_midi(&[0xB1, controllers::MAIN_VOLUME, 33]).unwrap();
    synth.set_master_tuning(-20.0);
    synth.key_modifiers().add_mapping(1, 60, KeyModifier::new().gain(0.5));
    synth.set_preset_lock(1, true).unwrap();

    let bytes = bincode::serialize(&synth.snapshot()).unwrap();
    let snapshot: SynthesizerSnapshot = bincode::deserialize(&bytes).unwrap();

    let mut fresh = Synthesizer::new(SynthConfig::default(), SoundBankManager::with_bank(general_bank())).unwrap();
    fresh.apply_snapshot(&snapshot).unwrap();
    let channel = fresh.channel(1).unwrap();
    assert_eq!(channel.preset().unwrap().name, "Organ");
    assert_eq!(channel.controllers().cc(controllers::MAIN_VOLUME), 33);
    assert!(channel.is_preset_locked());
    assert_eq!(fresh.master_tuning(), -20.0);
    assert_eq!(fresh.key_modifiers().gain(1, 60), 0.5);

    // the locked preset ignores program changes
    fresh.process_midi(&[0xC1, 0]).unwrap();
    assert_eq!(fresh.channel(1).unwrap().preset().unwrap().name, "Organ");
}

#[test]
fn test_restore_messages_replay() {
    let (mut synth, _rx) = synth_with_events();
    synth.process_midi(&[0xC4, 16]).unwrap();
    let messages = synth.snapshot().restore_messages();

    let mut replay = Synthesizer::new(SynthConfig::default(), general_manager()).unwrap();
    for message in &messages {
        replay.process_midi(&message.to_bytes()).unwrap();
    }
    for channel in 0..16 {
        assert_eq!(
            replay.channel(channel).unwrap().preset().unwrap().name,
            synth.channel(channel).unwrap().preset().unwrap().name,
            "channel {channel}"
        );
    }
}
