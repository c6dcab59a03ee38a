//! Test helpers and fixtures for wavebank integration tests
//!
//! [`Sf2Builder`] writes small SoundFont images in memory, so the tests do
//! not depend on font files being present.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `GENERATOR_EPSILON` (0.5): integer generator slots after f32 math
//! - `CURVE_EPSILON` (1e-4): normalized curve values
//! - `CENTS_EPSILON` (0.01): tuning values in cents

#![allow(dead_code)]

pub mod tolerances;

use wavebank::soundbank::{GeneratorType, SoundBank, SoundBankManager};

/// Default test sample rate
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Frames of silence after every sample, as the SF2 format requires.
const SAMPLE_PADDING: usize = 46;

/// Generators and modulators of one zone.
#[derive(Debug, Clone, Default)]
pub struct ZoneSpec {
    generators: Vec<(u16, u16)>,
    /// source, destination, amount, secondary, transform
    modulators: Vec<[u16; 5]>,
}

impl ZoneSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generator(mut self, kind: GeneratorType, value: i16) -> Self {
        self.generators.push((kind as u16, value as u16));
        self
    }

    pub fn key_range(mut self, lo: u8, hi: u8) -> Self {
        // key range must come first
        self.generators
            .insert(0, (GeneratorType::KeyRange as u16, lo as u16 | (hi as u16) << 8));
        self
    }

    pub fn vel_range(mut self, lo: u8, hi: u8) -> Self {
        self.generators
            .push((GeneratorType::VelRange as u16, lo as u16 | (hi as u16) << 8));
        self
    }

    pub fn modulator(mut self, source: u16, destination: GeneratorType, amount: i16, secondary: u16) -> Self {
        self.modulators
            .push([source, destination as u16, amount as u16, secondary, 0]);
        self
    }

    /// Instrument zone playing sample `index`.
    pub fn sample(mut self, index: u16) -> Self {
        self.generators.push((GeneratorType::SampleId as u16, index));
        self
    }

    /// Preset zone using instrument `index`.
    pub fn instrument(mut self, index: u16) -> Self {
        self.generators.push((GeneratorType::Instrument as u16, index));
        self
    }
}

struct SampleSpec {
    name: String,
    start: u32,
    end: u32,
    loop_start: u32,
    loop_end: u32,
    root_key: u8,
}

struct PresetSpec {
    name: String,
    bank: u16,
    program: u16,
    zones: Vec<ZoneSpec>,
}

/// In-memory SoundFont 2 writer.
pub struct Sf2Builder {
    name: String,
    pcm: Vec<i16>,
    samples: Vec<SampleSpec>,
    instruments: Vec<(String, Vec<ZoneSpec>)>,
    presets: Vec<PresetSpec>,
    default_modulators: Option<Vec<[u16; 5]>>,
}

impl Sf2Builder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pcm: Vec::new(),
            samples: Vec::new(),
            instruments: Vec::new(),
            presets: Vec::new(),
            default_modulators: None,
        }
    }

    /// Append a mono sample looping over all but its first and last frame.
    pub fn sample(&mut self, name: &str, frames: &[i16], root_key: u8) -> u16 {
        let start = self.pcm.len() as u32;
        self.pcm.extend_from_slice(frames);
        let end = self.pcm.len() as u32;
        self.pcm.extend(std::iter::repeat(0).take(SAMPLE_PADDING));
        self.samples.push(SampleSpec {
            name: name.to_string(),
            start,
            end,
            loop_start: start + 1,
            loop_end: end.saturating_sub(1),
            root_key,
        });
        (self.samples.len() - 1) as u16
    }

    pub fn instrument(&mut self, name: &str, zones: Vec<ZoneSpec>) -> u16 {
        self.instruments.push((name.to_string(), zones));
        (self.instruments.len() - 1) as u16
    }

    pub fn preset(&mut self, name: &str, bank: u16, program: u16, zones: Vec<ZoneSpec>) -> &mut Self {
        self.presets.push(PresetSpec {
            name: name.to_string(),
            bank,
            program,
            zones,
        });
        self
    }

    /// Write a `dmod` chunk.
    pub fn default_modulators(&mut self, modulators: Vec<[u16; 5]>) -> &mut Self {
        self.default_modulators = Some(modulators);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut info = b"INFO".to_vec();
        info.extend(chunk(b"ifil", &[2, 0, 4, 0]));
        info.extend(chunk(b"INAM", &c_string(&self.name)));
        if let Some(mods) = &self.default_modulators {
            info.extend(chunk(b"dmod", &modulator_table(mods.iter())));
        }

        let mut sdta = b"sdta".to_vec();
        let pcm: Vec<u8> = self.pcm.iter().flat_map(|s| s.to_le_bytes()).collect();
        sdta.extend(chunk(b"smpl", &pcm));

        let (pbag, pmod, pgen, preset_starts) = zone_tables(self.presets.iter().map(|p| &p.zones));
        let (ibag, imod, igen, instrument_starts) = zone_tables(self.instruments.iter().map(|i| &i.1));

        let mut phdr = Vec::new();
        for (preset, bag) in self.presets.iter().zip(&preset_starts) {
            phdr.extend(fixed_name(&preset.name));
            phdr.extend(preset.program.to_le_bytes());
            phdr.extend(preset.bank.to_le_bytes());
            phdr.extend(bag.to_le_bytes());
            phdr.extend([0u8; 12]);
        }
        phdr.extend(fixed_name("EOP"));
        phdr.extend([0u8; 4]);
        phdr.extend(preset_starts.last().copied().unwrap_or(0).to_le_bytes());
        phdr.extend([0u8; 12]);

        let mut inst = Vec::new();
        for ((name, _), bag) in self.instruments.iter().zip(&instrument_starts) {
            inst.extend(fixed_name(name));
            inst.extend(bag.to_le_bytes());
        }
        inst.extend(fixed_name("EOI"));
        inst.extend(instrument_starts.last().copied().unwrap_or(0).to_le_bytes());

        let mut shdr = Vec::new();
        for s in &self.samples {
            shdr.extend(fixed_name(&s.name));
            for value in [s.start, s.end, s.loop_start, s.loop_end, TEST_SAMPLE_RATE] {
                shdr.extend(value.to_le_bytes());
            }
            shdr.push(s.root_key);
            shdr.push(0);
            shdr.extend(0u16.to_le_bytes());
            shdr.extend(1u16.to_le_bytes());
        }
        shdr.extend(fixed_name("EOS"));
        shdr.extend([0u8; 26]);

        let mut pdta = b"pdta".to_vec();
        for (id, data) in [
            (b"phdr", phdr),
            (b"pbag", pbag),
            (b"pmod", pmod),
            (b"pgen", pgen),
            (b"inst", inst),
            (b"ibag", ibag),
            (b"imod", imod),
            (b"igen", igen),
            (b"shdr", shdr),
        ] {
            pdta.extend(chunk(id, &data));
        }

        let mut body = b"sfbk".to_vec();
        body.extend(chunk(b"LIST", &info));
        body.extend(chunk(b"LIST", &sdta));
        body.extend(chunk(b"LIST", &pdta));
        chunk(b"RIFF", &body)
    }

    pub fn bank(&self) -> SoundBank {
        SoundBank::from_sf2_bytes(&self.build()).expect("test bank should parse")
    }
}

/// Bag, modulator and generator tables for a list of zone lists, plus the
/// first bag index of every list followed by the total bag count.
fn zone_tables<'a>(
    owners: impl Iterator<Item = &'a Vec<ZoneSpec>>,
) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u16>) {
    let mut bags = Vec::new();
    let mut mods = Vec::new();
    let mut gens = Vec::new();
    let mut starts = Vec::new();
    let (mut bag_count, mut gen_count, mut mod_count) = (0u16, 0u16, 0u16);
    for zones in owners {
        starts.push(bag_count);
        for zone in zones {
            bags.extend(gen_count.to_le_bytes());
            bags.extend(mod_count.to_le_bytes());
            bag_count += 1;
            for (kind, amount) in &zone.generators {
                gens.extend(kind.to_le_bytes());
                gens.extend(amount.to_le_bytes());
                gen_count += 1;
            }
            mods.extend(modulator_records(zone.modulators.iter()));
            mod_count += zone.modulators.len() as u16;
        }
    }
    starts.push(bag_count);
    bags.extend(gen_count.to_le_bytes());
    bags.extend(mod_count.to_le_bytes());
    mods.extend([0u8; 10]);
    gens.extend([0u8; 4]);
    (bags, mods, gens, starts)
}

fn modulator_records<'a>(mods: impl Iterator<Item = &'a [u16; 5]>) -> Vec<u8> {
    mods.flat_map(|m| m.iter().flat_map(|field| field.to_le_bytes()))
        .collect()
}

/// Modulator records followed by the terminal record.
fn modulator_table<'a>(mods: impl Iterator<Item = &'a [u16; 5]>) -> Vec<u8> {
    let mut out = modulator_records(mods);
    out.extend([0u8; 10]);
    out
}

fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend((payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn c_string(text: &str) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    out.push(0);
    out
}

fn fixed_name(name: &str) -> [u8; 20] {
    let mut out = [0u8; 20];
    for (slot, byte) in out.iter_mut().zip(name.bytes().take(19)) {
        *slot = byte;
    }
    out
}

/// A 64-frame ramp.
pub fn ramp() -> Vec<i16> {
    (0..64).map(|i| (i * 512) as i16).collect()
}

/// One bank with a piano (bank 0 program 0, split at middle C), an organ
/// (0:16) and a standard kit (128:0) whose hi-hats share exclusive class 1.
pub fn general_bank() -> SoundBank {
    let mut sf = Sf2Builder::new("Test GM");
    let low = sf.sample("Piano Low", &ramp(), 48);
    let high = sf.sample("Piano High", &ramp(), 72);
    let organ_sample = sf.sample("Organ", &ramp(), 60);
    let hat = sf.sample("Hat", &ramp(), 42);

    let piano = sf.instrument(
        "Piano",
        vec![
            ZoneSpec::new().generator(GeneratorType::Pan, 100),
            ZoneSpec::new().key_range(0, 59).sample(low),
            ZoneSpec::new()
                .key_range(60, 127)
                .generator(GeneratorType::Pan, -200)
                .sample(high),
        ],
    );
    let organ = sf.instrument("Organ", vec![ZoneSpec::new().sample(organ_sample)]);
    let kit = sf.instrument(
        "Kit",
        vec![
            ZoneSpec::new()
                .key_range(35, 41)
                .sample(hat),
            ZoneSpec::new()
                .key_range(42, 46)
                .generator(GeneratorType::ExclusiveClass, 1)
                .sample(hat),
        ],
    );

    sf.preset("Piano", 0, 0, vec![ZoneSpec::new().instrument(piano)])
        .preset(
            "Organ",
            0,
            16,
            vec![ZoneSpec::new().generator(GeneratorType::CoarseTune, 2).instrument(organ)],
        )
        .preset("Standard", 128, 0, vec![ZoneSpec::new().instrument(kit)]);
    sf.bank()
}

pub fn general_manager() -> SoundBankManager {
    SoundBankManager::with_bank(general_bank())
}

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
