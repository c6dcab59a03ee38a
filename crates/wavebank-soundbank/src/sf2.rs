//! SoundFont 2 reader.
//!
//! Layout: `RIFF sfbk { LIST INFO, LIST sdta { smpl }, LIST pdta { hydra } }`.
//! Hydra tables are read in file order; every table ends with a terminal
//! record that only bounds the previous entry and is dropped.

use crate::error::{Error, Result};
use crate::generator::{Generator, GeneratorType};
use crate::instrument::Instrument;
use crate::modulator::{add_unique, default_modulators, Modulator};
use crate::preset::Preset;
use crate::riff::{ByteReader, Chunk};
use crate::sample::{Sample, SampleType};
use crate::soundbank::SoundBank;
use crate::zone::Zone;
use std::collections::BTreeMap;
use std::sync::Arc;

const PHDR_SIZE: usize = 38;
const BAG_SIZE: usize = 4;
const MOD_SIZE: usize = 10;
const GEN_SIZE: usize = 4;
const INST_SIZE: usize = 22;
const SHDR_SIZE: usize = 46;

const HYDRA: [&[u8; 4]; 9] = [
    b"phdr", b"pbag", b"pmod", b"pgen", b"inst", b"ibag", b"imod", b"igen", b"shdr",
];

struct PresetHeader {
    name: String,
    program: u16,
    bank: u16,
    bag: usize,
    library: u32,
    genre: u32,
    morphology: u32,
}

struct Bag {
    generator: usize,
    modulator: usize,
}

pub(crate) fn parse(bytes: &[u8]) -> Result<SoundBank> {
    let mut file = ByteReader::new("file", bytes);
    let riff = file.read_chunk()?;
    if !riff.is(b"RIFF") {
        return Err(Error::UnexpectedChunk {
            expected: "RIFF".into(),
            found: riff.name(),
        });
    }
    let (form, chunks) = riff.list()?;
    match form.to_ascii_lowercase().as_str() {
        "sfbk" => {}
        "sfpk" => {
            return Err(Error::InvalidFormat(
                "compressed (sfpk) banks are not supported".into(),
            ))
        }
        _ => {
            return Err(Error::UnexpectedChunk {
                expected: "sfbk".into(),
                found: form,
            })
        }
    }

    let mut info = BTreeMap::new();
    let mut defaults = default_modulators();
    let mut sample_data: Option<Arc<[i16]>> = None;
    let mut pdta = None;

    for chunk in chunks.iter().filter(|c| c.is(b"LIST")) {
        let (kind, children) = chunk.list()?;
        match kind.to_ascii_lowercase().as_str() {
            "info" => read_info(&children, &mut info, &mut defaults)?,
            "sdta" => {
                let smpl = children
                    .iter()
                    .find(|c| c.is(b"smpl"))
                    .ok_or(Error::MissingChunk("smpl"))?;
                sample_data = Some(read_pcm(smpl.data));
                tracing::debug!("smpl: {} frames", smpl.data.len() / 2);
            }
            "pdta" => pdta = Some(children),
            other => tracing::debug!("skipping LIST '{}'", other),
        }
    }

    let sample_data = sample_data.ok_or(Error::MissingChunk("sdta"))?;
    let pdta = pdta.ok_or(Error::MissingChunk("pdta"))?;
    if pdta.len() < HYDRA.len() {
        return Err(Error::MissingChunk("pdta hydra"));
    }
    for (chunk, expected) in pdta.iter().zip(HYDRA) {
        if !chunk.is(expected) {
            return Err(Error::UnexpectedChunk {
                expected: crate::riff::fourcc_str(expected),
                found: chunk.name(),
            });
        }
    }

    let defaults: Arc<[Modulator]> = defaults.into();

    let samples = read_samples(&pdta[8], &sample_data)?;
    let instrument_zones = read_zones(
        &pdta[5],
        &read_generators(&pdta[7])?,
        &read_modulators(&pdta[6])?,
        &samples,
        GeneratorType::SampleId,
        "sample",
    )?;
    let instruments = read_instruments(&pdta[4], instrument_zones)?;
    let preset_zones = read_zones(
        &pdta[1],
        &read_generators(&pdta[3])?,
        &read_modulators(&pdta[2])?,
        &instruments,
        GeneratorType::Instrument,
        "instrument",
    )?;
    let mut presets = read_presets(&pdta[0], preset_zones, &defaults)?;
    presets.sort_by_key(|p| (p.bank, p.program));

    tracing::debug!(
        "parsed '{}': {} presets, {} instruments, {} samples",
        info.get("INAM").map(String::as_str).unwrap_or(""),
        presets.len(),
        instruments.len(),
        samples.len()
    );

    Ok(SoundBank::from_parts(
        info,
        presets.into_iter().map(Arc::new).collect(),
        instruments,
        samples,
        defaults,
    ))
}

fn read_info(
    children: &[Chunk<'_>],
    info: &mut BTreeMap<String, String>,
    defaults: &mut Vec<Modulator>,
) -> Result<()> {
    for chunk in children {
        let key = chunk.name();
        let mut reader = chunk.reader();
        let text = match key.to_ascii_lowercase().as_str() {
            "ifil" | "iver" => {
                let major = reader.read_u16()?;
                let minor = reader.read_u16()?;
                format!("{major}.{minor}")
            }
            "dmod" => {
                let mut custom = read_modulators(chunk)?;
                let count = custom.len();
                for m in defaults.iter() {
                    add_unique(&mut custom, m);
                }
                *defaults = custom;
                format!("Modulators: {count}")
            }
            _ => reader.read_string(chunk.data.len())?,
        };
        tracing::debug!("{}: {}", key, text);
        info.insert(key, text);
    }
    Ok(())
}

fn read_pcm(data: &[u8]) -> Arc<[i16]> {
    data.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Record count of a table, without the terminal record.
fn record_count(chunk: &Chunk<'_>, size: usize) -> usize {
    (chunk.data.len() / size).saturating_sub(1)
}

fn read_generators(chunk: &Chunk<'_>) -> Result<Vec<Option<Generator>>> {
    let mut reader = chunk.reader();
    let mut out = Vec::with_capacity(chunk.data.len() / GEN_SIZE);
    for _ in 0..chunk.data.len() / GEN_SIZE {
        let kind = reader.read_u16()?;
        let amount = reader.read_u16()?;
        out.push(GeneratorType::from_u16(kind).map(|k| Generator::from_raw(k, amount)));
    }
    Ok(out)
}

/// All modulator records, without the terminal one.
fn read_modulators(chunk: &Chunk<'_>) -> Result<Vec<Modulator>> {
    let mut reader = chunk.reader();
    let mut out = Vec::with_capacity(chunk.data.len() / MOD_SIZE);
    for _ in 0..record_count(chunk, MOD_SIZE) {
        let source = reader.read_u16()?;
        let destination = reader.read_u16()?;
        let amount = reader.read_i16()?;
        let secondary = reader.read_u16()?;
        let transform = reader.read_u16()?;
        out.push(Modulator::new(source, secondary, destination, amount as f32, transform));
    }
    Ok(out)
}

fn read_bags(chunk: &Chunk<'_>) -> Result<Vec<Bag>> {
    let mut reader = chunk.reader();
    let mut out = Vec::with_capacity(chunk.data.len() / BAG_SIZE);
    for _ in 0..chunk.data.len() / BAG_SIZE {
        out.push(Bag {
            generator: reader.read_u16()? as usize,
            modulator: reader.read_u16()? as usize,
        });
    }
    Ok(out)
}

fn slice_of<'t, T>(table: &'t [T], from: usize, to: usize, kind: &'static str) -> Result<&'t [T]> {
    if from > to || to > table.len() {
        return Err(Error::InvalidIndex {
            kind,
            index: to.max(from),
            len: table.len(),
        });
    }
    Ok(&table[from..to])
}

fn read_zones<R>(
    bag_chunk: &Chunk<'_>,
    generators: &[Option<Generator>],
    modulators: &[Modulator],
    targets: &[Arc<R>],
    target_kind: GeneratorType,
    target_name: &'static str,
) -> Result<Vec<Zone<R>>> {
    let bags = read_bags(bag_chunk)?;
    let mut zones = Vec::with_capacity(bags.len());
    for pair in bags.windows(2) {
        let gens = slice_of(generators, pair[0].generator, pair[1].generator, "generator")?;
        let mods = slice_of(modulators, pair[0].modulator, pair[1].modulator.min(modulators.len()), "modulator")?;
        let gens: Vec<Generator> = gens.iter().flatten().copied().collect();

        let target = match gens.iter().find(|g| g.kind == target_kind) {
            Some(g) => {
                let index = g.value as u16 as usize;
                let target = targets.get(index).ok_or(Error::InvalidIndex {
                    kind: target_name,
                    index,
                    len: targets.len(),
                })?;
                Some(Arc::clone(target))
            }
            None => None,
        };
        zones.push(Zone::new(gens, mods.to_vec(), target));
    }
    Ok(zones)
}

fn read_instruments(chunk: &Chunk<'_>, zones: Vec<Zone<Sample>>) -> Result<Vec<Arc<Instrument>>> {
    let mut reader = chunk.reader();
    let mut headers = Vec::new();
    for _ in 0..chunk.data.len() / INST_SIZE {
        let name = reader.read_string(20)?;
        let bag = reader.read_u16()? as usize;
        headers.push((name, bag));
    }

    let mut zones = zones.into_iter();
    let mut taken = 0usize;
    let mut out = Vec::with_capacity(headers.len());
    for pair in headers.windows(2) {
        let (name, start) = (&pair[0].0, pair[0].1);
        let end = pair[1].1;
        if start < taken || end < start {
            return Err(Error::InvalidIndex {
                kind: "instrument bag",
                index: start,
                len: taken,
            });
        }
        let own: Vec<_> = zones.by_ref().skip(start - taken).take(end - start).collect();
        taken = end;
        out.push(Arc::new(Instrument::new(name.clone(), own)));
    }
    Ok(out)
}

fn read_presets(
    chunk: &Chunk<'_>,
    zones: Vec<Zone<Instrument>>,
    defaults: &Arc<[Modulator]>,
) -> Result<Vec<Preset>> {
    let mut reader = chunk.reader();
    let mut headers = Vec::new();
    for _ in 0..chunk.data.len() / PHDR_SIZE {
        headers.push(PresetHeader {
            name: strip_bank_prefix(&reader.read_string(20)?),
            program: reader.read_u16()?,
            bank: reader.read_u16()?,
            bag: reader.read_u16()? as usize,
            library: reader.read_u32()?,
            genre: reader.read_u32()?,
            morphology: reader.read_u32()?,
        });
    }

    let mut zones = zones.into_iter();
    let mut taken = 0usize;
    let mut out = Vec::with_capacity(headers.len());
    for pair in headers.windows(2) {
        let header = &pair[0];
        let end = pair[1].bag;
        if header.bag < taken || end < header.bag {
            return Err(Error::InvalidIndex {
                kind: "preset bag",
                index: header.bag,
                len: taken,
            });
        }
        let own: Vec<_> = zones
            .by_ref()
            .skip(header.bag - taken)
            .take(end - header.bag)
            .collect();
        taken = end;
        let mut preset = Preset::new(
            header.name.clone(),
            header.program.min(127) as u8,
            header.bank,
            own,
            Arc::clone(defaults),
        );
        preset.library = header.library;
        preset.genre = header.genre;
        preset.morphology = header.morphology;
        out.push(preset);
    }
    Ok(out)
}

fn read_samples(chunk: &Chunk<'_>, pcm: &Arc<[i16]>) -> Result<Vec<Arc<Sample>>> {
    let mut reader = chunk.reader();
    let mut out = Vec::new();
    for _ in 0..record_count(chunk, SHDR_SIZE) {
        let name = reader.read_string(20)?;
        let start = reader.read_u32()? as usize;
        let end = reader.read_u32()? as usize;
        let loop_start = reader.read_u32()? as usize;
        let loop_end = reader.read_u32()? as usize;
        let sample_rate = reader.read_u32()?;
        let mut original_pitch = reader.read_u8()?;
        if original_pitch == 255 {
            original_pitch = 60;
        }
        let pitch_correction = reader.read_i8()?;
        let link = reader.read_u16()?;
        let sample_type = SampleType::from_u16(reader.read_u16()?);

        let end = end.min(pcm.len());
        let start = start.min(end);
        out.push(Arc::new(Sample {
            name,
            sample_rate,
            original_pitch,
            pitch_correction,
            link,
            sample_type,
            loop_start: loop_start.saturating_sub(start) as u32,
            loop_end: loop_end.saturating_sub(start) as u32,
            data: pcm[start..end].into(),
        }));
    }
    Ok(out)
}

/// Remove an embedded `bbb:ppp` bank/program tag from a preset name.
fn strip_bank_prefix(name: &str) -> String {
    let bytes = name.as_bytes();
    let is_tag = |w: &[u8]| {
        w[..3].iter().all(u8::is_ascii_digit) && w[3] == b':' && w[4..].iter().all(u8::is_ascii_digit)
    };
    match bytes.windows(7).position(is_tag) {
        Some(at) => format!("{}{}", &name[..at], &name[at + 7..]).trim().to_string(),
        None => name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bank_prefix() {
        assert_eq!(strip_bank_prefix("000:001 Piano"), "Piano");
        assert_eq!(strip_bank_prefix("Piano 128:000"), "Piano");
        assert_eq!(strip_bank_prefix("  Strings "), "Strings");
        assert_eq!(strip_bank_prefix("12:34 x"), "12:34 x");
    }

    #[test]
    fn test_rejects_non_riff() {
        let bytes = b"RIFX\x04\x00\x00\x00sfbk";
        assert!(matches!(parse(bytes), Err(Error::UnexpectedChunk { .. })));
    }

    #[test]
    fn test_rejects_sfpk() {
        let bytes = b"RIFF\x04\x00\x00\x00sfpk";
        assert!(matches!(parse(bytes), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_sdta() {
        let bytes = b"RIFF\x04\x00\x00\x00sfbk";
        assert!(matches!(parse(bytes), Err(Error::MissingChunk("sdta"))));
    }
}
