//! The in-memory sound bank.

use crate::error::Result;
use crate::instrument::Instrument;
use crate::modulator::{default_modulators, Modulator};
use crate::preset::Preset;
use crate::sample::Sample;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use wavebank_core::{is_xg_drums, DRUM_BANK};

/// Presets, instruments and samples of one SoundFont, plus its INFO
/// metadata and default modulators.
#[derive(Debug)]
pub struct SoundBank {
    info: BTreeMap<String, String>,
    presets: Vec<Arc<Preset>>,
    instruments: Vec<Arc<Instrument>>,
    samples: Vec<Arc<Sample>>,
    default_modulators: Arc<[Modulator]>,
}

impl SoundBank {
    /// Parse an SF2 image.
    pub fn from_sf2_bytes(bytes: &[u8]) -> Result<Self> {
        crate::sf2::parse(bytes)
    }

    /// Read and parse an SF2 file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_sf2_bytes(&bytes)
    }

    pub(crate) fn from_parts(
        info: BTreeMap<String, String>,
        presets: Vec<Arc<Preset>>,
        instruments: Vec<Arc<Instrument>>,
        samples: Vec<Arc<Sample>>,
        default_modulators: Arc<[Modulator]>,
    ) -> Self {
        Self {
            info,
            presets,
            instruments,
            samples,
            default_modulators,
        }
    }

    /// Bank assembled in code. Presets are sorted by (bank, program).
    pub fn from_presets(mut presets: Vec<Arc<Preset>>) -> Self {
        presets.sort_by_key(|p| (p.bank, p.program));
        Self {
            info: BTreeMap::new(),
            presets,
            instruments: Vec::new(),
            samples: Vec::new(),
            default_modulators: default_modulators().into(),
        }
    }

    /// Bank name (`INAM`), empty when absent.
    pub fn name(&self) -> &str {
        self.info.get("INAM").map(String::as_str).unwrap_or("")
    }

    /// SoundFont version (`ifil`) as "major.minor".
    pub fn version(&self) -> Option<&str> {
        self.info.get("ifil").map(String::as_str)
    }

    /// INFO sub-chunks by FourCC.
    pub fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }

    pub fn presets(&self) -> &[Arc<Preset>] {
        &self.presets
    }

    pub fn instruments(&self) -> &[Arc<Instrument>] {
        &self.instruments
    }

    pub fn samples(&self) -> &[Arc<Sample>] {
        &self.samples
    }

    /// Default modulators, after any `dmod` override.
    pub fn default_modulators(&self) -> &Arc<[Modulator]> {
        &self.default_modulators
    }

    /// Exact (bank, program) match.
    ///
    /// With `allow_xg`, an XG drum bank (120/126/127) also matches the
    /// bank-128 preset of that program.
    pub fn preset_no_fallback(&self, bank: u16, program: u8, allow_xg: bool) -> Option<Arc<Preset>> {
        self.presets
            .iter()
            .find(|p| p.bank == bank && p.program == program)
            .or_else(|| {
                if !(allow_xg && is_xg_drums(bank)) {
                    return None;
                }
                self.presets
                    .iter()
                    .find(|p| p.bank == DRUM_BANK && p.program == program)
            })
            .cloned()
    }

    /// Lookup with the single-bank fallback chain: drum banks fall back to
    /// any drum preset, melodic banks to the same program in any melodic
    /// bank, and finally the first preset.
    pub fn preset(&self, bank: u16, program: u8) -> Option<Arc<Preset>> {
        if let Some(found) = self.preset_no_fallback(bank, program, false) {
            return Some(found);
        }
        let fallback = if bank == DRUM_BANK {
            self.presets
                .iter()
                .find(|p| p.bank == DRUM_BANK && p.program == program)
                .or_else(|| self.presets.iter().find(|p| p.bank == DRUM_BANK))
        } else {
            self.presets
                .iter()
                .find(|p| p.program == program && p.bank != DRUM_BANK)
        };
        let found = fallback.or_else(|| self.presets.first()).cloned();
        if let Some(p) = &found {
            tracing::warn!(
                "Preset {}.{} not found. Replaced with {} ({}.{})",
                bank,
                program,
                p.name,
                p.bank,
                p.program
            );
        }
        found
    }
}
