//! SoundFont 2 / DLS patch model for wavebank.
//!
//! - **[`SoundBank`]** - Presets, instruments and samples parsed from an SF2 image
//! - **[`Preset::zones_for_note`]** - Zone matching with global-zone inheritance
//! - **[`Generator`] / [`Modulator`]** - Patch parameters and their routing
//! - **[`dls`]** - DLS articulation (`art1`/`art2`) to SF2 conversion
//! - **[`SoundBankManager`]** - Stack of banks with offsets and fallback lookup
//!
//! # Example
//!
//! ```ignore
//! use wavebank_soundbank::{PresetSource, SoundBank, SoundBankManager};
//!
//! let manager = SoundBankManager::with_bank(SoundBank::load("GeneralUser.sf2")?);
//! let piano = manager.preset(0, 0, false).expect("empty bank");
//! for layer in piano.zones_for_note(60, 100).iter() {
//!     let generators = layer.voice_generators();
//!     println!("{}: {} modulators", layer.sample.name, layer.modulators.len());
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod generator;
pub use generator::{Generator, GeneratorLimits, GeneratorType, GENERATOR_COUNT};

pub mod modulator;
pub use modulator::{
    default_modulators, CurveType, Modulator, ModulatorSource, TransformType,
};

mod zone;
pub use zone::{InstrumentZone, PresetZone, Range, Zone};

mod sample;
pub use sample::{Sample, SampleType};

mod instrument;
pub use instrument::Instrument;

mod preset;
pub use preset::{Preset, ZoneMatch};

pub mod riff;
mod sf2;

mod soundbank;
pub use soundbank::SoundBank;

pub mod dls;

mod manager;
pub use manager::{BankEntry, PresetListEntry, PresetSource, SoundBankManager};
