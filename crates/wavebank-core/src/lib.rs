//! Core types shared by the wavebank crates.
//!
//! - **[`SynthConfig`]** - Engine configuration with validation
//! - **[`SynthSystem`]** - GM / GS / XG / GM2 mode and its bank-select rules
//!
//! # Example
//!
//! ```ignore
//! use wavebank_core::{SynthConfig, SynthSystem};
//!
//! let config = SynthConfig::default().system(SynthSystem::Xg).voice_cap(256);
//! config.validate()?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::SynthConfig;

pub mod system;
pub use system::{
    choose_bank, is_valid_xg_msb, is_xg_drums, parse_bank_select, BankSelect, DrumStatus,
    SynthSystem, DEFAULT_PERCUSSION, DRUM_BANK,
};
