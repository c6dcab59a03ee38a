//! Centralized error type for the wavebank umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] wavebank_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] wavebank_midi::Error),

    #[cfg(feature = "soundbank")]
    #[error("Sound bank: {0}")]
    SoundBank(#[from] wavebank_soundbank::Error),

    #[cfg(feature = "synth")]
    #[error("Synth: {0}")]
    Synth(#[from] wavebank_synth::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
