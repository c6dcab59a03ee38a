//! Error types for wavebank-synth.

use thiserror::Error;

/// Result type alias for wavebank-synth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wavebank-synth.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither the override bank nor the bank stack has anything to play.
    #[error("No preset for bank {bank} program {program}")]
    NoPreset { bank: u16, program: u8 },

    /// Channel index past the configured channel count.
    #[error("Invalid channel: {0}")]
    InvalidChannel(usize),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sound bank loading error.
    #[error("Sound bank error: {0}")]
    SoundBank(#[from] wavebank_soundbank::Error),

    /// Malformed raw MIDI input.
    #[error("MIDI error: {0}")]
    Midi(#[from] wavebank_midi::Error),
}

impl From<wavebank_core::Error> for Error {
    fn from(err: wavebank_core::Error) -> Self {
        match err {
            wavebank_core::Error::InvalidConfig(msg) => Error::InvalidConfig(msg),
        }
    }
}
