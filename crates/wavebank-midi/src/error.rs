//! Error types for wavebank-midi.

use thiserror::Error;

/// Result type alias for MIDI decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding raw MIDI bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No bytes at all.
    #[error("Empty MIDI message")]
    Empty,

    /// First byte is a data byte.
    #[error("Missing status byte (got 0x{0:02X})")]
    MissingStatus(u8),

    /// Fewer data bytes than the status requires.
    #[error("Incomplete message 0x{status:02X}: needs {needed} data bytes, got {got}")]
    Incomplete { status: u8, needed: usize, got: usize },

    /// System common or real-time status this crate does not handle.
    #[error("Unsupported status byte 0x{0:02X}")]
    Unsupported(u8),
}
