//! Error types for wavebank-soundbank.

use thiserror::Error;

/// Result type alias for soundbank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or querying a sound bank.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk header did not carry the expected FourCC.
    #[error("Unexpected chunk: expected '{expected}', found '{found}'")]
    UnexpectedChunk { expected: String, found: String },

    /// A read went past the declared chunk length.
    #[error("Chunk '{chunk}' overrun: needed {needed} bytes, {available} available")]
    ChunkOverrun {
        chunk: String,
        needed: usize,
        available: usize,
    },

    /// Structurally invalid data.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A required chunk is absent.
    #[error("Missing chunk: {0}")]
    MissingChunk(&'static str),

    /// A record references an index outside its table.
    #[error("Invalid {kind} index {index} (table has {len} entries)")]
    InvalidIndex {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}
