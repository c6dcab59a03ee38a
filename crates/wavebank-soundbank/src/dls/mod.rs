//! DLS articulation support.
//!
//! DLS instruments describe their envelopes, LFOs and controller routing as
//! connection blocks (`art1` / `art2` chunks). [`read_articulation`] turns a
//! chunk into SF2 generators and modulators so DLS regions can be played by
//! the same voice pipeline as SoundFont zones.

pub mod constants;

mod articulator;
pub use articulator::{convert_connection, read_articulation, Articulation, Connection};
