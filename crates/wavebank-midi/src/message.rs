//! Decoding of incoming MIDI bytes.

use crate::error::{Error, Result};

/// A channel voice message with its data bytes split out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOff { note: u8, velocity: u8 },
    NoteOn { note: u8, velocity: u8 },
    PolyPressure { note: u8, pressure: u8 },
    ControlChange { controller: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelPressure { pressure: u8 },
    PitchBend { lsb: u8, msb: u8 },
}

impl ChannelMessage {
    /// Number of data bytes that follow a status nibble.
    #[inline]
    pub fn data_len(status: u8) -> Option<usize> {
        match status & 0xF0 {
            0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => Some(2),
            0xC0 | 0xD0 => Some(1),
            _ => None,
        }
    }

    /// Decode a status byte plus its data bytes.
    pub fn decode(status: u8, data: &[u8]) -> Result<Self> {
        let needed = Self::data_len(status).ok_or(Error::Unsupported(status))?;
        if data.len() < needed {
            return Err(Error::Incomplete {
                status,
                needed,
                got: data.len(),
            });
        }
        let d0 = data[0] & 0x7F;
        let d1 = data.get(1).copied().unwrap_or(0) & 0x7F;
        Ok(match status & 0xF0 {
            0x80 => ChannelMessage::NoteOff {
                note: d0,
                velocity: d1,
            },
            0x90 => ChannelMessage::NoteOn {
                note: d0,
                velocity: d1,
            },
            0xA0 => ChannelMessage::PolyPressure {
                note: d0,
                pressure: d1,
            },
            0xB0 => ChannelMessage::ControlChange {
                controller: d0,
                value: d1,
            },
            0xC0 => ChannelMessage::ProgramChange { program: d0 },
            0xD0 => ChannelMessage::ChannelPressure { pressure: d0 },
            _ => ChannelMessage::PitchBend { lsb: d0, msb: d1 },
        })
    }
}

/// One decoded input message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiInput<'a> {
    /// Channel voice message. `channel` is the low status nibble plus
    /// the caller's channel offset (for multi-port setups).
    Channel {
        channel: usize,
        message: ChannelMessage,
    },
    /// System exclusive payload, after 0xF0 and without the trailing 0xF7.
    SysEx(&'a [u8]),
}

impl<'a> MidiInput<'a> {
    /// Decode a complete message.
    ///
    /// # Arguments
    /// * `bytes` - Status byte followed by its data
    /// * `channel_offset` - Added to the channel nibble
    pub fn parse(bytes: &'a [u8], channel_offset: usize) -> Result<Self> {
        let (&status, data) = bytes.split_first().ok_or(Error::Empty)?;
        if status < 0x80 {
            return Err(Error::MissingStatus(status));
        }
        if status == 0xF0 {
            let payload = match data.last() {
                Some(0xF7) => &data[..data.len() - 1],
                _ => data,
            };
            return Ok(MidiInput::SysEx(payload));
        }
        let message = ChannelMessage::decode(status, data)?;
        Ok(MidiInput::Channel {
            channel: (status & 0x0F) as usize + channel_offset,
            message,
        })
    }
}
