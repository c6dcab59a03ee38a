//! MIDI events emitted by the engine, serialized through `midi-msg`.

use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};

use crate::message::ChannelMessage;

/// Channel voice event for output (snapshot restore, export).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    pub channel: Channel,
    pub msg: ChannelVoiceMsg,
}

impl MidiEvent {
    #[inline]
    pub fn new(channel: Channel, msg: ChannelVoiceMsg) -> Self {
        Self { channel, msg }
    }

    #[inline]
    pub fn cc_builder(control: u8, value: u8) -> MidiEventBuilder {
        MidiEventBuilder {
            channel: 0,
            msg: ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC { control, value },
            },
        }
    }

    #[inline]
    pub fn program_builder(program: u8) -> MidiEventBuilder {
        MidiEventBuilder {
            channel: 0,
            msg: ChannelVoiceMsg::ProgramChange { program },
        }
    }

    #[inline]
    pub fn control_change(channel: u8, cc: u8, value: u8) -> Self {
        Self::cc_builder(cc, value).channel(channel).build()
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::program_builder(program).channel(channel).build()
    }

    #[inline]
    pub fn pitch_bend(channel: u8, bend: u16) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::PitchBend { bend },
        }
    }

    #[inline]
    pub fn channel_num(&self) -> u8 {
        self.channel as u8
    }

    #[inline]
    pub fn to_midi_msg(&self) -> MidiMsg {
        MidiMsg::ChannelVoice {
            channel: self.channel,
            msg: self.msg,
        }
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_midi_msg().to_midi()
    }
}

/// Raw 3-byte MIDI event for unparsed storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMidiEvent {
    pub data: [u8; 3],
    /// Valid bytes in `data` (1-3).
    pub len: u8,
}

impl RawMidiEvent {
    #[inline]
    pub fn new(data: [u8; 3], len: u8) -> Self {
        Self { data, len }
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0] & 0xF0
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn decode(&self) -> crate::Result<ChannelMessage> {
        let bytes = self.bytes();
        let (&status, data) = bytes.split_first().ok_or(crate::Error::Empty)?;
        ChannelMessage::decode(status, data)
    }
}

impl From<MidiEvent> for RawMidiEvent {
    fn from(event: MidiEvent) -> Self {
        let bytes = event.to_bytes();
        let mut data = [0u8; 3];
        let len = bytes.len().min(3);
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            data,
            len: len as u8,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MidiEventBuilder {
    channel: u8,
    msg: ChannelVoiceMsg,
}

impl MidiEventBuilder {
    #[inline]
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    #[inline]
    pub fn build(self) -> MidiEvent {
        MidiEvent {
            channel: Channel::from_u8(self.channel),
            msg: self.msg,
        }
    }
}
