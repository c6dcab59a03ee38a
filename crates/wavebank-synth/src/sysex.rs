//! System exclusive handling: universal, Roland GS and Yamaha XG messages.
//!
//! The payload is what follows `F0`, without the closing `F7`. Unknown
//! messages are logged and ignored; only a bad channel is an error.

use crate::error::Result;
use crate::synthesizer::Synthesizer;
use wavebank_core::SynthSystem;
use wavebank_midi::controllers as cc;

const UNIVERSAL_NON_REALTIME: u8 = 0x7E;
const UNIVERSAL_REALTIME: u8 = 0x7F;
const ROLAND: u8 = 0x41;
const YAMAHA: u8 = 0x43;

/// GS part number (low nibble of the address) to MIDI channel.
/// Part 0 is the drum part on channel 10.
const GS_PART_TO_CHANNEL: [usize; 16] = [9, 0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 14, 15];

fn describe(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}

impl Synthesizer {
    /// Execute a system exclusive message.
    pub fn system_exclusive(&mut self, data: &[u8], channel_offset: usize) -> Result<()> {
        match data {
            [UNIVERSAL_NON_REALTIME | UNIVERSAL_REALTIME, _, 0x09, sub, ..] => {
                // GM system on / off
                let system = match *sub {
                    0x01 => SynthSystem::Gm,
                    0x03 => SynthSystem::Gm2,
                    _ => SynthSystem::Gs,
                };
                self.set_system(system);
                Ok(())
            }
            [UNIVERSAL_REALTIME, _, 0x04, 0x03, lsb, msb, ..] => {
                let value = ((*msb as i32) << 7) | *lsb as i32;
                let cents = ((value - 8192) as f32 / 81.92).floor();
                self.set_master_tuning(cents);
                Ok(())
            }
            [UNIVERSAL_REALTIME, _, 0x04, 0x04, _, msb, ..] => {
                self.set_master_tuning((*msb as f32 - 64.0) * 100.0);
                Ok(())
            }
            [ROLAND, _, 0x42, 0x12, ..] => self.roland_gs(data, channel_offset),
            [YAMAHA, _, 0x4C, ..] => self.yamaha_xg(data, channel_offset),
            _ => {
                tracing::warn!("Unrecognized SysEx: {}", describe(data));
                Ok(())
            }
        }
    }

    /// `41 dev 42 12 a1 a2 a3 value ... checksum`
    fn roland_gs(&mut self, data: &[u8], channel_offset: usize) -> Result<()> {
        let &[_, _, _, _, a1, a2, a3, value, ..] = data else {
            tracing::warn!("Truncated GS SysEx: {}", describe(data));
            return Ok(());
        };

        if a3 == 0x7F {
            // GS reset / system mode set
            self.reset_all_controllers()?;
            let system = if value == 0x7F { SynthSystem::Gm2 } else { SynthSystem::Gs };
            self.set_system(system);
            tracing::info!("GS reset, system {}", system);
            return Ok(());
        }

        if a1 == 0x40 && a2 & 0x10 != 0 {
            let channel = GS_PART_TO_CHANNEL[(a2 & 0x0F) as usize] + channel_offset;
            return match a3 {
                0x15 => self.set_drums(channel, value > 0),
                0x16 => self.transpose_channel(channel, value as f64 - 64.0, false),
                // 0 means random pan
                0x1C if value == 0 => Ok(()),
                0x1C => self.controller_change(channel, cc::PAN, value, false),
                0x21 => self.controller_change(channel, cc::CHORUS_DEPTH, value, false),
                0x22 => self.controller_change(channel, cc::REVERB_DEPTH, value, false),
                0x40..=0x4B => {
                    // scale tuning: one byte per note name, checksum last
                    let count = data.len().saturating_sub(8).min(12);
                    let mut tuning = [0i8; 12];
                    for (cents, byte) in tuning.iter_mut().zip(&data[7..7 + count]) {
                        *cents = *byte as i8 - 64;
                    }
                    self.set_octave_tuning(channel, &tuning)
                }
                _ => {
                    tracing::warn!("Unsupported GS part parameter: {}", describe(data));
                    Ok(())
                }
            };
        }

        if (a1, a2, a3) == (0x40, 0x00, 0x05) {
            // master key shift
            self.set_master_tuning((value as f32 - 64.0) * 100.0);
            return Ok(());
        }

        tracing::warn!("Unsupported GS SysEx: {}", describe(data));
        Ok(())
    }

    /// `43 dev 4C high mid low value`
    fn yamaha_xg(&mut self, data: &[u8], channel_offset: usize) -> Result<()> {
        let &[_, _, _, high, mid, low, value, ..] = data else {
            tracing::warn!("Truncated XG SysEx: {}", describe(data));
            return Ok(());
        };

        match (high, mid) {
            (0x00, 0x00) => {
                match low {
                    0x06 => self.transpose_all(value as f64 - 64.0)?,
                    0x7E => {
                        self.reset_all_controllers()?;
                        self.set_system(SynthSystem::Xg);
                        tracing::info!("XG system on");
                    }
                    _ => tracing::warn!("Unsupported XG system parameter: {}", describe(data)),
                }
                Ok(())
            }
            (0x08, part) if self.system() == SynthSystem::Xg => {
                let channel = part as usize + channel_offset;
                match low {
                    0x01 => self.controller_change(channel, cc::BANK_SELECT, value, false),
                    0x02 => self.controller_change(channel, cc::LSB_BANK_SELECT, value, false),
                    0x03 => self.program_change(channel, value),
                    0x08 => {
                        let target = self
                            .channels
                            .get_mut(channel)
                            .ok_or(crate::error::Error::InvalidChannel(channel))?;
                        if !target.is_drum() {
                            target.key_shift = value as i32 - 64;
                        }
                        Ok(())
                    }
                    0x0B => self.controller_change(channel, cc::MAIN_VOLUME, value, false),
                    0x0E if value == 0 => Ok(()),
                    0x0E => self.controller_change(channel, cc::PAN, value, false),
                    0x13 => self.controller_change(channel, cc::REVERB_DEPTH, value, false),
                    0x12 => self.controller_change(channel, cc::CHORUS_DEPTH, value, false),
                    _ => {
                        tracing::warn!("Unsupported XG part parameter: {}", describe(data));
                        Ok(())
                    }
                }
            }
            _ => {
                tracing::warn!("Unsupported XG SysEx: {}", describe(data));
                Ok(())
            }
        }
    }
}
