//! Bank select, program change and the drum flag.

use super::{ChannelContext, MidiChannel};
use crate::error::{Error, Result};
use crate::events::SynthEvent;
use std::sync::Arc;
use wavebank_core::{is_xg_drums, parse_bank_select, DrumStatus, DRUM_BANK};
use wavebank_soundbank::Preset;

impl MidiChannel {
    /// Handle a bank select MSB (CC0) or LSB (CC32) value.
    ///
    /// The value goes through the bank rules of the current system. An MSB
    /// may also switch the drum flag (XG and GM2), which reloads the preset.
    pub fn set_bank_select(&mut self, ctx: &mut ChannelContext<'_>, bank: u16, is_lsb: bool) -> Result<()> {
        if self.lock_preset {
            return Ok(());
        }
        let before = if is_lsb { self.bank_lsb } else { self.bank };
        let select = parse_bank_select(before, bank, ctx.system, is_lsb, self.drum, self.number);
        if is_lsb {
            self.bank_lsb = select.bank;
            return Ok(());
        }
        self.bank = select.bank;
        match select.drums {
            DrumStatus::Unchanged => Ok(()),
            DrumStatus::On => self.set_drums(ctx, true),
            DrumStatus::Off => self.set_drums(ctx, false),
        }
    }

    /// Bank a program change resolves against.
    ///
    /// Drum channels use bank 128 unless an XG drum bank is selected on an
    /// XG channel; melodic channels never look up bank 128.
    pub(crate) fn lookup_bank(&self, ctx: &ChannelContext<'_>) -> u16 {
        let bank = self.bank_select();
        if self.drum {
            if self.is_xg_channel(ctx.system) && is_xg_drums(bank) {
                bank
            } else {
                DRUM_BANK
            }
        } else if bank == DRUM_BANK {
            0
        } else {
            bank
        }
    }

    /// Select a new preset for the channel.
    ///
    /// The override bank is consulted first, without fallback; then the
    /// bank stack with fallback. A locked preset ignores the change.
    pub fn program_change(&mut self, ctx: &mut ChannelContext<'_>, program: u8) -> Result<()> {
        if self.lock_preset {
            return Ok(());
        }
        let bank = self.lookup_bank(ctx);
        let allow_xg = self.is_xg_channel(ctx.system);

        let from_override = ctx.override_bank.and_then(|ovr| {
            let local = if bank == DRUM_BANK {
                Some(bank)
            } else {
                bank.checked_sub(ovr.offset)
            };
            local
                .and_then(|b| ovr.bank.preset_no_fallback(b, program, allow_xg))
                .map(|p| (p, ovr.offset))
        });

        let (preset, offset) = match from_override {
            Some((preset, offset)) => (preset, Some(offset)),
            None => {
                let preset = ctx
                    .presets
                    .preset(bank, program, allow_xg)
                    .ok_or(Error::NoPreset { bank, program })?;
                (preset, None)
            }
        };
        self.apply_preset(ctx, preset, offset);
        Ok(())
    }

    fn apply_preset(&mut self, ctx: &mut ChannelContext<'_>, preset: Arc<Preset>, override_offset: Option<u16>) {
        self.preset_uses_override = override_offset.is_some();
        self.sent_bank = match override_offset {
            _ if preset.bank == DRUM_BANK => DRUM_BANK,
            Some(offset) => preset.bank.saturating_add(offset),
            None => preset.bank,
        };
        tracing::debug!(
            "Channel {} program {} -> {} ({}:{})",
            self.number,
            preset.program,
            preset.name,
            preset.bank,
            preset.program
        );
        ctx.events.emit(SynthEvent::ProgramChange {
            channel: self.number,
            program: preset.program,
            bank: self.sent_bank,
        });
        self.preset = Some(preset);
        self.send_property(ctx);
    }

    /// Turn the channel into a drum channel or back.
    ///
    /// Turning drums on clears the key shift. The current program is
    /// reloaded from the new bank.
    pub fn set_drums(&mut self, ctx: &mut ChannelContext<'_>, is_drum: bool) -> Result<()> {
        if self.lock_preset || self.drum == is_drum {
            return Ok(());
        }
        if is_drum {
            self.key_shift = 0;
        }
        self.drum = is_drum;
        self.preset_uses_override = false;
        tracing::info!("Channel {} is now a {} channel", self.number, if is_drum { "drum" } else { "melodic" });
        ctx.events.emit(SynthEvent::DrumChange {
            channel: self.number,
            is_drum,
        });
        let program = self.program();
        self.program_change(ctx, program)?;
        self.send_property(ctx);
        Ok(())
    }
}
