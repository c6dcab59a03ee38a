//! MIDI system modes and the bank-select rules that depend on them.
//!
//! GM, GS, XG and GM2 disagree on how bank select MSB/LSB are interpreted
//! and on how a part becomes a drum part:
//!
//! | System | Bank MSB | Bank LSB | Drums |
//! |--------|----------|----------|-------|
//! | GM     | ignored  | ignored  | channel 9 only |
//! | GS     | accepted | ignored  | SysEx only |
//! | XG     | {64, 120, 126, 127} only | accepted unless it is a valid MSB | MSB 120/126/127 |
//! | GM2    | accepted | accepted | MSB 120 |

use serde::{Deserialize, Serialize};

/// Percussion channel in the default GM assignment (0-indexed).
pub const DEFAULT_PERCUSSION: usize = 9;

/// Bank number that SoundFont uses for percussion presets.
pub const DRUM_BANK: u16 = 128;

/// MIDI system mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum SynthSystem {
    /// General MIDI level 1
    Gm,
    /// General MIDI level 2
    Gm2,
    /// Roland GS
    #[default]
    Gs,
    /// Yamaha XG
    Xg,
}

impl SynthSystem {
    /// Short lowercase name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SynthSystem::Gm => "gm",
            SynthSystem::Gm2 => "gm2",
            SynthSystem::Gs => "gs",
            SynthSystem::Xg => "xg",
        }
    }
}

impl core::fmt::Display for SynthSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a bank select did to the drum flag of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrumStatus {
    #[default]
    Unchanged,
    Off,
    On,
}

/// Result of [`parse_bank_select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSelect {
    pub bank: u16,
    pub drums: DrumStatus,
}

/// XG drum banks: 120, 126 and 127.
#[inline]
pub fn is_xg_drums(bank: u16) -> bool {
    bank == 120 || bank == 126 || bank == 127
}

/// MSB values XG accepts. 64 is the SFX bank.
#[inline]
pub fn is_valid_xg_msb(bank: u16) -> bool {
    is_xg_drums(bank) || bank == 64
}

/// Interpret a bank select message.
///
/// # Arguments
/// * `bank_before` - Bank the channel currently holds
/// * `bank` - Value carried by the CC 0 / CC 32 message
/// * `is_lsb` - True for CC 32
/// * `is_drums` - Current drum flag of the channel
/// * `channel` - Channel number, used for the channel 9 rule
pub fn parse_bank_select(
    bank_before: u16,
    bank: u16,
    system: SynthSystem,
    is_lsb: bool,
    is_drums: bool,
    channel: usize,
) -> BankSelect {
    let mut out = bank_before;
    let mut drums = DrumStatus::Unchanged;
    let on_percussion_channel = channel % 16 == DEFAULT_PERCUSSION;

    if is_lsb {
        match system {
            SynthSystem::Xg if !is_valid_xg_msb(bank) => out = bank,
            SynthSystem::Gm2 => out = bank,
            _ => {}
        }
        return BankSelect { bank: out, drums };
    }

    let can_set = match system {
        SynthSystem::Gm => {
            tracing::info!("Ignoring the Bank Select ({}), as the synth is in GM mode", bank);
            false
        }
        SynthSystem::Xg => {
            if is_xg_drums(bank) {
                drums = DrumStatus::On;
            } else if !on_percussion_channel {
                drums = DrumStatus::Off;
            }
            is_valid_xg_msb(bank)
        }
        SynthSystem::Gm2 => {
            if bank == 120 {
                drums = DrumStatus::On;
            } else if !on_percussion_channel {
                drums = DrumStatus::Off;
            }
            true
        }
        SynthSystem::Gs => true,
    };

    let mut bank = bank;
    if is_drums {
        bank = DRUM_BANK;
    }
    if bank == DRUM_BANK && !is_drums {
        bank = bank_before;
    }
    if can_set {
        out = bank;
    }
    BankSelect { bank: out, drums }
}

/// Pick the effective bank from an MSB/LSB pair.
///
/// The LSB wins when it is non-zero, unless the MSB already names an XG
/// drum or SFX bank.
#[inline]
pub fn choose_bank(msb: u16, lsb: u16) -> u16 {
    if lsb > 0 && !is_valid_xg_msb(msb) {
        lsb
    } else {
        msb
    }
}
