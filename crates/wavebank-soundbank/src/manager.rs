//! Sound bank stack and preset resolution.

use crate::preset::Preset;
use crate::soundbank::SoundBank;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use wavebank_core::{is_xg_drums, DRUM_BANK};

/// Preset lookup seam used by the channel state machine.
pub trait PresetSource {
    /// Resolve (bank, program) with fallback. `None` only when nothing at
    /// all can be played.
    fn preset(&self, bank: u16, program: u8, allow_xg_drums: bool) -> Option<Arc<Preset>>;
}

/// One bank of the stack.
#[derive(Debug, Clone)]
pub struct BankEntry {
    pub id: String,
    /// Added to the bank numbers of this bank's presets.
    pub bank_offset: u16,
    pub bank: Arc<SoundBank>,
}

/// Entry of the merged preset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetListEntry {
    pub name: String,
    pub bank: u16,
    pub program: u8,
}

/// Ordered stack of sound banks. Earlier banks shadow later ones.
///
/// Resolutions are cached in a [`DashMap`] keyed by
/// `(bank, program, allow_xg_drums)`; any change to the stack clears it.
#[derive(Debug, Default)]
pub struct SoundBankManager {
    banks: Vec<BankEntry>,
    preset_list: Vec<PresetListEntry>,
    cache: DashMap<(u16, u8, bool), Arc<Preset>>,
}

impl SoundBankManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager holding a single bank with id "main".
    pub fn with_bank(bank: SoundBank) -> Self {
        let mut manager = Self::new();
        manager.reload(bank);
        manager
    }

    /// Replace the whole stack with one bank.
    pub fn reload(&mut self, bank: SoundBank) {
        self.banks.clear();
        self.banks.push(BankEntry {
            id: "main".to_string(),
            bank_offset: 0,
            bank: Arc::new(bank),
        });
        self.changed();
    }

    /// Append a bank. Returns false (and changes nothing) if the id exists.
    pub fn add(&mut self, id: impl Into<String>, bank: SoundBank, bank_offset: u16) -> bool {
        let id = id.into();
        if self.banks.iter().any(|b| b.id == id) {
            tracing::warn!("Sound bank '{}' already exists", id);
            return false;
        }
        self.banks.push(BankEntry {
            id,
            bank_offset,
            bank: Arc::new(bank),
        });
        self.changed();
        true
    }

    /// Remove a bank. The last bank is never removed.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.banks.len() <= 1 {
            tracing::warn!("1 sound bank left. Not deleting '{}'", id);
            return false;
        }
        let Some(index) = self.banks.iter().position(|b| b.id == id) else {
            tracing::warn!("No sound bank with id '{}'", id);
            return false;
        };
        self.banks.remove(index);
        self.changed();
        true
    }

    /// Reorder the stack by the given id order. Unknown ids sort first.
    pub fn rearrange(&mut self, order: &[&str]) {
        let rank = |id: &str| order.iter().position(|o| *o == id);
        self.banks.sort_by_key(|b| rank(&b.id));
        self.changed();
    }

    pub fn banks(&self) -> &[BankEntry] {
        &self.banks
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    /// Merged (bank, program) list across the stack, with offsets applied.
    pub fn preset_list(&self) -> &[PresetListEntry] {
        &self.preset_list
    }

    fn changed(&mut self) {
        self.cache.clear();
        // walk from the lowest priority so that earlier banks overwrite
        let mut merged: BTreeMap<(u16, u8), String> = BTreeMap::new();
        for entry in self.banks.iter().rev() {
            for p in entry.bank.presets() {
                merged.insert((p.bank.saturating_add(entry.bank_offset), p.program), p.name.clone());
            }
        }
        self.preset_list = merged
            .into_iter()
            .map(|((bank, program), name)| PresetListEntry { name, bank, program })
            .collect();
    }

    fn resolve(&self, bank: u16, program: u8, allow_xg: bool) -> Option<Arc<Preset>> {
        for entry in &self.banks {
            let Some(local) = bank.checked_sub(entry.bank_offset) else {
                continue;
            };
            if let Some(p) = entry.bank.preset_no_fallback(local, program, allow_xg) {
                return Some(p);
            }
        }

        let is_drum = bank == DRUM_BANK || (allow_xg && is_xg_drums(bank));
        let found = if is_drum {
            self.banks.iter().find_map(|b| {
                let list = b.bank.presets();
                list.iter()
                    .find(|p| p.is_drum_preset(allow_xg) && p.program == program)
                    .or_else(|| list.iter().find(|p| p.is_drum_preset(allow_xg)))
            })
        } else {
            self.banks
                .iter()
                .flat_map(|b| b.bank.presets().iter())
                .find(|p| p.program == program && !p.is_drum_preset(allow_xg))
        };
        let found = found
            .or_else(|| self.banks.first().and_then(|b| b.bank.presets().first()))
            .cloned();
        if let Some(p) = &found {
            tracing::warn!(
                "Preset {}.{} not found. Replaced with {} ({}.{})",
                bank,
                program,
                p.name,
                p.bank,
                p.program
            );
        }
        found
    }
}

impl PresetSource for SoundBankManager {
    fn preset(&self, bank: u16, program: u8, allow_xg_drums: bool) -> Option<Arc<Preset>> {
        let key = (bank, program, allow_xg_drums);
        if let Some(hit) = self.cache.get(&key) {
            return Some(Arc::clone(hit.value()));
        }
        let found = self.resolve(bank, program, allow_xg_drums)?;
        self.cache.insert(key, Arc::clone(&found));
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulator::default_modulators;

    fn bank(entries: &[(u16, u8, &str)]) -> SoundBank {
        SoundBank::from_presets(
            entries
                .iter()
                .map(|(bank, program, name)| {
                    Arc::new(Preset::new(*name, *program, *bank, Vec::new(), default_modulators().into()))
                })
                .collect(),
        )
    }

    #[test]
    fn test_manager_creation() {
        let manager = SoundBankManager::new();
        assert!(manager.is_empty());
        assert!(manager.preset(0, 0, false).is_none());
    }

    #[test]
    fn test_exact_match_and_offsets() {
        let mut manager = SoundBankManager::with_bank(bank(&[(0, 0, "Piano"), (128, 0, "Drums")]));
        assert!(manager.add("extra", bank(&[(0, 0, "Other Piano"), (1, 5, "Pad")]), 10));
        assert!(!manager.add("extra", bank(&[]), 0));

        assert_eq!(manager.preset(0, 0, false).unwrap().name, "Piano");
        assert_eq!(manager.preset(11, 5, false).unwrap().name, "Pad");
        assert_eq!(manager.preset(10, 0, false).unwrap().name, "Other Piano");
    }

    #[test]
    fn test_fallback_chain() {
        let manager = SoundBankManager::with_bank(bank(&[
            (0, 0, "Piano"),
            (0, 16, "Organ"),
            (128, 0, "Standard"),
            (128, 25, "Jazz"),
        ]));
        // melodic: same program, any melodic bank
        assert_eq!(manager.preset(7, 16, false).unwrap().name, "Organ");
        // drums: same program first, then any drum preset
        assert_eq!(manager.preset(128, 25, false).unwrap().name, "Jazz");
        assert_eq!(manager.preset(128, 40, false).unwrap().name, "Standard");
        // XG drum bank resolves through bank 128
        assert_eq!(manager.preset(127, 25, true).unwrap().name, "Jazz");
        // nothing matches: first preset
        assert_eq!(manager.preset(3, 99, false).unwrap().name, "Piano");
    }

    #[test]
    fn test_stack_changes_invalidate_cache() {
        let mut manager = SoundBankManager::with_bank(bank(&[(0, 0, "A")]));
        assert!(manager.add("b", bank(&[(0, 0, "B")]), 0));
        assert_eq!(manager.preset(0, 0, false).unwrap().name, "A");

        manager.rearrange(&["b", "main"]);
        assert_eq!(manager.preset(0, 0, false).unwrap().name, "B");
        assert_eq!(manager.preset_list()[0].name, "B");

        assert!(manager.delete("b"));
        assert!(!manager.delete("main"));
        assert_eq!(manager.preset(0, 0, false).unwrap().name, "A");
    }
}
