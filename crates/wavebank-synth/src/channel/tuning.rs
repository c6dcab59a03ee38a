//! Tuning, modulation depth, transposition and vibrato.

use super::{ChannelContext, ChannelVibrato, MidiChannel};
use crate::controllers::CustomController;

impl MidiChannel {
    pub fn set_custom_controller(&mut self, controller: CustomController, value: f32) {
        self.custom.set(controller, value);
        self.update_tuning();
    }

    /// Recompute the total channel tuning from the custom controllers.
    pub fn update_tuning(&mut self) {
        self.tuning_cents = self.custom.tuning_cents();
    }

    /// Channel fine tuning in cents, rounded to whole cents.
    pub fn set_tuning(&mut self, cents: f32) {
        let cents = cents.round();
        self.set_custom_controller(CustomController::ChannelTuning, cents);
        tracing::info!("Channel {} fine tuning: {} cents", self.number, cents);
    }

    /// Modulation wheel depth in cents. 50 cents is the neutral depth.
    pub fn set_modulation_depth(&mut self, cents: f32) {
        let cents = cents.round();
        tracing::info!("Channel {} modulation depth: {} cents", self.number, cents);
        self.set_custom_controller(CustomController::ModulationMultiplier, cents / 50.0);
    }

    /// Master tuning in cents, as set by SysEx.
    pub fn set_master_tuning(&mut self, cents: f32) {
        self.set_custom_controller(CustomController::MasterTuning, cents.round());
    }

    /// Transpose the channel by a (possibly fractional) number of semitones.
    ///
    /// The synth-wide transposition is added on melodic channels. The whole
    /// part shifts the keys, the rest becomes fine tuning. Drum channels are
    /// only transposed with `force`; changing the key shift releases the
    /// sounding notes.
    pub fn transpose(&mut self, ctx: &mut ChannelContext<'_>, semitones: f64, force: bool) {
        let semitones = if self.drum {
            semitones
        } else {
            semitones + ctx.transposition
        };
        let shift = semitones.trunc() as i32;
        let current = self.key_shift as f64 + self.custom.get(CustomController::TransposeFine) as f64 / 100.0;
        if (self.drum && !force) || semitones == current {
            return;
        }
        if shift != self.key_shift {
            self.stop_all(ctx, false);
        }
        self.key_shift = shift;
        self.set_custom_controller(
            CustomController::TransposeFine,
            ((semitones - shift as f64) * 100.0) as f32,
        );
        self.send_property(ctx);
    }

    /// Per-note-name tuning in cents, repeated over every octave.
    pub fn set_octave_tuning(&mut self, tuning: &[i8; 12]) {
        for (key, cents) in self.key_tuning.iter_mut().enumerate() {
            *cents = tuning[key % 12];
        }
    }

    /// Tuning of a single key in cents.
    pub fn set_key_tuning(&mut self, key: u8, cents: i8) {
        if let Some(slot) = self.key_tuning.get_mut(key as usize) {
            *slot = cents;
        }
    }

    pub fn set_vibrato(&mut self, vibrato: ChannelVibrato) {
        if self.lock_gs_nrpn {
            return;
        }
        self.vibrato = vibrato;
    }

    /// Turn the channel vibrato off and ignore the GS vibrato NRPNs.
    pub fn disable_and_lock_gs_nrpn(&mut self) {
        self.lock_gs_nrpn = true;
        self.vibrato = ChannelVibrato::default();
    }

    pub(crate) fn set_vibrato_lock(&mut self, locked: bool) {
        self.lock_gs_nrpn = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::Harness;
    use super::*;

    #[test]
    fn test_tuning_sum() {
        let mut channel = MidiChannel::new(0, false);
        channel.set_tuning(10.4);
        channel.set_master_tuning(-3.0);
        channel.set_custom_controller(CustomController::TuningSemitones, 1.0);
        assert_eq!(channel.custom_controller(CustomController::ChannelTuning), 10.0);
        assert_eq!(channel.tuning_cents(), 107.0);
    }

    #[test]
    fn test_modulation_depth_multiplier() {
        let mut channel = MidiChannel::new(0, false);
        channel.set_modulation_depth(25.0);
        assert_eq!(channel.custom_controller(CustomController::ModulationMultiplier), 0.5);
    }

    #[test]
    fn test_fractional_transpose() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.transpose(&mut h.ctx(), 2.5, false);
        assert_eq!(channel.key_shift(), 2);
        assert_eq!(channel.custom_controller(CustomController::TransposeFine), 50.0);
        assert_eq!(channel.property().transposition, 2.5);
    }

    #[test]
    fn test_transpose_releases_on_shift_change() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        channel.note_on(&mut h.ctx(), 60, 100).unwrap();
        channel.transpose(&mut h.ctx(), 0.3, false);
        assert!(!channel.voices()[0].is_in_release);
        channel.transpose(&mut h.ctx(), -1.0, false);
        assert!(channel.voices()[0].is_in_release);
        assert_eq!(channel.key_shift(), -1);
    }

    #[test]
    fn test_drum_transpose_needs_force() {
        let mut h = Harness::new();
        let mut channel = h.channel(9);
        channel.transpose(&mut h.ctx(), 3.0, false);
        assert_eq!(channel.key_shift(), 0);
        channel.transpose(&mut h.ctx(), 3.0, true);
        assert_eq!(channel.key_shift(), 3);
    }

    #[test]
    fn test_synth_transposition_added() {
        let mut h = Harness::new();
        let mut channel = h.channel(0);
        let mut ctx = h.ctx();
        ctx.transposition = 12.0;
        channel.transpose(&mut ctx, 1.0, false);
        assert_eq!(channel.key_shift(), 13);
    }

    #[test]
    fn test_octave_tuning() {
        let mut channel = MidiChannel::new(0, false);
        let mut tuning = [0i8; 12];
        tuning[4] = -14;
        channel.set_octave_tuning(&tuning);
        assert_eq!(channel.key_tuning()[64], -14);
        assert_eq!(channel.key_tuning()[4], -14);
        assert_eq!(channel.key_tuning()[65], 0);
        channel.set_key_tuning(65, 7);
        assert_eq!(channel.key_tuning()[65], 7);
    }

    #[test]
    fn test_vibrato_lock() {
        let mut channel = MidiChannel::new(0, false);
        channel.set_vibrato(ChannelVibrato::GS_DEFAULT);
        assert_eq!(channel.vibrato(), ChannelVibrato::GS_DEFAULT);
        channel.disable_and_lock_gs_nrpn();
        assert!(channel.vibrato().is_off());
        channel.set_vibrato(ChannelVibrato::GS_DEFAULT);
        assert!(channel.vibrato().is_off());
        assert!(channel.is_vibrato_locked());
    }
}
