//! Portamento time (CC5) to glide duration.
//!
//! CC5 has no standard time scale. The points below were measured on a
//! Roland SC-55; values between them are linearly interpolated. The glide
//! length grows with the interval, normalized to 30 semitones.
//!
//! # Example
//!
//! ```ignore
//! use wavebank_synth::portamento::portamento_time_to_seconds;
//!
//! // CC5 = 64, gliding one octave
//! let seconds = portamento_time_to_seconds(64, 12);
//! assert!((seconds - 2.06 * 12.0 / 30.0).abs() < 1e-9);
//! ```

/// Measured (CC5 value, seconds) points, ascending.
const PORTAMENTO_LOOKUP: [(u8, f64); 15] = [
    (0, 0.0),
    (1, 0.006),
    (2, 0.023),
    (4, 0.05),
    (8, 0.11),
    (16, 0.25),
    (32, 0.5),
    (64, 2.06),
    (80, 4.2),
    (96, 8.4),
    (112, 19.5),
    (116, 26.7),
    (120, 40.0),
    (124, 80.0),
    (127, 480.0),
];

/// Interval (in keys) the lookup times correspond to.
const REFERENCE_DISTANCE: f64 = 30.0;

/// Seconds for a CC5 value, before the distance scaling.
fn lookup(time: u8) -> f64 {
    let upper = PORTAMENTO_LOOKUP.partition_point(|(v, _)| *v < time);
    match PORTAMENTO_LOOKUP.get(upper) {
        Some((v, seconds)) if *v == time => *seconds,
        Some((hi, hi_time)) if upper > 0 => {
            let (lo, lo_time) = PORTAMENTO_LOOKUP[upper - 1];
            lo_time + (time - lo) as f64 * (hi_time - lo_time) / (*hi - lo) as f64
        }
        _ => 0.0,
    }
}

/// Glide duration in seconds for a CC5 value and an interval in keys.
pub fn portamento_time_to_seconds(time: u8, distance: u8) -> f64 {
    lookup(time) * (distance as f64 / REFERENCE_DISTANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_table_points() {
        assert_eq!(lookup(0), 0.0);
        assert_eq!(lookup(64), 2.06);
        assert_eq!(lookup(127), 480.0);
    }

    #[test]
    fn test_interpolation() {
        // halfway between 32 (0.5 s) and 64 (2.06 s)
        assert_relative_eq!(lookup(48), 1.28, epsilon = 1e-9);
        assert_relative_eq!(lookup(3), 0.0365, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_table() {
        assert_eq!(lookup(200), 0.0);
    }

    #[test]
    fn test_distance_scaling() {
        assert_relative_eq!(portamento_time_to_seconds(64, 30), 2.06, epsilon = 1e-9);
        assert_relative_eq!(portamento_time_to_seconds(64, 15), 1.03, epsilon = 1e-9);
        assert_eq!(portamento_time_to_seconds(64, 0), 0.0);
    }

    #[test]
    fn test_monotonic() {
        let mut last = 0.0;
        for time in 0..=127u8 {
            let seconds = lookup(time);
            assert!(seconds >= last);
            last = seconds;
        }
    }
}
