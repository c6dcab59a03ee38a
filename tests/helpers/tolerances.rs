//! Tolerance constants for parameter assertions.
//!
//! Generator slots are integers, but they are computed through f32
//! modulator math and truncated, so comparisons against hand-computed
//! values need a little slack.

/// Integer generator slots (centibels, timecents, cents).
pub const GENERATOR_EPSILON: f32 = 0.5;

/// Normalized curve and transform outputs in [-1, 1].
pub const CURVE_EPSILON: f32 = 1e-4;

/// Tuning values in cents.
pub const CENTS_EPSILON: f32 = 0.01;
