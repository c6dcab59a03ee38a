//! Precomputed modulator source transforms.
//!
//! A modulator source maps a 14-bit controller value to a float through one
//! of four curves (linear, concave, convex, switch), optionally reversed
//! (negative direction) and optionally remapped to [-1, 1] (bipolar). All
//! 4 x 2 x 2 combinations are tabulated once, on first use, so evaluation
//! is a single lookup.

use std::sync::OnceLock;
use wavebank_soundbank::{CurveType, ModulatorSource};

/// Entries per transform table: one per 14-bit controller value.
pub const MOD_PRECOMPUTED_LENGTH: usize = 16384;

const N: usize = MOD_PRECOMPUTED_LENGTH;

/// Concave and convex shapes, `N + 1` points over [0, 1].
struct CurveShapes {
    concave: Vec<f32>,
    convex: Vec<f32>,
}

impl CurveShapes {
    fn build() -> Self {
        let mut concave = vec![0.0f32; N + 1];
        let mut convex = vec![0.0f32; N + 1];
        concave[N] = 1.0;
        convex[N] = 1.0;
        for i in 1..N {
            let x = (-200.0 * 2.0 / 960.0) * (i as f64 / N as f64).ln() / std::f64::consts::LN_10;
            convex[i] = (1.0 - x) as f32;
            concave[N - i] = x as f32;
        }
        Self { concave, convex }
    }
}

fn shapes() -> &'static CurveShapes {
    static SHAPES: OnceLock<CurveShapes> = OnceLock::new();
    SHAPES.get_or_init(CurveShapes::build)
}

fn lookup(table: &[f32], value: f64) -> f32 {
    let index = (value * N as f64) as usize;
    table[index.min(N)]
}

fn shaped(table: &[f32], value: f64, bipolar: bool) -> f32 {
    if !bipolar {
        return lookup(table, value);
    }
    let value = value * 2.0 - 1.0;
    if value < 0.0 {
        -lookup(table, -value)
    } else {
        lookup(table, value)
    }
}

/// Evaluate a source curve directly.
///
/// # Arguments
/// * `negative` - Reverse the input (`1 - value`) before shaping
/// * `curve` - Curve shape
/// * `value` - Normalized input in [0, 1]
/// * `bipolar` - Remap the output to [-1, 1]
pub fn curve_value(negative: bool, curve: CurveType, value: f64, bipolar: bool) -> f32 {
    let value = if negative { 1.0 - value } else { value };
    match curve {
        CurveType::Linear => {
            if bipolar {
                (value * 2.0 - 1.0) as f32
            } else {
                value as f32
            }
        }
        CurveType::Switch => {
            let value = if value > 0.5 { 1.0 } else { 0.0 };
            if bipolar {
                value * 2.0 - 1.0
            } else {
                value
            }
        }
        CurveType::Concave => shaped(&shapes().concave, value, bipolar),
        CurveType::Convex => shaped(&shapes().convex, value, bipolar),
    }
}

/// All 16 transforms, flattened as `[curve][bipolar][negative][value]`.
struct TransformTables {
    values: Vec<f32>,
}

impl TransformTables {
    fn build() -> Self {
        let mut values = Vec::with_capacity(16 * N);
        for curve in CurveType::ALL {
            for bipolar in [false, true] {
                for negative in [false, true] {
                    values.extend(
                        (0..N).map(|i| curve_value(negative, curve, i as f64 / N as f64, bipolar)),
                    );
                }
            }
        }
        Self { values }
    }

    #[inline]
    fn offset(curve: CurveType, bipolar: bool, negative: bool) -> usize {
        ((curve as usize * 2 + bipolar as usize) * 2 + negative as usize) * N
    }
}

fn tables() -> &'static TransformTables {
    static TABLES: OnceLock<TransformTables> = OnceLock::new();
    TABLES.get_or_init(TransformTables::build)
}

/// Transform a raw 14-bit source value through the source's curve.
#[inline]
pub fn transform(source: &ModulatorSource, raw: i32) -> f32 {
    let raw = raw.clamp(0, N as i32 - 1) as usize;
    let base = TransformTables::offset(source.curve, source.bipolar, source.negative);
    tables().values[base + raw]
}
