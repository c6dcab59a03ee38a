//! Connection block source, destination and transform numbers.

/// `CONN_SRC_*`
pub mod source {
    pub const NONE: u16 = 0x0000;
    pub const MOD_LFO: u16 = 0x0001;
    pub const VELOCITY: u16 = 0x0002;
    pub const KEY_NUM: u16 = 0x0003;
    pub const VOL_ENV: u16 = 0x0004;
    pub const MOD_ENV: u16 = 0x0005;
    pub const PITCH_WHEEL: u16 = 0x0006;
    pub const POLY_PRESSURE: u16 = 0x0007;
    pub const CHANNEL_PRESSURE: u16 = 0x0008;
    pub const VIBRATO_LFO: u16 = 0x0009;

    pub const MODULATION_WHEEL: u16 = 0x0081;
    pub const VOLUME: u16 = 0x0087;
    pub const PAN: u16 = 0x008A;
    pub const EXPRESSION: u16 = 0x008B;
    pub const REVERB: u16 = 0x00DB;
    pub const CHORUS: u16 = 0x00DD;

    pub const PITCH_WHEEL_RANGE: u16 = 0x0100;
    pub const FINE_TUNE: u16 = 0x0101;
    pub const COARSE_TUNE: u16 = 0x0102;
}

/// `CONN_DST_*`
pub mod destination {
    pub const NONE: u16 = 0x0000;
    pub const GAIN: u16 = 0x0001;
    pub const PITCH: u16 = 0x0003;
    pub const PAN: u16 = 0x0004;
    pub const KEY_NUM: u16 = 0x0005;

    pub const CHORUS_SEND: u16 = 0x0080;
    pub const REVERB_SEND: u16 = 0x0081;

    pub const MOD_LFO_FREQ: u16 = 0x0104;
    pub const MOD_LFO_DELAY: u16 = 0x0105;
    pub const VIB_LFO_FREQ: u16 = 0x0114;
    pub const VIB_LFO_DELAY: u16 = 0x0115;

    pub const VOL_ENV_ATTACK: u16 = 0x0206;
    pub const VOL_ENV_DECAY: u16 = 0x0207;
    pub const VOL_ENV_RELEASE: u16 = 0x0209;
    pub const VOL_ENV_SUSTAIN: u16 = 0x020A;
    pub const VOL_ENV_DELAY: u16 = 0x020B;
    pub const VOL_ENV_HOLD: u16 = 0x020C;

    pub const MOD_ENV_ATTACK: u16 = 0x030A;
    pub const MOD_ENV_DECAY: u16 = 0x030B;
    pub const MOD_ENV_RELEASE: u16 = 0x030D;
    pub const MOD_ENV_SUSTAIN: u16 = 0x030E;
    pub const MOD_ENV_DELAY: u16 = 0x030F;
    pub const MOD_ENV_HOLD: u16 = 0x0310;

    pub const FILTER_CUTOFF: u16 = 0x0500;
    pub const FILTER_Q: u16 = 0x0501;
}

/// Threshold below which a keyNum-to-envelope scale also shifts the base
/// envelope generator by `round(60/128 * value)`.
pub const KEY_TO_ENVELOPE_CORRECTION_LIMIT: f64 = 120.0;
