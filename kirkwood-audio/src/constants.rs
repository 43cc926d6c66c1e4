/// Master clock requested from an external reference, as a multiple of Fs.
pub const MCLK_RATIO: u32 = 256;

/// Sample rates the internal DCO can generate, in Hz.
pub const DCO_RATES: [u32; 3] = [44_100, 48_000, 96_000];

/// Rate range advertised once a distinct external clock is found, in Hz.
pub const EXTCLK_RATE_MIN: u32 = 8_000;
pub const EXTCLK_RATE_MAX: u32 = 192_000;

/// Playback channel ceiling with an external clock.
pub const EXTCLK_MAX_PLAYBACK_CHANNELS: u8 = 8;

/// Default bound on the DCO lock wait (100 ms).
pub const DEFAULT_DCO_LOCK_TIMEOUT_US: u32 = 100_000;

/// Interval between DCO status polls.
pub const DCO_POLL_INTERVAL_US: u32 = 1;
