//! Kirkwood audio unit register map and bitfield definitions.
//!
//! All registers are 32 bits wide and live inside a 16 KiB register block.
//! Offsets are byte offsets from the start of that block.

// A few bitfields are defined for completeness (20-bit sizes, record mono
// channel select) but are not driven by the controller.
#![allow(dead_code)]

use core::fmt;

/// An addressable 32-bit hardware register: symbolic name plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    name: &'static str,
    offset: u16,
}

impl Register {
    /// Define a register at `offset` within the register block.
    pub const fn new(name: &'static str, offset: u16) -> Self {
        Self { name, offset }
    }

    /// Symbolic register name, as used in diagnostics.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Byte offset inside the register block.
    pub const fn offset(&self) -> u16 {
        self.offset
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#06x}", self.name, self.offset)
    }
}

/// Size of the register block that must be mapped for the controller.
pub const REGISTER_BLOCK_SIZE: usize = 16 * 1024;

// ── Record control ─────────────────────────────────────────────────────────

/// Record (capture) control.
/// - Bit 11   — SPDIF_EN
/// - Bit 10   — I2S_EN
/// - Bit  9   — PAUSE
/// - Bit  8   — MUTE
/// - Bits 6:5 — BURST (1=32 bytes, 2=128 bytes)
/// - Bit  4   — MONO
/// - Bit  3   — MONO_CHAN (0=left, 1=right)
/// - Bits 2:0 — SIZE
pub const RECCTL: Register = Register::new("RECCTL", 0x1000);

pub const RECCTL_SPDIF_EN: u32 = 1 << 11;
pub const RECCTL_I2S_EN: u32 = 1 << 10;
pub const RECCTL_PAUSE: u32 = 1 << 9;
pub const RECCTL_MUTE: u32 = 1 << 8;
pub const RECCTL_BURST_MASK: u32 = 3 << 5;
pub const RECCTL_BURST_128: u32 = 2 << 5;
pub const RECCTL_BURST_32: u32 = 1 << 5;
pub const RECCTL_MONO: u32 = 1 << 4;
pub const RECCTL_MONO_CHAN_RIGHT: u32 = 1 << 3;
pub const RECCTL_MONO_CHAN_LEFT: u32 = 0;
pub const RECCTL_SIZE_MASK: u32 = 7;
pub const RECCTL_SIZE_16: u32 = 7;
pub const RECCTL_SIZE_16_C: u32 = 3;
pub const RECCTL_SIZE_20: u32 = 2;
pub const RECCTL_SIZE_24: u32 = 1;
pub const RECCTL_SIZE_32: u32 = 0;

// ── Playback control ───────────────────────────────────────────────────────

/// Playback control.
/// - Bit 16    — PLAY_BUSY (read-only)
/// - Bits 12:11 — BURST (1=32 bytes, 2=128 bytes)
/// - Bit  9    — PAUSE
/// - Bit  8    — SPDIF_MUTE
/// - Bit  7    — I2S_MUTE
/// - Bits 6:5  — MONO (0=off, 3=mono duplicated on both channels)
/// - Bit  4    — SPDIF_EN
/// - Bit  3    — I2S_EN
/// - Bits 2:0  — SIZE
///
/// Must be read twice before it is changed.
pub const PLAYCTL: Register = Register::new("PLAYCTL", 0x1100);

pub const PLAYCTL_PLAY_BUSY: u32 = 1 << 16;
pub const PLAYCTL_BURST_MASK: u32 = 3 << 11;
pub const PLAYCTL_BURST_128: u32 = 2 << 11;
pub const PLAYCTL_BURST_32: u32 = 1 << 11;
pub const PLAYCTL_PAUSE: u32 = 1 << 9;
pub const PLAYCTL_SPDIF_MUTE: u32 = 1 << 8;
pub const PLAYCTL_I2S_MUTE: u32 = 1 << 7;
pub const PLAYCTL_MONO_MASK: u32 = 3 << 5;
pub const PLAYCTL_MONO_BOTH: u32 = 3 << 5;
pub const PLAYCTL_MONO_OFF: u32 = 0;
pub const PLAYCTL_SPDIF_EN: u32 = 1 << 4;
pub const PLAYCTL_I2S_EN: u32 = 1 << 3;
pub const PLAYCTL_SIZE_MASK: u32 = 7;
pub const PLAYCTL_SIZE_16: u32 = 7;
pub const PLAYCTL_SIZE_16_C: u32 = 3;
pub const PLAYCTL_SIZE_20: u32 = 2;
pub const PLAYCTL_SIZE_24: u32 = 1;
pub const PLAYCTL_SIZE_32: u32 = 0;

// ── Clocking ───────────────────────────────────────────────────────────────

/// Internal DCO control.
/// - Bits 13:2 — OFFSET (0x800 = zero offset)
/// - Bits  1:0 — FREQ (0=11.2896 MHz, 1=12.288 MHz, 2=24.576 MHz)
pub const DCO_CTL: Register = Register::new("DCO_CTL", 0x1204);

pub const DCO_CTL_OFFSET_MASK: u32 = 0xFFF << 2;
pub const DCO_CTL_OFFSET_0: u32 = 0x800 << 2;
pub const DCO_CTL_FREQ_MASK: u32 = 3;
pub const DCO_CTL_FREQ_11: u32 = 0;
pub const DCO_CTL_FREQ_12: u32 = 1;
pub const DCO_CTL_FREQ_24: u32 = 2;

/// DCO / SPCR status (read-only).
/// - Bit 16 — DCO_LOCK
pub const DCO_SPCR_STATUS: Register = Register::new("DCO_SPCR_STATUS", 0x120C);

pub const DCO_SPCR_STATUS_DCO_LOCK: u32 = 1 << 16;

/// Master clock source select.
/// - Bits 1:0 — MCLK_SOURCE (0=DCO, 3=external clock)
pub const CLOCKS_CTRL: Register = Register::new("CLOCKS_CTRL", 0x1230);

pub const MCLK_SOURCE_MASK: u32 = 3;
pub const MCLK_SOURCE_DCO: u32 = 0;
pub const MCLK_SOURCE_EXTCLK: u32 = 3;

// ── Interrupts ─────────────────────────────────────────────────────────────

/// Interrupt cause (write 1 to clear).
pub const INT_CAUSE: Register = Register::new("INT_CAUSE", 0x1308);

/// Interrupt mask (1 = enabled).
/// - Bit 14 — PLAY_BYTES (playback byte-count interrupt)
/// - Bit 13 — REC_BYTES (record byte-count interrupt)
pub const INT_MASK: Register = Register::new("INT_MASK", 0x130C);

pub const INT_CAUSE_ALL: u32 = 0xFFFF_FFFF;
pub const INT_CAUSE_PLAY_BYTES: u32 = 1 << 14;
pub const INT_CAUSE_REC_BYTES: u32 = 1 << 13;

// ── SPDIF ──────────────────────────────────────────────────────────────────

/// SPDIF playback control.
/// - Bit 17 — NON_PCM
/// - Bit 16 — REG_VALIDITY
/// - Bit  4 — FORCE_PARERR
/// - Bit  2 — MEM_USER_EN
/// - Bit  1 — MEM_VALIDITY_EN
/// - Bit  0 — BLOCK_START_MODE
pub const SPDIF_PLAYCTL: Register = Register::new("SPDIF_PLAYCTL", 0x2204);

pub const SPDIF_NON_PCM: u32 = 1 << 17;
pub const SPDIF_REG_VALIDITY: u32 = 1 << 16;
pub const SPDIF_FORCE_PARERR: u32 = 1 << 4;
pub const SPDIF_MEM_USER_EN: u32 = 1 << 2;
pub const SPDIF_MEM_VALIDITY_EN: u32 = 1 << 1;
pub const SPDIF_BLOCK_START_MODE: u32 = 1 << 0;

/// Number of 32-bit channel-status words per sub-frame copy.
pub const SPDIF_STATUS_WORDS: usize = 6;

const SPDIF_STATUS_L_NAMES: [&str; SPDIF_STATUS_WORDS] = [
    "SPDIF_STATUS0_L",
    "SPDIF_STATUS1_L",
    "SPDIF_STATUS2_L",
    "SPDIF_STATUS3_L",
    "SPDIF_STATUS4_L",
    "SPDIF_STATUS5_L",
];

const SPDIF_STATUS_R_NAMES: [&str; SPDIF_STATUS_WORDS] = [
    "SPDIF_STATUS0_R",
    "SPDIF_STATUS1_R",
    "SPDIF_STATUS2_R",
    "SPDIF_STATUS3_R",
    "SPDIF_STATUS4_R",
    "SPDIF_STATUS5_R",
];

/// Left (primary) channel-status word `n`.
///
/// # Panics
///
/// Panics if `n >= SPDIF_STATUS_WORDS`.
pub const fn spdif_status_left(n: usize) -> Register {
    Register::new(SPDIF_STATUS_L_NAMES[n], 0x2280 + 4 * n as u16)
}

/// Right (mirrored) channel-status word `n`.
///
/// # Panics
///
/// Panics if `n >= SPDIF_STATUS_WORDS`.
pub const fn spdif_status_right(n: usize) -> Register {
    Register::new(SPDIF_STATUS_R_NAMES[n], 0x22A0 + 4 * n as u16)
}

// ── I2S interface ──────────────────────────────────────────────────────────

/// I2S record control.
/// - Bits 31:30 — SIZE (0=32, 1=24, 2=20, 3=16 bit)
/// - Bits 29:26 — JUSTIFICATION (0=left, 5=I2S, 8=right)
pub const I2S_RECCTL: Register = Register::new("I2S_RECCTL", 0x2408);

/// I2S playback control. Same layout as [`I2S_RECCTL`].
pub const I2S_PLAYCTL: Register = Register::new("I2S_PLAYCTL", 0x2508);

pub const I2S_CTL_JUST_MASK: u32 = 0xF << 26;
pub const I2S_CTL_LJ: u32 = 0;
pub const I2S_CTL_I2S: u32 = 5 << 26;
pub const I2S_CTL_RJ: u32 = 8 << 26;
pub const I2S_CTL_SIZE_MASK: u32 = 3 << 30;
pub const I2S_CTL_SIZE_16: u32 = 3 << 30;
pub const I2S_CTL_SIZE_20: u32 = 2 << 30;
pub const I2S_CTL_SIZE_24: u32 = 1 << 30;
pub const I2S_CTL_SIZE_32: u32 = 0;
