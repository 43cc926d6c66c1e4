//! Stream format negotiation.
//!
//! [`FormatNegotiator`] turns a requested stream format into register
//! deltas without touching the hardware. The sample size field lives in two
//! places (the per-direction I2S control register and the play/record
//! control register) and the hardware requires both to carry the same size.

use crate::bus::RegisterFile;
use crate::error::FormatError;
use crate::registers::{self as reg, Register};

/// Stream direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Playback,
    Capture,
}

impl Direction {
    /// Per-direction I2S control register.
    pub const fn i2s_ctl(self) -> Register {
        match self {
            Direction::Playback => reg::I2S_PLAYCTL,
            Direction::Capture => reg::I2S_RECCTL,
        }
    }

    /// Play/record control register.
    pub const fn stream_ctl(self) -> Register {
        match self {
            Direction::Playback => reg::PLAYCTL,
            Direction::Capture => reg::RECCTL,
        }
    }
}

/// Sample container width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    S16,
    S24,
    S32,
}

impl SampleWidth {
    /// Width from a bit count (16, 24 or 32).
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            16 => Some(SampleWidth::S16),
            24 => Some(SampleWidth::S24),
            32 => Some(SampleWidth::S32),
            _ => None,
        }
    }

    /// Width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            SampleWidth::S16 => 16,
            SampleWidth::S24 => 24,
            SampleWidth::S32 => 32,
        }
    }
}

/// Sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Linear PCM.
    Pcm,
    /// Pre-formatted IEC958 sub-frames, sent over SPDIF only.
    Iec958Subframe,
}

/// A requested stream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub width: SampleWidth,
    /// 1 or 2 for the negotiator; wider layouts need an external clock.
    pub channels: u8,
    pub encoding: Encoding,
}

impl StreamFormat {
    /// Linear PCM stream.
    pub const fn pcm(width: SampleWidth, channels: u8) -> Self {
        Self {
            width,
            channels,
            encoding: Encoding::Pcm,
        }
    }

    /// Stereo IEC958 sub-frame stream.
    pub const fn iec958() -> Self {
        Self {
            width: SampleWidth::S16,
            channels: 2,
            encoding: Encoding::Iec958Subframe,
        }
    }
}

/// Serial data justification, shared by playback and record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaiFormat {
    I2s,
    LeftJustified,
    RightJustified,
    /// DSP/PCM modes; not supported by the audio unit.
    DspA,
    DspB,
}

/// One masked field update of a single register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldUpdate {
    pub register: Register,
    pub mask: u32,
    pub bits: u32,
}

impl FieldUpdate {
    /// Read-modify-write the field once.
    pub fn apply<R: RegisterFile>(&self, regs: &mut R) -> u32 {
        regs.modify(self.register, self.bits, self.mask)
    }
}

/// Output paths a stream will enable on Start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPaths {
    pub i2s: bool,
    pub spdif: bool,
}

/// Register changes computed by [`FormatNegotiator::negotiate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDeltas {
    /// Size field of the per-direction I2S control register.
    pub i2s_ctl: FieldUpdate,
    /// Size (and, for playback, mono) fields of the play/record control register.
    pub stream_ctl: FieldUpdate,
    pub paths: DataPaths,
}

impl RegisterDeltas {
    /// Write both registers, each with a single read-modify-write.
    pub fn apply<R: RegisterFile>(&self, regs: &mut R) {
        self.i2s_ctl.apply(regs);
        self.stream_ctl.apply(regs);
    }
}

/// Computes register deltas for stream formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatNegotiator;

impl FormatNegotiator {
    /// Resolve `format` for `direction`.
    pub fn negotiate(
        &self,
        direction: Direction,
        format: StreamFormat,
    ) -> Result<RegisterDeltas, FormatError> {
        let mut paths = DataPaths {
            i2s: true,
            spdif: direction == Direction::Playback,
        };

        let (i2s_size, ctl_size) = match (format.encoding, format.width) {
            (Encoding::Pcm, SampleWidth::S16) => (reg::I2S_CTL_SIZE_16, reg::PLAYCTL_SIZE_16_C),
            (Encoding::Pcm, SampleWidth::S24) => (reg::I2S_CTL_SIZE_24, reg::PLAYCTL_SIZE_24),
            (Encoding::Pcm, SampleWidth::S32) => {
                // SPDIF framing cannot carry 32-bit samples.
                paths.spdif = false;
                (reg::I2S_CTL_SIZE_32, reg::PLAYCTL_SIZE_32)
            }
            (Encoding::Iec958Subframe, SampleWidth::S16) => {
                if direction == Direction::Capture {
                    return Err(FormatError::InvalidFormat);
                }
                paths.i2s = false;
                (reg::I2S_CTL_SIZE_16, reg::PLAYCTL_SIZE_16_C)
            }
            (Encoding::Iec958Subframe, _) => return Err(FormatError::InvalidFormat),
        };

        // RECCTL shares the PLAYCTL size layout.
        let mut stream_ctl = FieldUpdate {
            register: direction.stream_ctl(),
            mask: reg::PLAYCTL_SIZE_MASK,
            bits: ctl_size,
        };
        if direction == Direction::Playback {
            stream_ctl.mask |= reg::PLAYCTL_MONO_MASK;
            stream_ctl.bits |= match format.channels {
                1 => reg::PLAYCTL_MONO_BOTH,
                _ => reg::PLAYCTL_MONO_OFF,
            };
        }

        Ok(RegisterDeltas {
            i2s_ctl: FieldUpdate {
                register: direction.i2s_ctl(),
                mask: reg::I2S_CTL_SIZE_MASK,
                bits: i2s_size,
            },
            stream_ctl,
            paths,
        })
    }

    /// Justification updates for both I2S control registers.
    pub fn justification(&self, fmt: DaiFormat) -> Result<[FieldUpdate; 2], FormatError> {
        let bits = match fmt {
            DaiFormat::I2s => reg::I2S_CTL_I2S,
            DaiFormat::LeftJustified => reg::I2S_CTL_LJ,
            DaiFormat::RightJustified => reg::I2S_CTL_RJ,
            DaiFormat::DspA | DaiFormat::DspB => return Err(FormatError::InvalidFormat),
        };
        Ok([Direction::Playback, Direction::Capture].map(|direction| FieldUpdate {
            register: direction.i2s_ctl(),
            mask: reg::I2S_CTL_JUST_MASK,
            bits,
        }))
    }
}
