//! IEC958 channel-status codec.
//!
//! The 24 channel-status bytes are held in six 32-bit words, little-endian:
//! word `n` carries bytes `4n..4n+3` with byte `4n` in bits 7:0. The
//! hardware keeps a second copy of every word for the right sub-frame.

use log::trace;

use crate::bus::RegisterFile;
use crate::registers::{self as reg, SPDIF_STATUS_WORDS};

/// Number of channel-status bytes per IEC958 block.
pub const CHANNEL_STATUS_LEN: usize = 24;

/// Byte 0, bit 0: professional (AES3) rather than consumer format.
pub const AES0_PROFESSIONAL: u8 = 1 << 0;
/// Byte 0, bit 1: payload is not linear PCM.
pub const AES0_NONAUDIO: u8 = 1 << 1;

/// IEC958 channel-status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStatus(pub [u8; CHANNEL_STATUS_LEN]);

impl ChannelStatus {
    pub const fn new(bytes: [u8; CHANNEL_STATUS_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; CHANNEL_STATUS_LEN] {
        &self.0
    }

    pub const fn is_professional(&self) -> bool {
        self.0[0] & AES0_PROFESSIONAL != 0
    }

    pub const fn is_non_audio(&self) -> bool {
        self.0[0] & AES0_NONAUDIO != 0
    }

    /// The block packed into its six register words.
    pub fn words(&self) -> [u32; SPDIF_STATUS_WORDS] {
        let b = &self.0;
        core::array::from_fn(|n| {
            u32::from_le_bytes([b[4 * n], b[4 * n + 1], b[4 * n + 2], b[4 * n + 3]])
        })
    }

    fn set_word(&mut self, n: usize, value: u32) {
        self.0[4 * n..4 * n + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl From<[u8; CHANNEL_STATUS_LEN]> for ChannelStatus {
    fn from(bytes: [u8; CHANNEL_STATUS_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ChannelStatus> for [u8; CHANNEL_STATUS_LEN] {
    fn from(status: ChannelStatus) -> Self {
        status.0
    }
}

/// Read the channel status from the left status words.
pub fn decode<R: RegisterFile>(regs: &mut R) -> ChannelStatus {
    let mut status = ChannelStatus::default();
    for n in 0..SPDIF_STATUS_WORDS {
        status.set_word(n, regs.read(reg::spdif_status_left(n)));
    }
    trace!("iec958 status read: {:02x?}", &status.0[..4]);
    status
}

/// Write `status` to both status-word copies.
///
/// The SPDIF playback control's non-PCM and register-validity bits are
/// updated from the non-audio flag first; every other control bit is kept.
/// Returns whether the control register value changed.
pub fn encode<R: RegisterFile>(regs: &mut R, status: &ChannelStatus) -> bool {
    trace!(
        "iec958 status write: {:02x?} ({}, non-audio={})",
        &status.0[..4],
        if status.is_professional() { "pro" } else { "con" },
        u8::from(status.is_non_audio()),
    );

    let flags = if status.is_non_audio() {
        reg::SPDIF_NON_PCM | reg::SPDIF_REG_VALIDITY
    } else {
        0
    };
    let old = regs.read(reg::SPDIF_PLAYCTL);
    let new = (old & !(reg::SPDIF_NON_PCM | reg::SPDIF_REG_VALIDITY)) | flags;
    regs.write(reg::SPDIF_PLAYCTL, new);

    for (n, word) in status.words().into_iter().enumerate() {
        regs.write(reg::spdif_status_left(n), word);
        regs.write(reg::spdif_status_right(n), word);
    }
    old != new
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRegs;

    fn ramp() -> ChannelStatus {
        ChannelStatus(core::array::from_fn(|i| (i as u8) * 11 + 1))
    }

    #[test]
    fn decode_unpacks_little_endian() {
        let mut regs = MockRegs::new();
        regs.set_reg(reg::spdif_status_left(0), 0x4433_2211);
        regs.set_reg(reg::spdif_status_left(5), 0xDDCC_BBAA);
        // Right copies are not consulted.
        regs.set_reg(reg::spdif_status_right(0), 0xFFFF_FFFF);

        let status = decode(&mut regs);

        assert_eq!(&status.0[..4], &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(&status.0[4..20], &[0u8; 16]);
        assert_eq!(&status.0[20..], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(regs.write_count(), 0);
    }

    #[test]
    fn encode_writes_both_copies() {
        let mut regs = MockRegs::new();
        let status = ramp();

        encode(&mut regs, &status);

        // Control register first, then left/right pairs.
        assert_eq!(regs.write_count(), 1 + 2 * SPDIF_STATUS_WORDS);
        assert_eq!(regs.write_at(0).0, reg::SPDIF_PLAYCTL);
        for (n, word) in status.words().into_iter().enumerate() {
            assert_eq!(regs.write_at(1 + 2 * n), (reg::spdif_status_left(n), word));
            assert_eq!(regs.write_at(2 + 2 * n), (reg::spdif_status_right(n), word));
        }
        // Bytes 4..8 are 45, 56, 67, 78.
        assert_eq!(regs.read_reg(reg::spdif_status_left(1)), 0x4E43_382D);
    }

    #[test]
    fn words_pack_little_endian() {
        let words = ramp().words();
        assert_eq!(words.len(), SPDIF_STATUS_WORDS);
        assert_eq!(words[0], 0x2217_0C01);
        assert_eq!(words[1], 0x4E43_382D);
        assert_eq!(words[5], u32::from_le_bytes([221, 232, 243, 254]));
    }

    #[test]
    fn round_trip() {
        let mut regs = MockRegs::new();
        let status = ramp();
        encode(&mut regs, &status);
        assert_eq!(decode(&mut regs), status);
    }

    #[test]
    fn non_audio_sets_control_bits_and_preserves_others() {
        let mut regs = MockRegs::new();
        regs.set_reg(reg::SPDIF_PLAYCTL, reg::SPDIF_MEM_USER_EN | reg::SPDIF_BLOCK_START_MODE);
        let mut status = ChannelStatus::default();
        status.0[0] = AES0_NONAUDIO;

        assert!(encode(&mut regs, &status));
        assert_eq!(
            regs.read_reg(reg::SPDIF_PLAYCTL),
            reg::SPDIF_MEM_USER_EN
                | reg::SPDIF_BLOCK_START_MODE
                | reg::SPDIF_NON_PCM
                | reg::SPDIF_REG_VALIDITY
        );

        // Same flags again: nothing changes.
        assert!(!encode(&mut regs, &status));

        // Back to PCM clears both bits.
        assert!(encode(&mut regs, &ChannelStatus::default()));
        assert_eq!(
            regs.read_reg(reg::SPDIF_PLAYCTL),
            reg::SPDIF_MEM_USER_EN | reg::SPDIF_BLOCK_START_MODE
        );
    }

    #[test]
    fn professional_flag_alone_keeps_pcm() {
        let mut regs = MockRegs::new();
        let mut status = ChannelStatus::default();
        status.0[0] = AES0_PROFESSIONAL;
        assert!(status.is_professional());

        assert!(!encode(&mut regs, &status));
        assert_eq!(regs.read_reg(reg::SPDIF_PLAYCTL), 0);
    }

    #[test]
    fn control_bits_do_not_leak_into_payload() {
        let mut regs = MockRegs::new();
        regs.set_reg(reg::SPDIF_PLAYCTL, reg::SPDIF_NON_PCM);
        let status = ChannelStatus::default();
        encode(&mut regs, &status);
        assert_eq!(decode(&mut regs), status);
    }
}
