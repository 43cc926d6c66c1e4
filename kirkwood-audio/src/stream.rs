//! Playback/capture trigger state machine.
//!
//! Each direction owns one [`StreamStateMachine`]. Transitions write the
//! play/record control register and the interrupt mask in a fixed order:
//!
//! | Command | Writes |
//! |---------|--------|
//! | Start | pause → enable byte-count IRQ → clear pause/mute, set burst + enables |
//! | Stop | pause + mute → disable byte-count IRQ → clear enables |
//! | PausePush / Suspend | pause + mute |
//! | PauseRelease / Resume | clear pause + mute |
//!
//! The interrupt is never unmasked before the stream is paused, and never
//! left unmasked once the data path is disabled. A rejected command writes
//! nothing.

use core::fmt;

use log::{debug, log_enabled, Level};

use crate::bus::RegisterFile;
use crate::error::FormatError;
use crate::format::{DataPaths, Direction};
use crate::registers::{self as reg, Register};

/// Trigger verbs issued by the audio framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCommand {
    Start,
    Stop,
    PausePush,
    Suspend,
    PauseRelease,
    Resume,
}

/// Stream state of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    /// Configured, not yet started.
    Armed,
    Running,
    Paused,
}

/// DMA burst size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstSize {
    B32,
    #[default]
    B128,
}

impl BurstSize {
    /// Burst size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            BurstSize::B32 => 32,
            BurstSize::B128 => 128,
        }
    }
}

/// Per-direction runtime state. Mutated only through transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRuntimeState {
    pub i2s_enabled: bool,
    /// Always `false` for capture.
    pub spdif_enabled: bool,
    pub burst: BurstSize,
}

/// Register layout of one direction's control register.
struct ControlBits {
    ctl: Register,
    pause: u32,
    mute: u32,
    burst_mask: u32,
    burst_32: u32,
    burst_128: u32,
    i2s_en: u32,
    spdif_en: u32,
    /// Cleared on Start.
    start_clear: u32,
    irq: u32,
}

const PLAYBACK_BITS: ControlBits = ControlBits {
    ctl: reg::PLAYCTL,
    pause: reg::PLAYCTL_PAUSE,
    // SPDIF mute is not driven by triggers.
    mute: reg::PLAYCTL_I2S_MUTE,
    burst_mask: reg::PLAYCTL_BURST_MASK,
    burst_32: reg::PLAYCTL_BURST_32,
    burst_128: reg::PLAYCTL_BURST_128,
    i2s_en: reg::PLAYCTL_I2S_EN,
    spdif_en: reg::PLAYCTL_SPDIF_EN,
    start_clear: 0,
    irq: reg::INT_CAUSE_PLAY_BYTES,
};

const CAPTURE_BITS: ControlBits = ControlBits {
    ctl: reg::RECCTL,
    pause: reg::RECCTL_PAUSE,
    mute: reg::RECCTL_MUTE,
    burst_mask: reg::RECCTL_BURST_MASK,
    burst_32: reg::RECCTL_BURST_32,
    burst_128: reg::RECCTL_BURST_128,
    i2s_en: reg::RECCTL_I2S_EN,
    spdif_en: reg::RECCTL_SPDIF_EN,
    start_clear: reg::RECCTL_MONO,
    irq: reg::INT_CAUSE_REC_BYTES,
};

/// Trigger state machine for one direction.
#[derive(Debug, Clone)]
pub struct StreamStateMachine {
    direction: Direction,
    state: StreamState,
    runtime: StreamRuntimeState,
}

impl StreamStateMachine {
    /// An idle stream with both data paths it supports enabled.
    pub fn new(direction: Direction, burst: BurstSize) -> Self {
        Self {
            direction,
            state: StreamState::Idle,
            runtime: StreamRuntimeState {
                i2s_enabled: true,
                spdif_enabled: direction == Direction::Playback,
                burst,
            },
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn runtime(&self) -> StreamRuntimeState {
        self.runtime
    }

    /// Whether the stream is running or paused.
    pub fn is_active(&self) -> bool {
        matches!(self.state, StreamState::Running | StreamState::Paused)
    }

    /// Record a negotiated format: Idle/Armed → Armed.
    pub fn arm(&mut self, paths: DataPaths) -> Result<(), FormatError> {
        if self.is_active() {
            return Err(FormatError::InvalidTransition {
                from: self.state,
                command: TriggerCommand::Start,
            });
        }
        self.runtime.i2s_enabled = paths.i2s;
        self.runtime.spdif_enabled = paths.spdif && self.direction == Direction::Playback;
        self.state = StreamState::Armed;
        Ok(())
    }

    /// Drop the runtime state: back to Idle with default paths.
    pub fn release(&mut self) {
        *self = Self::new(self.direction, self.runtime.burst);
    }

    fn bits(&self) -> &'static ControlBits {
        match self.direction {
            Direction::Playback => &PLAYBACK_BITS,
            Direction::Capture => &CAPTURE_BITS,
        }
    }

    /// State reached by `command` from the current state, if valid.
    pub fn next_state(&self, command: TriggerCommand) -> Option<StreamState> {
        use StreamState::*;
        use TriggerCommand::*;
        match (self.state, command) {
            (Idle | Armed, Start) => Some(Running),
            (Running | Paused, Stop) => Some(Idle),
            (Running, PausePush | Suspend) => Some(Paused),
            (Paused, PauseRelease | Resume) => Some(Running),
            _ => None,
        }
    }

    /// Apply `command`, writing registers in the required order.
    pub fn trigger<R: RegisterFile>(
        &mut self,
        regs: &mut R,
        command: TriggerCommand,
    ) -> Result<StreamState, FormatError> {
        let next = self
            .next_state(command)
            .ok_or(FormatError::InvalidTransition {
                from: self.state,
                command,
            })?;
        let bits = self.bits();

        // The control register must be read twice before it is changed;
        // this is the first read, each step below does the second.
        let _ = regs.read(bits.ctl);

        match command {
            TriggerCommand::Start => self.start(regs, bits),
            TriggerCommand::Stop => {
                regs.set_bits(bits.ctl, bits.pause | bits.mute);
                regs.clear_bits(reg::INT_MASK, bits.irq);
                regs.clear_bits(bits.ctl, bits.i2s_en | bits.spdif_en);
            }
            TriggerCommand::PausePush | TriggerCommand::Suspend => {
                regs.set_bits(bits.ctl, bits.pause | bits.mute);
            }
            TriggerCommand::PauseRelease | TriggerCommand::Resume => {
                regs.clear_bits(bits.ctl, bits.pause | bits.mute);
            }
        }

        debug!("{:?} {:?}: {:?} -> {:?}", self.direction, command, self.state, next);
        self.state = next;
        Ok(next)
    }

    fn start<R: RegisterFile>(&self, regs: &mut R, bits: &ControlBits) {
        // Halt any stale transfer before the interrupt is unmasked.
        regs.set_bits(bits.ctl, bits.pause);
        regs.set_bits(reg::INT_MASK, bits.irq);

        let burst = match self.runtime.burst {
            BurstSize::B32 => bits.burst_32,
            BurstSize::B128 => bits.burst_128,
        };
        let mut enable = 0;
        if self.runtime.i2s_enabled {
            enable |= bits.i2s_en;
        }
        if self.runtime.spdif_enabled {
            enable |= bits.spdif_en;
        }
        let mask = bits.burst_mask
            | bits.start_clear
            | bits.pause
            | bits.mute
            | bits.i2s_en
            | bits.spdif_en;
        regs.modify(bits.ctl, burst | enable, mask);

        if self.direction == Direction::Playback && log_enabled!(Level::Debug) {
            debug!("{}", SpdifPlayControl::read(regs));
        }
    }
}

/// Decoded SPDIF playback control register, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpdifPlayControl(pub u32);

impl SpdifPlayControl {
    pub fn read<R: RegisterFile>(regs: &mut R) -> Self {
        Self(regs.read(reg::SPDIF_PLAYCTL))
    }

    pub fn non_pcm(&self) -> bool {
        self.0 & reg::SPDIF_NON_PCM != 0
    }

    pub fn register_validity(&self) -> bool {
        self.0 & reg::SPDIF_REG_VALIDITY != 0
    }

    pub fn force_parity_error(&self) -> bool {
        self.0 & reg::SPDIF_FORCE_PARERR != 0
    }

    pub fn mem_user_enable(&self) -> bool {
        self.0 & reg::SPDIF_MEM_USER_EN != 0
    }

    pub fn mem_validity_enable(&self) -> bool {
        self.0 & reg::SPDIF_MEM_VALIDITY_EN != 0
    }

    pub fn block_start_mode(&self) -> bool {
        self.0 & reg::SPDIF_BLOCK_START_MODE != 0
    }
}

impl fmt::Display for SpdifPlayControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SPDIF playback ctrl = {:08x} (non-pcm={} reg-validity={} force-parerr={} \
             mem-user={} mem-validity={} block-start={})",
            self.0,
            u8::from(self.non_pcm()),
            u8::from(self.register_validity()),
            u8::from(self.force_parity_error()),
            u8::from(self.mem_user_enable()),
            u8::from(self.mem_validity_enable()),
            u8::from(self.block_start_mode()),
        )
    }
}
