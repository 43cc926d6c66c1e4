//! Controller facade.
//!
//! [`Controller`] owns the register block, the clocks and one
//! [`StreamStateMachine`] per direction, and exposes the operations the
//! audio framework calls. It is not reentrant: callers serialize access to
//! one instance (typically one lock per device).
//!
//! # Example
//!
//! ```ignore
//! let regs = unsafe { Mmio::map(Some(region))? };
//! let mut ctl = Controller::initialize(
//!     Resources { regs, irq: Some(irq), clock: Some(clk), ext_clock, delay },
//!     ControllerConfig::default(),
//! )?;
//! ctl.configure(Direction::Playback, 48_000, StreamFormat::pcm(SampleWidth::S16, 2))?;
//! ctl.trigger(Direction::Playback, TriggerCommand::Start)?;
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::bus::RegisterFile;
use crate::clock::{AudioClock, ClockResolver, ClockSource};
use crate::constants::{
    DCO_RATES, DEFAULT_DCO_LOCK_TIMEOUT_US, EXTCLK_MAX_PLAYBACK_CHANNELS, EXTCLK_RATE_MAX,
    EXTCLK_RATE_MIN,
};
use crate::error::{ClockError, ConfigError, FormatError, InitError, TriggerError};
use crate::format::{DaiFormat, Direction, Encoding, FormatNegotiator, StreamFormat};
use crate::iec958::{self, ChannelStatus};
use crate::registers as reg;
use crate::stream::{BurstSize, StreamRuntimeState, StreamState, StreamStateMachine, TriggerCommand};

/// Static controller configuration, supplied by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// DMA burst size programmed on Start.
    pub burst: BurstSize,
    /// Look for an external reference clock.
    pub has_external_clock: bool,
    /// Allow up to 8 playback channels when an external clock is found.
    pub external_channel_capability: bool,
    /// Bound on the DCO lock wait.
    pub dco_lock_timeout_us: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            burst: BurstSize::B128,
            has_external_clock: false,
            external_channel_capability: true,
            dco_lock_timeout_us: DEFAULT_DCO_LOCK_TIMEOUT_US,
        }
    }
}

/// Platform resources handed to [`Controller::initialize`].
pub struct Resources<R, C, D> {
    /// Mapped register block.
    pub regs: R,
    /// Interrupt line of the audio unit.
    pub irq: Option<u32>,
    /// Main audio clock.
    pub clock: Option<C>,
    /// Optional external reference clock.
    pub ext_clock: Option<C>,
    /// Delay provider used while waiting for the DCO.
    pub delay: D,
}

/// Supported sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSupport {
    /// Only these rates, in Hz.
    Discrete(&'static [u32]),
    /// Any rate in the inclusive range, in Hz.
    Continuous { min: u32, max: u32 },
}

impl RateSupport {
    pub fn contains(&self, rate: u32) -> bool {
        match *self {
            RateSupport::Discrete(rates) => rates.contains(&rate),
            RateSupport::Continuous { min, max } => (min..=max).contains(&rate),
        }
    }
}

/// What one direction can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionCapabilities {
    pub channels_min: u8,
    pub channels_max: u8,
    pub rates: RateSupport,
}

/// Per-instance capabilities, fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub playback: DirectionCapabilities,
    pub capture: DirectionCapabilities,
}

impl Capabilities {
    fn dco_only() -> Self {
        let dir = DirectionCapabilities {
            channels_min: 1,
            channels_max: 2,
            rates: RateSupport::Discrete(&DCO_RATES),
        };
        Self {
            playback: dir,
            capture: dir,
        }
    }

    fn with_external_clock(wide_playback: bool) -> Self {
        let mut caps = Self::dco_only();
        let rates = RateSupport::Continuous {
            min: EXTCLK_RATE_MIN,
            max: EXTCLK_RATE_MAX,
        };
        caps.playback.rates = rates;
        caps.capture.rates = rates;
        if wide_playback {
            caps.playback.channels_max = EXTCLK_MAX_PLAYBACK_CHANNELS;
        }
        caps
    }

    pub fn direction(&self, direction: Direction) -> &DirectionCapabilities {
        match direction {
            Direction::Playback => &self.playback,
            Direction::Capture => &self.capture,
        }
    }

    /// Whether `format` is acceptable for `direction`.
    pub fn supports(&self, direction: Direction, format: StreamFormat) -> bool {
        let caps = self.direction(direction);
        (caps.channels_min..=caps.channels_max).contains(&format.channels)
            && !(direction == Direction::Capture && format.encoding == Encoding::Iec958Subframe)
    }
}

/// Register-level controller for one audio unit.
pub struct Controller<R, C, D> {
    regs: R,
    irq: u32,
    clock: C,
    resolver: ClockResolver<C>,
    delay: D,
    negotiator: FormatNegotiator,
    playback: StreamStateMachine,
    capture: StreamStateMachine,
    capabilities: Capabilities,
}

impl<R, C, D> Controller<R, C, D>
where
    R: RegisterFile,
    C: AudioClock,
    D: DelayNs,
{
    /// Bring up the audio unit and leave it in a safe state: DCO selected,
    /// interrupts cleared and masked, playback and record disabled.
    pub fn initialize(
        resources: Resources<R, C, D>,
        config: ControllerConfig,
    ) -> Result<Self, InitError> {
        let Resources {
            mut regs,
            irq,
            clock,
            ext_clock,
            delay,
        } = resources;

        let irq = irq.ok_or(InitError::NoIrq)?;
        let mut clock = clock.ok_or(InitError::NoClock)?;
        clock.prepare_enable().map_err(|e| {
            error!("audio clock enable failed: {:?}", e);
            InitError::NoClock
        })?;
        regs.write(reg::CLOCKS_CTRL, ClockSource::InternalDco.select_bits());

        let ext_clock = ext_clock
            .filter(|_| config.has_external_clock)
            .filter(|ext| {
                let same = ext.is_same_clock(&clock);
                if same {
                    debug!("external clock is the main clock, ignoring");
                }
                !same
            })
            .and_then(|mut ext| match ext.prepare_enable() {
                Ok(()) => Some(ext),
                Err(e) => {
                    warn!("external clock enable failed: {:?}", e);
                    None
                }
            });

        let capabilities = if ext_clock.is_some() {
            info!("found external clock");
            Capabilities::with_external_clock(config.external_channel_capability)
        } else {
            Capabilities::dco_only()
        };

        regs.write(reg::INT_CAUSE, reg::INT_CAUSE_ALL);
        regs.write(reg::INT_MASK, 0);
        regs.clear_bits(reg::PLAYCTL, reg::PLAYCTL_I2S_EN | reg::PLAYCTL_SPDIF_EN);
        regs.clear_bits(reg::RECCTL, reg::RECCTL_I2S_EN | reg::RECCTL_SPDIF_EN);

        Ok(Self {
            regs,
            irq,
            clock,
            resolver: ClockResolver::new(ext_clock, config.dco_lock_timeout_us),
            delay,
            negotiator: FormatNegotiator,
            playback: StreamStateMachine::new(Direction::Playback, config.burst),
            capture: StreamStateMachine::new(Direction::Capture, config.burst),
            capabilities,
        })
    }

    /// Release the clocks and hand the resources back.
    ///
    /// Registers are left as they are; stop both streams first.
    pub fn teardown(self) -> Resources<R, C, D> {
        let mut ext_clock = self.resolver.into_external();
        if let Some(ext) = ext_clock.as_mut() {
            ext.disable_unprepare();
        }
        let mut clock = self.clock;
        clock.disable_unprepare();
        Resources {
            regs: self.regs,
            irq: Some(self.irq),
            clock: Some(clock),
            ext_clock,
            delay: self.delay,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn irq(&self) -> u32 {
        self.irq
    }

    pub fn state(&self, direction: Direction) -> StreamState {
        self.stream(direction).state()
    }

    pub fn runtime(&self, direction: Direction) -> StreamRuntimeState {
        self.stream(direction).runtime()
    }

    fn stream(&self, direction: Direction) -> &StreamStateMachine {
        match direction {
            Direction::Playback => &self.playback,
            Direction::Capture => &self.capture,
        }
    }

    fn stream_mut(&mut self, direction: Direction) -> &mut StreamStateMachine {
        match direction {
            Direction::Playback => &mut self.playback,
            Direction::Capture => &mut self.capture,
        }
    }

    /// Set rate and format for one direction.
    ///
    /// Format and rate are checked against the capabilities before any
    /// register is touched; an invalid request or an active stream leaves
    /// the hardware untouched.
    pub fn configure(
        &mut self,
        direction: Direction,
        rate: u32,
        format: StreamFormat,
    ) -> Result<ClockSource, ConfigError> {
        if self.stream(direction).is_active() {
            return Err(ConfigError::StreamActive(direction));
        }
        if !self.capabilities.supports(direction, format) {
            return Err(FormatError::InvalidFormat.into());
        }
        if !self.capabilities.direction(direction).rates.contains(rate) {
            return Err(ClockError::UnsupportedRate(rate).into());
        }
        let deltas = self.negotiator.negotiate(direction, format)?;
        let source = self.resolver.resolve(&mut self.regs, &mut self.delay, rate)?;
        deltas.apply(&mut self.regs);
        self.stream_mut(direction).arm(deltas.paths)?;
        debug!("{:?} configured: {} Hz {:?} via {:?}", direction, rate, format, source);
        Ok(source)
    }

    /// Set the serial justification for playback and record together.
    pub fn set_dai_format(&mut self, fmt: DaiFormat) -> Result<(), FormatError> {
        for update in self.negotiator.justification(fmt)? {
            update.apply(&mut self.regs);
        }
        Ok(())
    }

    /// Drive the trigger state machine of one direction.
    pub fn trigger(
        &mut self,
        direction: Direction,
        command: TriggerCommand,
    ) -> Result<StreamState, TriggerError> {
        let Self {
            regs,
            playback,
            capture,
            ..
        } = self;
        let machine = match direction {
            Direction::Playback => playback,
            Direction::Capture => capture,
        };
        Ok(machine.trigger(regs, command)?)
    }

    /// Forget the runtime state of a released stream.
    pub fn release(&mut self, direction: Direction) {
        self.stream_mut(direction).release();
    }

    /// Current IEC958 channel status.
    pub fn channel_status(&mut self) -> ChannelStatus {
        iec958::decode(&mut self.regs)
    }

    /// Program the IEC958 channel status. Returns whether the SPDIF
    /// playback control changed.
    pub fn set_channel_status(&mut self, status: &ChannelStatus) -> bool {
        iec958::encode(&mut self.regs, status)
    }
}
