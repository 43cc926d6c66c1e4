use thiserror::Error;

use crate::format::Direction;
use crate::stream::{StreamState, TriggerCommand};

/// Errors raised while bringing up a controller instance.
///
/// These are fatal: the caller should give up on the device.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// No register region was provided, or it is smaller than the register block.
    #[error("no usable memory region for the audio register block")]
    NoMemoryRegion,
    /// The register region could not be mapped (null or misaligned base).
    #[error("mapping the audio register block failed")]
    MapFailed,
    /// No interrupt line was provided.
    #[error("no interrupt line for the audio unit")]
    NoIrq,
    /// The main audio clock is missing or could not be enabled.
    #[error("audio clock unavailable")]
    NoClock,
}

/// Clock-rate resolution failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Neither the external clock nor the DCO can produce this rate.
    #[error("unsupported sample rate {0} Hz")]
    UnsupportedRate(u32),
    /// The DCO did not report lock within the configured time.
    #[error("DCO failed to lock within {timeout_us} us")]
    LockTimeout {
        /// The timeout that elapsed.
        timeout_us: u32,
    },
}

/// Format negotiation and stream state failures. No register was written.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The requested format, width, or direction combination is not supported.
    #[error("invalid stream format")]
    InvalidFormat,
    /// The trigger command is not valid in the current stream state.
    #[error("invalid trigger {command:?} in state {from:?}")]
    InvalidTransition {
        /// State the stream was in.
        from: StreamState,
        /// Rejected command.
        command: TriggerCommand,
    },
}

/// Errors from [`Controller::configure`](crate::Controller::configure).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Format(#[from] FormatError),
    /// The stream must be stopped before it is reconfigured.
    #[error("{0:?} stream is active")]
    StreamActive(Direction),
}

/// Errors from [`Controller::trigger`](crate::Controller::trigger).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerError {
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Umbrella error used by the [`DaiOps`](crate::control::DaiOps) table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result alias for the operation table.
pub type Result<T> = core::result::Result<T, Error>;
