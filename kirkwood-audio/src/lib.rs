//! # kirkwood-audio
//!
//! A `no_std` control core for the Marvell Kirkwood I²S/SPDIF audio unit.
//! It programs the memory-mapped register block: master clock selection,
//! stream formats, the playback/record trigger sequence and the IEC958
//! channel-status words. DMA buffer management and PCM data movement are
//! left to the surrounding audio framework.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Registers | [`registers`] / [`bus`] | Register map and volatile MMIO access |
//! | Clock | [`clock`] | External reference vs. internal DCO, lock wait |
//! | Format | [`format`] | Width/encoding to register field deltas |
//! | Stream | [`stream`] | Per-direction trigger state machine |
//! | IEC958 | [`iec958`] | 24-byte channel status ↔ 6 status words |
//! | Facade | [`controller`] / [`control`] | [`Controller`] and the [`DaiOps`] table |
//!
//! ## Quick start
//!
//! ```ignore
//! use kirkwood_audio::{Controller, ControllerConfig, Resources};
//! use kirkwood_audio::format::{Direction, SampleWidth, StreamFormat};
//! use kirkwood_audio::stream::TriggerCommand;
//!
//! let regs = unsafe { kirkwood_audio::bus::Mmio::map(Some(region))? };
//! let mut ctl = Controller::initialize(
//!     Resources { regs, irq: Some(irq), clock: Some(clk), ext_clock: None, delay },
//!     ControllerConfig::default(),
//! )?;
//!
//! ctl.configure(Direction::Playback, 48_000, StreamFormat::pcm(SampleWidth::S16, 2))?;
//! ctl.trigger(Direction::Playback, TriggerCommand::Start)?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `mock` | no | [`mock`] register file, clock and delay doubles for host tests |
//!
//! ## Clocking
//!
//! - **External reference:** asked for `rate × 256` ([`constants::MCLK_RATIO`])
//! - **DCO rates:** 44.1, 48 and 96 kHz ([`constants::DCO_RATES`])
//! - **DCO lock wait:** bounded by [`ControllerConfig::dco_lock_timeout_us`]

#![no_std]

pub mod constants;
pub mod registers;
pub mod bus;
pub mod clock;
pub mod format;
pub mod stream;
pub mod iec958;
pub mod controller;
pub mod control;
pub mod error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use control::DaiOps;
pub use controller::{Capabilities, Controller, ControllerConfig, Resources};
pub use error::{Error, Result};
