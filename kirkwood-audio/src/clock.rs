//! Master clock selection.
//!
//! The audio unit is clocked either by an external reference (asked for
//! `rate × 256`) or by its internal DCO, which only covers 44.1, 48 and
//! 96 kHz. [`ClockResolver`] tries the external clock first and falls back
//! to the DCO, waiting for it to lock before switching the clock mux.

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::bus::RegisterFile;
use crate::constants::{DCO_POLL_INTERVAL_US, MCLK_RATIO};
use crate::error::ClockError;
use crate::registers as reg;

/// The active master clock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// External reference clock, programmed to `rate × 256`.
    ExternalReference,
    /// Internal digitally-controlled oscillator.
    InternalDco,
}

impl ClockSource {
    /// Value written to the clock-source select register.
    pub const fn select_bits(self) -> u32 {
        match self {
            ClockSource::ExternalReference => reg::MCLK_SOURCE_EXTCLK,
            ClockSource::InternalDco => reg::MCLK_SOURCE_DCO,
        }
    }
}

/// A clock handle owned by the platform's clock framework.
pub trait AudioClock {
    /// Error reported by the clock framework.
    type Error: Debug;

    /// Prepare and ungate the clock.
    fn prepare_enable(&mut self) -> Result<(), Self::Error>;

    /// Gate and unprepare the clock.
    fn disable_unprepare(&mut self);

    /// Request an output frequency in Hz.
    fn set_rate(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Whether `other` refers to the same physical clock.
    fn is_same_clock(&self, other: &Self) -> bool;
}

/// DCO frequency code for `rate`, or `None` if the DCO cannot produce it.
pub const fn dco_frequency_code(rate: u32) -> Option<u32> {
    match rate {
        44_100 => Some(reg::DCO_CTL_FREQ_11),
        48_000 => Some(reg::DCO_CTL_FREQ_12),
        96_000 => Some(reg::DCO_CTL_FREQ_24),
        _ => None,
    }
}

/// Picks and programs the master clock for a sample rate.
pub struct ClockResolver<C> {
    external: Option<C>,
    lock_timeout_us: u32,
}

impl<C: AudioClock> ClockResolver<C> {
    /// Create a resolver. `external` is the optional reference clock.
    pub fn new(external: Option<C>, lock_timeout_us: u32) -> Self {
        Self {
            external,
            lock_timeout_us,
        }
    }

    /// Whether an external reference clock is available.
    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Bound on the DCO lock wait.
    pub fn lock_timeout_us(&self) -> u32 {
        self.lock_timeout_us
    }

    /// Select and program a clock source for `rate`.
    ///
    /// The clock-source select register is written last, and only when a
    /// source has been programmed successfully. A DCO that fails to lock is
    /// put back to its previous setting.
    pub fn resolve<R, D>(
        &mut self,
        regs: &mut R,
        delay: &mut D,
        rate: u32,
    ) -> Result<ClockSource, ClockError>
    where
        R: RegisterFile,
        D: DelayNs,
    {
        if rate == 0 {
            return Err(ClockError::UnsupportedRate(rate));
        }

        if let Some(ext) = self.external.as_mut() {
            match rate.checked_mul(MCLK_RATIO) {
                Some(mclk) => {
                    debug!("extclk set rate {} -> {}", rate, mclk);
                    match ext.set_rate(mclk) {
                        Ok(()) => return Ok(select(regs, ClockSource::ExternalReference)),
                        Err(e) => warn!("extclk refused {} Hz: {:?}", mclk, e),
                    }
                }
                None => warn!("extclk cannot run at {} x {}", rate, MCLK_RATIO),
            }
        }

        let Some(code) = dco_frequency_code(rate) else {
            return Err(ClockError::UnsupportedRate(rate));
        };
        debug!("dco set rate {}", rate);
        let previous = regs.read(reg::DCO_CTL);
        regs.write(reg::DCO_CTL, reg::DCO_CTL_OFFSET_0 | code);
        if let Err(e) = self.wait_for_lock(regs, delay) {
            // Restore the previous DCO setting.
            regs.write(reg::DCO_CTL, previous);
            return Err(e);
        }
        Ok(select(regs, ClockSource::InternalDco))
    }

    /// Poll the DCO status until the lock bit is set.
    fn wait_for_lock<R, D>(&self, regs: &mut R, delay: &mut D) -> Result<(), ClockError>
    where
        R: RegisterFile,
        D: DelayNs,
    {
        let mut waited_us = 0u32;
        loop {
            core::hint::spin_loop();
            if regs.read(reg::DCO_SPCR_STATUS) & reg::DCO_SPCR_STATUS_DCO_LOCK != 0 {
                return Ok(());
            }
            if waited_us >= self.lock_timeout_us {
                warn!("DCO not locked after {} us", waited_us);
                return Err(ClockError::LockTimeout {
                    timeout_us: self.lock_timeout_us,
                });
            }
            delay.delay_us(DCO_POLL_INTERVAL_US);
            waited_us = waited_us.saturating_add(DCO_POLL_INTERVAL_US);
        }
    }

    /// Hand back the external clock, if any.
    pub fn into_external(self) -> Option<C> {
        self.external
    }
}

fn select<R: RegisterFile>(regs: &mut R, source: ClockSource) -> ClockSource {
    regs.write(reg::CLOCKS_CTRL, source.select_bits());
    source
}
