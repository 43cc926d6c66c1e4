//! Hardware doubles for host-side testing.
//!
//! [`MockRegs`] is a recording register file: it keeps register contents
//! and a log of every write, so tests can assert exact write ordering.

#![cfg(any(test, feature = "mock"))]

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterFile;
use crate::clock::AudioClock;
use crate::registers::{Register, DCO_SPCR_STATUS, DCO_SPCR_STATUS_DCO_LOCK};

const MAX_REGS: usize = 64;
const MAX_LOG: usize = 256;

/// Recording register file.
pub struct MockRegs {
    regs: [(u16, u32); MAX_REGS],
    reg_count: usize,
    log: [(Register, u32); MAX_LOG],
    log_count: usize,
    reads: usize,
    /// DCO status reads left before the lock bit shows up.
    dco_lock_in: Option<usize>,
}

impl MockRegs {
    /// All registers read as zero; the DCO never locks.
    pub fn new() -> Self {
        Self {
            regs: [(0, 0); MAX_REGS],
            reg_count: 0,
            log: [(Register::new("", 0), 0); MAX_LOG],
            log_count: 0,
            reads: 0,
            dco_lock_in: None,
        }
    }

    /// A register file whose DCO reports lock on the first poll.
    pub fn with_dco_locked() -> Self {
        let mut regs = Self::new();
        regs.lock_dco_after(0);
        regs
    }

    /// Report DCO lock once `polls` status reads have returned unlocked.
    pub fn lock_dco_after(&mut self, polls: usize) {
        self.dco_lock_in = Some(polls);
    }

    /// Current value of `reg`, zero if never written. Not logged.
    pub fn read_reg(&self, reg: Register) -> u32 {
        self.regs[..self.reg_count]
            .iter()
            .find(|(offset, _)| *offset == reg.offset())
            .map_or(0, |(_, value)| *value)
    }

    /// Preload a register value without logging a write.
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        if let Some(slot) = self.regs[..self.reg_count]
            .iter_mut()
            .find(|(offset, _)| *offset == reg.offset())
        {
            slot.1 = value;
            return;
        }
        self.regs[self.reg_count] = (reg.offset(), value);
        self.reg_count += 1;
    }

    /// The `idx`th logged write.
    pub fn write_at(&self, idx: usize) -> (Register, u32) {
        self.log[idx]
    }

    /// All logged writes, oldest first.
    pub fn writes(&self) -> &[(Register, u32)] {
        &self.log[..self.log_count]
    }

    /// Number of logged writes.
    pub fn write_count(&self) -> usize {
        self.log_count
    }

    /// Number of reads served.
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Forget the write log, keeping register contents.
    pub fn clear_log(&mut self) {
        self.log_count = 0;
        self.reads = 0;
    }
}

impl Default for MockRegs {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile for MockRegs {
    fn read(&mut self, reg: Register) -> u32 {
        self.reads += 1;
        let value = self.read_reg(reg);
        if reg == DCO_SPCR_STATUS {
            return match self.dco_lock_in {
                Some(0) => value | DCO_SPCR_STATUS_DCO_LOCK,
                Some(n) => {
                    self.dco_lock_in = Some(n - 1);
                    value & !DCO_SPCR_STATUS_DCO_LOCK
                }
                None => value & !DCO_SPCR_STATUS_DCO_LOCK,
            };
        }
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.set_reg(reg, value);
        self.log[self.log_count] = (reg, value);
        self.log_count += 1;
    }
}

/// Clock-framework double.
#[derive(Debug, PartialEq, Eq)]
pub struct FakeClock {
    id: u32,
    /// Whether `set_rate` requests are accepted.
    pub accepts_rates: bool,
    /// Whether `prepare_enable` succeeds.
    pub can_enable: bool,
    /// Last accepted or rejected rate request.
    pub requested: Option<u32>,
    /// Current enable state.
    pub enabled: bool,
}

impl FakeClock {
    /// A clock that enables and accepts every rate.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            accepts_rates: true,
            can_enable: true,
            requested: None,
            enabled: false,
        }
    }

    /// A clock that refuses every rate request.
    pub fn rejecting(id: u32) -> Self {
        Self {
            accepts_rates: false,
            ..Self::new(id)
        }
    }

    /// Identifier used to tell clocks apart.
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Error returned by [`FakeClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeClockError;

impl AudioClock for FakeClock {
    type Error = FakeClockError;

    fn prepare_enable(&mut self) -> Result<(), Self::Error> {
        if !self.can_enable {
            return Err(FakeClockError);
        }
        self.enabled = true;
        Ok(())
    }

    fn disable_unprepare(&mut self) {
        self.enabled = false;
    }

    fn set_rate(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.requested = Some(hz);
        if self.accepts_rates {
            Ok(())
        } else {
            Err(FakeClockError)
        }
    }

    fn is_same_clock(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Delay provider that only counts elapsed nanoseconds.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds requested.
    pub elapsed_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
