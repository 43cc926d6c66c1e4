//! Register access.
//!
//! [`RegisterFile`] is the only path to the hardware. Nothing above it keeps
//! a shadow copy of register contents: every change re-reads the register,
//! masks, and writes it back within the same call.

use core::ptr::NonNull;
use core::sync::atomic::{fence, Ordering};

use crate::error::InitError;
use crate::registers::{Register, REGISTER_BLOCK_SIZE};

/// Typed read/write access to the audio unit's 32-bit registers.
///
/// Accesses are unconditional and infallible; a faulting bus access is a
/// platform fault, not something this layer reports.
pub trait RegisterFile {
    /// Read the current bit pattern of `reg`.
    fn read(&mut self, reg: Register) -> u32;

    /// Replace the contents of `reg` with `value`.
    fn write(&mut self, reg: Register, value: u32);

    /// Read-modify-write: `new = (current & !mask) | bits`. Returns `new`.
    fn modify(&mut self, reg: Register, bits: u32, mask: u32) -> u32 {
        let current = self.read(reg);
        let new = (current & !mask) | (bits & mask);
        self.write(reg, new);
        new
    }

    /// Set `bits` in `reg`, leaving all other bits untouched.
    fn set_bits(&mut self, reg: Register, bits: u32) -> u32 {
        self.modify(reg, bits, bits)
    }

    /// Clear `bits` in `reg`, leaving all other bits untouched.
    fn clear_bits(&mut self, reg: Register, bits: u32) -> u32 {
        self.modify(reg, 0, bits)
    }
}

impl<T: RegisterFile + ?Sized> RegisterFile for &mut T {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

/// A physical register region reserved by the platform for the audio unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// Virtual address the region is mapped at.
    pub base: usize,
    /// Region length in bytes.
    pub size: usize,
}

/// Memory-mapped register block.
#[derive(Debug)]
pub struct Mmio {
    base: NonNull<u32>,
}

impl Mmio {
    /// Wrap a mapped register region.
    ///
    /// # Errors
    ///
    /// * [`InitError::NoMemoryRegion`] when no region is given or it is
    ///   smaller than the 16 KiB register block.
    /// * [`InitError::MapFailed`] when the base address is null or not
    ///   32-bit aligned.
    ///
    /// # Safety
    ///
    /// `region` must describe device memory that stays mapped for the
    /// lifetime of the returned value and is not accessed by anything else.
    pub unsafe fn map(region: Option<MemoryRegion>) -> Result<Self, InitError> {
        let region = region.ok_or(InitError::NoMemoryRegion)?;
        if region.size < REGISTER_BLOCK_SIZE {
            return Err(InitError::NoMemoryRegion);
        }
        if region.base % core::mem::align_of::<u32>() != 0 {
            return Err(InitError::MapFailed);
        }
        let base = NonNull::new(region.base as *mut u32).ok_or(InitError::MapFailed)?;
        Ok(Self { base })
    }

    fn addr(&self, reg: Register) -> *mut u32 {
        // Offsets are multiples of 4 inside REGISTER_BLOCK_SIZE.
        self.base
            .as_ptr()
            .wrapping_byte_add(usize::from(reg.offset()))
    }
}

impl RegisterFile for Mmio {
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: `map` guarantees the block is mapped and aligned, and every
        // `Register` offset lies inside it.
        let value = unsafe { core::ptr::read_volatile(self.addr(reg)) };
        fence(Ordering::Acquire);
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        fence(Ordering::Release);
        // SAFETY: see `read`.
        unsafe { core::ptr::write_volatile(self.addr(reg), value) }
    }
}
