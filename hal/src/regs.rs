//! # Register Access
//!
//! Word and half-word access to the OMAP3 register spaces, addressed by
//! `(space, module, offset)`. The power management core never touches raw
//! pointers itself: everything goes through [`RegisterAccess`], so the same
//! state machine runs against [`Mmio`] on target and against a simulated
//! register file on the host.

use core::fmt;
use core::ptr;

use crate::prcm::Module;

// =============================================================================
// Addressing
// =============================================================================

/// Logical register space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Space {
    /// Power and reset manager
    Prm,
    /// Clock manager
    Cm,
    /// System control module
    Control,
    /// SDRAM controller
    Sdrc,
    /// Scratch-pad memory in the control module
    Scratchpad,
}

impl Space {
    /// Number of register spaces
    pub const COUNT: usize = 5;

    const fn index(self) -> usize {
        match self {
            Space::Prm => 0,
            Space::Cm => 1,
            Space::Control => 2,
            Space::Sdrc => 3,
            Space::Scratchpad => 4,
        }
    }
}

/// A register address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg {
    /// Register space
    pub space: Space,
    /// Module base within the space (zero for flat spaces)
    pub module: Module,
    /// Byte offset within the module
    pub offset: u16,
}

impl Reg {
    /// PRM register of `module`
    pub const fn prm(module: Module, offset: u16) -> Self {
        Self {
            space: Space::Prm,
            module,
            offset,
        }
    }

    /// CM register of `module`
    pub const fn cm(module: Module, offset: u16) -> Self {
        Self {
            space: Space::Cm,
            module,
            offset,
        }
    }

    /// System control module register
    pub const fn control(offset: u16) -> Self {
        Self {
            space: Space::Control,
            module: Module::NONE,
            offset,
        }
    }

    /// SDRC register
    pub const fn sdrc(offset: u16) -> Self {
        Self {
            space: Space::Sdrc,
            module: Module::NONE,
            offset,
        }
    }

    /// Scratch-pad word
    pub const fn scratchpad(offset: u16) -> Self {
        Self {
            space: Space::Scratchpad,
            module: Module::NONE,
            offset,
        }
    }

    /// Byte offset of this register from its space base
    pub const fn byte_offset(&self) -> usize {
        self.module.base() as usize + self.offset as usize
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{:#06x}]", self.space, self.byte_offset())
    }
}

// =============================================================================
// Access Capability
// =============================================================================

/// Register read/write capability
///
/// Methods take `&self`: registers are shared hardware, and the interrupt
/// handler needs access while the idle path holds the power manager.
pub trait RegisterAccess {
    /// Read a 32-bit register
    fn read(&self, reg: Reg) -> u32;

    /// Write a 32-bit register
    fn write(&self, reg: Reg, value: u32);

    /// Read a 16-bit register (padconf)
    fn read16(&self, reg: Reg) -> u16;

    /// Write a 16-bit register (padconf)
    fn write16(&self, reg: Reg, value: u16);

    /// Set `bits` in a register, returning the new value
    fn set_bits(&self, reg: Reg, bits: u32) -> u32 {
        let value = self.read(reg) | bits;
        self.write(reg, value);
        value
    }

    /// Clear `bits` in a register, returning the new value
    fn clear_bits(&self, reg: Reg, bits: u32) -> u32 {
        let value = self.read(reg) & !bits;
        self.write(reg, value);
        value
    }

    /// Replace the bits under `mask` with `bits`, returning the new value
    fn modify(&self, reg: Reg, mask: u32, bits: u32) -> u32 {
        let value = (self.read(reg) & !mask) | (bits & mask);
        self.write(reg, value);
        value
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read(&self, reg: Reg) -> u32 {
        (**self).read(reg)
    }

    fn write(&self, reg: Reg, value: u32) {
        (**self).write(reg, value)
    }

    fn read16(&self, reg: Reg) -> u16 {
        (**self).read16(reg)
    }

    fn write16(&self, reg: Reg, value: u16) {
        (**self).write16(reg, value)
    }
}

// =============================================================================
// Memory-Mapped Implementation
// =============================================================================

/// Virtual base addresses of each register space
#[derive(Debug, Clone, Copy)]
pub struct SpaceBases {
    /// PRM base
    pub prm: usize,
    /// CM base
    pub cm: usize,
    /// System control module base
    pub control: usize,
    /// SDRC base
    pub sdrc: usize,
    /// Scratch-pad base
    pub scratchpad: usize,
}

/// Volatile MMIO register access
#[derive(Debug)]
pub struct Mmio {
    bases: [usize; Space::COUNT],
}

impl Mmio {
    /// Create an accessor over already-mapped register spaces
    ///
    /// # Safety
    ///
    /// Every base must be the virtual address of the corresponding register
    /// block, mapped as device memory for the lifetime of the accessor.
    pub const unsafe fn new(bases: SpaceBases) -> Self {
        Self {
            bases: [
                bases.prm,
                bases.cm,
                bases.control,
                bases.sdrc,
                bases.scratchpad,
            ],
        }
    }

    fn addr(&self, reg: Reg) -> usize {
        self.bases[reg.space.index()] + reg.byte_offset()
    }
}

impl RegisterAccess for Mmio {
    fn read(&self, reg: Reg) -> u32 {
        // SAFETY: the constructor contract guarantees the block is mapped.
        unsafe { ptr::read_volatile(self.addr(reg) as *const u32) }
    }

    fn write(&self, reg: Reg, value: u32) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(self.addr(reg) as *mut u32, value) }
    }

    fn read16(&self, reg: Reg) -> u16 {
        // SAFETY: as above.
        unsafe { ptr::read_volatile(self.addr(reg) as *const u16) }
    }

    fn write16(&self, reg: Reg, value: u16) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(self.addr(reg) as *mut u16, value) }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct OneWord(Cell<u32>);

    impl RegisterAccess for OneWord {
        fn read(&self, _reg: Reg) -> u32 {
            self.0.get()
        }

        fn write(&self, _reg: Reg, value: u32) {
            self.0.set(value)
        }

        fn read16(&self, _reg: Reg) -> u16 {
            self.0.get() as u16
        }

        fn write16(&self, _reg: Reg, value: u16) {
            self.0.set(value as u32)
        }
    }

    #[test]
    fn test_byte_offset_adds_module_base() {
        let reg = Reg::prm(Module::WKUP, 0xa0);
        assert_eq!(reg.byte_offset(), 0x0ca0);
        assert_eq!(Reg::control(0x270).byte_offset(), 0x270);
    }

    #[test]
    fn test_bit_helpers() {
        let word = OneWord(Cell::new(0b1010));
        let reg = Reg::sdrc(0x70);
        assert_eq!(word.set_bits(reg, 0b0001), 0b1011);
        assert_eq!(word.clear_bits(reg, 0b1000), 0b0011);
        assert_eq!(word.modify(reg, 0b0110, 0b0100), 0b0101);
    }

    #[test]
    fn test_reference_forwards() {
        let word = OneWord(Cell::new(0));
        let by_ref = &word;
        by_ref.write(Reg::scratchpad(0xc0), 7);
        assert_eq!(word.read(Reg::scratchpad(0xc0)), 7);
    }

    #[test]
    fn test_mmio_reads_backing_memory() {
        let mut backing = [0u32; 0x600];
        backing[0x0ca0 / 4] = 0xdead_beef;
        let base = backing.as_mut_ptr() as usize;
        let bases = SpaceBases {
            prm: base,
            cm: base,
            control: base,
            sdrc: base,
            scratchpad: base,
        };
        let mmio = unsafe { Mmio::new(bases) };
        assert_eq!(mmio.read(Reg::prm(Module::WKUP, 0xa0)), 0xdead_beef);
        mmio.write(Reg::control(0x10), 1);
        assert_eq!(backing[0x10 / 4], 1);
    }
}
