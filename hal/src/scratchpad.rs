//! # Scratch-pad MMU Patch Slot
//!
//! Boot code patches one MMU table entry so the CPU can run from a flat
//! physical mapping right after an off-mode wake-up. The original entry, its
//! physical address and the CPU control register value are stashed at fixed
//! scratch-pad offsets so the resume path can undo the patch.

use static_assertions::const_assert;

use crate::regs::{Reg, RegisterAccess};

/// Original value of the patched table entry
pub const TABLE_VALUE_OFFSET: u16 = 0xc0;
/// Physical address of the patched table entry
pub const TABLE_ADDRESS_OFFSET: u16 = 0xc4;
/// CPU control register value to reapply after the restore
pub const CONTROL_REG_VALUE_OFFSET: u16 = 0xc8;

const_assert!(TABLE_ADDRESS_OFFSET == TABLE_VALUE_OFFSET + 4);
const_assert!(CONTROL_REG_VALUE_OFFSET == TABLE_ADDRESS_OFFSET + 4);
const_assert!(TABLE_VALUE_OFFSET % 4 == 0);

/// The stashed `(address, value, control)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmuPatch {
    /// Physical address of the table entry
    pub address: u32,
    /// Value the entry held before the patch
    pub value: u32,
    /// CPU control register value
    pub control: u32,
}

impl MmuPatch {
    /// Load the triple from the scratch-pad
    pub fn read<R: RegisterAccess + ?Sized>(regs: &R) -> Self {
        Self {
            address: regs.read(Reg::scratchpad(TABLE_ADDRESS_OFFSET)),
            value: regs.read(Reg::scratchpad(TABLE_VALUE_OFFSET)),
            control: regs.read(Reg::scratchpad(CONTROL_REG_VALUE_OFFSET)),
        }
    }

    /// Store the triple into the scratch-pad
    pub fn stash<R: RegisterAccess + ?Sized>(&self, regs: &R) {
        log::debug!(
            "scratchpad: stash table entry {:#010x} = {:#010x}",
            self.address,
            self.value
        );
        regs.write(Reg::scratchpad(TABLE_VALUE_OFFSET), self.value);
        regs.write(Reg::scratchpad(TABLE_ADDRESS_OFFSET), self.address);
        regs.write(Reg::scratchpad(CONTROL_REG_VALUE_OFFSET), self.control);
    }
}
