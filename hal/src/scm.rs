//! # System Control Module
//!
//! Padconf and general-purpose registers used around off-mode transitions.
//! Padconf registers are 16 bits wide; two pads share each 32-bit word.

use crate::regs::Reg;

/// `CONTROL_SYSCONFIG`
pub const SYSCONFIG: Reg = Reg::control(0x010);
/// `CONTROL_SYSCONFIG.AUTOIDLE`
pub const SYSCONFIG_AUTOIDLE: u32 = 1 << 0;

/// `CONTROL_PADCONF_OFF`
pub const PADCONF_OFF: Reg = Reg::control(0x270);
/// Start the hardware-assisted padconf save
pub const START_PADCONF_SAVE: u32 = 1 << 1;

/// `CONTROL_GENERAL_PURPOSE_STATUS`
pub const GENERAL_PURPOSE_STATUS: Reg = Reg::control(0x2f4);
/// Padconf save finished
pub const PADCONF_SAVE_DONE: u32 = 1 << 0;

/// `CONTROL_IVA2_BOOTMOD`
pub const IVA2_BOOTMOD: Reg = Reg::control(0x404);
/// IVA2 boots into idle
pub const IVA2_BOOTMOD_IDLE: u32 = 0x1;

/// Wake-up memory area holding the saved padconf image
pub const MEM_WKUP: u16 = 0x600;
/// Last pad of the padconf image (`ETK_D14`)
pub const PADCONF_ETK_D14: Reg = Reg::control(0x5f8);
/// Slot of `ETK_D14` inside the wake-up memory image
pub const MEM_WKUP_ETK_D14: Reg = Reg::control(MEM_WKUP + 0x2a0);

/// `SAD2D_MSTANDBY` pad
pub const PADCONF_SAD2D_MSTANDBY: Reg = Reg::control(0x250);
/// `SAD2D_IDLEACK` pad
pub const PADCONF_SAD2D_IDLEACK: Reg = Reg::control(0x254);
/// Pull enabled, pull up
pub const PADCONF_PULL_UP: u16 = (1 << 4) | (1 << 3);

/// `SYS_NIRQ` pad
pub const PADCONF_SYS_NIRQ: u16 = 0x1e0;
/// Pad mux mode field
pub const PADCONF_MUXMODE_MASK: u16 = 0x7;
/// Safe/GPIO mux mode used to park `SYS_NIRQ` during suspend
pub const PADCONF_MUXMODE_GPIO: u16 = 0x4;

/// Pad may wake the system
pub const PADCONF_WAKEUPENABLE: u16 = 1 << 14;
/// Pad woke the system
pub const PADCONF_WAKEUPEVENT: u16 = 1 << 15;

/// First padconf register (`SDRC_D0`)
pub const PADCONF_FIRST: u16 = 0x030;
/// End of the first padconf bank (exclusive)
pub const PADCONF_GAP_START: u16 = 0x268;
/// Start of the second padconf bank
pub const PADCONF_GAP_END: u16 = 0x5a0;
/// Last padconf register (`ETK_D14` upper half)
pub const PADCONF_LAST: u16 = 0x5fa;

/// Iterate over every padconf register offset, skipping the hole between
/// the two banks
pub fn padconf_offsets() -> impl Iterator<Item = u16> {
    (PADCONF_FIRST..PADCONF_GAP_START)
        .step_by(2)
        .chain((PADCONF_GAP_END..=PADCONF_LAST).step_by(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padconf_walk_skips_gap() {
        let offsets: Vec<u16> = padconf_offsets().collect();
        assert_eq!(offsets.first(), Some(&PADCONF_FIRST));
        assert_eq!(offsets.last(), Some(&PADCONF_LAST));
        assert!(offsets.contains(&PADCONF_SYS_NIRQ));
        assert!(!offsets.iter().any(|&o| (PADCONF_GAP_START..PADCONF_GAP_END).contains(&o)));
        assert!(offsets.iter().all(|o| o % 2 == 0));
    }
}
