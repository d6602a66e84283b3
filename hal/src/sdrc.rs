//! SDRAM controller registers touched by the power management core.

use crate::regs::Reg;

/// `SDRC_POWER`
///
/// ROM code restores this from the scratch-pad with auto self-refresh on
/// `AUTO_CNT = 1` after off-mode on EMU/HS devices (errata 1.142), so the
/// idle path snapshots and rewrites it.
pub const POWER: Reg = Reg::sdrc(0x70);
