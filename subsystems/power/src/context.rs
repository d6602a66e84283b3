//! # Context Save and Restore
//!
//! Helpers that preserve SoC state across CORE off-mode: padconf and module
//! context, secure RAM, the IO daisy chain, and the MMU table entry patched
//! for the off-mode resume path.

use omap3_hal::prcm::{self, Module, WkupEvents};
use omap3_hal::scratchpad::MmuPatch;
use omap3_hal::{scm, CpuOps, Reg, RegisterAccess, SocInfo};

use crate::error::{PmError, PmResult};
use crate::manager::PowerManager;
use crate::platform::{LowPowerRoutines, Platform};
use crate::state::PowerState;

const WKUP_WKEN: Reg = Reg::prm(Module::WKUP, prcm::PM_WKEN1);
const WKUP_WKST: Reg = Reg::prm(Module::WKUP, prcm::PM_WKST1);

/// Save CORE context that off-mode destroys
///
/// Padconf goes through the hardware-assisted save, then the last pad is
/// copied by hand because the hardware copy may drop it (errata 1.157 and
/// 1.185).
pub fn core_save_context<R, P>(regs: &R, platform: &P, padconf_save_limit: u32)
where
    R: RegisterAccess + ?Sized,
    P: Platform + ?Sized,
{
    regs.set_bits(scm::PADCONF_OFF, scm::START_PADCONF_SAVE);
    let mut done = false;
    for _ in 0..padconf_save_limit {
        if regs.read(scm::GENERAL_PURPOSE_STATUS) & scm::PADCONF_SAVE_DONE != 0 {
            done = true;
            break;
        }
        core::hint::spin_loop();
    }
    if !done {
        log::warn!("padconf save did not complete");
    }

    regs.write(scm::MEM_WKUP_ETK_D14, regs.read(scm::PADCONF_ETK_D14));

    platform.intc_save_context();
    platform.gpmc_save_context();
    platform.control_save_context();
}

/// Restore CORE context; padconf is restored by hardware
pub fn core_restore_context<P: Platform + ?Sized>(platform: &P) {
    platform.control_restore_context();
    platform.gpmc_restore_context();
    platform.intc_restore_context();
}

/// Arm the IO daisy chain so pad events are captured in low power
///
/// No-op before ES3.1. Fails with [`PmError::Timeout`] if the chain never
/// reports active.
pub fn enable_io_chain<R: RegisterAccess + ?Sized>(
    regs: &R,
    soc: &SocInfo,
    limit: u32,
) -> PmResult<()> {
    if !soc.has_io_chain() {
        return Ok(());
    }
    regs.set_bits(WKUP_WKEN, WkupEvents::IO_CHAIN.bits());
    // Read back so the write has landed before polling
    regs.read(WKUP_WKEN);

    for _ in 0..limit {
        if regs.read(WKUP_WKST) & WkupEvents::IO_CHAIN.bits() != 0 {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(PmError::Timeout)
}

/// Disarm the IO daisy chain
pub fn disable_io_chain<R: RegisterAccess + ?Sized>(regs: &R, soc: &SocInfo) {
    if soc.has_io_chain() {
        regs.clear_bits(WKUP_WKEN, WkupEvents::IO_CHAIN.bits());
    }
}

/// Undo the boot-time MMU table patch after an MPU off-mode wake-up
pub fn restore_table_entry<R, C>(regs: &R, cpu: &C)
where
    R: RegisterAccess + ?Sized,
    C: CpuOps + ?Sized,
{
    let patch = MmuPatch::read(regs);
    // SAFETY: boot code stashed the physical address of the entry it patched
    unsafe { cpu.write_phys(patch.address, patch.value) };
    cpu.flush_tlb_all();
    // Re-enables caches and branch prediction
    cpu.write_control_register(patch.control);
}

impl<R, P, L, C> PowerManager<R, P, L, C>
where
    R: RegisterAccess,
    P: Platform,
    L: LowPowerRoutines,
    C: CpuOps,
{
    /// Save secure RAM through the secure monitor
    ///
    /// Only meaningful on EMU/HS silicon. MPU is held ON for the duration
    /// because the ROM code executes WFI. A non-zero monitor status halts
    /// the system.
    pub fn save_secure_ram_context(&mut self, target_mpu_state: PowerState) {
        if self.config.soc.is_gp() {
            return;
        }
        let mpu = self.registry.pwrdm(self.domains.mpu);
        let clkdm = self.domains.mpu_clkdm.map(|id| self.registry.clkdm(id));

        if let Err(err) = mpu.set_next_state(&self.regs, PowerState::On) {
            log::warn!("{}: cannot hold ON for secure save: {}", mpu.name(), err);
        }
        if let Some(clkdm) = clkdm {
            clkdm.deny_idle(&self.regs);
        }

        let status = self.routines.save_secure_ram(self.config.secure_storage);

        if let Err(err) = mpu.set_next_state(&self.regs, target_mpu_state) {
            log::warn!("{}: cannot restore next state: {}", mpu.name(), err);
        }
        if let Some(clkdm) = clkdm {
            clkdm.allow_idle(&self.regs);
        }

        if let Err(code) = status {
            log::error!("save_secure_sram() returns {:08x}", code);
            self.platform.halt();
        }
    }
}
