//! # Wake-up Events
//!
//! Clearing latched wake-up status, masking nuisance sources around suspend,
//! and working out what woke the system.
//!
//! ## Clearing Protocol
//!
//! ```text
//!   wkst = WKST & MPUGRPSEL
//!   save ICLKEN, FCLKEN
//!   while wkst != 0:
//!       ICLKEN |= wkst, FCLKEN |= wkst     (module must be clocked to clear)
//!       WKST = wkst                         (write 1 to clear)
//!       wkst = WKST & MPUGRPSEL             (a new event may have landed)
//!   restore ICLKEN, FCLKEN
//! ```

use omap3_hal::prcm::{self, Module, PerEvents, WkupEvents};
use omap3_hal::{scm, Reg, RegisterAccess, SocInfo};

use crate::config::PmConfig;

/// Wake-up register group of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeGroup {
    /// `PM_WKST1`, `PM_MPUGRPSEL1`, `CM_FCLKEN1`, `CM_ICLKEN1`
    Group1,
    /// `PM_WKST3`, `PM_MPUGRPSEL3`, `CM_FCLKEN3`, `CM_ICLKEN3`
    Group3,
}

impl WakeGroup {
    const fn offsets(self) -> (u16, u16, u16, u16) {
        match self {
            WakeGroup::Group1 => (
                prcm::PM_WKST1,
                prcm::PM_MPUGRPSEL1,
                prcm::CM_FCLKEN1,
                prcm::CM_ICLKEN1,
            ),
            WakeGroup::Group3 => (
                prcm::PM_WKST3,
                prcm::PM_MPUGRPSEL3,
                prcm::CM_FCLKEN3,
                prcm::CM_ICLKEN3,
            ),
        }
    }
}

/// Clear every MPU-grouped wake-up event latched in `module`/`group`
///
/// Returns the number of clear iterations. The loop stops after `limit`
/// iterations even if events keep arriving.
pub fn clear_module_wakeups<R: RegisterAccess + ?Sized>(
    regs: &R,
    module: Module,
    group: WakeGroup,
    limit: u32,
) -> u32 {
    let (wkst_off, grpsel_off, fclk_off, iclk_off) = group.offsets();
    let wkst_reg = Reg::prm(module, wkst_off);
    let fclk_reg = Reg::cm(module, fclk_off);
    let iclk_reg = Reg::cm(module, iclk_off);

    let grpsel = regs.read(Reg::prm(module, grpsel_off));
    let mut wkst = regs.read(wkst_reg) & grpsel;
    if wkst == 0 {
        return 0;
    }

    let iclk = regs.read(iclk_reg);
    let fclk = regs.read(fclk_reg);
    let mut count = 0;
    while wkst != 0 {
        if count >= limit {
            log::warn!(
                "prcm: {:?} wake-up status {:#010x} still latched after {} passes",
                wkst_reg,
                wkst,
                count
            );
            break;
        }
        let mut clken = wkst;
        regs.set_bits(iclk_reg, clken);
        // Either host port may have woken us: clock both
        if module == Module::USBHOST {
            clken |= 1 << prcm::EN_USBHOST2_SHIFT;
        }
        regs.set_bits(fclk_reg, clken);
        regs.write(wkst_reg, wkst);
        wkst = regs.read(wkst_reg) & grpsel;
        count += 1;
    }
    regs.write(iclk_reg, iclk);
    regs.write(fclk_reg, fclk);

    count
}

/// Clear wake-up events in every module that can wake the MPU
pub fn clear_all_wakeups<R: RegisterAccess + ?Sized>(regs: &R, soc: &SocInfo, limit: u32) -> u32 {
    // Software owns EN_IO and EN_IO_CHAIN from ES3.1 on; re-armed on sleep
    if soc.has_io_chain() {
        regs.clear_bits(
            Reg::prm(Module::WKUP, prcm::PM_WKEN1),
            (WkupEvents::IO | WkupEvents::IO_CHAIN).bits(),
        );
    }

    let mut count = clear_module_wakeups(regs, Module::WKUP, WakeGroup::Group1, limit);
    count += clear_module_wakeups(regs, Module::CORE, WakeGroup::Group1, limit);
    count += clear_module_wakeups(regs, Module::PER, WakeGroup::Group1, limit);
    if soc.has_es2_registers() {
        count += clear_module_wakeups(regs, Module::CORE, WakeGroup::Group3, limit);
        count += clear_module_wakeups(regs, Module::USBHOST, WakeGroup::Group1, limit);
    }
    count
}

// =============================================================================
// Suspend Wake-up Masks
// =============================================================================

/// PER sources that must not wake the system from suspend
pub const PER_SUSPEND_MASKED: PerEvents = PerEvents::UART3.union(PerEvents::MCBSP2);

/// Wake-enable registers captured before suspend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeMasks {
    /// CORE `PM_WKEN1`
    pub core: u32,
    /// CORE `PM_WKEN3`
    pub core3: u32,
    /// WKUP `PM_WKEN1`
    pub wkup: u32,
    /// PER `PM_WKEN1`
    pub per: u32,
    /// USBHOST `PM_WKEN1`
    pub usbhost: u32,
}

impl WakeMasks {
    /// Snapshot the wake-enable registers
    pub fn save<R: RegisterAccess + ?Sized>(regs: &R) -> Self {
        Self {
            core: regs.read(Reg::prm(Module::CORE, prcm::PM_WKEN1)),
            core3: regs.read(Reg::prm(Module::CORE, prcm::PM_WKEN3)),
            wkup: regs.read(Reg::prm(Module::WKUP, prcm::PM_WKEN1)),
            per: regs.read(Reg::prm(Module::PER, prcm::PM_WKEN1)),
            usbhost: regs.read(Reg::prm(Module::USBHOST, prcm::PM_WKEN1)),
        }
    }

    /// Leave only the wanted suspend wake-up sources enabled
    ///
    /// CORE and USBHOST sources are disabled, PER keeps everything but
    /// UART3 and McBSP2, WKUP is untouched.
    pub fn mask<R: RegisterAccess + ?Sized>(&self, regs: &R, soc: &SocInfo) {
        regs.write(Reg::prm(Module::CORE, prcm::PM_WKEN1), 0);
        regs.write(
            Reg::prm(Module::PER, prcm::PM_WKEN1),
            self.per & !PER_SUSPEND_MASKED.bits(),
        );
        if soc.has_es2_registers() {
            regs.write(Reg::prm(Module::CORE, prcm::PM_WKEN3), 0);
            regs.write(Reg::prm(Module::USBHOST, prcm::PM_WKEN1), 0);
        }
    }

    /// Put the snapshot back
    pub fn restore<R: RegisterAccess + ?Sized>(&self, regs: &R, soc: &SocInfo) {
        regs.write(Reg::prm(Module::CORE, prcm::PM_WKEN1), self.core);
        regs.write(Reg::prm(Module::PER, prcm::PM_WKEN1), self.per);
        if soc.has_es2_registers() {
            regs.write(Reg::prm(Module::CORE, prcm::PM_WKEN3), self.core3);
            regs.write(Reg::prm(Module::USBHOST, prcm::PM_WKEN1), self.usbhost);
        }
    }
}

// =============================================================================
// Wake-up Record
// =============================================================================

/// Why the system woke up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupReason {
    /// Not determined
    Unknown,
    /// Power button
    PowerKey,
    /// Charger or USB cable plugged
    Cable,
    /// RTC alarm
    Rtc,
    /// Keypad
    Keypad,
    /// SD card detect
    SdCard,
    /// SIM card detect
    SimCard,
    /// Board-specific source
    Board(u16),
}

/// Wake-up status captured right after a suspend wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeupRecord {
    /// CORE `PM_WKST1`
    pub core: u32,
    /// CORE `PM_WKST3`
    pub core3: u32,
    /// WKUP `PM_WKST1`
    pub wkup: u32,
    /// PER `PM_WKST1`
    pub per: u32,
    /// USBHOST `PM_WKST1`
    pub usbhost: u32,
    /// Padconf offset whose `WAKEUPEVENT` bit was set
    pub event_pad: Option<u16>,
}

impl WakeupRecord {
    /// Read the wake-up status registers and find the triggering pad
    pub fn capture<R: RegisterAccess + ?Sized>(regs: &R) -> Self {
        Self {
            core: regs.read(Reg::prm(Module::CORE, prcm::PM_WKST1)),
            core3: regs.read(Reg::prm(Module::CORE, prcm::PM_WKST3)),
            wkup: regs.read(Reg::prm(Module::WKUP, prcm::PM_WKST1)),
            per: regs.read(Reg::prm(Module::PER, prcm::PM_WKST1)),
            usbhost: regs.read(Reg::prm(Module::USBHOST, prcm::PM_WKST1)),
            event_pad: find_wakeup_event(regs),
        }
    }

    /// Whether an IO pad woke the system
    pub fn io_wakeup(&self) -> bool {
        WkupEvents::from_bits_retain(self.wkup).contains(WkupEvents::IO)
    }

    /// Map the record to a reason using the board configuration
    ///
    /// `pmic` resolves wake-ups that came through the PMIC interrupt pad.
    pub fn reason(&self, config: &PmConfig, pmic: impl FnOnce() -> WakeupReason) -> WakeupReason {
        if !self.io_wakeup() {
            return WakeupReason::Unknown;
        }
        let Some(pad) = self.event_pad else {
            return WakeupReason::Unknown;
        };
        if config.pmic_pad == Some(pad) {
            return pmic();
        }
        match config.wake_source(pad) {
            Some(source) => {
                log::info!("wake-up reason: {} (pad {:#x})", source.name, pad);
                source.reason
            },
            None => WakeupReason::Unknown,
        }
    }
}

/// First pad whose `WAKEUPEVENT` bit is set
pub fn find_wakeup_event<R: RegisterAccess + ?Sized>(regs: &R) -> Option<u16> {
    scm::padconf_offsets().find(|&offset| {
        let value = regs.read16(Reg::control(offset));
        if value & scm::PADCONF_WAKEUPEVENT != 0 {
            log::debug!("padconf {:#x} [{:#06x}]: wake-up event", offset, value);
            true
        } else {
            false
        }
    })
}

/// Log every pad allowed to wake the system
pub fn log_wakeup_enables<R: RegisterAccess + ?Sized>(regs: &R) {
    for offset in scm::padconf_offsets() {
        let value = regs.read16(Reg::control(offset));
        if value & scm::PADCONF_WAKEUPENABLE != 0 {
            log::debug!("padconf {:#x} [{:#06x}]: wake-up enabled", offset, value);
        }
    }
}
