//! # Clock Domains
//!
//! Clock gating islands inside a power domain. Transition control goes
//! through the module's `CM_CLKSTCTRL` field; wake-up and sleep
//! dependencies are bits in `PM_WKDEP` and `CM_SLEEPDEP` of the dependent
//! domain, reference counted per edge.

use bitflags::bitflags;

use omap3_hal::prcm::{self, clktrctrl, Module};
use omap3_hal::{Reg, RegisterAccess};

use crate::error::{PmError, PmResult};

bitflags! {
    /// Supported transition controls
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockDomainFlags: u32 {
        /// Software may force the domain to sleep
        const CAN_FORCE_SLEEP = 1 << 0;
        /// Software may force the domain awake
        const CAN_FORCE_WAKEUP = 1 << 1;
        /// Hardware-supervised idle may be enabled
        const CAN_ENABLE_AUTO = 1 << 2;
        /// Hardware-supervised idle may be disabled
        const CAN_DISABLE_AUTO = 1 << 3;

        /// Software supervised
        const CAN_SWSUP = Self::CAN_FORCE_SLEEP.bits() | Self::CAN_FORCE_WAKEUP.bits();
        /// Hardware supervised
        const CAN_HWSUP = Self::CAN_ENABLE_AUTO.bits() | Self::CAN_DISABLE_AUTO.bits();
        /// Both
        const CAN_HWSUP_SWSUP = Self::CAN_SWSUP.bits() | Self::CAN_HWSUP.bits();
    }
}

/// Index of a clock domain in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClkdmId(pub(crate) u8);

/// Static description of a clock domain
#[derive(Debug, Clone, Copy)]
pub struct ClockDomainDesc {
    /// Registry name
    pub name: &'static str,
    /// Owning power domain
    pub pwrdm: &'static str,
    /// PRM/CM module
    pub module: Module,
    /// `CM_CLKSTCTRL` field of this domain (zero if absent)
    pub clktrctrl_mask: u32,
    /// Supported transition controls
    pub flags: ClockDomainFlags,
    /// Bit identifying this domain as a dependency source
    pub dep_bit: Option<u8>,
    /// Dependency bits this domain may wake with
    pub wkdep_srcs: u32,
    /// Dependency bits this domain may be kept awake by
    pub sleepdep_srcs: u32,
}

/// A clock domain
#[derive(Debug, Clone)]
pub struct ClockDomain {
    desc: ClockDomainDesc,
    wkdep_users: [u8; 8],
    sleepdep_users: [u8; 8],
    usecount: u32,
}

impl ClockDomain {
    /// Create a domain from its description
    pub const fn new(desc: ClockDomainDesc) -> Self {
        Self {
            desc,
            wkdep_users: [0; 8],
            sleepdep_users: [0; 8],
            usecount: 0,
        }
    }

    /// Registry name
    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    /// Owning power domain name
    pub fn pwrdm_name(&self) -> &'static str {
        self.desc.pwrdm
    }

    /// Supported transition controls
    pub fn flags(&self) -> ClockDomainFlags {
        self.desc.flags
    }

    /// Number of enabled clocks in the domain
    pub fn usecount(&self) -> u32 {
        self.usecount
    }

    /// A clock in the domain was enabled
    ///
    /// The first user takes the domain out of automatic idle.
    pub fn acquire<R: RegisterAccess + ?Sized>(&mut self, regs: &R) {
        self.usecount += 1;
        if self.usecount > 1 {
            return;
        }
        if self.desc.flags.contains(ClockDomainFlags::CAN_DISABLE_AUTO) {
            self.deny_idle(regs);
        } else if let Err(err) = self.wakeup(regs) {
            log::debug!("{}: cannot force wake-up: {}", self.desc.name, err);
        }
    }

    /// A clock in the domain was disabled
    ///
    /// The last user hands the domain back to its idle policy. Fails on a
    /// release without a matching acquire.
    pub fn release<R: RegisterAccess + ?Sized>(&mut self, regs: &R) -> PmResult<()> {
        if self.usecount == 0 {
            return Err(PmError::InvalidArgument);
        }
        self.usecount -= 1;
        if self.usecount == 0 {
            self.setup_idle(regs);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dependencies
    // -------------------------------------------------------------------------

    fn dep_mask(target: &ClockDomain, srcs: u32) -> PmResult<(u8, u32)> {
        let bit = target.desc.dep_bit.ok_or(PmError::InvalidArgument)?;
        let mask = 1u32 << bit;
        if srcs & mask == 0 {
            return Err(PmError::InvalidArgument);
        }
        Ok((bit, mask))
    }

    /// Wake this domain whenever `target` wakes
    pub fn add_wkdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        target: &ClockDomain,
    ) -> PmResult<()> {
        let (bit, mask) = Self::dep_mask(target, self.desc.wkdep_srcs)?;
        let users = &mut self.wkdep_users[bit as usize];
        *users += 1;
        if *users == 1 {
            log::debug!("{}: wake-up dependency on {}", self.desc.name, target.desc.name);
            regs.set_bits(Reg::prm(self.desc.module, prcm::PM_WKDEP), mask);
        }
        Ok(())
    }

    /// Drop one reference on the wake-up dependency on `target`
    pub fn del_wkdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        target: &ClockDomain,
    ) -> PmResult<()> {
        let (bit, mask) = Self::dep_mask(target, self.desc.wkdep_srcs)?;
        let users = &mut self.wkdep_users[bit as usize];
        if *users == 0 {
            return Err(PmError::InvalidArgument);
        }
        *users -= 1;
        if *users == 0 {
            regs.clear_bits(Reg::prm(self.desc.module, prcm::PM_WKDEP), mask);
        }
        Ok(())
    }

    /// Keep this domain awake while `target` is awake
    pub fn add_sleepdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        target: &ClockDomain,
    ) -> PmResult<()> {
        let (bit, mask) = Self::dep_mask(target, self.desc.sleepdep_srcs)?;
        let users = &mut self.sleepdep_users[bit as usize];
        *users += 1;
        if *users == 1 {
            log::debug!("{}: sleep dependency on {}", self.desc.name, target.desc.name);
            regs.set_bits(Reg::cm(self.desc.module, prcm::CM_SLEEPDEP), mask);
        }
        Ok(())
    }

    /// Drop one reference on the sleep dependency on `target`
    pub fn del_sleepdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        target: &ClockDomain,
    ) -> PmResult<()> {
        let (bit, mask) = Self::dep_mask(target, self.desc.sleepdep_srcs)?;
        let users = &mut self.sleepdep_users[bit as usize];
        if *users == 0 {
            return Err(PmError::InvalidArgument);
        }
        *users -= 1;
        if *users == 0 {
            regs.clear_bits(Reg::cm(self.desc.module, prcm::CM_SLEEPDEP), mask);
        }
        Ok(())
    }

    /// Number of holders of the wake-up dependency on `target`
    pub fn wkdep_users(&self, target: &ClockDomain) -> u8 {
        target
            .desc
            .dep_bit
            .map_or(0, |bit| self.wkdep_users[bit as usize])
    }

    /// Number of holders of the sleep dependency on `target`
    pub fn sleepdep_users(&self, target: &ClockDomain) -> u8 {
        target
            .desc
            .dep_bit
            .map_or(0, |bit| self.sleepdep_users[bit as usize])
    }

    /// Drop every wake-up dependency
    pub fn clear_all_wkdeps<R: RegisterAccess + ?Sized>(&mut self, regs: &R) {
        if self.desc.wkdep_srcs != 0 {
            regs.clear_bits(Reg::prm(self.desc.module, prcm::PM_WKDEP), self.desc.wkdep_srcs);
        }
        self.wkdep_users = [0; 8];
    }

    /// Drop every sleep dependency
    pub fn clear_all_sleepdeps<R: RegisterAccess + ?Sized>(&mut self, regs: &R) {
        if self.desc.sleepdep_srcs != 0 {
            regs.clear_bits(
                Reg::cm(self.desc.module, prcm::CM_SLEEPDEP),
                self.desc.sleepdep_srcs,
            );
        }
        self.sleepdep_users = [0; 8];
    }

    // -------------------------------------------------------------------------
    // Transition control
    // -------------------------------------------------------------------------

    fn write_clktrctrl<R: RegisterAccess + ?Sized>(&self, regs: &R, value: u32) {
        let mask = self.desc.clktrctrl_mask;
        if mask == 0 {
            return;
        }
        regs.modify(
            Reg::cm(self.desc.module, prcm::CM_CLKSTCTRL),
            mask,
            value << mask.trailing_zeros(),
        );
    }

    /// Enable hardware-supervised idle
    ///
    /// Left alone while any clock in the domain is enabled.
    pub fn allow_idle<R: RegisterAccess + ?Sized>(&self, regs: &R) {
        if !self.desc.flags.contains(ClockDomainFlags::CAN_ENABLE_AUTO) {
            log::debug!("{}: automatic idle not supported", self.desc.name);
            return;
        }
        if self.usecount > 0 {
            log::debug!("{}: busy ({}), not idling", self.desc.name, self.usecount);
            return;
        }
        self.write_clktrctrl(regs, clktrctrl::ENABLE_AUTO);
    }

    /// Disable hardware-supervised idle
    pub fn deny_idle<R: RegisterAccess + ?Sized>(&self, regs: &R) {
        if !self.desc.flags.contains(ClockDomainFlags::CAN_DISABLE_AUTO) {
            log::debug!("{}: automatic idle cannot be disabled", self.desc.name);
            return;
        }
        self.write_clktrctrl(regs, clktrctrl::DISABLE_AUTO);
    }

    /// Force the domain to sleep
    pub fn sleep<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<()> {
        if !self.desc.flags.contains(ClockDomainFlags::CAN_FORCE_SLEEP) {
            return Err(PmError::InvalidArgument);
        }
        self.write_clktrctrl(regs, clktrctrl::FORCE_SLEEP);
        Ok(())
    }

    /// Force the domain awake
    pub fn wakeup<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<()> {
        if !self.desc.flags.contains(ClockDomainFlags::CAN_FORCE_WAKEUP) {
            return Err(PmError::InvalidArgument);
        }
        self.write_clktrctrl(regs, clktrctrl::FORCE_WAKEUP);
        Ok(())
    }

    /// Init-time idle policy: automatic idle where supported, else forced
    /// sleep when unused
    pub fn setup_idle<R: RegisterAccess + ?Sized>(&self, regs: &R) {
        let flags = self.desc.flags;
        if flags.contains(ClockDomainFlags::CAN_ENABLE_AUTO) && self.usecount == 0 {
            self.allow_idle(regs);
        } else if flags.contains(ClockDomainFlags::CAN_FORCE_SLEEP) && self.usecount == 0 {
            // Cannot fail: capability checked above
            let _ = self.sleep(regs);
        }
    }
}
