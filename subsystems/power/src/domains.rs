//! # Domain Registry
//!
//! The OMAP34xx/36xx power and clock domain tables and the registry the rest
//! of the core resolves domains through. Iteration follows table order.

use alloc::vec::Vec;

use omap3_hal::prcm::{depbit, Module};
use omap3_hal::{RegisterAccess, SocInfo};

use crate::clockdomain::{ClkdmId, ClockDomain, ClockDomainDesc, ClockDomainFlags};
use crate::error::{PmError, PmResult};
use crate::powerdomain::{DomainFlags, PowerDomain, PowerDomainDesc, PwrdmId, StateSource};
use crate::state::{PowerState, PowerStates};

// =============================================================================
// OMAP3 Tables
// =============================================================================

const fn dep(bit: u8) -> u32 {
    1 << bit
}

/// OMAP3 power domains
pub const OMAP3_POWERDOMAINS: &[PowerDomainDesc] = &[
    PowerDomainDesc {
        name: "iva2_pwrdm",
        module: Module::IVA2,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::EXTERNALLY_OWNED,
        clkdm: Some("iva2_clkdm"),
    },
    PowerDomainDesc {
        name: "mpu_pwrdm",
        module: Module::MPU,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("mpu_clkdm"),
    },
    PowerDomainDesc {
        name: "neon_pwrdm",
        module: Module::NEON,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("neon_clkdm"),
    },
    PowerDomainDesc {
        name: "core_pwrdm",
        module: Module::CORE,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::HW_SAR,
        clkdm: Some("core_l3_clkdm"),
    },
    PowerDomainDesc {
        name: "sgx_pwrdm",
        module: Module::SGX,
        states: PowerStates::OFF_ON,
        flags: DomainFlags::ES2_ONLY,
        clkdm: Some("sgx_clkdm"),
    },
    PowerDomainDesc {
        name: "dss_pwrdm",
        module: Module::DSS,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("dss_clkdm"),
    },
    PowerDomainDesc {
        name: "cam_pwrdm",
        module: Module::CAM,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("cam_clkdm"),
    },
    PowerDomainDesc {
        name: "per_pwrdm",
        module: Module::PER,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("per_clkdm"),
    },
    PowerDomainDesc {
        name: "emu_pwrdm",
        module: Module::EMU,
        states: PowerStates::empty(),
        flags: DomainFlags::empty(),
        clkdm: Some("emu_clkdm"),
    },
    PowerDomainDesc {
        name: "wkup_pwrdm",
        module: Module::WKUP,
        states: PowerStates::ON,
        flags: DomainFlags::empty(),
        clkdm: Some("wkup_clkdm"),
    },
    PowerDomainDesc {
        name: "usbhost_pwrdm",
        module: Module::USBHOST,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::HW_SAR.union(DomainFlags::ES2_ONLY),
        clkdm: Some("usbhost_clkdm"),
    },
];

/// OMAP3 clock domains
pub const OMAP3_CLOCKDOMAINS: &[ClockDomainDesc] = &[
    ClockDomainDesc {
        name: "mpu_clkdm",
        pwrdm: "mpu_pwrdm",
        module: Module::MPU,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP.union(ClockDomainFlags::CAN_FORCE_WAKEUP),
        dep_bit: Some(depbit::MPU),
        wkdep_srcs: dep(depbit::CORE) | dep(depbit::IVA2) | dep(depbit::DSS) | dep(depbit::PER),
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "neon_clkdm",
        pwrdm: "neon_pwrdm",
        module: Module::NEON,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: None,
        wkdep_srcs: dep(depbit::MPU),
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "iva2_clkdm",
        pwrdm: "iva2_pwrdm",
        module: Module::IVA2,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: Some(depbit::IVA2),
        wkdep_srcs: dep(depbit::CORE)
            | dep(depbit::MPU)
            | dep(depbit::WKUP)
            | dep(depbit::DSS)
            | dep(depbit::PER),
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "sgx_clkdm",
        pwrdm: "sgx_pwrdm",
        module: Module::SGX,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: None,
        wkdep_srcs: dep(depbit::CORE) | dep(depbit::MPU) | dep(depbit::IVA2) | dep(depbit::WKUP),
        sleepdep_srcs: dep(depbit::MPU),
    },
    ClockDomainDesc {
        name: "core_l3_clkdm",
        pwrdm: "core_pwrdm",
        module: Module::CORE,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP,
        dep_bit: Some(depbit::CORE),
        wkdep_srcs: 0,
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "core_l4_clkdm",
        pwrdm: "core_pwrdm",
        module: Module::CORE,
        clktrctrl_mask: 0xc,
        flags: ClockDomainFlags::CAN_HWSUP,
        dep_bit: Some(depbit::CORE),
        wkdep_srcs: 0,
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "dss_clkdm",
        pwrdm: "dss_pwrdm",
        module: Module::DSS,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: Some(depbit::DSS),
        wkdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2) | dep(depbit::WKUP),
        sleepdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2),
    },
    ClockDomainDesc {
        name: "cam_clkdm",
        pwrdm: "cam_pwrdm",
        module: Module::CAM,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: None,
        wkdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2) | dep(depbit::WKUP),
        sleepdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2),
    },
    ClockDomainDesc {
        name: "usbhost_clkdm",
        pwrdm: "usbhost_pwrdm",
        module: Module::USBHOST,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: None,
        wkdep_srcs: dep(depbit::CORE) | dep(depbit::MPU) | dep(depbit::IVA2) | dep(depbit::WKUP),
        sleepdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2),
    },
    ClockDomainDesc {
        name: "per_clkdm",
        pwrdm: "per_pwrdm",
        module: Module::PER,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_HWSUP_SWSUP,
        dep_bit: Some(depbit::PER),
        wkdep_srcs: dep(depbit::CORE) | dep(depbit::MPU) | dep(depbit::IVA2) | dep(depbit::WKUP),
        sleepdep_srcs: dep(depbit::MPU) | dep(depbit::IVA2),
    },
    ClockDomainDesc {
        name: "emu_clkdm",
        pwrdm: "emu_pwrdm",
        module: Module::EMU,
        clktrctrl_mask: 0x3,
        flags: ClockDomainFlags::CAN_ENABLE_AUTO.union(ClockDomainFlags::CAN_SWSUP),
        dep_bit: None,
        wkdep_srcs: 0,
        sleepdep_srcs: 0,
    },
    ClockDomainDesc {
        name: "wkup_clkdm",
        pwrdm: "wkup_pwrdm",
        module: Module::WKUP,
        clktrctrl_mask: 0,
        flags: ClockDomainFlags::empty(),
        dep_bit: Some(depbit::WKUP),
        wkdep_srcs: 0,
        sleepdep_srcs: 0,
    },
];

// =============================================================================
// Registry
// =============================================================================

/// Power and clock domains of the running silicon
#[derive(Debug, Clone)]
pub struct Registry {
    pwrdms: Vec<PowerDomain>,
    pwrdm_clkdm: Vec<Option<ClkdmId>>,
    clkdms: Vec<ClockDomain>,
}

impl Registry {
    /// Build a registry from tables, dropping domains absent on `soc`
    pub fn new(
        pwrdms: &[PowerDomainDesc],
        clkdms: &[ClockDomainDesc],
        soc: &SocInfo,
    ) -> Self {
        let pwrdms: Vec<PowerDomain> = pwrdms
            .iter()
            .filter(|d| soc.has_es2_registers() || !d.flags.contains(DomainFlags::ES2_ONLY))
            .map(|d| PowerDomain::new(*d))
            .collect();
        let clkdms: Vec<ClockDomain> = clkdms
            .iter()
            .filter(|c| pwrdms.iter().any(|p| p.name() == c.pwrdm))
            .map(|c| ClockDomain::new(*c))
            .collect();
        let pwrdm_clkdm = pwrdms
            .iter()
            .map(|p| {
                p.clkdm_name()
                    .and_then(|name| clkdms.iter().position(|c| c.name() == name))
                    .map(|i| ClkdmId(i as u8))
            })
            .collect();

        Self {
            pwrdms,
            pwrdm_clkdm,
            clkdms,
        }
    }

    /// The OMAP3 registry
    pub fn omap3(soc: &SocInfo) -> Self {
        Self::new(OMAP3_POWERDOMAINS, OMAP3_CLOCKDOMAINS, soc)
    }

    /// Look up a power domain by name
    pub fn lookup_pwrdm(&self, name: &str) -> Option<PwrdmId> {
        self.pwrdms
            .iter()
            .position(|p| p.name() == name)
            .map(|i| PwrdmId(i as u8))
    }

    /// Look up a clock domain by name
    pub fn lookup_clkdm(&self, name: &str) -> Option<ClkdmId> {
        self.clkdms
            .iter()
            .position(|c| c.name() == name)
            .map(|i| ClkdmId(i as u8))
    }

    /// Power domain record
    pub fn pwrdm(&self, id: PwrdmId) -> &PowerDomain {
        &self.pwrdms[id.0 as usize]
    }

    /// Clock domain record
    pub fn clkdm(&self, id: ClkdmId) -> &ClockDomain {
        &self.clkdms[id.0 as usize]
    }

    /// Mutable clock domain record
    pub fn clkdm_mut(&mut self, id: ClkdmId) -> &mut ClockDomain {
        &mut self.clkdms[id.0 as usize]
    }

    /// First clock domain of a power domain
    pub fn pwrdm_clkdm(&self, id: PwrdmId) -> Option<ClkdmId> {
        self.pwrdm_clkdm[id.0 as usize]
    }

    /// All power domains in table order
    pub fn pwrdms(&self) -> impl Iterator<Item = (PwrdmId, &PowerDomain)> {
        self.pwrdms
            .iter()
            .enumerate()
            .map(|(i, p)| (PwrdmId(i as u8), p))
    }

    /// All clock domain ids in table order
    pub fn clkdm_ids(&self) -> impl Iterator<Item = ClkdmId> {
        (0..self.clkdms.len()).map(|i| ClkdmId(i as u8))
    }

    /// Request `state` for a domain, searching downwards for a legal state
    ///
    /// A domain asleep at the time of the request is woken through its
    /// clock domain, reprogrammed, and handed back to hardware-supervised
    /// idle.
    pub fn set_pwrdm_state<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        id: PwrdmId,
        state: PowerState,
        transition_limit: u32,
    ) -> PmResult<()> {
        let clkdm = self.pwrdm_clkdm(id).map(|c| self.clkdm(c));
        let pwrdm = self.pwrdm(id);

        let Some(state) = pwrdm.effective_state(state) else {
            return Ok(());
        };

        if pwrdm.read_next_state(regs).ok() == Some(state) {
            return Ok(());
        }

        if pwrdm.is_externally_owned() {
            return Ok(());
        }

        let sleep_switch = pwrdm.read_state(regs).ok() != Some(PowerState::On);
        if sleep_switch {
            if let Some(clkdm) = clkdm {
                if let Err(err) = clkdm.wakeup(regs) {
                    log::debug!("{}: cannot force wake-up: {}", clkdm.name(), err);
                }
            }
            // A timeout is logged by wait_transition and not fatal here
            pwrdm.wait_transition(regs, transition_limit).ok();
        }

        if let Err(err) = pwrdm.set_next_state(regs, state) {
            log::error!("Unable to set state of powerdomain: {}", pwrdm.name());
            return Err(err);
        }

        if sleep_switch {
            if let Some(clkdm) = clkdm {
                clkdm.allow_idle(regs);
            }
            pwrdm.wait_transition(regs, transition_limit).ok();
            self.pwrdms[id.0 as usize].state_switch(regs, StateSource::Now);
        }
        Ok(())
    }

    fn clkdm_pair(&mut self, a: ClkdmId, b: ClkdmId) -> PmResult<(&mut ClockDomain, &ClockDomain)> {
        let (a, b) = (a.0 as usize, b.0 as usize);
        if a == b || a >= self.clkdms.len() || b >= self.clkdms.len() {
            return Err(PmError::InvalidArgument);
        }
        if a < b {
            let (lo, hi) = self.clkdms.split_at_mut(b);
            Ok((&mut lo[a], &hi[0]))
        } else {
            let (lo, hi) = self.clkdms.split_at_mut(a);
            Ok((&mut hi[0], &lo[b]))
        }
    }

    /// Add a wake-up dependency of `clkdm` on `target`
    pub fn add_wkdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        clkdm: ClkdmId,
        target: ClkdmId,
    ) -> PmResult<()> {
        let (clkdm, target) = self.clkdm_pair(clkdm, target)?;
        clkdm.add_wkdep(regs, target)
    }

    /// Remove a wake-up dependency of `clkdm` on `target`
    pub fn del_wkdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        clkdm: ClkdmId,
        target: ClkdmId,
    ) -> PmResult<()> {
        let (clkdm, target) = self.clkdm_pair(clkdm, target)?;
        clkdm.del_wkdep(regs, target)
    }

    /// Add a sleep dependency of `clkdm` on `target`
    pub fn add_sleepdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        clkdm: ClkdmId,
        target: ClkdmId,
    ) -> PmResult<()> {
        let (clkdm, target) = self.clkdm_pair(clkdm, target)?;
        clkdm.add_sleepdep(regs, target)
    }

    /// Remove a sleep dependency of `clkdm` on `target`
    pub fn del_sleepdep<R: RegisterAccess + ?Sized>(
        &mut self,
        regs: &R,
        clkdm: ClkdmId,
        target: ClkdmId,
    ) -> PmResult<()> {
        let (clkdm, target) = self.clkdm_pair(clkdm, target)?;
        clkdm.del_sleepdep(regs, target)
    }

    /// Notify every domain that a low-power transition is about to start
    pub fn pre_transition<R: RegisterAccess + ?Sized>(&mut self, regs: &R) {
        for pwrdm in &mut self.pwrdms {
            pwrdm.clear_all_prev_states(regs);
            pwrdm.state_switch(regs, StateSource::Now);
        }
    }

    /// Notify every domain that a low-power transition has completed
    pub fn post_transition<R: RegisterAccess + ?Sized>(&mut self, regs: &R) {
        for pwrdm in &mut self.pwrdms {
            pwrdm.state_switch(regs, StateSource::Previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimRegisters;
    use omap3_hal::prcm;
    use omap3_hal::{DeviceType, Reg, Revision};

    fn registry() -> Registry {
        Registry::omap3(&SocInfo::new(Revision::Omap3430Es3_1, DeviceType::Gp))
    }

    #[test]
    fn test_es1_drops_es2_domains() {
        let es1 = Registry::omap3(&SocInfo::new(Revision::Omap3430Es1_0, DeviceType::Gp));
        assert!(es1.lookup_pwrdm("usbhost_pwrdm").is_none());
        assert!(es1.lookup_clkdm("sgx_clkdm").is_none());
        assert!(registry().lookup_pwrdm("usbhost_pwrdm").is_some());
    }

    #[test]
    fn test_pwrdm_resolves_clkdm() {
        let reg = registry();
        let core = reg.lookup_pwrdm("core_pwrdm").expect("core");
        let clkdm = reg.pwrdm_clkdm(core).expect("clkdm");
        assert_eq!(reg.clkdm(clkdm).name(), "core_l3_clkdm");
    }

    #[test]
    fn test_stuck_transition_does_not_block_state_write() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let per = reg.lookup_pwrdm("per_pwrdm").expect("per");
        sim.set(
            Reg::prm(prcm::Module::PER, prcm::PM_PWSTST),
            prcm::INTRANSITION | PowerState::Retention.raw(),
        );

        assert_eq!(reg.set_pwrdm_state(&sim, per, PowerState::Off, 4), Ok(()));
        assert_eq!(reg.pwrdm(per).read_next_state(&sim), Ok(PowerState::Off));
    }

    #[test]
    fn test_off_request_on_domain_without_off() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let wkup = reg.lookup_pwrdm("wkup_pwrdm").expect("wkup");

        for state in [PowerState::Off, PowerState::Retention] {
            assert_eq!(reg.set_pwrdm_state(&sim, wkup, state, 100), Ok(()));
        }
        assert!(sim.writes().is_empty());
        assert_eq!(reg.pwrdm(wkup).read_next_state(&sim), Ok(PowerState::On));
    }

    #[test]
    fn test_retention_request_falls_to_off() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let sgx = reg.lookup_pwrdm("sgx_pwrdm").expect("sgx");
        reg.set_pwrdm_state(&sim, sgx, PowerState::Retention, 100)
            .expect("downgraded");
        assert_eq!(reg.pwrdm(sgx).read_next_state(&sim), Ok(PowerState::Off));
    }

    #[test]
    fn test_same_state_is_noop() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let per = reg.lookup_pwrdm("per_pwrdm").expect("per");
        reg.set_pwrdm_state(&sim, per, PowerState::Retention, 100)
            .expect("set");
        sim.clear_log();

        assert_eq!(reg.set_pwrdm_state(&sim, per, PowerState::Retention, 100), Ok(()));
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn test_externally_owned_untouched() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let iva2 = reg.lookup_pwrdm("iva2_pwrdm").expect("iva2");
        assert_eq!(reg.set_pwrdm_state(&sim, iva2, PowerState::Off, 100), Ok(()));
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn test_sleeping_domain_switch() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let per = reg.lookup_pwrdm("per_pwrdm").expect("per");
        sim.set(Reg::prm(Module::PER, prcm::PM_PWSTST), PowerState::Retention.raw());

        reg.set_pwrdm_state(&sim, per, PowerState::Off, 100).expect("set");

        let clkstctrl = Reg::cm(Module::PER, prcm::CM_CLKSTCTRL);
        let values: Vec<u32> = sim
            .writes()
            .iter()
            .filter(|(r, _)| *r == clkstctrl)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(
            values,
            [prcm::clktrctrl::FORCE_WAKEUP, prcm::clktrctrl::ENABLE_AUTO]
        );
        assert_eq!(reg.pwrdm(per).state_count(PowerState::Retention), 1);
    }

    #[test]
    fn test_dependency_pairs() {
        let sim = SimRegisters::omap3();
        let mut reg = registry();
        let neon = reg.lookup_clkdm("neon_clkdm").expect("neon");
        let mpu = reg.lookup_clkdm("mpu_clkdm").expect("mpu");

        reg.add_wkdep(&sim, neon, mpu).expect("neon wakes with mpu");
        assert_eq!(
            sim.get(Reg::prm(Module::NEON, prcm::PM_WKDEP)),
            1 << depbit::MPU
        );
        assert_eq!(reg.add_wkdep(&sim, mpu, mpu), Err(PmError::InvalidArgument));
        reg.del_wkdep(&sim, neon, mpu).expect("held");
        assert_eq!(sim.get(Reg::prm(Module::NEON, prcm::PM_WKDEP)), 0);
    }
}
