//! # Power Domains
//!
//! A power domain is one PRM module. Its requested, current and previous
//! states live in `PM_PWSTCTRL`, `PM_PWSTST` and `PM_PREPWSTST`; the record
//! here holds the static description plus transition bookkeeping.

use bitflags::bitflags;

use omap3_hal::prcm::{self, Module};
use omap3_hal::{Reg, RegisterAccess};

use crate::error::{PmError, PmResult};
use crate::state::{PowerState, PowerStates};

bitflags! {
    /// Static power domain properties
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DomainFlags: u32 {
        /// Hardware save-and-restore of module context is available
        const HW_SAR = 1 << 0;
        /// State is managed by another agent; requests succeed without effect
        const EXTERNALLY_OWNED = 1 << 1;
        /// Present only after OMAP3430 ES1.0
        const ES2_ONLY = 1 << 2;
    }
}

/// Index of a power domain in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PwrdmId(pub(crate) u8);

/// Static description of a power domain
#[derive(Debug, Clone, Copy)]
pub struct PowerDomainDesc {
    /// Registry name
    pub name: &'static str,
    /// PRM module holding the state registers
    pub module: Module,
    /// Legal states
    pub states: PowerStates,
    /// Properties
    pub flags: DomainFlags,
    /// Name of the first clock domain, used for sleep switches
    pub clkdm: Option<&'static str>,
}

/// Where a state switch reads the domain state from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    /// `PM_PWSTST`
    Now,
    /// `PM_PREPWSTST`
    Previous,
}

/// A power domain
#[derive(Debug, Clone)]
pub struct PowerDomain {
    desc: PowerDomainDesc,
    last_state: Option<PowerState>,
    state_counter: [u32; 4],
}

impl PowerDomain {
    /// Create a domain from its description
    pub const fn new(desc: PowerDomainDesc) -> Self {
        Self {
            desc,
            last_state: None,
            state_counter: [0; 4],
        }
    }

    /// Registry name
    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    /// PRM module
    pub fn module(&self) -> Module {
        self.desc.module
    }

    /// Legal states
    pub fn states(&self) -> PowerStates {
        self.desc.states
    }

    /// Static properties
    pub fn flags(&self) -> DomainFlags {
        self.desc.flags
    }

    /// Name of the first clock domain
    pub fn clkdm_name(&self) -> Option<&'static str> {
        self.desc.clkdm
    }

    /// Whether hardware save-and-restore is available
    pub fn has_hw_sar(&self) -> bool {
        self.desc.flags.contains(DomainFlags::HW_SAR)
    }

    /// Whether state requests are owned by another agent
    pub fn is_externally_owned(&self) -> bool {
        self.desc.flags.contains(DomainFlags::EXTERNALLY_OWNED)
    }

    /// First legal state at or below `state`
    pub fn effective_state(&self, state: PowerState) -> Option<PowerState> {
        let mut state = state;
        while !self.desc.states.allows(state) {
            state = state.lower()?;
        }
        Some(state)
    }

    fn reg(&self, offset: u16) -> Reg {
        Reg::prm(self.desc.module, offset)
    }

    fn decode(&self, value: u32) -> PmResult<PowerState> {
        PowerState::from_raw(self.desc.name, value & prcm::POWERSTATE_MASK)
    }

    /// Requested next state
    pub fn read_next_state<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<PowerState> {
        self.decode(regs.read(self.reg(prcm::PM_PWSTCTRL)))
    }

    /// Program the next state without any legality search
    pub fn set_next_state<R: RegisterAccess + ?Sized>(
        &self,
        regs: &R,
        state: PowerState,
    ) -> PmResult<()> {
        if !self.desc.states.allows(state) {
            return Err(PmError::InvalidArgument);
        }
        log::trace!("{}: next state {}", self.desc.name, state);
        regs.modify(self.reg(prcm::PM_PWSTCTRL), prcm::POWERSTATE_MASK, state.raw());
        Ok(())
    }

    /// Current state
    pub fn read_state<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<PowerState> {
        self.decode(regs.read(self.reg(prcm::PM_PWSTST)))
    }

    /// State entered during the last transition
    pub fn read_prev_state<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<PowerState> {
        self.decode(regs.read(self.reg(prcm::PM_PREPWSTST)))
    }

    /// Reset the previous-state latch
    ///
    /// The latch is set to the ON encoding so a cycle that never reached a
    /// low-power state reads back as ON.
    pub fn clear_all_prev_states<R: RegisterAccess + ?Sized>(&self, regs: &R) {
        regs.write(self.reg(prcm::PM_PREPWSTST), PowerState::On.raw());
    }

    /// Busy-poll until no transition is in progress
    pub fn wait_transition<R: RegisterAccess + ?Sized>(&self, regs: &R, limit: u32) -> PmResult<()> {
        let reg = self.reg(prcm::PM_PWSTST);
        for _ in 0..limit {
            if regs.read(reg) & prcm::INTRANSITION == 0 {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        log::warn!("{}: transition did not complete", self.desc.name);
        Err(PmError::Timeout)
    }

    /// Turn on hardware save-and-restore
    pub fn enable_hw_sar<R: RegisterAccess + ?Sized>(&self, regs: &R) -> PmResult<()> {
        if !self.has_hw_sar() {
            return Err(PmError::InvalidArgument);
        }
        log::debug!("{}: enabling hardware save-and-restore", self.desc.name);
        regs.set_bits(self.reg(prcm::PM_PWSTCTRL), prcm::SAVEANDRESTORE);
        Ok(())
    }

    /// Record the domain's state and count entries into new states
    pub fn state_switch<R: RegisterAccess + ?Sized>(&mut self, regs: &R, source: StateSource) {
        let state = match source {
            StateSource::Now => self.read_state(regs),
            StateSource::Previous => self.read_prev_state(regs),
        };
        let Ok(state) = state else {
            return;
        };
        if self.last_state != Some(state) {
            self.state_counter[state.raw() as usize] += 1;
        }
        self.last_state = Some(state);
    }

    /// Number of recorded entries into `state`
    pub fn state_count(&self, state: PowerState) -> u32 {
        self.state_counter[state.raw() as usize]
    }

    /// Last recorded state
    pub fn last_state(&self) -> Option<PowerState> {
        self.last_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimRegisters;

    const PER: PowerDomainDesc = PowerDomainDesc {
        name: "per_pwrdm",
        module: Module::PER,
        states: PowerStates::OFF_RET_ON,
        flags: DomainFlags::empty(),
        clkdm: Some("per_clkdm"),
    };

    #[test]
    fn test_next_state_round_trip() {
        let sim = SimRegisters::omap3();
        let per = PowerDomain::new(PER);
        per.set_next_state(&sim, PowerState::Retention).expect("legal");
        assert_eq!(per.read_next_state(&sim), Ok(PowerState::Retention));
    }

    #[test]
    fn test_illegal_next_state_rejected() {
        let sim = SimRegisters::omap3();
        let gfx = PowerDomain::new(PowerDomainDesc {
            states: PowerStates::OFF_ON,
            ..PER
        });
        assert_eq!(
            gfx.set_next_state(&sim, PowerState::Retention),
            Err(PmError::InvalidArgument)
        );
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn test_effective_state_searches_down() {
        let gfx = PowerDomain::new(PowerDomainDesc {
            states: PowerStates::OFF_ON,
            ..PER
        });
        assert_eq!(gfx.effective_state(PowerState::Retention), Some(PowerState::Off));

        let wkup = PowerDomain::new(PowerDomainDesc {
            states: PowerStates::ON,
            ..PER
        });
        assert_eq!(wkup.effective_state(PowerState::On), Some(PowerState::On));
        assert_eq!(wkup.effective_state(PowerState::Retention), None);
    }

    #[test]
    fn test_clear_prev_reads_back_on() {
        let sim = SimRegisters::omap3();
        let per = PowerDomain::new(PER);
        sim.set(Reg::prm(Module::PER, prcm::PM_PREPWSTST), 0);
        per.clear_all_prev_states(&sim);
        assert_eq!(per.read_prev_state(&sim), Ok(PowerState::On));
    }

    #[test]
    fn test_wait_transition_times_out() {
        let sim = SimRegisters::omap3();
        let per = PowerDomain::new(PER);
        assert!(per.wait_transition(&sim, 10).is_ok());
        sim.set(
            Reg::prm(Module::PER, prcm::PM_PWSTST),
            prcm::INTRANSITION | PowerState::On.raw(),
        );
        assert_eq!(per.wait_transition(&sim, 10), Err(PmError::Timeout));
    }

    #[test]
    fn test_state_switch_counts_changes() {
        let sim = SimRegisters::omap3();
        let mut per = PowerDomain::new(PER);
        per.state_switch(&sim, StateSource::Now);
        per.state_switch(&sim, StateSource::Now);
        assert_eq!(per.state_count(PowerState::On), 1);

        sim.set(Reg::prm(Module::PER, prcm::PM_PREPWSTST), 0);
        per.state_switch(&sim, StateSource::Previous);
        assert_eq!(per.state_count(PowerState::Off), 1);
        assert_eq!(per.last_state(), Some(PowerState::Off));
    }

    #[test]
    fn test_hw_sar_requires_flag() {
        let sim = SimRegisters::omap3();
        let per = PowerDomain::new(PER);
        assert_eq!(per.enable_hw_sar(&sim), Err(PmError::InvalidArgument));
        let core = PowerDomain::new(PowerDomainDesc {
            flags: DomainFlags::HW_SAR,
            ..PER
        });
        core.enable_hw_sar(&sim).expect("supported");
        assert_ne!(
            sim.get(Reg::prm(Module::PER, prcm::PM_PWSTCTRL)) & prcm::SAVEANDRESTORE,
            0
        );
    }
}
