//! # Power Manager
//!
//! Owns the register capability, the platform collaborators, the domain
//! registry and the suspend policy. Idle, suspend and context helpers are
//! implemented on [`PowerManager`] in their own modules.

use alloc::vec::Vec;

use omap3_hal::{CpuOps, RegisterAccess};
use spin::Mutex;

use crate::clockdomain::ClkdmId;
use crate::config::PmConfig;
use crate::domains::Registry;
use crate::error::{PmError, PmResult};
use crate::platform::{LowPowerRoutines, Platform};
use crate::powerdomain::PwrdmId;
use crate::setup;
use crate::state::{PowerState, SuspendState};
use crate::wakeup::{WakeupReason, WakeupRecord};

/// Suspend policy for one power domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendTarget {
    /// Domain
    pub domain: PwrdmId,
    /// State requested while the system is suspended
    pub target: PowerState,
    /// Next state in effect before the current suspend transaction
    pub saved: PowerState,
}

/// Domains the idle transaction works on directly
#[derive(Debug, Clone, Copy)]
pub(crate) struct CoreDomains {
    pub(crate) mpu: PwrdmId,
    pub(crate) neon: PwrdmId,
    pub(crate) core: PwrdmId,
    pub(crate) per: PwrdmId,
    pub(crate) dss: PwrdmId,
    pub(crate) mpu_clkdm: Option<ClkdmId>,
    pub(crate) dss_clkdm: Option<ClkdmId>,
}

/// OMAP3 power management context
#[derive(Debug)]
pub struct PowerManager<R, P, L, C> {
    pub(crate) regs: R,
    pub(crate) platform: P,
    pub(crate) routines: L,
    pub(crate) cpu: C,
    pub(crate) config: PmConfig,
    pub(crate) registry: Registry,
    pub(crate) domains: CoreDomains,
    pub(crate) targets: Vec<SuspendTarget>,
    pub(crate) suspend_state: SuspendState,
    pub(crate) last_wakeup: Mutex<WakeupRecord>,
}

impl<R, P, L, C> PowerManager<R, P, L, C>
where
    R: RegisterAccess,
    P: Platform,
    L: LowPowerRoutines,
    C: CpuOps,
{
    /// Bring up power management
    ///
    /// Programs the PRCM, requests retention for every power domain with a
    /// state to choose, hands idle clock domains to hardware and installs
    /// the static wake-up dependencies. Fails if a domain the idle
    /// transaction needs is missing.
    pub fn new(regs: R, platform: P, routines: L, cpu: C, config: PmConfig) -> PmResult<Self> {
        let soc = config.soc;
        log::info!("pm: initializing on {}", soc.revision);

        setup::early_init(&regs);
        setup::setup_registers(&regs, &soc);

        let mut registry = Registry::omap3(&soc);

        let candidates: Vec<PwrdmId> = registry
            .pwrdms()
            .filter(|(_, p)| !p.states().is_empty())
            .map(|(id, _)| id)
            .collect();
        let mut targets = Vec::with_capacity(candidates.len());
        for id in candidates {
            let pwrdm = registry.pwrdm(id);
            if pwrdm.has_hw_sar() {
                if let Err(err) = pwrdm.enable_hw_sar(&regs) {
                    log::warn!("{}: cannot enable hardware SAR: {}", pwrdm.name(), err);
                }
            }
            let saved = pwrdm.read_next_state(&regs).unwrap_or(PowerState::On);
            targets.push(SuspendTarget {
                domain: id,
                target: PowerState::Retention,
                saved,
            });
            registry.set_pwrdm_state(&regs, id, PowerState::Retention, config.transition_limit)?;
        }

        let clkdms: Vec<ClkdmId> = registry.clkdm_ids().collect();
        for id in clkdms {
            let clkdm = registry.clkdm_mut(id);
            clkdm.clear_all_wkdeps(&regs);
            clkdm.clear_all_sleepdeps(&regs);
            clkdm.setup_idle(&regs);
        }

        let resolve = |name: &'static str| {
            registry.lookup_pwrdm(name).ok_or_else(|| {
                log::error!("pm: {} not found", name);
                PmError::NotFound(name)
            })
        };
        let mpu = resolve("mpu_pwrdm")?;
        let domains = CoreDomains {
            mpu,
            neon: resolve("neon_pwrdm")?,
            core: resolve("core_pwrdm")?,
            per: resolve("per_pwrdm")?,
            dss: resolve("dss_pwrdm")?,
            mpu_clkdm: registry.pwrdm_clkdm(mpu),
            dss_clkdm: registry.lookup_clkdm("dss_clkdm"),
        };

        let neon_clkdm = registry.lookup_clkdm("neon_clkdm");
        if let (Some(neon), Some(mpu)) = (neon_clkdm, domains.mpu_clkdm) {
            registry.add_wkdep(&regs, neon, mpu)?;
        }

        if soc.needs_gpio_glitch_fix() {
            let per = registry.lookup_clkdm("per_clkdm");
            for name in ["core_l3_clkdm", "wkup_clkdm"] {
                let target = registry.lookup_clkdm(name);
                let result = match (per, target) {
                    (Some(per), Some(target)) => registry.add_wkdep(&regs, per, target),
                    _ => Err(PmError::NotFound(name)),
                };
                if let Err(err) = result {
                    log::error!("pm: cannot add per_clkdm wake-up dependency on {}: {}", name, err);
                }
            }
        }

        let enable_off_mode = config.enable_off_mode;
        let mut pm = Self {
            regs,
            platform,
            routines,
            cpu,
            config,
            registry,
            domains,
            targets,
            suspend_state: SuspendState::On,
            last_wakeup: Mutex::new(WakeupRecord::default()),
        };
        if enable_off_mode {
            pm.set_off_mode(true);
        }
        Ok(pm)
    }

    /// Domain registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register capability
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Platform collaborator
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// SRAM routines
    pub fn routines(&self) -> &L {
        &self.routines
    }

    /// CPU maintenance capability
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Configuration in effect
    pub fn config(&self) -> &PmConfig {
        &self.config
    }

    /// Suspend policy, one entry per power domain with a choice of states
    pub fn targets(&self) -> &[SuspendTarget] {
        &self.targets
    }

    /// Look up a power domain by name
    pub fn lookup_powerdomain(&self, name: &str) -> Option<PwrdmId> {
        self.registry.lookup_pwrdm(name)
    }

    /// Look up a clock domain by name
    pub fn lookup_clockdomain(&self, name: &str) -> Option<ClkdmId> {
        self.registry.lookup_clkdm(name)
    }

    /// Account for a clock enabled in `id`
    ///
    /// Hardware-supervised idle stays off until the matching
    /// [`clkdm_release`](Self::clkdm_release).
    pub fn clkdm_acquire(&mut self, id: ClkdmId) {
        self.registry.clkdm_mut(id).acquire(&self.regs);
    }

    /// Account for a clock disabled in `id`
    pub fn clkdm_release(&mut self, id: ClkdmId) -> PmResult<()> {
        self.registry.clkdm_mut(id).release(&self.regs)
    }

    /// Wake-up status captured after the last suspend
    pub fn last_wakeup(&self) -> WakeupRecord {
        *self.last_wakeup.lock()
    }

    /// What woke the system from the last suspend
    pub fn wakeup_reason(&self) -> WakeupReason {
        let record = self.last_wakeup();
        record.reason(&self.config, || self.platform.pmic_wakeup_reason())
    }
}
