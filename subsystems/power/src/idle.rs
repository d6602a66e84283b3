//! # Idle Transaction
//!
//! One trip through the low-power routine. The MPU, NEON, CORE, PER and DSS
//! next states programmed by the caller are reconciled so that no domain
//! loses context another one still depends on, context is saved as the
//! chosen states require, the SRAM routine runs, and everything is put back
//! on the way out.
//!
//! ## Dependency Rules
//!
//! ```text
//!   NEON  follows MPU while NEON is powered
//!   DSS   OFF -> RET while CORE stays ON (plus DSS sleepdep on MPU)
//!   PER   OFF -> RET unless CORE goes OFF
//!   CORE  OFF -> RET unless PER goes OFF
//! ```
//!
//! Downgrades are undone after wake-up so the next cycle sees the original
//! request again.

use omap3_hal::prcm::{self, Module, VoltCtrl, WkupEvents};
use omap3_hal::{sdrc, CpuOps, Reg, RegisterAccess};

use crate::context;
use crate::error::{PmError, PmResult};
use crate::manager::PowerManager;
use crate::platform::{LowPowerRoutines, MusbOp, Platform};
use crate::powerdomain::PwrdmId;
use crate::state::{IdleOrigin, PowerState, SaveLevel};

const VOLTCTRL: Reg = Reg::prm(Module::GR, prcm::PRM_VOLTCTRL);
const WKUP_WKEN: Reg = Reg::prm(Module::WKUP, prcm::PM_WKEN1);
const PLL_AUTOIDLE: Reg = Reg::cm(Module::PLL, prcm::CM_AUTOIDLE1);

/// Decisions taken for one transaction
#[derive(Debug, Clone, Copy)]
struct IdleContext {
    origin: IdleOrigin,
    save_level: SaveLevel,
    mpu_next: PowerState,
    core_next: PowerState,
    per_next: PowerState,
    dss_next: PowerState,
    per_downgraded: bool,
    core_downgraded: bool,
    dss_downgraded: bool,
    dss_sleepdep: bool,
    per_context_saved: bool,
    sdrc_power: Option<u32>,
}

/// What a completed transaction did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleReport {
    /// Context the SRAM routine was asked to save
    pub save_level: SaveLevel,
    /// Whether PER context was saved for off-mode
    pub per_context_saved: bool,
    /// MPU state reached
    pub mpu_prev: Option<PowerState>,
    /// CORE state reached, when CORE was allowed below ON
    pub core_prev: Option<PowerState>,
    /// PER state reached, when PER was allowed below ON
    pub per_prev: Option<PowerState>,
}

/// Result of an idle loop attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// Sleeping was not allowed or work was pending
    Skipped,
    /// The transaction ran
    Entered(IdleReport),
    /// The transaction was refused before touching the hardware
    Failed(PmError),
}

impl<R, P, L, C> PowerManager<R, P, L, C>
where
    R: RegisterAccess,
    P: Platform,
    L: LowPowerRoutines,
    C: CpuOps,
{
    /// Whether the idle loop may enter low power
    pub fn can_sleep(&self) -> bool {
        self.config.sleep_while_idle && self.platform.uart_can_sleep()
    }

    /// Allow or forbid low-power entry from the idle loop
    pub fn set_sleep_while_idle(&mut self, enable: bool) {
        self.config.sleep_while_idle = enable;
    }

    /// Idle loop entry point
    ///
    /// Runs with IRQ and FIQ masked. Skips the transaction when sleeping is
    /// not allowed, an interrupt is already pending, or the scheduler wants
    /// the CPU.
    pub fn idle(&mut self) -> IdleOutcome {
        self.platform.disable_interrupts();

        let outcome = if !self.can_sleep()
            || self.platform.irq_pending()
            || self.platform.need_resched()
        {
            IdleOutcome::Skipped
        } else {
            match self.run_idle(IdleOrigin::CpuIdle) {
                Ok(report) => IdleOutcome::Entered(report),
                Err(err) => {
                    log::error!("idle: {}", err);
                    IdleOutcome::Failed(err)
                },
            }
        };

        self.platform.enable_interrupts();
        outcome
    }

    fn request(&self, id: PwrdmId, state: PowerState) {
        let pwrdm = self.registry.pwrdm(id);
        if let Err(err) = pwrdm.set_next_state(&self.regs, state) {
            log::warn!("{}: cannot request {}: {}", pwrdm.name(), state, err);
        }
    }

    fn next_state(&self, id: PwrdmId) -> PmResult<PowerState> {
        self.registry.pwrdm(id).read_next_state(&self.regs)
    }

    fn prev_state(&self, id: PwrdmId) -> Option<PowerState> {
        self.registry.pwrdm(id).read_prev_state(&self.regs).ok()
    }

    /// Run one idle transaction with the next states currently programmed
    ///
    /// Fails only when a next state cannot be decoded; nothing beyond the
    /// previous-state latches has been touched at that point.
    pub fn run_idle(&mut self, origin: IdleOrigin) -> PmResult<IdleReport> {
        let d = self.domains;

        for id in [d.mpu, d.neon, d.core, d.per, d.dss] {
            self.registry.pwrdm(id).clear_all_prev_states(&self.regs);
        }

        let mpu_next = self.next_state(d.mpu)?;
        let mut ctx = IdleContext {
            origin,
            save_level: match mpu_next {
                PowerState::On | PowerState::Retention => SaveLevel::None,
                PowerState::Off => SaveLevel::All,
            },
            mpu_next,
            per_next: self.next_state(d.per)?,
            core_next: self.next_state(d.core)?,
            dss_next: self.next_state(d.dss)?,
            per_downgraded: false,
            core_downgraded: false,
            dss_downgraded: false,
            dss_sleepdep: false,
            per_context_saved: false,
            sdrc_power: None,
        };

        self.registry.pre_transition(&self.regs);

        // NEON cannot wake on its own
        if self.registry.pwrdm(d.neon).read_state(&self.regs).ok() == Some(PowerState::On) {
            self.request(d.neon, ctx.mpu_next);
        }

        self.prepare_dss(&mut ctx);
        self.prepare_per(&mut ctx);
        self.platform.intc_prepare_idle();
        self.prepare_core(&mut ctx);

        if ctx.core_next == PowerState::Off && self.config.soc.needs_sdrc_power_restore() {
            ctx.sdrc_power = Some(self.regs.read(sdrc::POWER));
        }

        self.routines.enter_low_power(ctx.save_level);
        self.cpu.cpu_init();

        if let Some(power) = ctx.sdrc_power {
            self.regs.write(sdrc::POWER, power);
        }

        let mpu_prev = self.prev_state(d.mpu);
        if mpu_prev == Some(PowerState::Off) {
            context::restore_table_entry(&self.regs, &self.cpu);
        }

        let core_prev = self.resume_core(&ctx);

        self.regs.write(PLL_AUTOIDLE, prcm::PLL_AUTOIDLE_CORE_PERIPH);
        self.platform.intc_resume_idle();

        let per_prev = self.resume_per(&ctx);
        self.resume_dss(&ctx);
        if ctx.core_downgraded {
            self.request(d.core, PowerState::Off);
        }

        if ctx.core_next < PowerState::On {
            self.regs.clear_bits(WKUP_WKEN, WkupEvents::IO.bits());
            context::disable_io_chain(&self.regs, &self.config.soc);
        }

        self.registry.post_transition(&self.regs);

        Ok(IdleReport {
            save_level: ctx.save_level,
            per_context_saved: ctx.per_context_saved,
            mpu_prev,
            core_prev,
            per_prev,
        })
    }

    fn prepare_dss(&mut self, ctx: &mut IdleContext) {
        if ctx.dss_next == PowerState::On || ctx.core_next != PowerState::On {
            return;
        }
        let d = self.domains;
        if ctx.dss_next == PowerState::Off {
            ctx.dss_next = PowerState::Retention;
            ctx.dss_downgraded = true;
            self.request(d.dss, ctx.dss_next);
        }
        if let (Some(dss), Some(mpu)) = (d.dss_clkdm, d.mpu_clkdm) {
            match self.registry.add_sleepdep(&self.regs, dss, mpu) {
                Ok(()) => ctx.dss_sleepdep = true,
                Err(err) => log::warn!("dss: cannot add sleep dependency: {}", err),
            }
        }
    }

    fn prepare_per(&self, ctx: &mut IdleContext) {
        if ctx.per_next == PowerState::Off && ctx.core_next != PowerState::Off {
            ctx.per_next = PowerState::Retention;
            ctx.per_downgraded = true;
        }
        if ctx.per_next == PowerState::On {
            return;
        }
        self.request(self.domains.per, ctx.per_next);
        ctx.per_context_saved = ctx.per_next == PowerState::Off;
        self.platform.gpio_prepare_for_idle(ctx.per_context_saved);
        self.platform.uart_prepare_idle(2);
    }

    fn prepare_core(&mut self, ctx: &mut IdleContext) {
        if ctx.core_next == PowerState::On {
            return;
        }
        if ctx.core_next == PowerState::Off && ctx.per_next > PowerState::Off {
            ctx.core_next = PowerState::Retention;
            ctx.core_downgraded = true;
            self.request(self.domains.core, ctx.core_next);
        }

        if ctx.core_next == PowerState::Off {
            self.platform.uart_prepare_idle(0);
            self.platform.uart_prepare_idle(1);
            self.regs.set_bits(VOLTCTRL, VoltCtrl::AUTO_OFF.bits());
            context::core_save_context(&self.regs, &self.platform, self.config.padconf_save_limit);
            self.platform.prcm_save_context();
            self.platform.musb(MusbOp::SaveContext);
            if !self.config.soc.is_gp() {
                self.save_secure_ram_context(ctx.mpu_next);
            }
        } else {
            if ctx.origin == IdleOrigin::Suspend {
                self.platform.uart_prepare_idle(0);
                self.platform.uart_prepare_idle(1);
            }
            self.regs.set_bits(VOLTCTRL, VoltCtrl::AUTO_RET.bits());
            self.platform.musb(MusbOp::DisableClock);
        }

        self.regs.set_bits(WKUP_WKEN, WkupEvents::IO.bits());
        if let Err(err) =
            context::enable_io_chain(&self.regs, &self.config.soc, self.config.io_chain_limit)
        {
            log::error!("io chain: activation failed: {}", err);
        }
    }

    fn resume_core(&self, ctx: &IdleContext) -> Option<PowerState> {
        if ctx.core_next == PowerState::On {
            return None;
        }
        let core_prev = self.prev_state(self.domains.core);
        if core_prev == Some(PowerState::Off) {
            context::core_restore_context(&self.platform);
            self.platform.prcm_restore_context();
            self.platform.sram_restore_context();
            self.platform.sms_restore_context();
            self.platform.musb(MusbOp::RestoreContext);
        } else {
            self.platform.musb(MusbOp::EnableClock);
        }

        if ctx.core_next == PowerState::Off {
            self.platform.uart_resume_idle(0);
            self.platform.uart_resume_idle(1);
            self.regs.clear_bits(VOLTCTRL, VoltCtrl::AUTO_OFF.bits());
        } else {
            if ctx.origin == IdleOrigin::Suspend {
                self.platform.uart_resume_idle(0);
                self.platform.uart_resume_idle(1);
            }
            self.regs.clear_bits(VOLTCTRL, VoltCtrl::AUTO_RET.bits());
        }
        core_prev
    }

    fn resume_per(&self, ctx: &IdleContext) -> Option<PowerState> {
        if ctx.per_next == PowerState::On {
            return None;
        }
        self.platform.uart_resume_idle(2);
        let per_prev = self.prev_state(self.domains.per);
        self.platform.gpio_resume_after_idle(ctx.per_context_saved);
        if ctx.per_downgraded || ctx.per_next == PowerState::Off {
            self.request(self.domains.per, PowerState::Off);
        }
        per_prev
    }

    fn resume_dss(&mut self, ctx: &IdleContext) {
        let d = self.domains;
        if ctx.dss_sleepdep {
            if let (Some(dss), Some(mpu)) = (d.dss_clkdm, d.mpu_clkdm) {
                if let Err(err) = self.registry.del_sleepdep(&self.regs, dss, mpu) {
                    log::warn!("dss: cannot drop sleep dependency: {}", err);
                }
            }
        }
        if ctx.dss_downgraded {
            self.request(d.dss, PowerState::Off);
        }
    }
}
