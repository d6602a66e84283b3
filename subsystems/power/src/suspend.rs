//! # System Suspend
//!
//! Host suspend hooks and the suspend transaction. Every power domain with a
//! choice of states is driven to its suspend target for the duration of one
//! idle transaction, then put back to the next state it had before.
//!
//! ## Transaction
//!
//! ```text
//!   arm wake-up timer (optional)
//!   save next states, program targets, clear previous states
//!   mask nuisance wake-up sources, park the PMIC pad in GPIO mode
//!   idle transaction
//!   capture wake-up status, unmask
//!   compare reached states, restore saved next states
//! ```

use omap3_hal::{scm, CpuOps, Reg, RegisterAccess};

use crate::error::{PmError, PmResult};
use crate::manager::PowerManager;
use crate::platform::{LowPowerRoutines, Platform};
use crate::powerdomain::PwrdmId;
use crate::state::{IdleOrigin, PowerState, SuspendState};
use crate::wakeup::{self, WakeMasks, WakeupRecord};

impl<R, P, L, C> PowerManager<R, P, L, C>
where
    R: RegisterAccess,
    P: Platform,
    L: LowPowerRoutines,
    C: CpuOps,
{
    // =========================================================================
    // Host Hooks
    // =========================================================================

    /// Whether `state` can be entered
    pub fn suspend_valid(&self, state: SuspendState) -> bool {
        matches!(state, SuspendState::Standby | SuspendState::Mem)
    }

    /// Record the requested state and silence UART interrupts
    pub fn suspend_begin(&mut self, state: SuspendState) {
        self.suspend_state = state;
        self.platform.uart_enable_irqs(false);
    }

    /// Keep the idle loop out of the way while suspending
    pub fn suspend_prepare(&self) {
        self.platform.disable_hlt();
    }

    /// Run the suspend transaction for the state recorded by
    /// [`suspend_begin`](Self::suspend_begin)
    ///
    /// Fails with [`PmError::InvalidArgument`] for anything but standby and
    /// suspend-to-memory, and with [`PmError::TargetNotReached`] when some
    /// domain stayed shallower than its target.
    pub fn suspend_enter(&mut self) -> PmResult<()> {
        match self.suspend_state {
            SuspendState::Standby | SuspendState::Mem => self.suspend(),
            SuspendState::On | SuspendState::Disk => Err(PmError::InvalidArgument),
        }
    }

    /// Let the idle loop run again
    pub fn suspend_finish(&self) {
        self.platform.enable_hlt();
    }

    /// Forget the suspend state and re-enable UART interrupts
    pub fn suspend_end(&mut self) {
        self.suspend_state = SuspendState::On;
        self.platform.uart_enable_irqs(true);
    }

    /// Suspend state recorded by the last [`suspend_begin`](Self::suspend_begin)
    pub fn current_suspend_state(&self) -> SuspendState {
        self.suspend_state
    }

    // =========================================================================
    // Suspend Policy
    // =========================================================================

    /// Target OFF (or RETENTION when disabled) in every domain and apply it
    ///
    /// Failures on single domains are logged and skipped.
    pub fn set_off_mode(&mut self, enable: bool) {
        let state = if enable {
            PowerState::Off
        } else {
            PowerState::Retention
        };
        let limit = self.config.transition_limit;
        for target in &mut self.targets {
            target.target = state;
            if let Err(err) = self
                .registry
                .set_pwrdm_state(&self.regs, target.domain, state, limit)
            {
                log::warn!(
                    "{}: cannot apply {}: {}",
                    self.registry.pwrdm(target.domain).name(),
                    state,
                    err
                );
            }
        }
        self.config.enable_off_mode = enable;
    }

    /// Suspend target of `id`
    pub fn suspend_state(&self, id: PwrdmId) -> PmResult<PowerState> {
        self.targets
            .iter()
            .find(|t| t.domain == id)
            .map(|t| t.target)
            .ok_or(PmError::InvalidArgument)
    }

    /// Change the suspend target of `id`
    ///
    /// The target takes effect at the next suspend.
    pub fn set_suspend_state(&mut self, id: PwrdmId, state: PowerState) -> PmResult<()> {
        let target = self
            .targets
            .iter_mut()
            .find(|t| t.domain == id)
            .ok_or(PmError::InvalidArgument)?;
        target.target = state;
        Ok(())
    }

    // =========================================================================
    // Transaction
    // =========================================================================

    fn suspend(&mut self) -> PmResult<()> {
        if let Some(timer) = self.config.wakeup_timer {
            self.platform.wakeup_on_timer(timer);
        }

        for target in &mut self.targets {
            target.saved = self.registry.pwrdm(target.domain).read_next_state(&self.regs)?;
        }

        if let Err(err) = self.apply_suspend_targets() {
            log::error!("suspend: cannot program targets: {}", err);
            self.restore_saved_states();
            return Err(err);
        }

        self.platform.uart_prepare_suspend();
        self.platform.intc_suspend();

        let soc = self.config.soc;
        let masks = WakeMasks::save(&self.regs);
        masks.mask(&self.regs, &soc);
        wakeup::log_wakeup_enables(&self.regs);

        let pmic_pad = self.config.pmic_pad.map(Reg::control);
        if let Some(pad) = pmic_pad {
            let value = self.regs.read16(pad) & !scm::PADCONF_MUXMODE_MASK;
            self.regs.write16(pad, value | scm::PADCONF_MUXMODE_GPIO);
            self.platform.enable_gpio_irq(0);
        }

        let idle = self.run_idle(IdleOrigin::Suspend);

        if let Some(pad) = pmic_pad {
            let value = self.regs.read16(pad) & !scm::PADCONF_MUXMODE_MASK;
            self.regs.write16(pad, value);
        }

        let record = WakeupRecord::capture(&self.regs);
        if let Some(pad) = record.event_pad {
            log::debug!("suspend: woken through pad {:#x}", pad);
        }
        *self.last_wakeup.lock() = record;

        masks.restore(&self.regs, &soc);

        let failed = if idle.is_ok() {
            self.count_missed_targets()
        } else {
            0
        };
        self.restore_saved_states();

        if let Err(err) = idle {
            log::error!("suspend: idle transaction failed: {}", err);
            return Err(err);
        }
        if failed > 0 {
            log::error!("suspend: {} power domain(s) missed their target", failed);
            return Err(PmError::TargetNotReached { failed });
        }
        log::info!("suspend: all power domains reached their target state");
        Ok(())
    }

    fn apply_suspend_targets(&mut self) -> PmResult<()> {
        let limit = self.config.transition_limit;
        for target in &self.targets {
            self.registry
                .set_pwrdm_state(&self.regs, target.domain, target.target, limit)?;
            self.registry.pwrdm(target.domain).clear_all_prev_states(&self.regs);
        }
        Ok(())
    }

    fn restore_saved_states(&mut self) {
        let limit = self.config.transition_limit;
        for target in &self.targets {
            if let Err(err) = self
                .registry
                .set_pwrdm_state(&self.regs, target.domain, target.saved, limit)
            {
                log::warn!(
                    "{}: cannot restore {}: {}",
                    self.registry.pwrdm(target.domain).name(),
                    target.saved,
                    err
                );
            }
        }
    }

    /// Domains whose previous state is shallower than what they were given
    fn count_missed_targets(&self) -> usize {
        let mut failed = 0;
        for target in &self.targets {
            let pwrdm = self.registry.pwrdm(target.domain);
            if pwrdm.is_externally_owned() {
                continue;
            }
            let Some(effective) = pwrdm.effective_state(target.target) else {
                continue;
            };
            match pwrdm.read_prev_state(&self.regs) {
                Ok(prev) if prev > effective => {
                    log::info!(
                        "Powerdomain ({}) didn't enter target state {}",
                        pwrdm.name(),
                        effective
                    );
                    failed += 1;
                },
                Ok(_) => {},
                Err(err) => {
                    log::warn!("{}: {}", pwrdm.name(), err);
                    failed += 1;
                },
            }
        }
        failed
    }
}
