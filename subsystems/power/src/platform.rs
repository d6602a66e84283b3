//! # Platform Collaborators
//!
//! Services the power management core consumes but does not own: serial
//! ports, GPIO banks, the interrupt controller, module context save/restore,
//! and the routines that run from on-chip SRAM while SDRAM is unavailable.

use crate::config::{SecureStorage, WakeupTimer};
use crate::state::SaveLevel;
use crate::wakeup::WakeupReason;

/// USB OTG controller context operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusbOp {
    /// Save controller context before CORE off
    SaveContext,
    /// Restore controller context after CORE off
    RestoreContext,
    /// Gate the controller clock for CORE retention
    DisableClock,
    /// Ungate the controller clock
    EnableClock,
}

/// Host services used around low-power transitions
pub trait Platform {
    // -------------------------------------------------------------------------
    // Serial ports
    // -------------------------------------------------------------------------

    /// Quiesce UART `port` before idle
    fn uart_prepare_idle(&self, port: u8);

    /// Resume UART `port` after idle
    fn uart_resume_idle(&self, port: u8);

    /// Quiesce every UART before suspend
    fn uart_prepare_suspend(&self);

    /// Enable or disable UART interrupts for the suspend window
    fn uart_enable_irqs(&self, enable: bool);

    /// Whether the UARTs allow sleeping
    fn uart_can_sleep(&self) -> bool;

    // -------------------------------------------------------------------------
    // GPIO
    // -------------------------------------------------------------------------

    /// Prepare GPIO banks for idle; `save_context` when PER will lose power
    fn gpio_prepare_for_idle(&self, save_context: bool);

    /// Resume GPIO banks; `restore_context` when context was saved
    fn gpio_resume_after_idle(&self, restore_context: bool);

    /// Enable the summary interrupt of GPIO `bank`
    fn enable_gpio_irq(&self, bank: u8);

    // -------------------------------------------------------------------------
    // Interrupt controller
    // -------------------------------------------------------------------------

    /// Quiesce the interrupt controller for idle
    fn intc_prepare_idle(&self);

    /// Undo [`Platform::intc_prepare_idle`]
    fn intc_resume_idle(&self);

    /// Prepare the interrupt controller for suspend
    fn intc_suspend(&self);

    /// Save interrupt controller context
    fn intc_save_context(&self);

    /// Restore interrupt controller context
    fn intc_restore_context(&self);

    /// Whether an interrupt is pending at the controller
    fn irq_pending(&self) -> bool;

    // -------------------------------------------------------------------------
    // Module context
    // -------------------------------------------------------------------------

    /// Save GPMC context
    fn gpmc_save_context(&self);

    /// Restore GPMC context
    fn gpmc_restore_context(&self);

    /// Save control module context (padconf excluded)
    fn control_save_context(&self);

    /// Restore control module context
    fn control_restore_context(&self);

    /// Save PRCM context
    fn prcm_save_context(&self);

    /// Restore PRCM context
    fn prcm_restore_context(&self);

    /// Restore the context of SRAM-resident helpers
    fn sram_restore_context(&self);

    /// Restore SDRAM memory scheduler context
    fn sms_restore_context(&self);

    /// USB OTG controller context
    fn musb(&self, op: MusbOp);

    // -------------------------------------------------------------------------
    // Scheduler and CPU
    // -------------------------------------------------------------------------

    /// Whether the scheduler wants the CPU back
    fn need_resched(&self) -> bool;

    /// Disable the idle-halt fast path
    fn disable_hlt(&self);

    /// Re-enable the idle-halt fast path
    fn enable_hlt(&self);

    /// Mask IRQ and FIQ on the local CPU
    fn disable_interrupts(&self);

    /// Unmask IRQ and FIQ on the local CPU
    fn enable_interrupts(&self);

    /// Arm the wake-up timer
    fn wakeup_on_timer(&self, timer: WakeupTimer);

    /// Reason recorded by the PMIC for its last interrupt
    fn pmic_wakeup_reason(&self) -> WakeupReason;

    /// Stop the system
    fn halt(&self) -> !;
}

/// Routines copied to on-chip SRAM
pub trait LowPowerRoutines {
    /// Save CPU state as `level` requires, execute WFI, and return after
    /// wake-up with minimal CPU state restored
    fn enter_low_power(&self, level: SaveLevel);

    /// Ask the secure monitor to copy secure RAM into `storage`
    ///
    /// Returns the monitor status code on failure.
    fn save_secure_ram(&self, storage: SecureStorage) -> Result<(), u32>;
}
