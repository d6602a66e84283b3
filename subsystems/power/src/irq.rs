//! # PRCM Interrupt Handler
//!
//! `PRM_IRQSTATUS_MPU.WKUP_ST` can only be acknowledged once every latched
//! `PM_WKST` bit is gone, and a new wake-up may land while draining. The
//! handler therefore drains and acknowledges until no enabled bit is left.
//!
//! The handler only borrows the register capability so it can run in
//! interrupt context independently of the power manager.

use core::sync::atomic::{AtomicU32, Ordering};

use omap3_hal::prcm::{self, Module, PrcmIrq};
use omap3_hal::{Reg, RegisterAccess, SocInfo};

use crate::config::PmConfig;
use crate::wakeup;

const IRQSTATUS: Reg = Reg::prm(Module::OCP, prcm::PRM_IRQSTATUS_MPU);
const IRQENABLE: Reg = Reg::prm(Module::OCP, prcm::PRM_IRQENABLE_MPU);

/// Handler statistics
#[derive(Debug, Default)]
pub struct IrqStats {
    /// Interrupts handled
    pub handled: AtomicU32,
    /// Wake-up drain passes
    pub drains: AtomicU32,
    /// Interrupts carrying bits the handler does not service
    pub unknown: AtomicU32,
}

/// PRCM MPU interrupt handler
#[derive(Debug)]
pub struct PrcmIrqHandler<R> {
    regs: R,
    soc: SocInfo,
    wake_clear_limit: u32,
    stats: IrqStats,
}

impl<R: RegisterAccess> PrcmIrqHandler<R> {
    /// Create a handler over `regs`
    pub fn new(regs: R, config: &PmConfig) -> Self {
        Self {
            regs,
            soc: config.soc,
            wake_clear_limit: config.wake_clear_limit,
            stats: IrqStats::default(),
        }
    }

    /// Statistics since creation
    pub fn stats(&self) -> &IrqStats {
        &self.stats
    }

    fn pending(&self, enabled: u32) -> u32 {
        self.regs.read(IRQSTATUS) & enabled
    }

    /// Service the interrupt, returning the number of acknowledge rounds
    pub fn handle(&self) -> u32 {
        let wake = PrcmIrq::WKUP | PrcmIrq::IO;
        let enabled = self.regs.read(IRQENABLE);
        let mut status = self.pending(enabled);
        let mut drains = 0;
        let mut rounds = 0;

        loop {
            let bits = PrcmIrq::from_bits_retain(status);
            if bits.intersects(wake) {
                let cleared = wakeup::clear_all_wakeups(&self.regs, &self.soc, self.wake_clear_limit);
                drains += 1;
                if cleared == 0 && drains == 1 {
                    log::warn!("prcm: MPU wake-up indicated but no wake-up sources are marked");
                }
            }
            let unknown = bits.difference(wake);
            if !unknown.is_empty() {
                log::warn!(
                    "prcm: interrupt received with no handler for {:#010x}",
                    unknown.bits()
                );
                self.stats.unknown.fetch_add(1, Ordering::Relaxed);
            }

            self.regs.write(IRQSTATUS, status);
            rounds += 1;

            status = self.pending(enabled);
            if status == 0 {
                break;
            }
            if rounds >= self.wake_clear_limit {
                log::warn!("prcm: interrupt status {:#010x} still pending", status);
                break;
            }
        }

        self.stats.handled.fetch_add(1, Ordering::Relaxed);
        self.stats.drains.fetch_add(drains, Ordering::Relaxed);
        rounds
    }
}
