//! Host-side doubles: a simulated register file and recording fakes for the
//! platform, the SRAM routines and the CPU.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use omap3_hal::prcm::{self, Module, PrcmIrq, WkupEvents};
use omap3_hal::{scm, CpuOps, Reg, RegisterAccess, Space};

use crate::config::{PmConfig, SecureStorage, WakeupTimer};
use crate::manager::PowerManager;
use crate::platform::{LowPowerRoutines, MusbOp, Platform};
use crate::state::{PowerState, SaveLevel};
use crate::wakeup::WakeupReason;

/// Modules holding power domain registers
pub const DOMAIN_MODULES: [Module; 11] = [
    Module::IVA2,
    Module::MPU,
    Module::NEON,
    Module::CORE,
    Module::SGX,
    Module::DSS,
    Module::CAM,
    Module::PER,
    Module::EMU,
    Module::WKUP,
    Module::USBHOST,
];

// =============================================================================
// Simulated Registers
// =============================================================================

/// In-memory register file
///
/// Unwritten registers read as zero. Wake-up status and the PRCM interrupt
/// status are write-1-to-clear, and can be told to re-latch after a clear.
/// Every software write is logged; [`SimRegisters::set`] models hardware and
/// is not.
#[derive(Debug, Default)]
pub struct SimRegisters {
    values: RefCell<BTreeMap<Reg, u32>>,
    log: RefCell<Vec<(Reg, u32)>>,
    relatch: RefCell<BTreeMap<Reg, (u32, u32)>>,
}

impl SimRegisters {
    /// Empty register file
    pub fn new() -> Self {
        Self::default()
    }

    /// Register file in a plausible post-boot state: every domain ON,
    /// padconf save completing immediately, IO chain reporting active
    pub fn omap3() -> Self {
        let sim = Self::new();
        for module in DOMAIN_MODULES {
            sim.set(Reg::prm(module, prcm::PM_PWSTCTRL), PowerState::On.raw());
            sim.set(Reg::prm(module, prcm::PM_PWSTST), PowerState::On.raw());
            sim.set(Reg::prm(module, prcm::PM_PREPWSTST), PowerState::On.raw());
        }
        sim.set(scm::GENERAL_PURPOSE_STATUS, scm::PADCONF_SAVE_DONE);
        sim.set(
            Reg::prm(Module::WKUP, prcm::PM_WKST1),
            WkupEvents::IO_CHAIN.bits(),
        );
        sim.set(
            Reg::prm(Module::OCP, prcm::PRM_IRQENABLE_MPU),
            (PrcmIrq::WKUP | PrcmIrq::IO).bits(),
        );
        sim
    }

    fn is_write_one_to_clear(reg: Reg) -> bool {
        reg.space == Space::Prm
            && (reg.offset == prcm::PM_WKST1
                || reg.offset == prcm::PM_WKST3
                || reg == Reg::prm(Module::OCP, prcm::PRM_IRQSTATUS_MPU))
    }

    /// Hardware-side store
    pub fn set(&self, reg: Reg, value: u32) {
        self.values.borrow_mut().insert(reg, value);
    }

    /// Hardware-side load
    pub fn get(&self, reg: Reg) -> u32 {
        self.values.borrow().get(&reg).copied().unwrap_or(0)
    }

    /// Re-set `bits` in `reg` after each of the next `times` clears
    pub fn relatch(&self, reg: Reg, bits: u32, times: u32) {
        self.relatch.borrow_mut().insert(reg, (bits, times));
    }

    /// Software writes so far
    pub fn writes(&self) -> Vec<(Reg, u32)> {
        self.log.borrow().clone()
    }

    /// Values written to `reg`, in order
    pub fn writes_to(&self, reg: Reg) -> Vec<u32> {
        self.log
            .borrow()
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Forget logged writes
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl RegisterAccess for SimRegisters {
    fn read(&self, reg: Reg) -> u32 {
        self.get(reg)
    }

    fn write(&self, reg: Reg, value: u32) {
        self.log.borrow_mut().push((reg, value));
        if !Self::is_write_one_to_clear(reg) {
            self.set(reg, value);
            return;
        }
        let mut current = self.get(reg) & !value;
        if let Some((bits, times)) = self.relatch.borrow_mut().get_mut(&reg) {
            if *times > 0 {
                current |= *bits;
                *times -= 1;
            }
        }
        self.set(reg, current);
    }

    fn read16(&self, reg: Reg) -> u16 {
        self.get(reg) as u16
    }

    fn write16(&self, reg: Reg, value: u16) {
        self.write(reg, value as u32);
    }
}

// =============================================================================
// Event Recording
// =============================================================================

/// Calls made into the fakes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    UartPrepareIdle(u8),
    UartResumeIdle(u8),
    UartPrepareSuspend,
    UartEnableIrqs(bool),
    GpioPrepareIdle(bool),
    GpioResumeIdle(bool),
    EnableGpioIrq(u8),
    IntcPrepareIdle,
    IntcResumeIdle,
    IntcSuspend,
    IntcSave,
    IntcRestore,
    GpmcSave,
    GpmcRestore,
    ControlSave,
    ControlRestore,
    PrcmSave,
    PrcmRestore,
    SramRestore,
    SmsRestore,
    Musb(MusbOp),
    DisableHlt,
    EnableHlt,
    DisableIrqs,
    EnableIrqs,
    WakeupTimer(WakeupTimer),
    EnterLowPower(SaveLevel),
    SaveSecureRam,
    CpuInit,
    FlushTlb,
    WriteControl(u32),
    WritePhys(u32, u32),
}

/// Shared, ordered event log
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn contains(&self, event: Event) -> bool {
        self.0.borrow().contains(&event)
    }

    pub fn position(&self, event: Event) -> Option<usize> {
        self.0.borrow().iter().position(|e| *e == event)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// =============================================================================
// Fakes
// =============================================================================

/// Recording platform
#[derive(Debug)]
pub struct FakePlatform {
    log: EventLog,
    pub can_sleep: Cell<bool>,
    pub irq_pending: Cell<bool>,
    pub need_resched: Cell<bool>,
    pub pmic_reason: Cell<WakeupReason>,
}

impl FakePlatform {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            can_sleep: Cell::new(true),
            irq_pending: Cell::new(false),
            need_resched: Cell::new(false),
            pmic_reason: Cell::new(WakeupReason::Unknown),
        }
    }
}

impl Platform for FakePlatform {
    fn uart_prepare_idle(&self, port: u8) {
        self.log.push(Event::UartPrepareIdle(port));
    }

    fn uart_resume_idle(&self, port: u8) {
        self.log.push(Event::UartResumeIdle(port));
    }

    fn uart_prepare_suspend(&self) {
        self.log.push(Event::UartPrepareSuspend);
    }

    fn uart_enable_irqs(&self, enable: bool) {
        self.log.push(Event::UartEnableIrqs(enable));
    }

    fn uart_can_sleep(&self) -> bool {
        self.can_sleep.get()
    }

    fn gpio_prepare_for_idle(&self, save_context: bool) {
        self.log.push(Event::GpioPrepareIdle(save_context));
    }

    fn gpio_resume_after_idle(&self, restore_context: bool) {
        self.log.push(Event::GpioResumeIdle(restore_context));
    }

    fn enable_gpio_irq(&self, bank: u8) {
        self.log.push(Event::EnableGpioIrq(bank));
    }

    fn intc_prepare_idle(&self) {
        self.log.push(Event::IntcPrepareIdle);
    }

    fn intc_resume_idle(&self) {
        self.log.push(Event::IntcResumeIdle);
    }

    fn intc_suspend(&self) {
        self.log.push(Event::IntcSuspend);
    }

    fn intc_save_context(&self) {
        self.log.push(Event::IntcSave);
    }

    fn intc_restore_context(&self) {
        self.log.push(Event::IntcRestore);
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending.get()
    }

    fn gpmc_save_context(&self) {
        self.log.push(Event::GpmcSave);
    }

    fn gpmc_restore_context(&self) {
        self.log.push(Event::GpmcRestore);
    }

    fn control_save_context(&self) {
        self.log.push(Event::ControlSave);
    }

    fn control_restore_context(&self) {
        self.log.push(Event::ControlRestore);
    }

    fn prcm_save_context(&self) {
        self.log.push(Event::PrcmSave);
    }

    fn prcm_restore_context(&self) {
        self.log.push(Event::PrcmRestore);
    }

    fn sram_restore_context(&self) {
        self.log.push(Event::SramRestore);
    }

    fn sms_restore_context(&self) {
        self.log.push(Event::SmsRestore);
    }

    fn musb(&self, op: MusbOp) {
        self.log.push(Event::Musb(op));
    }

    fn need_resched(&self) -> bool {
        self.need_resched.get()
    }

    fn disable_hlt(&self) {
        self.log.push(Event::DisableHlt);
    }

    fn enable_hlt(&self) {
        self.log.push(Event::EnableHlt);
    }

    fn disable_interrupts(&self) {
        self.log.push(Event::DisableIrqs);
    }

    fn enable_interrupts(&self) {
        self.log.push(Event::EnableIrqs);
    }

    fn wakeup_on_timer(&self, timer: WakeupTimer) {
        self.log.push(Event::WakeupTimer(timer));
    }

    fn pmic_wakeup_reason(&self) -> WakeupReason {
        self.pmic_reason.get()
    }

    fn halt(&self) -> ! {
        panic!("platform halted");
    }
}

/// SRAM routines that latch the programmed next states as previous states
#[derive(Debug)]
pub struct FakeRoutines<'a> {
    regs: &'a SimRegisters,
    log: EventLog,
    /// Status returned by the secure save
    pub secure_status: Cell<Result<(), u32>>,
    /// MPU next-state field seen by the secure save
    pub mpu_next_at_secure_save: Cell<Option<u32>>,
    /// Previous states to report instead of the programmed next state
    pub prev_override: RefCell<BTreeMap<Module, PowerState>>,
    /// Next-state fields at the last low-power entry
    pub next_at_entry: RefCell<BTreeMap<Module, u32>>,
}

impl<'a> FakeRoutines<'a> {
    pub fn new(regs: &'a SimRegisters, log: &EventLog) -> Self {
        Self {
            regs,
            log: log.clone(),
            secure_status: Cell::new(Ok(())),
            mpu_next_at_secure_save: Cell::new(None),
            prev_override: RefCell::new(BTreeMap::new()),
            next_at_entry: RefCell::new(BTreeMap::new()),
        }
    }

    /// Next-state field of `module` at the last low-power entry
    pub fn next_at_entry(&self, module: Module) -> Option<u32> {
        self.next_at_entry.borrow().get(&module).copied()
    }
}

impl LowPowerRoutines for FakeRoutines<'_> {
    fn enter_low_power(&self, level: SaveLevel) {
        self.log.push(Event::EnterLowPower(level));
        let overrides = self.prev_override.borrow();
        let mut seen = self.next_at_entry.borrow_mut();
        for module in DOMAIN_MODULES {
            let next = self.regs.get(Reg::prm(module, prcm::PM_PWSTCTRL)) & prcm::POWERSTATE_MASK;
            seen.insert(module, next);
            let prev = overrides.get(&module).map_or(next, |s| s.raw());
            self.regs.set(Reg::prm(module, prcm::PM_PREPWSTST), prev);
            self.regs.set(Reg::prm(module, prcm::PM_PWSTST), PowerState::On.raw());
        }
    }

    fn save_secure_ram(&self, _storage: SecureStorage) -> Result<(), u32> {
        self.log.push(Event::SaveSecureRam);
        let mpu_next = self.regs.get(Reg::prm(Module::MPU, prcm::PM_PWSTCTRL)) & prcm::POWERSTATE_MASK;
        self.mpu_next_at_secure_save.set(Some(mpu_next));
        self.secure_status.get()
    }
}

/// Recording CPU
#[derive(Debug)]
pub struct FakeCpu {
    log: EventLog,
}

impl FakeCpu {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl CpuOps for FakeCpu {
    fn cpu_init(&self) {
        self.log.push(Event::CpuInit);
    }

    fn flush_tlb_all(&self) {
        self.log.push(Event::FlushTlb);
    }

    fn write_control_register(&self, value: u32) {
        self.log.push(Event::WriteControl(value));
    }

    unsafe fn write_phys(&self, phys: u32, value: u32) {
        self.log.push(Event::WritePhys(phys, value));
    }
}

// =============================================================================
// Harness
// =============================================================================

/// Manager wired to the doubles
pub type TestManager<'a> = PowerManager<&'a SimRegisters, FakePlatform, FakeRoutines<'a>, FakeCpu>;

/// Build a manager over `sim`, then clear the init writes and events
pub fn manager<'a>(sim: &'a SimRegisters, log: &EventLog, config: PmConfig) -> TestManager<'a> {
    let pm = PowerManager::new(
        sim,
        FakePlatform::new(log),
        FakeRoutines::new(sim, log),
        FakeCpu::new(log),
        config,
    )
    .expect("manager init");
    sim.clear_log();
    log.clear();
    pm
}
