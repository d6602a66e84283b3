//! # PRCM Register Setup
//!
//! One-shot register programming done before the domain registry is built:
//! wake dependency reset, interface clock and DPLL autoidle, wake-up source
//! routing, reset status cleanup, and parking the IVA2 and the die-to-die
//! interface so they cannot hold the chip awake.

use omap3_hal::prcm::{self, Module, PerEvents, PrcmIrq, WkupEvents};
use omap3_hal::{scm, Reg, RegisterAccess, SocInfo};
use static_assertions::const_assert_eq;

/// Modules whose wake-up dependencies start cleared
const WKDEP_RESET: [Module; 6] = [
    Module::IVA2,
    Module::MPU,
    Module::DSS,
    Module::NEON,
    Module::CAM,
    Module::PER,
];

/// Modules whose reset status is cleared at boot
const RSTST_CLEAR: [Module; 7] = [
    Module::MPU,
    Module::CORE,
    Module::PER,
    Module::EMU,
    Module::NEON,
    Module::DSS,
    Module::USBHOST,
];

/// WKUP sources routed to the MPU
const WKUP_WAKE_SOURCES: WkupEvents = WkupEvents::GPIO1
    .union(WkupEvents::GPT1)
    .union(WkupEvents::GPT12);

/// PER sources routed to the MPU
const PER_WAKE_SOURCES: PerEvents = PerEvents::GPIO2
    .union(PerEvents::GPIO3)
    .union(PerEvents::GPIO4)
    .union(PerEvents::GPIO5)
    .union(PerEvents::GPIO6)
    .union(PerEvents::UART3)
    .union(PerEvents::MCBSP2)
    .union(PerEvents::MCBSP3)
    .union(PerEvents::MCBSP4);

const_assert_eq!(PER_WAKE_SOURCES.bits(), 0x3_e807);
const_assert_eq!(WKUP_WAKE_SOURCES.bits(), 0xb);

/// Put the off-mode signal in its default polarity
pub fn early_init<R: RegisterAccess + ?Sized>(regs: &R) {
    regs.clear_bits(Reg::prm(Module::GR, prcm::PRM_POLCTRL), prcm::OFFMODE_POL);
}

/// Program the PRCM for power management
pub fn setup_registers<R: RegisterAccess + ?Sized>(regs: &R, soc: &SocInfo) {
    for module in WKDEP_RESET {
        regs.write(Reg::prm(module, prcm::PM_WKDEP), 0);
    }
    // GFX on ES1.0 sits where SGX is on later parts
    regs.write(Reg::prm(Module::SGX, prcm::PM_WKDEP), 0);
    if soc.has_es2_registers() {
        regs.write(Reg::prm(Module::USBHOST, prcm::PM_WKDEP), 0);
    }

    setup_autoidle(regs, soc);

    // External oscillator follows sys_clkreq
    regs.modify(
        Reg::prm(Module::GR, prcm::PRM_CLKSRC_CTRL),
        prcm::AUTOEXTCLKMODE_MASK,
        prcm::AUTOEXTCLKMODE_SYSCLKREQ,
    );

    setup_wakeup_sources(regs, soc);

    for module in RSTST_CLEAR {
        regs.write(Reg::prm(module, prcm::RM_RSTST), 0xffff_ffff);
    }

    let irqstatus = Reg::prm(Module::OCP, prcm::PRM_IRQSTATUS_MPU);
    regs.write(irqstatus, regs.read(irqstatus));

    iva_idle(regs);
    d2d_idle(regs);
}

fn setup_autoidle<R: RegisterAccess + ?Sized>(regs: &R, soc: &SocInfo) {
    regs.write(Reg::cm(Module::CORE, prcm::CM_AUTOIDLE1), prcm::CORE_AUTOIDLE1_ALL);
    regs.write(Reg::cm(Module::CORE, prcm::CM_AUTOIDLE2), prcm::CORE_AUTOIDLE2_ALL);
    if soc.has_es2_registers() {
        regs.write(Reg::cm(Module::CORE, prcm::CM_AUTOIDLE3), prcm::CORE_AUTOIDLE3_ALL);
    }
    regs.write(Reg::cm(Module::WKUP, prcm::CM_AUTOIDLE1), prcm::WKUP_AUTOIDLE_ALL);
    regs.write(Reg::cm(Module::DSS, prcm::CM_AUTOIDLE1), prcm::SINGLE_AUTOIDLE);
    regs.write(Reg::cm(Module::CAM, prcm::CM_AUTOIDLE1), prcm::SINGLE_AUTOIDLE);
    regs.write(Reg::cm(Module::PER, prcm::CM_AUTOIDLE1), prcm::PER_AUTOIDLE_ALL);
    if soc.has_es2_registers() {
        regs.write(Reg::cm(Module::USBHOST, prcm::CM_AUTOIDLE1), prcm::SINGLE_AUTOIDLE);
    }

    regs.write(scm::SYSCONFIG, scm::SYSCONFIG_AUTOIDLE);

    // DPLLs
    regs.write(Reg::cm(Module::IVA2, prcm::CM_AUTOIDLE2), 1 << prcm::AUTO_DPLL_SHIFT);
    regs.write(Reg::cm(Module::MPU, prcm::CM_AUTOIDLE2), 1 << prcm::AUTO_DPLL_SHIFT);
    regs.write(Reg::cm(Module::PLL, prcm::CM_AUTOIDLE1), prcm::PLL_AUTOIDLE_CORE_PERIPH);
    regs.write(
        Reg::cm(Module::PLL, prcm::CM_AUTOIDLE2),
        1 << prcm::AUTO_PERIPH2_DPLL_SHIFT,
    );
}

fn setup_wakeup_sources<R: RegisterAccess + ?Sized>(regs: &R, soc: &SocInfo) {
    let wkup_wken = Reg::prm(Module::WKUP, prcm::PM_WKEN1);
    regs.write(wkup_wken, WKUP_WAKE_SOURCES.bits());
    // From ES3.1 EN_IO is armed per transition
    if !soc.has_io_chain() {
        regs.set_bits(wkup_wken, WkupEvents::IO.bits());
    }
    regs.write(
        Reg::prm(Module::WKUP, prcm::PM_MPUGRPSEL1),
        WKUP_WAKE_SOURCES.bits(),
    );
    regs.write(
        Reg::prm(Module::OCP, prcm::PRM_IRQENABLE_MPU),
        (PrcmIrq::IO | PrcmIrq::WKUP).bits(),
    );

    regs.write(Reg::prm(Module::DSS, prcm::PM_WKEN1), prcm::DSS_EN_DSS);

    regs.write(Reg::prm(Module::PER, prcm::PM_WKEN1), PER_WAKE_SOURCES.bits());
    regs.write(
        Reg::prm(Module::PER, prcm::PM_MPUGRPSEL1),
        PER_WAKE_SOURCES.bits(),
    );

    // Keep wake-ups away from the IVA2
    regs.write(Reg::prm(Module::WKUP, prcm::PM_IVAGRPSEL1), 0);
    regs.write(Reg::prm(Module::CORE, prcm::PM_IVAGRPSEL1), 0);
    regs.write(Reg::prm(Module::CORE, prcm::PM_IVAGRPSEL3), 0);
    regs.write(Reg::prm(Module::PER, prcm::PM_IVAGRPSEL1), 0);
}

/// Force the IVA2 into idle so it cannot block chip retention
///
/// Boot code may have started the IVA2. If its clock domain shows activity
/// it is reset, booted into its idle loop, and held in reset again.
pub fn iva_idle<R: RegisterAccess + ?Sized>(regs: &R) {
    let fclken = Reg::cm(Module::IVA2, prcm::CM_FCLKEN1);
    let rstctrl = Reg::prm(Module::IVA2, prcm::RM_RSTCTRL);

    regs.write(fclken, 0);
    if regs.read(Reg::cm(Module::IVA2, prcm::CM_CLKSTST)) & prcm::CLKACTIVITY_IVA2 == 0 {
        return;
    }

    log::debug!("iva2: active after boot, forcing idle");
    regs.write(rstctrl, prcm::IVA2_RST_ALL);
    regs.write(fclken, prcm::EN_IVA2);
    regs.write(scm::IVA2_BOOTMOD, scm::IVA2_BOOTMOD_IDLE);
    regs.write(rstctrl, 0);
    regs.write(fclken, 0);
    regs.write(rstctrl, prcm::IVA2_RST_ALL);
}

/// Idle the die-to-die interface of a part without a stacked modem
pub fn d2d_idle<R: RegisterAccess + ?Sized>(regs: &R) {
    for pad in [scm::PADCONF_SAD2D_MSTANDBY, scm::PADCONF_SAD2D_IDLEACK] {
        let padconf = regs.read16(pad) | scm::PADCONF_PULL_UP;
        regs.write16(pad, padconf);
    }

    let rstctrl = Reg::prm(Module::CORE, prcm::RM_RSTCTRL);
    regs.write(rstctrl, prcm::CORE_MODEM_RST);
    regs.write(rstctrl, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimRegisters;
    use omap3_hal::{DeviceType, Revision};

    fn es31() -> SocInfo {
        SocInfo::new(Revision::Omap3430Es3_1, DeviceType::Gp)
    }

    #[test]
    fn test_early_init_clears_polarity() {
        let sim = SimRegisters::new();
        let polctrl = Reg::prm(Module::GR, prcm::PRM_POLCTRL);
        sim.set(polctrl, 0xff);
        early_init(&sim);
        assert_eq!(sim.get(polctrl), 0xff & !prcm::OFFMODE_POL);
    }

    #[test]
    fn test_wakeup_routing() {
        let sim = SimRegisters::new();
        setup_registers(&sim, &es31());

        assert_eq!(sim.get(Reg::prm(Module::PER, prcm::PM_WKEN1)), 0x3_e807);
        assert_eq!(sim.get(Reg::prm(Module::PER, prcm::PM_MPUGRPSEL1)), 0x3_e807);
        assert_eq!(
            sim.get(Reg::prm(Module::WKUP, prcm::PM_WKEN1)),
            WKUP_WAKE_SOURCES.bits()
        );
        assert_eq!(sim.get(Reg::prm(Module::DSS, prcm::PM_WKEN1)), prcm::DSS_EN_DSS);
        assert_eq!(
            sim.get(Reg::prm(Module::OCP, prcm::PRM_IRQENABLE_MPU)),
            (PrcmIrq::WKUP | PrcmIrq::IO).bits()
        );
    }

    #[test]
    fn test_io_wakeup_static_before_es31() {
        let sim = SimRegisters::new();
        setup_registers(&sim, &SocInfo::new(Revision::Omap3430Es2_1, DeviceType::Gp));
        assert_ne!(
            sim.get(Reg::prm(Module::WKUP, prcm::PM_WKEN1)) & WkupEvents::IO.bits(),
            0
        );
    }

    #[test]
    fn test_autoidle_and_dplls() {
        let sim = SimRegisters::new();
        setup_registers(&sim, &es31());
        assert_eq!(
            sim.get(Reg::cm(Module::CORE, prcm::CM_AUTOIDLE1)),
            prcm::CORE_AUTOIDLE1_ALL
        );
        assert_eq!(
            sim.get(Reg::cm(Module::PLL, prcm::CM_AUTOIDLE1)),
            prcm::PLL_AUTOIDLE_CORE_PERIPH
        );
        assert_eq!(sim.get(scm::SYSCONFIG), scm::SYSCONFIG_AUTOIDLE);
    }

    #[test]
    fn test_es1_skips_es2_registers() {
        let sim = SimRegisters::new();
        setup_registers(&sim, &SocInfo::new(Revision::Omap3430Es1_0, DeviceType::Gp));
        assert!(sim
            .writes_to(Reg::cm(Module::USBHOST, prcm::CM_AUTOIDLE1))
            .is_empty());
        assert!(sim.writes_to(Reg::cm(Module::CORE, prcm::CM_AUTOIDLE3)).is_empty());
    }

    #[test]
    fn test_pending_irq_acknowledged() {
        let sim = SimRegisters::new();
        let irqstatus = Reg::prm(Module::OCP, prcm::PRM_IRQSTATUS_MPU);
        sim.set(irqstatus, PrcmIrq::WKUP.bits());
        setup_registers(&sim, &es31());
        assert_eq!(sim.get(irqstatus), 0);
    }

    #[test]
    fn test_iva_idle_only_when_active() {
        let sim = SimRegisters::new();
        iva_idle(&sim);
        assert!(sim.writes_to(scm::IVA2_BOOTMOD).is_empty());

        sim.set(Reg::cm(Module::IVA2, prcm::CM_CLKSTST), prcm::CLKACTIVITY_IVA2);
        iva_idle(&sim);
        assert_eq!(sim.get(scm::IVA2_BOOTMOD), scm::IVA2_BOOTMOD_IDLE);
        assert_eq!(
            sim.writes_to(Reg::prm(Module::IVA2, prcm::RM_RSTCTRL)),
            [prcm::IVA2_RST_ALL, 0, prcm::IVA2_RST_ALL]
        );
        assert_eq!(sim.get(Reg::cm(Module::IVA2, prcm::CM_FCLKEN1)), 0);
    }

    #[test]
    fn test_d2d_pull_ups_and_modem_reset() {
        let sim = SimRegisters::new();
        sim.set(scm::PADCONF_SAD2D_MSTANDBY, 0x0100);
        d2d_idle(&sim);
        assert_eq!(
            sim.get(scm::PADCONF_SAD2D_MSTANDBY),
            0x0100 | scm::PADCONF_PULL_UP as u32
        );
        assert_eq!(
            sim.get(scm::PADCONF_SAD2D_IDLEACK),
            scm::PADCONF_PULL_UP as u32
        );
        assert_eq!(
            sim.writes_to(Reg::prm(Module::CORE, prcm::RM_RSTCTRL)),
            [prcm::CORE_MODEM_RST, 0]
        );
    }
}
