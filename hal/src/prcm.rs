//! # PRCM Register Map
//!
//! Module bases and register offsets of the OMAP3 Power and Reset Manager
//! (PRM) and Clock Manager (CM). Both managers use the same module layout,
//! so a single [`Module`] value addresses either space.

use bitflags::bitflags;
use static_assertions::const_assert;

// =============================================================================
// Modules
// =============================================================================

/// PRM/CM module base
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Module(u16);

impl Module {
    /// Flat spaces (control module, SDRC, scratch-pad)
    pub const NONE: Module = Module(0xffff);
    /// IVA2 subsystem
    pub const IVA2: Module = Module(0x0000);
    /// OCP interface (interrupt status/enable)
    pub const OCP: Module = Module(0x0800);
    /// MPU subsystem
    pub const MPU: Module = Module(0x0900);
    /// CORE
    pub const CORE: Module = Module(0x0a00);
    /// SGX graphics (ES2 and later)
    pub const SGX: Module = Module(0x0b00);
    /// WKUP
    pub const WKUP: Module = Module(0x0c00);
    /// DPLLs
    pub const PLL: Module = Module(0x0d00);
    /// Display subsystem
    pub const DSS: Module = Module(0x0e00);
    /// Camera
    pub const CAM: Module = Module(0x0f00);
    /// Peripherals
    pub const PER: Module = Module(0x1000);
    /// Emulation
    pub const EMU: Module = Module(0x1100);
    /// Global registers (voltage control, polarity, clock source)
    pub const GR: Module = Module(0x1200);
    /// NEON coprocessor
    pub const NEON: Module = Module(0x1300);
    /// USB host (ES2 and later)
    pub const USBHOST: Module = Module(0x1400);

    /// Byte offset of the module within its space
    pub const fn base(self) -> u16 {
        if self.0 == Self::NONE.0 {
            0
        } else {
            self.0
        }
    }
}

// =============================================================================
// PRM Register Offsets
// =============================================================================

/// Reset control
pub const RM_RSTCTRL: u16 = 0x50;
/// Reset status
pub const RM_RSTST: u16 = 0x58;
/// Wake-up enable, group 1
pub const PM_WKEN1: u16 = 0xa0;
/// MPU wake-up group selection, group 1
pub const PM_MPUGRPSEL1: u16 = 0xa4;
/// IVA2 wake-up group selection, group 1
pub const PM_IVAGRPSEL1: u16 = 0xa8;
/// Wake-up status, group 1
pub const PM_WKST1: u16 = 0xb0;
/// Wake-up status, group 3 (CORE, ES2 and later)
pub const PM_WKST3: u16 = 0xb8;
/// Wake-up dependencies
pub const PM_WKDEP: u16 = 0xc8;
/// Power state control
pub const PM_PWSTCTRL: u16 = 0xe0;
/// Power state status
pub const PM_PWSTST: u16 = 0xe4;
/// Previous power state
pub const PM_PREPWSTST: u16 = 0xe8;
/// Wake-up enable, group 3 (CORE, ES2 and later)
pub const PM_WKEN3: u16 = 0xf0;
/// IVA2 wake-up group selection, group 3
pub const PM_IVAGRPSEL3: u16 = 0xf4;
/// MPU wake-up group selection, group 3
pub const PM_MPUGRPSEL3: u16 = 0xf8;

/// OCP: interrupt status towards the MPU
pub const PRM_IRQSTATUS_MPU: u16 = 0x18;
/// OCP: interrupt enable towards the MPU
pub const PRM_IRQENABLE_MPU: u16 = 0x1c;

/// GR: voltage controller control
pub const PRM_VOLTCTRL: u16 = 0x60;
/// GR: clock source control
pub const PRM_CLKSRC_CTRL: u16 = 0x70;
/// GR: polarity control
pub const PRM_POLCTRL: u16 = 0x9c;

// =============================================================================
// CM Register Offsets
// =============================================================================

/// Functional clock enable, group 1
pub const CM_FCLKEN1: u16 = 0x00;
/// Functional clock enable, group 3
pub const CM_FCLKEN3: u16 = 0x08;
/// Interface clock enable, group 1
pub const CM_ICLKEN1: u16 = 0x10;
/// Interface clock enable, group 3
pub const CM_ICLKEN3: u16 = 0x18;
/// Autoidle, group 1
pub const CM_AUTOIDLE1: u16 = 0x30;
/// Autoidle, group 2
pub const CM_AUTOIDLE2: u16 = 0x34;
/// Autoidle, group 3
pub const CM_AUTOIDLE3: u16 = 0x38;
/// Sleep dependencies
pub const CM_SLEEPDEP: u16 = 0x44;
/// Clock state transition control
pub const CM_CLKSTCTRL: u16 = 0x48;
/// Clock activity status
pub const CM_CLKSTST: u16 = 0x4c;

// Wake-up groups share the same slot layout across modules
const_assert!(PM_WKST3 > PM_WKST1 && PM_WKEN3 > PM_WKEN1);
const_assert!(CM_ICLKEN1 - CM_FCLKEN1 == CM_ICLKEN3 - CM_FCLKEN3);

// =============================================================================
// Power State Fields
// =============================================================================

/// `PM_PWSTCTRL.POWERSTATE`, `PM_PWSTST.POWERSTATEST` and
/// `PM_PREPWSTST.LASTPOWERSTATEENTERED`
pub const POWERSTATE_MASK: u32 = 0x3;
/// Hardware save-and-restore enable in `PM_PWSTCTRL`
pub const SAVEANDRESTORE: u32 = 1 << 4;
/// Transition in progress in `PM_PWSTST`
pub const INTRANSITION: u32 = 1 << 20;

/// Clock domain transition control values (`CM_CLKSTCTRL.CLKTRCTRL`)
pub mod clktrctrl {
    /// Automatic transition disabled
    pub const DISABLE_AUTO: u32 = 0x0;
    /// Force sleep
    pub const FORCE_SLEEP: u32 = 0x1;
    /// Force wake-up
    pub const FORCE_WAKEUP: u32 = 0x2;
    /// Hardware-supervised automatic transition
    pub const ENABLE_AUTO: u32 = 0x3;
}

/// Dependency bit positions in `PM_WKDEP` / `CM_SLEEPDEP`
pub mod depbit {
    /// CORE
    pub const CORE: u8 = 0;
    /// MPU
    pub const MPU: u8 = 1;
    /// IVA2
    pub const IVA2: u8 = 2;
    /// WKUP
    pub const WKUP: u8 = 4;
    /// DSS
    pub const DSS: u8 = 5;
    /// PER
    pub const PER: u8 = 7;
}

// =============================================================================
// Bit Groups
// =============================================================================

bitflags! {
    /// `PRM_IRQSTATUS_MPU` / `PRM_IRQENABLE_MPU`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PrcmIrq: u32 {
        /// Wake-up event pending
        const WKUP = 1 << 0;
        /// IO pad wake-up event pending
        const IO = 1 << 9;
    }
}

bitflags! {
    /// WKUP `PM_WKEN1` / `PM_WKST1` / `PM_MPUGRPSEL1`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WkupEvents: u32 {
        /// GP timer 1
        const GPT1 = 1 << 0;
        /// GP timer 12
        const GPT12 = 1 << 1;
        /// GPIO bank 1
        const GPIO1 = 1 << 3;
        /// IO pad wake-up
        const IO = 1 << 8;
        /// IO daisy chain
        const IO_CHAIN = 1 << 16;
    }
}

bitflags! {
    /// PER `PM_WKEN1` / `PM_WKST1` / `PM_MPUGRPSEL1`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PerEvents: u32 {
        /// McBSP2
        const MCBSP2 = 1 << 0;
        /// McBSP3
        const MCBSP3 = 1 << 1;
        /// McBSP4
        const MCBSP4 = 1 << 2;
        /// UART3
        const UART3 = 1 << 11;
        /// GPIO bank 2
        const GPIO2 = 1 << 13;
        /// GPIO bank 3
        const GPIO3 = 1 << 14;
        /// GPIO bank 4
        const GPIO4 = 1 << 15;
        /// GPIO bank 5
        const GPIO5 = 1 << 16;
        /// GPIO bank 6
        const GPIO6 = 1 << 17;
    }
}

bitflags! {
    /// GR `PRM_VOLTCTRL`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VoltCtrl: u32 {
        /// Voltage controller drives sleep on transition
        const AUTO_SLEEP = 1 << 1;
        /// Voltage controller drives retention on transition
        const AUTO_RET = 1 << 2;
        /// Voltage controller drives off on transition
        const AUTO_OFF = 1 << 3;
    }
}

/// GR `PRM_POLCTRL`: polarity of the off-mode signal
pub const OFFMODE_POL: u32 = 1 << 3;
/// GR `PRM_CLKSRC_CTRL`: external oscillator mode field
pub const AUTOEXTCLKMODE_MASK: u32 = 0x3 << 3;
/// External oscillator gated by `sys_clkreq`
pub const AUTOEXTCLKMODE_SYSCLKREQ: u32 = 0x1 << 3;

/// DSS `PM_WKEN1`: DSS wake-up enable
pub const DSS_EN_DSS: u32 = 1 << 0;

/// USBHOST `CM_FCLKEN1`: HOST2 functional clock, shift
pub const EN_USBHOST2_SHIFT: u32 = 1;

/// PLL `CM_AUTOIDLE1`: CORE DPLL autoidle, shift
pub const AUTO_CORE_DPLL_SHIFT: u32 = 0;
/// PLL `CM_AUTOIDLE1`: PERIPH DPLL autoidle, shift
pub const AUTO_PERIPH_DPLL_SHIFT: u32 = 3;
/// PLL `CM_AUTOIDLE2`: PERIPH2 DPLL autoidle, shift
pub const AUTO_PERIPH2_DPLL_SHIFT: u32 = 0;
/// IVA2 / MPU `CM_AUTOIDLE2`: DPLL autoidle, shift
pub const AUTO_DPLL_SHIFT: u32 = 0;

/// PLL `CM_AUTOIDLE1` value with CORE and PERIPH DPLLs in autoidle
pub const PLL_AUTOIDLE_CORE_PERIPH: u32 =
    (1 << AUTO_PERIPH_DPLL_SHIFT) | (1 << AUTO_CORE_DPLL_SHIFT);

// Interface clock autoidle masks, one per module/register
/// CORE `CM_AUTOIDLE1`: SSI, SAD2D, HSOTGUSB .. MODEM
pub const CORE_AUTOIDLE1_ALL: u32 = 0xffff_fff9;
/// CORE `CM_AUTOIDLE2`: DES1, SHA11, RNG, AES1, PKA
pub const CORE_AUTOIDLE2_ALL: u32 = 0x0000_001f;
/// CORE `CM_AUTOIDLE3`: USBTLL, MAD2D
pub const CORE_AUTOIDLE3_ALL: u32 = 0x0000_000c;
/// WKUP `CM_AUTOIDLE1`: GPT1, GPT12, 32KSYNC, GPIO1, WDT1, WDT2
pub const WKUP_AUTOIDLE_ALL: u32 = 0x0000_003f;
/// PER `CM_AUTOIDLE1`: McBSP2..4, GPT2..9, UART3, WDT3, GPIO2..6
pub const PER_AUTOIDLE_ALL: u32 = 0x0003_ffff;
/// DSS / CAM / USBHOST `CM_AUTOIDLE1`: single module bit
pub const SINGLE_AUTOIDLE: u32 = 0x0000_0001;

/// IVA2 `RM_RSTCTRL`: RST1..RST3
pub const IVA2_RST_ALL: u32 = 0x7;
/// IVA2 `CM_FCLKEN1`: IVA2 functional clock
pub const EN_IVA2: u32 = 1 << 0;
/// IVA2 `CM_CLKSTST`: clock activity
pub const CLKACTIVITY_IVA2: u32 = 1 << 0;
/// CORE `RM_RSTCTRL`: modem power-on and software reset
pub const CORE_MODEM_RST: u32 = 0x3;
