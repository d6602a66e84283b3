//! # OMAP3 Hardware Abstraction Layer
//!
//! The pieces of OMAP34xx/36xx hardware the power management core needs to
//! sequence a low-power transition, and nothing more:
//!
//! - [`regs`]: the register access capability and the memory-mapped
//!   implementation used on target.
//! - [`prcm`]: PRM/CM module offsets, register offsets and the bit groups the
//!   state machine reads or writes.
//! - [`scm`]: system control module registers (padconf, general purpose
//!   status, wake-up memory).
//! - [`sdrc`]: the SDRC power register.
//! - [`scratchpad`]: the fixed scratch-pad layout holding the MMU patch.
//! - [`soc`]: silicon revision and device type.
//! - [`cpu`]: CPU maintenance operations (TLB, control register).
//!
//! ## Register Spaces
//!
//! ```text
//! ┌────────────┬────────────────────────────────────────────────────┐
//! │ Space      │ Addressed by                                       │
//! ├────────────┼────────────────────────────────────────────────────┤
//! │ Prm        │ module base (IVA2 .. USBHOST) + register offset    │
//! │ Cm         │ module base (IVA2 .. USBHOST) + register offset    │
//! │ Control    │ register offset                                    │
//! │ Sdrc       │ register offset                                    │
//! │ Scratchpad │ byte offset into the scratch-pad memory            │
//! └────────────┴────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(not(test), no_std)]

pub mod cpu;
pub mod prcm;
pub mod regs;
pub mod scm;
pub mod scratchpad;
pub mod sdrc;
pub mod soc;

pub use cpu::CpuOps;
pub use prcm::Module;
pub use regs::{Reg, RegisterAccess, Space};
pub use soc::{DeviceType, Revision, SocInfo};
