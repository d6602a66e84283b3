//! # OMAP3 Power Management Core
//!
//! Idle and suspend sequencing for OMAP34xx/36xx. The crate decides which
//! power states the MPU, NEON, CORE, PER and DSS domains may enter, saves
//! and restores the context those states destroy, clears latched wake-up
//! events, and drives the whole SoC to a per-domain target during system
//! suspend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         PowerManager                                │
//! │                                                                     │
//! │   idle()  run_idle()        suspend_*()          set_off_mode()     │
//! │      │         │                 │                     │            │
//! │      └────┬────┘                 └──────────┬──────────┘            │
//! │           ▼                                 ▼                       │
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐            │
//! │   │   context    │   │   wakeup     │   │   Registry   │            │
//! │   │ save/restore │   │ clear, mask  │   │ pwrdm/clkdm  │            │
//! │   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘            │
//! └──────────┼──────────────────┼──────────────────┼────────────────────┘
//!            ▼                  ▼                  ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │  RegisterAccess   Platform   LowPowerRoutines   CpuOps  │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Hardware is only reached through the capabilities at the bottom, so the
//! state machine runs unchanged against the memory-mapped register file on
//! target and against a simulated one in tests.
//!
//! ## Modules
//!
//! - [`state`]: power states, save levels, suspend states
//! - [`powerdomain`] and [`clockdomain`]: per-domain register operations
//! - [`domains`]: the OMAP3 domain tables and the [`Registry`]
//! - [`setup`]: one-time PRCM programming
//! - [`wakeup`]: wake-up status clearing, suspend masks, wake-up reason
//! - [`irq`]: the PRCM MPU interrupt handler
//! - [`context`]: CORE context, secure RAM, IO chain, MMU patch
//! - [`idle`]: the idle transaction
//! - [`suspend`]: the suspend transaction and host hooks

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clockdomain;
pub mod config;
pub mod context;
pub mod domains;
pub mod error;
pub mod idle;
pub mod irq;
pub mod manager;
pub mod platform;
pub mod powerdomain;
pub mod setup;
pub mod state;
pub mod suspend;
pub mod wakeup;

#[cfg(test)]
pub mod testing;

pub use clockdomain::ClkdmId;
pub use config::{PmConfig, SecureStorage, WakeSource, WakeupTimer};
pub use domains::Registry;
pub use error::{PmError, PmResult};
pub use idle::{IdleOutcome, IdleReport};
pub use irq::PrcmIrqHandler;
pub use manager::{PowerManager, SuspendTarget};
pub use platform::{LowPowerRoutines, MusbOp, Platform};
pub use powerdomain::PwrdmId;
pub use state::{IdleOrigin, PowerState, SaveLevel, SuspendState};
pub use wakeup::{WakeupReason, WakeupRecord};
