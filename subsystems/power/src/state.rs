//! # Power States
//!
//! Encodings shared by the PRM power state fields and the state machine.

use core::fmt;

use bitflags::bitflags;

use crate::error::{PmError, PmResult};

/// Power state of a domain
///
/// Discriminants are the two-bit PRM field encodings. The ordering follows
/// power consumption: `Off < Retention < On`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum PowerState {
    /// Power removed, context lost
    Off = 0,
    /// Logic retained, not executing
    Retention = 1,
    /// Fully powered
    On = 3,
}

impl PowerState {
    /// Decode a PRM field value for `domain`
    pub fn from_raw(domain: &'static str, raw: u32) -> PmResult<Self> {
        match raw {
            0 => Ok(Self::Off),
            1 => Ok(Self::Retention),
            3 => Ok(Self::On),
            _ => Err(PmError::InvalidState { domain, raw }),
        }
    }

    /// PRM field encoding
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Next shallower-to-deeper step used by the legality search
    pub const fn lower(self) -> Option<Self> {
        match self {
            Self::On => Some(Self::Retention),
            Self::Retention => Some(Self::Off),
            Self::Off => None,
        }
    }

    /// Matching bit in a [`PowerStates`] set
    pub const fn as_set(self) -> PowerStates {
        PowerStates::from_bits_retain(1 << self.raw())
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "OFF"),
            Self::Retention => write!(f, "RET"),
            Self::On => write!(f, "ON"),
        }
    }
}

bitflags! {
    /// Set of legal power states
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerStates: u32 {
        /// OFF supported
        const OFF = 1 << 0;
        /// RETENTION supported
        const RET = 1 << 1;
        /// ON supported
        const ON = 1 << 3;

        /// OFF and ON
        const OFF_ON = Self::OFF.bits() | Self::ON.bits();
        /// RETENTION and ON
        const RET_ON = Self::RET.bits() | Self::ON.bits();
        /// All three
        const OFF_RET_ON = Self::OFF.bits() | Self::RET.bits() | Self::ON.bits();
    }
}

impl PowerStates {
    /// Whether `state` is legal
    pub const fn allows(self, state: PowerState) -> bool {
        self.contains(state.as_set())
    }
}

/// Context the low-level suspend routine must save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SaveLevel {
    /// Nothing lost (MPU stays ON or in RETENTION)
    None = 0,
    /// L1, L2 and logic lost (MPU OFF)
    All = 3,
}

/// Host suspend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendState {
    /// Not suspending
    On,
    /// Standby
    Standby,
    /// Suspend to memory
    Mem,
    /// Suspend to disk (not handled here)
    Disk,
}

/// Who asked for the idle transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOrigin {
    /// The CPU idle loop
    CpuIdle,
    /// A system suspend transaction
    Suspend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(PowerState::from_raw("mpu_pwrdm", 1), Ok(PowerState::Retention));
        assert_eq!(
            PowerState::from_raw("mpu_pwrdm", 2),
            Err(PmError::InvalidState {
                domain: "mpu_pwrdm",
                raw: 2
            })
        );
    }

    #[test]
    fn test_ordering_and_search() {
        assert!(PowerState::Off < PowerState::Retention);
        assert!(PowerState::Retention < PowerState::On);
        assert_eq!(PowerState::On.lower(), Some(PowerState::Retention));
        assert_eq!(PowerState::Off.lower(), None);
    }

    #[test]
    fn test_legal_sets() {
        assert!(PowerStates::OFF_ON.allows(PowerState::Off));
        assert!(!PowerStates::OFF_ON.allows(PowerState::Retention));
        assert!(PowerStates::ON.allows(PowerState::On));
        assert!(PowerStates::empty().is_empty());
    }
}
