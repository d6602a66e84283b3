//! # Configuration
//!
//! Board and policy knobs of the power management core. Built once before
//! [`PowerManager::new`](crate::PowerManager::new) and then owned by the
//! manager.

use omap3_hal::scm;
use omap3_hal::SocInfo;

use crate::error::{PmError, PmResult};
use crate::wakeup::WakeupReason;

/// Secure RAM image size on EMU/HS devices: 60 KiB plus a 64-byte header
pub const DEFAULT_SECURE_COPY_SIZE: u32 = 0xf040;

/// Timer armed at the start of every suspend transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupTimer {
    /// Whole seconds
    pub seconds: u32,
    /// Additional milliseconds
    pub milliseconds: u32,
}

/// Destination of the secure RAM save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureStorage {
    /// Physical address of the buffer
    pub phys_addr: u32,
    /// Bytes the secure monitor copies out
    pub size: u32,
}

/// One entry of the board wake-up source table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSource {
    /// Padconf offset of the pad
    pub pad_offset: u16,
    /// Reason reported when this pad woke the system
    pub reason: WakeupReason,
    /// Human-readable name for logs
    pub name: &'static str,
}

/// Power management configuration
#[derive(Debug, Clone)]
pub struct PmConfig {
    /// Running silicon
    pub soc: SocInfo,
    /// Let the idle loop enter the idle transaction
    pub sleep_while_idle: bool,
    /// Target OFF instead of RETENTION for suspend
    pub enable_off_mode: bool,
    /// Optional wake-up timer for suspend
    pub wakeup_timer: Option<WakeupTimer>,
    /// Secure RAM save buffer
    pub secure_storage: SecureStorage,
    /// Cap on wake-status clear iterations per register group
    pub wake_clear_limit: u32,
    /// Cap on IO daisy chain activation polls
    pub io_chain_limit: u32,
    /// Cap on padconf save completion polls
    pub padconf_save_limit: u32,
    /// Cap on power domain transition polls
    pub transition_limit: u32,
    /// Board wake-up sources, looked up by pad offset
    pub wake_sources: &'static [WakeSource],
    /// Pad carrying the PMIC interrupt, if any
    pub pmic_pad: Option<u16>,
}

impl Default for PmConfig {
    fn default() -> Self {
        Self {
            soc: SocInfo::default(),
            sleep_while_idle: false,
            enable_off_mode: false,
            wakeup_timer: None,
            secure_storage: SecureStorage {
                phys_addr: 0,
                size: DEFAULT_SECURE_COPY_SIZE,
            },
            wake_clear_limit: 64,
            io_chain_limit: 1000,
            padconf_save_limit: 1000,
            transition_limit: 100_000,
            wake_sources: &[],
            pmic_pad: Some(scm::PADCONF_SYS_NIRQ),
        }
    }
}

impl PmConfig {
    /// Defaults for the given silicon
    pub fn new(soc: SocInfo) -> Self {
        Self {
            soc,
            ..Default::default()
        }
    }

    /// Enable or disable sleeping from the idle loop
    pub fn with_sleep_while_idle(mut self, enable: bool) -> Self {
        self.sleep_while_idle = enable;
        self
    }

    /// Enable or disable off-mode at init
    pub fn with_off_mode(mut self, enable: bool) -> Self {
        self.enable_off_mode = enable;
        self
    }

    /// Arm a wake-up timer for every suspend
    pub fn with_wakeup_timer(mut self, seconds: u32, milliseconds: u32) -> Self {
        self.wakeup_timer = if seconds == 0 && milliseconds == 0 {
            None
        } else {
            Some(WakeupTimer {
                seconds,
                milliseconds,
            })
        };
        self
    }

    /// Install the board wake-up source table
    pub fn with_wake_sources(mut self, sources: &'static [WakeSource]) -> Self {
        self.wake_sources = sources;
        self
    }

    /// Set the secure RAM save buffer address
    pub fn with_secure_storage(mut self, phys_addr: u32) -> Self {
        self.secure_storage.phys_addr = phys_addr;
        self
    }

    /// Override the secure RAM copy size for the PPA in use
    pub fn set_secure_copy_size(&mut self, size: u32) -> PmResult<()> {
        if size == 0 {
            return Err(PmError::InvalidArgument);
        }
        self.secure_storage.size = size;
        Ok(())
    }

    /// Find the wake source registered for `pad_offset`
    pub fn wake_source(&self, pad_offset: u16) -> Option<&WakeSource> {
        self.wake_sources.iter().find(|s| s.pad_offset == pad_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SOURCES: [WakeSource; 1] = [WakeSource {
        pad_offset: 0x16e,
        reason: WakeupReason::Keypad,
        name: "keypad",
    }];

    #[test]
    fn test_defaults() {
        let config = PmConfig::default();
        assert!(!config.enable_off_mode);
        assert_eq!(config.secure_storage.size, DEFAULT_SECURE_COPY_SIZE);
        assert!(config.wake_clear_limit > 0);
        assert_eq!(config.pmic_pad, Some(0x1e0));
    }

    #[test]
    fn test_secure_size_rejects_zero() {
        let mut config = PmConfig::default();
        assert_eq!(config.set_secure_copy_size(0), Err(PmError::InvalidArgument));
        assert!(config.set_secure_copy_size(0x8000).is_ok());
        assert_eq!(config.secure_storage.size, 0x8000);
    }

    #[test]
    fn test_wakeup_timer_zero_disables() {
        let config = PmConfig::default().with_wakeup_timer(0, 0);
        assert_eq!(config.wakeup_timer, None);
        let config = PmConfig::default().with_wakeup_timer(5, 0);
        assert!(config.wakeup_timer.is_some());
    }

    #[test]
    fn test_wake_source_lookup() {
        let config = PmConfig::default().with_wake_sources(&SOURCES);
        assert_eq!(config.wake_source(0x16e).map(|s| s.name), Some("keypad"));
        assert!(config.wake_source(0x1e0).is_none());
    }
}
