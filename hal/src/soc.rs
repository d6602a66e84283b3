//! # Silicon Identification
//!
//! Revision and device type decide which registers exist and which errata
//! workarounds the power management core applies.

use core::fmt;

/// Silicon revision, ordered from oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Revision {
    /// OMAP3430 ES1.0
    Omap3430Es1_0,
    /// OMAP3430 ES2.0
    Omap3430Es2_0,
    /// OMAP3430 ES2.1
    Omap3430Es2_1,
    /// OMAP3430 ES3.0
    Omap3430Es3_0,
    /// OMAP3430 ES3.1
    Omap3430Es3_1,
    /// OMAP3430 ES3.1.2
    Omap3430Es3_1_2,
    /// OMAP3630 ES1.0
    Omap3630Es1_0,
    /// OMAP3630 ES1.1
    Omap3630Es1_1,
    /// OMAP3630 ES1.2
    Omap3630Es1_2,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Revision::Omap3430Es1_0 => "OMAP3430 ES1.0",
            Revision::Omap3430Es2_0 => "OMAP3430 ES2.0",
            Revision::Omap3430Es2_1 => "OMAP3430 ES2.1",
            Revision::Omap3430Es3_0 => "OMAP3430 ES3.0",
            Revision::Omap3430Es3_1 => "OMAP3430 ES3.1",
            Revision::Omap3430Es3_1_2 => "OMAP3430 ES3.1.2",
            Revision::Omap3630Es1_0 => "OMAP3630 ES1.0",
            Revision::Omap3630Es1_1 => "OMAP3630 ES1.1",
            Revision::Omap3630Es1_2 => "OMAP3630 ES1.2",
        };
        f.write_str(name)
    }
}

/// Device security type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// General purpose
    Gp,
    /// Emulation
    Emu,
    /// High security
    Hs,
}

/// Revision and device type of the running silicon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocInfo {
    /// Silicon revision
    pub revision: Revision,
    /// Device type
    pub device_type: DeviceType,
}

impl SocInfo {
    /// Create a new descriptor
    pub const fn new(revision: Revision, device_type: DeviceType) -> Self {
        Self {
            revision,
            device_type,
        }
    }

    /// General-purpose (non-secure) silicon
    pub const fn is_gp(&self) -> bool {
        matches!(self.device_type, DeviceType::Gp)
    }

    /// Any revision after ES1.0: CORE group 3, USBHOST and SGX registers exist
    pub fn has_es2_registers(&self) -> bool {
        self.revision > Revision::Omap3430Es1_0
    }

    /// IO daisy chain wake-up is available from ES3.1
    pub fn has_io_chain(&self) -> bool {
        self.revision >= Revision::Omap3430Es3_1
    }

    /// ROM code clobbers `SDRC_POWER` on secure ES3.0+ parts (errata 1.142)
    pub fn needs_sdrc_power_restore(&self) -> bool {
        self.revision >= Revision::Omap3430Es3_0 && !self.is_gp()
    }

    /// PER GPIOs may glitch on wake-up unless PER wakes with CORE (erratum i468)
    pub fn needs_gpio_glitch_fix(&self) -> bool {
        self.revision <= Revision::Omap3630Es1_2
    }
}

impl Default for SocInfo {
    fn default() -> Self {
        Self::new(Revision::Omap3630Es1_2, DeviceType::Gp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_gates() {
        let es1 = SocInfo::new(Revision::Omap3430Es1_0, DeviceType::Gp);
        assert!(!es1.has_es2_registers());
        assert!(!es1.has_io_chain());

        let es31 = SocInfo::new(Revision::Omap3430Es3_1, DeviceType::Hs);
        assert!(es31.has_es2_registers());
        assert!(es31.has_io_chain());
        assert!(es31.needs_sdrc_power_restore());

        let gp = SocInfo::new(Revision::Omap3630Es1_1, DeviceType::Gp);
        assert!(!gp.needs_sdrc_power_restore());
        assert!(gp.needs_gpio_glitch_fix());
    }

    #[test]
    fn test_display() {
        assert_eq!(Revision::Omap3430Es3_1_2.to_string(), "OMAP3430 ES3.1.2");
    }
}
