//! Error type of the power management core.

use core::fmt;

/// Result alias used throughout the crate
pub type PmResult<T> = Result<T, PmError>;

/// Power management errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmError {
    /// Unsupported state, suspend target, dependency or configuration value
    InvalidArgument,
    /// A power state field holds a value outside the known encodings
    InvalidState {
        /// Domain whose register was read
        domain: &'static str,
        /// Raw field value
        raw: u32,
    },
    /// Domains that did not reach their suspend target
    TargetNotReached {
        /// Number of domains that stayed shallower than requested
        failed: usize,
    },
    /// A required domain is missing from the registry
    NotFound(&'static str),
    /// A bounded poll ran out of iterations
    Timeout,
}

impl fmt::Display for PmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "Invalid argument"),
            Self::InvalidState { domain, raw } => {
                write!(f, "Invalid power state {:#x} in {}", raw, domain)
            },
            Self::TargetNotReached { failed } => {
                write!(f, "{} power domain(s) missed their suspend target", failed)
            },
            Self::NotFound(name) => write!(f, "Domain not found: {}", name),
            Self::Timeout => write!(f, "Timed out"),
        }
    }
}
