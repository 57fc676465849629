//! Boundary with the external runtime.
//!
//! The surrounding runtime serializes all calls against a governed instance,
//! supplies the caller identity and a single trusted timestamp per call, and
//! performs the actual code replacement when instructed.

use thiserror::Error;

use tenure_access::Address;

use crate::program::ProgramContent;

/// Caller identity and timestamp for one call.
///
/// `now` is injected once per call by the runtime; it is the time associated
/// with the preceding confirmed unit of work, not a live clock. Every
/// time-based decision inside a call uses this one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub now: u64,
}

impl CallContext {
    pub fn new(sender: Address, now: u64) -> Self {
        Self { sender, now }
    }
}

/// Failure reported by the external code-replacement capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InstallError(pub String);

/// External capability that swaps the governed program's executable content.
///
/// The governor authorizes and verifies; the installer performs the swap.
pub trait CodeInstaller {
    fn install(&mut self, content: &ProgramContent) -> Result<(), InstallError>;
}
