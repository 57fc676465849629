//! Tenure Upgrade Governance
//!
//! Time-delayed, access-controlled replacement of a long-lived program's
//! executable content. An upgrade must be scheduled at least "min upgrade
//! delay" in the future; changes to the min upgrade delay must similarly
//! wait, so an admin cannot instantly weaken the notice period protecting
//! against instant changes.
//!
//! The module authorizes and verifies; the actual code swap is performed by
//! an external [`CodeInstaller`] capability.

pub mod delayed;
pub mod error;
pub mod event;
pub mod governor;
pub mod program;
pub mod ratelimit;
pub mod runtime;

pub use delayed::DelayedValue;
pub use error::{GovernanceError, RateLimitError, Result};
pub use event::{
    MinimumUpgradeDelayChange, UpgradeCancelled, UpgradeCompleted, UpgradeScheduled,
};
pub use governor::{upgradeable_admin_role, GovernanceState, ScheduledUpgrade, UpgradeGovernor};
pub use program::{ProgramContent, ProgramHash, ProgramSegment, PROGRAM_HASH_LEN};
pub use ratelimit::{BucketId, RateLimitBucket, RateLimiter};
pub use runtime::{CallContext, CodeInstaller, InstallError};

pub use tenure_access::{AccessError, Address, Role, RoleRegistry};
pub use tenure_codec::{Event, EventRecord};

/// Governance configuration constants
pub mod config {
    /// Ceiling for the minimum upgrade delay (two weeks in seconds).
    ///
    /// Prevents the min upgrade delay from being set so large that updating
    /// it or scheduling an upgrade becomes effectively impossible.
    pub const MAX_MIN_UPGRADE_DELAY_SECS: u64 = 60 * 60 * 24 * 7 * 2;

    /// Name the upgradeable admin role identifier is derived from
    pub const UPGRADEABLE_ADMIN_ROLE_NAME: &str = "UPGRADEABLE_ADMIN";
}
