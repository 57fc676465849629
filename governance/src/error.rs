//! Governance error types

use thiserror::Error;

use tenure_access::AccessError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Caller must be the contract creator")]
    NotCreator,

    #[error("Contract already initialised")]
    AlreadyInitialised,

    #[error("Uninitialised contract")]
    UninitialisedContract,

    #[error("Delay exceeds maximum allowed")]
    DelayExceedsMaximum,

    #[error("Must schedule at least min upgrade delay time in future")]
    ScheduleTooSoon,

    #[error("Upgrade not scheduled")]
    NoUpgradeScheduled,

    #[error("Schedule complete ts not met")]
    ScheduleNotYetDue,

    #[error("Invalid program SHA256")]
    ProgramHashMismatch,

    #[error("Code install failed: {0}")]
    InstallFailed(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Rate limiter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Unknown rate limit bucket")]
    UnknownBucket,

    #[error("Insufficient capacity to consume")]
    InsufficientCapacity,
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
