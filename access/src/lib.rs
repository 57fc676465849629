//! Tenure Access Control
//!
//! Role-based access control for governed programs. Roles are opaque 16-byte
//! identifiers; each role is administered by another role, defaulting to the
//! all-zero default admin role.

pub mod error;
pub mod event;
pub mod registry;
pub mod role;

pub use error::{AccessError, Result};
pub use event::{RoleAdminChanged, RoleGranted, RoleRevoked};
pub use registry::RoleRegistry;
pub use role::{Address, Role, ADDRESS_LEN, ROLE_LEN};
