//! Access control events

use tenure_codec::Event;

use crate::role::{Address, Role};

/// Emitted when an account is granted a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGranted {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

impl Event for RoleGranted {
    const SIGNATURE: &'static str = "RoleGranted(byte[16],address,address)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(80);
        args.extend_from_slice(self.role.as_bytes());
        args.extend_from_slice(self.account.as_bytes());
        args.extend_from_slice(self.sender.as_bytes());
        args
    }
}

/// Emitted when a role is revoked from an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRevoked {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

impl Event for RoleRevoked {
    const SIGNATURE: &'static str = "RoleRevoked(byte[16],address,address)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(80);
        args.extend_from_slice(self.role.as_bytes());
        args.extend_from_slice(self.account.as_bytes());
        args.extend_from_slice(self.sender.as_bytes());
        args
    }
}

/// Emitted when a role's admin role changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAdminChanged {
    pub role: Role,
    pub previous_admin: Role,
    pub new_admin: Role,
}

impl Event for RoleAdminChanged {
    const SIGNATURE: &'static str = "RoleAdminChanged(byte[16],byte[16],byte[16])";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(48);
        args.extend_from_slice(self.role.as_bytes());
        args.extend_from_slice(self.previous_admin.as_bytes());
        args.extend_from_slice(self.new_admin.as_bytes());
        args
    }
}
