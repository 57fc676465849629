//! Role membership and role-admin hierarchy

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};
use crate::event::{RoleAdminChanged, RoleGranted, RoleRevoked};
use crate::role::{Address, Role};

/// Role membership and the role-admin mapping.
///
/// Membership is a boolean predicate over (role, address) pairs. Every role
/// is administered by exactly one role; roles without an explicit mapping are
/// administered by [`Role::DEFAULT_ADMIN`]. Only holders of a role's admin
/// role may grant or revoke it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    admins: HashMap<Role, Role>,
    members: BTreeSet<(Role, Address)>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the account has been granted the role. Never fails.
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members.contains(&(role, *account))
    }

    /// The role administering `role`, defaulting to the default admin role
    pub fn get_role_admin(&self, role: Role) -> Role {
        self.admins.get(&role).copied().unwrap_or(Role::DEFAULT_ADMIN)
    }

    /// Guard used at the top of privileged operations, before any mutation
    pub fn require_role(&self, role: Role, account: &Address) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized)
        }
    }

    /// Grant a role to an account.
    ///
    /// The caller must hold the role's admin role. Returns `None` when the
    /// account already held the role.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<Option<RoleGranted>> {
        self.require_role(self.get_role_admin(role), caller)?;
        Ok(self.grant_role_unchecked(role, account, *caller))
    }

    /// Revoke a role from an account.
    ///
    /// The caller must hold the role's admin role. Returns `None` when the
    /// account did not hold the role.
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<Option<RoleRevoked>> {
        self.require_role(self.get_role_admin(role), caller)?;
        Ok(self.revoke_role_unchecked(role, account, *caller))
    }

    /// Revoke a role from the caller itself. No admin check.
    pub fn renounce_role(&mut self, caller: &Address, role: Role) -> Option<RoleRevoked> {
        self.revoke_role_unchecked(role, *caller, *caller)
    }

    /// Grant without an admin check. Reserved for the initialisation path,
    /// where role storage is being seeded before any admin exists.
    ///
    /// The first grant of a previously unseen role pins its admin mapping to
    /// the default admin role.
    pub fn grant_role_unchecked(
        &mut self,
        role: Role,
        account: Address,
        sender: Address,
    ) -> Option<RoleGranted> {
        self.admins.entry(role).or_insert(Role::DEFAULT_ADMIN);

        if self.members.insert((role, account)) {
            Some(RoleGranted { role, account, sender })
        } else {
            None
        }
    }

    /// Change which role administers `role`
    pub fn set_role_admin(&mut self, role: Role, admin_role: Role) -> RoleAdminChanged {
        let previous_admin = self.get_role_admin(role);
        self.admins.insert(role, admin_role);
        RoleAdminChanged {
            role,
            previous_admin,
            new_admin: admin_role,
        }
    }

    fn revoke_role_unchecked(
        &mut self,
        role: Role,
        account: Address,
        sender: Address,
    ) -> Option<RoleRevoked> {
        if self.members.remove(&(role, account)) {
            Some(RoleRevoked { role, account, sender })
        } else {
            None
        }
    }
}
