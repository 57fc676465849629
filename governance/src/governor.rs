//! Upgrade governance state machine.
//!
//! One `UpgradeGovernor` per governed program instance, owned by the caller
//! and passed explicitly to every operation. Calls run to completion against
//! a single state snapshot; the runtime serializes them, so no locking is
//! needed here. Every guard runs before any mutation, so a rejected call
//! leaves state untouched.

use serde::{Deserialize, Serialize};

use tenure_access::{Address, Role, RoleRegistry};
use tenure_codec::{Event, EventRecord};

use crate::config;
use crate::delayed::DelayedValue;
use crate::error::{GovernanceError, Result};
use crate::event::{
    MinimumUpgradeDelayChange, UpgradeCancelled, UpgradeCompleted, UpgradeScheduled,
};
use crate::program::{ProgramContent, ProgramHash};
use crate::runtime::{CallContext, CodeInstaller};

/// Role authorized to manage delay parameters and the upgrade lifecycle
pub fn upgradeable_admin_role() -> Role {
    Role::from_name(config::UPGRADEABLE_ADMIN_ROLE_NAME)
}

/// A committed future upgrade: content hash plus the earliest completion time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledUpgrade {
    pub program_hash: ProgramHash,
    pub effective_at: u64,
}

/// Governance bookkeeping for one governed instance.
///
/// `version` starts at 1 and increments on every completed upgrade;
/// `initialised` resets to false at the same moment, forcing admin roles to
/// be re-established under the new code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceState {
    pub initialised: bool,
    pub version: u64,
    pub min_upgrade_delay: DelayedValue<u64>,
    pub scheduled_upgrade: Option<ScheduledUpgrade>,
}

/// Orchestrates initialization, scheduling, cancellation and completion of
/// code upgrades for a single governed instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeGovernor {
    creator: Address,
    state: GovernanceState,
    roles: RoleRegistry,
    events: Vec<EventRecord>,
}

impl UpgradeGovernor {
    /// Create the governance record at deployment.
    ///
    /// The deploy-time delay is active immediately. Rejects delays above the
    /// ceiling, so an instance can never be deployed already locked.
    pub fn new(creator: Address, min_upgrade_delay: u64) -> Result<Self> {
        if min_upgrade_delay > config::MAX_MIN_UPGRADE_DELAY_SECS {
            return Err(GovernanceError::DelayExceedsMaximum);
        }

        Ok(Self {
            creator,
            state: GovernanceState {
                initialised: false,
                version: 1,
                min_upgrade_delay: DelayedValue::immediate(min_upgrade_delay),
                scheduled_upgrade: None,
            },
            roles: RoleRegistry::new(),
            events: Vec::new(),
        })
    }

    /// One-time initialisation, restricted to the deployment creator.
    ///
    /// Grants the default admin and upgradeable admin roles to `admin`.
    /// Required again after every completed upgrade, since the new code may
    /// lay out role storage differently.
    pub fn initialise(&mut self, ctx: &CallContext, admin: Address) -> Result<()> {
        if ctx.sender != self.creator {
            return Err(GovernanceError::NotCreator);
        }
        if self.state.initialised {
            return Err(GovernanceError::AlreadyInitialised);
        }

        self.state.initialised = true;
        if let Some(event) = self
            .roles
            .grant_role_unchecked(Role::DEFAULT_ADMIN, admin, ctx.sender)
        {
            self.events.push(event.to_record());
        }
        if let Some(event) =
            self.roles
                .grant_role_unchecked(upgradeable_admin_role(), admin, ctx.sender)
        {
            self.events.push(event.to_record());
        }

        log::info!("governance initialised, admin {}", admin);
        Ok(())
    }

    /// Schedule a change to the minimum upgrade delay.
    ///
    /// The change itself must honor the currently active delay, so an admin
    /// cannot instantly weaken the notice period.
    pub fn update_min_upgrade_delay(
        &mut self,
        ctx: &CallContext,
        new_delay: u64,
        effective_at: u64,
    ) -> Result<()> {
        self.only_initialised()?;
        self.roles.require_role(upgradeable_admin_role(), &ctx.sender)?;

        if new_delay > config::MAX_MIN_UPGRADE_DELAY_SECS {
            return Err(GovernanceError::DelayExceedsMaximum);
        }
        self.check_schedule_timestamp(effective_at, ctx.now)?;

        self.state
            .min_upgrade_delay
            .schedule(new_delay, effective_at, ctx.now);
        self.emit(MinimumUpgradeDelayChange {
            delay: new_delay,
            effective_at,
        });

        log::info!(
            "min upgrade delay change scheduled, delay {} effective at {}",
            new_delay,
            effective_at
        );
        Ok(())
    }

    /// Commit to a future upgrade by content hash.
    ///
    /// Silently replaces any prior schedule; no separate cancel is needed
    /// before rescheduling.
    pub fn schedule_contract_upgrade(
        &mut self,
        ctx: &CallContext,
        program_hash: ProgramHash,
        effective_at: u64,
    ) -> Result<()> {
        self.only_initialised()?;
        self.roles.require_role(upgradeable_admin_role(), &ctx.sender)?;
        self.check_schedule_timestamp(effective_at, ctx.now)?;

        self.state.scheduled_upgrade = Some(ScheduledUpgrade {
            program_hash,
            effective_at,
        });
        self.emit(UpgradeScheduled {
            program_hash,
            effective_at,
        });

        log::info!(
            "upgrade scheduled, hash {} effective at {}",
            program_hash,
            effective_at
        );
        Ok(())
    }

    /// Cancel the outstanding scheduled upgrade
    pub fn cancel_contract_upgrade(&mut self, ctx: &CallContext) -> Result<()> {
        self.only_initialised()?;
        self.roles.require_role(upgradeable_admin_role(), &ctx.sender)?;

        let scheduled = self
            .state
            .scheduled_upgrade
            .take()
            .ok_or(GovernanceError::NoUpgradeScheduled)?;
        self.emit(UpgradeCancelled {
            program_hash: scheduled.program_hash,
            effective_at: scheduled.effective_at,
        });

        log::info!("upgrade cancelled, hash {}", scheduled.program_hash);
        Ok(())
    }

    /// Complete the scheduled upgrade.
    ///
    /// Verifies the supplied content hashes to the committed digest, then
    /// instructs the installer to perform the swap. On success the version
    /// increments and the instance returns to the uninitialised state.
    pub fn complete_contract_upgrade(
        &mut self,
        ctx: &CallContext,
        content: &ProgramContent,
        installer: &mut dyn CodeInstaller,
    ) -> Result<()> {
        self.only_initialised()?;
        self.roles.require_role(upgradeable_admin_role(), &ctx.sender)?;

        let scheduled = self
            .state
            .scheduled_upgrade
            .ok_or(GovernanceError::NoUpgradeScheduled)?;
        if ctx.now < scheduled.effective_at {
            return Err(GovernanceError::ScheduleNotYetDue);
        }

        let digest = content.digest();
        if digest != scheduled.program_hash {
            return Err(GovernanceError::ProgramHashMismatch);
        }

        installer
            .install(content)
            .map_err(|e| GovernanceError::InstallFailed(e.to_string()))?;

        self.state.scheduled_upgrade = None;
        self.state.version += 1;
        self.state.initialised = false;
        self.emit(UpgradeCompleted {
            program_hash: digest,
            version: self.state.version,
        });

        log::info!(
            "upgrade completed, hash {} version {}",
            digest,
            self.state.version
        );
        Ok(())
    }

    /// The minimum notice period active at `now`
    pub fn get_active_min_upgrade_delay(&self, now: u64) -> u64 {
        self.state.min_upgrade_delay.active_at(now)
    }

    /// Ceiling for the minimum upgrade delay
    pub fn max_for_min_upgrade_delay(&self) -> u64 {
        config::MAX_MIN_UPGRADE_DELAY_SECS
    }

    /// Grant a role; the caller must hold the role's admin role
    pub fn grant_role(&mut self, ctx: &CallContext, role: Role, account: Address) -> Result<()> {
        if let Some(event) = self.roles.grant_role(&ctx.sender, role, account)? {
            self.events.push(event.to_record());
        }
        Ok(())
    }

    /// Revoke a role; the caller must hold the role's admin role
    pub fn revoke_role(&mut self, ctx: &CallContext, role: Role, account: Address) -> Result<()> {
        if let Some(event) = self.roles.revoke_role(&ctx.sender, role, account)? {
            self.events.push(event.to_record());
        }
        Ok(())
    }

    /// Revoke a role from the caller itself
    pub fn renounce_role(&mut self, ctx: &CallContext, role: Role) {
        if let Some(event) = self.roles.renounce_role(&ctx.sender, role) {
            self.events.push(event.to_record());
        }
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn get_role_admin(&self, role: Role) -> Role {
        self.roles.get_role_admin(role)
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn is_initialised(&self) -> bool {
        self.state.initialised
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn min_upgrade_delay(&self) -> &DelayedValue<u64> {
        &self.state.min_upgrade_delay
    }

    pub fn scheduled_upgrade(&self) -> Option<&ScheduledUpgrade> {
        self.state.scheduled_upgrade.as_ref()
    }

    /// The full queryable state surface
    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Append-only event log
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Drain the event log, e.g. after observers have consumed it
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    fn only_initialised(&self) -> Result<()> {
        if self.state.initialised {
            Ok(())
        } else {
            Err(GovernanceError::UninitialisedContract)
        }
    }

    fn check_schedule_timestamp(&self, effective_at: u64, now: u64) -> Result<()> {
        let earliest = now.saturating_add(self.get_active_min_upgrade_delay(now));
        if effective_at < earliest {
            return Err(GovernanceError::ScheduleTooSoon);
        }
        Ok(())
    }

    fn emit<E: Event>(&mut self, event: E) {
        self.events.push(event.to_record());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenure_access::{AccessError, ADDRESS_LEN};

    const DAY: u64 = 86_400;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; ADDRESS_LEN])
    }

    fn initialised_governor(delay: u64) -> (UpgradeGovernor, Address) {
        let creator = addr(1);
        let admin = addr(2);
        let mut governor = UpgradeGovernor::new(creator, delay).unwrap();
        governor
            .initialise(&CallContext::new(creator, 0), admin)
            .unwrap();
        (governor, admin)
    }

    #[test]
    fn test_new_rejects_excessive_delay() {
        let result = UpgradeGovernor::new(addr(1), config::MAX_MIN_UPGRADE_DELAY_SECS + 1);
        assert_eq!(result.unwrap_err(), GovernanceError::DelayExceedsMaximum);

        assert!(UpgradeGovernor::new(addr(1), config::MAX_MIN_UPGRADE_DELAY_SECS).is_ok());
    }

    #[test]
    fn test_new_seeds_state() {
        let governor = UpgradeGovernor::new(addr(1), DAY).unwrap();
        assert!(!governor.is_initialised());
        assert_eq!(governor.version(), 1);
        assert_eq!(governor.get_active_min_upgrade_delay(0), DAY);
        assert!(governor.scheduled_upgrade().is_none());
    }

    #[test]
    fn test_initialise_requires_creator() {
        let mut governor = UpgradeGovernor::new(addr(1), DAY).unwrap();
        let result = governor.initialise(&CallContext::new(addr(9), 0), addr(2));
        assert_eq!(result.unwrap_err(), GovernanceError::NotCreator);
    }

    #[test]
    fn test_initialise_twice_rejected() {
        let (mut governor, _) = initialised_governor(DAY);
        let result = governor.initialise(&CallContext::new(addr(1), 0), addr(3));
        assert_eq!(result.unwrap_err(), GovernanceError::AlreadyInitialised);
    }

    #[test]
    fn test_initialise_grants_both_roles() {
        let (governor, admin) = initialised_governor(DAY);
        assert!(governor.has_role(Role::DEFAULT_ADMIN, &admin));
        assert!(governor.has_role(upgradeable_admin_role(), &admin));
        assert_eq!(governor.events().len(), 2);
    }

    #[test]
    fn test_privileged_calls_require_initialise() {
        let mut governor = UpgradeGovernor::new(addr(1), DAY).unwrap();
        let ctx = CallContext::new(addr(2), 0);

        assert_eq!(
            governor.update_min_upgrade_delay(&ctx, DAY, 2 * DAY),
            Err(GovernanceError::UninitialisedContract)
        );
        assert_eq!(
            governor.schedule_contract_upgrade(
                &ctx,
                ProgramHash::from_bytes([0u8; 32]),
                2 * DAY
            ),
            Err(GovernanceError::UninitialisedContract)
        );
        assert_eq!(
            governor.cancel_contract_upgrade(&ctx),
            Err(GovernanceError::UninitialisedContract)
        );
    }

    #[test]
    fn test_privileged_calls_require_role() {
        let (mut governor, _) = initialised_governor(DAY);
        let outsider = CallContext::new(addr(9), 0);

        assert_eq!(
            governor.update_min_upgrade_delay(&outsider, DAY, 2 * DAY),
            Err(GovernanceError::Access(AccessError::Unauthorized))
        );
        assert_eq!(
            governor.schedule_contract_upgrade(
                &outsider,
                ProgramHash::from_bytes([0u8; 32]),
                2 * DAY
            ),
            Err(GovernanceError::Access(AccessError::Unauthorized))
        );
    }

    #[test]
    fn test_update_min_delay_rejects_excessive() {
        let (mut governor, admin) = initialised_governor(DAY);
        let ctx = CallContext::new(admin, 0);

        let result = governor.update_min_upgrade_delay(
            &ctx,
            config::MAX_MIN_UPGRADE_DELAY_SECS + 1,
            DAY,
        );
        assert_eq!(result.unwrap_err(), GovernanceError::DelayExceedsMaximum);
    }

    #[test]
    fn test_update_min_delay_honors_active_delay() {
        let (mut governor, admin) = initialised_governor(DAY);
        let now = 1_000;
        let ctx = CallContext::new(admin, now);

        // one second short of the active notice period
        let result = governor.update_min_upgrade_delay(&ctx, 0, now + DAY - 1);
        assert_eq!(result.unwrap_err(), GovernanceError::ScheduleTooSoon);

        // exactly at the boundary is allowed
        governor
            .update_min_upgrade_delay(&ctx, 0, now + DAY)
            .unwrap();

        // new value applies from its threshold, prior value until then
        assert_eq!(governor.get_active_min_upgrade_delay(now + DAY - 1), DAY);
        assert_eq!(governor.get_active_min_upgrade_delay(now + DAY), 0);
    }

    #[test]
    fn test_update_min_delay_previous_never_stale() {
        let (mut governor, admin) = initialised_governor(DAY);

        governor
            .update_min_upgrade_delay(&CallContext::new(admin, 0), 2 * DAY, DAY)
            .unwrap();
        // overwrite the still-pending change; active value is still DAY
        governor
            .update_min_upgrade_delay(&CallContext::new(admin, DAY - 1), 3 * DAY, 2 * DAY + DAY - 1)
            .unwrap();

        let delayed = governor.min_upgrade_delay();
        assert_eq!(delayed.previous, DAY);
        assert_eq!(delayed.pending, 3 * DAY);
    }

    #[test]
    fn test_schedule_replaces_prior_schedule() {
        let (mut governor, admin) = initialised_governor(DAY);
        let ctx = CallContext::new(admin, 0);
        let first = ProgramHash::from_bytes([1u8; 32]);
        let second = ProgramHash::from_bytes([2u8; 32]);

        governor.schedule_contract_upgrade(&ctx, first, DAY).unwrap();
        governor
            .schedule_contract_upgrade(&ctx, second, 2 * DAY)
            .unwrap();

        let scheduled = governor.scheduled_upgrade().unwrap();
        assert_eq!(scheduled.program_hash, second);
        assert_eq!(scheduled.effective_at, 2 * DAY);
    }

    #[test]
    fn test_cancel_without_schedule() {
        let (mut governor, admin) = initialised_governor(DAY);
        let result = governor.cancel_contract_upgrade(&CallContext::new(admin, 0));
        assert_eq!(result.unwrap_err(), GovernanceError::NoUpgradeScheduled);
    }

    #[test]
    fn test_cancel_reports_cleared_schedule() {
        let (mut governor, admin) = initialised_governor(DAY);
        let hash = ProgramHash::from_bytes([7u8; 32]);

        governor
            .schedule_contract_upgrade(&CallContext::new(admin, 0), hash, DAY)
            .unwrap();
        governor
            .cancel_contract_upgrade(&CallContext::new(admin, 10))
            .unwrap();

        assert!(governor.scheduled_upgrade().is_none());

        let expected = UpgradeCancelled {
            program_hash: hash,
            effective_at: DAY,
        }
        .to_record();
        assert_eq!(governor.events().last().unwrap(), &expected);
    }

    #[test]
    fn test_state_surface_serializes() {
        let (mut governor, admin) = initialised_governor(DAY);
        governor
            .schedule_contract_upgrade(
                &CallContext::new(admin, 0),
                ProgramHash::from_bytes([3u8; 32]),
                DAY,
            )
            .unwrap();

        let json = serde_json::to_string(&governor).unwrap();
        let back: UpgradeGovernor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, governor);
        assert_eq!(back.state(), governor.state());
    }
}
