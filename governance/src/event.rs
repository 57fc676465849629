//! Governance events

use tenure_codec::Event;

use crate::program::ProgramHash;

/// Emitted when a change to the minimum upgrade delay is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumUpgradeDelayChange {
    pub delay: u64,
    pub effective_at: u64,
}

impl Event for MinimumUpgradeDelayChange {
    const SIGNATURE: &'static str = "MinimumUpgradeDelayChange(uint64,uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(16);
        args.extend_from_slice(&self.delay.to_be_bytes());
        args.extend_from_slice(&self.effective_at.to_be_bytes());
        args
    }
}

/// Emitted when a contract upgrade is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeScheduled {
    pub program_hash: ProgramHash,
    pub effective_at: u64,
}

impl Event for UpgradeScheduled {
    const SIGNATURE: &'static str = "UpgradeScheduled(byte[32],uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(40);
        args.extend_from_slice(self.program_hash.as_bytes());
        args.extend_from_slice(&self.effective_at.to_be_bytes());
        args
    }
}

/// Emitted when a scheduled upgrade is cancelled, carrying the schedule that
/// was cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeCancelled {
    pub program_hash: ProgramHash,
    pub effective_at: u64,
}

impl Event for UpgradeCancelled {
    const SIGNATURE: &'static str = "UpgradeCancelled(byte[32],uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(40);
        args.extend_from_slice(self.program_hash.as_bytes());
        args.extend_from_slice(&self.effective_at.to_be_bytes());
        args
    }
}

/// Emitted when an upgrade completes, carrying the installed digest and the
/// new version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeCompleted {
    pub program_hash: ProgramHash,
    pub version: u64,
}

impl Event for UpgradeCompleted {
    const SIGNATURE: &'static str = "UpgradeCompleted(byte[32],uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(40);
        args.extend_from_slice(self.program_hash.as_bytes());
        args.extend_from_slice(&self.version.to_be_bytes());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PROGRAM_HASH_LEN;

    #[test]
    fn test_upgrade_scheduled_layout() {
        let event = UpgradeScheduled {
            program_hash: ProgramHash::from_bytes([9u8; PROGRAM_HASH_LEN]),
            effective_at: 0x0102,
        };
        let record = event.to_record();

        assert_eq!(record.data.len(), 4 + 32 + 8);
        assert_eq!(&record.args()[..32], event.program_hash.as_bytes());
        assert_eq!(&record.args()[32..], &0x0102u64.to_be_bytes());
    }

    #[test]
    fn test_delay_change_layout() {
        let event = MinimumUpgradeDelayChange {
            delay: 86_400,
            effective_at: 1_000_000,
        };
        let record = event.to_record();

        assert_eq!(record.data.len(), 4 + 8 + 8);
        assert_eq!(&record.args()[..8], &86_400u64.to_be_bytes());
        assert_eq!(&record.args()[8..], &1_000_000u64.to_be_bytes());
    }

    #[test]
    fn test_distinct_selectors() {
        let hash = ProgramHash::from_bytes([0u8; PROGRAM_HASH_LEN]);
        let scheduled = UpgradeScheduled { program_hash: hash, effective_at: 0 }.to_record();
        let cancelled = UpgradeCancelled { program_hash: hash, effective_at: 0 }.to_record();
        let completed = UpgradeCompleted { program_hash: hash, version: 0 }.to_record();

        assert_ne!(scheduled.selector(), cancelled.selector());
        assert_ne!(scheduled.selector(), completed.selector());
        assert_ne!(cancelled.selector(), completed.selector());
    }
}
