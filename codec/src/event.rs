//! Append-only log records.
//!
//! Every emitted event is encoded as a 4-byte signature selector followed by
//! the big-endian fixed-width argument values. The byte layout is consumed by
//! off-chain observers and must stay stable across versions.

use serde::{Deserialize, Serialize};

use crate::event_selector;

/// A typed event that can be rendered into a log record
pub trait Event {
    /// Canonical signature, e.g. `UpgradeScheduled(byte[32],uint64)`
    const SIGNATURE: &'static str;

    /// Concatenated big-endian fixed-width argument encoding
    fn encode_args(&self) -> Vec<u8>;

    fn to_record(&self) -> EventRecord {
        let args = self.encode_args();
        let mut data = Vec::with_capacity(4 + args.len());
        data.extend_from_slice(&event_selector(Self::SIGNATURE));
        data.extend_from_slice(&args);
        EventRecord {
            signature: Self::SIGNATURE.to_string(),
            data,
        }
    }
}

/// A single entry in the append-only event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub signature: String,
    pub data: Vec<u8>,
}

impl EventRecord {
    /// Selector prefix of the encoded record
    pub fn selector(&self) -> &[u8] {
        &self.data[..4]
    }

    /// Argument bytes following the selector
    pub fn args(&self) -> &[u8] {
        &self.data[4..]
    }
}
