//! Program content and its deterministic digest.
//!
//! Executable content is modelled as labelled segments of pages. The digest
//! commits to segment order, segment labels, and every page, so replacing a
//! single byte anywhere produces a different hash.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::GovernanceError;

/// Byte width of a program content digest
pub const PROGRAM_HASH_LEN: usize = 32;

/// SHA-256 fingerprint of the full executable content being installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHash([u8; PROGRAM_HASH_LEN]);

impl ProgramHash {
    pub const fn from_bytes(bytes: [u8; PROGRAM_HASH_LEN]) -> Self {
        ProgramHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PROGRAM_HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for ProgramHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ProgramHash {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| GovernanceError::InvalidIdentifier(e.to_string()))?;
        let bytes: [u8; PROGRAM_HASH_LEN] = bytes.try_into().map_err(|_| {
            GovernanceError::InvalidIdentifier(format!(
                "program hash must be {PROGRAM_HASH_LEN} bytes"
            ))
        })?;
        Ok(ProgramHash(bytes))
    }
}

impl Serialize for ProgramHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProgramHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One labelled section of executable content, split into pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSegment {
    pub label: String,
    pub pages: Vec<Vec<u8>>,
}

impl ProgramSegment {
    pub fn new(label: impl Into<String>, pages: Vec<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            pages,
        }
    }
}

/// The full executable content being installed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramContent {
    pub segments: Vec<ProgramSegment>,
}

impl ProgramContent {
    pub fn new(segments: Vec<ProgramSegment>) -> Self {
        Self { segments }
    }

    /// Content digest: SHA-256 over each segment's label followed by the
    /// SHA-256 of each of its pages, in order.
    pub fn digest(&self) -> ProgramHash {
        let mut hasher = Sha256::new();
        for segment in &self.segments {
            hasher.update(segment.label.as_bytes());
            for page in &segment.pages {
                hasher.update(Sha256::digest(page));
            }
        }
        ProgramHash(hasher.finalize().into())
    }
}
