//! Token-bucket rate limiting.
//!
//! Buckets refill linearly: a bucket regains its full limit over `duration`
//! seconds, capped at the limit. A zero duration disables limiting and keeps
//! the bucket full. All operations take an explicit `now`; nothing here
//! reads a clock.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use tenure_codec::Event;

use crate::error::{GovernanceError, RateLimitError};

/// Byte width of a bucket identifier
pub const BUCKET_ID_LEN: usize = 32;

/// Opaque 32-byte rate-limit bucket identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketId([u8; BUCKET_ID_LEN]);

impl BucketId {
    pub const fn from_bytes(bytes: [u8; BUCKET_ID_LEN]) -> Self {
        BucketId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BUCKET_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for BucketId {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| GovernanceError::InvalidIdentifier(e.to_string()))?;
        let bytes: [u8; BUCKET_ID_LEN] = bytes.try_into().map_err(|_| {
            GovernanceError::InvalidIdentifier(format!("bucket id must be {BUCKET_ID_LEN} bytes"))
        })?;
        Ok(BucketId(bytes))
    }
}

impl Serialize for BucketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BucketId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One rate-limit bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBucket {
    /// Maximum capacity
    pub limit: u128,
    /// Seconds for a full refill; zero disables limiting
    pub duration: u64,
    pub current_capacity: u128,
    pub last_updated: u64,
}

impl RateLimitBucket {
    /// Capacity at `now`, projecting the linear refill without mutating
    fn capacity_at(&self, now: u64) -> u128 {
        if self.duration == 0 {
            return self.limit;
        }
        let elapsed = now.saturating_sub(self.last_updated);
        let refill = self
            .limit
            .saturating_mul(elapsed as u128)
            / self.duration as u128;
        self.limit.min(self.current_capacity.saturating_add(refill))
    }
}

fn encode_u128_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Emitted when a bucket is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketAdded {
    pub bucket_id: BucketId,
    pub limit: u128,
    pub duration: u64,
}

impl Event for BucketAdded {
    const SIGNATURE: &'static str = "BucketAdded(byte[32],uint256,uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(72);
        args.extend_from_slice(self.bucket_id.as_bytes());
        args.extend_from_slice(&encode_u128_word(self.limit));
        args.extend_from_slice(&self.duration.to_be_bytes());
        args
    }
}

/// Emitted when a bucket is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRemoved {
    pub bucket_id: BucketId,
}

impl Event for BucketRemoved {
    const SIGNATURE: &'static str = "BucketRemoved(byte[32])";

    fn encode_args(&self) -> Vec<u8> {
        self.bucket_id.as_bytes().to_vec()
    }
}

/// Emitted when a bucket's limit changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRateLimitUpdated {
    pub bucket_id: BucketId,
    pub limit: u128,
}

impl Event for BucketRateLimitUpdated {
    const SIGNATURE: &'static str = "BucketRateLimitUpdated(byte[32],uint256)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(64);
        args.extend_from_slice(self.bucket_id.as_bytes());
        args.extend_from_slice(&encode_u128_word(self.limit));
        args
    }
}

/// Emitted when a bucket's refill duration changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRateDurationUpdated {
    pub bucket_id: BucketId,
    pub duration: u64,
}

impl Event for BucketRateDurationUpdated {
    const SIGNATURE: &'static str = "BucketRateDurationUpdated(byte[32],uint64)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(40);
        args.extend_from_slice(self.bucket_id.as_bytes());
        args.extend_from_slice(&self.duration.to_be_bytes());
        args
    }
}

/// Emitted when capacity is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketConsumed {
    pub bucket_id: BucketId,
    pub amount: u128,
}

impl Event for BucketConsumed {
    const SIGNATURE: &'static str = "BucketConsumed(byte[32],uint256)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(64);
        args.extend_from_slice(self.bucket_id.as_bytes());
        args.extend_from_slice(&encode_u128_word(self.amount));
        args
    }
}

/// Emitted when capacity is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketFilled {
    pub bucket_id: BucketId,
    pub amount: u128,
}

impl Event for BucketFilled {
    const SIGNATURE: &'static str = "BucketFilled(byte[32],uint256)";

    fn encode_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(64);
        args.extend_from_slice(self.bucket_id.as_bytes());
        args.extend_from_slice(&encode_u128_word(self.amount));
        args
    }
}

/// A collection of independently configured rate-limit buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiter {
    buckets: HashMap<BucketId, RateLimitBucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bucket, starting at full capacity.
    ///
    /// Re-adding an existing id replaces it, resetting its capacity.
    pub fn add_bucket(
        &mut self,
        bucket_id: BucketId,
        limit: u128,
        duration: u64,
        now: u64,
    ) -> BucketAdded {
        self.buckets.insert(
            bucket_id,
            RateLimitBucket {
                limit,
                duration,
                current_capacity: limit,
                last_updated: now,
            },
        );
        BucketAdded {
            bucket_id,
            limit,
            duration,
        }
    }

    pub fn remove_bucket(
        &mut self,
        bucket_id: &BucketId,
    ) -> Result<BucketRemoved, RateLimitError> {
        self.buckets
            .remove(bucket_id)
            .ok_or(RateLimitError::UnknownBucket)?;
        Ok(BucketRemoved {
            bucket_id: *bucket_id,
        })
    }

    /// Change a bucket's limit.
    ///
    /// Raising the limit grows current capacity by the difference; lowering
    /// it clamps capacity to the new limit.
    pub fn update_rate_limit(
        &mut self,
        bucket_id: &BucketId,
        new_limit: u128,
        now: u64,
    ) -> Result<BucketRateLimitUpdated, RateLimitError> {
        let bucket = self.bucket_mut(bucket_id)?;
        // settle the refill under the old limit before applying the new one
        let settled = bucket.capacity_at(now);

        bucket.current_capacity = if new_limit > bucket.limit {
            settled.saturating_add(new_limit - bucket.limit)
        } else {
            settled.min(new_limit)
        };
        bucket.limit = new_limit;
        bucket.last_updated = now;

        Ok(BucketRateLimitUpdated {
            bucket_id: *bucket_id,
            limit: new_limit,
        })
    }

    pub fn update_rate_duration(
        &mut self,
        bucket_id: &BucketId,
        new_duration: u64,
        now: u64,
    ) -> Result<BucketRateDurationUpdated, RateLimitError> {
        let bucket = self.bucket_mut(bucket_id)?;
        // bank the refill accrued under the old duration
        bucket.current_capacity = bucket.capacity_at(now);
        bucket.last_updated = now;
        bucket.duration = new_duration;

        Ok(BucketRateDurationUpdated {
            bucket_id: *bucket_id,
            duration: new_duration,
        })
    }

    /// Consume capacity, failing when not enough has refilled.
    ///
    /// A failed consume leaves the bucket untouched.
    pub fn consume_amount(
        &mut self,
        bucket_id: &BucketId,
        amount: u128,
        now: u64,
    ) -> Result<BucketConsumed, RateLimitError> {
        let bucket = self.bucket_mut(bucket_id)?;
        let capacity = bucket.capacity_at(now);

        if capacity < amount {
            return Err(RateLimitError::InsufficientCapacity);
        }
        bucket.current_capacity = capacity - amount;
        bucket.last_updated = now;

        Ok(BucketConsumed {
            bucket_id: *bucket_id,
            amount,
        })
    }

    /// Return capacity to a bucket, saturating at its limit
    pub fn fill_amount(
        &mut self,
        bucket_id: &BucketId,
        amount: u128,
        now: u64,
    ) -> Result<BucketFilled, RateLimitError> {
        let bucket = self.bucket_mut(bucket_id)?;
        bucket.current_capacity = bucket
            .limit
            .min(bucket.capacity_at(now).saturating_add(amount));
        bucket.last_updated = now;

        Ok(BucketFilled {
            bucket_id: *bucket_id,
            amount,
        })
    }

    /// Apply the linear refill up to `now`
    pub fn update_capacity(
        &mut self,
        bucket_id: &BucketId,
        now: u64,
    ) -> Result<(), RateLimitError> {
        let bucket = self.bucket_mut(bucket_id)?;
        bucket.current_capacity = bucket.capacity_at(now);
        bucket.last_updated = now;
        Ok(())
    }

    /// Capacity at `now`, without mutating the bucket
    pub fn get_current_capacity(
        &self,
        bucket_id: &BucketId,
        now: u64,
    ) -> Result<u128, RateLimitError> {
        Ok(self.get_bucket(bucket_id)?.capacity_at(now))
    }

    pub fn has_capacity(
        &self,
        bucket_id: &BucketId,
        amount: u128,
        now: u64,
    ) -> Result<bool, RateLimitError> {
        Ok(self.get_current_capacity(bucket_id, now)? >= amount)
    }

    pub fn get_bucket(&self, bucket_id: &BucketId) -> Result<&RateLimitBucket, RateLimitError> {
        self.buckets
            .get(bucket_id)
            .ok_or(RateLimitError::UnknownBucket)
    }

    fn bucket_mut(
        &mut self,
        bucket_id: &BucketId,
    ) -> Result<&mut RateLimitBucket, RateLimitError> {
        self.buckets
            .get_mut(bucket_id)
            .ok_or(RateLimitError::UnknownBucket)
    }
}
