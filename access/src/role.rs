//! Role and account identifiers

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::AccessError;

/// Byte width of a role identifier
pub const ROLE_LEN: usize = 16;

/// Byte width of an account address
pub const ADDRESS_LEN: usize = 32;

/// Opaque 16-byte capability identifier.
///
/// Well-known roles are derived from a name string; the all-zero role is the
/// default admin role which administers every role without an explicit admin
/// mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role([u8; ROLE_LEN]);

impl Role {
    /// The all-zero default admin role
    pub const DEFAULT_ADMIN: Role = Role([0u8; ROLE_LEN]);

    /// Derive a role identifier from a name string.
    ///
    /// Takes the first 16 bytes of `Keccak256(name)`, so role identifiers are
    /// stable across deployments of the same program.
    pub fn from_name(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        let mut bytes = [0u8; ROLE_LEN];
        bytes.copy_from_slice(&digest[..ROLE_LEN]);
        Role(bytes)
    }

    pub const fn from_bytes(bytes: [u8; ROLE_LEN]) -> Self {
        Role(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ROLE_LEN] {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| AccessError::InvalidIdentifier(e.to_string()))?;
        let bytes: [u8; ROLE_LEN] = bytes.try_into().map_err(|_| {
            AccessError::InvalidIdentifier(format!("role must be {ROLE_LEN} bytes"))
        })?;
        Ok(Role(bytes))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Opaque 32-byte account identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| AccessError::InvalidIdentifier(e.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            AccessError::InvalidIdentifier(format!("address must be {ADDRESS_LEN} bytes"))
        })?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_admin_is_zero() {
        assert_eq!(Role::DEFAULT_ADMIN.as_bytes(), &[0u8; ROLE_LEN]);
    }

    #[test]
    fn test_from_name_deterministic() {
        let a = Role::from_name("UPGRADEABLE_ADMIN");
        let b = Role::from_name("UPGRADEABLE_ADMIN");
        let c = Role::from_name("TREASURER");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Role::DEFAULT_ADMIN);
    }

    #[test]
    fn test_role_hex_round_trip() {
        let role = Role::from_name("UPGRADEABLE_ADMIN");
        let parsed: Role = role.to_string().parse().unwrap();
        assert_eq!(parsed, role);
    }

    #[test]
    fn test_role_parse_rejects_bad_input() {
        assert!("zz".parse::<Role>().is_err());
        assert!("0011".parse::<Role>().is_err()); // too short
    }

    #[test]
    fn test_address_round_trip() {
        let address = Address::from_bytes([7u8; ADDRESS_LEN]);
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let role = Role::from_name("UPGRADEABLE_ADMIN");
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, format!("\"{role}\""));

        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }
}
