//! Tenure Byte Codec
//!
//! Fixed-width big-endian integer encoding with checked narrowing, plus the
//! event-selector hash used for append-only log records.

use sha2::{Digest, Sha512_256};
use thiserror::Error;

pub mod event;
pub mod set;

pub use event::{Event, EventRecord};
pub use set::U64Set;

/// Width of a 32-byte word
pub const WORD_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unsafe conversion: encoded value exceeds target range")]
    UnsafeConversion,

    #[error("Invalid encoding length: {0}")]
    InvalidEncodingLength(usize),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Encode a value as big-endian bytes, zero-padded to `width`.
///
/// Fails if the value does not fit in `width` bytes, or if `width` is zero
/// or larger than a 32-byte word.
pub fn encode_fixed(value: u64, width: usize) -> Result<Vec<u8>> {
    if width == 0 || width > WORD_LEN {
        return Err(CodecError::InvalidEncodingLength(width));
    }
    if width < 8 && value >> (width * 8) != 0 {
        return Err(CodecError::UnsafeConversion);
    }

    let mut out = vec![0u8; width];
    let be = value.to_be_bytes();
    let copied = width.min(8);
    out[width - copied..].copy_from_slice(&be[8 - copied..]);
    Ok(out)
}

/// Decode a big-endian buffer into a u64.
///
/// Fails if the buffer is empty or encodes a value outside the u64 range.
pub fn decode_checked(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > WORD_LEN {
        return Err(CodecError::InvalidEncodingLength(bytes.len()));
    }
    if bytes.len() > 8 && bytes[..bytes.len() - 8].iter().any(|&b| b != 0) {
        return Err(CodecError::UnsafeConversion);
    }

    let tail = &bytes[bytes.len().saturating_sub(8)..];
    let mut be = [0u8; 8];
    be[8 - tail.len()..].copy_from_slice(tail);
    Ok(u64::from_be_bytes(be))
}

/// Encode a u64 into a zero-padded 32-byte word
pub fn u64_to_bytes32(value: u64) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a 32-byte word into a u64, rejecting values that would not
/// round-trip
pub fn bytes32_to_u64_checked(word: &[u8; WORD_LEN]) -> Result<u64> {
    decode_checked(word)
}

/// First four bytes of SHA-512/256 over an event signature string.
///
/// Log records are prefixed with this selector so off-chain observers can
/// route them without parsing argument data.
pub fn event_selector(signature: &str) -> [u8; 4] {
    let digest = Sha512_256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fixed_pads_left() {
        let encoded = encode_fixed(0x0102, 4).unwrap();
        assert_eq!(encoded, vec![0, 0, 0x01, 0x02]);
    }

    #[test]
    fn test_encode_fixed_full_word() {
        let encoded = encode_fixed(1, WORD_LEN).unwrap();
        assert_eq!(encoded.len(), WORD_LEN);
        assert_eq!(encoded[WORD_LEN - 1], 1);
        assert!(encoded[..WORD_LEN - 1].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_fixed_overflow() {
        assert_eq!(encode_fixed(256, 1), Err(CodecError::UnsafeConversion));
        assert_eq!(
            encode_fixed(u64::MAX, 7),
            Err(CodecError::UnsafeConversion)
        );
        // exact fit is fine
        assert_eq!(encode_fixed(255, 1).unwrap(), vec![255]);
    }

    #[test]
    fn test_encode_fixed_bad_width() {
        assert_eq!(
            encode_fixed(0, 0),
            Err(CodecError::InvalidEncodingLength(0))
        );
        assert_eq!(
            encode_fixed(0, 33),
            Err(CodecError::InvalidEncodingLength(33))
        );
    }

    #[test]
    fn test_decode_checked_round_trip() {
        for value in [0u64, 1, 255, 256, u64::MAX - 1, u64::MAX] {
            let word = u64_to_bytes32(value);
            assert_eq!(bytes32_to_u64_checked(&word).unwrap(), value);
            assert_eq!(decode_checked(&encode_fixed(value, 8).unwrap()).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_checked_rejects_wide_values() {
        let mut word = u64_to_bytes32(42);
        word[WORD_LEN - 9] = 1;
        assert_eq!(
            bytes32_to_u64_checked(&word),
            Err(CodecError::UnsafeConversion)
        );
    }

    #[test]
    fn test_decode_checked_bad_length() {
        assert_eq!(
            decode_checked(&[]),
            Err(CodecError::InvalidEncodingLength(0))
        );
        assert_eq!(
            decode_checked(&[0u8; 40]),
            Err(CodecError::InvalidEncodingLength(40))
        );
    }

    #[test]
    fn test_decode_checked_short_buffer() {
        assert_eq!(decode_checked(&[0x01, 0x00]).unwrap(), 256);
    }

    #[test]
    fn test_event_selector_deterministic() {
        let a = event_selector("UpgradeScheduled(byte[32],uint64)");
        let b = event_selector("UpgradeScheduled(byte[32],uint64)");
        let c = event_selector("UpgradeCancelled(byte[32],uint64)");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
