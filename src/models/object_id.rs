use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const OBJECT_ID_BYTES: usize = 12;
const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_BYTES * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Random bytes fixed for the lifetime of the process.
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| rand::thread_rng().gen());

static COUNTER: Lazy<AtomicU32> =
    Lazy::new(|| AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK)));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("identifier must be {OBJECT_ID_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    #[error("identifier contains non-hex characters")]
    InvalidHex,
}

/// Opaque 12-byte record identifier, rendered as 24 lowercase hex characters.
///
/// Layout: 4 bytes of big-endian Unix seconds, 5 bytes of per-process
/// random data, 3 bytes of a counter seeded at random. Two calls to
/// [`ObjectId::new`] in one process never return the same value unless the
/// counter wraps within a single second.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

/// Identifier of a user account.
pub type UserId = ObjectId;

/// Identifier of a workout record.
pub type WorkoutId = ObjectId;

impl ObjectId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(bytes)
    }

    /// Parse the 24-character hex form. Either letter case is accepted.
    pub fn parse_str(input: &str) -> Result<Self, ObjectIdError> {
        if input.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError::InvalidLength(input.len()));
        }

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        hex::decode_to_slice(input, &mut bytes).map_err(|_| ObjectIdError::InvalidHex)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<ObjectId> = (0..10_000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_hex_form_parses_back() {
        let id = ObjectId::new();
        let hex = id.to_hex();

        assert_eq!(hex.len(), 24);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(ObjectId::parse_str(&hex).unwrap(), id);
        assert_eq!(ObjectId::parse_str(&hex.to_uppercase()).unwrap(), id);
    }

    #[test]
    fn test_malformed_ids_are_rejected() {
        assert_eq!(
            ObjectId::parse_str("123"),
            Err(ObjectIdError::InvalidLength(3))
        );
        assert_eq!(
            ObjectId::parse_str("zzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(ObjectIdError::InvalidHex)
        );
        assert!(ObjectId::parse_str("").is_err());
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = ObjectId::parse_str("65f0c2a1e4b0a1b2c3d4e5f6").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65f0c2a1e4b0a1b2c3d4e5f6\"");

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ObjectId>("\"not-an-id\"").is_err());
    }
}
