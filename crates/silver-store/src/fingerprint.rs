//! Content fingerprints of Source Table lines.
//!
//! The canonical input is the line text with its terminator and surrounding
//! whitespace removed, exactly as read from the Source Table. Fields are never
//! re-joined, so reordering or dropping trailing fields yields a different
//! fingerprint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of a fingerprint in bytes (128 bits).
pub const FINGERPRINT_BYTES: usize = 16;

/// First 128 bits of the SHA-256 of a canonical line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint([u8; FINGERPRINT_BYTES]);

impl Fingerprint {
    /// Fingerprint a Source Table line.
    pub fn of_line(line: &str) -> Self {
        let digest = Sha256::digest(canonical_line(line).as_bytes());
        let mut bytes = [0u8; FINGERPRINT_BYTES];
        bytes.copy_from_slice(&digest[..FINGERPRINT_BYTES]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Canonical representation hashed for a line.
pub fn canonical_line(line: &str) -> &str {
    line.trim()
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s.trim()).map_err(|e| format!("invalid fingerprint '{s}': {e}"))?;
        let bytes: [u8; FINGERPRINT_BYTES] = decoded
            .try_into()
            .map_err(|_| format!("invalid fingerprint '{s}': expected {FINGERPRINT_BYTES} bytes"))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_hex()
    }
}
