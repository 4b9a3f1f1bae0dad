//! Worker identity and enclave measurement types

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Size of an enclave measurement in bytes
pub const MEASUREMENT_SIZE: usize = 32;

/// Helper module for serializing/deserializing [u8; 32] as hex
mod bytes32 {
    use super::*;

    pub fn serialize<S>(data: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Bytes32Visitor;

        impl<'de> Visitor<'de> for Bytes32Visitor {
            type Value = [u8; 32];

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex string of 32 bytes")
            }

            fn visit_str<E>(self, v: &str) -> Result<[u8; 32], E>
            where
                E: de::Error,
            {
                let bytes = hex::decode(v).map_err(de::Error::custom)?;
                if bytes.len() != 32 {
                    return Err(de::Error::custom(format!(
                        "expected 32 bytes, got {}",
                        bytes.len()
                    )));
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(arr)
            }
        }

        deserializer.deserialize_str(Bytes32Visitor)
    }
}

/// Deterministic worker identity derived from the logical enclave id.
///
/// The identity is the SHA-256 digest of the UTF-8 enclave id, exposed as a
/// 64-character lowercase hex string. It is derived exactly once at manager
/// construction and never recomputed mid-lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnclaveIdentity(String);

impl EnclaveIdentity {
    /// Derive the identity digest from a logical enclave identifier.
    pub fn derive(enclave_id: &str) -> Self {
        let digest = Sha256::digest(enclave_id.as_bytes());
        Self(hex::encode(digest))
    }

    /// The hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnclaveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enclave binary identity: a base name and the code measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMeasurement {
    /// Base name of the enclave binary
    pub base_name: String,
    /// Code measurement identifying the exact enclave binary
    #[serde(with = "bytes32")]
    pub measurement: [u8; 32],
}

impl ExtendedMeasurement {
    /// Create a measurement record.
    pub fn new(base_name: impl Into<String>, measurement: [u8; 32]) -> Self {
        Self {
            base_name: base_name.into(),
            measurement,
        }
    }

    /// The measurement as a lowercase hex string.
    pub fn measurement_hex(&self) -> String {
        hex::encode(self.measurement)
    }
}
