//! Content hashes used to address generated scripts.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::options::PagelessConfig;
use super::routing::RoutingContext;

const HASH_BYTES: usize = 16;

/// 128-bit digest rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigHash([u8; HASH_BYTES]);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`{0}` is not a 32 character hex digest")]
pub struct InvalidHash(pub String);

#[derive(Serialize)]
struct HashInput<'a> {
    config: &'a PagelessConfig,
    context: &'a RoutingContext,
}

impl ConfigHash {
    /// Hash a configuration merged with the routing context of a listing.
    pub fn compute(config: &PagelessConfig, context: &RoutingContext) -> Self {
        let input = HashInput { config, context };
        // Serializing plain structs and enums into a Vec cannot fail.
        let bytes = serde_json::to_vec(&input).unwrap_or_default();
        Self(truncated_digest(&bytes))
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(truncated_digest(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn truncated_digest(bytes: &[u8]) -> [u8; HASH_BYTES] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize().to_vec();
    let mut out = [0u8; HASH_BYTES];
    out.copy_from_slice(&digest[..HASH_BYTES]);
    out
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ConfigHash {
    type Err = InvalidHash;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != HASH_BYTES * 2 {
            return Err(InvalidHash(value.to_string()));
        }
        let decoded = hex::decode(value).map_err(|_| InvalidHash(value.to_string()))?;
        let mut out = [0u8; HASH_BYTES];
        out.copy_from_slice(&decoded);
        Ok(Self(out))
    }
}

/// File name of the generated script for a hash, e.g. `jquery.pageless_<hex>.js`.
pub fn script_file_name(hash: &ConfigHash) -> String {
    format!("{SCRIPT_FILE_PREFIX}{hash}{SCRIPT_FILE_SUFFIX}")
}

pub const SCRIPT_FILE_PREFIX: &str = "jquery.pageless_";
pub const SCRIPT_FILE_SUFFIX: &str = ".js";

/// Extract the hash from a requested script file name.
pub fn parse_script_file_name(file: &str) -> Result<ConfigHash, InvalidHash> {
    file.strip_prefix(SCRIPT_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(SCRIPT_FILE_SUFFIX))
        .ok_or_else(|| InvalidHash(file.to_string()))?
        .parse()
}
