//! Hex helpers for display and CLI layers. Hashing and validation never go
//! through here.

use crate::block::Hash;
use crate::config::HASH_SIZE;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HexError {
    #[error("invalid hex string: {0}")]
    Decode(#[from] hex::FromHexError),
    #[error("expected {expected} bytes, got {got}")]
    Length { expected: usize, got: usize },
}

pub fn bytes_to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, HexError> {
    Ok(hex::decode(s)?)
}

/// Decode a 32-byte digest, with or without a `0x` prefix.
pub fn hex_to_hash(s: &str) -> Result<Hash, HexError> {
    let normalized = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex_to_bytes(normalized)?;
    if bytes.len() != HASH_SIZE {
        return Err(HexError::Length {
            expected: HASH_SIZE,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&bytes);
    Ok(out)
}
