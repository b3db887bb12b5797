//! Algorand address encoding and decoding
//!
//! An address is the base32 (RFC 4648, no padding) encoding of a 32-byte
//! Ed25519 public key followed by a 4-byte checksum: the last four bytes of
//! the SHA-512/256 digest of the public key.

use crate::error::WasmAlgoError;
use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};

/// Encoded address length in characters
pub const ADDRESS_LENGTH: usize = 58;

const PUBLIC_KEY_LENGTH: usize = 32;
const CHECKSUM_LENGTH: usize = 4;

/// Encode a public key as an Algorand address
pub fn encode_address(public_key: &[u8]) -> Result<String, WasmAlgoError> {
    if public_key.len() != PUBLIC_KEY_LENGTH {
        return Err(WasmAlgoError::InvalidInput(format!(
            "Public key must be 32 bytes, got {}",
            public_key.len()
        )));
    }

    let mut payload = public_key.to_vec();
    payload.extend_from_slice(&checksum(public_key));
    Ok(BASE32_NOPAD.encode(&payload))
}

/// Decode an Algorand address to its public key
pub fn decode_address(address: &str) -> Result<[u8; 32], WasmAlgoError> {
    if address.len() != ADDRESS_LENGTH {
        return Err(WasmAlgoError::InvalidInput(format!(
            "Address must be {} characters, got {}",
            ADDRESS_LENGTH,
            address.len()
        )));
    }

    let decoded = BASE32_NOPAD
        .decode(address.as_bytes())
        .map_err(|e| WasmAlgoError::InvalidInput(format!("Invalid base32: {}", e)))?;

    if decoded.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
        return Err(WasmAlgoError::InvalidInput(format!(
            "Invalid decoded address length: {}",
            decoded.len()
        )));
    }

    let (public_key, expected) = decoded.split_at(PUBLIC_KEY_LENGTH);
    if checksum(public_key) != expected {
        return Err(WasmAlgoError::InvalidInput("Invalid checksum".to_string()));
    }

    let mut key = [0u8; PUBLIC_KEY_LENGTH];
    key.copy_from_slice(public_key);
    Ok(key)
}

/// Validate an Algorand address
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

fn checksum(public_key: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
    out
}
