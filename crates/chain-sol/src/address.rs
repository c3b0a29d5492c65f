//! Solana address and signature text encodings.
//!
//! Addresses are Base58-encoded 32-byte Ed25519 public keys (or off-curve
//! program-derived addresses). Transaction signatures travel over RPC as
//! Base58-encoded 64-byte Ed25519 signatures.

use crate::error::SolError;

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Parse a user-supplied address into its 32-byte form.
///
/// Surrounding whitespace is ignored. Anything that is not Base58, or does
/// not decode to exactly 32 bytes, is rejected.
pub fn parse_address(input: &str) -> Result<[u8; 32], SolError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SolError::InvalidAddress("address is empty".into()));
    }

    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Returns `true` when `input` parses as a Solana address.
pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}

/// Encode a 64-byte transaction or message signature as Base58.
pub fn signature_to_string(signature: &[u8; 64]) -> String {
    bs58::encode(signature).into_string()
}

/// Decode a Base58 transaction signature as returned by the RPC.
pub fn parse_signature(input: &str) -> Result<[u8; 64], SolError> {
    let bytes = bs58::decode(input.trim())
        .into_vec()
        .map_err(|e| SolError::InvalidSignature(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidSignature(format!("expected 64 bytes, got {}", v.len()))
    })
}
