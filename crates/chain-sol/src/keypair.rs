//! Ed25519 keypairs for wallets and freshly generated mint accounts.

use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// An Ed25519 keypair. The secret half is zeroized on drop by `ed25519-dalek`.
pub struct SolKeypair {
    signing_key: SigningKey,
}

impl SolKeypair {
    /// Generate a new random keypair from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut copy = *seed;
        let signing_key = SigningKey::from_bytes(&copy);
        copy.zeroize();
        Self { signing_key }
    }

    /// Build a keypair from the 64-byte `secret || public` layout used by
    /// Solana CLI keypair files. The public half must match the secret half.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut arr: [u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidKeypair(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        let result = SigningKey::from_keypair_bytes(&arr)
            .map_err(|e| SolError::InvalidKeypair(e.to_string()));
        arr.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }

    /// The 32-byte public key.
    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    /// Sign arbitrary bytes, returning the 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for SolKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolKeypair")
            .field("pubkey", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, VerifyingKey};

    #[test]
    fn generated_keypairs_differ() {
        let a = SolKeypair::generate();
        let b = SolKeypair::generate();
        assert_ne!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn from_seed_is_deterministic() {
        let a = SolKeypair::from_seed(&[0x42; 32]);
        let b = SolKeypair::from_seed(&[0x42; 32]);
        assert_eq!(a.pubkey(), b.pubkey());
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn keypair_bytes_roundtrip() {
        let original = SolKeypair::from_seed(&[7u8; 32]);
        let mut bytes = vec![7u8; 32];
        bytes.extend_from_slice(&original.pubkey());

        let loaded = SolKeypair::from_keypair_bytes(&bytes).unwrap();
        assert_eq!(loaded.pubkey(), original.pubkey());
    }

    #[test]
    fn keypair_bytes_with_mismatched_public_half_fail() {
        let mut bytes = vec![7u8; 32];
        bytes.extend_from_slice(&[9u8; 32]);
        assert!(SolKeypair::from_keypair_bytes(&bytes).is_err());
    }

    #[test]
    fn keypair_bytes_wrong_length_fail() {
        let err = SolKeypair::from_keypair_bytes(&[1u8; 32]).unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes, got 32"));
    }

    #[test]
    fn signature_verifies_against_pubkey() {
        let keypair = SolKeypair::from_seed(&[0x11; 32]);
        let sig = keypair.sign(b"hello launchpad");

        let vk = VerifyingKey::from_bytes(&keypair.pubkey()).unwrap();
        assert!(vk
            .verify_strict(b"hello launchpad", &Signature::from_bytes(&sig))
            .is_ok());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let keypair = SolKeypair::from_seed(&[0x11; 32]);
        let debug = format!("{keypair:?}");
        assert!(debug.contains(&keypair.address()));
        assert!(!debug.contains("signing_key"));
    }
}
