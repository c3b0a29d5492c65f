//! Wallet adapters.
//!
//! The launchpad never holds a user's secret key directly: it asks a
//! [`WalletAdapter`] for the public key, for signatures over arbitrary bytes,
//! and to sign-and-submit transactions the launchpad has already partially
//! signed with ephemeral keys (the fresh mint account).

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chain_sol::{SolKeypair, SolTransaction};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::connection::ChainConnection;
use crate::error::LaunchpadError;
use crate::types::WalletSession;

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// `None` while disconnected.
    fn public_key(&self) -> Option<[u8; 32]>;

    fn connected(&self) -> bool {
        self.public_key().is_some()
    }

    fn supports_message_signing(&self) -> bool;

    async fn connect(&self) -> Result<(), LaunchpadError>;

    async fn disconnect(&self) -> Result<(), LaunchpadError>;

    /// Add the wallet's signature to `transaction` and submit it.
    ///
    /// Signatures already present (co-signers) are preserved. Returns the
    /// transaction signature reported by the cluster.
    async fn send_transaction(
        &self,
        transaction: SolTransaction,
        connection: &dyn ChainConnection,
    ) -> Result<String, LaunchpadError>;

    /// Ed25519 signature over raw message bytes.
    async fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], LaunchpadError>;

    fn session(&self) -> WalletSession {
        WalletSession {
            public_key: self.public_key(),
            connected: self.connected(),
            can_sign_messages: self.supports_message_signing(),
        }
    }
}

/// A wallet backed by a keypair held in process memory.
pub struct LocalWallet {
    keypair: SolKeypair,
    connected: AtomicBool,
}

impl LocalWallet {
    /// Starts disconnected.
    pub fn new(keypair: SolKeypair) -> Self {
        Self {
            keypair,
            connected: AtomicBool::new(false),
        }
    }

    /// Load a Solana CLI keypair file (a JSON array of 64 bytes).
    pub fn from_keypair_file(path: &Path) -> Result<Self, LaunchpadError> {
        let keypair = read_keypair_file(path)?;
        info!(address = %keypair.address(), path = %path.display(), "loaded keypair");
        Ok(Self::new(keypair))
    }

    pub fn address(&self) -> String {
        self.keypair.address()
    }

    fn require_connected(&self) -> Result<(), LaunchpadError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(LaunchpadError::WalletNotConnected)
        }
    }
}

#[async_trait]
impl WalletAdapter for LocalWallet {
    fn name(&self) -> &str {
        "Local keypair"
    }

    fn public_key(&self) -> Option<[u8; 32]> {
        self.connected
            .load(Ordering::Acquire)
            .then(|| self.keypair.pubkey())
    }

    fn supports_message_signing(&self) -> bool {
        true
    }

    async fn connect(&self) -> Result<(), LaunchpadError> {
        self.connected.store(true, Ordering::Release);
        debug!(address = %self.keypair.address(), "wallet connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LaunchpadError> {
        self.connected.store(false, Ordering::Release);
        debug!("wallet disconnected");
        Ok(())
    }

    async fn send_transaction(
        &self,
        mut transaction: SolTransaction,
        connection: &dyn ChainConnection,
    ) -> Result<String, LaunchpadError> {
        self.require_connected()?;
        transaction.partial_sign(&self.keypair)?;

        let missing = transaction.missing_signers();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(chain_sol::bytes_to_address).collect();
            return Err(LaunchpadError::Wallet(format!(
                "transaction is missing signatures from {}",
                names.join(", ")
            )));
        }

        let wire = transaction.serialize()?;
        debug!(bytes = wire.len(), "submitting transaction");
        connection.send_raw_transaction(&wire).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], LaunchpadError> {
        self.require_connected()?;
        Ok(self.keypair.sign(message))
    }
}

/// Parse a Solana CLI keypair file.
pub fn read_keypair_file(path: &Path) -> Result<SolKeypair, LaunchpadError> {
    let mut text = std::fs::read_to_string(path)
        .map_err(|e| LaunchpadError::Wallet(format!("cannot read {}: {e}", path.display())))?;
    let parsed = parse_keypair_json(&text);
    text.zeroize();
    parsed
}

pub fn parse_keypair_json(text: &str) -> Result<SolKeypair, LaunchpadError> {
    let mut bytes: Vec<u8> = serde_json::from_str(text)
        .map_err(|e| LaunchpadError::Wallet(format!("keypair file is not a JSON byte array: {e}")))?;
    let keypair = SolKeypair::from_keypair_bytes(&bytes);
    bytes.zeroize();
    Ok(keypair?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn keypair_json(seed: u8) -> String {
        let kp = SolKeypair::from_seed(&[seed; 32]);
        let mut bytes = vec![seed; 32];
        bytes.extend_from_slice(&kp.pubkey());
        serde_json::to_string(&bytes).unwrap()
    }

    #[test]
    fn parses_cli_keypair_json() {
        let kp = parse_keypair_json(&keypair_json(7)).unwrap();
        assert_eq!(kp.pubkey(), SolKeypair::from_seed(&[7u8; 32]).pubkey());
    }

    #[test]
    fn rejects_malformed_keypair_json() {
        assert!(parse_keypair_json("not json").is_err());
        assert!(parse_keypair_json("[1, 2, 3]").is_err());
        // Public half does not match the secret half.
        let bad = serde_json::to_string(&vec![1u8; 64]).unwrap();
        assert!(parse_keypair_json(&bad).is_err());
    }

    #[test]
    fn missing_keypair_file() {
        let err = read_keypair_file(Path::new("/nonexistent/id.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/id.json"));
    }

    #[tokio::test]
    async fn public_key_hidden_until_connected() {
        let wallet = LocalWallet::new(SolKeypair::from_seed(&[3u8; 32]));
        assert!(wallet.public_key().is_none());
        assert!(!wallet.connected());

        wallet.connect().await.unwrap();
        assert_eq!(
            wallet.public_key(),
            Some(SolKeypair::from_seed(&[3u8; 32]).pubkey())
        );
        assert!(wallet.session().connected);

        wallet.disconnect().await.unwrap();
        assert!(wallet.session().public_key.is_none());
    }

    #[tokio::test]
    async fn sign_message_requires_connection() {
        let wallet = LocalWallet::new(SolKeypair::from_seed(&[4u8; 32]));
        assert!(matches!(
            wallet.sign_message(b"hi").await,
            Err(LaunchpadError::WalletNotConnected)
        ));

        wallet.connect().await.unwrap();
        let sig = wallet.sign_message(b"hi").await.unwrap();
        let vk = VerifyingKey::from_bytes(&wallet.public_key().unwrap()).unwrap();
        assert!(vk.verify(b"hi", &Signature::from_bytes(&sig)).is_ok());
    }
}
