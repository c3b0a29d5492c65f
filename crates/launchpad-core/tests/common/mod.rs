//! In-memory stand-ins for the cluster and the wallet.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::{bytes_to_address, signature_to_string, SolKeypair, SolTransaction};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use launchpad_core::*;
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub const BLOCKHASH: [u8; 32] = [42u8; 32];

/// Records every call and answers from canned values.
#[derive(Default)]
pub struct FakeChain {
    pub balance: AtomicU64,
    /// 1-based submission that should be rejected.
    pub fail_submission: Mutex<Option<usize>>,
    /// 1-based confirmation that should time out.
    pub fail_confirmation: Mutex<Option<usize>>,
    pub fail_airdrop: AtomicBool,
    pub submissions: Mutex<Vec<Vec<u8>>>,
    pub submit_attempts: AtomicUsize,
    pub rent_queries: Mutex<Vec<usize>>,
    pub blockhash_requests: AtomicUsize,
    pub confirm_attempts: AtomicUsize,
    pub confirmed: Mutex<Vec<String>>,
    pub airdrops: Mutex<Vec<([u8; 32], u64)>>,
}

impl FakeChain {
    pub fn with_balance(lamports: u64) -> Arc<Self> {
        let chain = Self::default();
        chain.balance.store(lamports, Ordering::SeqCst);
        Arc::new(chain)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn submission(&self, index: usize) -> DecodedTransaction {
        DecodedTransaction::parse(&self.submissions.lock()[index])
    }
}

#[async_trait]
impl ChainConnection for FakeChain {
    async fn get_balance(&self, _address: &[u8; 32]) -> Result<u64, LaunchpadError> {
        Ok(self.balance.load(Ordering::SeqCst))
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], LaunchpadError> {
        self.blockhash_requests.fetch_add(1, Ordering::SeqCst);
        Ok(BLOCKHASH)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LaunchpadError> {
        tokio::task::yield_now().await;
        self.rent_queries.lock().push(data_len);
        Ok(6960 * (data_len as u64 + 128))
    }

    async fn request_airdrop(
        &self,
        address: &[u8; 32],
        lamports: u64,
    ) -> Result<String, LaunchpadError> {
        tokio::task::yield_now().await;
        if self.fail_airdrop.load(Ordering::SeqCst) {
            return Err(LaunchpadError::Rpc {
                code: 429,
                message: "Too many requests for a specific RPC call".into(),
            });
        }
        self.airdrops.lock().push((*address, lamports));
        self.balance.fetch_add(lamports, Ordering::SeqCst);
        Ok("airdrop-signature".into())
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, LaunchpadError> {
        let attempt = self.submit_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_submission.lock() == Some(attempt) {
            return Err(LaunchpadError::Rpc {
                code: -32002,
                message: "Transaction simulation failed".into(),
            });
        }
        self.submissions.lock().push(wire.to_vec());
        let first_signature: [u8; 64] = wire[1..65].try_into().unwrap();
        Ok(signature_to_string(&first_signature))
    }

    async fn confirm_transaction(&self, signature: &str) -> Result<(), LaunchpadError> {
        let attempt = self.confirm_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_confirmation.lock() == Some(attempt) {
            return Err(LaunchpadError::ConfirmationTimeout(signature.to_string()));
        }
        self.confirmed.lock().push(signature.to_string());
        Ok(())
    }
}

/// A wallet that can send but cannot sign messages.
pub struct SendOnlyWallet(pub LocalWallet);

#[async_trait]
impl WalletAdapter for SendOnlyWallet {
    fn name(&self) -> &str {
        "Send-only"
    }

    fn public_key(&self) -> Option<[u8; 32]> {
        self.0.public_key()
    }

    fn supports_message_signing(&self) -> bool {
        false
    }

    async fn connect(&self) -> Result<(), LaunchpadError> {
        self.0.connect().await
    }

    async fn disconnect(&self) -> Result<(), LaunchpadError> {
        self.0.disconnect().await
    }

    async fn send_transaction(
        &self,
        transaction: SolTransaction,
        connection: &dyn ChainConnection,
    ) -> Result<String, LaunchpadError> {
        self.0.send_transaction(transaction, connection).await
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<[u8; 64], LaunchpadError> {
        Err(LaunchpadError::MessageSigningUnsupported)
    }
}

/// Wire transaction split into its parts.
pub struct DecodedTransaction {
    pub signatures: Vec<[u8; 64]>,
    pub message: Vec<u8>,
    pub num_required_signatures: usize,
    pub account_keys: Vec<[u8; 32]>,
    pub recent_blockhash: [u8; 32],
}

impl DecodedTransaction {
    /// Only handles the single-byte compact lengths these tests produce.
    pub fn parse(wire: &[u8]) -> Self {
        let num_sigs = wire[0] as usize;
        assert!(num_sigs < 0x80);
        let signatures = (0..num_sigs)
            .map(|i| wire[1 + 64 * i..65 + 64 * i].try_into().unwrap())
            .collect();
        let message = wire[1 + 64 * num_sigs..].to_vec();

        let num_required_signatures = message[0] as usize;
        let num_keys = message[3] as usize;
        assert!(num_keys < 0x80);
        let account_keys = (0..num_keys)
            .map(|i| message[4 + 32 * i..36 + 32 * i].try_into().unwrap())
            .collect();
        let hash_at = 4 + 32 * num_keys;
        let recent_blockhash = message[hash_at..hash_at + 32].try_into().unwrap();

        Self {
            signatures,
            message,
            num_required_signatures,
            account_keys,
            recent_blockhash,
        }
    }

    pub fn has_account(&self, key: &[u8; 32]) -> bool {
        self.account_keys.contains(key)
    }

    pub fn contains_bytes(&self, needle: &[u8]) -> bool {
        self.message.windows(needle.len()).any(|w| w == needle)
    }

    /// Every signature verifies against its signer's key.
    pub fn verify(&self) -> bool {
        self.signatures.iter().enumerate().all(|(i, sig)| {
            VerifyingKey::from_bytes(&self.account_keys[i])
                .map(|vk| vk.verify(&self.message, &Signature::from_bytes(sig)).is_ok())
                .unwrap_or(false)
        })
    }
}

pub struct Harness {
    pub launchpad: Launchpad,
    pub chain: Arc<FakeChain>,
    pub clipboard: Arc<MemoryClipboard>,
    pub wallet_key: [u8; 32],
    pub notifications: broadcast::Receiver<Notification>,
}

impl Harness {
    pub async fn connected() -> Self {
        let harness = Self::disconnected();
        harness.launchpad.connect_wallet().await.unwrap();
        harness
    }

    pub fn disconnected() -> Self {
        let keypair = SolKeypair::from_seed(&[11u8; 32]);
        let wallet_key = keypair.pubkey();
        Self::with_wallet(Arc::new(LocalWallet::new(keypair)), wallet_key)
    }

    pub fn with_wallet(wallet: Arc<dyn WalletAdapter>, wallet_key: [u8; 32]) -> Self {
        let chain = FakeChain::with_balance(2_500_000_000);
        let clipboard = Arc::new(MemoryClipboard::default());
        let launchpad = Launchpad::new(wallet, chain.clone(), clipboard.clone());
        let notifications = launchpad.subscribe_notifications();
        Self {
            launchpad,
            chain,
            clipboard,
            wallet_key,
            notifications,
        }
    }

    pub fn wallet_address(&self) -> String {
        bytes_to_address(&self.wallet_key)
    }

    /// Everything notified so far.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }
}
