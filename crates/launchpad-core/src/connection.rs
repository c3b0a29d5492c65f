use async_trait::async_trait;

use crate::error::LaunchpadError;

/// The chain operations the launchpad consumes.
///
/// Addresses are raw 32-byte public keys; transaction signatures are the
/// Base58 strings the cluster hands back.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// Balance in lamports.
    async fn get_balance(&self, address: &[u8; 32]) -> Result<u64, LaunchpadError>;

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], LaunchpadError>;

    /// Lamports an account of `data_len` bytes needs to be rent exempt.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LaunchpadError>;

    async fn request_airdrop(
        &self,
        address: &[u8; 32],
        lamports: u64,
    ) -> Result<String, LaunchpadError>;

    /// Submit a fully signed wire-format transaction.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, LaunchpadError>;

    /// Wait until `signature` reaches the connection's commitment level.
    async fn confirm_transaction(&self, signature: &str) -> Result<(), LaunchpadError>;
}
