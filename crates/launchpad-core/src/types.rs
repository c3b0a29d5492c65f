use serde::{Deserialize, Serialize};

/// Form input for a new token. Every field is free text until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreationRequest {
    pub name: String,
    pub symbol: String,
    pub image_uri: String,
    /// Decimal string, e.g. `"100"` or `"0.5"`.
    pub initial_supply: String,
}

/// Form input for a native SOL transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient_address: String,
    /// Decimal SOL amount as typed.
    pub amount: String,
}

/// Read-only snapshot of the wallet adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSession {
    pub public_key: Option<[u8; 32]>,
    pub connected: bool,
    pub can_sign_messages: bool,
}

impl WalletSession {
    pub fn address(&self) -> Option<String> {
        self.public_key.as_ref().map(chain_sol::bytes_to_address)
    }
}

/// The Solana cluster an RPC endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
    Custom,
}

impl Cluster {
    /// Best-effort guess from the endpoint URL.
    pub fn from_rpc_url(rpc_url: &str) -> Self {
        let host = url::Url::parse(rpc_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default();

        if host.contains("devnet") {
            Cluster::Devnet
        } else if host.contains("testnet") {
            Cluster::Testnet
        } else if host.contains("mainnet") {
            Cluster::MainnetBeta
        } else if host == "localhost" || host == "127.0.0.1" {
            Cluster::Localnet
        } else {
            Cluster::Custom
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "Devnet",
            Cluster::Testnet => "Testnet",
            Cluster::MainnetBeta => "Mainnet Beta",
            Cluster::Localnet => "Localnet",
            Cluster::Custom => "Custom",
        }
    }

    /// Whether the cluster hands out airdrops.
    pub fn supports_airdrop(&self) -> bool {
        matches!(self, Cluster::Devnet | Cluster::Testnet | Cluster::Localnet)
    }

    /// Explorer link for a transaction signature, when one exists.
    pub fn explorer_tx_url(&self, signature: &str) -> Option<String> {
        let suffix = match self {
            Cluster::Devnet => "?cluster=devnet",
            Cluster::Testnet => "?cluster=testnet",
            Cluster::MainnetBeta => "",
            Cluster::Localnet | Cluster::Custom => return None,
        };
        Some(format!("https://explorer.solana.com/tx/{signature}{suffix}"))
    }
}
