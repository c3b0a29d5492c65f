use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchpadError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet does not support message signing")]
    MessageSigningUnsupported,

    #[error("Invalid amount entered.")]
    InvalidAmount(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Another operation is already in progress")]
    Busy,

    #[error("Next airdrop in {0}s")]
    CooldownActive(u32),

    #[error("{0}")]
    Sol(#[from] chain_sol::SolError),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(String),

    #[error("{0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to copy: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Launch(Box<crate::launch::LaunchFailure>),
}

impl From<reqwest::Error> for LaunchpadError {
    fn from(e: reqwest::Error) -> Self {
        LaunchpadError::Http(e.to_string())
    }
}

impl From<crate::launch::LaunchFailure> for LaunchpadError {
    fn from(e: crate::launch::LaunchFailure) -> Self {
        LaunchpadError::Launch(Box::new(e))
    }
}

impl From<crate::config::ConfigError> for LaunchpadError {
    fn from(e: crate::config::ConfigError) -> Self {
        LaunchpadError::Config(e.to_string())
    }
}
