use thiserror::Error;

/// Errors raised while encoding Solana addresses, keys, instructions and
/// transactions.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Invalid public key input: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("instruction build error: {0}")]
    InstructionBuildError(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
