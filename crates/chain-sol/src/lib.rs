//! Solana chain support for the token launchpad.
//!
//! This crate builds everything the launchpad submits to a cluster: System
//! Program and Token-2022 instructions, the token-metadata record, associated
//! token account derivation, and the legacy transaction wire format with
//! multi-signer signing. It does not depend on `solana-sdk`: Ed25519 comes
//! from `ed25519-dalek`, Base58 from `bs58`.

pub mod address;
pub mod error;
pub mod keypair;
pub mod system_program;
pub mod token_2022;
pub mod token_metadata;
pub mod transaction;

pub use address::{
    bytes_to_address, is_valid_address, parse_address, parse_signature, signature_to_string,
};
pub use error::SolError;
pub use keypair::SolKeypair;
pub use system_program::{LAMPORTS_PER_SOL, SYSTEM_PROGRAM_ID};
pub use token_2022::{
    derive_associated_token_address, mint_len, ExtensionType, ASSOCIATED_TOKEN_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID,
};
pub use token_metadata::TokenMetadata;
pub use transaction::{
    compile_message, encode_compact_u16, serialize_message, SolAccountMeta, SolInstruction,
    SolMessage, SolTransaction,
};
