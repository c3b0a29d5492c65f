//! Core of the Solana token launchpad.
//!
//! [`Launchpad`] is the controller a front end drives: it connects a
//! [`WalletAdapter`], talks to a cluster through a [`ChainConnection`], and
//! publishes an observable [`AppState`] plus transient [`Notification`]s.
//! Token creation itself lives in [`TokenLauncher`].

pub mod amount;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod connection;
pub mod error;
pub mod launch;
pub mod notify;
pub mod rpc;
pub mod state;
pub mod types;
pub mod wallet;

pub use amount::{format_amount, parse_amount, parse_positive_amount, TOKEN_DECIMALS};
pub use app::Launchpad;
pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use config::{Commitment, ConfigError, LaunchpadConfig, DEFAULT_RPC_URL};
pub use connection::ChainConnection;
pub use error::LaunchpadError;
pub use launch::{
    LaunchFailure, LaunchReceipt, LaunchStage, LaunchStep, PreparedLaunch, TokenLauncher,
};
pub use notify::{Notification, Notifier, Variant};
pub use rpc::RpcConnection;
pub use state::{AirdropCooldown, AppState, StateStore, AIRDROP_COOLDOWN_SECS};
pub use types::{Cluster, TokenCreationRequest, TransferRequest, WalletSession};
pub use wallet::{LocalWallet, WalletAdapter};
