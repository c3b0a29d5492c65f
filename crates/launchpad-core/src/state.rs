//! Observable application state.
//!
//! All mutation goes through [`StateStore`]; views hold a
//! `watch::Receiver<AppState>` and re-render on change.

use tokio::sync::watch;

use crate::amount::format_amount;
use crate::launch::LaunchStage;
use crate::types::{TokenCreationRequest, TransferRequest};

pub const AIRDROP_COOLDOWN_SECS: u32 = 60;

/// How long the "copied" indicator stays on.
pub const COPY_FEEDBACK_SECS: u64 = 2;

/// Seconds until the next airdrop may be requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AirdropCooldown {
    remaining: u32,
}

impl AirdropCooldown {
    pub fn start(&mut self) {
        self.remaining = AIRDROP_COOLDOWN_SECS;
    }

    /// One second elapsed. Saturates at zero.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub token_form: TokenCreationRequest,
    pub transfer_form: TransferRequest,
    pub message: String,
    /// Base64 signature of the last signed message.
    pub signature: Option<String>,
    /// `None` until the first balance read completes.
    pub balance_lamports: Option<u64>,
    pub is_loading: bool,
    pub copied: bool,
    pub cooldown: AirdropCooldown,
    pub launch_stage: LaunchStage,
}

impl AppState {
    pub fn balance_label(&self) -> String {
        match self.balance_lamports {
            Some(lamports) => format!("{} SOL", format_amount(lamports, 9)),
            None => "Loading...".to_string(),
        }
    }

    pub fn airdrop_label(&self) -> String {
        if self.cooldown.is_active() {
            format!("Next airdrop in {}s", self.cooldown.remaining())
        } else {
            "Request 1 SOL Airdrop".to_string()
        }
    }

    pub fn can_request_airdrop(&self) -> bool {
        !self.is_loading && !self.cooldown.is_active()
    }
}

pub struct StateStore {
    tx: watch::Sender<AppState>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Apply `f` and notify subscribers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut AppState),
    {
        self.tx.send_modify(f);
    }

    pub fn set_token_form(&self, form: TokenCreationRequest) {
        self.update(|s| s.token_form = form);
    }

    pub fn set_transfer_form(&self, form: TransferRequest) {
        self.update(|s| s.transfer_form = form);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| s.message = message);
    }

    pub fn set_balance(&self, lamports: Option<u64>) {
        self.update(|s| s.balance_lamports = lamports);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|s| s.is_loading = loading);
    }

    pub fn set_copied(&self, copied: bool) {
        self.update(|s| s.copied = copied);
    }

    pub fn set_signature(&self, signature: Option<String>) {
        self.update(|s| s.signature = signature);
    }

    pub fn set_launch_stage(&self, stage: LaunchStage) {
        self.update(|s| s.launch_stage = stage);
    }

    pub fn start_cooldown(&self) {
        self.update(|s| s.cooldown.start());
    }

    /// Returns the seconds left after the tick.
    pub fn tick_cooldown(&self) -> u32 {
        let mut remaining = 0;
        self.update(|s| remaining = s.cooldown.tick());
        remaining
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
