//! The launchpad controller.
//!
//! Owns the wallet adapter, the chain connection and the observable state,
//! and implements every user action. Handlers never panic on user or network
//! errors: each failure becomes a notification and is also returned to the
//! caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chain_sol::{parse_address, system_program, SolTransaction, LAMPORTS_PER_SOL};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::amount::parse_positive_amount;
use crate::clipboard::Clipboard;
use crate::connection::ChainConnection;
use crate::error::LaunchpadError;
use crate::launch::{LaunchReceipt, LaunchStage, TokenLauncher};
use crate::notify::{Notification, Notifier};
use crate::state::{AppState, StateStore, COPY_FEEDBACK_SECS};
use crate::types::{TokenCreationRequest, TransferRequest, WalletSession};
use crate::wallet::WalletAdapter;

const SOL_DECIMALS: u8 = 9;

pub struct Launchpad {
    wallet: Arc<dyn WalletAdapter>,
    connection: Arc<dyn ChainConnection>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<StateStore>,
    notifier: Notifier,
    busy: AtomicBool,
    confirm_launch_steps: bool,
    /// Runtime the controller was built on; timers are spawned here.
    runtime: Option<Handle>,
    cooldown_task: Mutex<Option<JoinHandle<()>>>,
    copy_reset_task: Mutex<Option<JoinHandle<()>>>,
}

/// Marks the controller busy for the lifetime of one action.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a StateStore,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a AtomicBool, state: &'a StateStore) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        state.set_loading(true);
        Some(Self { busy, state })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.set_loading(false);
        self.busy.store(false, Ordering::Release);
    }
}

impl Launchpad {
    pub fn new(
        wallet: Arc<dyn WalletAdapter>,
        connection: Arc<dyn ChainConnection>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            wallet,
            connection,
            clipboard,
            state: Arc::new(StateStore::new()),
            notifier: Notifier::default(),
            busy: AtomicBool::new(false),
            confirm_launch_steps: true,
            runtime: Handle::try_current().ok(),
            cooldown_task: Mutex::new(None),
            copy_reset_task: Mutex::new(None),
        }
    }

    /// Wait for confirmation between launch steps (default `true`).
    pub fn with_launch_confirmation(mut self, confirm: bool) -> Self {
        self.confirm_launch_steps = confirm;
        self
    }

    // -- Observation ---------------------------------------------------------

    pub fn state(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn session(&self) -> WalletSession {
        self.wallet.session()
    }

    pub fn balance_label(&self) -> String {
        self.state.snapshot().balance_label()
    }

    // -- Form input ----------------------------------------------------------

    pub fn set_token_form(&self, form: TokenCreationRequest) {
        self.state.set_token_form(form);
    }

    pub fn set_transfer_form(&self, form: TransferRequest) {
        self.state.set_transfer_form(form);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.state.set_message(message);
    }

    // -- Wallet lifecycle ----------------------------------------------------

    /// Initial render: load the balance if a wallet is already connected.
    pub async fn mount(&self) {
        if self.wallet.public_key().is_some() {
            let _ = self.refresh_balance().await;
        }
    }

    pub async fn connect_wallet(&self) -> Result<(), LaunchpadError> {
        if let Err(e) = self.wallet.connect().await {
            self.notifier
                .notify(Notification::error("Error", e.to_string()));
            return Err(e);
        }
        info!(wallet = self.wallet.name(), "wallet connected");
        let _ = self.refresh_balance().await;
        Ok(())
    }

    pub async fn disconnect_wallet(&self) -> Result<(), LaunchpadError> {
        self.wallet.disconnect().await?;
        self.state.update(|s| {
            s.balance_lamports = None;
            s.signature = None;
        });
        info!("wallet disconnected");
        Ok(())
    }

    /// Re-read the wallet balance. On failure the previous value is kept.
    pub async fn refresh_balance(&self) -> Result<u64, LaunchpadError> {
        let owner = self
            .wallet
            .public_key()
            .ok_or(LaunchpadError::WalletNotConnected)?;
        match self.connection.get_balance(&owner).await {
            Ok(lamports) => {
                debug!(lamports, "balance updated");
                self.state.set_balance(Some(lamports));
                Ok(lamports)
            }
            Err(e) => {
                warn!(error = %e, "balance refresh failed");
                Err(e)
            }
        }
    }

    // -- Actions -------------------------------------------------------------

    /// Create a token from the current form and mint its initial supply.
    pub async fn create_token(&self) -> Result<LaunchReceipt, LaunchpadError> {
        if self.wallet.public_key().is_none() {
            return Err(self.wallet_not_connected("Please connect your wallet first"));
        }
        let _guard = self.acquire()?;

        let request = self.state.snapshot().token_form;
        let launcher = TokenLauncher::new(self.wallet.as_ref(), self.connection.as_ref())
            .confirm_each_step(self.confirm_launch_steps);

        let launch = match launcher.prepare(&request) {
            Ok(launch) => launch,
            Err(e) => return Err(self.report("Error", e)),
        };
        self.state.set_launch_stage(LaunchStage::Idle);

        let state = &self.state;
        let notifier = &self.notifier;
        let result = launcher
            .run(&launch, |stage| {
                if let LaunchStage::MintCreated { signature, .. } = stage {
                    notifier.notify(Notification::info(
                        "Token Created",
                        format!("Token created successfully. Transaction ID: {signature}"),
                    ));
                }
                state.set_launch_stage(stage.clone());
            })
            .await;

        match result {
            Ok(receipt) => {
                self.notifier.notify(Notification::info(
                    "Token Minted",
                    format!("{} tokens minted successfully", launch.supply_display),
                ));
                self.state.update(|s| {
                    s.token_form = TokenCreationRequest::default();
                    s.launch_stage = LaunchStage::Done {
                        mint: receipt.mint_address(),
                    };
                });
                Ok(receipt)
            }
            Err(failure) => {
                self.state.set_launch_stage(LaunchStage::Failed {
                    step: failure.step,
                    reason: failure.source.to_string(),
                });
                Err(self.report("Error", failure.into()))
            }
        }
    }

    /// Request 1 SOL and start the cooldown on success.
    pub async fn request_airdrop(&self) -> Result<String, LaunchpadError> {
        let Some(owner) = self.wallet.public_key() else {
            return Err(self.wallet_not_connected("Please connect your wallet first"));
        };
        let cooldown = self.state.snapshot().cooldown;
        if cooldown.is_active() {
            return Err(self.report(
                "Airdrop unavailable",
                LaunchpadError::CooldownActive(cooldown.remaining()),
            ));
        }
        let _guard = self.acquire()?;

        let result = async {
            let signature = self
                .connection
                .request_airdrop(&owner, LAMPORTS_PER_SOL)
                .await?;
            self.connection.confirm_transaction(&signature).await?;
            Ok::<_, LaunchpadError>(signature)
        }
        .await;

        match result {
            Ok(signature) => {
                info!(%signature, "airdrop confirmed");
                let _ = self.refresh_balance().await;
                self.notifier.notify(Notification::info(
                    "Airdrop Successful",
                    "1 SOL has been airdropped to your wallet",
                ));
                self.start_cooldown();
                Ok(signature)
            }
            Err(e) => {
                warn!(error = %e, "airdrop failed");
                self.notifier
                    .notify(Notification::error("Airdrop Failed", "Try again later"));
                Err(e)
            }
        }
    }

    /// Sign the current message; the Base64 signature is stored in state.
    pub async fn sign_message(&self) -> Result<String, LaunchpadError> {
        if !self.wallet.supports_message_signing() {
            return Err(self.report("Error", LaunchpadError::MessageSigningUnsupported));
        }
        let _guard = self.acquire()?;

        let message = self.state.snapshot().message;
        match self.wallet.sign_message(message.as_bytes()).await {
            Ok(signature) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(signature);
                self.state.set_signature(Some(encoded.clone()));
                self.notifier.notify(Notification::info(
                    "Message Signed",
                    "Message signed successfully",
                ));
                Ok(encoded)
            }
            Err(e) => Err(self.report("Error", e)),
        }
    }

    /// Send SOL per the transfer form. Input is validated before any
    /// network call.
    pub async fn send_transfer(&self) -> Result<String, LaunchpadError> {
        let Some(from) = self.wallet.public_key() else {
            return Err(self.report(
                "Error",
                LaunchpadError::Wallet("Please connect your wallet first.".into()),
            ));
        };
        let _guard = self.acquire()?;

        let form = self.state.snapshot().transfer_form;
        let lamports = match parse_positive_amount(&form.amount, SOL_DECIMALS) {
            Ok(lamports) => lamports,
            Err(e) => return Err(self.report("Error", e)),
        };
        let to = match parse_address(&form.recipient_address) {
            Ok(to) => to,
            Err(e) => return Err(self.report("Error", e.into())),
        };

        let result = async {
            let blockhash = self.connection.get_latest_blockhash().await?;
            let transaction = SolTransaction::new_with_payer(
                &[system_program::transfer(&from, &to, lamports)],
                &from,
                &blockhash,
            )?;
            self.wallet
                .send_transaction(transaction, self.connection.as_ref())
                .await
        }
        .await;

        match result {
            Ok(signature) => {
                info!(%signature, lamports, "transfer submitted");
                self.notifier.notify(Notification::info(
                    "Success",
                    format!(
                        "Sent {} SOL to {}.",
                        form.amount.trim(),
                        form.recipient_address.trim()
                    ),
                ));
                self.state.set_transfer_form(TransferRequest::default());
                Ok(signature)
            }
            Err(e) => Err(self.report("Error", e)),
        }
    }

    /// Copy the wallet address. The `copied` flag reverts after two seconds.
    ///
    /// Returns `false` when there is nothing to copy or the clipboard
    /// refused the write; no notification is shown either way. Without a
    /// Tokio runtime to run the reset timer the indicator is not shown.
    pub fn copy_address(&self) -> bool {
        let Some(session_address) = self.wallet.session().address() else {
            return false;
        };
        if let Err(e) = self.clipboard.write_text(&session_address) {
            error!(error = %e, "copy failed");
            return false;
        }

        let Some(runtime) = self.runtime() else {
            debug!("no runtime for the copy indicator");
            return true;
        };
        self.state.set_copied(true);
        let state = Arc::clone(&self.state);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(COPY_FEEDBACK_SECS)).await;
            state.set_copied(false);
        });
        if let Some(previous) = self.copy_reset_task.lock().replace(handle) {
            previous.abort();
        }
        true
    }

    // -- Internals -----------------------------------------------------------

    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, LaunchpadError> {
        BusyGuard::acquire(&self.busy, &self.state)
            .ok_or_else(|| self.report("Error", LaunchpadError::Busy))
    }

    fn start_cooldown(&self) {
        self.state.start_cooldown();
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if state.tick_cooldown() == 0 {
                    break;
                }
            }
        });
        if let Some(previous) = self.cooldown_task.lock().replace(handle) {
            previous.abort();
        }
    }

    fn wallet_not_connected(&self, description: &str) -> LaunchpadError {
        self.notifier
            .notify(Notification::error("Wallet not connected", description));
        LaunchpadError::WalletNotConnected
    }

    /// Surface `error` as a destructive notification and hand it back.
    fn report(&self, title: &str, error: LaunchpadError) -> LaunchpadError {
        self.notifier
            .notify(Notification::error(title, error.to_string()));
        error
    }
}

impl Drop for Launchpad {
    fn drop(&mut self) {
        for slot in [&self.cooldown_task, &self.copy_reset_task] {
            if let Some(handle) = slot.lock().take() {
                handle.abort();
            }
        }
    }
}
