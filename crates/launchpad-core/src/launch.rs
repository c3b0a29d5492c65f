//! Token launch: three dependent transactions.
//!
//! 1. Create the mint account, point its metadata at itself, initialize the
//!    mint and write the name/symbol/URI record. Co-signed by a fresh mint
//!    keypair and the wallet.
//! 2. Create the wallet's associated token account for the new mint.
//! 3. Mint the initial supply into that account.
//!
//! Each step is confirmed before the next one is built. A failed step stops
//! the launch; earlier steps are not rolled back.

use std::fmt;

use chain_sol::{
    bytes_to_address, derive_associated_token_address, mint_len, system_program, token_2022,
    token_metadata, ExtensionType, SolKeypair, SolTransaction, TokenMetadata,
    TOKEN_2022_PROGRAM_ID,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::amount::{parse_positive_amount, TOKEN_DECIMALS};
use crate::connection::ChainConnection;
use crate::error::LaunchpadError;
use crate::types::TokenCreationRequest;
use crate::wallet::WalletAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStep {
    CreateMint,
    CreateTokenAccount,
    MintSupply,
}

impl LaunchStep {
    pub fn number(&self) -> u8 {
        match self {
            LaunchStep::CreateMint => 1,
            LaunchStep::CreateTokenAccount => 2,
            LaunchStep::MintSupply => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LaunchStep::CreateMint => "create mint",
            LaunchStep::CreateTokenAccount => "create token account",
            LaunchStep::MintSupply => "mint initial supply",
        }
    }
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.number(), self.label())
    }
}

/// Progress of the current launch, as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LaunchStage {
    #[default]
    Idle,
    MintCreated {
        mint: String,
        signature: String,
    },
    AccountCreated {
        mint: String,
        token_account: String,
        signature: String,
    },
    Minted {
        mint: String,
        token_account: String,
        signature: String,
    },
    Done {
        mint: String,
    },
    Failed {
        step: LaunchStep,
        reason: String,
    },
}

/// A validated launch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLaunch {
    pub owner: [u8; 32],
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Supply in base units (`supply * 10^9`).
    pub supply_units: u64,
    /// Supply as the user typed it, for messages.
    pub supply_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReceipt {
    pub mint: [u8; 32],
    pub token_account: [u8; 32],
    pub create_mint_signature: String,
    pub create_account_signature: String,
    pub mint_to_signature: String,
    pub supply_units: u64,
}

impl LaunchReceipt {
    pub fn mint_address(&self) -> String {
        bytes_to_address(&self.mint)
    }

    pub fn token_account_address(&self) -> String {
        bytes_to_address(&self.token_account)
    }
}

#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct LaunchFailure {
    pub step: LaunchStep,
    /// Set once step 1 succeeded.
    pub mint: Option<String>,
    pub source: LaunchpadError,
}

pub struct TokenLauncher<'a> {
    wallet: &'a dyn WalletAdapter,
    connection: &'a dyn ChainConnection,
    confirm_each_step: bool,
}

impl<'a> TokenLauncher<'a> {
    pub fn new(wallet: &'a dyn WalletAdapter, connection: &'a dyn ChainConnection) -> Self {
        Self {
            wallet,
            connection,
            confirm_each_step: true,
        }
    }

    /// Skip confirmation polling between steps.
    pub fn confirm_each_step(mut self, confirm: bool) -> Self {
        self.confirm_each_step = confirm;
        self
    }

    /// Validate the form before anything touches the network.
    pub fn prepare(&self, request: &TokenCreationRequest) -> Result<PreparedLaunch, LaunchpadError> {
        let owner = self
            .wallet
            .public_key()
            .ok_or(LaunchpadError::WalletNotConnected)?;

        // Blank fields are rejected; the metadata keeps them as typed.
        if request.name.trim().is_empty() {
            return Err(LaunchpadError::InvalidInput("Token name is required".into()));
        }
        if request.symbol.trim().is_empty() {
            return Err(LaunchpadError::InvalidInput("Token symbol is required".into()));
        }
        let supply_display = request.initial_supply.trim();
        let supply_units = parse_positive_amount(supply_display, TOKEN_DECIMALS)?;

        Ok(PreparedLaunch {
            owner,
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            uri: request.image_uri.clone(),
            supply_units,
            supply_display: supply_display.to_string(),
        })
    }

    /// Run all three steps, reporting each completed stage to `on_stage`.
    pub async fn run<F>(
        &self,
        launch: &PreparedLaunch,
        mut on_stage: F,
    ) -> Result<LaunchReceipt, LaunchFailure>
    where
        F: FnMut(&LaunchStage) + Send,
    {
        let mint_keypair = SolKeypair::generate();
        let mint = mint_keypair.pubkey();
        let mint_address = bytes_to_address(&mint);
        info!(mint = %mint_address, name = %launch.name, symbol = %launch.symbol, "launching token");

        let create_mint_signature = self
            .create_mint(launch, &mint_keypair)
            .await
            .map_err(|e| self.failed(LaunchStep::CreateMint, None, e))?;
        // Once sent, the mint may land even if confirmation fails.
        self.confirm(LaunchStep::CreateMint, &create_mint_signature)
            .await
            .map_err(|e| self.failed(LaunchStep::CreateMint, Some(&mint_address), e))?;
        on_stage(&LaunchStage::MintCreated {
            mint: mint_address.clone(),
            signature: create_mint_signature.clone(),
        });

        let (token_account, create_account_signature) = self
            .create_token_account(launch, &mint)
            .await
            .map_err(|e| {
                self.failed(LaunchStep::CreateTokenAccount, Some(&mint_address), e)
            })?;
        let token_account_address = bytes_to_address(&token_account);
        on_stage(&LaunchStage::AccountCreated {
            mint: mint_address.clone(),
            token_account: token_account_address.clone(),
            signature: create_account_signature.clone(),
        });

        let mint_to_signature = self
            .mint_supply(launch, &mint, &token_account)
            .await
            .map_err(|e| self.failed(LaunchStep::MintSupply, Some(&mint_address), e))?;
        on_stage(&LaunchStage::Minted {
            mint: mint_address,
            token_account: token_account_address,
            signature: mint_to_signature.clone(),
        });

        Ok(LaunchReceipt {
            mint,
            token_account,
            create_mint_signature,
            create_account_signature,
            mint_to_signature,
            supply_units: launch.supply_units,
        })
    }

    async fn create_mint(
        &self,
        launch: &PreparedLaunch,
        mint_keypair: &SolKeypair,
    ) -> Result<String, LaunchpadError> {
        let owner = launch.owner;
        let mint = mint_keypair.pubkey();

        let mut metadata = TokenMetadata::new(mint, &launch.name, &launch.symbol, &launch.uri);
        metadata.update_authority = Some(owner);

        // The account is created at the bare mint size; the metadata
        // extension grows it later, so rent must cover both up front.
        let space = mint_len(&[ExtensionType::MetadataPointer]);
        let lamports = self
            .connection
            .get_minimum_balance_for_rent_exemption(space + metadata.tlv_len())
            .await?;

        let instructions = [
            system_program::create_account(
                &owner,
                &mint,
                lamports,
                space as u64,
                &TOKEN_2022_PROGRAM_ID,
            ),
            token_2022::initialize_metadata_pointer(&mint, Some(&owner), Some(&mint)),
            token_2022::initialize_mint2(&mint, TOKEN_DECIMALS, &owner, None),
            token_metadata::initialize(
                &TOKEN_2022_PROGRAM_ID,
                &mint,
                &owner,
                &mint,
                &owner,
                &metadata.name,
                &metadata.symbol,
                &metadata.uri,
            )?,
        ];

        let blockhash = self.connection.get_latest_blockhash().await?;
        let mut transaction = SolTransaction::new_with_payer(&instructions, &owner, &blockhash)?;
        transaction.partial_sign(mint_keypair)?;

        self.send(LaunchStep::CreateMint, transaction).await
    }

    async fn create_token_account(
        &self,
        launch: &PreparedLaunch,
        mint: &[u8; 32],
    ) -> Result<([u8; 32], String), LaunchpadError> {
        let owner = launch.owner;
        let token_account = derive_associated_token_address(&owner, mint)?;
        let instruction =
            token_2022::create_associated_token_account(&owner, &token_account, &owner, mint);

        let blockhash = self.connection.get_latest_blockhash().await?;
        let transaction = SolTransaction::new_with_payer(&[instruction], &owner, &blockhash)?;
        let signature = self
            .submit(LaunchStep::CreateTokenAccount, transaction)
            .await?;
        Ok((token_account, signature))
    }

    async fn mint_supply(
        &self,
        launch: &PreparedLaunch,
        mint: &[u8; 32],
        token_account: &[u8; 32],
    ) -> Result<String, LaunchpadError> {
        let owner = launch.owner;
        let instruction = token_2022::mint_to(mint, token_account, &owner, launch.supply_units)?;

        let blockhash = self.connection.get_latest_blockhash().await?;
        let transaction = SolTransaction::new_with_payer(&[instruction], &owner, &blockhash)?;
        self.submit(LaunchStep::MintSupply, transaction).await
    }

    async fn submit(
        &self,
        step: LaunchStep,
        transaction: SolTransaction,
    ) -> Result<String, LaunchpadError> {
        let signature = self.send(step, transaction).await?;
        self.confirm(step, &signature).await?;
        Ok(signature)
    }

    async fn send(
        &self,
        step: LaunchStep,
        transaction: SolTransaction,
    ) -> Result<String, LaunchpadError> {
        let signature = self
            .wallet
            .send_transaction(transaction, self.connection)
            .await?;
        info!(%step, %signature, "submitted");
        Ok(signature)
    }

    async fn confirm(&self, step: LaunchStep, signature: &str) -> Result<(), LaunchpadError> {
        if self.confirm_each_step {
            self.connection.confirm_transaction(signature).await?;
            info!(%step, %signature, "confirmed");
        }
        Ok(())
    }

    fn failed(&self, step: LaunchStep, mint: Option<&str>, source: LaunchpadError) -> LaunchFailure {
        warn!(%step, error = %source, "launch step failed");
        LaunchFailure {
            step,
            mint: mint.map(str::to_string),
            source,
        }
    }
}
