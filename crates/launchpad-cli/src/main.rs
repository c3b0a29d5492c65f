//! `launchpad`: create Solana tokens from the command line.
//!
//! Loads configuration and a keypair, connects the local wallet, runs one
//! action and prints the resulting notifications.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launchpad_core::{
    Cluster, Commitment, Launchpad, LaunchpadConfig, LocalWallet, Notification, Osc52Clipboard,
    RpcConnection, TokenCreationRequest, TransferRequest,
};
use tokio::sync::broadcast;
use tracing::warn;

mod logging;

#[derive(Parser, Debug)]
#[command(name = "launchpad", version, about = "Solana Token-2022 launchpad")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RPC endpoint, overrides config and environment
    #[arg(long, short = 'u', global = true)]
    url: Option<String>,

    /// Solana CLI keypair file
    #[arg(long, short = 'k', global = true)]
    keypair: Option<PathBuf>,

    #[arg(long, global = true)]
    commitment: Option<Commitment>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the wallet address
    Address,
    /// Copy the wallet address to the terminal clipboard
    CopyAddress,
    /// Print the wallet balance
    Balance,
    /// Request 1 SOL on a test cluster
    Airdrop,
    /// Create a token with metadata and mint its initial supply
    CreateToken {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "")]
        image_url: String,
        /// Initial supply in whole tokens, e.g. 1000 or 0.5
        #[arg(long)]
        supply: String,
    },
    /// Sign a message with the wallet key (prints Base64)
    SignMessage { message: String },
    /// Send SOL to another address
    Send { recipient: String, amount: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<LaunchpadConfig> {
    let mut config = LaunchpadConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.rpc_url = url.clone();
    }
    if let Some(path) = &cli.keypair {
        config.keypair_path = Some(path.clone());
    }
    if let Some(commitment) = cli.commitment {
        config.commitment = commitment;
    }
    config.validate()?;
    Ok(config)
}

fn default_keypair_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("solana").join("id.json"))
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    logging::init_logging(&config.log_level)?;

    let keypair_path = config
        .keypair_path
        .clone()
        .or_else(default_keypair_path)
        .context("no keypair file; pass --keypair or set LAUNCHPAD_KEYPAIR")?;
    let wallet = Arc::new(LocalWallet::from_keypair_file(&keypair_path)?);
    let connection = Arc::new(RpcConnection::new(&config)?);
    let cluster = Cluster::from_rpc_url(&config.rpc_url);

    let launchpad = Launchpad::new(wallet, connection, Arc::new(Osc52Clipboard));
    let mut notes = launchpad.subscribe_notifications();
    launchpad.connect_wallet().await?;

    let ok = match cli.command {
        Command::Address => {
            println!("{}", launchpad.session().address().unwrap_or_default());
            true
        }
        Command::CopyAddress => {
            let copied = launchpad.copy_address();
            if copied {
                println!("Copied {}", launchpad.session().address().unwrap_or_default());
            }
            copied
        }
        Command::Balance => match launchpad.refresh_balance().await {
            Ok(_) => {
                println!("{}", launchpad.balance_label());
                true
            }
            Err(e) => {
                eprintln!("Error: {e}");
                false
            }
        },
        Command::Airdrop => {
            if !cluster.supports_airdrop() {
                warn!(cluster = cluster.display_name(), "airdrops are only available on test clusters");
            }
            let result = launchpad.request_airdrop().await;
            print_notifications(&mut notes);
            if result.is_ok() {
                println!("Balance: {}", launchpad.balance_label());
            }
            result.is_ok()
        }
        Command::CreateToken {
            name,
            symbol,
            image_url,
            supply,
        } => {
            launchpad.set_token_form(TokenCreationRequest {
                name,
                symbol,
                image_uri: image_url,
                initial_supply: supply,
            });
            let result = launchpad.create_token().await;
            print_notifications(&mut notes);
            if let Ok(receipt) = &result {
                println!("Mint:          {}", receipt.mint_address());
                println!("Token account: {}", receipt.token_account_address());
                if let Some(link) = cluster.explorer_tx_url(&receipt.mint_to_signature) {
                    println!("Explorer:      {link}");
                }
            }
            result.is_ok()
        }
        Command::SignMessage { message } => {
            launchpad.set_message(message);
            let result = launchpad.sign_message().await;
            print_notifications(&mut notes);
            if let Ok(signature) = &result {
                println!("{signature}");
            }
            result.is_ok()
        }
        Command::Send { recipient, amount } => {
            launchpad.set_transfer_form(TransferRequest {
                recipient_address: recipient,
                amount,
            });
            let result = launchpad.send_transfer().await;
            print_notifications(&mut notes);
            if let Some(link) = result.as_ref().ok().and_then(|sig| cluster.explorer_tx_url(sig)) {
                println!("Explorer: {link}");
            }
            result.is_ok()
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(note) = rx.try_recv() {
        if note.is_error() {
            eprintln!("{}: {}", note.title, note.description);
        } else {
            println!("{}: {}", note.title, note.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_token() {
        let cli = Cli::try_parse_from([
            "launchpad",
            "--url",
            "http://127.0.0.1:8899",
            "create-token",
            "--name",
            "Foo",
            "--symbol",
            "FOO",
            "--supply",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://127.0.0.1:8899"));
        match cli.command {
            Command::CreateToken {
                name,
                image_url,
                supply,
                ..
            } => {
                assert_eq!(name, "Foo");
                assert_eq!(image_url, "");
                assert_eq!(supply, "100");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "launchpad",
            "balance",
            "--url",
            "http://localhost:8899",
            "--commitment",
            "finalized",
            "-k",
            "/tmp/id.json",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.commitment, Commitment::Finalized);
        assert_eq!(config.keypair_path, Some(PathBuf::from("/tmp/id.json")));
    }

    #[test]
    fn invalid_url_flag_is_rejected() {
        let cli = Cli::try_parse_from(["launchpad", "--url", "nope", "address"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn unknown_commitment_is_rejected() {
        assert!(Cli::try_parse_from(["launchpad", "--commitment", "soon", "address"]).is_err());
    }
}
