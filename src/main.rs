use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::path::PathBuf;
use strk_airdrop_keeper::account::load_wallet_records;
use strk_airdrop_keeper::{
    ClaimJob, JobContext, KeeperConfig, ProofBook, StarknetConnector, WalletBatchRunner,
    WithdrawJob,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strk-airdrop-keeper")]
#[command(about = "Claims STRK provisions and withdraws ETH for a list of Starknet wallets")]
struct Cli {
    /// Path to the TOML config (a common.toml next to it is merged underneath)
    #[arg(short, long, default_value = "configs/mainnet.toml")]
    config: String,

    /// Wallet list override (`privateKey:destination` per line)
    #[arg(short, long)]
    wallets: Option<PathBuf>,

    /// Run without the interactive menu
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Claim STRK and forward it to each wallet's destination
    Claim,
    /// Send each wallet's ETH balance to its destination
    Withdraw,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => match select_action()? {
            Some(command) => command,
            None => {
                info!("👋 Exiting");
                return Ok(());
            }
        },
    };

    let config = match KeeperConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config {}: {:#}", cli.config, e);
            return Err(e);
        }
    };

    let wallets_path = cli
        .wallets
        .unwrap_or_else(|| config.inputs.wallets_path.clone());
    let records = load_wallet_records(&wallets_path)?;

    let connector = StarknetConnector::new(&config.chain.rpc_url)?;
    let ctx = JobContext::new(config, connector)?;

    match command {
        Commands::Claim => {
            let proofs = ProofBook::load(&ctx.config.proof_files())?;
            let job = ClaimJob::new(&ctx, &proofs);
            WalletBatchRunner::run(&records, |wallet| {
                let job = &job;
                async move { job.execute(&wallet).await }
            })
            .await;
        }
        Commands::Withdraw => {
            let job = WithdrawJob::new(&ctx);
            WalletBatchRunner::run(&records, |wallet| {
                let job = &job;
                async move { job.execute(&wallet).await }
            })
            .await;
        }
    }

    Ok(())
}

fn select_action() -> Result<Option<Commands>> {
    let choices = ["1) claim and withdraw STRK", "2) withdraw ETH", "3) exit"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("ACTION")
        .items(&choices)
        .default(0)
        .interact_opt()?;

    Ok(match selection {
        Some(0) => Some(Commands::Claim),
        Some(1) => Some(Commands::Withdraw),
        _ => None,
    })
}
