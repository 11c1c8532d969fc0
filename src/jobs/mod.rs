pub mod batch;
pub mod claim;
pub mod withdraw;

pub use batch::{BatchReport, WalletBatchRunner};
pub use claim::{ClaimJob, ClaimOutcome};
pub use withdraw::{WithdrawJob, WithdrawOutcome};

use crate::account::AccountResolver;
use crate::blockchain::{ChainClient, Connect};
use crate::config::{ContractSet, KeeperConfig};
use crate::contracts::ERC20Contract;
use crate::fee::FeeEstimator;
use crate::submitter::TransactionSubmitter;
use alloy::primitives::U256;
use anyhow::Result;
use starknet::core::types::Felt;
use tracing::{info, warn};

/// Everything a wallet workflow needs besides the wallet itself.
pub struct JobContext<K: Connect> {
    pub config: KeeperConfig,
    pub contracts: ContractSet,
    pub connector: K,
    pub resolver: AccountResolver,
    pub submitter: TransactionSubmitter,
    pub fee_estimator: FeeEstimator,
}

impl<K: Connect> JobContext<K> {
    pub fn new(config: KeeperConfig, connector: K) -> Result<Self> {
        let contracts = config.contract_set()?;
        let resolver = AccountResolver::from_config(&config)?;
        let submitter = TransactionSubmitter::from_config(&config);
        let fee_estimator = FeeEstimator::new(config.fees.multiplier);
        Ok(Self {
            config,
            contracts,
            connector,
            resolver,
            submitter,
            fee_estimator,
        })
    }

    pub fn eth(&self) -> ERC20Contract {
        ERC20Contract::new(self.contracts.eth)
    }

    pub fn strk(&self) -> ERC20Contract {
        ERC20Contract::new(self.contracts.strk)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Deployed,
    NotDeployed,
    Unknown,
}

/// A successful nonce read means the account exists; "contract not found"
/// means it does not. Either way the workflow continues.
pub async fn check_deployment<C: ChainClient + ?Sized>(client: &C, address: Felt) -> DeploymentStatus {
    match client.nonce(address).await {
        Ok(Some(_)) => {
            info!("🏗️ Account is deployed");
            DeploymentStatus::Deployed
        }
        Ok(None) => {
            info!("🏗️ Account is not deployed");
            DeploymentStatus::NotDeployed
        }
        Err(e) => {
            warn!("⚠️ Could not determine deployment status: {:#}", e);
            DeploymentStatus::Unknown
        }
    }
}

pub async fn read_eth_balance<C: ChainClient + ?Sized>(
    client: &C,
    eth: &ERC20Contract,
    address: Felt,
) -> Result<U256> {
    let balance = eth.balance_of(client, address).await?;
    info!(
        "💰 Account has {} ETH",
        crate::units::wei_to_ether(balance)
    );
    Ok(balance)
}
