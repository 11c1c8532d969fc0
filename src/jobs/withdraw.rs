use crate::account::{Wallet, WalletAccount};
use crate::blockchain::Connect;
use crate::jobs::{check_deployment, read_eth_balance, JobContext};
use crate::pacing::sleep_random;
use crate::units::wei_to_ether;
use alloy::primitives::U256;
use anyhow::Result;
use starknet::core::types::Felt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Transferred {
        tx_hash: Felt,
        explorer_url: String,
        amount: U256,
        fee: u128,
    },
    SkippedZero,
    SkippedFeeUnknown,
    SkippedAmountTooLow,
    Failed(String),
}

/// Sends a wallet's whole ETH balance, minus fees, to its destination.
pub struct WithdrawJob<'a, K: Connect> {
    ctx: &'a JobContext<K>,
}

impl<'a, K: Connect> WithdrawJob<'a, K> {
    pub fn new(ctx: &'a JobContext<K>) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, wallet: &Wallet) -> Result<WithdrawOutcome> {
        let outcome = self.run_session(wallet).await;
        sleep_random(self.ctx.config.pacing.account_wait).await;
        outcome
    }

    async fn run_session(&self, wallet: &Wallet) -> Result<WithdrawOutcome> {
        let account = self.ctx.resolver.resolve(&wallet.signing_key()).await;
        let client = self.ctx.connector.connect().await?;
        let address = account.address();
        info!("📍 Address: {:#x}", address);

        check_deployment(&client, address).await;
        let eth = self.ctx.eth();
        let balance = read_eth_balance(&client, &eth, address).await?;

        let outcome = match self
            .transfer_balance(&client, &account, wallet.destination, balance)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Error while withdrawing: {:#}", e);
                WithdrawOutcome::Failed(format!("{:#}", e))
            }
        };

        if let WithdrawOutcome::Transferred { explorer_url, .. } = &outcome {
            info!("🎉 ETH successfully withdrawn. Transaction URL: {}", explorer_url);
        }

        match eth.balance_of(&client, address).await {
            Ok(after) => info!("💰 Account after transfer has {} ETH", wei_to_ether(after)),
            Err(e) => warn!("⚠️ Could not re-read ETH balance: {:#}", e),
        }

        Ok(outcome)
    }

    async fn transfer_balance(
        &self,
        client: &K::Client,
        account: &WalletAccount,
        destination: Felt,
        balance: U256,
    ) -> Result<WithdrawOutcome> {
        if balance.is_zero() {
            info!("⏭️ Nothing to withdraw, skipping...");
            return Ok(WithdrawOutcome::SkippedZero);
        }

        let eth = self.ctx.eth();

        // The full balance only sizes the estimate
        let sizing_calls = vec![eth.transfer(destination, balance)];
        let fee = match self
            .ctx
            .fee_estimator
            .estimate(client, account, &sizing_calls)
            .await
        {
            Ok(fee) if fee > 0 => fee,
            Ok(_) => {
                warn!("⚠️ Can't estimate fee, skipping...");
                return Ok(WithdrawOutcome::SkippedFeeUnknown);
            }
            Err(e) => {
                warn!("⚠️ Can't estimate fee, skipping... ({:#})", e);
                return Ok(WithdrawOutcome::SkippedFeeUnknown);
            }
        };
        info!("⛽ Max fee: {} ETH", wei_to_ether(U256::from(fee)));

        let fee_wei = U256::from(fee);
        let send_amount = match balance.checked_sub(fee_wei) {
            Some(amount) if !amount.is_zero() => amount,
            _ => {
                info!("⏭️ Amount too low, skipping...");
                return Ok(WithdrawOutcome::SkippedAmountTooLow);
            }
        };

        // The fee is taken off a second time here. Kept as-is until product
        // confirms whether the extra margin is intended.
        let transfer_amount = send_amount.checked_sub(fee_wei).ok_or_else(|| {
            anyhow::anyhow!(
                "Balance {} covers one fee of {} but not two",
                wei_to_ether(balance),
                wei_to_ether(fee_wei)
            )
        })?;

        info!("💸 Transferring {} ETH...", wei_to_ether(transfer_amount));
        let tx_hash = self
            .ctx
            .submitter
            .submit(client, account, vec![eth.transfer(destination, transfer_amount)])
            .await?;

        Ok(WithdrawOutcome::Transferred {
            tx_hash,
            explorer_url: self.ctx.config.explorer_link(tx_hash),
            amount: transfer_amount,
            fee,
        })
    }
}
