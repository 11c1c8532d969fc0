use crate::account::Wallet;
use crate::blockchain::Connect;
use crate::contracts::ProvisionsContract;
use crate::jobs::{check_deployment, read_eth_balance, JobContext};
use crate::pacing::sleep_random;
use crate::proofs::{ClaimProof, ProofBook};
use crate::units::ether_to_wei;
use anyhow::Result;
use starknet::accounts::Call;
use starknet::core::types::Felt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed { tx_hash: Felt, explorer_url: String },
    NotEligible,
    Failed(String),
}

/// Claims a wallet's STRK allocation and forwards it to the wallet's
/// destination in the same transaction.
pub struct ClaimJob<'a, K: Connect> {
    ctx: &'a JobContext<K>,
    proofs: &'a ProofBook,
}

impl<'a, K: Connect> ClaimJob<'a, K> {
    pub fn new(ctx: &'a JobContext<K>, proofs: &'a ProofBook) -> Self {
        Self { ctx, proofs }
    }

    pub async fn execute(&self, wallet: &Wallet) -> Result<ClaimOutcome> {
        // The session lives inside run_session and is gone before pacing starts
        let outcome = self.run_session(wallet).await;
        sleep_random(self.ctx.config.pacing.account_wait).await;
        outcome
    }

    async fn run_session(&self, wallet: &Wallet) -> Result<ClaimOutcome> {
        let account = self.ctx.resolver.resolve(&wallet.signing_key()).await;
        let client = self.ctx.connector.connect().await?;
        let address = account.address();
        info!("📍 Address: {:#x}", address);

        check_deployment(&client, address).await;
        if let Err(e) = read_eth_balance(&client, &self.ctx.eth(), address).await {
            warn!("⚠️ Could not read ETH balance: {:#}", e);
        }

        let Some(proof) = self.proofs.get(address) else {
            info!("🔎 Address {:#x} not found in proofs", address);
            return Ok(ClaimOutcome::NotEligible);
        };

        info!(
            "🎁 Address {:#x} found in proofs, claiming {} STRK and transferring to {:#x}",
            address, proof.amount, wallet.destination
        );

        let calls = match self.claim_calls(address, wallet.destination, proof) {
            Ok(calls) => calls,
            Err(e) => {
                error!("❌ Error while claiming and transferring: {:#}", e);
                return Ok(ClaimOutcome::Failed(format!("{:#}", e)));
            }
        };

        match self.ctx.submitter.submit(&client, &account, calls).await {
            Ok(tx_hash) => {
                let explorer_url = self.ctx.config.explorer_link(tx_hash);
                info!("🎉 Address claimed. Transaction URL: {}", explorer_url);
                Ok(ClaimOutcome::Claimed {
                    tx_hash,
                    explorer_url,
                })
            }
            Err(e) => {
                error!("❌ Error while claiming and transferring: {:#}", e);
                Ok(ClaimOutcome::Failed(format!("{:#}", e)))
            }
        }
    }

    /// The claim and the forwarding transfer, in that order.
    pub fn claim_calls(
        &self,
        identity: Felt,
        destination: Felt,
        proof: &ClaimProof,
    ) -> Result<Vec<Call>> {
        let amount = ether_to_wei(&proof.amount)?;
        let balance = u128::try_from(amount).map_err(|_| {
            anyhow::anyhow!("Claim amount {} does not fit in u128", proof.amount)
        })?;

        let claim = ProvisionsContract::new(self.ctx.contracts.provisions)
            .claim(identity, balance, proof)?;
        let transfer = self.ctx.strk().transfer(destination, amount);

        Ok(vec![claim, transfer])
    }
}
