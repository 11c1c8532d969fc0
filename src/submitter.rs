use crate::account::WalletAccount;
use crate::blockchain::ChainClient;
use crate::config::KeeperConfig;
use crate::gas_gate::GasGate;
use crate::retry::{execute_with_retry, RetryConfig};
use crate::transaction_monitor::{TransactionMonitor, TransactionStatus};
use anyhow::Result;
use starknet::accounts::Call;
use starknet::core::types::Felt;
use tracing::{info, warn};

/// Signs, sends and waits for one invoke transaction.
///
/// Submission is not idempotent: if a send errors after the node accepted it,
/// sending again can land twice. Retrying is therefore opt-in.
pub struct TransactionSubmitter {
    monitor: TransactionMonitor,
    fee_multiplier: f64,
    gas_gate: Option<GasGate>,
    retry: Option<RetryConfig>,
}

impl TransactionSubmitter {
    pub fn new(monitor: TransactionMonitor, fee_multiplier: f64) -> Self {
        Self {
            monitor,
            fee_multiplier,
            gas_gate: None,
            retry: None,
        }
    }

    pub fn with_gas_gate(mut self, gate: GasGate) -> Self {
        self.gas_gate = Some(gate);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn from_config(config: &KeeperConfig) -> Self {
        let monitor = TransactionMonitor::new(config.transaction_timeout(), config.poll_interval());
        let mut submitter = Self::new(monitor, config.fees.multiplier);
        if config.gas.gate_transactions {
            submitter = submitter.with_gas_gate(GasGate::from_settings(&config.gas));
        }
        if config.retry.wrap_submissions {
            submitter = submitter.with_retry(config.retry_config());
        }
        submitter
    }

    /// Returns the hash of the confirmed transaction.
    pub async fn submit<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: &WalletAccount,
        calls: Vec<Call>,
    ) -> Result<Felt> {
        match &self.retry {
            Some(retry) => {
                warn!("🔁 Submission retries enabled, check the explorer for duplicates");
                execute_with_retry(
                    || self.submit_once(client, account, calls.clone()),
                    retry,
                    "Transaction submission",
                )
                .await
                .into_result("Transaction submission")
            }
            None => self.submit_once(client, account, calls).await,
        }
    }

    async fn submit_once<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: &WalletAccount,
        calls: Vec<Call>,
    ) -> Result<Felt> {
        if let Some(gate) = &self.gas_gate {
            gate.admit(client).await;
        }

        let address = account.address();
        let encoding = client.execution_encoding(address).await?;
        // Read right before signing so back-to-back submissions never share a nonce
        let nonce = client
            .nonce(address)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account {:#x} is not deployed", address))?;

        let tx_hash = client
            .send_invoke(account, calls, nonce, encoding, self.fee_multiplier)
            .await?;
        info!("📤 Transaction sent: {:#x} (nonce {:#x})", tx_hash, nonce);

        let receipt = self.monitor.monitor_transaction(client, tx_hash).await?;
        match receipt.status {
            TransactionStatus::Success => Ok(receipt.hash),
            TransactionStatus::Reverted(reason) => Err(anyhow::anyhow!(
                "Transaction {:#x} reverted: {}",
                receipt.hash,
                reason
            )),
            TransactionStatus::Timeout => Err(anyhow::anyhow!(
                "Transaction {:#x} not confirmed in time, outcome unknown; check the explorer before resubmitting",
                receipt.hash
            )),
        }
    }
}
