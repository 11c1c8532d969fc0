use crate::blockchain::{ChainClient, InclusionStatus};
use anyhow::Result;
use starknet::core::types::Felt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub hash: Felt,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    Success,
    Reverted(String),
    Timeout,
}

pub struct TransactionMonitor {
    max_wait_time: Duration,
    poll_interval: Duration,
}

impl TransactionMonitor {
    pub fn new(max_wait_time: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait_time,
            poll_interval,
        }
    }

    pub async fn monitor_transaction<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        tx_hash: Felt,
    ) -> Result<TransactionReceipt> {
        info!("🔍 Monitoring transaction: {:#x}", tx_hash);

        let start_time = Instant::now();

        loop {
            match client.receipt_status(tx_hash).await {
                Ok(Some(InclusionStatus::Succeeded)) => {
                    info!("✅ Transaction confirmed: {:#x}", tx_hash);
                    return Ok(TransactionReceipt {
                        hash: tx_hash,
                        status: TransactionStatus::Success,
                    });
                }
                Ok(Some(InclusionStatus::Reverted(reason))) => {
                    warn!("❌ Transaction reverted: {:#x} ({})", tx_hash, reason);
                    return Ok(TransactionReceipt {
                        hash: tx_hash,
                        status: TransactionStatus::Reverted(reason),
                    });
                }
                Ok(None) => {
                    info!("⏳ Transaction pending, waiting...");
                }
                Err(e) => {
                    // Node hiccups are not a verdict on the transaction
                    warn!("❌ Error checking transaction status: {:#}", e);
                }
            }

            if start_time.elapsed() + self.poll_interval > self.max_wait_time {
                warn!(
                    "⏰ Transaction monitoring timeout after {:?}",
                    self.max_wait_time
                );
                return Ok(TransactionReceipt {
                    hash: tx_hash,
                    status: TransactionStatus::Timeout,
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}
