use crate::account::Wallet;
use anyhow::Result;
use std::fmt::Debug;
use std::future::Future;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<T> {
    pub total: usize,
    pub malformed: usize,
    /// Outcomes of the wallets whose workflow returned normally, in list order.
    pub completed: Vec<T>,
    pub failed: usize,
}

impl<T> BatchReport<T> {
    /// Wallets that got as far as running a workflow.
    pub fn attempted(&self) -> usize {
        self.completed.len() + self.failed
    }
}

/// Runs one workflow per wallet record, strictly one after another. Nothing a
/// single wallet does can stop the batch.
pub struct WalletBatchRunner;

impl WalletBatchRunner {
    pub async fn run<F, Fut, T>(records: &[String], mut process: F) -> BatchReport<T>
    where
        F: FnMut(Wallet) -> Fut,
        Fut: Future<Output = Result<T>>,
        T: Debug,
    {
        let total = records.len();
        let mut report = BatchReport {
            total,
            malformed: 0,
            completed: Vec::new(),
            failed: 0,
        };

        if total == 0 {
            warn!("📭 No private keys found");
            return report;
        }

        info!("🔑 Found {} private keys", total);
        info!("🚀 Running...");

        for (i, record) in records.iter().enumerate() {
            info!("👛 Wallet pair {}/{}", i + 1, total);

            let wallet: Wallet = match record.parse() {
                Ok(wallet) => wallet,
                Err(e) => {
                    error!(
                        "❌ Not a valid private key pair on line {}: {:#}. Skipping...",
                        i + 1,
                        e
                    );
                    report.malformed += 1;
                    continue;
                }
            };

            match process(wallet).await {
                Ok(outcome) => {
                    info!("📋 Wallet {}/{} finished: {:?}", i + 1, total, outcome);
                    report.completed.push(outcome);
                }
                Err(e) => {
                    error!("❌ Wallet {}/{} failed: {:#}. Continuing...", i + 1, total, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "🏁 Batch done: {} wallets, {} malformed, {} finished, {} failed",
            report.total,
            report.malformed,
            report.completed.len(),
            report.failed
        );
        report
    }
}
