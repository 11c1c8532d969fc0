pub mod account;
pub mod blockchain;
pub mod config;
pub mod contracts;
pub mod fee;
pub mod gas_gate;
pub mod jobs;
pub mod pacing;
pub mod proofs;
pub mod retry;
pub mod submitter;
pub mod transaction_monitor;
pub mod units;

pub use account::{AccountResolver, Wallet, WalletAccount};
pub use blockchain::{ChainClient, Connect, StarknetClient, StarknetConnector};
pub use config::KeeperConfig;
pub use gas_gate::GasGate;
pub use jobs::{ClaimJob, JobContext, WalletBatchRunner, WithdrawJob};
pub use proofs::{ClaimProof, ProofBook};
pub use retry::{execute_with_retry, RetryConfig, RetryOutcome};
pub use submitter::TransactionSubmitter;
pub use transaction_monitor::{TransactionMonitor, TransactionReceipt, TransactionStatus};
