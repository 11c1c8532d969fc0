#![allow(dead_code)]

use alloy::primitives::U256;
use anyhow::Result;
use async_trait::async_trait;
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starknet::macros::selector;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use strk_airdrop_keeper::account::WalletAccount;
use strk_airdrop_keeper::blockchain::{CallEncoding, ChainClient, Connect, InclusionStatus};
use strk_airdrop_keeper::KeeperConfig;

pub const EXPLORER_URL: &str = "https://voyager.online/tx";

/// Test config with no pacing delays and a recovery service that refuses
/// connections, so addresses always come from the counterfactual formula.
pub fn test_config() -> KeeperConfig {
    KeeperConfig::from_toml_str(
        r#"
        [chain]
        rpc_url = "http://127.0.0.1:1"
        explorer_url = "https://voyager.online/tx"

        [contracts]
        provisions_address = "0x06793d9e6ed7182978454c79270e5b14d2655204ba6565ce9b0aa8a3c3121025"
        strk_address = "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d"
        eth_address = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7"
        account_class_hash = "0x01a736d6ed154502257f02b1ccdf4d9d1089f80811cd6acad48e6b6a9d1f2003"

        [gas]
        max_gas_price_wei = 50
        wait = [0, 0]

        [pacing]
        account_wait = [0, 0]

        [retry]
        max_attempts = 3
        wait = [0, 0]

        [monitoring]
        poll_interval_seconds = 1
        transaction_timeout_seconds = 0

        [fees]
        multiplier = 1.0

        [recovery]
        url = "http://127.0.0.1:9/pubkey-to-address/"
        network = "mainnet-alpha"
        timeout_seconds = 1

        [inputs]
        wallets_path = "privkeys.txt"
        proofs_dir = "proofs"
        proof_file_count = 0
        "#,
    )
    .expect("test config must parse")
}

#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub sender: Felt,
    pub calls: Vec<Call>,
    pub nonce: Felt,
    pub encoding: CallEncoding,
}

/// Scripted chain state shared by every session a test opens.
pub struct MockChain {
    pub deployed: Mutex<bool>,
    pub nonce: Mutex<u64>,
    pub eth_balance: Mutex<U256>,
    /// `None` makes fee estimation fail.
    pub overall_fee: Mutex<Option<u128>>,
    pub receipt: Mutex<Option<InclusionStatus>>,
    /// Encoding the account class reports.
    pub encoding: Mutex<CallEncoding>,
    pub estimate_encodings: Mutex<Vec<CallEncoding>>,
    pub gas_prices: Mutex<VecDeque<Result<Option<u128>, String>>>,
    pub gas_polls: AtomicU32,
    pub estimates: Mutex<Vec<Vec<Call>>>,
    pub submitted: Mutex<Vec<SubmittedTx>>,
    pub balance_reads: AtomicU32,
    pub connects: AtomicU32,
    pub sessions_closed: AtomicU32,
    pub fail_connect: Mutex<bool>,
    pub next_tx_hash: Mutex<u64>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            deployed: Mutex::new(true),
            nonce: Mutex::new(5),
            eth_balance: Mutex::new(U256::ZERO),
            overall_fee: Mutex::new(Some(1_000)),
            receipt: Mutex::new(Some(InclusionStatus::Succeeded)),
            encoding: Mutex::new(CallEncoding::Multicall),
            estimate_encodings: Mutex::new(Vec::new()),
            gas_prices: Mutex::new(VecDeque::new()),
            gas_polls: AtomicU32::new(0),
            estimates: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            balance_reads: AtomicU32::new(0),
            connects: AtomicU32::new(0),
            sessions_closed: AtomicU32::new(0),
            fail_connect: Mutex::new(false),
            next_tx_hash: Mutex::new(0xabc0),
        }
    }
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_balance(self: &Arc<Self>, balance: U256) -> Arc<Self> {
        *self.eth_balance.lock().unwrap() = balance;
        self.clone()
    }

    pub fn with_gas_prices(self: &Arc<Self>, prices: Vec<Result<Option<u128>, String>>) -> Arc<Self> {
        *self.gas_prices.lock().unwrap() = prices.into();
        self.clone()
    }

    pub fn submitted(&self) -> Vec<SubmittedTx> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn estimates(&self) -> Vec<Vec<Call>> {
        self.estimates.lock().unwrap().clone()
    }

    pub fn with_encoding(self: &Arc<Self>, encoding: CallEncoding) -> Arc<Self> {
        *self.encoding.lock().unwrap() = encoding;
        self.clone()
    }

    pub fn estimate_encodings(&self) -> Vec<CallEncoding> {
        self.estimate_encodings.lock().unwrap().clone()
    }
}

pub struct MockSession(pub Arc<MockChain>);

impl Drop for MockSession {
    fn drop(&mut self) {
        self.0.sessions_closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainClient for MockSession {
    async fn nonce(&self, _address: Felt) -> Result<Option<Felt>> {
        if !*self.0.deployed.lock().unwrap() {
            return Ok(None);
        }
        Ok(Some(Felt::from(*self.0.nonce.lock().unwrap())))
    }

    async fn call(&self, _contract: Felt, selector: Felt, _calldata: Vec<Felt>) -> Result<Vec<Felt>> {
        if selector == selector!("balanceOf") {
            self.0.balance_reads.fetch_add(1, Ordering::SeqCst);
            let balance = *self.0.eth_balance.lock().unwrap();
            let low = (balance & U256::from(u128::MAX)).to::<u128>();
            let high = (balance >> 128usize).to::<u128>();
            return Ok(vec![Felt::from(low), Felt::from(high)]);
        }
        Err(anyhow::anyhow!("unexpected call selector {:#x}", selector))
    }

    async fn execution_encoding(&self, _address: Felt) -> Result<CallEncoding> {
        Ok(*self.0.encoding.lock().unwrap())
    }

    async fn estimate_fee(
        &self,
        _account: &WalletAccount,
        calls: &[Call],
        _nonce: Felt,
        encoding: CallEncoding,
    ) -> Result<u128> {
        self.0.estimates.lock().unwrap().push(calls.to_vec());
        self.0.estimate_encodings.lock().unwrap().push(encoding);
        (*self.0.overall_fee.lock().unwrap())
            .ok_or_else(|| anyhow::anyhow!("simulated estimation failure"))
    }

    async fn send_invoke(
        &self,
        account: &WalletAccount,
        calls: Vec<Call>,
        nonce: Felt,
        encoding: CallEncoding,
        _fee_multiplier: f64,
    ) -> Result<Felt> {
        self.0.submitted.lock().unwrap().push(SubmittedTx {
            sender: account.address(),
            calls,
            nonce,
            encoding,
        });
        *self.0.nonce.lock().unwrap() += 1;
        let mut next = self.0.next_tx_hash.lock().unwrap();
        let hash = Felt::from(*next);
        *next += 1;
        Ok(hash)
    }

    async fn receipt_status(&self, _tx_hash: Felt) -> Result<Option<InclusionStatus>> {
        Ok(self.0.receipt.lock().unwrap().clone())
    }

    async fn latest_gas_price(&self) -> Result<Option<u128>> {
        self.0.gas_polls.fetch_add(1, Ordering::SeqCst);
        match self.0.gas_prices.lock().unwrap().pop_front() {
            Some(Ok(price)) => Ok(price),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Some(0)),
        }
    }
}

pub struct MockConnector(pub Arc<MockChain>);

#[async_trait]
impl Connect for MockConnector {
    type Client = MockSession;

    async fn connect(&self) -> Result<MockSession> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        if *self.0.fail_connect.lock().unwrap() {
            return Err(anyhow::anyhow!("simulated RPC outage"));
        }
        Ok(MockSession(self.0.clone()))
    }
}
