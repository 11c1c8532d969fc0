use crate::account::WalletAccount;
use crate::units::felt_to_u128;
use anyhow::Result;
use async_trait::async_trait;
use starknet::accounts::{Account, Call, ExecutionEncoding, SingleOwnerAccount};
use starknet::core::types::{
    BlockId, BlockTag, ContractClass, ExecutionResult, Felt, FunctionCall,
    MaybePendingBlockWithTxHashes, StarknetError,
};
use starknet::providers::jsonrpc::{HttpTransport, JsonRpcClient};
use starknet::providers::{Provider, ProviderError, Url};
use starknet::signers::LocalWallet;
use tracing::info;

/// How an account packs several calls into its `__execute__` calldata.
/// Cairo 0 accounts take the legacy call-array layout, Cairo 1 accounts the
/// flat multicall layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEncoding {
    Legacy,
    Multicall,
}

impl From<CallEncoding> for ExecutionEncoding {
    fn from(encoding: CallEncoding) -> Self {
        match encoding {
            CallEncoding::Legacy => ExecutionEncoding::Legacy,
            CallEncoding::Multicall => ExecutionEncoding::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionStatus {
    Succeeded,
    Reverted(String),
}

/// Chain capabilities the workflows rely on. One value is one network
/// session; dropping it releases the connection.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current nonce, or `None` when the account contract does not exist yet.
    async fn nonce(&self, address: Felt) -> Result<Option<Felt>>;

    async fn call(&self, contract: Felt, selector: Felt, calldata: Vec<Felt>) -> Result<Vec<Felt>>;

    async fn execution_encoding(&self, address: Felt) -> Result<CallEncoding>;

    /// Overall fee in wei for an invoke carrying exactly `calls` at `nonce`.
    async fn estimate_fee(
        &self,
        account: &WalletAccount,
        calls: &[Call],
        nonce: Felt,
        encoding: CallEncoding,
    ) -> Result<u128>;

    /// Signs and broadcasts an invoke, estimating its max fee on the way.
    async fn send_invoke(
        &self,
        account: &WalletAccount,
        calls: Vec<Call>,
        nonce: Felt,
        encoding: CallEncoding,
        fee_multiplier: f64,
    ) -> Result<Felt>;

    /// `None` while the node does not know the transaction yet.
    async fn receipt_status(&self, tx_hash: Felt) -> Result<Option<InclusionStatus>>;

    /// L1 gas price (wei) reported by the latest block, if any.
    async fn latest_gas_price(&self) -> Result<Option<u128>>;
}

/// Opens a fresh session per wallet workflow.
#[async_trait]
pub trait Connect: Send + Sync {
    type Client: ChainClient;

    async fn connect(&self) -> Result<Self::Client>;
}

#[derive(Debug, Clone)]
pub struct StarknetConnector {
    rpc_url: Url,
}

impl StarknetConnector {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| anyhow::anyhow!("Invalid RPC URL {}: {}", rpc_url, e))?;
        Ok(Self { rpc_url })
    }
}

#[async_trait]
impl Connect for StarknetConnector {
    type Client = StarknetClient;

    async fn connect(&self) -> Result<StarknetClient> {
        StarknetClient::new(self.rpc_url.clone()).await
    }
}

pub struct StarknetClient {
    provider: JsonRpcClient<HttpTransport>,
    chain_id: Felt,
}

impl StarknetClient {
    pub async fn new(rpc_url: Url) -> Result<Self> {
        info!("🔗 Connecting to RPC: {}", rpc_url);

        let provider = JsonRpcClient::new(HttpTransport::new(rpc_url));
        let chain_id = provider
            .chain_id()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch chain id: {}", e))?;

        Ok(Self { provider, chain_id })
    }

    fn account_for(
        &self,
        account: &WalletAccount,
        encoding: CallEncoding,
    ) -> SingleOwnerAccount<&JsonRpcClient<HttpTransport>, LocalWallet> {
        let signer = LocalWallet::from_signing_key(account.signing_key().clone());
        let mut sn_account = SingleOwnerAccount::new(
            &self.provider,
            signer,
            account.address(),
            self.chain_id,
            encoding.into(),
        );
        sn_account.set_block_id(BlockId::Tag(BlockTag::Pending));
        sn_account
    }
}

#[async_trait]
impl ChainClient for StarknetClient {
    async fn nonce(&self, address: Felt) -> Result<Option<Felt>> {
        match self
            .provider
            .get_nonce(BlockId::Tag(BlockTag::Pending), address)
            .await
        {
            Ok(nonce) => Ok(Some(nonce)),
            Err(ProviderError::StarknetError(StarknetError::ContractNotFound)) => Ok(None),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to fetch nonce for {:#x}: {}",
                address,
                e
            )),
        }
    }

    async fn call(&self, contract: Felt, selector: Felt, calldata: Vec<Felt>) -> Result<Vec<Felt>> {
        self.provider
            .call(
                FunctionCall {
                    contract_address: contract,
                    entry_point_selector: selector,
                    calldata,
                },
                BlockId::Tag(BlockTag::Latest),
            )
            .await
            .map_err(|e| anyhow::anyhow!("Call to {:#x} failed: {}", contract, e))
    }

    async fn execution_encoding(&self, address: Felt) -> Result<CallEncoding> {
        let class = self
            .provider
            .get_class_at(BlockId::Tag(BlockTag::Pending), address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch class of {:#x}: {}", address, e))?;

        Ok(match class {
            ContractClass::Sierra(_) => CallEncoding::Multicall,
            ContractClass::Legacy(_) => CallEncoding::Legacy,
        })
    }

    async fn estimate_fee(
        &self,
        account: &WalletAccount,
        calls: &[Call],
        nonce: Felt,
        encoding: CallEncoding,
    ) -> Result<u128> {
        let sn_account = self.account_for(account, encoding);
        let estimate = sn_account
            .execute_v1(calls.to_vec())
            .nonce(nonce)
            .estimate_fee()
            .await
            .map_err(|e| anyhow::anyhow!("Fee estimation failed: {}", e))?;

        felt_to_u128(estimate.overall_fee)
    }

    async fn send_invoke(
        &self,
        account: &WalletAccount,
        calls: Vec<Call>,
        nonce: Felt,
        encoding: CallEncoding,
        fee_multiplier: f64,
    ) -> Result<Felt> {
        let sn_account = self.account_for(account, encoding);
        let result = sn_account
            .execute_v1(calls)
            .nonce(nonce)
            .fee_estimate_multiplier(fee_multiplier)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Invoke submission failed: {}", e))?;

        Ok(result.transaction_hash)
    }

    async fn receipt_status(&self, tx_hash: Felt) -> Result<Option<InclusionStatus>> {
        match self.provider.get_transaction_receipt(tx_hash).await {
            Ok(receipt) => Ok(Some(match receipt.receipt.execution_result() {
                ExecutionResult::Succeeded => InclusionStatus::Succeeded,
                ExecutionResult::Reverted { reason } => InclusionStatus::Reverted(reason.clone()),
            })),
            Err(ProviderError::StarknetError(StarknetError::TransactionHashNotFound)) => Ok(None),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to fetch receipt for {:#x}: {}",
                tx_hash,
                e
            )),
        }
    }

    async fn latest_gas_price(&self) -> Result<Option<u128>> {
        let block = self
            .provider
            .get_block_with_tx_hashes(BlockId::Tag(BlockTag::Latest))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch latest block: {}", e))?;

        let price = match block {
            MaybePendingBlockWithTxHashes::Block(block) => block.l1_gas_price.price_in_wei,
            MaybePendingBlockWithTxHashes::PendingBlock(block) => block.l1_gas_price.price_in_wei,
        };

        // Zero is a real price on fee-free networks
        Ok(Some(felt_to_u128(price)?))
    }
}
