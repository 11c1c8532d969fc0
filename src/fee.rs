use crate::account::WalletAccount;
use crate::blockchain::ChainClient;
use anyhow::Result;
use starknet::accounts::Call;

/// Sizes the max fee of a call set right before it is used.
#[derive(Debug, Clone, Copy)]
pub struct FeeEstimator {
    multiplier: f64,
}

impl FeeEstimator {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Max fee in wei for an invoke carrying exactly `calls`, encoded the way
    /// the account's class expects, at the account's current nonce.
    pub async fn estimate<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: &WalletAccount,
        calls: &[Call],
    ) -> Result<u128> {
        let encoding = client.execution_encoding(account.address()).await?;
        let nonce = client.nonce(account.address()).await?.ok_or_else(|| {
            anyhow::anyhow!("Account {:#x} is not deployed", account.address())
        })?;

        let overall_fee = client
            .estimate_fee(account, calls, nonce, encoding)
            .await?;

        Ok(self.apply_multiplier(overall_fee))
    }

    pub fn apply_multiplier(&self, overall_fee: u128) -> u128 {
        (overall_fee as f64 * self.multiplier) as u128
    }
}
