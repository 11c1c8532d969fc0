use crate::blockchain::ChainClient;
use crate::units::{u256_from_felts, u256_to_felts};
use alloy::primitives::U256;
use anyhow::Result;
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starknet::macros::selector;

#[derive(Debug, Clone, Copy)]
pub struct ERC20Contract {
    address: Felt,
}

impl ERC20Contract {
    pub fn new(address: Felt) -> Self {
        Self { address }
    }

    pub async fn balance_of<C: ChainClient + ?Sized>(&self, client: &C, account: Felt) -> Result<U256> {
        let result = client
            .call(self.address, selector!("balanceOf"), vec![account])
            .await?;

        // u256 comes back as (low, high)
        match result.as_slice() {
            [low, high, ..] => u256_from_felts(*low, *high),
            _ => Err(anyhow::anyhow!(
                "Unexpected balanceOf response from {:#x}: {} felts",
                self.address,
                result.len()
            )),
        }
    }

    pub fn transfer(&self, recipient: Felt, amount: U256) -> Call {
        let (low, high) = u256_to_felts(amount);
        Call {
            to: self.address,
            selector: selector!("transfer"),
            calldata: vec![recipient, low, high],
        }
    }
}
