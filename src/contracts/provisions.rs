use crate::proofs::ClaimProof;
use anyhow::{Context, Result};
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starknet::macros::selector;

/// The STRK provisions contract that pays out merkle-authenticated allocations.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionsContract {
    address: Felt,
}

impl ProvisionsContract {
    pub fn new(address: Felt) -> Self {
        Self { address }
    }

    /// `claim({identity, balance, index, merkle_path})` for `identity`, with
    /// `balance` already converted to the token's smallest unit.
    pub fn claim(&self, identity: Felt, balance: u128, proof: &ClaimProof) -> Result<Call> {
        let index = u128::from(proof.index);
        let path_len = u64::try_from(proof.path.len()).context("merkle path too long")?;

        let mut calldata = Vec::with_capacity(4 + proof.path.len());
        calldata.push(identity);
        calldata.push(Felt::from(balance));
        calldata.push(Felt::from(index));
        calldata.push(Felt::from(path_len));
        calldata.extend_from_slice(&proof.path);

        Ok(Call {
            to: self.address,
            selector: selector!("claim"),
            calldata,
        })
    }
}
