use crate::units::parse_hex_felt;
use anyhow::{Context, Result};
use serde::Deserialize;
use starknet::core::types::Felt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Merkle proof of one address's allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimProof {
    /// Decimal token amount as published, e.g. `"100"` or `"12.5"`.
    pub amount: String,
    pub index: u64,
    pub path: Vec<Felt>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct RawProof {
    amount: RawAmount,
    index: u64,
    path: Vec<String>,
}

impl TryFrom<RawProof> for ClaimProof {
    type Error = anyhow::Error;

    fn try_from(raw: RawProof) -> Result<Self> {
        let amount = match raw.amount {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        let path = raw
            .path
            .iter()
            .map(|node| parse_hex_felt(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            amount,
            index: raw.index,
            path,
        })
    }
}

/// Read-only address → proof table, built once before a claim batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofBook {
    proofs: HashMap<Felt, ClaimProof>,
}

impl ProofBook {
    /// Merges the files in order; on a duplicate address the later file wins.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        info!("📂 Loading proof lists...");
        let mut book = ProofBook::default();
        for path in paths {
            let path = path.as_ref();
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read proof file {}", path.display()))?;
            let added = book
                .merge_json(&content)
                .with_context(|| format!("Invalid proof file {}", path.display()))?;
            info!("   {} proofs from {}", added, path.display());
        }
        info!("✅ {} proofs loaded", book.len());
        Ok(book)
    }

    /// Adds every entry of one JSON proof file, returning how many it held.
    pub fn merge_json(&mut self, content: &str) -> Result<usize> {
        let raw: HashMap<String, RawProof> = serde_json::from_str(content)?;
        let count = raw.len();
        for (address, proof) in raw {
            let key = parse_hex_felt(&address)
                .with_context(|| format!("Invalid address key {}", address))?;
            let proof = ClaimProof::try_from(proof)
                .with_context(|| format!("Invalid proof for {}", address))?;
            self.proofs.insert(key, proof);
        }
        Ok(count)
    }

    pub fn get(&self, address: Felt) -> Option<&ClaimProof> {
        self.proofs.get(&address)
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case_and_leading_zeros() {
        let mut book = ProofBook::default();
        book.merge_json(r#"{"0x00AbC": {"amount": "100", "index": 3, "path": ["0x1", "0x2"]}}"#)
            .unwrap();

        let proof = book.get(Felt::from(0xabcu64)).unwrap();
        assert_eq!(proof.amount, "100");
        assert_eq!(proof.index, 3);
        assert_eq!(proof.path, vec![Felt::from(1u8), Felt::from(2u8)]);
    }

    #[test]
    fn test_numeric_amounts_are_accepted() {
        let mut book = ProofBook::default();
        book.merge_json(r#"{"0x1": {"amount": 250.5, "index": 0, "path": []}}"#)
            .unwrap();
        assert_eq!(book.get(Felt::ONE).unwrap().amount, "250.5");
    }

    #[test]
    fn test_later_entries_win() {
        let mut book = ProofBook::default();
        book.merge_json(r#"{"0x1": {"amount": "1", "index": 0, "path": []}}"#)
            .unwrap();
        book.merge_json(r#"{"0x01": {"amount": "2", "index": 9, "path": []}}"#)
            .unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.get(Felt::ONE).unwrap().amount, "2");
    }

    #[test]
    fn test_bad_path_node_is_rejected() {
        let mut book = ProofBook::default();
        let result =
            book.merge_json(r#"{"0x1": {"amount": "1", "index": 0, "path": ["nothex"]}}"#);
        assert!(result.is_err());
    }
}
