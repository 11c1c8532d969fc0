use crate::config::KeeperConfig;
use crate::units::parse_hex_felt;
use anyhow::{Context, Result};
use serde::Deserialize;
use starknet::core::types::Felt;
use starknet::core::utils::get_contract_address;
use starknet::signers::SigningKey;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// One `privateKey:destinationAddress` entry of the wallet list.
#[derive(Clone, PartialEq, Eq)]
pub struct Wallet {
    pub private_key: Felt,
    pub destination: Felt,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("private_key", &"<redacted>")
            .field("destination", &format_args!("{:#x}", self.destination))
            .finish()
    }
}

impl FromStr for Wallet {
    type Err = anyhow::Error;

    fn from_str(record: &str) -> Result<Self> {
        let mut parts = record.trim().split(':');
        let (key, destination) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(destination), None) => (key, destination),
            _ => {
                return Err(anyhow::anyhow!(
                    "expected exactly one ':' between private key and destination"
                ))
            }
        };

        let private_key = parse_hex_felt(key).context("private key")?;
        let destination = parse_hex_felt(destination).context("destination address")?;
        if private_key == Felt::ZERO {
            return Err(anyhow::anyhow!("private key must not be zero"));
        }

        Ok(Self {
            private_key,
            destination,
        })
    }
}

impl Wallet {
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_secret_scalar(self.private_key)
    }
}

/// Reads the wallet list, dropping blank lines and `#` comments.
pub fn load_wallet_records(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read wallet list {}", path.display()))?;
    Ok(parse_wallet_records(&content))
}

pub fn parse_wallet_records(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// A wallet's resolved on-chain identity and its signing key.
#[derive(Clone)]
pub struct WalletAccount {
    address: Felt,
    signing_key: SigningKey,
}

impl fmt::Debug for WalletAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAccount")
            .field("address", &format_args!("{:#x}", self.address))
            .finish_non_exhaustive()
    }
}

impl WalletAccount {
    pub fn new(address: Felt, signing_key: SigningKey) -> Self {
        Self {
            address,
            signing_key,
        }
    }

    pub fn address(&self) -> Felt {
        self.address
    }

    pub fn public_key(&self) -> Felt {
        self.signing_key.verifying_key().scalar()
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

#[derive(Debug, Deserialize)]
struct RecoveryResponse {
    #[serde(default)]
    address: Vec<String>,
}

/// Maps key material to an account address. The wallet recovery service is
/// asked first; any miss falls through to the counterfactual deployment
/// address of the configured account class.
#[derive(Clone)]
pub struct AccountResolver {
    http: reqwest::Client,
    recovery_url: String,
    network: String,
    class_hash: Felt,
}

impl AccountResolver {
    pub fn new(
        recovery_url: impl Into<String>,
        network: impl Into<String>,
        class_hash: Felt,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build recovery service HTTP client")?;
        Ok(Self {
            http,
            recovery_url: recovery_url.into(),
            network: network.into(),
            class_hash,
        })
    }

    pub fn from_config(config: &KeeperConfig) -> Result<Self> {
        let contracts = config.contract_set()?;
        Self::new(
            config.recovery.url.clone(),
            config.recovery.network.clone(),
            contracts.account_class_hash,
            Duration::from_secs(config.recovery.timeout_seconds),
        )
    }

    pub async fn resolve(&self, signing_key: &SigningKey) -> WalletAccount {
        let public_key = signing_key.verifying_key().scalar();

        let address = match self.lookup_recovered_address(public_key).await {
            Ok(Some(address)) => address,
            Ok(None) => self.counterfactual_address(public_key),
            Err(e) => {
                warn!("⚠️ Recovery lookup failed, computing address locally: {:#}", e);
                self.counterfactual_address(public_key)
            }
        };

        WalletAccount::new(address, signing_key.clone())
    }

    /// Deployment address for `class_hash` with the public key as salt and
    /// `[pubkey, 0]` as constructor calldata, deployed from the zero address.
    pub fn counterfactual_address(&self, public_key: Felt) -> Felt {
        get_contract_address(
            public_key,
            self.class_hash,
            &[public_key, Felt::ZERO],
            Felt::ZERO,
        )
    }

    async fn lookup_recovered_address(&self, public_key: Felt) -> Result<Option<Felt>> {
        let public_key_hex = format!("{:#x}", public_key);
        let response = self
            .http
            .get(&self.recovery_url)
            .query(&[
                ("network", self.network.as_str()),
                ("pubkey", public_key_hex.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            info!(
                "Recovery service answered {} for {}",
                response.status(),
                public_key_hex
            );
            return Ok(None);
        }

        let body: RecoveryResponse = response.json().await?;
        match body.address.first() {
            Some(first) => Ok(Some(parse_hex_felt(first)?)),
            None => Ok(None),
        }
    }
}
