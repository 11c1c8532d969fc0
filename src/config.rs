use crate::pacing::WaitRange;
use crate::retry::RetryConfig;
use crate::units::parse_hex_felt;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml::map::Map;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    pub chain: ChainSettings,
    pub contracts: ContractAddresses,
    pub gas: GasSettings,
    pub pacing: PacingSettings,
    pub retry: RetrySettings,
    pub monitoring: MonitoringSettings,
    #[serde(default)]
    pub fees: FeeSettings,
    pub recovery: RecoverySettings,
    pub inputs: InputSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSettings {
    pub rpc_url: String,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractAddresses {
    pub provisions_address: String,
    pub strk_address: String,
    pub eth_address: String,
    pub account_class_hash: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasSettings {
    pub max_gas_price_wei: u64,
    pub wait: WaitRange,
    #[serde(default)]
    pub gate_transactions: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacingSettings {
    pub account_wait: WaitRange,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub wait: WaitRange,
    #[serde(default)]
    pub wrap_submissions: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringSettings {
    pub poll_interval_seconds: u64,
    pub transaction_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeSettings {
    pub multiplier: f64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecoverySettings {
    pub url: String,
    pub network: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputSettings {
    pub wallets_path: PathBuf,
    pub proofs_dir: PathBuf,
    pub proof_file_count: usize,
}

/// Contract addresses parsed into field elements once, after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractSet {
    pub provisions: Felt,
    pub strk: Felt,
    pub eth: Felt,
    pub account_class_hash: Felt,
}

impl KeeperConfig {
    pub fn load(path: &str) -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        // Common settings live next to the selected config file
        let common_content = Self::load_common_config(Path::new(path))?;

        let specific_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;

        // Specific config overrides common
        let merged_content = Self::merge_configs(common_content, specific_content)?;

        let content = Self::substitute_env_vars(merged_content)?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: KeeperConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn load_common_config(path: &Path) -> Result<String> {
        let common_path = path
            .parent()
            .map(|dir| dir.join("common.toml"))
            .unwrap_or_else(|| PathBuf::from("common.toml"));
        if common_path == path {
            return Ok(String::new());
        }
        match fs::read_to_string(&common_path) {
            Ok(content) => Ok(content),
            // No common.toml is fine, the specific file must then be complete
            Err(_) => Ok(String::new()),
        }
    }

    fn merge_configs(common: String, specific: String) -> Result<String> {
        if common.is_empty() {
            return Ok(specific);
        }

        let common_toml: toml::Value = toml::from_str(&common)?;
        let specific_toml: toml::Value = toml::from_str(&specific)?;

        let merged = Self::merge_toml_values(common_toml, specific_toml);

        let merged_toml = toml::to_string_pretty(&merged)?;
        Ok(merged_toml)
    }

    fn merge_toml_values(mut base: toml::Value, override_val: toml::Value) -> toml::Value {
        match (&mut base, override_val) {
            (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
                for (key, value) in override_map {
                    let merged = Self::merge_toml_values(
                        base_map
                            .get(&key)
                            .cloned()
                            .unwrap_or(toml::Value::Table(Map::new())),
                        value,
                    );
                    base_map.insert(key, merged);
                }
                base
            }
            (_, override_val) => override_val,
        }
    }

    fn substitute_env_vars(content: String) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
        let mut result = content.clone();

        for cap in re.captures_iter(&content) {
            let var_name = &cap[1];
            if let Ok(value) = env::var(var_name) {
                let placeholder = cap[0].to_string();
                result = result.replace(&placeholder, &value);
            }
        }

        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        if self.chain.rpc_url.contains("${") {
            return Err(anyhow::anyhow!(
                "RPC URL still contains an unresolved placeholder: {}",
                self.chain.rpc_url
            ));
        }
        url::Url::parse(&self.chain.rpc_url)
            .with_context(|| format!("Invalid RPC URL {}", self.chain.rpc_url))?;
        if self.retry.max_attempts == 0 {
            return Err(anyhow::anyhow!("retry.max_attempts must be at least 1"));
        }
        if self.monitoring.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!(
                "monitoring.poll_interval_seconds must be at least 1"
            ));
        }
        if !(self.fees.multiplier >= 1.0) {
            return Err(anyhow::anyhow!(
                "fees.multiplier must be >= 1.0, got {}",
                self.fees.multiplier
            ));
        }
        self.contract_set()?;
        Ok(())
    }

    pub fn contract_set(&self) -> Result<ContractSet> {
        Ok(ContractSet {
            provisions: parse_felt(&self.contracts.provisions_address, "provisions_address")?,
            strk: parse_felt(&self.contracts.strk_address, "strk_address")?,
            eth: parse_felt(&self.contracts.eth_address, "eth_address")?,
            account_class_hash: parse_felt(
                &self.contracts.account_class_hash,
                "account_class_hash",
            )?,
        })
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retry.max_attempts, self.retry.wait)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring.poll_interval_seconds)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.monitoring.transaction_timeout_seconds)
    }

    pub fn explorer_link(&self, tx_hash: Felt) -> String {
        format!(
            "{}/{:#x}",
            self.chain.explorer_url.trim_end_matches('/'),
            tx_hash
        )
    }

    pub fn proof_files(&self) -> Vec<PathBuf> {
        (0..self.inputs.proof_file_count)
            .map(|i| self.inputs.proofs_dir.join(format!("starknet-{}.json", i)))
            .collect()
    }
}

fn parse_felt(value: &str, field: &str) -> Result<Felt> {
    parse_hex_felt(value).with_context(|| format!("Invalid contracts.{}", field))
}
