use crate::blockchain::ChainClient;
use crate::config::GasSettings;
use crate::pacing::{sleep_random, WaitRange};
use crate::units::wei_to_gwei;
use tracing::{error, info, warn};

/// Blocks until the latest block's gas price is at or under the ceiling.
#[derive(Debug, Clone)]
pub struct GasGate {
    max_gas_price_wei: u128,
    wait: WaitRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateReport {
    pub polls: u32,
    pub admitted_price_wei: u128,
}

impl GasGate {
    pub fn new(max_gas_price_wei: u128, wait: WaitRange) -> Self {
        Self {
            max_gas_price_wei,
            wait,
        }
    }

    pub fn from_settings(settings: &GasSettings) -> Self {
        Self::new(u128::from(settings.max_gas_price_wei), settings.wait)
    }

    /// Polls without a retry ceiling. Read errors count as "price unknown".
    pub async fn admit<C: ChainClient + ?Sized>(&self, client: &C) -> GateReport {
        info!("⛽ Checking gas price...");
        let mut polls = 0;

        loop {
            polls += 1;
            match client.latest_gas_price().await {
                Ok(Some(price)) if price <= self.max_gas_price_wei => {
                    info!(
                        "✅ Gas price is normal | current: {:.3} gwei <= {:.3} gwei",
                        wei_to_gwei(price),
                        wei_to_gwei(self.max_gas_price_wei)
                    );
                    return GateReport {
                        polls,
                        admitted_price_wei: price,
                    };
                }
                Ok(Some(price)) => {
                    info!(
                        "⏳ Current gas price: {:.3} gwei > {:.3} gwei",
                        wei_to_gwei(price),
                        wei_to_gwei(self.max_gas_price_wei)
                    );
                }
                Ok(None) => {
                    warn!("⚠️ Latest block reports no gas price");
                }
                Err(e) => {
                    error!("❌ Failed to read gas price: {:#}", e);
                }
            }

            sleep_random(self.wait).await;
        }
    }
}
