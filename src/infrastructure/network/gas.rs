// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::EngineError;
use crate::common::parsing::gwei_to_wei;
use crate::domain::constants::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_GWEI, pad_gas_limit};
use crate::domain::types::BlockView;
use crate::infrastructure::network::chain::ChainClient;
use crate::services::markets::SafetyGate;
use alloy::rpc::types::eth::TransactionRequest;
use std::sync::Arc;

/// Fee fields for one transaction, under either fee model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeParams {
    Legacy {
        gas_price: u128,
    },
    FeeMarket {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl FeeParams {
    pub fn apply(&self, req: &mut TransactionRequest) {
        match *self {
            FeeParams::Legacy { gas_price } => {
                req.gas_price = Some(gas_price);
            }
            FeeParams::FeeMarket {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                req.max_fee_per_gas = Some(max_fee_per_gas);
                req.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
        }
    }
}

/// Combined gas price and padded limit for one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasPlan {
    pub gas_price: u128,
    pub gas: u64,
}

/// Computes gas parameters under both fee models. Estimation and dynamic
/// pricing never fail the caller; both fall back to fixed defaults.
#[derive(Clone)]
pub struct GasPlanner {
    chain: Arc<dyn ChainClient>,
    safety: Arc<dyn SafetyGate>,
    gas_price_multiplier: f64,
}

impl GasPlanner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        safety: Arc<dyn SafetyGate>,
        gas_price_multiplier: f64,
    ) -> Self {
        Self {
            chain,
            safety,
            gas_price_multiplier,
        }
    }

    /// Dynamic legacy gas price in wei: safety-gate price (or the fixed
    /// default when the gate is unreachable) scaled by the configured
    /// multiplier.
    pub async fn dynamic_gas_price(&self) -> u128 {
        let gas_price_gwei = match self.safety.dynamic_gas_price_gwei().await {
            Ok(gwei) => {
                tracing::debug!(target: "gas", gwei, "Fetched dynamic gas price");
                gwei
            }
            Err(e) => {
                tracing::warn!(target: "gas", error = %e, "Dynamic gas price unavailable, using default");
                DEFAULT_GAS_PRICE_GWEI as f64
            }
        };
        let wei = gwei_to_wei(gas_price_gwei * self.gas_price_multiplier);
        if wei == 0 {
            // A request must never go out with a zero gas price.
            return gwei_to_wei(DEFAULT_GAS_PRICE_GWEI as f64 * self.gas_price_multiplier);
        }
        wei
    }

    /// Estimate the gas for a request, falling back to the default limit on
    /// any estimation or simulation failure.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> u64 {
        match self.chain.estimate_gas(tx).await {
            Ok(estimate) => {
                tracing::debug!(target: "gas", estimate, "Estimated gas");
                estimate
            }
            Err(e) => {
                tracing::debug!(target: "gas", error = %e, "Gas estimation failed, using default limit");
                DEFAULT_GAS_LIMIT
            }
        }
    }

    /// Centralized gas parameters: dynamic price plus the padded estimate
    /// (or the supplied limit). Never fails.
    pub async fn build_gas_parameters(
        &self,
        tx: &TransactionRequest,
        gas_limit: Option<u64>,
    ) -> GasPlan {
        let gas_price = self.dynamic_gas_price().await;
        let estimated = match gas_limit {
            Some(limit) => limit,
            None => self.estimate_gas(tx).await,
        };
        GasPlan {
            gas_price,
            gas: pad_gas_limit(estimated),
        }
    }

    /// Select fee fields from the latest block: fee-market parameters when
    /// a base fee is exposed, the dynamic legacy price otherwise.
    pub async fn fee_params(&self, block: &BlockView) -> Result<FeeParams, EngineError> {
        if let Some(base_fee) = block.base_fee_per_gas {
            let priority = self.chain.max_priority_fee().await?;
            return Ok(FeeParams::FeeMarket {
                max_fee_per_gas: base_fee.saturating_mul(2),
                max_priority_fee_per_gas: priority,
            });
        }
        Ok(FeeParams::Legacy {
            gas_price: self.dynamic_gas_price().await,
        })
    }
}
