// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::EngineError;
use crate::domain::types::{MarketConditions, TargetTransaction};
use alloy::primitives::Address;
use async_trait::async_trait;

/// Profitability and gas-price guardrails, provided by an external service.
#[async_trait]
pub trait SafetyGate: Send + Sync {
    async fn dynamic_gas_price_gwei(&self) -> Result<f64, EngineError>;
    async fn balance_eth(&self, account: Address) -> Result<f64, EngineError>;
    async fn stop(&self) -> Result<(), EngineError>;
}

/// Real-time and historical market data, provided by an external service.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    async fn token_symbol(&self, token: Address) -> Result<Option<String>, EngineError>;
    async fn real_time_price(&self, symbol: &str) -> Result<f64, EngineError>;
    /// Historical price series for the symbol over the given window.
    async fn price_history(
        &self,
        symbol: &str,
        timeframe_hours: u32,
    ) -> Result<Vec<f64>, EngineError>;
    async fn token_volume_24h(&self, symbol: &str) -> Result<f64, EngineError>;
    async fn price_change_24h(&self, symbol: &str) -> Result<f64, EngineError>;
}

/// Market-condition flags and predictive signals, provided by an external
/// service.
#[async_trait]
pub trait MarketWatch: Send + Sync {
    async fn market_conditions(&self, venue: Address) -> Result<MarketConditions, EngineError>;
    async fn predict_price(&self, symbol: &str) -> Result<f64, EngineError>;
    async fn is_arbitrage_opportunity(
        &self,
        tx: &TargetTransaction,
    ) -> Result<bool, EngineError>;
}

/// Config-backed gate for dry runs and preflight checks; answers with a
/// fixed gas price and never reports a balance.
pub struct StaticSafetyGate {
    gas_price_gwei: f64,
}

impl StaticSafetyGate {
    pub fn new(gas_price_gwei: f64) -> Self {
        Self { gas_price_gwei }
    }
}

#[async_trait]
impl SafetyGate for StaticSafetyGate {
    async fn dynamic_gas_price_gwei(&self) -> Result<f64, EngineError> {
        Ok(self.gas_price_gwei)
    }

    async fn balance_eth(&self, _account: Address) -> Result<f64, EngineError> {
        Err(EngineError::Connection(
            "Static safety gate has no balance source".into(),
        ))
    }

    async fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
