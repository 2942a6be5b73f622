// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants::{KNOWN_ROUTERS, SUSHISWAP_ROUTER, UNISWAP_V2_ROUTER};
use crate::domain::error::EngineError;
use crate::services::strategy::builder::ExecutionSettings;
use crate::services::strategy::bundle::RelayEndpoint;
use crate::services::strategy::executor::StrategySettings;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,

    // Identity
    pub wallet_key: String,
    pub bundle_signer_key: Option<String>,

    // Endpoints
    pub http_provider: String,
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayEndpoint>,
    #[serde(default = "default_relay_timeout_secs")]
    pub relay_timeout_secs: u64,

    // Contracts
    pub flashloan_address: Address,
    #[serde(default = "default_uniswap_router")]
    pub uniswap_router: Address,
    #[serde(default = "default_sushiswap_router")]
    pub sushiswap_router: Address,

    // Transaction
    #[serde(default = "default_gas_price_multiplier")]
    pub gas_price_multiplier: f64,
    #[serde(default = "default_max_gas")]
    pub max_gas_price_gwei: u64,
    #[serde(default = "default_cancel_gas")]
    pub cancel_gas_price_gwei: u64,
    #[serde(default = "default_native_transfer_multiplier")]
    pub native_transfer_gas_multiplier: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    // Strategy thresholds
    #[serde(default = "default_min_profit")]
    pub min_profit_eth: f64,
    #[serde(default = "default_flashloan_pct")]
    pub flashloan_profit_percentage: f64,
    #[serde(default = "default_aggressive_min_value")]
    pub aggressive_front_run_min_value_eth: f64,
    #[serde(default = "default_risk_threshold")]
    pub aggressive_front_run_risk_threshold: f64,
    #[serde(default = "default_opportunity_threshold")]
    pub front_run_opportunity_score_threshold: f64,
    #[serde(default = "default_volatility_threshold")]
    pub volatility_front_run_score_threshold: f64,
    #[serde(default = "default_price_dip_threshold")]
    pub price_dip_back_run_threshold: f64,
    #[serde(default = "default_momentum_threshold")]
    pub price_boost_momentum_threshold: f64,
    #[serde(default = "default_sandwich_gas_threshold")]
    pub sandwich_gas_price_threshold_gwei: f64,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_relay_timeout_secs() -> u64 {
    30
}
fn default_gas_price_multiplier() -> f64 {
    1.1
}
fn default_max_gas() -> u64 {
    500
}
fn default_cancel_gas() -> u64 {
    60
}
fn default_native_transfer_multiplier() -> f64 {
    1.1
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_min_profit() -> f64 {
    0.001
}
fn default_flashloan_pct() -> f64 {
    0.8
}
fn default_aggressive_min_value() -> f64 {
    0.02
}
fn default_risk_threshold() -> f64 {
    0.7
}
fn default_opportunity_threshold() -> f64 {
    70.0
}
fn default_volatility_threshold() -> f64 {
    75.0
}
fn default_price_dip_threshold() -> f64 {
    0.99
}
fn default_momentum_threshold() -> f64 {
    2.0
}
fn default_sandwich_gas_threshold() -> f64 {
    200.0
}
fn default_uniswap_router() -> Address {
    UNISWAP_V2_ROUTER
}
fn default_sushiswap_router() -> Address {
    SUSHISWAP_ROUTER
}
fn default_relays() -> Vec<RelayEndpoint> {
    vec![
        RelayEndpoint {
            name: "flashbots".to_string(),
            url: "https://relay.flashbots.net".to_string(),
            auth_header: "X-Flashbots-Signature".to_string(),
        },
        RelayEndpoint {
            name: "beaverbuild".to_string(),
            url: "https://rpc.beaverbuild.org".to_string(),
            auth_header: "X-Flashbots-Signature".to_string(),
        },
    ]
}

impl Settings {
    /// Load from an explicit file, or `config.{toml,yaml,...}` plus
    /// `FORERUNNER_*` environment overrides.
    pub fn load_with_path(path: Option<&str>) -> Result<Self, EngineError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(p) => builder.add_source(File::with_name(p)),
            None => builder.add_source(File::with_name("config").required(false)),
        };
        let cfg = builder
            .add_source(Environment::with_prefix("FORERUNNER").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize::<Settings>()?)
    }

    pub fn bundle_signer_key(&self) -> &str {
        self.bundle_signer_key.as_deref().unwrap_or(&self.wallet_key)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }

    /// Known-router table: the built-in defaults plus the configured
    /// addresses.
    pub fn routers(&self) -> HashMap<Address, String> {
        let mut m: HashMap<Address, String> = KNOWN_ROUTERS
            .iter()
            .map(|(addr, name)| (*addr, name.to_string()))
            .collect();
        m.insert(self.uniswap_router, "Uniswap".to_string());
        m.insert(self.sushiswap_router, "Sushiswap".to_string());
        m
    }

    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            max_retries: self.max_retries,
            retry_delay: self.retry_delay(),
            max_gas_price_gwei: self.max_gas_price_gwei,
            cancel_gas_price_gwei: self.cancel_gas_price_gwei,
            native_transfer_gas_multiplier: self.native_transfer_gas_multiplier,
        }
    }

    pub fn strategy_settings(&self) -> StrategySettings {
        StrategySettings {
            min_profit_eth: self.min_profit_eth,
            flashloan_profit_percentage: self.flashloan_profit_percentage,
            aggressive_front_run_min_value_eth: self.aggressive_front_run_min_value_eth,
            aggressive_front_run_risk_threshold: self.aggressive_front_run_risk_threshold,
            front_run_opportunity_score_threshold: self.front_run_opportunity_score_threshold,
            volatility_front_run_score_threshold: self.volatility_front_run_score_threshold,
            price_dip_back_run_threshold: self.price_dip_back_run_threshold,
            price_boost_momentum_threshold: self.price_boost_momentum_threshold,
            sandwich_gas_price_threshold_gwei: self.sandwich_gas_price_threshold_gwei,
        }
    }
}
