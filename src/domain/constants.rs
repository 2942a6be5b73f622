// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};
use lazy_static::lazy_static;
use std::collections::HashMap;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

/// Fallback gas limit when estimation fails.
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;
/// Fallback gas price when the safety gate is unreachable.
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 50;
/// Fixed cost of a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

pub const WEI_PER_GWEI: u128 = 1_000_000_000;
pub const WEI_PER_ETH: f64 = 1e18;

/// Pad an estimated gas limit by the fixed 10% safety margin.
pub fn pad_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_add(estimate / 10)
}

// =============================================================================
// ROUTER TABLE (Mainnet)
// =============================================================================

pub const UNISWAP_V2_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
pub const SUSHISWAP_ROUTER: Address = address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F");

lazy_static! {
    /// Known router addresses and the exchange they belong to. Companion
    /// transactions are only ever built against routers in this table.
    pub static ref KNOWN_ROUTERS: HashMap<Address, &'static str> = {
        let mut m = HashMap::new();
        m.insert(UNISWAP_V2_ROUTER, "Uniswap");
        m.insert(SUSHISWAP_ROUTER, "Sushiswap");
        m
    };
}

// =============================================================================
// STRATEGY THRESHOLDS
// =============================================================================

/// 24h USD volume floor per token symbol for the high-volume back-run gate.
pub fn volume_threshold_usd(token_symbol: &str) -> f64 {
    match token_symbol {
        "ETH" => 1_000_000.0,
        "BTC" => 500_000.0,
        "USDT" => 200_000.0,
        "BNB" => 100_000.0,
        "ADA" => 50_000.0,
        _ => 10_000.0,
    }
}

// =============================================================================
// LOGGING DEFAULTS
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
