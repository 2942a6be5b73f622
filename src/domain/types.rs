// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::Deserialize;

use crate::domain::constants::WEI_PER_ETH;

/// An observed, not-yet-mined transaction handed over by the mempool
/// listener. Immutable once received; fields the wire allows to be absent
/// (contract creations have no `to`, fee-market transactions may carry no
/// `gasPrice`) stay optional so structural validation can reject them.
#[derive(Clone, Debug, Deserialize)]
pub struct TargetTransaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub input: Option<Bytes>,
    pub value: Option<U256>,
    #[serde(rename = "gasPrice")]
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
    /// Profit estimate attached by the listener, in native units.
    #[serde(default)]
    pub estimated_profit_eth: f64,
}

impl TargetTransaction {
    pub fn value_eth(&self) -> f64 {
        self.value
            .map(|v| {
                let wei: u128 = v.try_into().unwrap_or(u128::MAX);
                wei as f64 / WEI_PER_ETH
            })
            .unwrap_or(0.0)
    }
}

/// Reduced view of the latest block, enough to pick a fee model.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockView {
    pub number: u64,
    pub base_fee_per_gas: Option<u128>,
}

impl BlockView {
    /// Fee-market transactions are used whenever the chain exposes a base fee.
    pub fn supports_fee_market(&self) -> bool {
        self.base_fee_per_gas.is_some()
    }
}

/// Market flags returned by the market-condition service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketConditions {
    pub high_volatility: bool,
    pub low_liquidity: bool,
    pub bullish_trend: bool,
}
