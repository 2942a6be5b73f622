// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::EngineError;
use crate::domain::types::TargetTransaction;
use crate::infrastructure::data::abi_registry::{AbiRegistry, DecodedCall};
use crate::services::markets::MarketDataFeed;

/// A target transaction that passed structural and semantic validation.
#[derive(Clone, Debug)]
pub struct Validated {
    pub decoded: DecodedCall,
    pub token_symbol: String,
}

/// Validate an intercepted target transaction for the given operation:
/// required fields present, calldata decodable to a swap with a path of at
/// least two hops, token symbol resolvable, and value above the floor.
///
/// Every rejection resolves to `None`; one bad candidate must never abort
/// the caller's scan, so internal faults are logged and swallowed here.
pub async fn validate(
    registry: &AbiRegistry,
    market: &dyn MarketDataFeed,
    tx: &TargetTransaction,
    operation: &str,
    min_value_eth: f64,
) -> Option<Validated> {
    let (Some(input), Some(to), Some(value), Some(_gas_price)) =
        (&tx.input, tx.to, tx.value, tx.gas_price)
    else {
        let err = EngineError::InvalidInput(format!("Missing required fields for {operation}"));
        tracing::debug!(target: "validate", hash = %tx.hash, reject = %err, "Rejecting candidate");
        return None;
    };

    let Some(decoded) = registry.decode_calldata(input, to) else {
        // Undecodable calldata marks an uninteresting transaction, not an
        // error.
        let err = EngineError::Decode(format!("No known ABI matched for {operation}"));
        tracing::debug!(target: "validate", hash = %tx.hash, reject = %err, "Rejecting candidate");
        return None;
    };

    let Some(path) = decoded.path() else {
        tracing::debug!(target: "validate", operation, hash = %tx.hash, "Decoded call carries no path");
        return None;
    };
    if path.len() < 2 {
        tracing::debug!(target: "validate", operation, hash = %tx.hash, "Path shorter than two hops");
        return None;
    }
    let first_hop = path[0];

    let token_symbol = match market.token_symbol(first_hop).await {
        Ok(Some(symbol)) => symbol,
        Ok(None) => {
            tracing::debug!(target: "validate", operation, token = %first_hop, "Token symbol unresolvable");
            return None;
        }
        Err(e) => {
            tracing::error!(target: "validate", operation, token = %first_hop, error = %e, "Symbol lookup failed");
            return None;
        }
    };

    let value_eth = {
        let wei: u128 = value.try_into().unwrap_or(u128::MAX);
        wei as f64 / crate::domain::constants::WEI_PER_ETH
    };
    if value_eth < min_value_eth {
        tracing::debug!(
            target: "validate",
            operation,
            value_eth,
            min_value_eth,
            "Value below minimum threshold"
        );
        return None;
    }

    Some(Validated {
        decoded,
        token_symbol,
    })
}
