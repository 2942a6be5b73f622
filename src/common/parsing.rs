// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::Address;
use std::str::FromStr;

use crate::domain::constants::WEI_PER_GWEI;
use crate::domain::error::EngineError;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Normalize an address string to its checksummed form.
pub fn normalize_address(raw: &str) -> Result<Address, EngineError> {
    Address::from_str(strip_0x(raw)).map_err(|_| EngineError::InvalidAddress(raw.to_string()))
}

/// Convert a gwei amount (fractional allowed) to wei, saturating at zero.
pub fn gwei_to_wei(gwei: f64) -> u128 {
    if gwei <= 0.0 {
        return 0;
    }
    (gwei * WEI_PER_GWEI as f64) as u128
}

pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / WEI_PER_GWEI as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_mixed_case_addresses() {
        let addr = normalize_address("0xC02AAA39B223fe8d0a0E5c4F27EAD9083c756cC2").unwrap();
        assert_eq!(
            addr.to_checksum(None),
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_address("not-an-address").is_err());
    }

    #[test]
    fn gwei_round_trips_to_wei() {
        assert_eq!(gwei_to_wei(50.0), 50_000_000_000);
        assert_eq!(gwei_to_wei(1.5), 1_500_000_000);
        assert_eq!(gwei_to_wei(-3.0), 0);
        assert_eq!(wei_to_gwei(2_000_000_000), 2.0);
    }
}
