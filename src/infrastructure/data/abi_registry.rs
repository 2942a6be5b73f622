// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::services::strategy::routers::{Erc20Token, FlashloanVault, SwapRouterV2};
use alloy::primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::collections::HashMap;

/// Which known ABI family a decode matched. Advisory until the target
/// address is resolved against the router table: a colliding selector from
/// an unrelated contract can still produce a structural match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbiKind {
    Erc20,
    UniswapV2,
    Sushiswap,
    AaveFlashloan,
}

/// Decode attempt order, mirroring the registry's load order.
const DECODE_ORDER: [AbiKind; 4] = [
    AbiKind::Erc20,
    AbiKind::UniswapV2,
    AbiKind::Sushiswap,
    AbiKind::AaveFlashloan,
];

/// A V2-style router swap with its full parameter set. The path is the
/// ordered token route; reversing it converts a buy into the matching sell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapCall {
    ExactTokensForTokens {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    TokensForExactTokens {
        amount_out: U256,
        amount_in_max: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    ExactEthForTokens {
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    EthForExactTokens {
        amount_out: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    ExactTokensForEth {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    TokensForExactEth {
        amount_out: U256,
        amount_in_max: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
}

impl SwapCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            SwapCall::ExactTokensForTokens { .. } => "swapExactTokensForTokens",
            SwapCall::TokensForExactTokens { .. } => "swapTokensForExactTokens",
            SwapCall::ExactEthForTokens { .. } => "swapExactETHForTokens",
            SwapCall::EthForExactTokens { .. } => "swapETHForExactTokens",
            SwapCall::ExactTokensForEth { .. } => "swapExactTokensForETH",
            SwapCall::TokensForExactEth { .. } => "swapTokensForExactETH",
        }
    }

    pub fn path(&self) -> &[Address] {
        match self {
            SwapCall::ExactTokensForTokens { path, .. }
            | SwapCall::TokensForExactTokens { path, .. }
            | SwapCall::ExactEthForTokens { path, .. }
            | SwapCall::EthForExactTokens { path, .. }
            | SwapCall::ExactTokensForEth { path, .. }
            | SwapCall::TokensForExactEth { path, .. } => path,
        }
    }

    /// The same call with a replacement path; every other parameter is
    /// carried over unchanged.
    pub fn with_path(&self, new_path: Vec<Address>) -> SwapCall {
        let mut call = self.clone();
        match &mut call {
            SwapCall::ExactTokensForTokens { path, .. }
            | SwapCall::TokensForExactTokens { path, .. }
            | SwapCall::ExactEthForTokens { path, .. }
            | SwapCall::EthForExactTokens { path, .. }
            | SwapCall::ExactTokensForEth { path, .. }
            | SwapCall::TokensForExactEth { path, .. } => *path = new_path,
        }
        call
    }

    pub fn reversed(&self) -> SwapCall {
        let mut path = self.path().to_vec();
        path.reverse();
        self.with_path(path)
    }

    /// Whether the call spends native coin (and so must carry the value).
    pub fn is_payable(&self) -> bool {
        matches!(
            self,
            SwapCall::ExactEthForTokens { .. } | SwapCall::EthForExactTokens { .. }
        )
    }

    pub fn abi_encode(&self) -> Vec<u8> {
        match self.clone() {
            SwapCall::ExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapExactTokensForTokensCall {
                amountIn: amount_in,
                amountOutMin: amount_out_min,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            SwapCall::TokensForExactTokens {
                amount_out,
                amount_in_max,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapTokensForExactTokensCall {
                amountOut: amount_out,
                amountInMax: amount_in_max,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            SwapCall::ExactEthForTokens {
                amount_out_min,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapExactETHForTokensCall {
                amountOutMin: amount_out_min,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            SwapCall::EthForExactTokens {
                amount_out,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapETHForExactTokensCall {
                amountOut: amount_out,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            SwapCall::ExactTokensForEth {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapExactTokensForETHCall {
                amountIn: amount_in,
                amountOutMin: amount_out_min,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            SwapCall::TokensForExactEth {
                amount_out,
                amount_in_max,
                path,
                to,
                deadline,
            } => SwapRouterV2::swapTokensForExactETHCall {
                amountOut: amount_out,
                amountInMax: amount_in_max,
                path,
                to,
                deadline,
            }
            .abi_encode(),
        }
    }
}

/// Parameter payload of a decoded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    Swap(SwapCall),
    /// Structurally decoded against a known ABI but not a path-bearing swap.
    Other,
}

/// Result of decoding calldata against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedCall {
    pub function_name: &'static str,
    pub selector: [u8; 4],
    pub abi_kind: AbiKind,
    pub call: CallKind,
}

impl DecodedCall {
    pub fn swap(&self) -> Option<&SwapCall> {
        match &self.call {
            CallKind::Swap(swap) => Some(swap),
            CallKind::Other => None,
        }
    }

    pub fn path(&self) -> Option<&[Address]> {
        self.swap().map(SwapCall::path)
    }
}

/// Selector → method-name table plus best-effort calldata decoding against
/// every known ABI family.
pub struct AbiRegistry {
    selectors: HashMap<[u8; 4], &'static str>,
}

impl Default for AbiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AbiRegistry {
    pub fn new() -> Self {
        let mut selectors = HashMap::new();

        // Router family
        selectors.insert(
            SwapRouterV2::swapExactTokensForTokensCall::SELECTOR,
            "swapExactTokensForTokens",
        );
        selectors.insert(
            SwapRouterV2::swapTokensForExactTokensCall::SELECTOR,
            "swapTokensForExactTokens",
        );
        selectors.insert(
            SwapRouterV2::swapExactETHForTokensCall::SELECTOR,
            "swapExactETHForTokens",
        );
        selectors.insert(
            SwapRouterV2::swapETHForExactTokensCall::SELECTOR,
            "swapETHForExactTokens",
        );
        selectors.insert(
            SwapRouterV2::swapExactTokensForETHCall::SELECTOR,
            "swapExactTokensForETH",
        );
        selectors.insert(
            SwapRouterV2::swapTokensForExactETHCall::SELECTOR,
            "swapTokensForExactETH",
        );
        selectors.insert(SwapRouterV2::addLiquidityCall::SELECTOR, "addLiquidity");
        selectors.insert(SwapRouterV2::getAmountsOutCall::SELECTOR, "getAmountsOut");

        // ERC-20 family
        selectors.insert(Erc20Token::transferCall::SELECTOR, "transfer");
        selectors.insert(Erc20Token::approveCall::SELECTOR, "approve");
        selectors.insert(Erc20Token::transferFromCall::SELECTOR, "transferFrom");
        selectors.insert(Erc20Token::balanceOfCall::SELECTOR, "balanceOf");

        // Flashloan family
        selectors.insert(
            FlashloanVault::fn_RequestFlashLoanCall::SELECTOR,
            "fn_RequestFlashLoan",
        );
        selectors.insert(
            FlashloanVault::executeOperationCall::SELECTOR,
            "executeOperation",
        );
        selectors.insert(FlashloanVault::withdrawETHCall::SELECTOR, "withdrawETH");

        Self { selectors }
    }

    /// Resolve a selector to its method name, across all known ABIs.
    pub fn method_name(&self, selector: [u8; 4]) -> Option<&'static str> {
        self.selectors.get(&selector).copied()
    }

    /// Decode calldata: resolve the leading 4-byte selector, then try each
    /// known ABI family in load order until one decodes structurally.
    /// Returns `None` for unknown selectors or when no family decodes.
    pub fn decode_calldata(&self, input: &[u8], contract: Address) -> Option<DecodedCall> {
        if input.len() < 4 {
            return None;
        }
        let selector: [u8; 4] = input[..4].try_into().ok()?;
        let function_name = self.method_name(selector)?;

        for abi_kind in DECODE_ORDER {
            let Some(call) = decode_for_kind(abi_kind, selector, input) else {
                continue;
            };
            tracing::debug!(
                target: "abi",
                function = function_name,
                contract = %contract,
                kind = ?abi_kind,
                "Decoded calldata"
            );
            return Some(DecodedCall {
                function_name,
                selector,
                abi_kind,
                call,
            });
        }
        None
    }
}

fn decode_for_kind(kind: AbiKind, selector: [u8; 4], input: &[u8]) -> Option<CallKind> {
    match kind {
        AbiKind::Erc20 => decode_erc20(selector, input),
        AbiKind::UniswapV2 | AbiKind::Sushiswap => decode_swap(selector, input),
        AbiKind::AaveFlashloan => decode_flashloan(selector, input),
    }
}

fn decode_erc20(selector: [u8; 4], input: &[u8]) -> Option<CallKind> {
    match selector {
        Erc20Token::transferCall::SELECTOR => {
            Erc20Token::transferCall::abi_decode(input).ok()?;
        }
        Erc20Token::approveCall::SELECTOR => {
            Erc20Token::approveCall::abi_decode(input).ok()?;
        }
        Erc20Token::transferFromCall::SELECTOR => {
            Erc20Token::transferFromCall::abi_decode(input).ok()?;
        }
        Erc20Token::balanceOfCall::SELECTOR => {
            Erc20Token::balanceOfCall::abi_decode(input).ok()?;
        }
        _ => return None,
    }
    Some(CallKind::Other)
}

fn decode_flashloan(selector: [u8; 4], input: &[u8]) -> Option<CallKind> {
    match selector {
        FlashloanVault::fn_RequestFlashLoanCall::SELECTOR => {
            FlashloanVault::fn_RequestFlashLoanCall::abi_decode(input).ok()?;
        }
        FlashloanVault::executeOperationCall::SELECTOR => {
            FlashloanVault::executeOperationCall::abi_decode(input).ok()?;
        }
        FlashloanVault::withdrawETHCall::SELECTOR => {
            FlashloanVault::withdrawETHCall::abi_decode(input).ok()?;
        }
        _ => return None,
    }
    Some(CallKind::Other)
}

fn decode_swap(selector: [u8; 4], input: &[u8]) -> Option<CallKind> {
    let swap = match selector {
        SwapRouterV2::swapExactTokensForTokensCall::SELECTOR => {
            let c = SwapRouterV2::swapExactTokensForTokensCall::abi_decode(input).ok()?;
            SwapCall::ExactTokensForTokens {
                amount_in: c.amountIn,
                amount_out_min: c.amountOutMin,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        SwapRouterV2::swapTokensForExactTokensCall::SELECTOR => {
            let c = SwapRouterV2::swapTokensForExactTokensCall::abi_decode(input).ok()?;
            SwapCall::TokensForExactTokens {
                amount_out: c.amountOut,
                amount_in_max: c.amountInMax,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        SwapRouterV2::swapExactETHForTokensCall::SELECTOR => {
            let c = SwapRouterV2::swapExactETHForTokensCall::abi_decode(input).ok()?;
            SwapCall::ExactEthForTokens {
                amount_out_min: c.amountOutMin,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        SwapRouterV2::swapETHForExactTokensCall::SELECTOR => {
            let c = SwapRouterV2::swapETHForExactTokensCall::abi_decode(input).ok()?;
            SwapCall::EthForExactTokens {
                amount_out: c.amountOut,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        SwapRouterV2::swapExactTokensForETHCall::SELECTOR => {
            let c = SwapRouterV2::swapExactTokensForETHCall::abi_decode(input).ok()?;
            SwapCall::ExactTokensForEth {
                amount_in: c.amountIn,
                amount_out_min: c.amountOutMin,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        SwapRouterV2::swapTokensForExactETHCall::SELECTOR => {
            let c = SwapRouterV2::swapTokensForExactETHCall::abi_decode(input).ok()?;
            SwapCall::TokensForExactEth {
                amount_out: c.amountOut,
                amount_in_max: c.amountInMax,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        }
        _ => return None,
    };
    Some(CallKind::Swap(swap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256, address};

    const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

    fn sample_swap() -> SwapCall {
        SwapCall::ExactTokensForTokens {
            amount_in: U256::from(1_000u64),
            amount_out_min: U256::from(990u64),
            path: vec![WETH, DAI],
            to: Address::from([0x22; 20]),
            deadline: U256::from(1_700_000_000u64),
        }
    }

    #[test]
    fn decodes_known_swap_calldata() {
        let registry = AbiRegistry::new();
        let encoded = sample_swap().abi_encode();

        let decoded = registry
            .decode_calldata(&encoded, Address::from([0x33; 20]))
            .expect("decode");
        assert_eq!(decoded.function_name, "swapExactTokensForTokens");
        assert_eq!(decoded.path(), Some(&[WETH, DAI][..]));
    }

    #[test]
    fn unknown_selector_yields_none() {
        let registry = AbiRegistry::new();
        let mut input = sample_swap().abi_encode();
        input[0] ^= 0xff;
        assert!(
            registry
                .decode_calldata(&input, Address::from([0x33; 20]))
                .is_none()
        );
    }

    #[test]
    fn short_calldata_yields_none() {
        let registry = AbiRegistry::new();
        assert!(
            registry
                .decode_calldata(&[0x12, 0x34], Address::from([0x33; 20]))
                .is_none()
        );
    }

    #[test]
    fn erc20_transfer_decodes_without_path() {
        let registry = AbiRegistry::new();
        let encoded = Erc20Token::transferCall {
            to: Address::from([0x44; 20]),
            amount: U256::from(5u64),
        }
        .abi_encode();

        let decoded = registry
            .decode_calldata(&encoded, Address::from([0x55; 20]))
            .expect("decode");
        assert_eq!(decoded.function_name, "transfer");
        assert_eq!(decoded.call, CallKind::Other);
        assert!(decoded.path().is_none());
    }

    #[test]
    fn reversing_a_path_twice_is_the_identity() {
        let swap = sample_swap();
        let reversed = swap.reversed();
        assert_eq!(reversed.path(), &[DAI, WETH]);
        assert_eq!(reversed.reversed(), swap);
        assert_eq!(reversed.path().len(), swap.path().len());
    }
}
