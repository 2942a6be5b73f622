// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants::{WEI_PER_ETH, volume_threshold_usd};
use crate::domain::types::TargetTransaction;
use crate::infrastructure::data::abi_registry::{AbiRegistry, DecodedCall};
use crate::services::markets::{MarketDataFeed, MarketWatch, SafetyGate};
use crate::services::strategy::builder::{FunctionCall, TransactionBuilder, TxOverrides};
use crate::services::strategy::bundle::BundleSubmitter;
use crate::services::strategy::routers::FlashloanVault;
use crate::services::strategy::scoring::{
    opportunity_score, price_momentum, risk_score, volatility_score,
};
use crate::services::strategy::validate::{Validated, validate};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::eth::TransactionRequest;
use alloy_sol_types::SolCall;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Sandwich sub-strategy gates. `Plain` is the pass-through default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SandwichVariant {
    FlashProfit,
    PriceBoost,
    Arbitrage,
    Advanced,
    Plain,
}

/// Decision thresholds for the strategy family.
#[derive(Clone, Copy, Debug)]
pub struct StrategySettings {
    pub min_profit_eth: f64,
    /// Fraction of the estimated profit borrowed via flashloan.
    pub flashloan_profit_percentage: f64,
    pub aggressive_front_run_min_value_eth: f64,
    /// Normalized [0,1] risk floor for the aggressive variant.
    pub aggressive_front_run_risk_threshold: f64,
    pub front_run_opportunity_score_threshold: f64,
    pub volatility_front_run_score_threshold: f64,
    /// Predicted/current price ratio below which a dip back-run fires.
    pub price_dip_back_run_threshold: f64,
    pub price_boost_momentum_threshold: f64,
    pub sandwich_gas_price_threshold_gwei: f64,
}

/// Runs the front-run / back-run / sandwich strategy family over validated
/// target transactions: validation, scoring, companion-transaction
/// preparation, simulation, and bundle hand-off.
pub struct StrategyExecutor {
    registry: AbiRegistry,
    builder: Arc<TransactionBuilder>,
    bundles: Arc<BundleSubmitter>,
    market: Arc<dyn MarketDataFeed>,
    watch: Arc<dyn MarketWatch>,
    safety: Arc<dyn SafetyGate>,
    /// Router address → exchange name; companion transactions are only
    /// built against routers in this table.
    routers: HashMap<Address, String>,
    flashloan_address: Address,
    settings: StrategySettings,
}

impl StrategyExecutor {
    pub fn new(
        registry: AbiRegistry,
        builder: Arc<TransactionBuilder>,
        bundles: Arc<BundleSubmitter>,
        market: Arc<dyn MarketDataFeed>,
        watch: Arc<dyn MarketWatch>,
        safety: Arc<dyn SafetyGate>,
        routers: HashMap<Address, String>,
        flashloan_address: Address,
        settings: StrategySettings,
    ) -> Self {
        Self {
            registry,
            builder,
            bundles,
            market,
            watch,
            safety,
            routers,
            flashloan_address,
            settings,
        }
    }

    // ------------------------------------------------------------------
    // Base strategies
    // ------------------------------------------------------------------

    /// Front-run the target: flashloan plus front-run companion, both
    /// required, submitted as one bundle.
    pub async fn front_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "front_run", 0.0).await else {
            return false;
        };
        let Some(path) = validated.decoded.path() else {
            return false;
        };
        let asset = path[0];

        let flashloan_tx = self.prepare_flashloan(asset, target).await;
        let front_tx = self.prepare_front_run(target).await;
        let (Some(flashloan_tx), Some(front_tx)) = (flashloan_tx, front_tx) else {
            return false;
        };

        if self.simulate_and_send(vec![flashloan_tx, front_tx]).await {
            tracing::info!(target: "strategy", hash = %target.hash, "Front-run executed successfully");
            return true;
        }
        false
    }

    /// Back-run the target with the decoded path reversed.
    pub async fn back_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "back_run", 0.0).await else {
            return false;
        };

        let Some(back_tx) = self.prepare_back_run(target, &validated.decoded).await else {
            return false;
        };
        if self.simulate_and_send(vec![back_tx]).await {
            tracing::info!(target: "strategy", hash = %target.hash, "Back-run executed successfully");
            return true;
        }
        false
    }

    /// Bracket the target with a flashloan, front-run, and back-run. All
    /// three must prepare; a missing member fails the attack closed.
    pub async fn sandwich_attack(
        &self,
        target: &TargetTransaction,
        variant: SandwichVariant,
    ) -> bool {
        tracing::debug!(target: "strategy", ?variant, hash = %target.hash, "Evaluating sandwich attack");
        let Some(validated) = self.validate(target, "sandwich_attack", 0.0).await else {
            return false;
        };

        if !self.sandwich_gate(variant, target, &validated).await {
            tracing::debug!(target: "strategy", ?variant, "Sandwich conditions not met");
            return false;
        }

        let Some(path) = validated.decoded.path() else {
            return false;
        };
        let asset = path[0];

        let flashloan_tx = self.prepare_flashloan(asset, target).await;
        let front_tx = self.prepare_front_run(target).await;
        let back_tx = self.prepare_back_run(target, &validated.decoded).await;
        let (Some(flashloan_tx), Some(front_tx), Some(back_tx)) =
            (flashloan_tx, front_tx, back_tx)
        else {
            tracing::warn!(target: "strategy", "Failed to prepare all sandwich components");
            return false;
        };

        self.simulate_and_send(vec![flashloan_tx, front_tx, back_tx])
            .await
    }

    // ------------------------------------------------------------------
    // Scored variants
    // ------------------------------------------------------------------

    /// Front-run on a high normalized risk score (24h move, gas pressure,
    /// market flags).
    pub async fn aggressive_front_run(&self, target: &TargetTransaction) -> bool {
        let min_value = self.settings.aggressive_front_run_min_value_eth;
        let Some(validated) = self.validate(target, "front_run", min_value).await else {
            return false;
        };
        let Some(venue) = target.to else {
            return false;
        };

        let (price_change, gas_price, conditions) = tokio::join!(
            self.market.price_change_24h(&validated.token_symbol),
            self.safety.dynamic_gas_price_gwei(),
            self.watch.market_conditions(venue),
        );
        let (Ok(price_change), Ok(gas_price), Ok(conditions)) =
            (price_change, gas_price, conditions)
        else {
            tracing::debug!(target: "strategy", "Incomplete market data for aggressive front-run");
            return false;
        };

        let risk = risk_score(price_change, gas_price, &conditions);
        if risk.score >= self.settings.aggressive_front_run_risk_threshold {
            tracing::debug!(target: "strategy", risk = risk.score, "Executing aggressive front-run");
            return self.front_run(target).await;
        }
        false
    }

    /// Front-run on a high opportunity score from predicted price movement.
    pub async fn predictive_front_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "front_run", 0.0).await else {
            return false;
        };
        let Some(venue) = target.to else {
            return false;
        };
        let symbol = validated.token_symbol.as_str();

        let (predicted, current, conditions, history) = tokio::join!(
            self.watch.predict_price(symbol),
            self.market.real_time_price(symbol),
            self.watch.market_conditions(venue),
            self.market.price_history(symbol, 1),
        );
        let (Ok(predicted), Ok(current), Ok(conditions), Ok(history)) =
            (predicted, current, conditions, history)
        else {
            tracing::debug!(target: "strategy", "Incomplete market data for predictive front-run");
            return false;
        };
        if current <= 0.0 {
            return false;
        }

        let price_change = (predicted / current - 1.0) * 100.0;
        let volatility = crate::services::strategy::scoring::coefficient_of_variation(&history);
        let opportunity =
            opportunity_score(price_change, volatility, &conditions, current, &history);

        tracing::debug!(
            target: "strategy",
            symbol,
            current,
            predicted,
            price_change,
            volatility,
            score = opportunity.score,
            "Predictive analysis"
        );

        if opportunity.score >= self.settings.front_run_opportunity_score_threshold {
            tracing::debug!(target: "strategy", symbol, score = opportunity.score, "Executing predictive front-run");
            return self.front_run(target).await;
        }
        tracing::debug!(target: "strategy", symbol, score = opportunity.score, "Opportunity score below threshold");
        false
    }

    /// Front-run on wide, choppy price action.
    pub async fn volatility_front_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "front_run", 0.0).await else {
            return false;
        };
        let Some(venue) = target.to else {
            return false;
        };
        let symbol = validated.token_symbol.as_str();

        let (conditions, current, history) = tokio::join!(
            self.watch.market_conditions(venue),
            self.market.real_time_price(symbol),
            self.market.price_history(symbol, 1),
        );
        let (Ok(conditions), Ok(current), Ok(history)) = (conditions, current, history) else {
            tracing::warn!(target: "strategy", "Incomplete market data for volatility front-run");
            return false;
        };

        let score = volatility_score(&history, &conditions);
        tracing::debug!(
            target: "strategy",
            symbol,
            current,
            score = score.score,
            "Volatility analysis"
        );

        if score.score >= self.settings.volatility_front_run_score_threshold {
            tracing::debug!(target: "strategy", symbol, score = score.score, "Executing volatility front-run");
            return self.front_run(target).await;
        }
        false
    }

    /// Back-run when a price dip is predicted.
    pub async fn price_dip_back_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "back_run", 0.0).await else {
            return false;
        };
        let symbol = validated.token_symbol.as_str();

        let (current, predicted) = tokio::join!(
            self.market.real_time_price(symbol),
            self.watch.predict_price(symbol),
        );
        let (Ok(current), Ok(predicted)) = (current, predicted) else {
            return false;
        };

        if predicted < current * self.settings.price_dip_back_run_threshold {
            tracing::debug!(target: "strategy", symbol, current, predicted, "Predicted dip meets threshold");
            return self.back_run(target).await;
        }
        false
    }

    /// Back-run when the projected flashloan profit clears the floor.
    pub async fn flashloan_back_run(&self, target: &TargetTransaction) -> bool {
        let projected_profit_eth =
            target.estimated_profit_eth * self.settings.flashloan_profit_percentage;
        if projected_profit_eth > self.settings.min_profit_eth {
            tracing::debug!(target: "strategy", projected_profit_eth, "Flashloan profit meets threshold");
            return self.back_run(target).await;
        }
        tracing::debug!(target: "strategy", projected_profit_eth, "Profit insufficient for flashloan back-run");
        false
    }

    /// Back-run on unusually high 24h volume for the token.
    pub async fn high_volume_back_run(&self, target: &TargetTransaction) -> bool {
        let Some(validated) = self.validate(target, "back_run", 0.0).await else {
            return false;
        };
        let symbol = validated.token_symbol.as_str();

        let volume = match self.market.token_volume_24h(symbol).await {
            Ok(volume) => volume,
            Err(e) => {
                tracing::debug!(target: "strategy", symbol, error = %e, "Volume lookup failed");
                return false;
            }
        };
        let threshold = volume_threshold_usd(symbol);
        if volume > threshold {
            tracing::debug!(target: "strategy", symbol, volume, "High volume detected, back-running");
            return self.back_run(target).await;
        }
        tracing::debug!(target: "strategy", symbol, volume, threshold, "Volume below threshold");
        false
    }

    /// Sandwich only in volatile bull markets.
    pub async fn advanced_sandwich_attack(&self, target: &TargetTransaction) -> bool {
        let Some(_validated) = self.validate(target, "sandwich_attack", 0.0).await else {
            return false;
        };
        let Some(venue) = target.to else {
            return false;
        };

        let conditions = match self.watch.market_conditions(venue).await {
            Ok(conditions) => conditions,
            Err(e) => {
                tracing::debug!(target: "strategy", error = %e, "Market conditions unavailable");
                return false;
            }
        };
        if conditions.high_volatility && conditions.bullish_trend {
            tracing::debug!(target: "strategy", "Conditions favorable for sandwich attack");
            return self.sandwich_attack(target, SandwichVariant::Plain).await;
        }
        tracing::debug!(target: "strategy", "Conditions unfavorable for sandwich attack");
        false
    }

    // ------------------------------------------------------------------
    // Preparation
    // ------------------------------------------------------------------

    /// Flashloan principal: `floor(profit × percentage × 10^18)` wei, zero
    /// when the listener saw no profit.
    pub fn flashloan_amount(&self, target: &TargetTransaction) -> U256 {
        let profit = target.estimated_profit_eth;
        if profit <= 0.0 {
            tracing::debug!(target: "strategy", "No estimated profit, flashloan amount is 0");
            return U256::ZERO;
        }
        let amount = (profit * self.settings.flashloan_profit_percentage * WEI_PER_ETH) as u128;
        tracing::debug!(target: "strategy", amount, "Calculated flashloan amount");
        U256::from(amount)
    }

    /// Flashloan request for the asset, or nothing when the amount is zero.
    async fn prepare_flashloan(
        &self,
        asset: Address,
        target: &TargetTransaction,
    ) -> Option<TransactionRequest> {
        let amount = self.flashloan_amount(target);
        if amount.is_zero() {
            return None;
        }
        let call = FunctionCall {
            to: self.flashloan_address,
            calldata: FlashloanVault::fn_RequestFlashLoanCall {
                token: asset,
                amount,
            }
            .abi_encode(),
            value: U256::ZERO,
        };
        match self.builder.build(&call, TxOverrides::default()).await {
            Ok(req) => Some(req),
            Err(e) => {
                tracing::error!(target: "strategy", error = %e, "Flashloan preparation failed");
                None
            }
        }
    }

    /// Replay the target's swap against its router, ahead of it. Unknown
    /// routers and non-swap calls yield no transaction.
    async fn prepare_front_run(&self, target: &TargetTransaction) -> Option<TransactionRequest> {
        let to = target.to?;
        let input = target.input.as_ref()?;
        let decoded = self.registry.decode_calldata(input, to)?;
        self.prepare_swap_companion(target, &decoded, false).await
    }

    /// The target's swap with its path reversed, to unwind after it lands.
    async fn prepare_back_run(
        &self,
        target: &TargetTransaction,
        decoded: &DecodedCall,
    ) -> Option<TransactionRequest> {
        self.prepare_swap_companion(target, decoded, true).await
    }

    async fn prepare_swap_companion(
        &self,
        target: &TargetTransaction,
        decoded: &DecodedCall,
        reverse_path: bool,
    ) -> Option<TransactionRequest> {
        let to = target.to?;
        let Some(exchange) = self.routers.get(&to) else {
            tracing::warn!(target: "strategy", router = %to, "Unknown router address, cannot determine exchange");
            return None;
        };

        let Some(swap) = decoded.swap() else {
            tracing::debug!(
                target: "strategy",
                function = decoded.function_name,
                exchange = %exchange,
                "Function unsupported for companion transactions"
            );
            return None;
        };
        let swap = if reverse_path {
            let path = swap.path();
            if path.len() < 2 {
                tracing::debug!(target: "strategy", "Path too short to reverse");
                return None;
            }
            swap.reversed()
        } else {
            swap.clone()
        };

        let value = if swap.is_payable() {
            target.value.unwrap_or_default()
        } else {
            U256::ZERO
        };
        let call = FunctionCall {
            to,
            calldata: swap.abi_encode(),
            value,
        };
        match self.builder.build(&call, TxOverrides::default()).await {
            Ok(req) => {
                tracing::info!(
                    target: "strategy",
                    exchange = %exchange,
                    reversed = reverse_path,
                    "Prepared companion transaction"
                );
                Some(req)
            }
            Err(e) => {
                tracing::error!(target: "strategy", error = %e, "Companion build failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Gates and plumbing
    // ------------------------------------------------------------------

    async fn sandwich_gate(
        &self,
        variant: SandwichVariant,
        target: &TargetTransaction,
        validated: &Validated,
    ) -> bool {
        match variant {
            SandwichVariant::FlashProfit => {
                let projected_profit_eth =
                    target.estimated_profit_eth * self.settings.flashloan_profit_percentage;
                let gas_price = match self.safety.dynamic_gas_price_gwei().await {
                    Ok(gwei) => gwei,
                    Err(e) => {
                        tracing::debug!(target: "strategy", error = %e, "Gas price unavailable for sandwich gate");
                        return false;
                    }
                };
                projected_profit_eth > self.settings.min_profit_eth
                    && gas_price <= self.settings.sandwich_gas_price_threshold_gwei
            }
            SandwichVariant::PriceBoost => {
                let history = match self
                    .market
                    .price_history(&validated.token_symbol, 24)
                    .await
                {
                    Ok(history) if !history.is_empty() => history,
                    Ok(_) => return false,
                    Err(e) => {
                        tracing::debug!(target: "strategy", error = %e, "Price history unavailable for sandwich gate");
                        return false;
                    }
                };
                price_momentum(&history) > self.settings.price_boost_momentum_threshold
            }
            SandwichVariant::Arbitrage => {
                self.watch
                    .is_arbitrage_opportunity(target)
                    .await
                    .unwrap_or(false)
            }
            SandwichVariant::Advanced => {
                let Some(venue) = target.to else { return false };
                match self.watch.market_conditions(venue).await {
                    Ok(conditions) => conditions.high_volatility && conditions.bullish_trend,
                    Err(_) => false,
                }
            }
            SandwichVariant::Plain => true,
        }
    }

    /// Simulate every member concurrently; submit only when all pass.
    async fn simulate_and_send(&self, bundle: Vec<TransactionRequest>) -> bool {
        let simulations = join_all(bundle.iter().map(|tx| self.builder.simulate(tx))).await;
        if simulations.iter().any(|ok| !ok) {
            tracing::warn!(target: "strategy", "Bundle member simulation failed, not submitting");
            return false;
        }
        self.bundles.send_bundle(&bundle).await
    }

    async fn validate(
        &self,
        target: &TargetTransaction,
        operation: &str,
        min_value_eth: f64,
    ) -> Option<Validated> {
        validate(
            &self.registry,
            self.market.as_ref(),
            target,
            operation,
            min_value_eth,
        )
        .await
    }
}
