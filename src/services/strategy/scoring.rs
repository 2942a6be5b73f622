// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::types::MarketConditions;

/// Ordered `(threshold, points)` bands for one metric, highest band first.
/// Only the first matching band contributes; bands are not cumulative
/// within a metric.
type Bands = &'static [(f64, f64)];

/// Predicted-vs-current price change, percent.
const PRICE_CHANGE_BANDS: Bands = &[(5.0, 40.0), (3.0, 30.0), (1.0, 20.0), (0.5, 10.0)];
/// Coefficient of variation; calmer markets score higher for entries.
const INVERSE_VOLATILITY_BANDS: Bands = &[(0.02, 20.0), (0.05, 15.0), (0.08, 10.0)];
/// Coefficient of variation of the historical series.
const HISTORICAL_VOLATILITY_BANDS: Bands = &[(0.10, 40.0), (0.08, 30.0), (0.05, 20.0), (0.03, 10.0)];
/// Price range relative to the series mean.
const PRICE_RANGE_BANDS: Bands = &[(0.20, 30.0), (0.15, 20.0), (0.10, 10.0)];
/// 24h price change, percent.
const RISK_PRICE_CHANGE_BANDS: Bands = &[(10.0, 40.0), (7.0, 30.0), (4.0, 20.0), (2.0, 10.0)];
/// Dynamic gas price, gwei.
const GAS_PRICE_BANDS: Bands = &[(200.0, 30.0), (150.0, 20.0), (100.0, 10.0)];

/// First band the value strictly exceeds. Band transitions are strict: a
/// value exactly on a threshold earns the next band down.
fn points_above(bands: Bands, value: f64) -> f64 {
    bands
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// First band the value sits strictly below, for metrics where lower is
/// better.
fn points_below(bands: Bands, value: f64) -> f64 {
    bands
        .iter()
        .find(|(threshold, _)| value < *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// A computed score together with the raw signals that produced it.
#[derive(Clone, Debug)]
pub struct ScoreResult {
    pub score: f64,
    pub signals: Vec<(&'static str, f64)>,
}

/// Population standard deviation over mean. Empty and single-point series
/// carry no volatility information and contribute zero.
pub fn coefficient_of_variation(history: &[f64]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance =
        history.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / history.len() as f64;
    variance.sqrt() / mean
}

/// Percentage change across the window; zero for fewer than two points.
pub fn price_momentum(history: &[f64]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let first = history[0];
    if first == 0.0 {
        return 0.0;
    }
    (history[history.len() - 1] / first - 1.0) * 100.0
}

/// Opportunity score (0-100) for predictive front-running: rewards a large
/// predicted move in a calm, liquid, upward-trending market.
pub fn opportunity_score(
    price_change: f64,
    volatility: f64,
    conditions: &MarketConditions,
    current_price: f64,
    history: &[f64],
) -> ScoreResult {
    let mut score = points_above(PRICE_CHANGE_BANDS, price_change);

    if !history.is_empty() {
        let avg_price = history.iter().sum::<f64>() / history.len() as f64;
        if current_price > avg_price * 1.1 {
            score += 10.0;
        } else if current_price > avg_price * 1.05 {
            score += 5.0;
        }
    }

    score += points_below(INVERSE_VOLATILITY_BANDS, volatility);

    if conditions.bullish_trend {
        score += 10.0;
    }
    if !conditions.high_volatility {
        score += 5.0;
    }
    if !conditions.low_liquidity {
        score += 5.0;
    }

    let trend = price_momentum(history);
    if history.len() > 1 {
        if trend > 0.0 {
            score += 20.0;
        } else if trend > -1.0 {
            score += 10.0;
        }
    }

    ScoreResult {
        score,
        signals: vec![
            ("price_change", price_change),
            ("volatility", volatility),
            ("current_price", current_price),
            ("trend", trend),
        ],
    }
}

/// Volatility score (0-100): rewards wide, choppy price action.
pub fn volatility_score(history: &[f64], conditions: &MarketConditions) -> ScoreResult {
    let historical_volatility = coefficient_of_variation(history);
    let mut score = points_above(HISTORICAL_VOLATILITY_BANDS, historical_volatility);

    let mut range = 0.0;
    if !history.is_empty() {
        let mean = history.iter().sum::<f64>() / history.len() as f64;
        let min = history.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = history.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if mean != 0.0 {
            range = (max - min) / mean;
            score += points_above(PRICE_RANGE_BANDS, range);
        }
    }

    if conditions.high_volatility {
        score += 20.0;
    }
    if conditions.low_liquidity {
        score += 10.0;
    }

    ScoreResult {
        score,
        signals: vec![
            ("historical_volatility", historical_volatility),
            ("price_range", range),
        ],
    }
}

/// Risk score for aggressive front-running, normalized to [0,1]: the raw
/// 0-100 sum over price movement, gas pressure, and market flags divided
/// by 100.
pub fn risk_score(
    price_change_24h: f64,
    gas_price_gwei: f64,
    conditions: &MarketConditions,
) -> ScoreResult {
    let mut score = points_above(RISK_PRICE_CHANGE_BANDS, price_change_24h);
    score += points_above(GAS_PRICE_BANDS, gas_price_gwei);

    if conditions.high_volatility {
        score += 20.0;
    }
    if conditions.low_liquidity {
        score += 10.0;
    }

    ScoreResult {
        score: score / 100.0,
        signals: vec![
            ("price_change_24h", price_change_24h),
            ("gas_price_gwei", gas_price_gwei),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn calm() -> MarketConditions {
        MarketConditions::default()
    }

    #[test]
    fn band_transitions_are_strict() {
        // Exactly on the threshold earns the band below, just past it the
        // band itself.
        let flat = [1.0, 1.0];
        let at = opportunity_score(5.0, 0.5, &calm(), 0.0, &flat);
        let past = opportunity_score(5.01, 0.5, &calm(), 0.0, &flat);
        assert_eq!(past.score - at.score, 10.0);
    }

    #[test]
    fn opportunity_is_monotone_in_price_change() {
        let flat = [1.0, 1.0];
        let mut last = -1.0;
        for change in [0.0, 0.4, 0.6, 1.5, 3.5, 6.0, 50.0] {
            let result = opportunity_score(change, 0.5, &calm(), 0.0, &flat);
            assert!(result.score >= last, "score regressed at {change}");
            last = result.score;
        }
    }

    #[test]
    fn opportunity_rewards_calm_liquid_bull_markets() {
        let history = [1.0, 1.02, 1.05];
        let conditions = MarketConditions {
            high_volatility: false,
            low_liquidity: false,
            bullish_trend: true,
        };
        // 40 (change) + 20 (low vol) + 10 (bull) + 5 + 5 (flags) + 20 (trend)
        let result = opportunity_score(6.0, 0.01, &conditions, 1.0, &history);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn opportunity_mean_comparison_bonus() {
        let history = [1.0, 1.0];
        let above_mean = opportunity_score(0.0, 0.5, &calm(), 1.2, &history);
        let near_mean = opportunity_score(0.0, 0.5, &calm(), 1.06, &history);
        let at_mean = opportunity_score(0.0, 0.5, &calm(), 1.0, &history);
        assert_eq!(above_mean.score - at_mean.score, 10.0);
        assert_eq!(near_mean.score - at_mean.score, 5.0);
    }

    #[test]
    fn volatility_score_handles_empty_and_single_point_series() {
        let empty = volatility_score(&[], &calm());
        assert_eq!(empty.score, 0.0);
        let single = volatility_score(&[42.0], &calm());
        assert_eq!(single.score, 0.0);
    }

    #[test]
    fn volatility_score_rewards_wide_ranges_and_flags() {
        let history = [1.0, 1.5, 0.8];
        let conditions = MarketConditions {
            high_volatility: true,
            low_liquidity: true,
            bullish_trend: false,
        };
        let result = volatility_score(&history, &conditions);
        // cov ≈ 0.26 → 40, range ≈ 0.64 → 30, flags → 30
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn risk_score_is_normalized() {
        let conditions = MarketConditions {
            high_volatility: true,
            low_liquidity: true,
            bullish_trend: false,
        };
        let result = risk_score(11.0, 250.0, &conditions);
        assert_eq!(result.score, 1.0);

        let calm_result = risk_score(0.0, 0.0, &calm());
        assert_eq!(calm_result.score, 0.0);
    }

    #[test]
    fn gas_bands_only_highest_match_counts() {
        let low = risk_score(0.0, 120.0, &calm());
        let mid = risk_score(0.0, 160.0, &calm());
        let high = risk_score(0.0, 210.0, &calm());
        assert_eq!(low.score, 0.10);
        assert_eq!(mid.score, 0.20);
        assert_eq!(high.score, 0.30);
    }

    #[test]
    fn momentum_and_cov_degenerate_series() {
        assert_eq!(price_momentum(&[]), 0.0);
        assert_eq!(price_momentum(&[1.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[3.0]), 0.0);
        assert!((price_momentum(&[1.0, 1.1]) - 10.0).abs() < 1e-9);
    }
}
