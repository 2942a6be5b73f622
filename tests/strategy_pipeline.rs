// SPDX-License-Identifier: MIT
// Exercises the strategy pipeline end to end against programmable
// collaborators and a local relay stub: validation short-circuits, gas
// fallbacks, the execute retry/ceiling loop, companion-path reversal, and
// at-least-one-relay bundle semantics.

use alloy::primitives::{Address, B256, Bytes, U256, address};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use forerunner::common::error::EngineError;
use forerunner::domain::constants::{DEFAULT_GAS_LIMIT, UNISWAP_V2_ROUTER};
use forerunner::domain::types::{BlockView, MarketConditions, TargetTransaction};
use forerunner::infrastructure::data::abi_registry::{AbiRegistry, SwapCall};
use forerunner::infrastructure::network::chain::ChainClient;
use forerunner::infrastructure::network::gas::GasPlanner;
use forerunner::infrastructure::network::nonce::NonceService;
use forerunner::services::markets::{MarketDataFeed, MarketWatch, SafetyGate};
use forerunner::services::strategy::builder::{
    ExecutionSettings, TransactionBuilder, TxOverrides,
};
use forerunner::services::strategy::bundle::{BundleSubmitter, RelayEndpoint};
use forerunner::services::strategy::executor::{
    SandwichVariant, StrategyExecutor, StrategySettings,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
const FLASHLOAN: Address = address!("1111111111111111111111111111111111111111");

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockChain {
    fail_estimate: bool,
    fail_send: bool,
    fail_call: bool,
    base_fee: Option<u128>,
    send_attempts: AtomicUsize,
    simulations: Mutex<Vec<TransactionRequest>>,
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, EngineError> {
        Ok(1)
    }
    async fn latest_block(&self) -> Result<BlockView, EngineError> {
        Ok(BlockView {
            number: 100,
            base_fee_per_gas: self.base_fee,
        })
    }
    async fn block_number(&self) -> Result<u64, EngineError> {
        Ok(100)
    }
    async fn transaction_count(&self, _address: Address) -> Result<u64, EngineError> {
        Ok(0)
    }
    async fn get_code(&self, _address: Address) -> Result<Bytes, EngineError> {
        Ok(Bytes::from(vec![0x60, 0x80]))
    }
    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, EngineError> {
        if self.fail_estimate {
            return Err(EngineError::Estimation("execution reverted".into()));
        }
        Ok(90_000)
    }
    async fn call_pending(&self, tx: &TransactionRequest) -> Result<Bytes, EngineError> {
        self.simulations.lock().await.push(tx.clone());
        if self.fail_call {
            return Err(EngineError::Simulation("execution reverted".into()));
        }
        Ok(Bytes::new())
    }
    async fn send_raw_transaction(&self, _raw: &[u8]) -> Result<B256, EngineError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_send {
            return Err(EngineError::Submission("nonce too low".into()));
        }
        Ok(B256::from([0x42; 32]))
    }
    async fn max_priority_fee(&self) -> Result<u128, EngineError> {
        Ok(2_000_000_000)
    }
}

#[derive(Default)]
struct MockNonce {
    next: AtomicU64,
    refreshes: AtomicUsize,
}

#[async_trait]
impl NonceService for MockNonce {
    async fn get_nonce(&self) -> Result<u64, EngineError> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
    async fn refresh_nonce(&self) -> Result<(), EngineError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    async fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

struct MockGate {
    gas_price_gwei: f64,
}

#[async_trait]
impl SafetyGate for MockGate {
    async fn dynamic_gas_price_gwei(&self) -> Result<f64, EngineError> {
        Ok(self.gas_price_gwei)
    }
    async fn balance_eth(&self, _account: Address) -> Result<f64, EngineError> {
        Ok(1.0)
    }
    async fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

struct MockMarket {
    symbol: Option<&'static str>,
    price: f64,
    history: Vec<f64>,
    volume: f64,
    change_24h: f64,
    fail_price: bool,
}

impl Default for MockMarket {
    fn default() -> Self {
        Self {
            symbol: Some("WETH"),
            price: 100.0,
            history: vec![98.0, 99.0, 100.0],
            volume: 2_000_000.0,
            change_24h: 3.0,
            fail_price: false,
        }
    }
}

#[async_trait]
impl MarketDataFeed for MockMarket {
    async fn token_symbol(&self, _token: Address) -> Result<Option<String>, EngineError> {
        Ok(self.symbol.map(str::to_string))
    }
    async fn real_time_price(&self, _symbol: &str) -> Result<f64, EngineError> {
        if self.fail_price {
            return Err(EngineError::Connection("price feed down".into()));
        }
        Ok(self.price)
    }
    async fn price_history(
        &self,
        _symbol: &str,
        _timeframe_hours: u32,
    ) -> Result<Vec<f64>, EngineError> {
        Ok(self.history.clone())
    }
    async fn token_volume_24h(&self, _symbol: &str) -> Result<f64, EngineError> {
        Ok(self.volume)
    }
    async fn price_change_24h(&self, _symbol: &str) -> Result<f64, EngineError> {
        Ok(self.change_24h)
    }
}

struct MockWatch {
    conditions: MarketConditions,
    predicted: f64,
    arbitrage: bool,
}

impl Default for MockWatch {
    fn default() -> Self {
        Self {
            conditions: MarketConditions {
                high_volatility: true,
                low_liquidity: false,
                bullish_trend: true,
            },
            predicted: 110.0,
            arbitrage: false,
        }
    }
}

#[async_trait]
impl MarketWatch for MockWatch {
    async fn market_conditions(&self, _venue: Address) -> Result<MarketConditions, EngineError> {
        Ok(self.conditions)
    }
    async fn predict_price(&self, _symbol: &str) -> Result<f64, EngineError> {
        Ok(self.predicted)
    }
    async fn is_arbitrage_opportunity(
        &self,
        _tx: &TargetTransaction,
    ) -> Result<bool, EngineError> {
        Ok(self.arbitrage)
    }
}

// ---------------------------------------------------------------------------
// Relay stub
// ---------------------------------------------------------------------------

/// Serve canned JSON-RPC responses over raw TCP; returns the endpoint URL
/// and a hit counter.
async fn spawn_relay(body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_inner = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            hits_inner.fetch_add(1, Ordering::SeqCst);
            let mut buf = vec![0u8; 16384];
            let mut read = 0;
            // Read until the full request (headers + body) has arrived.
            loop {
                match sock.read(&mut buf[read..]).await {
                    Ok(0) => break,
                    Ok(n) => {
                        read += n;
                        let text = String::from_utf8_lossy(&buf[..read]);
                        if let Some(header_end) = text.find("\r\n\r\n") {
                            let content_length = text
                                .lines()
                                .find_map(|l| {
                                    l.to_ascii_lowercase()
                                        .strip_prefix("content-length:")
                                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                                })
                                .unwrap_or(0);
                            if read >= header_end + 4 + content_length {
                                break;
                            }
                        }
                    }
                    Err(_) => break,
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = sock.write_all(response.as_bytes()).await;
        }
    });
    (format!("http://{}", addr), hits)
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    nonce: Arc<MockNonce>,
    builder: Arc<TransactionBuilder>,
    executor: StrategyExecutor,
}

fn execution_settings() -> ExecutionSettings {
    ExecutionSettings {
        max_retries: 3,
        retry_delay: Duration::from_millis(1),
        max_gas_price_gwei: 500,
        cancel_gas_price_gwei: 60,
        native_transfer_gas_multiplier: 1.1,
    }
}

fn strategy_settings() -> StrategySettings {
    StrategySettings {
        min_profit_eth: 0.001,
        flashloan_profit_percentage: 0.5,
        aggressive_front_run_min_value_eth: 0.02,
        aggressive_front_run_risk_threshold: 0.7,
        front_run_opportunity_score_threshold: 70.0,
        volatility_front_run_score_threshold: 75.0,
        price_dip_back_run_threshold: 0.99,
        price_boost_momentum_threshold: 2.0,
        sandwich_gas_price_threshold_gwei: 200.0,
    }
}

fn harness_with(
    chain: Arc<MockChain>,
    market: MockMarket,
    watch: MockWatch,
    relays: Vec<RelayEndpoint>,
) -> Harness {
    let nonce = Arc::new(MockNonce::default());
    let safety: Arc<dyn SafetyGate> = Arc::new(MockGate {
        gas_price_gwei: 50.0,
    });
    let chain_dyn: Arc<dyn ChainClient> = chain.clone();
    let gas = GasPlanner::new(chain_dyn.clone(), safety.clone(), 1.1);
    let signer = PrivateKeySigner::random();
    let builder = Arc::new(TransactionBuilder::new(
        chain_dyn.clone(),
        nonce.clone(),
        safety.clone(),
        gas,
        signer,
        FLASHLOAN,
        execution_settings(),
    ));
    let bundles = Arc::new(BundleSubmitter::new(
        chain_dyn,
        nonce.clone(),
        builder.clone(),
        PrivateKeySigner::random(),
        relays,
        3,
        Duration::from_millis(1),
        Duration::from_secs(5),
    ));
    let mut routers = HashMap::new();
    routers.insert(UNISWAP_V2_ROUTER, "Uniswap".to_string());

    let executor = StrategyExecutor::new(
        AbiRegistry::new(),
        builder.clone(),
        bundles,
        Arc::new(market),
        Arc::new(watch),
        safety,
        routers,
        FLASHLOAN,
        strategy_settings(),
    );
    Harness {
        nonce,
        builder,
        executor,
    }
}

fn relay_endpoint(url: &str) -> RelayEndpoint {
    RelayEndpoint {
        name: format!("relay-{url}"),
        url: url.to_string(),
        auth_header: "X-Flashbots-Signature".to_string(),
    }
}

fn swap_target(profit_eth: f64) -> TargetTransaction {
    let input = SwapCall::ExactTokensForTokens {
        amount_in: U256::from(1_000_000u64),
        amount_out_min: U256::from(990_000u64),
        path: vec![WETH, DAI],
        to: Address::from([0x77; 20]),
        deadline: U256::from(1_800_000_000u64),
    }
    .abi_encode();

    TargetTransaction {
        hash: B256::from([0xaa; 32]),
        from: Address::from([0x01; 20]),
        to: Some(UNISWAP_V2_ROUTER),
        input: Some(input.into()),
        value: Some(U256::from(10u128.pow(18))),
        gas_price: Some(30_000_000_000),
        nonce: Some(12),
        estimated_profit_eth: profit_eth,
    }
}

// ---------------------------------------------------------------------------
// Gas model
// ---------------------------------------------------------------------------

#[tokio::test]
async fn estimate_gas_falls_back_to_default_on_revert() {
    let chain: Arc<dyn ChainClient> = Arc::new(MockChain {
        fail_estimate: true,
        ..Default::default()
    });
    let safety: Arc<dyn SafetyGate> = Arc::new(MockGate {
        gas_price_gwei: 50.0,
    });
    let planner = GasPlanner::new(chain, safety, 1.1);
    let gas = planner.estimate_gas(&TransactionRequest::default()).await;
    assert_eq!(gas, DEFAULT_GAS_LIMIT);
}

#[tokio::test]
async fn gas_plan_pads_estimate_and_scales_price() {
    let chain: Arc<dyn ChainClient> = Arc::new(MockChain::default());
    let safety: Arc<dyn SafetyGate> = Arc::new(MockGate {
        gas_price_gwei: 100.0,
    });
    let planner = GasPlanner::new(chain, safety, 1.1);
    let plan = planner
        .build_gas_parameters(&TransactionRequest::default(), None)
        .await;
    assert_eq!(plan.gas, 99_000); // 90_000 + 10%
    assert_eq!(plan.gas_price, 110_000_000_000); // 100 gwei × 1.1
}

// ---------------------------------------------------------------------------
// Builder execution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execute_stops_at_gas_ceiling_after_first_failure() {
    let chain = Arc::new(MockChain {
        fail_send: true,
        ..Default::default()
    });
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );

    let call = forerunner::services::strategy::builder::FunctionCall {
        to: UNISWAP_V2_ROUTER,
        calldata: vec![0x01],
        value: U256::ZERO,
    };
    let mut req = harness
        .builder
        .build(&call, TxOverrides::default())
        .await
        .expect("build");
    req.gas_price = Some(600_000_000_000); // 600 gwei, above the 500 ceiling

    let result = harness.builder.execute(&req).await;
    assert!(result.is_none());
    // The ceiling is a hard stop: exactly one submission attempt despite
    // two retries remaining.
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn execute_exhausts_retries_below_ceiling() {
    let chain = Arc::new(MockChain {
        fail_send: true,
        ..Default::default()
    });
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );

    let call = forerunner::services::strategy::builder::FunctionCall {
        to: UNISWAP_V2_ROUTER,
        calldata: vec![0x01],
        value: U256::ZERO,
    };
    let req = harness
        .builder
        .build(&call, TxOverrides::default())
        .await
        .expect("build");

    let result = harness.builder.execute(&req).await;
    assert!(result.is_none());
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancel_sends_a_zero_value_self_transfer() {
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );
    assert!(harness.builder.cancel(9).await);
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Strategy pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn structurally_invalid_targets_build_nothing() {
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );

    for strip in 0..4 {
        let mut target = swap_target(2.0);
        match strip {
            0 => target.input = None,
            1 => target.to = None,
            2 => target.value = None,
            _ => target.gas_price = None,
        }
        assert!(!harness.executor.front_run(&target).await);
        assert!(!harness.executor.back_run(&target).await);
    }
    // No companion was ever simulated or submitted.
    assert!(chain.simulations.lock().await.is_empty());
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn flashloan_amount_scales_profit_into_wei() {
    let harness = harness_with(
        Arc::new(MockChain::default()),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );
    // 2.0 profit × 0.5 percentage → 1.0 × 10^18 wei
    let amount = harness.executor.flashloan_amount(&swap_target(2.0));
    assert_eq!(amount, U256::from(10u128.pow(18)));
    assert_eq!(
        harness.executor.flashloan_amount(&swap_target(0.0)),
        U256::ZERO
    );
}

#[tokio::test]
async fn front_run_without_profit_prepares_no_bundle() {
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );
    // Zero profit → zero flashloan amount → the required flashloan member
    // is missing and the strategy fails closed.
    assert!(!harness.executor.front_run(&swap_target(0.0)).await);
    assert!(chain.simulations.lock().await.is_empty());
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn back_run_reverses_the_decoded_path() {
    let (url, _hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        vec![relay_endpoint(&url)],
    );

    assert!(harness.executor.back_run(&swap_target(2.0)).await);

    let simulations = chain.simulations.lock().await;
    assert_eq!(simulations.len(), 1);
    let input = simulations[0].input.clone().into_input().expect("input");
    let decoded = AbiRegistry::new()
        .decode_calldata(&input, UNISWAP_V2_ROUTER)
        .expect("decode companion");
    assert_eq!(decoded.path(), Some(&[DAI, WETH][..]));
}

#[tokio::test]
async fn sandwich_fails_closed_on_unknown_router() {
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        Vec::new(),
    );

    let mut target = swap_target(2.0);
    target.to = Some(Address::from([0x99; 20])); // not in the router table

    assert!(
        !harness
            .executor
            .sandwich_attack(&target, SandwichVariant::Plain)
            .await
    );
    assert!(chain.simulations.lock().await.is_empty());
    assert_eq!(chain.send_attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sandwich_submits_three_member_bundle() {
    let (url, hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        vec![relay_endpoint(&url)],
    );

    assert!(
        harness
            .executor
            .sandwich_attack(&swap_target(2.0), SandwichVariant::Plain)
            .await
    );
    assert_eq!(chain.simulations.lock().await.len(), 3);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.nonce.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_simulation_blocks_submission() {
    let (url, hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain {
        fail_call: true,
        ..Default::default()
    });
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        vec![relay_endpoint(&url)],
    );

    assert!(!harness.executor.back_run(&swap_target(2.0)).await);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.nonce.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predictive_front_run_fails_closed_on_partial_data() {
    let chain = Arc::new(MockChain::default());
    let market = MockMarket {
        fail_price: true,
        ..Default::default()
    };
    let harness = harness_with(chain.clone(), market, MockWatch::default(), Vec::new());

    assert!(!harness.executor.predictive_front_run(&swap_target(2.0)).await);
    assert!(chain.simulations.lock().await.is_empty());
}

#[tokio::test]
async fn predictive_front_run_executes_on_strong_signals() {
    let (url, _hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain::default());
    // Predicted 10% above current, calm flags, upward history.
    let market = MockMarket {
        price: 100.0,
        history: vec![98.0, 99.0, 100.0],
        ..Default::default()
    };
    let watch = MockWatch {
        conditions: MarketConditions {
            high_volatility: false,
            low_liquidity: false,
            bullish_trend: true,
        },
        predicted: 110.0,
        arbitrage: false,
    };
    let harness = harness_with(chain.clone(), market, watch, vec![relay_endpoint(&url)]);

    assert!(harness.executor.predictive_front_run(&swap_target(2.0)).await);
    // Flashloan + front-run both simulated before the bundle went out.
    assert_eq!(chain.simulations.lock().await.len(), 2);
}

#[tokio::test]
async fn high_volume_back_run_gates_on_symbol_threshold() {
    let (url, _hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain::default());
    let market = MockMarket {
        symbol: Some("ETH"),
        volume: 900_000.0, // below the 1M ETH threshold
        ..Default::default()
    };
    let harness = harness_with(chain.clone(), market, MockWatch::default(), vec![
        relay_endpoint(&url),
    ]);
    assert!(!harness.executor.high_volume_back_run(&swap_target(2.0)).await);

    let market = MockMarket {
        symbol: Some("ETH"),
        volume: 1_500_000.0,
        ..Default::default()
    };
    let harness = harness_with(
        Arc::new(MockChain::default()),
        market,
        MockWatch::default(),
        vec![relay_endpoint(&url)],
    );
    assert!(harness.executor.high_volume_back_run(&swap_target(2.0)).await);
}

// ---------------------------------------------------------------------------
// Bundle submission semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bundle_succeeds_when_any_relay_accepts() {
    let (good_url, good_hits) = spawn_relay(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).await;
    let chain = Arc::new(MockChain::default());
    let relays = vec![
        relay_endpoint("http://127.0.0.1:9"), // transport failure on every attempt
        relay_endpoint(&good_url),
    ];
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        relays,
    );

    assert!(harness.executor.back_run(&swap_target(2.0)).await);
    assert_eq!(good_hits.load(Ordering::SeqCst), 1);
    // Refresh fires exactly once despite the dead relay.
    assert_eq!(harness.nonce.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bundle_fails_when_all_relays_fail() {
    let chain = Arc::new(MockChain::default());
    let relays = vec![relay_endpoint("http://127.0.0.1:9")];
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        relays,
    );

    assert!(!harness.executor.back_run(&swap_target(2.0)).await);
    assert_eq!(harness.nonce.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn application_error_aborts_relay_without_retry() {
    let (url, hits) =
        spawn_relay(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"bundle rejected"}}"#)
            .await;
    let chain = Arc::new(MockChain::default());
    let harness = harness_with(
        chain.clone(),
        MockMarket::default(),
        MockWatch::default(),
        vec![relay_endpoint(&url)],
    );

    assert!(!harness.executor.back_run(&swap_target(2.0)).await);
    // One POST only: application-level errors are not retried.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.nonce.refreshes.load(Ordering::SeqCst), 0);
}
