// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use forerunner::app::config::Settings;
use forerunner::app::logging::setup_logging;
use forerunner::domain::constants::DEFAULT_GAS_PRICE_GWEI;
use forerunner::domain::error::EngineError;
use forerunner::infrastructure::network::chain::{ChainClient, RpcChainClient};
use forerunner::infrastructure::network::gas::GasPlanner;
use forerunner::infrastructure::network::nonce::{NonceManager, NonceService};
use forerunner::infrastructure::network::provider::ConnectionFactory;
use forerunner::services::markets::{SafetyGate, StaticSafetyGate};
use forerunner::services::strategy::builder::TransactionBuilder;
use forerunner::services::strategy::bundle::BundleSubmitter;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "forerunner engine")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Do not submit transactions/bundles, only report
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let cli = Cli::parse();

    let settings = Settings::load_with_path(cli.config.as_deref())?;
    setup_logging(if settings.debug { "debug" } else { "info" }, false);

    let wallet_signer = PrivateKeySigner::from_str(&settings.wallet_key)
        .map_err(|e| EngineError::Config(format!("Invalid wallet key: {}", e)))?;
    let bundle_signer = PrivateKeySigner::from_str(settings.bundle_signer_key())
        .map_err(|e| EngineError::Config(format!("Invalid bundle signer key: {}", e)))?;

    let provider = ConnectionFactory::http(&settings.http_provider)?;
    let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(provider));

    let chain_id = chain.chain_id().await?;
    let block = chain.latest_block().await?;
    tracing::info!(
        target: "main",
        chain_id,
        block = block.number,
        fee_market = block.supports_fee_market(),
        "Connected to chain"
    );

    let nonce: Arc<dyn NonceService> =
        Arc::new(NonceManager::new(chain.clone(), wallet_signer.address()));
    let safety: Arc<dyn SafetyGate> =
        Arc::new(StaticSafetyGate::new(DEFAULT_GAS_PRICE_GWEI as f64));
    let gas = GasPlanner::new(chain.clone(), safety.clone(), settings.gas_price_multiplier);

    let builder = Arc::new(TransactionBuilder::new(
        chain.clone(),
        nonce.clone(),
        safety.clone(),
        gas.clone(),
        wallet_signer.clone(),
        settings.flashloan_address,
        settings.execution_settings(),
    ));
    let _bundles = Arc::new(BundleSubmitter::new(
        chain.clone(),
        nonce.clone(),
        builder.clone(),
        bundle_signer,
        settings.relays.clone(),
        settings.max_retries,
        settings.retry_delay(),
        settings.relay_timeout(),
    ));

    // Preflight: report wallet nonce and fee posture. The mempool listener
    // and market services wire the strategy executor in when they attach.
    let next_nonce = nonce.get_nonce().await?;
    let fees = gas.fee_params(&block).await?;
    tracing::info!(
        target: "main",
        wallet = %wallet_signer.address(),
        next_nonce,
        ?fees,
        relays = settings.relays.len(),
        "Preflight complete"
    );

    if cli.dry_run {
        tracing::info!(target: "main", "Dry-run: exiting before any submission");
    }
    Ok(())
}
