// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::EngineError;
use crate::common::parsing::{gwei_to_wei, wei_to_gwei};
use crate::domain::constants::{NATIVE_TRANSFER_GAS, WEI_PER_ETH, pad_gas_limit};
use crate::domain::types::TargetTransaction;
use crate::infrastructure::network::chain::ChainClient;
use crate::infrastructure::network::gas::{GasPlan, GasPlanner};
use crate::infrastructure::network::nonce::NonceService;
use crate::services::markets::SafetyGate;
use crate::services::strategy::routers::FlashloanVault;
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, TxKind, U256};
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// A contract call to wrap into a transaction.
#[derive(Clone, Debug)]
pub struct FunctionCall {
    pub to: Address,
    pub calldata: Vec<u8>,
    pub value: U256,
}

/// Optional field overrides merged into a built request.
#[derive(Clone, Copy, Debug, Default)]
pub struct TxOverrides {
    pub value: Option<U256>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
}

/// Retry and pricing bounds for transaction execution.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionSettings {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub max_gas_price_gwei: u64,
    pub cancel_gas_price_gwei: u64,
    pub native_transfer_gas_multiplier: f64,
}

/// Assembles, signs, submits, and simulates the engine's own transactions.
pub struct TransactionBuilder {
    chain: Arc<dyn ChainClient>,
    nonce: Arc<dyn NonceService>,
    safety: Arc<dyn SafetyGate>,
    gas: GasPlanner,
    signer: PrivateKeySigner,
    flashloan_address: Address,
    settings: ExecutionSettings,
    current_profit: Mutex<f64>,
}

impl TransactionBuilder {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        nonce: Arc<dyn NonceService>,
        safety: Arc<dyn SafetyGate>,
        gas: GasPlanner,
        signer: PrivateKeySigner,
        flashloan_address: Address,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            chain,
            nonce,
            safety,
            gas,
            signer,
            flashloan_address,
            settings,
            current_profit: Mutex::new(0.0),
        }
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Assemble a request around a contract call: chain id, latest block,
    /// fee fields per the block's fee model, next nonce, overrides, then
    /// the padded gas estimate.
    pub async fn build(
        &self,
        call: &FunctionCall,
        overrides: TxOverrides,
    ) -> Result<TransactionRequest, EngineError> {
        let chain_id = self
            .chain
            .chain_id()
            .await
            .map_err(|e| EngineError::Build(format!("Chain id unavailable: {}", e)))?;
        let block = self
            .chain
            .latest_block()
            .await
            .map_err(|e| EngineError::Build(format!("Latest block unavailable: {}", e)))?;
        let nonce = self
            .nonce
            .get_nonce()
            .await
            .map_err(|e| EngineError::Build(format!("Nonce unavailable: {}", e)))?;

        let mut req = TransactionRequest {
            chain_id: Some(chain_id),
            nonce: Some(nonce),
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(call.to)),
            value: Some(call.value),
            input: TransactionInput::new(call.calldata.clone().into()),
            ..Default::default()
        };

        let fees = self
            .gas
            .fee_params(&block)
            .await
            .map_err(|e| EngineError::Build(format!("Fee selection failed: {}", e)))?;
        fees.apply(&mut req);

        if let Some(value) = overrides.value {
            req.value = Some(value);
        }
        if let Some(gas_price) = overrides.gas_price {
            req.gas_price = Some(gas_price);
        }
        if let Some(nonce) = overrides.nonce {
            req.nonce = Some(nonce);
        }

        let gas = match overrides.gas {
            Some(limit) => limit,
            None => pad_gas_limit(self.gas.estimate_gas(&req).await),
        };
        req.gas = Some(gas);

        Ok(req)
    }

    /// Sign a request with the agent's key. The request must carry a nonce,
    /// target, gas limit, chain id, and either a legacy gas price or both
    /// fee-market fields.
    pub fn sign(&self, req: &TransactionRequest) -> Result<Vec<u8>, EngineError> {
        let nonce = req
            .nonce
            .ok_or_else(|| EngineError::Signing("Missing nonce".into()))?;
        let to = req
            .to
            .ok_or_else(|| EngineError::Signing("Missing `to`".into()))?;
        let gas_limit = req
            .gas
            .ok_or_else(|| EngineError::Signing("Missing gas limit".into()))?;
        let chain_id = req
            .chain_id
            .ok_or_else(|| EngineError::Signing("Missing chain id".into()))?;
        let value = req.value.unwrap_or_default();
        let input = req.input.clone().into_input().unwrap_or_default();

        let signed: TxEnvelope = if let Some(gas_price) = req.gas_price {
            if gas_price == 0 {
                return Err(EngineError::Signing("Zero gas price".into()));
            }
            let mut tx = TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                input,
            };
            let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
                .map_err(|e| EngineError::Signing(e.to_string()))?;
            tx.into_signed(sig).into()
        } else {
            let max_fee_per_gas = req
                .max_fee_per_gas
                .ok_or_else(|| EngineError::Signing("Missing max_fee_per_gas".into()))?;
            let max_priority_fee_per_gas = req.max_priority_fee_per_gas.ok_or_else(|| {
                EngineError::Signing("Missing max_priority_fee_per_gas".into())
            })?;
            let mut tx = TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                to,
                value,
                access_list: Default::default(),
                input,
            };
            let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
                .map_err(|e| EngineError::Signing(e.to_string()))?;
            tx.into_signed(sig).into()
        };

        tracing::debug!(target: "builder", nonce, "Transaction signed");
        Ok(signed.encoded_2718())
    }

    /// Broadcast a signed transaction. Submission failures pass through
    /// unchanged.
    pub async fn submit(&self, raw: &[u8]) -> Result<B256, EngineError> {
        self.chain.send_raw_transaction(raw).await
    }

    /// Sign and submit with bounded retries and a linearly increasing
    /// delay. Before each retry the request's gas price is re-checked
    /// against the configured ceiling; a breach is a hard stop, not a
    /// transient failure. Returns `None` when attempts are exhausted or
    /// the ceiling is hit.
    pub async fn execute(&self, req: &TransactionRequest) -> Option<B256> {
        for attempt in 1..=self.settings.max_retries {
            match self.sign(req) {
                Ok(raw) => match self.submit(&raw).await {
                    Ok(hash) => {
                        tracing::debug!(target: "builder", %hash, attempt, "Transaction sent");
                        return Some(hash);
                    }
                    Err(e) => {
                        tracing::warn!(target: "builder", attempt, error = %e, "Submission failed");
                    }
                },
                Err(e) => {
                    tracing::error!(target: "builder", attempt, error = %e, "Signing failed");
                }
            }

            let gas_price_gwei = req
                .gas_price
                .or(req.max_fee_per_gas)
                .map(wei_to_gwei)
                .unwrap_or(0.0);
            if gas_price_gwei > self.settings.max_gas_price_gwei as f64 {
                let err = EngineError::GasCeiling {
                    gwei: gas_price_gwei as u128,
                    ceiling: self.settings.max_gas_price_gwei as u128,
                };
                tracing::warn!(target: "builder", error = %err, "Aborting execution");
                return None;
            }

            sleep(self.settings.retry_delay.saturating_mul(attempt)).await;
        }

        tracing::error!(target: "builder", "Failed to execute transaction after retries");
        None
    }

    /// Merge precomputed gas parameters into a request and execute it.
    pub async fn execute_with_gas(
        &self,
        req: &TransactionRequest,
        plan: GasPlan,
    ) -> Option<B256> {
        let mut req = req.clone();
        req.gas_price = Some(plan.gas_price);
        req.gas = Some(plan.gas);
        self.execute(&req).await
    }

    /// Evict a stuck transaction by out-pricing it with a zero-value
    /// self-transfer under the same nonce. Reports whether the replacement
    /// was accepted for broadcast, not whether it was mined.
    pub async fn cancel(&self, nonce: u64) -> bool {
        let chain_id = match self.chain.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(target: "builder", nonce, error = %e, "Cancel failed fetching chain id");
                return false;
            }
        };

        let req = TransactionRequest {
            chain_id: Some(chain_id),
            nonce: Some(nonce),
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(self.signer.address())),
            value: Some(U256::ZERO),
            gas: Some(NATIVE_TRANSFER_GAS),
            gas_price: Some(gwei_to_wei(self.settings.cancel_gas_price_gwei as f64)),
            ..Default::default()
        };

        let raw = match self.sign(&req) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(target: "builder", nonce, error = %e, "Cancel signing failed");
                return false;
            }
        };
        match self.submit(&raw).await {
            Ok(hash) => {
                tracing::debug!(target: "builder", nonce, %hash, "Cancellation transaction sent");
                true
            }
            Err(e) => {
                tracing::error!(target: "builder", nonce, error = %e, "Cancel submission failed");
                false
            }
        }
    }

    /// Read-only call against pending state; any revert or transport
    /// failure is a negative result, never an error.
    pub async fn simulate(&self, req: &TransactionRequest) -> bool {
        match self.chain.call_pending(req).await {
            Ok(_) => {
                tracing::debug!(target: "builder", nonce = ?req.nonce, "Simulation succeeded");
                true
            }
            Err(e) => {
                tracing::debug!(target: "builder", nonce = ?req.nonce, error = %e, "Simulation failed");
                false
            }
        }
    }

    /// Front-run a plain native-coin transfer: same recipient, the
    /// target's gas price scaled by the configured multiplier.
    pub async fn handle_native_transfer(&self, target: &TargetTransaction) -> bool {
        let value = target.value.unwrap_or_default();
        if value.is_zero() {
            tracing::debug!(target: "builder", hash = %target.hash, "Transfer value is zero, skipping");
            return false;
        }
        let Some(to) = target.to else {
            tracing::debug!(target: "builder", hash = %target.hash, "Transfer has no recipient, skipping");
            return false;
        };
        let original_gas_price = target.gas_price.unwrap_or(0);
        if original_gas_price == 0 {
            tracing::warn!(target: "builder", hash = %target.hash, "Target gas price is zero, skipping");
            return false;
        }

        let chain_id = match self.chain.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(target: "builder", error = %e, "Chain id unavailable for transfer");
                return false;
            }
        };
        let nonce = match self.nonce.get_nonce().await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(target: "builder", error = %e, "Nonce unavailable for transfer");
                return false;
            }
        };

        let gas_price =
            (original_gas_price as f64 * self.settings.native_transfer_gas_multiplier) as u128;
        let req = TransactionRequest {
            chain_id: Some(chain_id),
            nonce: Some(nonce),
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(to)),
            value: Some(value),
            gas: Some(NATIVE_TRANSFER_GAS),
            gas_price: Some(gas_price),
            ..Default::default()
        };

        self.execute(&req).await.is_some()
    }

    /// Balance through the safety gate, cached as the last observed profit
    /// figure; zero on failure.
    pub async fn current_profit(&self) -> f64 {
        match self.safety.balance_eth(self.signer.address()).await {
            Ok(balance) => {
                let mut guard = self.current_profit.lock().await;
                *guard = balance;
                balance
            }
            Err(e) => {
                tracing::error!(target: "builder", error = %e, "Balance lookup failed");
                0.0
            }
        }
    }

    /// Withdraw accumulated native coin from the flashloan contract.
    pub async fn withdraw_native(&self) -> bool {
        let call = FunctionCall {
            to: self.flashloan_address,
            calldata: FlashloanVault::withdrawETHCall {}.abi_encode(),
            value: U256::ZERO,
        };
        match self.build(&call, TxOverrides::default()).await {
            Ok(req) => self.execute(&req).await.is_some(),
            Err(e) => {
                tracing::error!(target: "builder", error = %e, "Withdraw build failed");
                false
            }
        }
    }

    /// Transfer part of the profit held by the flashloan contract.
    pub async fn transfer_profit(&self, amount_eth: f64, to: Address) -> bool {
        if amount_eth <= 0.0 {
            return false;
        }
        let amount = U256::from((amount_eth * WEI_PER_ETH) as u128);
        let call = FunctionCall {
            to: self.flashloan_address,
            calldata: FlashloanVault::transferCall { to, amount }.abi_encode(),
            value: U256::ZERO,
        };
        match self.build(&call, TxOverrides::default()).await {
            Ok(req) => self.execute(&req).await.is_some(),
            Err(e) => {
                tracing::error!(target: "builder", error = %e, "Profit transfer build failed");
                false
            }
        }
    }

    /// Code-presence probe for screening interaction targets.
    pub async fn is_contract_address(&self, address: Address) -> bool {
        match self.chain.get_code(address).await {
            Ok(code) => !code.is_empty(),
            Err(e) => {
                tracing::error!(target: "builder", %address, error = %e, "Code lookup failed");
                false
            }
        }
    }

    pub async fn stop(&self) -> Result<(), EngineError> {
        self.safety.stop().await?;
        self.nonce.stop().await?;
        tracing::debug!(target: "builder", "Transaction builder stopped");
        Ok(())
    }
}
