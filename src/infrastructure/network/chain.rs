// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::EngineError;
use crate::domain::types::BlockView;
use crate::infrastructure::network::provider::HttpProvider;
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{BlockId, BlockNumberOrTag, TransactionRequest};
use async_trait::async_trait;

/// Chain RPC surface the engine depends on. The production implementation
/// wraps an alloy provider; tests substitute programmable fakes.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, EngineError>;
    async fn latest_block(&self) -> Result<BlockView, EngineError>;
    async fn block_number(&self) -> Result<u64, EngineError>;
    async fn transaction_count(&self, address: Address) -> Result<u64, EngineError>;
    async fn get_code(&self, address: Address) -> Result<Bytes, EngineError>;
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, EngineError>;
    /// Read-only call of the request against pending block state.
    async fn call_pending(&self, tx: &TransactionRequest) -> Result<Bytes, EngineError>;
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, EngineError>;
    async fn max_priority_fee(&self) -> Result<u128, EngineError>;
}

pub struct RpcChainClient {
    provider: HttpProvider,
}

impl RpcChainClient {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64, EngineError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| EngineError::Connection(format!("chain_id fetch failed: {}", e)))
    }

    async fn latest_block(&self) -> Result<BlockView, EngineError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| EngineError::Connection(format!("Latest block fetch failed: {}", e)))?
            .ok_or_else(|| EngineError::Connection("Latest block unavailable".into()))?;

        Ok(BlockView {
            number: block.header.number,
            base_fee_per_gas: block.header.base_fee_per_gas.map(u128::from),
        })
    }

    async fn block_number(&self) -> Result<u64, EngineError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| EngineError::Connection(format!("Block number fetch failed: {}", e)))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, EngineError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| EngineError::Connection(format!("Nonce fetch failed: {}", e)))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, EngineError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| EngineError::Connection(format!("Code fetch failed: {}", e)))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, EngineError> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| EngineError::Estimation(e.to_string()))
    }

    async fn call_pending(&self, tx: &TransactionRequest) -> Result<Bytes, EngineError> {
        self.provider
            .call(tx.clone())
            .block(BlockId::pending())
            .await
            .map_err(|e| EngineError::Simulation(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, EngineError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| EngineError::Submission(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn max_priority_fee(&self) -> Result<u128, EngineError> {
        self.provider
            .get_max_priority_fee_per_gas()
            .await
            .map_err(|e| EngineError::Connection(format!("Priority fee fetch failed: {}", e)))
    }
}
