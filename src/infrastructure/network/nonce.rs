// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::EngineError;
use crate::common::retry::retry_async;
use crate::infrastructure::network::chain::ChainClient;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Nonce issuance contract. Implementations must serialize issuance so
/// concurrent callers never observe the same nonce twice.
#[async_trait]
pub trait NonceService: Send + Sync {
    async fn get_nonce(&self) -> Result<u64, EngineError>;
    async fn refresh_nonce(&self) -> Result<(), EngineError>;
    async fn stop(&self) -> Result<(), EngineError>;
}

/// Local nonce allocator: lazily synced from the chain, incremented per
/// issuance, resynced on refresh. Issuance is serialized behind one mutex.
pub struct NonceManager {
    chain: Arc<dyn ChainClient>,
    address: Address,
    local_nonce: Mutex<Option<u64>>,
}

impl NonceManager {
    pub fn new(chain: Arc<dyn ChainClient>, address: Address) -> Self {
        Self {
            chain,
            address,
            local_nonce: Mutex::new(None),
        }
    }

    async fn on_chain_nonce(&self) -> Result<u64, EngineError> {
        let chain = self.chain.clone();
        let address = self.address;
        retry_async(
            move |_| {
                let chain = chain.clone();
                async move { chain.transaction_count(address).await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| EngineError::Connection(format!("Failed to fetch nonce: {}", e)))
    }
}

#[async_trait]
impl NonceService for NonceManager {
    async fn get_nonce(&self) -> Result<u64, EngineError> {
        let mut nonce_guard = self.local_nonce.lock().await;

        if let Some(nonce) = *nonce_guard {
            *nonce_guard = Some(nonce + 1);
            return Ok(nonce);
        }

        let on_chain = self.on_chain_nonce().await?;
        *nonce_guard = Some(on_chain + 1);
        Ok(on_chain)
    }

    async fn refresh_nonce(&self) -> Result<(), EngineError> {
        let mut nonce_guard = self.local_nonce.lock().await;
        let on_chain = self.on_chain_nonce().await?;
        *nonce_guard = Some(on_chain);
        tracing::info!(target: "nonce", nonce = on_chain, "Nonce resynced");
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
