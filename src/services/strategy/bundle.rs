// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::EngineError;
use crate::infrastructure::network::chain::ChainClient;
use crate::infrastructure::network::nonce::NonceService;
use crate::services::strategy::builder::TransactionBuilder;
use alloy::primitives::keccak256;
use alloy::rpc::types::eth::TransactionRequest;
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// One configured relay target.
#[derive(Clone, Debug, Deserialize)]
pub struct RelayEndpoint {
    pub name: String,
    pub url: String,
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

fn default_auth_header() -> String {
    "X-Flashbots-Signature".to_string()
}

/// Signs transaction sets and posts them to every configured relay.
/// Success is at-least-one-relay, not all-or-nothing.
pub struct BundleSubmitter {
    chain: Arc<dyn ChainClient>,
    nonce: Arc<dyn NonceService>,
    builder: Arc<TransactionBuilder>,
    bundle_signer: PrivateKeySigner,
    relays: Vec<RelayEndpoint>,
    max_retries: u32,
    retry_delay: Duration,
    relay_timeout: Duration,
}

impl BundleSubmitter {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        nonce: Arc<dyn NonceService>,
        builder: Arc<TransactionBuilder>,
        bundle_signer: PrivateKeySigner,
        relays: Vec<RelayEndpoint>,
        max_retries: u32,
        retry_delay: Duration,
        relay_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            nonce,
            builder,
            bundle_signer,
            relays,
            max_retries,
            retry_delay,
            relay_timeout,
        }
    }

    /// Sign every member, build one `eth_sendBundle` payload targeting the
    /// next block, and post it to each relay in turn. Per relay: transport
    /// errors are retried with linear backoff up to the bound, an
    /// application-level error response aborts that relay immediately.
    /// On any relay accepting, the nonce service is refreshed once.
    pub async fn send_bundle(&self, txs: &[TransactionRequest]) -> bool {
        let mut raw_txs = Vec::with_capacity(txs.len());
        for tx in txs {
            match self.builder.sign(tx) {
                Ok(raw) => raw_txs.push(format!("0x{}", hex::encode(raw))),
                Err(e) => {
                    tracing::error!(target: "bundle", error = %e, "Bundle member signing failed");
                    return false;
                }
            }
        }

        let block_number = match self.chain.block_number().await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(target: "bundle", error = %e, "Block number unavailable");
                return false;
            }
        };
        let target_block = block_number + 1;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_sendBundle",
            "params": [{
                "txs": raw_txs,
                "blockNumber": format!("0x{:x}", target_block),
            }],
        });
        let body_bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(target: "bundle", error = %e, "Payload encoding failed");
                return false;
            }
        };

        let sig_header = match self.sign_request(&body_bytes) {
            Ok(header) => header,
            Err(e) => {
                tracing::error!(target: "bundle", error = %e, "Request signing failed");
                return false;
            }
        };

        let client = reqwest::Client::new();
        let mut successes: Vec<&str> = Vec::new();
        for relay in &self.relays {
            if self
                .post_to_relay(&client, relay, &body_bytes, &sig_header, target_block)
                .await
            {
                successes.push(&relay.name);
            }
        }

        if successes.is_empty() {
            tracing::warn!(target: "bundle", "Failed to send bundle to any relay");
            return false;
        }
        if let Err(e) = self.nonce.refresh_nonce().await {
            tracing::warn!(target: "bundle", error = %e, "Nonce refresh after bundle failed");
        }
        tracing::info!(target: "bundle", relays = %successes.join(","), block = target_block, "Bundle accepted");
        true
    }

    async fn post_to_relay(
        &self,
        client: &reqwest::Client,
        relay: &RelayEndpoint,
        body_bytes: &[u8],
        sig_header: &str,
        target_block: u64,
    ) -> bool {
        for attempt in 1..=self.max_retries {
            let response = client
                .post(&relay.url)
                .header("Content-Type", "application/json")
                .header(&relay.auth_header, sig_header)
                .timeout(self.relay_timeout)
                .body(body_bytes.to_vec())
                .send()
                .await;

            let resp = match response {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(target: "bundle", relay = %relay.name, attempt, error = %e, "Relay transport failure");
                    if attempt < self.max_retries {
                        sleep(self.retry_delay.saturating_mul(attempt)).await;
                    }
                    continue;
                }
            };

            let status = resp.status();
            if !status.is_success() {
                tracing::warn!(target: "bundle", relay = %relay.name, attempt, %status, "Relay rejected request");
                if attempt < self.max_retries {
                    sleep(self.retry_delay.saturating_mul(attempt)).await;
                }
                continue;
            }

            let body: serde_json::Value = match resp.json().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(target: "bundle", relay = %relay.name, attempt, error = %e, "Relay response unreadable");
                    if attempt < self.max_retries {
                        sleep(self.retry_delay.saturating_mul(attempt)).await;
                    }
                    continue;
                }
            };

            if let Some(err) = body.get("error") {
                // Application-level rejection: the relay understood the
                // bundle and refused it, so retrying is pointless.
                let relay_err = EngineError::Relay {
                    relay: relay.name.clone(),
                    reason: err.to_string(),
                };
                tracing::error!(target: "bundle", error = %relay_err, "Relay returned error");
                return false;
            }

            tracing::info!(target: "bundle", relay = %relay.name, block = target_block, "Bundle submitted");
            return true;
        }
        false
    }

    /// Flashbots-style request signature: `address:keccak-signature` of the
    /// exact body bytes.
    fn sign_request(&self, body_bytes: &[u8]) -> Result<String, EngineError> {
        let hash = keccak256(body_bytes);
        let sig = self
            .bundle_signer
            .sign_hash_sync(&hash)
            .map_err(|e| EngineError::Signing(format!("Bundle request signing failed: {}", e)))?;
        Ok(format!(
            "{:#x}:0x{}",
            self.bundle_signer.address(),
            hex::encode(sig.as_bytes())
        ))
    }
}
