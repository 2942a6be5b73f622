// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use thiserror::Error;

/// Engine-wide error taxonomy. Internal operations return these; public
/// strategy entry points log at the boundary and resolve to a negative
/// result. Only malformed call sites (for example signing a request
/// without a nonce) surface one to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Address {0} is not a well-formed hex address")]
    InvalidAddress(String),

    #[error("Calldata decode failed: {0}")]
    Decode(String),

    #[error("Gas estimation failed: {0}")]
    Estimation(String),

    #[error("Simulation failed: {0}")]
    Simulation(String),

    #[error("Transaction build failed: {0}")]
    Build(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Gas price {gwei} gwei exceeds ceiling of {ceiling} gwei")]
    GasCeiling { gwei: u128, ceiling: u128 },

    #[error("Relay {relay} rejected bundle: {reason}")]
    Relay { relay: String, reason: String },

    #[error("Connection failed: {0}")]
    Connection(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
