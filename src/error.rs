//! Error types for the alert browser
//!
//! Configuration errors are the only class allowed to abort startup. Query and
//! target-creation errors are caught by the binding controller and turned into
//! diagnostics, so they never escape a dispatch cycle.

use thiserror::Error;

/// Main error type for the alert browser
#[derive(Error, Debug)]
pub enum DashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Target error: {0}")]
    Target(#[from] TargetError),
}

/// Registry and settings errors. Fatal, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not import {identifier}. Did you provide the correct path?")]
    UnresolvableAdapter { identifier: String },

    #[error("Could not find a broker named '{name}'. Did you add it to TOM_ALERT_DASH_CLASSES?")]
    BrokerNotFound { name: String },

    #[error("Broker '{name}' is registered more than once")]
    DuplicateBroker { name: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client for {broker}: {message}")]
    Client { broker: String, message: String },
}

/// Faults raised while talking to a broker service.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{broker} request failed: {message}")]
    Transport { broker: String, message: String },

    #[error("{broker} returned a malformed response: {message}")]
    MalformedResponse { broker: String, message: String },
}

impl QueryError {
    /// Wrap a fetcher failure, keeping the whole context chain in the message.
    pub fn transport(broker: &str, err: anyhow::Error) -> Self {
        Self::Transport {
            broker: broker.to_string(),
            message: format!("{:#}", err),
        }
    }

    pub fn malformed(broker: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            broker: broker.to_string(),
            message: message.into(),
        }
    }
}

/// Failures converting an alert payload into a persisted target.
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("alert payload is empty")]
    EmptyPayload,

    #[error("alert payload is missing {field}")]
    MissingField { field: &'static str },

    #[error("row {index} is not in the current table")]
    RowOutOfRange { index: usize },

    #[error("host rejected target '{name}': {reason}")]
    Rejected { name: String, reason: String },
}

pub type DashResult<T> = Result<T, DashError>;
