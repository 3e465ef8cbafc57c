//! Error types for fedeval

use std::path::PathBuf;

use thiserror::Error;

/// All possible errors in fedeval
#[derive(Error, Debug)]
pub enum FedEvalError {
    /// A client reported a negative sample count
    #[error("Negative sample count {value} from client {client}")]
    NegativeSampleCount {
        /// Position of the report in the round
        client: usize,
        /// Reported count
        value: i64,
    },

    /// A metric value is NaN or infinite
    #[error("Metric '{metric}' from client {client} is not finite: {value}")]
    NonFiniteMetric {
        /// Position of the report in the round
        client: usize,
        /// Metric name
        metric: String,
        /// Offending value
        value: f64,
    },

    /// The weights backing a metric sum to zero, so no mean exists
    #[error("Metric '{metric}' has zero total weight (all reporting clients have 0 examples)")]
    ZeroWeight {
        /// Metric name
        metric: String,
    },

    /// A client fraction is outside [0.0, 1.0]
    #[error("Invalid {name}: {value} (must be 0.0-1.0)")]
    InvalidFraction {
        /// Field name
        name: &'static str,
        /// Configured value
        value: f64,
    },

    /// Minimum client counts are inconsistent
    #[error("Invalid client count: {0}")]
    InvalidClientCount(String),

    /// Configuration failed validation (all problems listed)
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Configuration file could not be read
    #[error("Config I/O error ({}): {source}", .path.display())]
    ConfigIo {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`Config`](crate::config::Config)
    #[error("Config parse error ({}): {source}", .path.display())]
    ConfigParse {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// An environment override could not be applied
    #[error("Invalid override {var}={value}: {reason}")]
    InvalidOverride {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Not enough clients connected to start a round
    #[error("Insufficient clients in round {round}: need {needed}, got {actual}")]
    InsufficientClients {
        /// Round number (1-indexed)
        round: u32,
        /// Minimum required clients
        needed: usize,
        /// Clients available
        actual: usize,
    },

    /// Failure reported by the runtime executing rounds
    #[error("Runtime error: {0}")]
    Runtime(String),
}
