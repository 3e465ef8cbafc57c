//! Server configuration.
//!
//! A [`Config`] is loaded from a TOML file with two tables:
//!
//! ```toml
//! [server]
//! address = "0.0.0.0:8080"
//! num_rounds = 20
//!
//! [strategy]
//! fraction_fit = 1.0
//! fraction_evaluate = 1.0
//! min_fit_clients = 3
//! min_evaluate_clients = 3
//! min_available_clients = 3
//! accept_failures = true
//! denominator = "per_metric"
//! ```
//!
//! Unknown keys are rejected. The bind address can be replaced at deploy
//! time through [`ADDRESS_ENV`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FedEvalError;
use crate::strategy::StrategyConfig;

/// Overrides `server.address`.
pub const ADDRESS_ENV: &str = "FEDEVAL_SERVER_ADDRESS";

/// Names the config file when none is given on the command line.
pub const CONFIG_ENV: &str = "FEDEVAL_CONFIG";

/// Check that `address` has the `host:port` shape a runtime can bind.
///
/// The host may be a name (`localhost`), an IPv4 address or a bracketed
/// IPv6 address; it is not resolved here.
pub fn check_address(address: &str) -> Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("'{}' is not host:port", address))?;
    if host.is_empty() {
        return Err(format!("'{}' has an empty host", address));
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(format!("IPv6 host in '{}' must be bracketed", address));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(format!("host in '{}' contains whitespace", address));
    }
    port.parse::<u16>()
        .map(|_| ())
        .map_err(|e| format!("invalid port in '{}': {}", address, e))
}

/// Where and for how long the server runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (host:port, host may be a name)
    pub address: String,
    /// Number of federated rounds to run
    pub num_rounds: u32,
    /// Per-round deadline for client replies; none waits indefinitely.
    ///
    /// Passed through to network runtimes. [`ReplayRuntime`](crate::ReplayRuntime)
    /// replays finished rounds and never waits, so it ignores this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Round deadline as a [`Duration`].
    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_secs.map(Duration::from_secs)
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(reason) = check_address(&self.address) {
            problems.push(format!("server.address: {}", reason));
        }
        if self.num_rounds == 0 {
            problems.push("server.num_rounds must be at least 1".to_string());
        }
        if self.round_timeout_secs == Some(0) {
            problems.push("server.round_timeout_secs must be positive when set".to_string());
        }
        problems
    }
}

/// Complete server configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bind address and round count
    pub server: ServerConfig,
    /// FedAvg thresholds
    pub strategy: StrategyConfig,
}

impl Config {
    /// Parse a config from TOML text. Does not validate.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load a config file. Does not validate or apply overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, FedEvalError> {
        let contents = std::fs::read_to_string(path).map_err(|source| FedEvalError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| FedEvalError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded server config");
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), FedEvalError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides read through `lookup` (variable name -> value).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), FedEvalError> {
        if let Some(value) = lookup(ADDRESS_ENV) {
            let address = value.trim().to_string();
            check_address(&address).map_err(|reason| FedEvalError::InvalidOverride {
                var: ADDRESS_ENV,
                value: value.clone(),
                reason,
            })?;
            info!(%address, "server address overridden from {}", ADDRESS_ENV);
            self.server.address = address;
        }
        Ok(())
    }

    /// Validate both sections, reporting every problem at once.
    pub fn validate(&self) -> Result<(), FedEvalError> {
        let mut problems = self.server.problems();
        problems.extend(self.strategy.problems().iter().map(|p| format!("strategy: {}", p)));

        if problems.is_empty() {
            Ok(())
        } else {
            Err(FedEvalError::InvalidConfig(problems))
        }
    }
}
