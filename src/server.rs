//! Server bootstrap.
//!
//! Round orchestration and transport belong to a [`FederatedRuntime`]. This
//! module only validates the configuration, builds the [`FedAvg`] strategy
//! and hands both to the runtime. [`start_server`] returns once training
//! completes; keeping the process resident afterwards is left to the
//! service manager.

use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::error::FedEvalError;
use crate::history::History;
use crate::strategy::FedAvg;

/// Executes federated rounds on behalf of [`start_server`].
///
/// Implementations own client connections and call back into the strategy
/// for sampling decisions and evaluation aggregation.
pub trait FederatedRuntime {
    /// Run `server.num_rounds` rounds with `strategy`.
    fn run(&mut self, server: &ServerConfig, strategy: &mut FedAvg) -> Result<History, FedEvalError>;
}

/// Validate `config`, build the strategy and run it to completion.
pub fn start_server<R: FederatedRuntime + ?Sized>(
    config: &Config,
    runtime: &mut R,
) -> Result<History, FedEvalError> {
    config.validate()?;
    let mut strategy = FedAvg::new(config.strategy.clone())?;

    let strategy_config = strategy.config();
    info!(
        address = %config.server.address,
        num_rounds = config.server.num_rounds,
        fraction_fit = strategy_config.fraction_fit,
        fraction_evaluate = strategy_config.fraction_evaluate,
        min_fit_clients = strategy_config.min_fit_clients,
        min_evaluate_clients = strategy_config.min_evaluate_clients,
        min_available_clients = strategy_config.min_available_clients,
        denominator = %strategy_config.denominator,
        "starting federated server"
    );

    let history = runtime.run(&config.server, &mut strategy)?;

    info!(
        rounds = history.len(),
        rounds_evaluated = strategy.rounds_evaluated(),
        "training completed"
    );
    Ok(history)
}
