//! Federated Averaging strategy.
//!
//! [`FedAvg`] turns the thresholds in [`StrategyConfig`] into per-round
//! decisions: how many clients to sample, whether evaluation runs at all,
//! and how a round's evaluation reports become one set of metrics.

pub mod config;

pub use config::StrategyConfig;

use tracing::{info, warn};

use crate::aggregators::MetricsAggregator;
use crate::error::FedEvalError;
use crate::report::{AggregatedMetrics, ClientReport};

/// FedAvg strategy with weighted evaluation-metric aggregation.
///
/// # Example
///
/// ```rust
/// use fedeval::{Denominator, FedAvg, StrategyConfig};
///
/// let strategy = FedAvg::new(StrategyConfig {
///     fraction_fit: 1.0,
///     fraction_evaluate: 0.5,
///     min_fit_clients: 3,
///     min_evaluate_clients: 3,
///     min_available_clients: 3,
///     accept_failures: true,
///     denominator: Denominator::PerMetric,
/// })
/// .unwrap();
///
/// // Half of 10 clients is 5, above the floor of 3
/// assert_eq!(strategy.num_evaluation_clients(10), (5, 3));
/// // Half of 4 is 2, raised to the floor
/// assert_eq!(strategy.num_evaluation_clients(4), (3, 3));
/// ```
#[derive(Clone, Debug)]
pub struct FedAvg {
    config: StrategyConfig,
    aggregator: MetricsAggregator,
}

impl FedAvg {
    /// Create a strategy, rejecting invalid thresholds.
    pub fn new(config: StrategyConfig) -> Result<Self, FedEvalError> {
        config.validate()?;
        let aggregator = MetricsAggregator::new(config.denominator);
        Ok(Self { config, aggregator })
    }

    /// The thresholds this strategy was built from.
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Training sample size and minimum connected clients for a round.
    ///
    /// For runtimes that drive local training; evaluation-only runtimes such
    /// as [`ReplayRuntime`](crate::ReplayRuntime) never call it.
    ///
    /// Returns `(max(floor(available * fraction_fit), min_fit_clients), min_available_clients)`.
    pub fn num_fit_clients(&self, num_available: usize) -> (usize, usize) {
        let sampled = (num_available as f64 * self.config.fraction_fit) as usize;
        (
            sampled.max(self.config.min_fit_clients),
            self.config.min_available_clients,
        )
    }

    /// Evaluation sample size and minimum connected clients for a round.
    pub fn num_evaluation_clients(&self, num_available: usize) -> (usize, usize) {
        let sampled = (num_available as f64 * self.config.fraction_evaluate) as usize;
        (
            sampled.max(self.config.min_evaluate_clients),
            self.config.min_available_clients,
        )
    }

    /// Federated evaluation is skipped entirely when `fraction_evaluate` is 0.
    pub fn evaluation_enabled(&self) -> bool {
        self.config.fraction_evaluate > 0.0
    }

    /// Aggregate one round of evaluation results.
    ///
    /// Returns `Ok(None)` when there is nothing to report: no results, or
    /// failures occurred and `accept_failures` is off.
    pub fn aggregate_evaluate(
        &mut self,
        round: u32,
        results: &[ClientReport],
        failures: usize,
    ) -> Result<Option<AggregatedMetrics>, FedEvalError> {
        if results.is_empty() {
            return Ok(None);
        }
        if failures > 0 && !self.config.accept_failures {
            warn!(round, failures, "dropping evaluation round with failed clients");
            return Ok(None);
        }

        let metrics = self.aggregator.aggregate(results)?;
        info!(
            round,
            clients = results.len(),
            failures,
            metrics = ?metrics,
            "evaluation round aggregated"
        );
        Ok(Some(metrics))
    }

    /// Number of evaluation rounds aggregated so far.
    pub fn rounds_evaluated(&self) -> u64 {
        self.aggregator.rounds_aggregated()
    }
}
