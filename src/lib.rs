//! # fedeval: evaluation-metric aggregation for federated averaging
//!
//! Summarizes the per-client evaluation results of a federated round into
//! one value per metric, weighting each client by its sample count, and
//! wraps that in a validated FedAvg configuration and server bootstrap.
//!
//! ## Aggregation
//!
//! - [`weighted_average()`] - Sample-count weighted mean per metric name
//! - [`MetricsAggregator`] - Round-by-round wrapper with a fixed [`Denominator`]
//!
//! ## Server
//!
//! - [`Config`] - TOML server + strategy configuration with env overrides
//! - [`FedAvg`] - Client sampling thresholds and evaluation aggregation
//! - [`start_server()`] - Validate, build the strategy, run a [`FederatedRuntime`]
//! - [`ReplayRuntime`] - Offline runtime over recorded rounds
//! - [`cli::run`] - The `fedeval` command line

#![deny(missing_docs)]

pub mod aggregators;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod math;
pub mod replay;
pub mod report;
pub mod server;
pub mod strategy;
pub mod verification;

// Re-exports
pub use aggregators::weighted_average;
pub use aggregators::{Denominator, MetricsAggregator};
pub use config::{Config, ServerConfig};
pub use error::FedEvalError;
pub use history::{History, RoundRecord};
pub use replay::{RecordedRound, ReplayRuntime};
pub use report::{AggregatedMetrics, ClientReport, Metrics};
pub use server::{start_server, FederatedRuntime};
pub use strategy::{FedAvg, StrategyConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Python bindings via PyO3, usable as a Flower `evaluate_metrics_aggregation_fn`
#[cfg(feature = "python")]
mod python {
    use std::collections::{BTreeMap, HashMap};

    use pyo3::prelude::*;

    use crate::{ClientReport, Denominator, FedEvalError, Metrics};

    fn fedeval_err(e: FedEvalError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
    }

    /// Weighted average over `[(num_examples, {name: value})]`.
    #[pyfunction]
    #[pyo3(signature = (metrics, denominator = "per_metric"))]
    fn weighted_average(
        metrics: Vec<(i64, HashMap<String, f64>)>,
        denominator: &str,
    ) -> PyResult<BTreeMap<String, f64>> {
        let denominator: Denominator = denominator
            .parse()
            .map_err(PyErr::new::<pyo3::exceptions::PyValueError, _>)?;

        let reports = metrics
            .into_iter()
            .enumerate()
            .map(|(client, (num_examples, values))| {
                ClientReport::from_signed(client, num_examples, values.into_iter().collect::<Metrics>())
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(fedeval_err)?;

        crate::weighted_average(&reports, denominator)
            .map(|aggregated| aggregated.into_inner())
            .map_err(fedeval_err)
    }

    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(weighted_average, m)?)?;
        m.add("__version__", crate::VERSION)?;
        Ok(())
    }
}
