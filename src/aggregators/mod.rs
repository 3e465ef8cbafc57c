//! Evaluation-metric aggregation for federated rounds.
//!
//! Provides the sample-count weighted mean used by FedAvg to summarize
//! per-client evaluation results, under two denominator policies:
//!
//! | Policy | Divisor for metric `m` | Behavior on partial reporting |
//! |--------|------------------------|-------------------------------|
//! | [`Denominator::PerMetric`] | examples of clients that reported `m` | true weighted mean |
//! | [`Denominator::Global`] | examples of all clients in the round | scaled toward 0 |

pub mod weighted;

pub use weighted::weighted_average;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FedEvalError;
use crate::report::{AggregatedMetrics, ClientReport};

/// Denominator policy for the weighted mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Divide by the examples of the clients that reported the metric (default)
    #[default]
    PerMetric,
    /// Divide every metric by the examples of all clients in the round
    Global,
}

impl fmt::Display for Denominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denominator::PerMetric => f.write_str("per_metric"),
            Denominator::Global => f.write_str("global"),
        }
    }
}

impl FromStr for Denominator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_metric" | "per-metric" => Ok(Denominator::PerMetric),
            "global" => Ok(Denominator::Global),
            _ => Err(format!(
                "Unknown denominator '{}'. Use 'per_metric' or 'global'",
                s
            )),
        }
    }
}

/// Round-by-round metric aggregator.
///
/// Wraps [`weighted_average`] with a fixed denominator policy and keeps a
/// count of the rounds it has summarized.
///
/// # Example
///
/// ```rust
/// use fedeval::{ClientReport, Denominator, MetricsAggregator};
///
/// let mut agg = MetricsAggregator::new(Denominator::PerMetric);
///
/// let reports = vec![
///     ClientReport::from_pairs(10, [("accuracy", 0.8)]),
///     ClientReport::from_pairs(30, [("accuracy", 0.4)]),
/// ];
///
/// let result = agg.aggregate(&reports).unwrap();
/// assert!((result.get("accuracy").unwrap() - 0.5).abs() < 1e-12);
/// assert_eq!(agg.rounds_aggregated(), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetricsAggregator {
    denominator: Denominator,
    rounds_aggregated: u64,
}

impl MetricsAggregator {
    /// Create a new aggregator with the given denominator policy.
    pub fn new(denominator: Denominator) -> Self {
        Self {
            denominator,
            rounds_aggregated: 0,
        }
    }

    /// Aggregate one round of client reports.
    ///
    /// Failed rounds (validation errors) are not counted.
    pub fn aggregate(&mut self, reports: &[ClientReport]) -> Result<AggregatedMetrics, FedEvalError> {
        let result = weighted_average(reports, self.denominator)?;
        self.rounds_aggregated += 1;
        debug!(
            round = self.rounds_aggregated,
            metrics = result.len(),
            "metrics aggregator round complete"
        );
        Ok(result)
    }

    /// The denominator policy in use.
    pub fn denominator(&self) -> Denominator {
        self.denominator
    }

    /// Number of rounds successfully aggregated so far.
    pub fn rounds_aggregated(&self) -> u64 {
        self.rounds_aggregated
    }
}
