//! Per-client evaluation reports and the per-round aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FedEvalError;

/// Metric name to value, as reported by one client.
pub type Metrics = BTreeMap<String, f64>;

/// One client's evaluation result for a round.
///
/// `num_examples` is the number of local samples the client evaluated on and
/// is the weight of its metrics in the aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    /// Local sample count (aggregation weight).
    pub num_examples: u64,
    /// Metric values computed by the client.
    pub metrics: Metrics,
}

impl ClientReport {
    /// Create a report from a sample count and metric map.
    pub fn new(num_examples: u64, metrics: Metrics) -> Self {
        Self {
            num_examples,
            metrics,
        }
    }

    /// Convenience constructor from `(name, value)` pairs.
    pub fn from_pairs<'a>(
        num_examples: u64,
        pairs: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        Self::new(
            num_examples,
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Build a report from a signed count supplied by a loosely typed caller
    /// (JSON, Python). `client` is the caller's index for this report and is
    /// carried into the error when `num_examples` is negative.
    pub fn from_signed(
        client: usize,
        num_examples: i64,
        metrics: Metrics,
    ) -> Result<Self, FedEvalError> {
        let count = u64::try_from(num_examples).map_err(|_| FedEvalError::NegativeSampleCount {
            client,
            value: num_examples,
        })?;
        Ok(Self::new(count, metrics))
    }
}

impl From<(u64, Metrics)> for ClientReport {
    fn from((num_examples, metrics): (u64, Metrics)) -> Self {
        Self::new(num_examples, metrics)
    }
}

/// Weighted-average metric values for one round.
///
/// Covers the union of metric names seen across the round's reports.
/// Serializes transparently as the underlying map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedMetrics {
    values: BTreeMap<String, f64>,
}

impl AggregatedMetrics {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `name`, if any client reported it.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Number of distinct metrics.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no metric was aggregated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Metric names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.values
    }

    /// Re-wrap the aggregate as a single client report carrying `weight` examples.
    pub fn as_report(&self, weight: u64) -> ClientReport {
        ClientReport::new(weight, self.values.clone())
    }
}

impl From<BTreeMap<String, f64>> for AggregatedMetrics {
    fn from(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, f64)> for AggregatedMetrics {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
