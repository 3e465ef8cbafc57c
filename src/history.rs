//! Per-round record of a server run.
//!
//! Returned by [`start_server`](crate::server::start_server) so callers can
//! inspect or persist how evaluation metrics evolved across rounds.

use serde::{Deserialize, Serialize};

use crate::report::AggregatedMetrics;

/// Outcome of a single round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number (1-indexed).
    pub round: u32,
    /// Clients whose evaluation results were aggregated.
    pub num_clients: usize,
    /// Clients that failed during the round.
    pub num_failures: usize,
    /// Aggregated evaluation metrics, if the round produced any.
    pub metrics: Option<AggregatedMetrics>,
}

/// Append-only history of rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    rounds: Vec<RoundRecord>,
}

impl History {
    /// Create a new, empty history.
    pub fn new() -> Self {
        Self { rounds: Vec::new() }
    }

    /// Append a round.
    pub fn push(&mut self, record: RoundRecord) {
        self.rounds.push(record);
    }

    /// All recorded rounds in order.
    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Number of recorded rounds.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Whether no round was recorded.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// `(round, value)` for every round that aggregated metric `name`.
    pub fn metrics_distributed(&self, name: &str) -> Vec<(u32, f64)> {
        self.rounds
            .iter()
            .filter_map(|r| {
                r.metrics
                    .as_ref()
                    .and_then(|m| m.get(name))
                    .map(|value| (r.round, value))
            })
            .collect()
    }

    /// Most recent aggregated metrics, skipping rounds that produced none.
    pub fn last_metrics(&self) -> Option<&AggregatedMetrics> {
        self.rounds.iter().rev().find_map(|r| r.metrics.as_ref())
    }
}
