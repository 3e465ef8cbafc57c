//! Offline runtime over recorded evaluation rounds.
//!
//! [`ReplayRuntime`] plays back rounds captured from a real deployment (or
//! written by hand) through the strategy, so thresholds and denominator
//! policies can be compared without any clients connected.
//!
//! Rounds are read as a JSON array:
//!
//! ```json
//! [
//!   {"results": [{"num_examples": 10, "metrics": {"acc": 0.8}}], "failures": 0},
//!   {"results": [{"num_examples": 30, "metrics": {"acc": 0.4}}]}
//! ]
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::FedEvalError;
use crate::history::{History, RoundRecord};
use crate::report::ClientReport;
use crate::server::FederatedRuntime;
use crate::strategy::FedAvg;

/// Evaluation outcome of one recorded round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedRound {
    /// Reports from clients that completed evaluation
    pub results: Vec<ClientReport>,
    /// Clients that were selected but failed
    #[serde(default)]
    pub failures: usize,
}

impl RecordedRound {
    /// Clients connected during this round.
    pub fn available(&self) -> usize {
        self.results.len() + self.failures
    }
}

/// Runtime that replays [`RecordedRound`]s in order.
///
/// Only evaluation is recorded, so training thresholds (`fraction_fit`,
/// `min_fit_clients`) have no effect here; each round just has to reach
/// `min_available_clients`.
#[derive(Clone, Debug, Default)]
pub struct ReplayRuntime {
    rounds: VecDeque<RecordedRound>,
}

impl ReplayRuntime {
    /// Create a runtime that will replay `rounds` front to back.
    pub fn new(rounds: Vec<RecordedRound>) -> Self {
        Self {
            rounds: rounds.into(),
        }
    }

    /// Parse recorded rounds from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Rounds not yet replayed.
    pub fn remaining(&self) -> usize {
        self.rounds.len()
    }
}

impl FederatedRuntime for ReplayRuntime {
    fn run(&mut self, server: &ServerConfig, strategy: &mut FedAvg) -> Result<History, FedEvalError> {
        let mut history = History::new();

        for round in 1..=server.num_rounds {
            let Some(recorded) = self.rounds.pop_front() else {
                warn!(
                    round,
                    num_rounds = server.num_rounds,
                    "recording exhausted, stopping early"
                );
                break;
            };

            let available = recorded.available();
            let min_available = strategy.config().min_available_clients;
            if available < min_available {
                return Err(FedEvalError::InsufficientClients {
                    round,
                    needed: min_available,
                    actual: available,
                });
            }

            if !strategy.evaluation_enabled() {
                info!(round, "federated evaluation disabled, skipping");
                history.push(RoundRecord {
                    round,
                    num_clients: 0,
                    num_failures: 0,
                    metrics: None,
                });
                continue;
            }

            let (sample_size, _) = strategy.num_evaluation_clients(available);
            let results = &recorded.results[..sample_size.min(recorded.results.len())];
            let metrics = strategy.aggregate_evaluate(round, results, recorded.failures)?;

            history.push(RoundRecord {
                round,
                num_clients: results.len(),
                num_failures: recorded.failures,
                metrics,
            });
        }

        Ok(history)
    }
}
