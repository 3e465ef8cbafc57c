//! FedAvg thresholds.

use serde::{Deserialize, Serialize};

use crate::aggregators::Denominator;
use crate::error::FedEvalError;

/// Client-selection thresholds and evaluation policy for [`FedAvg`](super::FedAvg).
///
/// Every field must be given explicitly when loaded from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Fraction of available clients sampled for training (0.0-1.0)
    pub fraction_fit: f64,
    /// Fraction of available clients sampled for evaluation (0.0-1.0)
    pub fraction_evaluate: f64,
    /// Never sample fewer than this many clients for training
    pub min_fit_clients: usize,
    /// Never sample fewer than this many clients for evaluation
    pub min_evaluate_clients: usize,
    /// Wait until at least this many clients are connected
    pub min_available_clients: usize,
    /// Aggregate rounds in which some clients failed
    pub accept_failures: bool,
    /// Denominator policy for the evaluation-metric mean
    pub denominator: Denominator,
}

impl StrategyConfig {
    /// Every problem with this configuration, in field order.
    pub fn problems(&self) -> Vec<FedEvalError> {
        let mut problems = Vec::new();

        for (name, value) in [
            ("fraction_fit", self.fraction_fit),
            ("fraction_evaluate", self.fraction_evaluate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                problems.push(FedEvalError::InvalidFraction { name, value });
            }
        }

        if self.min_available_clients == 0 {
            problems.push(FedEvalError::InvalidClientCount(
                "min_available_clients must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("min_fit_clients", self.min_fit_clients),
            ("min_evaluate_clients", self.min_evaluate_clients),
        ] {
            if value > self.min_available_clients {
                problems.push(FedEvalError::InvalidClientCount(format!(
                    "{} ({}) exceeds min_available_clients ({})",
                    name, value, self.min_available_clients
                )));
            }
        }

        problems
    }

    /// Validate, returning the first problem found.
    pub fn validate(&self) -> Result<(), FedEvalError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}
