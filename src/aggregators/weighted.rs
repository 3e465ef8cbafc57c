//! Sample-count weighted averaging of client evaluation metrics.
//!
//! Each client's metric values are weighted by the number of examples it
//! evaluated on, so a client with 30 samples moves the mean three times as
//! far as one with 10.

use std::collections::BTreeMap;

use tracing::debug;

use super::Denominator;
use crate::error::FedEvalError;
use crate::math::ordered_sum;
use crate::report::{AggregatedMetrics, ClientReport};
use crate::verification::check_reports;

/// Weighted average of per-client metrics.
///
/// Returns one value per metric name seen in any report. An empty round
/// yields an empty aggregate.
///
/// Every term is `(num_examples / total) * value`; terms are summed in a
/// canonical order, so the output is bit-identical under any permutation of
/// `reports`, and a metric reported by a single weighted client comes back
/// unchanged. The result always lies within the range of the contributing
/// values (and 0 under [`Denominator::Global`] when some clients did not
/// report the metric), so finite inputs never produce an infinite mean.
///
/// # Arguments
///
/// * `reports` - One report per participating client
/// * `denominator` - Whose sample counts divide each metric's weighted sum
///
/// # Errors
///
/// * [`FedEvalError::NonFiniteMetric`] if any value is NaN or infinite
/// * [`FedEvalError::ZeroWeight`] if a metric's denominator is zero
pub fn weighted_average(
    reports: &[ClientReport],
    denominator: Denominator,
) -> Result<AggregatedMetrics, FedEvalError> {
    if reports.is_empty() {
        return Ok(AggregatedMetrics::new());
    }
    check_reports(reports)?;

    let global_total: u128 = reports.iter().map(|r| u128::from(r.num_examples)).sum();

    // name -> contributing (weight, value) pairs and the weight they sum to
    let mut contributions: BTreeMap<&str, (Vec<(u64, f64)>, u128)> = BTreeMap::new();
    for report in reports {
        for (name, &value) in &report.metrics {
            let (pairs, metric_total) = contributions.entry(name.as_str()).or_default();
            pairs.push((report.num_examples, value));
            *metric_total += u128::from(report.num_examples);
        }
    }

    let values = contributions
        .into_iter()
        .map(|(name, (pairs, metric_total))| {
            let total = match denominator {
                Denominator::PerMetric => metric_total,
                Denominator::Global => global_total,
            };
            if total == 0 {
                return Err(FedEvalError::ZeroWeight {
                    metric: name.to_string(),
                });
            }
            let (lo, hi) = value_bounds(&pairs, metric_total < total);
            let total = total as f64;
            let mut terms: Vec<f64> = pairs
                .iter()
                .map(|&(weight, value)| (weight as f64 / total) * value)
                .collect();
            Ok((name.to_string(), ordered_sum(&mut terms).clamp(lo, hi)))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    debug!(
        clients = reports.len(),
        metrics = values.len(),
        total_examples = %global_total,
        ?denominator,
        "aggregated evaluation metrics"
    );

    Ok(AggregatedMetrics::from(values))
}

/// Range a weighted mean of `pairs` can take.
///
/// When the weights sum to less than the denominator the missing share
/// counts as zero, so 0 joins the range. Rounding can push a sum of finite
/// terms past `f64::MAX`; clamping to this range keeps the result finite.
fn value_bounds(pairs: &[(u64, f64)], includes_zero: bool) -> (f64, f64) {
    let start = if includes_zero {
        (0.0, 0.0)
    } else {
        (f64::INFINITY, f64::NEG_INFINITY)
    };
    pairs
        .iter()
        .fold(start, |(lo, hi), &(_, value)| (lo.min(value), hi.max(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_two_clients() {
        let reports = vec![
            ClientReport::from_pairs(10, [("acc", 0.8)]),
            ClientReport::from_pairs(30, [("acc", 0.4)]),
        ];
        let result = weighted_average(&reports, Denominator::PerMetric).unwrap();
        // (10*0.8 + 30*0.4) / 40 = 0.5
        assert!((result.get("acc").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_round() {
        let result = weighted_average(&[], Denominator::Global).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_client_unchanged() {
        let reports = vec![ClientReport::from_pairs(7, [("acc", 0.1), ("loss", 2.3)])];
        let result = weighted_average(&reports, Denominator::Global).unwrap();
        assert_eq!(result.get("acc"), Some(0.1));
        assert_eq!(result.get("loss"), Some(2.3));
    }

    #[test]
    fn test_disjoint_metrics_per_metric() {
        let reports = vec![
            ClientReport::from_pairs(5, [("a", 1.0)]),
            ClientReport::from_pairs(5, [("b", 2.0)]),
        ];
        let result = weighted_average(&reports, Denominator::PerMetric).unwrap();
        assert_eq!(result.get("a"), Some(1.0));
        assert_eq!(result.get("b"), Some(2.0));
    }

    #[test]
    fn test_disjoint_metrics_global() {
        let reports = vec![
            ClientReport::from_pairs(5, [("a", 1.0)]),
            ClientReport::from_pairs(5, [("b", 2.0)]),
        ];
        let result = weighted_average(&reports, Denominator::Global).unwrap();
        // Each metric divided by all 10 examples
        assert_eq!(result.get("a"), Some(0.5));
        assert_eq!(result.get("b"), Some(1.0));
    }

    #[test]
    fn test_zero_examples_rejected() {
        let reports = vec![ClientReport::from_pairs(0, [("a", 1.0)])];
        for denominator in [Denominator::PerMetric, Denominator::Global] {
            match weighted_average(&reports, denominator) {
                Err(FedEvalError::ZeroWeight { metric }) => assert_eq!(metric, "a"),
                other => panic!("expected ZeroWeight, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_weight_client_ignored() {
        let reports = vec![
            ClientReport::from_pairs(0, [("acc", 100.0)]),
            ClientReport::from_pairs(4, [("acc", 0.25)]),
        ];
        let result = weighted_average(&reports, Denominator::PerMetric).unwrap();
        assert_eq!(result.get("acc"), Some(0.25));
    }

    #[test]
    fn test_no_metrics_no_division() {
        // Nothing to divide, so a zero total is harmless
        let reports = vec![ClientReport::from_pairs(0, [])];
        let result = weighted_average(&reports, Denominator::Global).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_per_metric_zero_weight_only_for_that_metric() {
        let reports = vec![
            ClientReport::from_pairs(5, [("a", 1.0)]),
            ClientReport::from_pairs(0, [("b", 2.0)]),
        ];
        assert!(matches!(
            weighted_average(&reports, Denominator::PerMetric),
            Err(FedEvalError::ZeroWeight { ref metric }) if metric == "b"
        ));
        // The shared denominator is 5, so b averages to 0
        let result = weighted_average(&reports, Denominator::Global).unwrap();
        assert_eq!(result.get("b"), Some(0.0));
    }

    #[test]
    fn test_extreme_values_stay_finite() {
        // Eleven terms of MAX / 11 round up past MAX when summed
        let reports: Vec<_> = (0..11)
            .map(|_| ClientReport::from_pairs(1, [("m", f64::MAX)]))
            .collect();
        for denominator in [Denominator::PerMetric, Denominator::Global] {
            let result = weighted_average(&reports, denominator).unwrap();
            assert_eq!(result.get("m"), Some(f64::MAX));
        }

        let reports: Vec<_> = (0..11)
            .map(|_| ClientReport::from_pairs(1, [("m", f64::MIN)]))
            .collect();
        let result = weighted_average(&reports, Denominator::PerMetric).unwrap();
        assert_eq!(result.get("m"), Some(f64::MIN));
    }

    #[test]
    fn test_value_bounds() {
        let pairs = [(1, 0.5), (3, 0.25)];
        assert_eq!(value_bounds(&pairs, false), (0.25, 0.5));
        assert_eq!(value_bounds(&pairs, true), (0.0, 0.5));
        assert_eq!(value_bounds(&[(2, -1.0)], true), (-1.0, 0.0));
    }

    #[test]
    fn test_nan_rejected() {
        let reports = vec![ClientReport::from_pairs(1, [("acc", f64::NAN)])];
        assert!(matches!(
            weighted_average(&reports, Denominator::PerMetric),
            Err(FedEvalError::NonFiniteMetric { .. })
        ));
    }
}
