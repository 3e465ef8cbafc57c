//! Report validation.
//!
//! A single NaN or infinite metric value turns the weighted mean for that
//! metric into NaN/inf without any signal, so reports are checked up front.

use crate::error::FedEvalError;
use crate::report::ClientReport;

/// Check that every metric value in a report is finite.
///
/// `client` is the report's position in the round and is carried into the
/// error so the caller can tell which participant misbehaved.
pub fn check_report(client: usize, report: &ClientReport) -> Result<(), FedEvalError> {
    match report
        .metrics
        .iter()
        .find(|(_, value)| !value.is_finite())
    {
        None => Ok(()),
        Some((metric, &value)) => Err(FedEvalError::NonFiniteMetric {
            client,
            metric: metric.clone(),
            value,
        }),
    }
}

/// Check all reports of a round, failing on the first invalid one.
pub fn check_reports(reports: &[ClientReport]) -> Result<(), FedEvalError> {
    reports
        .iter()
        .enumerate()
        .try_for_each(|(client, report)| check_report(client, report))
}
