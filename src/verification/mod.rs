//! Validation of client reports before aggregation.
//!
//! - [`report_check`] - Reject metric values that would poison a weighted mean

pub mod report_check;

pub use report_check::{check_report, check_reports};
