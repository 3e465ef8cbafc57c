//! Summation helpers.
//!
//! Floating-point addition is not associative, so summing the same terms in
//! a different order can change the last bits of the result. Sorting the
//! terms first pins the order and makes the sum a function of the multiset
//! of terms alone.

/// Sum `terms` in ascending [`f64::total_cmp`] order.
///
/// The slice is sorted in place. Two slices holding the same values in any
/// order produce bit-identical sums.
pub fn ordered_sum(terms: &mut [f64]) -> f64 {
    terms.sort_by(f64::total_cmp);
    terms.iter().sum()
}
