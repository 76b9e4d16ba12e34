//! Completion Metric: share of all assessment slots scored at exactly 100%.

use crate::catalogue::Catalogue;

/// `round(100 * perfect_slots / total_slots)`, rounding halves up.
///
/// Every material in the catalogue counts toward the total, locked or not.
/// Scores are overwritten rather than kept best-of, so re-scoring a perfect
/// slot below 100 lowers the metric. An empty curriculum reports 0.
pub fn completion_percentage(catalogue: &Catalogue) -> u8 {
    let total = catalogue.total_slots();
    if total == 0 {
        return 0;
    }
    let perfect: usize = catalogue
        .iter()
        .map(|m| m.assessment_scores.perfect_count())
        .sum();
    ((200 * perfect + total) / (2 * total)) as u8
}
