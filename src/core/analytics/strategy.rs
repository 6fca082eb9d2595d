//! Skip/fetch decision strategies

use std::fmt;

/// Scores closer than this count as equal
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Whether a student's analytics call is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsDecision {
    /// Assume no missing work; record empty collections
    Skip,
    Fetch,
}

/// Decides per student whether the analytics endpoint is called
pub trait AnalyticsStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn decide(&self, current_score: Option<f64>, final_score: Option<f64>) -> AnalyticsDecision;
}

/// Skips the call when current and final scores are both present and equal
///
/// Canvas computes the final score with missing work counted as zero, so a
/// gap between the two means something is outstanding. The converse does not
/// hold: equal scores can hide missing work (an ungraded course, or missing
/// items worth nothing), and such students are skipped wrongly. Use
/// [`AlwaysFetchStrategy`] when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEqualityStrategy;

impl AnalyticsStrategy for ScoreEqualityStrategy {
    fn name(&self) -> &'static str {
        "score_equality"
    }

    fn decide(&self, current_score: Option<f64>, final_score: Option<f64>) -> AnalyticsDecision {
        match (current_score, final_score) {
            (Some(current), Some(last)) if (current - last).abs() < SCORE_TOLERANCE => {
                AnalyticsDecision::Skip
            }
            _ => AnalyticsDecision::Fetch,
        }
    }
}

/// Fetches analytics for every student
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFetchStrategy;

impl AnalyticsStrategy for AlwaysFetchStrategy {
    fn name(&self) -> &'static str {
        "always_fetch"
    }

    fn decide(&self, _current_score: Option<f64>, _final_score: Option<f64>) -> AnalyticsDecision {
        AnalyticsDecision::Fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some(90.0), Some(90.0), AnalyticsDecision::Skip ; "equal scores")]
    #[test_case(Some(0.0), Some(0.0), AnalyticsDecision::Skip ; "equal zero scores")]
    #[test_case(Some(0.1 + 0.2), Some(0.3), AnalyticsDecision::Skip ; "float noise")]
    #[test_case(Some(90.0), Some(72.5), AnalyticsDecision::Fetch ; "differing scores")]
    #[test_case(None, Some(80.0), AnalyticsDecision::Fetch ; "missing current")]
    #[test_case(Some(80.0), None, AnalyticsDecision::Fetch ; "missing final")]
    #[test_case(None, None, AnalyticsDecision::Fetch ; "no scores")]
    fn test_score_equality(current: Option<f64>, last: Option<f64>, expected: AnalyticsDecision) {
        assert_eq!(ScoreEqualityStrategy.decide(current, last), expected);
    }

    #[test]
    fn test_always_fetch() {
        assert_eq!(
            AlwaysFetchStrategy.decide(Some(1.0), Some(1.0)),
            AnalyticsDecision::Fetch
        );
    }
}
