//! Per-student analytics optimizer
//!
//! The analytics endpoint costs one call per student. Before spending it,
//! an [`AnalyticsStrategy`] looks at the current/final score pair the
//! enrollment listing already returned and decides whether the call can be
//! skipped. The default [`ScoreEqualityStrategy`] is a lossy heuristic and
//! can be swapped for [`AlwaysFetchStrategy`] when exact missing-work data is
//! required.

pub mod optimizer;
pub mod strategy;

pub use optimizer::AnalyticsOptimizer;
pub use strategy::{
    AlwaysFetchStrategy, AnalyticsDecision, AnalyticsStrategy, ScoreEqualityStrategy,
    SCORE_TOLERANCE,
};
