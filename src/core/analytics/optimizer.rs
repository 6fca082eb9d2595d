//! Per-student analytics pass

use super::strategy::{AlwaysFetchStrategy, AnalyticsDecision, AnalyticsStrategy, ScoreEqualityStrategy};
use crate::adapters::canvas::models::ApiAnalyticsAssignment;
use crate::adapters::canvas::{CanvasGateway, QueryParams};
use crate::domain::{
    AnalyticsOutcome, AnalyticsRecord, AnalyticsReport, CourseId, Result, StudentAnalytics,
    StudentRecord, UserId,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;

/// Runs the analytics endpoint for the students its strategy selects
///
/// Calls go through the shared gateway with at most `max_concurrent` in
/// flight. A 404 for one student marks that student `Unavailable`; any other
/// error aborts the pass.
#[derive(Debug, Clone)]
pub struct AnalyticsOptimizer {
    strategy: Arc<dyn AnalyticsStrategy>,
    max_concurrent: usize,
}

impl Default for AnalyticsOptimizer {
    fn default() -> Self {
        Self::new(Arc::new(ScoreEqualityStrategy), 4)
    }
}

impl AnalyticsOptimizer {
    pub fn new(strategy: Arc<dyn AnalyticsStrategy>, max_concurrent: usize) -> Self {
        Self {
            strategy,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Score-equality heuristic when `optimize`, otherwise fetch everyone
    pub fn from_settings(optimize: bool, max_concurrent: usize) -> Self {
        let strategy: Arc<dyn AnalyticsStrategy> = if optimize {
            Arc::new(ScoreEqualityStrategy)
        } else {
            Arc::new(AlwaysFetchStrategy)
        };
        Self::new(strategy, max_concurrent)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fills `analytics` on every student and reports the call accounting
    pub async fn run(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        students: &mut [StudentRecord],
    ) -> Result<AnalyticsReport> {
        let mut report = AnalyticsReport {
            evaluated: students.len(),
            ..AnalyticsReport::default()
        };

        let mut to_fetch: Vec<(usize, UserId)> = Vec::new();
        for (index, student) in students.iter_mut().enumerate() {
            match self
                .strategy
                .decide(student.current_score(), student.final_score())
            {
                AnalyticsDecision::Skip => {
                    report.calls_skipped += 1;
                    student.analytics = Some(StudentAnalytics::empty(AnalyticsOutcome::Skipped));
                }
                AnalyticsDecision::Fetch => to_fetch.push((index, student.student_id)),
            }
        }

        let results: Vec<(usize, Result<Option<Vec<AnalyticsRecord>>>)> = stream::iter(to_fetch)
            .map(|(index, student_id)| async move {
                (index, fetch_student(gateway, course_id, student_id).await)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for (index, result) in results {
            report.calls_made += 1;
            students[index].analytics = Some(match result? {
                Some(records) => StudentAnalytics::classify(records),
                None => {
                    report.not_found += 1;
                    StudentAnalytics::empty(AnalyticsOutcome::Unavailable)
                }
            });
        }

        tracing::info!(
            course_id = %course_id,
            strategy = self.strategy.name(),
            evaluated = report.evaluated,
            calls_made = report.calls_made,
            calls_skipped = report.calls_skipped,
            not_found = report.not_found,
            savings_pct = format!("{:.1}", report.savings_rate()),
            "Analytics pass completed"
        );

        Ok(report)
    }
}

/// `None` when Canvas has no analytics for the student
async fn fetch_student(
    gateway: &CanvasGateway,
    course_id: CourseId,
    student_id: UserId,
) -> Result<Option<Vec<AnalyticsRecord>>> {
    let endpoint = format!("courses/{course_id}/analytics/users/{student_id}/assignments");

    let response = match gateway.send(&endpoint, &QueryParams::new()).await {
        Ok(response) => response,
        Err(e) if e.is_not_found() => {
            tracing::debug!(course_id = %course_id, student_id = %student_id, "No analytics for student");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let items = match response.body {
        Value::Array(items) => items,
        _ => Vec::new(),
    };

    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ApiAnalyticsAssignment>(item) {
            Ok(raw) => Some(raw.into_record()),
            Err(e) => {
                tracing::warn!(
                    student_id = %student_id,
                    error = %e,
                    "Skipping analytics record that could not be decoded"
                );
                None
            }
        })
        .collect();

    Ok(Some(records))
}
