//! Per-student assignment analytics

use super::ids::AssignmentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Submission status tag reported by the analytics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    OnTime,
    Late,
    Missing,
    /// No due date, or not yet due
    Floating,
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_time" => Ok(SubmissionStatus::OnTime),
            "late" => Ok(SubmissionStatus::Late),
            "missing" => Ok(SubmissionStatus::Missing),
            "floating" => Ok(SubmissionStatus::Floating),
            other => Err(format!("Unknown submission status: '{other}'")),
        }
    }
}

/// One assignment as seen by one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub assignment_id: AssignmentId,
    pub title: String,
    pub status: SubmissionStatus,
    pub score: Option<f64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub points_possible: f64,
    pub excused: bool,
}

impl AnalyticsRecord {
    /// A record counts as submitted once it carries a score
    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }
}

/// How a student's analytics collections were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsOutcome {
    /// The analytics pass did not run for this sync
    NotRequested,
    /// Skipped by the optimizer; collections are empty by assumption
    Skipped,
    /// Fetched from the analytics endpoint
    Fetched,
    /// The analytics endpoint answered 404
    Unavailable,
}

/// Submitted/missing split for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAnalytics {
    pub outcome: AnalyticsOutcome,
    pub submitted: Vec<AnalyticsRecord>,
    pub missing: Vec<AnalyticsRecord>,
}

impl StudentAnalytics {
    pub fn empty(outcome: AnalyticsOutcome) -> Self {
        Self {
            outcome,
            submitted: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// Splits fetched records on whether a score is present
    pub fn classify(records: Vec<AnalyticsRecord>) -> Self {
        let (submitted, missing) = records.into_iter().partition(AnalyticsRecord::is_submitted);
        Self {
            outcome: AnalyticsOutcome::Fetched,
            submitted,
            missing,
        }
    }
}

/// Call accounting for one analytics pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Students the optimizer looked at
    pub evaluated: usize,
    /// Analytics calls issued
    pub calls_made: usize,
    /// Analytics calls avoided by the optimizer
    pub calls_skipped: usize,
    /// Issued calls that came back 404
    pub not_found: usize,
}

impl AnalyticsReport {
    /// Share of evaluated students whose call was skipped, as a percentage
    pub fn savings_rate(&self) -> f64 {
        if self.evaluated == 0 {
            return 0.0;
        }
        (self.calls_skipped as f64 / self.evaluated as f64) * 100.0
    }

    pub fn merge(&mut self, other: &AnalyticsReport) {
        self.evaluated += other.evaluated;
        self.calls_made += other.calls_made;
        self.calls_skipped += other.calls_skipped;
        self.not_found += other.not_found;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, score: Option<f64>, status: SubmissionStatus) -> AnalyticsRecord {
        AnalyticsRecord {
            assignment_id: AssignmentId::new(id),
            title: format!("A{id}"),
            status,
            score,
            submitted_at: None,
            posted_at: None,
            due_at: None,
            points_possible: 10.0,
            excused: false,
        }
    }

    #[test]
    fn test_classify_splits_on_score() {
        let analytics = StudentAnalytics::classify(vec![
            record(1, Some(9.0), SubmissionStatus::OnTime),
            record(2, None, SubmissionStatus::Missing),
            record(3, Some(0.0), SubmissionStatus::Late),
        ]);

        assert_eq!(analytics.outcome, AnalyticsOutcome::Fetched);
        assert_eq!(analytics.submitted.len(), 2);
        assert_eq!(analytics.missing.len(), 1);
        assert_eq!(analytics.missing[0].assignment_id, AssignmentId::new(2));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "on_time".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::OnTime
        );
        assert_eq!(
            "MISSING".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::Missing
        );
        assert!("graded".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_report_savings_rate() {
        let mut report = AnalyticsReport {
            evaluated: 4,
            calls_made: 1,
            calls_skipped: 3,
            not_found: 0,
        };
        assert_eq!(report.savings_rate(), 75.0);

        report.merge(&AnalyticsReport {
            evaluated: 4,
            calls_made: 4,
            calls_skipped: 0,
            not_found: 1,
        });
        assert_eq!(report.evaluated, 8);
        assert_eq!(report.savings_rate(), 37.5);
        assert_eq!(AnalyticsReport::default().savings_rate(), 0.0);
    }
}
