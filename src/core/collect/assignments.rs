//! Assignment listing collector

use super::{empty_if_not_found, EntityCollector};
use crate::adapters::canvas::models::ApiAssignment;
use crate::adapters::canvas::{CanvasGateway, QueryParams};
use crate::core::profile::CollectionProfile;
use crate::domain::{AssignmentRecord, CourseId, Result};
use async_trait::async_trait;

/// `GET /courses/:id/assignments`, producing listing-sourced records
///
/// The records are raw: module linkage, filters and field shaping happen in
/// [`reconcile`](super::reconcile::reconcile).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentCollector;

impl AssignmentCollector {
    pub fn params() -> QueryParams {
        QueryParams::new().with("order_by", "position")
    }
}

#[async_trait]
impl EntityCollector for AssignmentCollector {
    type Output = Vec<AssignmentRecord>;

    fn category(&self) -> &'static str {
        "assignments"
    }

    fn is_enabled(&self, profile: &CollectionProfile) -> bool {
        profile.collects_assignments()
    }

    async fn fetch(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        _profile: &CollectionProfile,
    ) -> Result<Self::Output> {
        let endpoint = format!("courses/{course_id}/assignments");
        let listing: Vec<ApiAssignment> = empty_if_not_found(
            gateway.collect_all_as(&endpoint, &Self::params()).await,
            course_id,
            &endpoint,
        )?;

        let records: Vec<AssignmentRecord> = listing
            .into_iter()
            .map(|assignment| assignment.into_record(course_id))
            .collect();

        tracing::debug!(
            course_id = %course_id,
            assignments = records.len(),
            quizzes = records.iter().filter(|r| r.is_quiz()).count(),
            "Fetched assignment listing"
        );
        Ok(records)
    }
}
