//! Entity collectors
//!
//! One collector per entity category. Each issues the smallest set of calls
//! its category needs and returns shaped records. A collector whose category
//! the profile switches off returns an empty result without touching the
//! network. Listings that answer 404 (deleted course, hidden tab) count as
//! empty rather than failing the course.

pub mod assignments;
pub mod course;
pub mod enrollments;
pub mod modules;
pub mod reconcile;

pub use assignments::AssignmentCollector;
pub use course::CourseCollector;
pub use enrollments::{merge_email_backfill, EnrollmentCollector};
pub use modules::ModuleCollector;
pub use reconcile::{reconcile, Reconciled};

use crate::adapters::canvas::CanvasGateway;
use crate::core::profile::CollectionProfile;
use crate::domain::{CourseId, Result};
use async_trait::async_trait;

/// Fetches and shapes one category of course data
#[async_trait]
pub trait EntityCollector: Send + Sync {
    /// Value returned when the category is switched off
    type Output: Default + Send;

    /// Name used in logs
    fn category(&self) -> &'static str;

    fn is_enabled(&self, profile: &CollectionProfile) -> bool;

    /// Issues the calls for this category; only called when enabled
    async fn fetch(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        profile: &CollectionProfile,
    ) -> Result<Self::Output>;

    /// [`fetch`](Self::fetch) when enabled, otherwise the empty output
    async fn collect(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        profile: &CollectionProfile,
    ) -> Result<Self::Output> {
        if !self.is_enabled(profile) {
            tracing::debug!(
                course_id = %course_id,
                category = self.category(),
                "Category disabled by profile, skipping"
            );
            return Ok(Self::Output::default());
        }
        self.fetch(gateway, course_id, profile).await
    }
}

/// Maps a 404 on a listing to its empty value
pub(crate) fn empty_if_not_found<T: Default>(
    result: Result<T>,
    course_id: CourseId,
    endpoint: &str,
) -> Result<T> {
    match result {
        Err(e) if e.is_not_found() => {
            tracing::debug!(
                course_id = %course_id,
                endpoint,
                "Listing not found, treating as empty"
            );
            Ok(T::default())
        }
        other => other,
    }
}
