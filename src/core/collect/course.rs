//! Course info collector

use super::EntityCollector;
use crate::adapters::canvas::models::ApiCourse;
use crate::adapters::canvas::{CanvasGateway, QueryParams};
use crate::core::profile::CollectionProfile;
use crate::domain::{Course, CourseId, Result};
use async_trait::async_trait;

/// `GET /courses/:id?include[]=term`
///
/// A 404 is returned as an error: a course that cannot be read fails its sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseCollector;

impl CourseCollector {
    pub fn params() -> QueryParams {
        QueryParams::new().with_many("include", ["term"])
    }
}

#[async_trait]
impl EntityCollector for CourseCollector {
    type Output = Option<Course>;

    fn category(&self) -> &'static str {
        "course"
    }

    fn is_enabled(&self, profile: &CollectionProfile) -> bool {
        profile.collects_course()
    }

    async fn fetch(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        _profile: &CollectionProfile,
    ) -> Result<Self::Output> {
        let response = gateway
            .send(&format!("courses/{course_id}"), &Self::params())
            .await?;
        let course = response.json::<ApiCourse>()?.into_course();

        tracing::debug!(
            course_id = %course.id,
            name = %course.name,
            workflow_state = %course.workflow_state,
            "Fetched course info"
        );
        Ok(Some(course))
    }
}
