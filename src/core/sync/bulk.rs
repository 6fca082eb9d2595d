//! Bulk/discovery orchestrator
//!
//! Lists the courses visible to the token, keeps those in the configured
//! workflow states (capped at `max_courses`), then runs the single-course
//! orchestrator over them in fixed-size concurrent batches with a pause in
//! between. Course failures are recorded and the run continues; running out
//! of rate budget stops the run.

use super::course::CourseSynchronizer;
use super::summary::{BulkSyncResult, CourseFailure};
use crate::adapters::canvas::models::ApiCourse;
use crate::adapters::canvas::QueryParams;
use crate::config::BulkConfig;
use crate::domain::{Course, CourseId, Result};
use futures::future::join_all;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct BulkSynchronizer {
    synchronizer: CourseSynchronizer,
    settings: BulkConfig,
}

impl BulkSynchronizer {
    pub fn new(synchronizer: CourseSynchronizer, settings: BulkConfig) -> Self {
        Self {
            synchronizer,
            settings,
        }
    }

    pub fn settings(&self) -> &BulkConfig {
        &self.settings
    }

    /// Courses matching the workflow filter, in listing order, capped at `max_courses`
    pub async fn discover_courses(&self) -> Result<Vec<Course>> {
        let params = QueryParams::new().with_many("include", ["term"]);
        let listed: Vec<ApiCourse> = self
            .synchronizer
            .gateway()
            .collect_all_as("courses", &params)
            .await?;
        let discovered = listed.len();

        let states = &self.settings.workflow_states;
        let mut courses: Vec<Course> = listed
            .into_iter()
            .map(ApiCourse::into_course)
            .filter(|course| states.is_empty() || course.has_workflow_state(states))
            .collect();
        let matching = courses.len();

        if let Some(max) = self.settings.max_courses {
            courses.truncate(max);
        }

        tracing::info!(
            discovered,
            matching,
            selected = courses.len(),
            workflow_states = ?states,
            "Course discovery completed"
        );
        Ok(courses)
    }

    /// Discovers courses and syncs them all
    ///
    /// Discovered course records are reused, so no course-info call is made
    /// per course.
    pub async fn sync_all(&self) -> Result<BulkSyncResult> {
        let started = Instant::now();
        let courses = self.discover_courses().await?;
        let targets = courses
            .into_iter()
            .map(|course| (course.id, Some(course)))
            .collect();
        let result = self.run_batches(targets).await?;
        Ok(result.with_duration(started.elapsed()))
    }

    /// Syncs an explicit list of courses
    pub async fn sync_courses(&self, course_ids: &[CourseId]) -> Result<BulkSyncResult> {
        let started = Instant::now();
        let targets = course_ids.iter().map(|id| (*id, None)).collect();
        let result = self.run_batches(targets).await?;
        Ok(result.with_duration(started.elapsed()))
    }

    async fn run_batches(&self, targets: Vec<(CourseId, Option<Course>)>) -> Result<BulkSyncResult> {
        let mut result = BulkSyncResult::new();
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = targets.len().div_ceil(batch_size);

        for (index, batch) in targets.chunks(batch_size).enumerate() {
            let current = index + 1;
            crate::log_batch_processing!(current, total_batches);

            let outcomes = join_all(batch.iter().map(|(course_id, known)| {
                self.synchronizer.sync_course_with(*course_id, known.clone())
            }))
            .await;

            for ((course_id, _), outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(graph) => result.add_graph(graph),
                    Err(e) if e.is_rate_limit() => {
                        tracing::error!(
                            course_id = %course_id,
                            error = %e,
                            completed = result.courses_attempted,
                            "Rate limit reached, aborting bulk sync"
                        );
                        return Err(e);
                    }
                    Err(e) => {
                        tracing::warn!(course_id = %course_id, error = %e, "Course sync failed");
                        result.add_failure(CourseFailure::new(*course_id, &e));
                    }
                }
            }

            if current < total_batches && !self.settings.batch_pause().is_zero() {
                tokio::time::sleep(self.settings.batch_pause()).await;
            }
        }

        Ok(result)
    }
}
