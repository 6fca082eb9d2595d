//! Single-course orchestrator
//!
//! A course sync runs four stages:
//!
//! 1. `course_info` - the course record
//! 2. `enrollments` - roster, email backfill and the analytics pass
//! 3. `modules_assignments` - assignment listing and modules, reconciled
//! 4. `merge` - graph assembly, validation and field shaping
//!
//! Stages 2 and 3 run concurrently once stage 1 is done. Any failure aborts
//! the run with [`SyncError::StageFailed`]; nothing from completed stages is
//! returned.

use crate::adapters::canvas::CanvasGateway;
use crate::core::analytics::AnalyticsOptimizer;
use crate::core::collect::{
    reconcile, AssignmentCollector, CourseCollector, EnrollmentCollector, EntityCollector,
    ModuleCollector, Reconciled,
};
use crate::core::profile::CollectionProfile;
use crate::domain::{
    AnalyticsReport, Course, CourseGraph, CourseId, EnrollmentStatusRecord, Result, StageTiming,
    StudentRecord, SyncError, SyncMetrics, SyncStage,
};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

/// Syncs one course at a time under a fixed profile
#[derive(Debug, Clone)]
pub struct CourseSynchronizer {
    gateway: CanvasGateway,
    profile: CollectionProfile,
    profile_label: String,
    optimizer: AnalyticsOptimizer,
}

struct EnrollmentStage {
    students: Vec<StudentRecord>,
    analytics: AnalyticsReport,
    timing: StageTiming,
}

struct StructureStage {
    reconciled: Reconciled,
    timing: StageTiming,
}

impl CourseSynchronizer {
    pub fn new(gateway: CanvasGateway, profile: CollectionProfile) -> Self {
        Self {
            gateway,
            profile,
            profile_label: "custom".to_string(),
            optimizer: AnalyticsOptimizer::default(),
        }
    }

    /// Name of the profile, for logs
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.profile_label = label.into();
        self
    }

    pub fn with_optimizer(mut self, optimizer: AnalyticsOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn gateway(&self) -> &CanvasGateway {
        &self.gateway
    }

    pub fn profile(&self) -> &CollectionProfile {
        &self.profile
    }

    pub async fn sync_course(&self, course_id: CourseId) -> Result<CourseGraph> {
        self.sync_course_with(course_id, None).await
    }

    /// Like [`sync_course`](Self::sync_course), reusing an already fetched
    /// course record instead of calling the course endpoint again
    pub async fn sync_course_with(
        &self,
        course_id: CourseId,
        known: Option<Course>,
    ) -> Result<CourseGraph> {
        let gateway = self.gateway.scoped();
        let started = Instant::now();
        crate::log_sync_start!(course_id, self.profile_label);

        let stage_started = Instant::now();
        let course = match known {
            Some(course) if self.profile.collects_course() => Some(course),
            _ => CourseCollector
                .collect(&gateway, course_id, &self.profile)
                .await
                .map_err(|e| e.at_stage(course_id, SyncStage::CourseInfo))?,
        };
        let course_timing = timing(
            SyncStage::CourseInfo,
            stage_started,
            !self.profile.collects_course(),
        );

        let (enrolled, structure) = tokio::try_join!(
            self.enrollment_stage(&gateway, course_id),
            self.structure_stage(&gateway, course_id),
        )?;

        let stage_started = Instant::now();
        let mut graph = self
            .merge(course_id, course, enrolled.students, structure.reconciled)
            .map_err(|e| e.at_stage(course_id, SyncStage::Merge))?;

        let api_calls = gateway.calls_issued();
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        graph.metrics = SyncMetrics {
            api_calls,
            elapsed_ms,
            avg_ms_per_call: SyncMetrics::compute_average(api_calls, elapsed_ms),
            analytics: enrolled.analytics,
            stages: vec![
                course_timing,
                enrolled.timing,
                structure.timing,
                timing(SyncStage::Merge, stage_started, false),
            ],
        };

        crate::log_sync_complete!(course_id, api_calls, elapsed);
        Ok(graph)
    }

    async fn enrollment_stage(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
    ) -> Result<EnrollmentStage> {
        let started = Instant::now();
        let wrap = |e: SyncError| e.at_stage(course_id, SyncStage::Enrollments);

        let mut students = EnrollmentCollector
            .collect(gateway, course_id, &self.profile)
            .await
            .map_err(wrap)?;

        let analytics = if self.profile.runs_analytics() && !students.is_empty() {
            self.optimizer
                .run(gateway, course_id, &mut students)
                .await
                .map_err(wrap)?
        } else {
            AnalyticsReport::default()
        };

        Ok(EnrollmentStage {
            students,
            analytics,
            timing: timing(
                SyncStage::Enrollments,
                started,
                !self.profile.collects_students(),
            ),
        })
    }

    async fn structure_stage(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
    ) -> Result<StructureStage> {
        let started = Instant::now();
        let (assignment_collector, module_collector) = (AssignmentCollector, ModuleCollector);
        let (listing, modules) = tokio::try_join!(
            assignment_collector.collect(gateway, course_id, &self.profile),
            module_collector.collect(gateway, course_id, &self.profile),
        )
        .map_err(|e| e.at_stage(course_id, SyncStage::ModulesAssignments))?;

        let reconciled = reconcile(course_id, listing, modules, &self.profile);
        let skipped = !self.profile.collects_assignments() && !self.profile.collects_modules();

        Ok(StructureStage {
            reconciled,
            timing: timing(SyncStage::ModulesAssignments, started, skipped),
        })
    }

    fn merge(
        &self,
        course_id: CourseId,
        course: Option<Course>,
        mut students: Vec<StudentRecord>,
        reconciled: Reconciled,
    ) -> Result<CourseGraph> {
        validate_graph(&self.profile, course_id, course.as_ref(), &students, &reconciled)?;

        let enrollment_statuses: Vec<EnrollmentStatusRecord> = students
            .iter()
            .map(|student| {
                let mut status = EnrollmentStatusRecord::from(student);
                if !self.profile.outputs_scores() {
                    status.current_score = None;
                    status.final_score = None;
                }
                status
            })
            .collect();

        for student in &mut students {
            shape_student(student, &self.profile);
        }

        Ok(CourseGraph {
            run_id: Uuid::new_v4(),
            synced_at: Utc::now(),
            course_id,
            course,
            students,
            modules: reconciled.modules,
            assignments: reconciled.assignments,
            enrollment_statuses,
            metrics: SyncMetrics::default(),
        })
    }
}

fn timing(stage: SyncStage, started: Instant, skipped: bool) -> StageTiming {
    StageTiming {
        stage,
        elapsed_ms: started.elapsed().as_millis() as u64,
        skipped,
    }
}

/// Structural checks on the assembled graph
pub(crate) fn validate_graph(
    profile: &CollectionProfile,
    course_id: CourseId,
    course: Option<&Course>,
    students: &[StudentRecord],
    reconciled: &Reconciled,
) -> Result<()> {
    match course {
        Some(course) if course.id != course_id => {
            return Err(SyncError::Validation(format!(
                "Course record {} does not match requested course {course_id}",
                course.id
            )));
        }
        None if profile.collects_course() => {
            return Err(SyncError::Validation(format!(
                "Course {course_id} has no course record"
            )));
        }
        _ => {}
    }

    if let Some(stray) = students.iter().find(|s| s.course_id != course_id) {
        return Err(SyncError::Validation(format!(
            "Student {} belongs to course {}, not {course_id}",
            stray.student_id, stray.course_id
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = reconciled.assignments.iter().find(|a| !seen.insert(a.key)) {
        return Err(SyncError::Validation(format!(
            "Assignment {} appears more than once",
            duplicate.key
        )));
    }

    if reconciled
        .modules
        .windows(2)
        .any(|pair| pair[0].position > pair[1].position)
    {
        return Err(SyncError::Validation(
            "Modules are not ordered by position".to_string(),
        ));
    }

    Ok(())
}

/// Blanks the student sections the profile does not ask for
fn shape_student(student: &mut StudentRecord, profile: &CollectionProfile) {
    if !profile.student_fields.basic_info {
        student.user = None;
    }
    if !profile.outputs_scores() {
        student.scores = None;
    }
    if !profile.student_fields.enrollment_details {
        student.enrollment = None;
    }
}
