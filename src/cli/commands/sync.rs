//! Sync command implementation
//!
//! With one course id the single-course orchestrator runs and any failure
//! fails the command. With several ids, or none (discovery), the bulk
//! orchestrator runs and course failures only make the result partial.

use super::{exit_code_for, write_json, EXIT_CONFIG, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::adapters::canvas::CanvasGateway;
use crate::config::{load_config, CanvasSyncConfig};
use crate::core::analytics::AnalyticsOptimizer;
use crate::core::sync::{BulkSyncResult, BulkSynchronizer, CourseSynchronizer};
use crate::domain::{CourseGraph, CourseId, Result, SyncError};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Course to sync (repeatable); overrides sync.course_ids
    #[arg(long = "course-id", value_name = "ID")]
    pub course_ids: Vec<u64>,

    /// Profile preset (full, students_only, assignments_only, lightweight, analytics)
    #[arg(long)]
    pub profile: Option<String>,

    /// Write the synced records as JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fetch analytics for every student instead of skipping equal scores
    #[arg(long)]
    pub no_optimization: bool,
}

/// Builds the orchestrator described by `config`
pub fn build_synchronizer(config: &CanvasSyncConfig) -> Result<CourseSynchronizer> {
    let profile = config
        .sync
        .resolve_profile()
        .map_err(SyncError::Configuration)?;
    let gateway = CanvasGateway::new(&config.canvas)?;
    let optimizer = AnalyticsOptimizer::from_settings(
        config.sync.analytics_optimization,
        config.sync.max_concurrent_analytics,
    );

    Ok(CourseSynchronizer::new(gateway, profile)
        .with_label(config.sync.profile.clone())
        .with_optimizer(optimizer))
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Some(profile) = &self.profile {
            tracing::info!(profile = %profile, "Overriding profile from CLI");
            config.sync.profile = profile.clone();
        }
        if self.no_optimization {
            tracing::info!("Analytics optimization disabled from CLI");
            config.sync.analytics_optimization = false;
        }
        if !self.course_ids.is_empty() {
            config.sync.course_ids = self.course_ids.clone();
        }
        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let synchronizer = match build_synchronizer(&config) {
            Ok(synchronizer) => synchronizer,
            Err(e) => {
                eprintln!("Failed to initialize sync: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let course_ids: Vec<CourseId> = config
            .sync
            .course_ids
            .iter()
            .copied()
            .map(CourseId::new)
            .collect();

        if let [course_id] = course_ids.as_slice() {
            return self.sync_single(&synchronizer, *course_id).await;
        }

        let bulk = BulkSynchronizer::new(synchronizer, config.bulk.clone());
        println!("🚀 Starting sync...");
        let outcome = if course_ids.is_empty() {
            bulk.sync_all().await
        } else {
            bulk.sync_courses(&course_ids).await
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Bulk sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        result.log_summary();
        print_bulk_summary(&result);

        if let Some(path) = &self.output {
            write_json(path, &result)?;
        }

        if result.is_successful() {
            println!("✅ Sync completed successfully!");
            Ok(EXIT_SUCCESS)
        } else {
            println!("⚠️  Sync completed with failures");
            Ok(EXIT_PARTIAL)
        }
    }

    async fn sync_single(
        &self,
        synchronizer: &CourseSynchronizer,
        course_id: CourseId,
    ) -> anyhow::Result<i32> {
        println!("🚀 Syncing course {course_id}...");
        let graph = match synchronizer.sync_course(course_id).await {
            Ok(graph) => graph,
            Err(e) => {
                tracing::error!(course_id = %course_id, error = %e, "Course sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        graph.log_summary();
        print_course_summary(&graph);

        if let Some(path) = &self.output {
            write_json(path, &graph)?;
        }

        println!("✅ Sync completed successfully!");
        Ok(EXIT_SUCCESS)
    }
}

fn print_course_summary(graph: &CourseGraph) {
    let name = graph.course.as_ref().map_or("-", |c| c.name.as_str());
    println!();
    println!("📊 Course {} ({name}):", graph.course_id);
    println!("  Students: {}", graph.students.len());
    println!("  Modules: {}", graph.modules.len());
    println!("  Assignments: {}", graph.assignments.len());
    println!("  API Calls: {}", graph.metrics.api_calls);
    println!(
        "  Analytics Calls: {} made, {} skipped",
        graph.metrics.analytics.calls_made, graph.metrics.analytics.calls_skipped
    );
    println!("  Duration: {:.2}s", graph.metrics.elapsed_ms as f64 / 1000.0);
    println!();
}

fn print_bulk_summary(result: &BulkSyncResult) {
    println!();
    println!("📊 Sync Summary:");
    println!("  Courses: {}", result.courses_attempted);
    println!("  Ready: {}", result.ready_courses.len());
    println!("  Failed: {}", result.failures.len());
    println!("  Students: {}", result.students.len());
    println!("  Assignments: {}", result.assignments.len());
    println!("  API Calls: {}", result.total_api_calls);
    println!("  Duration: {:.2}s", result.duration_ms as f64 / 1000.0);
    println!("  Success Rate: {:.2}%", result.success_rate());
    println!();

    if !result.failures.is_empty() {
        println!("⚠️  Failed courses:");
        for failure in &result.failures {
            println!("  - {}: {}", failure.course_id, failure.message);
        }
        println!();
    }
}
