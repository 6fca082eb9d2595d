//! Discover command implementation

use super::sync::build_synchronizer;
use super::{exit_code_for, write_json, EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::sync::BulkSynchronizer;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the discover command
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Cap on listed courses; overrides bulk.max_courses
    #[arg(long, value_name = "N")]
    pub max_courses: Option<usize>,

    /// Write the discovered courses as JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl DiscoverArgs {
    /// Execute the discover command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if self.max_courses.is_some() {
            config.bulk.max_courses = self.max_courses;
        }
        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let synchronizer = match build_synchronizer(&config) {
            Ok(synchronizer) => synchronizer,
            Err(e) => {
                eprintln!("Failed to initialize discovery: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let gateway = synchronizer.gateway().clone();
        let bulk = BulkSynchronizer::new(synchronizer, config.bulk.clone());

        let courses = match bulk.discover_courses().await {
            Ok(courses) => courses,
            Err(e) => {
                tracing::error!(error = %e, "Course discovery failed");
                eprintln!("Discovery failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!();
        println!("📚 {} course(s) matching {:?}:", courses.len(), config.bulk.workflow_states);
        for course in &courses {
            println!(
                "  {:>10}  {:<16} {:<12} {}",
                course.id, course.course_code, course.workflow_state, course.name
            );
        }
        println!();
        println!("  API Calls: {}", gateway.calls_issued());
        println!();

        if let Some(path) = &self.output {
            write_json(path, &courses)?;
        }

        Ok(EXIT_SUCCESS)
    }
}
