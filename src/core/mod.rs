//! Core sync logic for Canvas Sync.
//!
//! # Modules
//!
//! - [`profile`] - Collection profiles, presets and the impact estimator
//! - [`collect`] - Entity collectors and assignment/module reconciliation
//! - [`analytics`] - Per-student analytics optimizer
//! - [`sync`] - Single-course and bulk orchestrators
//!
//! # Sync Workflow
//!
//! 1. **Course info**: Fetch the course record
//! 2. **Enrollments**: Fetch the roster, backfill emails, run the analytics pass
//! 3. **Modules/assignments**: Fetch both listings and reconcile them
//! 4. **Merge**: Validate and shape the course graph
//!
//! Steps 2 and 3 run concurrently against the same rate budget.
//!
//! # Example
//!
//! ```rust,no_run
//! use canvas_sync::adapters::canvas::CanvasGateway;
//! use canvas_sync::config::load_config;
//! use canvas_sync::core::profile::ProfilePreset;
//! use canvas_sync::core::sync::CourseSynchronizer;
//! use canvas_sync::domain::CourseId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("canvas-sync.toml")?;
//! let gateway = CanvasGateway::new(&config.canvas)?;
//!
//! let synchronizer = CourseSynchronizer::new(gateway, ProfilePreset::Full.profile());
//! let graph = synchronizer.sync_course(CourseId::new(12345)).await?;
//!
//! println!("{} students, {} calls", graph.students.len(), graph.metrics.api_calls);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod collect;
pub mod profile;
pub mod sync;
