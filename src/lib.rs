// Canvas Sync - Canvas LMS extraction engine
// Copyright (c) 2025 Canvas Sync Contributors
// Licensed under the MIT License

//! # Canvas Sync - Canvas LMS extraction engine
//!
//! Canvas Sync pulls course, enrollment, assignment, module and per-student
//! analytics data out of a Canvas LMS instance while staying inside the
//! instance's request budget.
//!
//! ## Overview
//!
//! This library provides:
//! - **Gateway**: a rate-limited, retrying REST client with a rolling request budget
//! - **Pagination**: `Link` header driven aggregation of listings
//! - **Collection profiles**: presets and overrides deciding what is fetched and output
//! - **Collectors**: one per entity category, reconciled into a single course graph
//! - **Analytics optimization**: skipping per-student calls when the scores already agree
//! - **Orchestration**: single-course sync and batched multi-course sync
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Profiles, collectors, analytics and the sync orchestrators
//! - [`adapters`] - The Canvas REST gateway and its wire models
//! - [`domain`] - Identifiers, records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canvas_sync::adapters::canvas::CanvasGateway;
//! use canvas_sync::config::load_config;
//! use canvas_sync::core::sync::CourseSynchronizer;
//! use canvas_sync::domain::CourseId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("canvas-sync.toml")?;
//!     let profile = config.sync.resolve_profile()?;
//!
//!     let gateway = CanvasGateway::new(&config.canvas)?;
//!     let synchronizer = CourseSynchronizer::new(gateway, profile);
//!
//!     let graph = synchronizer.sync_course(CourseId::new(12345)).await?;
//!     println!(
//!         "{} students, {} assignments in {} calls",
//!         graph.students.len(),
//!         graph.assignments.len(),
//!         graph.metrics.api_calls
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error type
//! [`domain::SyncError`] wraps gateway failures ([`domain::CanvasError`]) and
//! tags failures inside a course sync with the stage they happened in.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
