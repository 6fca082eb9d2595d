//! External system integrations for Canvas Sync.
//!
//! - [`canvas`] - Canvas LMS REST API: gateway, request budget, pagination
//!   and wire models
//!
//! Transport failures are reduced to [`crate::domain::CanvasError`] before
//! they leave this layer.

pub mod canvas;
