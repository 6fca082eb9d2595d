//! Canvas LMS REST adapter
//!
//! - [`gateway`] - rate-limited, retrying HTTP gateway ([`CanvasGateway`])
//! - [`budget`] - rolling request budget shared by every gateway clone
//! - [`metrics`] - per-call records and running success/latency figures
//! - [`params`] - query parameters with repeated-key arrays
//! - [`pagination`] - `Link` header parsing and listing aggregation
//! - [`models`] - lenient wire models for Canvas JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use canvas_sync::adapters::canvas::{CanvasGateway, QueryParams};
//! use canvas_sync::config::{secret_string, CanvasConfig};
//!
//! # async fn example() -> canvas_sync::domain::Result<()> {
//! let config = CanvasConfig::new("https://canvas.example.edu", secret_string("token".into()));
//! let gateway = CanvasGateway::new(&config)?;
//!
//! let params = QueryParams::new()
//!     .with_many("type", ["StudentEnrollment"])
//!     .with_many("include", ["total_scores"]);
//! let enrollments = gateway.collect_all("courses/101/enrollments", &params).await?;
//!
//! println!("{} enrollments, {} calls", enrollments.len(), gateway.calls_issued());
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod params;

pub use budget::{ExhaustionPolicy, RequestBudget};
pub use gateway::{ApiResponse, CanvasGateway};
pub use metrics::{CallRecord, GatewayMetrics, MetricsSnapshot};
pub use pagination::LinkHeader;
pub use params::QueryParams;
