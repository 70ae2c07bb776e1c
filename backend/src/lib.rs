//! # sent - climbing log summaries
//!
//! sent reads a climbing-log CSV export (one row per tick) and produces the
//! normalized climbs plus statistics: total feet, climb count, average
//! community rating, and the hardest boulder and route sends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Parser    │────▶│  Normalize  │────▶│  Aggregate  │
//! │  (upload)   │     │ (auto-enc)  │     │ (+ grades)  │     │  (summary)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sent::summarize_csv;
//! use std::path::Path;
//!
//! let output = summarize_csv(Path::new("ticks.csv")).unwrap();
//! println!("{} climbs", output.summary.stats.total_climbs);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`grade`] - Route and boulder grade parsing and ranking
//! - [`models`] - Climb, ClimbingStats, ClimbingSummary
//! - [`normalize`] - Raw row to Climb classification
//! - [`aggregate`] - Climbs to statistics
//! - [`parser`] - CSV decoding and reading
//! - [`pipeline`] - End-to-end entry points
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Grades and normalization
pub mod grade;
pub mod normalize;

// Statistics
pub mod aggregate;

// Ingest
pub mod parser;
pub mod pipeline;

// HTTP API
pub mod api;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregateError, ConfigError, CsvError, GradeError, PipelineError, RowError, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Climb, ClimbingStats, ClimbingSummary};

// =============================================================================
// Re-exports - Grades
// =============================================================================

pub use grade::{parse_grade, sort_grades, BoulderGrade, Grade, GradeFamily, RouteGrade};

// =============================================================================
// Re-exports - Normalization & aggregation
// =============================================================================

pub use aggregate::{aggregate, summarize};
pub use normalize::{classify, normalize_row, normalize_rows, Classification, RawRow};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{parse_bytes_auto, parse_csv_file_auto, ParsedCsv};
pub use pipeline::{
    normalize_csv, summarize_bytes, summarize_csv, summarize_rows, CsvInfo, PipelineOutput,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::ErrorResponse;
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
