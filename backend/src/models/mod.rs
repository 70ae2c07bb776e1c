//! Domain models for the sent summary pipeline.
//!
//! - [`Climb`] - One normalized tick from the export
//! - [`ClimbingStats`] - Totals, averages and hardest sends
//! - [`ClimbingSummary`] - Climbs paired with their stats (the response body)
//!
//! Field names are serialized as-is (snake_case) to keep the response
//! shape of the upload endpoint stable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Route-type tag that routes a send into the boulder bucket.
pub const BOULDER: &str = "boulder";

// =============================================================================
// Climb
// =============================================================================

/// A single logged attempt, normalized from one CSV row.
///
/// Built once by [`crate::normalize::normalize_row`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    /// Day of the attempt.
    pub date: NaiveDate,
    /// Route or problem name.
    pub route: String,
    /// Parsed difficulty.
    pub grade: Grade,
    pub notes: Option<String>,
    /// Link back to the route page.
    pub uri: String,
    pub pitches: u32,
    /// Location, as the export's breadcrumb string.
    pub crag: String,
    /// Community stars (0-4).
    pub community_rating: f64,
    /// Personal stars, absent when not rated.
    pub your_rating: Option<f64>,
    /// Discipline tag, lower-cased (`boulder`, `lead`, `tr`, `solo`, ...).
    pub climbing_style: String,
    /// Route-type tags, lower-cased. Never empty.
    pub climbing_types: Vec<String>,
    /// Outcome label, lower-cased (`send`, `redpoint`, `fell/hung`, ...).
    pub result: String,
    /// Length in feet.
    pub length: Option<u32>,
    pub sent: bool,
}

impl Climb {
    /// Whether the climb carries the `boulder` route type.
    pub fn is_boulder(&self) -> bool {
        self.climbing_types.iter().any(|t| t == BOULDER)
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate statistics over a set of climbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbingStats {
    /// Sum of every known `length`.
    pub total_feet: u64,
    pub total_climbs: usize,
    /// Mean community rating, `0.0` when there are no climbs.
    pub avg_rating: f64,
    /// Hardest sent boulder-tagged climb.
    pub hardest_boulder_problem: Option<Climb>,
    /// Hardest sent climb without the boulder tag.
    pub hardest_wall_problem: Option<Climb>,
}

/// Climbs plus their statistics.
///
/// `stats.total_climbs == climbs.len()` always holds for summaries built
/// by [`crate::aggregate::summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbingSummary {
    pub climbs: Vec<Climb>,
    pub stats: ClimbingStats,
}

// =============================================================================
// Tests
// =============================================================================
