//! Row normalization: one raw export row into one [`Climb`].
//!
//! The export has carried two formats over the years. Older files log a
//! boulder problem like any roped climb (`Style` is the discipline and
//! `Lead Style` the outcome). Newer files put the outcome of a boulder
//! attempt (`Send`, `Flash`, `Attempt`) directly in `Style`. [`classify`]
//! tells the two apart and records the decision in
//! [`Classification::is_new_style_boulder`].
//!
//! # Example
//!
//! ```rust
//! use sent::normalize::{normalize_row, RawRow};
//!
//! let row = RawRow::new(2)
//!     .with("Date", "2024-03-09")
//!     .with("Route", "Midnight Lightning")
//!     .with("Rating", "V8")
//!     .with("Notes", "")
//!     .with("URL", "https://www.mountainproject.com/route/105720495")
//!     .with("Pitches", "1")
//!     .with("Location", "California > Yosemite > Camp 4")
//!     .with("Avg Stars", "3.8")
//!     .with("Your Stars", "-1")
//!     .with("Route Type", "Boulder")
//!     .with("Style", "Send")
//!     .with("Lead Style", "")
//!     .with("Length", "15");
//!
//! let climb = normalize_row(&row).unwrap();
//! assert_eq!(climb.climbing_style, "boulder");
//! assert!(climb.sent);
//! ```

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::{RowError, RowResult};
use crate::grade::parse_grade;
use crate::models::{Climb, BOULDER};

/// Column names of the climbing-log export.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const ROUTE: &str = "Route";
    pub const RATING: &str = "Rating";
    pub const NOTES: &str = "Notes";
    pub const URL: &str = "URL";
    pub const PITCHES: &str = "Pitches";
    pub const LOCATION: &str = "Location";
    pub const AVG_STARS: &str = "Avg Stars";
    pub const YOUR_STARS: &str = "Your Stars";
    pub const ROUTE_TYPE: &str = "Route Type";
    pub const STYLE: &str = "Style";
    pub const LEAD_STYLE: &str = "Lead Style";
    pub const LENGTH: &str = "Length";

    /// Every column a row must carry.
    pub const REQUIRED: [&str; 13] = [
        DATE, ROUTE, RATING, NOTES, URL, PITCHES, LOCATION, AVG_STARS, YOUR_STARS, ROUTE_TYPE,
        STYLE, LEAD_STYLE, LENGTH,
    ];
}

/// `Style` values that mark a new-style boulder row. Matched case-sensitively.
pub const NEW_STYLE_BOULDER_STYLES: [&str; 3] = ["Attempt", "Flash", "Send"];

/// Outcome labels that count as a send.
pub const SEND_RESULTS: [&str; 5] = ["redpoint", "send", "flash", "onsight", "pinkpoint"];

/// `Your Stars` value meaning "not rated".
const UNRATED: &str = "-1";

// =============================================================================
// Raw rows
// =============================================================================

/// One CSV record as column name to text, tagged with its file line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    line: usize,
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Empty row for the given 1-based file line.
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: HashMap::new(),
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            line,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of a column the schema requires.
    fn field(&self, column: &str) -> RowResult<&str> {
        self.get(column).ok_or_else(|| RowError::UnsupportedSchema {
            line: self.line,
            column: column.to_string(),
        })
    }

    fn malformed(&self, column: &str, value: &str, message: impl Into<String>) -> RowError {
        RowError::MalformedField {
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Style, outcome and send status of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Row is a boulder logged in the newer format (outcome in `Style`).
    pub is_new_style_boulder: bool,
    pub climbing_style: String,
    pub result: String,
    pub sent: bool,
}

/// Split the `Route Type` column into lower-cased tags.
///
/// Tokens are kept as written, blanks included: `"Sport, "` gives
/// `["sport", ""]` and an empty column gives `[""]`.
pub fn split_route_types(raw: &str) -> Vec<String> {
    raw.split(',').map(|t| t.trim().to_lowercase()).collect()
}

/// Whether an outcome counts as a send. Solo ascents always do.
pub fn is_send(climbing_style: &str, result: &str) -> bool {
    SEND_RESULTS.contains(&result) || climbing_style == "solo"
}

/// Derive style, result and send status from the raw style columns.
pub fn classify(climbing_types: &[String], style: &str, lead_style: &str) -> Classification {
    let is_new_style_boulder = climbing_types.iter().any(|t| t == BOULDER)
        && NEW_STYLE_BOULDER_STYLES.contains(&style);

    let (climbing_style, result) = if is_new_style_boulder {
        (BOULDER.to_string(), style.to_lowercase())
    } else {
        (style.to_lowercase(), lead_style.to_lowercase())
    };

    let sent = is_send(&climbing_style, &result);

    Classification {
        is_new_style_boulder,
        climbing_style,
        result,
        sent,
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalize one row into a [`Climb`].
///
/// Fails on the first missing column or malformed value; there is no
/// partial record.
pub fn normalize_row(row: &RawRow) -> RowResult<Climb> {
    let climbing_types = split_route_types(row.field(columns::ROUTE_TYPE)?);

    let classification = classify(
        &climbing_types,
        row.field(columns::STYLE)?,
        row.field(columns::LEAD_STYLE)?,
    );

    let date = {
        let raw = row.field(columns::DATE)?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| row.malformed(columns::DATE, raw, format!("expected YYYY-MM-DD ({})", e)))?
    };

    let route = row.field(columns::ROUTE)?;
    if route.trim().is_empty() {
        return Err(row.malformed(columns::ROUTE, route, "route name is empty"));
    }

    let grade = parse_grade(row.field(columns::RATING)?).map_err(|source| {
        RowError::MalformedGrade {
            line: row.line(),
            source,
        }
    })?;

    let notes = optional_text(row.field(columns::NOTES)?);

    let pitches = {
        let raw = row.field(columns::PITCHES)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| row.malformed(columns::PITCHES, raw, "expected a non-negative integer"))?
    };

    let community_rating = parse_stars(row, columns::AVG_STARS, row.field(columns::AVG_STARS)?)?;

    let your_rating = {
        let raw = row.field(columns::YOUR_STARS)?;
        match raw.trim() {
            "" | UNRATED => None,
            _ => Some(parse_stars(row, columns::YOUR_STARS, raw)?),
        }
    };

    let length = {
        let raw = row.field(columns::LENGTH)?;
        match raw.trim() {
            "" => None,
            value => Some(value.parse::<u32>().map_err(|_| {
                row.malformed(columns::LENGTH, raw, "expected a non-negative integer (feet)")
            })?),
        }
    };

    Ok(Climb {
        date,
        route: route.to_string(),
        grade,
        notes,
        uri: row.field(columns::URL)?.to_string(),
        pitches,
        crag: row.field(columns::LOCATION)?.to_string(),
        community_rating,
        your_rating,
        climbing_style: classification.climbing_style,
        climbing_types,
        result: classification.result,
        length,
        sent: classification.sent,
    })
}

/// Normalize every row, stopping at the first failure.
pub fn normalize_rows(rows: &[RawRow]) -> RowResult<Vec<Climb>> {
    rows.iter().map(normalize_row).collect()
}

fn optional_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn parse_stars(row: &RawRow, column: &str, raw: &str) -> RowResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| row.malformed(column, raw, "expected a number"))
}
