//! High-level pipeline API: export bytes in, [`ClimbingSummary`] out.
//!
//! Combines every step: decoding, CSV reading, row normalization and
//! aggregation. The first failing step aborts the run; there is no partial
//! summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use sent::pipeline::summarize_csv;
//! use std::path::Path;
//!
//! let output = summarize_csv(Path::new("ticks.csv"))?;
//! println!("{} climbs, {} ft", output.summary.stats.total_climbs, output.summary.stats.total_feet);
//! ```

use serde::Serialize;
use std::fmt::Display;
use std::path::Path;

use crate::aggregate::summarize;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::models::{Climb, ClimbingStats, ClimbingSummary};
use crate::normalize::{normalize_rows, RawRow};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParsedCsv};

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Climbs and statistics
    pub summary: ClimbingSummary,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Summarize already-read rows.
///
/// This is the pure core: normalize every row, then aggregate.
pub fn summarize_rows(rows: &[RawRow]) -> PipelineResult<ClimbingSummary> {
    let climbs = normalize_rows(rows)?;
    Ok(summarize(climbs)?)
}

/// Summarize an export file on disk.
pub fn summarize_csv(path: &Path) -> PipelineResult<PipelineOutput> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = parse_csv_file_auto(path).map_err(logged)?;
    summarize_parsed(parsed)
}

/// Normalize an export file on disk without aggregating it.
///
/// Mixed grade families are fine here; only [`summarize_csv`] compares
/// grades.
pub fn normalize_csv(path: &Path) -> PipelineResult<Vec<Climb>> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = parse_csv_file_auto(path).map_err(logged)?;
    log_success(format!("Read {} rows", parsed.row_count()));

    let climbs = normalize_rows(&parsed.rows).map_err(logged)?;
    log_success(format!("Normalized {} climbs", climbs.len()));
    Ok(climbs)
}

/// Summarize raw upload bytes.
pub fn summarize_bytes(bytes: &[u8]) -> PipelineResult<PipelineOutput> {
    log_info("📖 Reading CSV upload...");
    let parsed = parse_bytes_auto(bytes).map_err(logged)?;
    summarize_parsed(parsed)
}

/// Internal: summarize parsed CSV data
fn summarize_parsed(parsed: ParsedCsv) -> PipelineResult<PipelineOutput> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Read {} rows", parsed.row_count()));

    let csv_info = CsvInfo {
        encoding: parsed.encoding.clone(),
        headers: parsed.headers.clone(),
        row_count: parsed.row_count(),
    };

    if parsed.rows.is_empty() {
        log_warning("Export has no climbs");
    }

    log_info("🧗 Normalizing climbs...");
    let summary = summarize_rows(&parsed.rows).map_err(logged)?;
    log_stats(&summary.stats);

    Ok(PipelineOutput { summary, csv_info })
}

/// Echo an error to the log stream before propagating it.
fn logged<E: Display>(err: E) -> E {
    log_error(err.to_string());
    err
}

fn log_stats(stats: &ClimbingStats) {
    log_success(format!("Normalized {} climbs", stats.total_climbs));
    log_success(format!("Total length: {} ft", stats.total_feet));
    log_success(format!("Average rating: {:.2} stars", stats.avg_rating));
    match &stats.hardest_boulder_problem {
        Some(c) => log_success(format!("Hardest boulder: {} ({})", c.route, c.grade)),
        None => log_info("No boulder sends"),
    }
    match &stats.hardest_wall_problem {
        Some(c) => log_success(format!("Hardest route: {} ({})", c.route, c.grade)),
        None => log_info("No route sends"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, PipelineError, RowError};
    use crate::grade::parse_grade;

    const HEADER: &str =
        "Date,Route,Rating,Notes,URL,Pitches,Location,Avg Stars,Your Stars,Style,Lead Style,Route Type,Your Rating,Length,Rating Code";

    fn export(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    #[test]
    fn test_summarize_bytes() {
        let bytes = export(&[
            "2024-02-10,Gunsmoke,V3,,https://mp/r/1,1,Joshua Tree,3.5,-1,Send,,Boulder,,15,",
            "2024-02-11,Stem Gem,V5,Sloper city,https://mp/r/2,1,Joshua Tree,3.0,3,Attempt,,Boulder,,,",
            "2024-03-02,Illusion Dweller,5.10b,,https://mp/r/3,1,Joshua Tree,3.7,4,Lead,Onsight,Trad,,100,",
            "2024-03-03,Bearded Cabbage,5.10c,,https://mp/r/4,1,Joshua Tree,3.3,-1,TR,Fell/Hung,Sport,,60,",
            "2024-03-04,Double Cross,5.7+,,https://mp/r/5,1,Joshua Tree,3.5,-1,Solo,,Trad,,,",
        ]);
        let output = summarize_bytes(&bytes).unwrap();
        let stats = &output.summary.stats;

        assert_eq!(output.csv_info.row_count, 5);
        assert_eq!(output.csv_info.encoding, "utf-8");
        assert_eq!(stats.total_climbs, 5);
        assert_eq!(stats.total_feet, 175);
        assert!((stats.avg_rating - 3.4).abs() < 1e-9);

        let boulder = stats.hardest_boulder_problem.as_ref().unwrap();
        assert_eq!(boulder.route, "Gunsmoke");
        assert_eq!(boulder.grade, parse_grade("V3").unwrap());

        let wall = stats.hardest_wall_problem.as_ref().unwrap();
        assert_eq!(wall.route, "Illusion Dweller");

        let solo = &output.summary.climbs[4];
        assert_eq!(solo.climbing_style, "solo");
        assert!(solo.sent);
    }

    #[test]
    fn test_header_only_export() {
        let output = summarize_bytes(&export(&[])).unwrap();
        assert_eq!(output.summary.climbs.len(), 0);
        assert_eq!(output.summary.stats.avg_rating, 0.0);
    }

    #[test]
    fn test_bad_rating_aborts_everything() {
        let bytes = export(&[
            "2024-02-10,Gunsmoke,V3,,https://mp/r/1,1,Joshua Tree,3.5,-1,Send,,Boulder,,15,",
            "2024-02-11,Mystery,hard,,https://mp/r/2,1,Joshua Tree,3.0,-1,Send,,Boulder,,,",
        ]);
        match summarize_bytes(&bytes) {
            Err(PipelineError::Row(RowError::MalformedGrade { line, .. })) => assert_eq!(line, 3),
            other => panic!("expected malformed grade, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_schema() {
        let result = summarize_bytes(b"Date,Route,Grade\n2024-01-01,X,V1");
        assert!(matches!(
            result,
            Err(PipelineError::Csv(CsvError::MissingColumns(_)))
        ));
    }

    #[test]
    fn test_summarize_rows_directly() {
        let row = RawRow::from_pairs(
            2,
            [
                ("Date", "2022-10-01"),
                ("Route", "The Nose"),
                ("Rating", "5.9 C2"),
                ("Notes", ""),
                ("URL", "https://mp/r/6"),
                ("Pitches", "31"),
                ("Location", "Yosemite > El Capitan"),
                ("Avg Stars", "4"),
                ("Your Stars", "-1"),
                ("Route Type", "Trad, Aid"),
                ("Style", "Lead"),
                ("Lead Style", "Pinkpoint"),
                ("Length", "2900"),
            ],
        );
        let summary = summarize_rows(&[row]).unwrap();
        assert_eq!(summary.stats.total_feet, 2900);
        assert_eq!(summary.stats.hardest_wall_problem.unwrap().route, "The Nose");
    }
}
