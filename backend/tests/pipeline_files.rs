//! End-to-end runs over export files on disk.

use std::fs;
use std::io::Write;

use sent::{normalize_csv, summarize_csv, AggregateError, CsvError, PipelineError};
use tempfile::NamedTempFile;

const EXPORT: &str = "\
Date,Route,Rating,Notes,URL,Pitches,Location,Avg Stars,Your Stars,Style,Lead Style,Route Type,Your Rating,Length,Rating Code
2023-04-15,Dreamer,V4,,https://mp/r/10,1,Colorado > RMNP,3.6,-1,Flash,,Boulder,,12,
2023-04-15,Dreamer Direct,V4,,https://mp/r/11,1,Colorado > RMNP,3.2,-1,Send,,Boulder,,12,
2023-06-20,The Naked Edge,5.11b,\"Five pitches, pumped\",https://mp/r/12,5,Colorado > Eldorado,4.0,4,Lead,Redpoint,Trad,,500,
2023-07-01,Wind Ridge,5.6,,https://mp/r/13,3,Colorado > Eldorado,3.5,3,Lead,Onsight,Trad,,300,
2023-07-02,Country Club Crack,5.11c,,https://mp/r/14,1,Colorado > Boulder Canyon,3.7,-1,TR,Fell/Hung,Trad,,80,
";

fn write_temp(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file
}

#[test]
fn test_summarize_file() {
    let file = write_temp(EXPORT.as_bytes());
    let output = summarize_csv(file.path()).unwrap();
    let stats = &output.summary.stats;

    assert_eq!(output.csv_info.row_count, 5);
    assert_eq!(stats.total_climbs, 5);
    assert_eq!(stats.total_feet, 904);
    assert!((stats.avg_rating - 3.6).abs() < 1e-9);

    // Equal grades: the first one logged wins.
    let boulder = stats.hardest_boulder_problem.as_ref().unwrap();
    assert_eq!(boulder.route, "Dreamer");
    assert_eq!(boulder.result, "flash");

    // The harder 5.11c was a fall, so the 5.11b redpoint stands.
    let wall = stats.hardest_wall_problem.as_ref().unwrap();
    assert_eq!(wall.route, "The Naked Edge");
    assert_eq!(wall.notes.as_deref(), Some("Five pitches, pumped"));
    assert_eq!(wall.pitches, 5);
}

#[test]
fn test_summary_json_matches_file_order() {
    let file = write_temp(EXPORT.as_bytes());
    let output = summarize_csv(file.path()).unwrap();

    let json = serde_json::to_value(&output.summary).unwrap();
    let routes: Vec<&str> = json["climbs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["route"].as_str().unwrap())
        .collect();
    assert_eq!(
        routes,
        vec!["Dreamer", "Dreamer Direct", "The Naked Edge", "Wind Ridge", "Country Club Crack"]
    );
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    assert!(matches!(
        summarize_csv(&path),
        Err(PipelineError::Csv(CsvError::IoError(_)))
    ));
}

#[test]
fn test_windows_1252_export() {
    // "Señor" with 0xF1 for ñ, as a Windows spreadsheet would save it.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(EXPORT.lines().next().unwrap().as_bytes());
    bytes.extend_from_slice(b"\n2023-04-15,Se\xf1or Crack,5.9,,https://mp/r/20,1,Mexico > El Potrero Chico,3.0,-1,Lead,Onsight,Sport,,90,\n");

    let file = write_temp(&bytes);
    let output = summarize_csv(file.path()).unwrap();
    let route = &output.summary.climbs[0].route;
    assert_eq!(route, "Señor Crack");
    assert_ne!(output.csv_info.encoding, "utf-8");
}

#[test]
fn test_utf8_export_keeps_accents() {
    let mut content = EXPORT.lines().next().unwrap().to_string();
    content.push_str("\n2023-04-16,Señor Crack,5.9,,https://mp/r/21,1,Mexico > El Potrero Chico,3.0,-1,Lead,Onsight,Sport,,90,\n");
    content.push_str("2023-04-17,Café Roof,5.10a,,https://mp/r/22,1,France > Céüse,3.5,-1,Lead,Redpoint,Sport,,60,\n");

    let file = write_temp(content.as_bytes());
    let output = summarize_csv(file.path()).unwrap();
    assert_eq!(output.csv_info.encoding, "utf-8");

    let climbs = &output.summary.climbs;
    assert_eq!(climbs[0].route, "Señor Crack");
    assert_eq!(climbs[1].route, "Café Roof");
    assert_eq!(climbs[1].crag, "France > Céüse");
}

#[test]
fn test_normalize_skips_grade_comparison() {
    // A sport send graded in V next to a YDS one cannot be ranked.
    let mut content = EXPORT.lines().next().unwrap().to_string();
    content.push_str("\n2023-05-01,Odd Entry,V2,,https://mp/r/30,1,Utah > Maple Canyon,2.0,-1,Lead,Redpoint,Sport,,40,\n");
    content.push_str("2023-05-01,Normal Entry,5.10a,,https://mp/r/31,1,Utah > Maple Canyon,3.0,-1,Lead,Redpoint,Sport,,60,\n");
    let file = write_temp(content.as_bytes());

    assert!(matches!(
        summarize_csv(file.path()),
        Err(PipelineError::Aggregate(AggregateError::MixedGradeFamilies { .. }))
    ));

    let climbs = normalize_csv(file.path()).unwrap();
    assert_eq!(climbs.len(), 2);
    assert_eq!(climbs[0].route, "Odd Entry");
    assert!(climbs.iter().all(|c| c.sent));
}

#[test]
fn test_reads_from_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticks.csv");
    fs::write(&path, EXPORT).unwrap();

    let output = summarize_csv(&path).unwrap();
    assert_eq!(output.summary.stats.total_climbs, output.summary.climbs.len());
}
