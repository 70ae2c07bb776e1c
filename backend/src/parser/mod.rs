//! CSV ingest for the climbing-log export.
//!
//! Decodes raw upload bytes (encoding auto-detection, BOM stripping) and
//! reads them with the `csv` crate into [`RawRow`]s. The export is always
//! comma-delimited with a header line; quoted fields may contain commas
//! (`"Trad, Sport"`) and newlines (notes).

use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::normalize::{columns, RawRow};

/// Rows read from one export, with metadata for logging.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Data rows in file order
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Column headers, trimmed
    pub headers: Vec<String>,
}

impl ParsedCsv {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Detect the encoding of raw bytes.
///
/// Bytes that are valid UTF-8 are taken as UTF-8; chardet only guesses
/// for everything else.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names. No confident guess on non-UTF-8 bytes
    // means a Windows spreadsheet save.
    match charset.to_lowercase().as_str() {
        "" => "windows-1252".to_string(),
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// UTF-8 is decoded strictly: a file that claims UTF-8 but is not is an
/// error, never a lossy guess. A leading byte-order mark is removed.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        // Latin-1 labels decode as windows-1252, its superset.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec()).map_err(|e| {
            CsvError::EncodingError(format!("{} is not valid UTF-8: {}", encoding, e))
        })?,
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                CsvError::EncodingError(format!("unsupported encoding '{}'", encoding))
            })?;
            codec.decode(bytes).0.into_owned()
        }
    };

    Ok(match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    })
}

/// Check that a header carries every export column.
pub fn check_headers(headers: &[String]) -> CsvResult<()> {
    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|s| s.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CsvError::MissingColumns(missing))
    }
}

/// Read rows from a reader over already-decoded text.
pub fn parse_csv<R: Read>(reader: R, encoding: impl Into<String>) -> CsvResult<ParsedCsv> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| to_parse_error(&e, 1))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }
    check_headers(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Fallback line assumes one physical line per record.
        let record = result.map_err(|e| to_parse_error(&e, idx + 2))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        rows.push(RawRow::from_pairs(
            line,
            headers.iter().cloned().zip(record.iter().map(str::to_string)),
        ));
    }

    Ok(ParsedCsv {
        rows,
        encoding: encoding.into(),
        headers,
    })
}

/// Read rows from decoded text.
///
/// # Example
/// ```ignore
/// let parsed = parse_str(include_str!("ticks.csv"), "utf-8")?;
/// println!("{} rows", parsed.row_count());
/// ```
pub fn parse_str(content: &str, encoding: impl Into<String>) -> CsvResult<ParsedCsv> {
    parse_csv(content.as_bytes(), encoding)
}

/// Parse CSV bytes with auto-detection of encoding.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParsedCsv> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    parse_str(&content, encoding)
}

/// Parse a CSV file with auto-detection of encoding.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

fn to_parse_error(err: &csv::Error, fallback_line: usize) -> CsvError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    CsvError::ParseError {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Date,Route,Rating,Notes,URL,Pitches,Location,Avg Stars,Your Stars,Style,Lead Style,Route Type,Your Rating,Length,Rating Code";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_reads_rows_by_header() {
        let csv = csv_with(&[
            "2024-02-10,The Mandala,V12,,https://mp/route/1,1,California > Bishop,3.9,-1,Send,,Boulder,,15,20000",
        ]);
        let parsed = parse_str(&csv, "utf-8").unwrap();

        assert_eq!(parsed.row_count(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.line(), 2);
        assert_eq!(row.get("Route"), Some("The Mandala"));
        assert_eq!(row.get("Notes"), Some(""));
        assert_eq!(row.get("Rating Code"), Some("20000"));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = csv_with(&[
            r#"2023-06-01,"Epinephrine",5.9,"Long day, great climb",https://mp/route/2,13,"Nevada > Red Rocks",3.8,4,Lead,Onsight,"Trad, Alpine",,2000,1800"#,
        ]);
        let parsed = parse_str(&csv, "utf-8").unwrap();
        let row = &parsed.rows[0];
        assert_eq!(row.get("Notes"), Some("Long day, great climb"));
        assert_eq!(row.get("Route Type"), Some("Trad, Alpine"));
    }

    #[test]
    fn test_multiline_notes_keep_line_numbers() {
        let csv = csv_with(&[
            "2023-06-01,A,5.9,\"line one\nline two\",u,1,L,3,-1,Lead,Onsight,Sport,,,",
            "2023-06-02,B,5.10a,,u,1,L,3,-1,Lead,Onsight,Sport,,,",
        ]);
        let parsed = parse_str(&csv, "utf-8").unwrap();
        assert_eq!(parsed.rows[0].line(), 2);
        assert_eq!(parsed.rows[1].line(), 4);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = format!(
            "{}\n\n",
            csv_with(&["2023-06-01,A,5.9,,u,1,L,3,-1,Lead,Onsight,Sport,,,"])
        );
        let parsed = parse_str(&csv, "utf-8").unwrap();
        assert_eq!(parsed.row_count(), 1);
    }

    #[test]
    fn test_header_only() {
        let parsed = parse_str(HEADER, "utf-8").unwrap();
        assert_eq!(parsed.row_count(), 0);
        assert_eq!(parsed.headers.len(), 15);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_str("", "utf-8"), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_str("Date,Route\n2023-01-01,X", "utf-8").unwrap_err();
        match err {
            CsvError::MissingColumns(missing) => {
                assert!(missing.contains(&"Rating".to_string()));
                assert!(!missing.contains(&"Route".to_string()));
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_error() {
        let csv = csv_with(&["2023-06-01,A,5.9"]);
        match parse_str(&csv, "utf-8") {
            Err(CsvError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(csv_with(&[]).as_bytes());
        let parsed = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(parsed.headers[0], "Date");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = decode_content(&[0x66, 0x6F, 0xFF, 0xFE], "utf-8").unwrap_err();
        assert!(matches!(err, CsvError::EncodingError(_)));
    }

    #[test]
    fn test_other_labels_decoded() {
        // "Ça" in ISO-8859-2
        let decoded = decode_content(&[0xC7, 0x61], "ISO-8859-2").unwrap();
        assert_eq!(decoded, "Ça");
        assert!(matches!(
            decode_content(b"a", "klingon"),
            Err(CsvError::EncodingError(_))
        ));
    }

    #[test]
    fn test_utf8_with_few_accents_detected() {
        for name in ["Señor Crack", "Café Roof", "El Niño", "Zürich Dihedral"] {
            assert_eq!(detect_encoding(name.as_bytes()), "utf-8");
        }

        let csv = csv_with(&[
            "2023-06-01,Señor Crack,5.9,,u,1,Mexico > El Potrero Chico,3,-1,Lead,Onsight,Sport,,,",
        ]);
        let parsed = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.rows[0].get("Route"), Some("Señor Crack"));
    }

    #[test]
    fn test_latin1_keeps_latin1_symbols() {
        // 0xA4 and 0xA6 are ¤ and ¦ in Latin-1, not € and Š.
        let decoded = decode_content(&[0xA4, 0xA6, 0xF1], "iso-8859-1").unwrap();
        assert_eq!(decoded, "¤¦ñ");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Señor" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x65, 0xF1, 0x6F, 0x72];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Señor");
    }
}
