//! CSV loading with encoding and delimiter auto-detection.
//!
//! Produces raw string rows under canonical column names. Type coercion and
//! imputation happen later, in [`crate::transform::clean`].

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{CsvError, CsvResult};
use crate::models::fields;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers, resolved to canonical names where recognised
    pub headers: Vec<String>,
    /// Raw cell values, one `Vec` per data row, aligned with `headers`
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let legacy = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            return Ok(String::from_utf8(bytes.to_vec())
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()));
        }
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc,
            // Fallback: UTF-8 with lossy conversion
            None => return Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    };

    let (decoded, _, had_errors) = legacy.decode(bytes);
    if had_errors {
        return Err(CsvError::EncodingError(encoding.to_string()));
    }
    Ok(decoded.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Headers are resolved against the field catalogue; unknown headers are
/// kept verbatim. Blank lines are skipped, short rows are padded with empty
/// cells and extra cells are dropped.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(to_parse_error)?
        .iter()
        .map(|raw| match fields::resolve(raw) {
            Some(canonical) => canonical.to_string(),
            None => raw.trim().to_string(),
        })
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(to_parse_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let mut result = parse_str(&content, delimiter)?;
    result.encoding = encoding;
    Ok(result)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("Automobile_data.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.rows.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

fn to_parse_error(err: csv::Error) -> CsvError {
    CsvError::ParseError {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "Brand,Price\ntoyota,10000\nhonda,15000";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.headers, vec!["Brand", "Price"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0], vec!["toyota", "10000"]);
        assert_eq!(result.rows[1], vec!["honda", "15000"]);
    }

    #[test]
    fn test_uci_headers_are_mapped_by_name() {
        let csv = "make,drive-wheels,body-style,price\ntoyota,fwd,sedan,?";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.headers, vec!["Brand", "Drive_Type", "Body_Style", "Price"]);
        assert_eq!(result.rows[0][3], "?");
    }

    #[test]
    fn test_unknown_headers_kept() {
        let csv = "make,colour\nmazda,red";
        let result = parse_str(csv, ',').unwrap();
        assert_eq!(result.headers, vec!["Brand", "colour"]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "Brand;Body_Style\n\"alfa romero\";\"convertible\"";
        let result = parse_str(csv, ';').unwrap();
        assert_eq!(result.rows[0], vec!["alfa romero", "convertible"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let result = parse_str(csv, ',').unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_short_rows_padded_and_extra_cells_dropped() {
        let csv = "a,b,c\n1\n1,2,3,4";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.rows[0], vec!["1", "", ""]);
        assert_eq!(result.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "Brand;Price\ntoyota;10000\nhonda;15000";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.headers, vec!["Brand", "Price"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.csv");
        std::fs::write(&path, "make,price\nnissan,7099\n").unwrap();

        let result = parse_csv_file_auto(&path).unwrap();
        assert_eq!(result.headers, vec!["Brand", "Price"]);
        assert_eq!(result.rows[0], vec!["nissan", "7099"]);
    }
}
