//! Pixel CSV parsing.
//!
//! Reads canvas exports with `x,y,color` headers into [`Batch`]es and
//! numbers each row with a virtual user id. Columns may appear in any
//! order and extra columns are ignored; the three required ones must
//! all be present.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{Batch, Pixel};

/// Required header columns of a pixel export.
pub const COL_X: &str = "x";
pub const COL_Y: &str = "y";
pub const COL_COLOR: &str = "color";

/// Read a pixel CSV file into a batch.
///
/// The batch name is the file stem with any `pixels_` prefix dropped
/// (`pixels_nexon.csv` -> `nexon`). User ids are assigned as
/// `start_user_id + row_index` over the data rows in file order.
///
/// # Example
/// ```ignore
/// use pixelload::parser::read_batch;
///
/// let batch = read_batch("team1.csv", 10_000)?;
/// println!("{} pixels from users {}..", batch.len(), batch.start_user_id);
/// ```
pub fn read_batch<P: AsRef<Path>>(path: P, start_user_id: u64) -> CsvResult<Batch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CsvError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let pixels = parse_reader(file, path, start_user_id)?;

    // Canvas exports are conventionally named pixels_<team>.csv; the
    // prefix carries nothing, so batch names drop it.
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("batch");
    let name = stem.strip_prefix("pixels_").unwrap_or(stem).to_string();

    Ok(Batch::from_pixels(name, start_user_id, pixels))
}

/// Parse pixel CSV content that is already in memory.
///
/// Same rules as [`read_batch`]; errors are reported against `<inline>`.
pub fn parse_pixels(csv: &str, start_user_id: u64) -> CsvResult<Vec<Pixel>> {
    parse_reader(csv.as_bytes(), Path::new("<inline>"), start_user_id)
}

fn parse_reader<R: Read>(reader: R, path: &Path, start_user_id: u64) -> CsvResult<Vec<Pixel>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| CsvError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();

    let x_idx = column_index(&headers, COL_X, path)?;
    let y_idx = column_index(&headers, COL_Y, path)?;
    let color_idx = column_index(&headers, COL_COLOR, path)?;

    let mut pixels = Vec::new();

    for (idx, row) in csv_reader.records().enumerate() {
        let record = row.map_err(|e| CsvError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Header is line 1, so data rows start at 2 when the reader
        // cannot report a position.
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);

        let x = parse_coord(&record, x_idx, COL_X, path, line)?;
        let y = parse_coord(&record, y_idx, COL_Y, path, line)?;
        let color = field(&record, color_idx, COL_COLOR, path, line)?;

        let user_id = start_user_id + pixels.len() as u64;
        pixels.push(Pixel::new(x, y, color, user_id));
    }

    if pixels.is_empty() {
        return Err(CsvError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(pixels)
}

fn column_index(
    headers: &csv::StringRecord,
    column: &'static str,
    path: &Path,
) -> CsvResult<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| CsvError::MissingHeader {
            path: path.to_path_buf(),
            column,
        })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &'static str,
    path: &Path,
    line: u64,
) -> CsvResult<&'r str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CsvError::MissingValue {
            path: path.to_path_buf(),
            line,
            column,
        }),
    }
}

fn parse_coord(
    record: &csv::StringRecord,
    idx: usize,
    column: &'static str,
    path: &Path,
    line: u64,
) -> CsvResult<u32> {
    let raw = field(record, idx, column, path, line)?;
    raw.parse().map_err(|_| CsvError::InvalidCoordinate {
        path: path.to_path_buf(),
        line,
        column,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_assigns_sequential_user_ids() {
        let csv = "x,y,color\n0,0,#fff\n1,0,#000";
        let pixels = parse_pixels(csv, 1).unwrap();

        assert_eq!(pixels.len(), 2);
        assert_eq!(pixels[0], Pixel::new(0, 0, "#fff", 1));
        assert_eq!(pixels[1], Pixel::new(1, 0, "#000", 2));
    }

    #[test]
    fn test_parse_respects_start_offset() {
        let csv = "x,y,color\n5,5,red\n6,5,blue\n7,5,green";
        let pixels = parse_pixels(csv, 10_000).unwrap();

        let ids: Vec<u64> = pixels.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![10_000, 10_001, 10_002]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let csv = "x, y, color\n 3 , 4 , #abc ";
        let pixels = parse_pixels(csv, 1).unwrap();

        assert_eq!(pixels[0], Pixel::new(3, 4, "#abc", 1));
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "color,y,x\n#fff,2,1";
        let pixels = parse_pixels(csv, 1).unwrap();

        assert_eq!(pixels[0].x, 1);
        assert_eq!(pixels[0].y, 2);
        assert_eq!(pixels[0].color, "#fff");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "x,y,color,note\n1,2,#fff,drawn by bot";
        let pixels = parse_pixels(csv, 1).unwrap();

        assert_eq!(pixels.len(), 1);
        assert_eq!(pixels[0].color, "#fff");
    }

    #[test]
    fn test_missing_header_rejected() {
        let csv = "a,b\n1,2";
        let err = parse_pixels(csv, 1).unwrap_err();

        assert!(matches!(err, CsvError::MissingHeader { column: "x", .. }));
        assert!(err.to_string().contains("missing required column 'x'"));
    }

    #[test]
    fn test_invalid_coordinate_addresses_line() {
        let csv = "x,y,color\n0,0,#fff\nfoo,1,#000";
        let err = parse_pixels(csv, 1).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("<inline>:3"));
        assert!(msg.contains("'foo'"));
    }

    #[test]
    fn test_missing_value_rejected() {
        let csv = "x,y,color\n1,,#fff";
        let err = parse_pixels(csv, 1).unwrap_err();

        assert!(matches!(
            err,
            CsvError::MissingValue { column: "y", line: 2, .. }
        ));
    }

    #[test]
    fn test_empty_color_rejected() {
        let csv = "x,y,color\n1,2,";
        let err = parse_pixels(csv, 1).unwrap_err();

        assert!(matches!(err, CsvError::MissingValue { column: "color", .. }));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let err = parse_pixels("x,y,color\n", 1).unwrap_err();
        assert!(matches!(err, CsvError::Empty { .. }));
    }

    #[test]
    fn test_read_batch_names_from_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("team1.csv");
        fs::write(&path, "x,y,color\n0,0,#fff\n1,1,#000\n").unwrap();

        let batch = read_batch(&path, 10_000).unwrap();

        assert_eq!(batch.name, "team1");
        assert_eq!(batch.start_user_id, 10_000);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.pixels[1].user_id, 10_001);
    }

    #[test]
    fn test_read_batch_strips_pixels_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pixels_nexon.csv");
        fs::write(&path, "x,y,color\n0,0,#fff\n").unwrap();

        let batch = read_batch(&path, 1).unwrap();
        assert_eq!(batch.name, "nexon");
    }

    #[test]
    fn test_read_batch_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_batch(dir.path().join("nope.csv"), 1).unwrap_err();
        assert!(matches!(err, CsvError::Io { .. }));
    }
}
