//! Line-delimited payload files.
//!
//! Each line holds one pixel serialized as a standalone JSON object.
//! Artillery reads these through a [`PayloadRef`](super::PayloadRef) and
//! binds the columns to `{{ field }}` template variables, one row per
//! virtual user.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ScenarioError, ScenarioResult};
use crate::models::Pixel;

/// Write pixels as one JSON object per line.
///
/// Returns the number of records written.
pub fn write_payload<'a, I>(path: impl AsRef<Path>, pixels: I) -> ScenarioResult<usize>
where
    I: IntoIterator<Item = &'a Pixel>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| ScenarioError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;

    for pixel in pixels {
        serde_json::to_writer(&mut writer, pixel)?;
        writer.write_all(b"\n").map_err(|e| ScenarioError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        count += 1;
    }

    writer.flush().map_err(|e| ScenarioError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Count the records of an existing payload file.
///
/// Every non-blank line must parse back as a pixel record. The validate
/// command uses this to cross-check a config against its payload files.
pub fn count_records(path: impl AsRef<Path>) -> ScenarioResult<usize> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ScenarioError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let mut count = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ScenarioError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        serde_json::from_str::<Pixel>(&line).map_err(|e| ScenarioError::MalformedPayload {
            path: path.to_path_buf(),
            line: idx + 1,
            source: e,
        })?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_payload_one_object_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");
        let pixels = vec![
            Pixel::new(0, 0, "#fff", 1),
            Pixel::new(1, 0, "#000", 2),
            Pixel::new(2, 0, "red", 3),
        ];

        let written = write_payload(&path, &pixels).unwrap();
        assert_eq!(written, 3);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r##"{"x":0,"y":0,"color":"#fff","user_id":1}"##);

        for line in lines {
            serde_json::from_str::<Pixel>(line).unwrap();
        }
    }

    #[test]
    fn test_count_records_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");
        let pixels = vec![Pixel::new(0, 0, "#fff", 1), Pixel::new(1, 1, "#000", 2)];

        write_payload(&path, &pixels).unwrap();
        assert_eq!(count_records(&path).unwrap(), 2);
    }

    #[test]
    fn test_count_records_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(
            &path,
            "{\"x\":0,\"y\":0,\"color\":\"#fff\",\"user_id\":1}\n\n{\"x\":1,\"y\":1,\"color\":\"#000\",\"user_id\":2}\n",
        )
        .unwrap();

        assert_eq!(count_records(&path).unwrap(), 2);
    }

    #[test]
    fn test_count_records_rejects_malformed_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(
            &path,
            "{\"x\":0,\"y\":0,\"color\":\"#fff\",\"user_id\":1}\nnot json\n",
        )
        .unwrap();

        let err = count_records(&path).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::MalformedPayload { line: 2, .. }
        ));
    }

    #[test]
    fn test_write_empty_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");

        let written = write_payload(&path, &[]).unwrap();
        assert_eq!(written, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
