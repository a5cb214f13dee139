//! JSON persistence for contours, segmentation results and index tables.
//!
//! Contours are arrays of `[x, y]` pairs. Segmentation results are objects
//! keyed by region name, in traversal order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::SegmentError;
use crate::geom::{Contour, Extremes, Point};
use crate::segment::{IndexTable, SegmentationResult};

/// Read a contour file.
pub fn load_contour(path: &Path) -> Result<Contour, SegmentError> {
    let text = fs::read_to_string(path).map_err(|e| SegmentError::io(path, e))?;
    parse_contour(&text)
}

/// Parse a contour from JSON text.
///
/// Every element must be a 2-element array of finite numbers; the first
/// element that is not fails the whole parse.
pub fn parse_contour(text: &str) -> Result<Contour, SegmentError> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| point_from_value(index, value))
        .collect()
}

fn point_from_value(index: usize, value: &Value) -> Result<Point, SegmentError> {
    let malformed = |reason: String| SegmentError::MalformedPoint { index, reason };

    let pair = value
        .as_array()
        .ok_or_else(|| malformed(format!("expected [x, y], found {}", value)))?;
    if pair.len() != 2 {
        return Err(malformed(format!("expected 2 coordinates, found {}", pair.len())));
    }
    let coord = |v: &Value| {
        v.as_f64()
            .filter(|c| c.is_finite())
            .ok_or_else(|| malformed(format!("coordinate {} is not a number", v)))
    };
    Ok(Point::new(coord(&pair[0])?, coord(&pair[1])?))
}

pub fn save_contour(path: &Path, contour: &Contour) -> Result<(), SegmentError> {
    write_json(path, contour, false)
}

pub fn load_segments(path: &Path) -> Result<SegmentationResult, SegmentError> {
    let text = fs::read_to_string(path).map_err(|e| SegmentError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Write all regions into one JSON object.
pub fn save_segments(path: &Path, result: &SegmentationResult) -> Result<(), SegmentError> {
    write_json(path, result, false)
}

/// Write one pretty-printed `<region>.json` per region into `dir`.
///
/// Returns the written paths in traversal order.
pub fn save_regions(dir: &Path, result: &SegmentationResult) -> Result<Vec<PathBuf>, SegmentError> {
    fs::create_dir_all(dir).map_err(|e| SegmentError::io(dir, e))?;
    result
        .regions()
        .iter()
        .map(|region| {
            let path = dir.join(format!("{}.json", region.part));
            write_json(&path, &region.points, true)?;
            Ok(path)
        })
        .collect()
}

pub fn save_extremes(path: &Path, extremes: &Extremes) -> Result<(), SegmentError> {
    write_json(path, extremes, true)
}

/// Read a custom index table (region name → list of `[start, end]` or index).
pub fn load_table(path: &Path) -> Result<IndexTable, SegmentError> {
    let text = fs::read_to_string(path).map_err(|e| SegmentError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), SegmentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SegmentError::io(parent, e))?;
    }
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, text).map_err(|e| SegmentError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{BodyPart, ProportionalSegmenter, Segmenter};

    fn sample_contour() -> Contour {
        (0..40)
            .map(|i| Point::new((i * 3) as f64, (100 - i) as f64))
            .collect()
    }

    #[test]
    fn parses_integer_and_float_pairs() {
        let contour = parse_contour("[[1, 2], [3.5, 4], [-1, 0]]").unwrap();
        assert_eq!(
            contour.points(),
            &[Point::new(1.0, 2.0), Point::new(3.5, 4.0), Point::new(-1.0, 0.0)]
        );
        assert!(parse_contour("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_points_report_their_index() {
        for (text, bad) in [
            ("[[1, 2], [3]]", 1),
            ("[[1, 2], [3, 4], [5, 6, 7]]", 2),
            ("[[1, \"x\"]]", 0),
            ("[[1, 2], 5]", 1),
            ("[[1, 2], [null, 2]]", 1),
        ] {
            match parse_contour(text) {
                Err(SegmentError::MalformedPoint { index, .. }) => {
                    assert_eq!(index, bad, "{}", text)
                }
                other => panic!("{}: expected MalformedPoint, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn non_array_input_is_a_json_error() {
        assert!(matches!(parse_contour("{\"a\": 1}"), Err(SegmentError::Json(_))));
        assert!(matches!(parse_contour("[[1, 2]"), Err(SegmentError::Json(_))));
    }

    #[test]
    fn contour_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body_contour.json");
        let contour = sample_contour();
        save_contour(&path, &contour).unwrap();
        assert_eq!(load_contour(&path).unwrap(), contour);
    }

    #[test]
    fn segments_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("body_parts.json");
        let result = ProportionalSegmenter::default().segment(&sample_contour()).unwrap();
        save_segments(&path, &result).unwrap();

        let back = load_segments(&path).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.parts().next(), Some(BodyPart::Head));
    }

    #[test]
    fn regions_are_written_one_file_each() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProportionalSegmenter::default().segment(&sample_contour()).unwrap();
        let paths = save_regions(dir.path(), &result).unwrap();
        assert_eq!(paths.len(), 11);
        assert!(paths[0].ends_with("head.json"));

        let neck = load_contour(&dir.path().join("neck.json")).unwrap();
        assert_eq!(neck.points(), result.get(BodyPart::Neck).unwrap());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_contour(Path::new("no/such/contour.json")).unwrap_err();
        assert!(matches!(err, SegmentError::Io { .. }));
    }

    #[test]
    fn custom_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, r#"{"head": [[0, 3], 7], "neck": [3, 4]}"#).unwrap();
        let table = load_table(&path).unwrap();
        assert_eq!(table.resolve(BodyPart::Head).unwrap(), vec![0, 1, 2, 7]);
        assert_eq!(table.required_len(), 8);
    }
}
