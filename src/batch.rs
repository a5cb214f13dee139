//! Segmenting many contours at once.
//!
//! Each contour is an independent unit of work, so files are processed in
//! parallel with rayon. A failing file is recorded and never stops the rest.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::SegmentError;
use crate::geom::Contour;
use crate::io::{load_contour, save_segments};
use crate::segment::{SegmentationResult, Segmenter};

/// Result of segmenting one contour file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<SegmentationResult, SegmentError>,
}

/// Per-file outcomes in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &SegmentationResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o.path.as_path(), r)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &SegmentError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.path.as_path(), e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Load and segment each contour file.
pub fn segment_files<S>(paths: &[PathBuf], segmenter: &S) -> BatchReport
where
    S: Segmenter + Sync + ?Sized,
{
    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .map(|path| {
            let result = load_contour(path).and_then(|contour| segmenter.segment(&contour));
            if let Err(e) = &result {
                log::warn!("{}: {}", path.display(), e);
            }
            FileOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();

    let report = BatchReport { outcomes };
    log::info!(
        "segmented {} contour files, {} failed",
        report.outcomes.len(),
        report.failure_count()
    );
    report
}

/// Write `<stem>_body_parts.json` into `dir` for every successful file.
///
/// A failed write is logged and returned; the remaining files are still
/// written.
pub fn save_results(report: &BatchReport, dir: &Path) -> Vec<(PathBuf, SegmentError)> {
    let mut failures = Vec::new();
    for (path, segments) in report.succeeded() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "contour".to_string());
        let target = dir.join(format!("{}_body_parts.json", stem));
        if let Err(e) = save_segments(&target, segments) {
            log::warn!("{}: {}", target.display(), e);
            failures.push((target, e));
        }
    }
    failures
}

/// Segment in-memory contours; results are in input order.
pub fn segment_contours<S>(
    contours: &[Contour],
    segmenter: &S,
) -> Vec<Result<SegmentationResult, SegmentError>>
where
    S: Segmenter + Sync + ?Sized,
{
    contours.par_iter().map(|c| segmenter.segment(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::io::save_contour;
    use crate::segment::{BodyPart, IndexTableSegmenter, ProportionalSegmenter};

    fn line(n: usize) -> Contour {
        (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let short = dir.path().join("short.json");
        let broken = dir.path().join("broken.json");
        save_contour(&good, &line(120)).unwrap();
        save_contour(&short, &line(60)).unwrap();
        std::fs::write(&broken, "[[1, 2], [3]]").unwrap();
        let missing = dir.path().join("missing.json");

        let paths = vec![good.clone(), short.clone(), broken.clone(), missing.clone()];
        let report = segment_files(&paths, &IndexTableSegmenter::reference());

        let ok: Vec<&Path> = report.succeeded().map(|(p, _)| p).collect();
        assert_eq!(ok, vec![good.as_path()]);
        assert_eq!(report.failure_count(), 3);

        let failed: Vec<(&Path, &SegmentError)> = report.failed().collect();
        assert_eq!(failed[0].0, short.as_path());
        assert!(matches!(
            failed[0].1,
            SegmentError::IndexOutOfRange {
                region: BodyPart::Head,
                ..
            }
        ));
        assert!(matches!(failed[1].1, SegmentError::MalformedPoint { index: 1, .. }));
        assert!(matches!(failed[2].1, SegmentError::Io { .. }));
    }

    #[test]
    fn write_failures_do_not_stop_other_writes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        save_contour(&first, &line(30)).unwrap();
        save_contour(&second, &line(40)).unwrap();
        let report = segment_files(&[first, second], &ProportionalSegmenter::default());

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        // A directory where the first result file should go makes that write fail.
        let blocked = out.join("first_body_parts.json");
        std::fs::create_dir(&blocked).unwrap();

        let failures = save_results(&report, &out);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, blocked);
        assert!(matches!(failures[0].1, SegmentError::Io { .. }));

        let written = crate::io::load_segments(&out.join("second_body_parts.json")).unwrap();
        assert_eq!(written.len(), 11);
    }

    #[test]
    fn contours_keep_input_order() {
        let contours: Vec<Contour> = (5..60).map(line).collect();
        let results = segment_contours(&contours, &ProportionalSegmenter::default());
        for (contour, result) in contours.iter().zip(&results) {
            let result = result.as_ref().unwrap();
            let expected = if contour.len() < 12 { 1 } else { 11 };
            assert_eq!(result.len(), expected);
        }
    }

    #[test]
    fn works_through_a_boxed_strategy() {
        let segmenter = crate::segment::Strategy::default().build().unwrap();
        let results = segment_contours(&[line(30)], segmenter.as_ref());
        assert!(results[0].is_ok());
    }
}
