//! bodyseg: silhouette image → named anatomical contour regions.
//!
//! Extracts the outer outline of a human figure from a raster image and
//! partitions it into head, neck, torso, arms, hands, legs and feet.
//!
//! # Example
//!
//! ```no_run
//! use bodyseg::{segment_image, ExtractionConfig, Strategy};
//! use std::path::Path;
//!
//! let silhouette = segment_image(
//!     Path::new("figure.png"),
//!     &ExtractionConfig::default(),
//!     &Strategy::default(),
//! )?;
//! for region in &silhouette.segments {
//!     println!("{}: {} points", region.part, region.points.len());
//! }
//! # Ok::<(), bodyseg::SegmentError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod config;
mod contour;
mod geom;

pub mod batch;
pub mod error;
pub mod io;
pub mod segment;

pub use config::{ExtractionConfig, ThresholdMethod};
pub use error::SegmentError;
pub use geom::{Contour, Extreme, Extremes, Point};
pub use segment::{
    BodyPart, IndexSpec, IndexTable, IndexTableSegmenter, ProportionalSegmenter, Region,
    SegmentationResult, Segmenter, Strategy,
};

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;

/// A traced outline and its regions.
#[derive(Debug, Clone)]
pub struct Silhouette {
    pub contour: Contour,
    pub segments: SegmentationResult,
}

/// Load an image and extract the outline of the largest figure.
pub fn extract_contour(
    image_path: &Path,
    config: &ExtractionConfig,
) -> Result<Contour, SegmentError> {
    let mask = bitmap::load_mask(image_path, config)?;
    let (w, h) = mask.dimensions();
    let contour = contour::extract(&mask, config)?;
    log::info!("{}x{} px -> {} contour points", w, h, contour.len());
    Ok(contour)
}

/// Extract the outline of an already decoded image.
pub fn contour_from_image(
    img: &DynamicImage,
    config: &ExtractionConfig,
) -> Result<Contour, SegmentError> {
    let mask = bitmap::to_mask(img, config);
    contour::extract(&mask, config)
}

/// Full pipeline: image path → outline → regions.
pub fn segment_image(
    image_path: &Path,
    config: &ExtractionConfig,
    strategy: &Strategy,
) -> Result<Silhouette, SegmentError> {
    let t_start = Instant::now();
    let segmenter = strategy.build()?;
    let contour = extract_contour(image_path, config)?;
    let segments = segmenter.segment(&contour)?;
    log::info!(
        "{} regions, {} points incl. seams ({}ms)",
        segments.len(),
        segments.point_count(),
        t_start.elapsed().as_millis()
    );
    Ok(Silhouette { contour, segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// A crude standing figure: head, torso, two arms and two legs.
    fn figure() -> DynamicImage {
        let parts = [
            (45, 5, 55, 15),   // head
            (48, 15, 52, 20),  // neck
            (40, 20, 60, 50),  // torso
            (25, 22, 40, 27),  // left arm
            (60, 22, 75, 27),  // right arm
            (41, 50, 48, 90),  // left leg
            (52, 50, 59, 90),  // right leg
        ];
        let img = GrayImage::from_fn(100, 100, |x, y| {
            let inside = parts
                .iter()
                .any(|&(x0, y0, x1, y1)| x >= x0 && x < x1 && y >= y0 && y < y1);
            Luma([if inside { 255 } else { 0 }])
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn figure_outline_segments_into_eleven_regions() {
        let contour = contour_from_image(&figure(), &ExtractionConfig::default()).unwrap();
        assert!(contour.len() >= 12, "got {} points", contour.len());

        let e = contour.extremes().unwrap();
        assert_eq!((e.x_min.value, e.x_max.value), (25.0, 74.0));
        assert_eq!((e.y_min.value, e.y_max.value), (5.0, 89.0));

        let segments = ProportionalSegmenter::default().segment(&contour).unwrap();
        assert_eq!(segments.len(), 11);
    }

    #[test]
    fn pipeline_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        figure().save(&path).unwrap();

        let silhouette =
            segment_image(&path, &ExtractionConfig::default(), &Strategy::default()).unwrap();
        assert_eq!(silhouette.segments.len(), 11);
        assert_eq!(
            silhouette.segments.get(BodyPart::Head).unwrap()[0],
            silhouette.contour.points()[0]
        );
    }
}
