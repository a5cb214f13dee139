use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::config::{ExtractionConfig, ThresholdMethod};
use crate::error::SegmentError;

/// Load an image and convert it to a binary silhouette mask.
///
/// Foreground (figure) pixels are 255, background pixels are 0.
pub fn load_mask(path: &Path, config: &ExtractionConfig) -> Result<GrayImage, SegmentError> {
    let img = ImageReader::open(path)
        .map_err(|e| SegmentError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| SegmentError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(to_mask(&img, config))
}

/// Binarize a decoded image.
///
/// Transparent images are masked by their alpha channel; opaque images by
/// brightness.
pub fn to_mask(img: &DynamicImage, config: &ExtractionConfig) -> GrayImage {
    let mut mask = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let cutoff = config.alpha_threshold;
        log::debug!("masking by alpha > {}", cutoff);
        GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            if rgba.get_pixel(x, y).0[3] > cutoff {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    } else {
        let gray = img.to_luma8();
        let level = match config.threshold {
            ThresholdMethod::Fixed(t) => t,
            ThresholdMethod::Otsu => {
                let t = otsu_level(&gray);
                log::debug!("Otsu threshold = {}", t);
                t
            }
        };
        threshold(&gray, level, ThresholdType::Binary)
    };

    if config.invert {
        for pixel in mask.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
    }

    mask
}
