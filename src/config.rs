/// Parameters for turning a silhouette image into a contour.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    // -- Bitmap stage --
    /// Threshold method for images without an alpha channel.
    pub threshold: ThresholdMethod,
    /// Images with an alpha channel use it as the mask: pixels with
    /// alpha above this value are foreground.
    pub alpha_threshold: u8,
    /// If true, swap foreground and background after thresholding.
    pub invert: bool,

    // -- Contour stage --
    /// Outer borders with a smaller absolute area (px²) are ignored.
    pub min_contour_area: f64,
    /// RDP tolerance as a fraction of the contour perimeter.
    /// 0 keeps every border pixel.
    pub epsilon_fraction: f64,
}

/// Threshold method for converting a grayscale image to binary.
///
/// Pixels brighter than the threshold are foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMethod {
    /// Fixed brightness threshold (0-255).
    Fixed(u8),
    /// Otsu's method (automatic).
    Otsu,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Fixed(127),
            alpha_threshold: 1,
            invert: false,
            min_contour_area: 0.0,
            epsilon_fraction: 0.0005,
        }
    }
}
