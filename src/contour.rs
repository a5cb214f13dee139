use geo::{LineString, Simplify};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::config::ExtractionConfig;
use crate::error::SegmentError;
use crate::geom::{Contour, Point};

/// Extract the silhouette outline from a binary mask.
///
/// Traces all borders, keeps outer borders only, picks the one enclosing
/// the largest area and simplifies it. Points are in pixel coordinates.
pub fn extract(mask: &GrayImage, config: &ExtractionConfig) -> Result<Contour, SegmentError> {
    let borders = find_contours::<i32>(mask);
    log::debug!("{} borders traced", borders.len());

    let largest = borders
        .iter()
        .filter(|border| border.border_type == BorderType::Outer && border.points.len() >= 3)
        .map(|border| {
            border
                .points
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect::<Contour>()
        })
        .map(|contour| (contour.signed_area().abs(), contour))
        .filter(|(area, _)| *area > config.min_contour_area)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, contour)| contour)
        .ok_or(SegmentError::NoContours)?;

    let epsilon = config.epsilon_fraction * largest.perimeter();
    let simplified = simplify_closed(&largest, epsilon);
    log::debug!(
        "largest outline {} points -> {} after simplification (epsilon {:.3})",
        largest.len(),
        simplified.len(),
        epsilon
    );
    Ok(simplified)
}

/// RDP simplification of a closed polygon.
///
/// The ring is closed before simplifying so the seam at the first point is
/// treated like any other vertex, then reopened.
fn simplify_closed(contour: &Contour, epsilon: f64) -> Contour {
    if contour.len() <= 3 || epsilon <= 0.0 {
        return contour.clone();
    }
    let mut ring: Vec<(f64, f64)> = contour.points().iter().map(|p| (p.x, p.y)).collect();
    ring.push(ring[0]);

    let mut points: Vec<Point> = LineString::from(ring)
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|c| Point::new(c.x, c.y))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Contour::new(points)
}
