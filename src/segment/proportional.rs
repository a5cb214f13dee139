//! Proportional segmentation: regions cut at fixed fractions of the
//! contour's point count.
//!
//! Region k spans `[end(k-1) - overlap, end(k))`, where
//! `end(k) = floor(n * percent(k) / 100)`. Adjacent regions therefore share
//! `overlap` points so that drawing them one after another leaves no gap.
//! The last region also takes the first `overlap` points of the contour,
//! closing the loop back to the head.

use crate::error::SegmentError;
use crate::geom::Contour;

use super::{BodyPart, Segmenter, SegmentationResult};

/// Below this point count the contour is returned whole.
pub const MIN_POINTS: usize = 12;

/// Points shared at each seam unless configured otherwise.
pub const DEFAULT_OVERLAP: usize = 2;

/// Upper bound of each region as a percentage of the point count,
/// in traversal order.
const CUTS: [(BodyPart, usize); 11] = [
    (BodyPart::Head, 10),
    (BodyPart::Neck, 15),
    (BodyPart::UpperBody, 35),
    (BodyPart::RightArm, 45),
    (BodyPart::RightHand, 50),
    (BodyPart::RightLeg, 60),
    (BodyPart::RightFoot, 65),
    (BodyPart::LeftFoot, 70),
    (BodyPart::LeftLeg, 80),
    (BodyPart::LeftHand, 85),
    (BodyPart::LeftArm, 100),
];

/// Half-open index range `[start, end)` of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub part: BodyPart,
    pub start: usize,
    pub end: usize,
}

impl Boundary {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProportionalSegmenter {
    overlap: usize,
}

impl Default for ProportionalSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAP)
    }
}

impl ProportionalSegmenter {
    pub fn new(overlap: usize) -> Self {
        Self { overlap }
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Region ranges for a contour of `n` points (`n >= MIN_POINTS`).
    ///
    /// A region whose start would fall before 0, or past its own end, is
    /// empty (`start == end`). The wrap-around points of the last region are
    /// not part of its range.
    pub fn boundaries(&self, n: usize) -> Vec<Boundary> {
        let mut prev_end: Option<usize> = None;
        CUTS.iter()
            .map(|&(part, percent)| {
                let end = n * percent / 100;
                let start = match prev_end {
                    None => 0,
                    Some(prev) => match prev.checked_sub(self.overlap) {
                        Some(start) => start.min(end),
                        None => end,
                    },
                };
                prev_end = Some(end);
                Boundary { part, start, end }
            })
            .collect()
    }
}

impl Segmenter for ProportionalSegmenter {
    fn segment(&self, contour: &Contour) -> Result<SegmentationResult, SegmentError> {
        let n = contour.len();
        let points = contour.points();
        let mut result = SegmentationResult::new();

        if n < MIN_POINTS {
            log::debug!("{} points is below {}, keeping the whole contour", n, MIN_POINTS);
            result.push(BodyPart::WholeBody, points.to_vec())?;
            return Ok(result);
        }

        let boundaries = self.boundaries(n);
        let last = boundaries.len() - 1;
        for (i, b) in boundaries.iter().enumerate() {
            let mut region = points[b.start..b.end].to_vec();
            if i == last && b.end == n {
                region.extend_from_slice(&points[..self.overlap.min(n)]);
            }
            result.push(b.part, region)?;
        }

        log::debug!(
            "proportional split of {} points into {} regions (overlap {})",
            n,
            result.len(),
            self.overlap
        );
        Ok(result)
    }
}
