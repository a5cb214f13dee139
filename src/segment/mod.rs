//! Partitioning a silhouette contour into named anatomical regions.
//!
//! Two independent strategies share one contract (`Segmenter`):
//! - `ProportionalSegmenter`: region boundaries at fixed fractions of the
//!   point count, with a small overlap at every seam.
//! - `IndexTableSegmenter`: region membership from a static table of
//!   contour indices authored against one reference contour.
//!
//! The table strategy is not portable across contours with a different
//! point count or starting point; prefer the proportional strategy for
//! arbitrary inputs.

mod proportional;
mod table;

pub use proportional::{Boundary, ProportionalSegmenter, DEFAULT_OVERLAP, MIN_POINTS};
pub use table::{IndexSpec, IndexTable, IndexTableSegmenter, REFERENCE_POINT_COUNT};

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SegmentError;
use crate::geom::{Contour, Point};

/// Region identifiers. The string form is the region name used in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPart {
    WholeBody,
    Head,
    Neck,
    UpperBody,
    LeftShoulder,
    RightShoulder,
    LeftArm,
    RightArm,
    LeftHand,
    RightHand,
    LeftLeg,
    RightLeg,
    LeftFoot,
    RightFoot,
}

impl BodyPart {
    pub const ALL: [BodyPart; 14] = [
        BodyPart::WholeBody,
        BodyPart::Head,
        BodyPart::Neck,
        BodyPart::UpperBody,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftArm,
        BodyPart::RightArm,
        BodyPart::LeftHand,
        BodyPart::RightHand,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
        BodyPart::LeftFoot,
        BodyPart::RightFoot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::WholeBody => "wholeBody",
            BodyPart::Head => "head",
            BodyPart::Neck => "neck",
            BodyPart::UpperBody => "upperBody",
            BodyPart::LeftShoulder => "leftShoulder",
            BodyPart::RightShoulder => "rightShoulder",
            BodyPart::LeftArm => "leftArm",
            BodyPart::RightArm => "rightArm",
            BodyPart::LeftHand => "leftHand",
            BodyPart::RightHand => "rightHand",
            BodyPart::LeftLeg => "leftLeg",
            BodyPart::RightLeg => "rightLeg",
            BodyPart::LeftFoot => "leftFoot",
            BodyPart::RightFoot => "rightFoot",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPart {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| SegmentError::UnknownRegion(s.to_string()))
    }
}

impl Serialize for BodyPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BodyPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A named run of contour points. Points are copies, not views.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub part: BodyPart,
    pub points: Vec<Point>,
}

/// Regions in anatomical traversal order.
///
/// Serializes as a JSON object `{ name: [[x, y], ...] }` whose key order is
/// the traversal order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentationResult {
    regions: Vec<Region>,
}

impl SegmentationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a region. Fails if the part is already present.
    pub fn push(&mut self, part: BodyPart, points: Vec<Point>) -> Result<(), SegmentError> {
        if self.get(part).is_some() {
            return Err(SegmentError::DuplicateRegion(part));
        }
        self.regions.push(Region { part, points });
        Ok(())
    }

    pub fn get(&self, part: BodyPart) -> Option<&[Point]> {
        self.regions
            .iter()
            .find(|r| r.part == part)
            .map(|r| r.points.as_slice())
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn parts(&self) -> impl Iterator<Item = BodyPart> + '_ {
        self.regions.iter().map(|r| r.part)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of points across regions, seam duplicates included.
    pub fn point_count(&self) -> usize {
        self.regions.iter().map(|r| r.points.len()).sum()
    }
}

impl<'a> IntoIterator for &'a SegmentationResult {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl Serialize for SegmentationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.regions.len()))?;
        for region in &self.regions {
            map.serialize_entry(&region.part, &region.points)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SegmentationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultVisitor;

        impl<'de> Visitor<'de> for ResultVisitor {
            type Value = SegmentationResult;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping region names to point lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut result = SegmentationResult::new();
                while let Some((part, points)) = access.next_entry::<BodyPart, Vec<Point>>()? {
                    result
                        .push(part, points)
                        .map_err(serde::de::Error::custom)?;
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(ResultVisitor)
    }
}

/// A contour-to-regions partitioning strategy.
pub trait Segmenter {
    fn segment(&self, contour: &Contour) -> Result<SegmentationResult, SegmentError>;
}

/// Which segmentation strategy to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Proportional { overlap: usize },
    /// Table strategy; `None` uses the built-in reference table.
    IndexTable(Option<IndexTable>),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Proportional {
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl Strategy {
    /// Build the segmenter. Table validation happens here, once.
    pub fn build(&self) -> Result<Box<dyn Segmenter + Send + Sync>, SegmentError> {
        let segmenter: Box<dyn Segmenter + Send + Sync> = match self {
            Strategy::Proportional { overlap } => Box::new(ProportionalSegmenter::new(*overlap)),
            Strategy::IndexTable(None) => Box::new(IndexTableSegmenter::reference()),
            Strategy::IndexTable(Some(table)) => {
                Box::new(IndexTableSegmenter::new(table.clone(), table.required_len())?)
            }
        };
        Ok(segmenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_names_round_trip() {
        for part in BodyPart::ALL {
            assert_eq!(part.as_str().parse::<BodyPart>().unwrap(), part);
        }
        assert!(matches!(
            "tail".parse::<BodyPart>(),
            Err(SegmentError::UnknownRegion(_))
        ));
    }

    #[test]
    fn json_preserves_traversal_order() {
        let mut result = SegmentationResult::new();
        result.push(BodyPart::Neck, vec![Point::new(1.0, 2.0)]).unwrap();
        result.push(BodyPart::Head, vec![]).unwrap();
        result
            .push(BodyPart::LeftArm, vec![Point::new(0.0, 0.0), Point::new(0.5, 1.0)])
            .unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"neck":[[1,2]],"head":[],"leftArm":[[0,0],[0.5,1]]}"#);

        let back: SegmentationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(
            back.parts().collect::<Vec<_>>(),
            vec![BodyPart::Neck, BodyPart::Head, BodyPart::LeftArm]
        );
    }

    #[test]
    fn duplicate_and_unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<SegmentationResult>(r#"{"head":[],"head":[]}"#).is_err());
        assert!(serde_json::from_str::<SegmentationResult>(r#"{"tail":[]}"#).is_err());
    }

    #[test]
    fn strategy_builds_both_segmenters() {
        let contour: Contour = (0..120).map(|i| Point::new(i as f64, 0.0)).collect();
        let proportional = Strategy::default().build().unwrap().segment(&contour).unwrap();
        assert_eq!(proportional.len(), 11);
        let table = Strategy::IndexTable(None).build().unwrap().segment(&contour).unwrap();
        assert_eq!(table.len(), 13);
    }
}
