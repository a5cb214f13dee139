//! Index-table segmentation: region membership read from a hand-authored
//! table of contour indices.
//!
//! The built-in table was authored against one 120-point reference contour.
//! It is not rescaled to the input: a contour with a different point count
//! or starting point yields anatomically meaningless regions, or fails with
//! `IndexOutOfRange` when it is too short.

use std::fmt;
use std::ops::RangeInclusive;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SegmentError;
use crate::geom::Contour;

use super::{BodyPart, Segmenter, SegmentationResult};

/// Point count of the contour the reference table was authored against.
pub const REFERENCE_POINT_COUNT: usize = 120;

/// One piece of a region's index list.
///
/// In JSON a range is `[start, end]` (end exclusive) and a single index is a
/// bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexSpec {
    Index(usize),
    Range(usize, usize),
}

impl IndexSpec {
    /// Indices in ascending order. Empty for `start >= end`.
    pub fn indices(&self) -> RangeInclusive<usize> {
        match *self {
            IndexSpec::Index(i) => i..=i,
            IndexSpec::Range(start, end) if start < end => start..=end - 1,
            IndexSpec::Range(..) => 1..=0,
        }
    }

    fn max_index(&self) -> Option<usize> {
        match *self {
            IndexSpec::Index(i) => Some(i),
            IndexSpec::Range(start, end) if start < end => Some(end - 1),
            IndexSpec::Range(..) => None,
        }
    }

    /// First index that does not fit a contour of `len` points.
    fn first_out_of_range(&self, len: usize) -> Option<usize> {
        match *self {
            IndexSpec::Index(i) if i >= len => Some(i),
            IndexSpec::Range(start, end) if start < end && end > len => {
                Some(start.max(len))
            }
            _ => None,
        }
    }
}

/// Ordered mapping from region to its index specs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexTable {
    regions: Vec<(BodyPart, Vec<IndexSpec>)>,
}

impl IndexTable {
    pub fn new(regions: Vec<(BodyPart, Vec<IndexSpec>)>) -> Self {
        Self { regions }
    }

    /// The 13-region table for the 120-point reference contour.
    pub fn reference() -> Self {
        use BodyPart::*;
        use IndexSpec::{Index as I, Range as R};

        Self::new(vec![
            (Head, vec![R(0, 9), R(111, 120)]),
            (Neck, vec![R(8, 11), R(109, 112)]),
            (LeftShoulder, vec![R(11, 17), I(38)]),
            (LeftArm, vec![R(16, 21), R(33, 39)]),
            (LeftHand, vec![R(20, 34)]),
            (
                UpperBody,
                vec![
                    I(10),
                    I(11),
                    R(38, 45),
                    I(61),
                    I(62),
                    I(63),
                    R(79, 84),
                    I(108),
                    I(109),
                ],
            ),
            (LeftLeg, vec![R(44, 50), R(54, 62)]),
            (LeftFoot, vec![R(49, 55)]),
            (RightLeg, vec![R(63, 71), R(74, 80)]),
            (RightFoot, vec![R(70, 75)]),
            (RightShoulder, vec![R(103, 109), I(83)]),
            (RightArm, vec![R(83, 89), R(99, 104)]),
            (RightHand, vec![R(88, 100)]),
        ])
    }

    pub fn regions(&self) -> &[(BodyPart, Vec<IndexSpec>)] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Smallest contour length for which every index resolves.
    pub fn required_len(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|(_, specs)| specs.iter().filter_map(IndexSpec::max_index))
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Resolve a region's specs to concrete indices, in declaration order.
    /// Duplicates are kept.
    pub fn resolve(&self, part: BodyPart) -> Option<Vec<usize>> {
        self.regions
            .iter()
            .find(|(p, _)| *p == part)
            .map(|(_, specs)| resolve_specs(specs))
    }

    /// Check the table against the point count it was authored for.
    pub fn validate(&self, expected_len: usize) -> Result<(), SegmentError> {
        for (i, (part, specs)) in self.regions.iter().enumerate() {
            if self.regions[..i].iter().any(|(p, _)| p == part) {
                return Err(SegmentError::DuplicateRegion(*part));
            }
            for spec in specs {
                if let IndexSpec::Range(start, end) = *spec {
                    if start > end {
                        return Err(SegmentError::InvalidTable(format!(
                            "region '{}' has reversed range [{}, {})",
                            part, start, end
                        )));
                    }
                }
                if let Some(index) = spec.first_out_of_range(expected_len) {
                    return Err(SegmentError::InvalidTable(format!(
                        "region '{}' references index {} beyond the {}-point contour",
                        part, index, expected_len
                    )));
                }
            }
        }
        Ok(())
    }
}

fn resolve_specs(specs: &[IndexSpec]) -> Vec<usize> {
    specs.iter().flat_map(IndexSpec::indices).collect()
}

impl Serialize for IndexTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.regions.len()))?;
        for (part, specs) in &self.regions {
            map.serialize_entry(part, specs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IndexTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = IndexTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping region names to index specs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut regions = Vec::new();
                while let Some(entry) = access.next_entry::<BodyPart, Vec<IndexSpec>>()? {
                    regions.push(entry);
                }
                Ok(IndexTable { regions })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexTableSegmenter {
    table: IndexTable,
    expected_len: usize,
}

impl IndexTableSegmenter {
    /// Validate `table` once against `expected_len`.
    pub fn new(table: IndexTable, expected_len: usize) -> Result<Self, SegmentError> {
        table.validate(expected_len)?;
        Ok(Self {
            table,
            expected_len,
        })
    }

    /// Segmenter over the built-in reference table.
    pub fn reference() -> Self {
        Self {
            table: IndexTable::reference(),
            expected_len: REFERENCE_POINT_COUNT,
        }
    }

    pub fn table(&self) -> &IndexTable {
        &self.table
    }

    pub fn expected_len(&self) -> usize {
        self.expected_len
    }
}

impl Segmenter for IndexTableSegmenter {
    fn segment(&self, contour: &Contour) -> Result<SegmentationResult, SegmentError> {
        let len = contour.len();
        if len != self.expected_len {
            log::warn!(
                "contour has {} points but the index table was authored for {}",
                len,
                self.expected_len
            );
        }

        let mut result = SegmentationResult::new();
        let points = contour.points();
        for (part, specs) in &self.table.regions {
            if let Some(index) = specs.iter().find_map(|spec| spec.first_out_of_range(len)) {
                return Err(SegmentError::IndexOutOfRange {
                    region: *part,
                    index,
                    len,
                });
            }
            let region = specs
                .iter()
                .flat_map(IndexSpec::indices)
                .map(|index| points[index])
                .collect();
            result.push(*part, region)?;
        }

        log::debug!("index-table split of {} points into {} regions", len, result.len());
        Ok(result)
    }
}
