//! Points, contours and simple contour measurements.

use kurbo::{BezPath, Shape};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 2D point in source-image pixel coordinates (y=0 is top of image).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

/// A JSON number that keeps whole pixel coordinates as integers.
#[derive(Serialize)]
#[serde(untagged)]
enum Coord {
    Int(i64),
    Float(f64),
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < (1u64 << 53) as f64 {
            Coord::Int(v as i64)
        } else {
            Coord::Float(v)
        }
    }
}

pub(crate) fn serialize_coord<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Coord::from(*v).serialize(serializer)
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (Coord::from(self.x), Coord::from(self.y)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(f64, f64)>::deserialize(deserializer)?;
        Ok(Point { x, y })
    }
}

/// An ordered closed polygon: the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour(Vec<Point>);

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.0.get(index).copied()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// The contour as a closed line-segment `BezPath`.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some(&first) = self.0.first() {
            path.move_to(first);
            for &p in &self.0[1..] {
                path.line_to(p);
            }
            path.close_path();
        }
        path
    }

    /// Signed area via the shoelace formula.
    ///
    /// Positive = counter-clockwise in a y-up frame (clockwise on screen).
    pub fn signed_area(&self) -> f64 {
        if self.0.len() < 3 {
            return 0.0;
        }
        self.to_bezpath().area()
    }

    /// Closed arc length, including the edge from the last point to the first.
    pub fn perimeter(&self) -> f64 {
        if self.0.len() < 2 {
            return 0.0;
        }
        self.to_bezpath().perimeter(1e-6)
    }

    /// Per-axis extremes of the contour, `None` when empty.
    ///
    /// Ties keep the first point in traversal order.
    pub fn extremes(&self) -> Option<Extremes> {
        let first = *self.0.first()?;
        let mut x_min = first;
        let mut x_max = first;
        let mut y_min = first;
        let mut y_max = first;
        for &p in &self.0[1..] {
            if p.x < x_min.x {
                x_min = p;
            }
            if p.x > x_max.x {
                x_max = p;
            }
            if p.y < y_min.y {
                y_min = p;
            }
            if p.y > y_max.y {
                y_max = p;
            }
        }
        Some(Extremes {
            x_min: Extreme::new(x_min.x, x_min),
            x_max: Extreme::new(x_max.x, x_max),
            y_min: Extreme::new(y_min.y, y_min),
            y_max: Extreme::new(y_max.y, y_max),
            x_span: x_max.x - x_min.x,
            y_span: y_max.y - y_min.y,
        })
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One axis extreme and the point that attains it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    #[serde(serialize_with = "serialize_coord")]
    pub value: f64,
    pub coordinate: Point,
}

impl Extreme {
    fn new(value: f64, coordinate: Point) -> Self {
        Self { value, coordinate }
    }
}

/// Bounding extremes of a contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub x_min: Extreme,
    pub x_max: Extreme,
    pub y_min: Extreme,
    pub y_max: Extreme,
    #[serde(serialize_with = "serialize_coord")]
    pub x_span: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y_span: f64,
}
