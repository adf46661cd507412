//! Geometry primitives: bounds, points, relationship paths.
//!
//! All coordinates are `f64` in diagram units. Element bounds are relative to
//! the owning container when the element has an owner, and absolute otherwise.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Clamp `value` into `[lower, upper]`.
///
/// Unlike [`f64::clamp`] this never panics: when `upper < lower` the result is
/// `lower`, which is what the layout engine wants for a child wider than the
/// space available to it.
#[must_use]
pub fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    value.min(upper).max(lower)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Bounds of the given size anchored at the origin.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { x: 0.0, y: 0.0, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the top-left corner sits at `(0, 0)`.
    #[must_use]
    pub fn at_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Smallest box enclosing every point. Empty input yields a zero box.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
    }
}

/// Sparse update for [`Bounds`]. Only present fields are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl BoundsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }

    /// Overlay the present fields onto `bounds`.
    pub fn apply_to(&self, bounds: &mut Bounds) {
        if let Some(x) = self.x {
            bounds.x = x;
        }
        if let Some(y) = self.y {
            bounds.y = y;
        }
        if let Some(w) = self.width {
            bounds.width = w;
        }
        if let Some(h) = self.height {
            bounds.height = h;
        }
    }
}

/// A point on a relationship path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered polyline with at least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Point>);

impl Path {
    /// Build a path, rejecting fewer than two points.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPath`] for paths shorter than two points.
    pub fn new(points: Vec<Point>) -> Result<Self, ModelError> {
        if points.len() < 2 {
            return Err(ModelError::InvalidPath(points.len()));
        }
        Ok(Self(points))
    }

    /// Straight two-point path.
    #[must_use]
    pub fn straight(from: Point, to: Point) -> Self {
        Self(vec![from, to])
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a path holds at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same points in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::enclosing(&self.0)
    }

    /// Anchor for the relationship label: the middle point of an odd-length
    /// path, or the midpoint of the two middle points of an even-length one.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        let mid = self.0.len() / 2;
        if self.0.len() % 2 == 0 {
            let (a, b) = (self.0[mid - 1], self.0[mid]);
            Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
        } else {
            self.0[mid]
        }
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<Point>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}
