//! Page-space geometry.
//!
//! All coordinates are in points with the origin at the top-left corner of
//! the page's MediaBox and y growing downward.

use serde::{Deserialize, Serialize};

/// A point on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle `(x0, y0, x1, y1)` with `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a rectangle, normalizing the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of all rectangles, or `None` for an empty iterator.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(u) => Some(u.union(b)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalizes_corners() {
        let b = BBox::new(200.0, 70.0, 50.0, 50.0);
        assert_eq!(b, BBox::new(50.0, 50.0, 200.0, 70.0));
        assert_eq!(b.top_left(), Point::new(50.0, 50.0));
        assert_eq!(b.width(), 150.0);
        assert_eq!(b.height(), 20.0);
    }

    #[test]
    fn test_union_all() {
        let boxes = [BBox::new(0.0, 0.0, 10.0, 10.0), BBox::new(5.0, -5.0, 20.0, 8.0)];
        assert_eq!(
            BBox::union_all(&boxes),
            Some(BBox::new(0.0, -5.0, 20.0, 10.0))
        );
        assert_eq!(BBox::union_all(&[]), None);
    }
}
