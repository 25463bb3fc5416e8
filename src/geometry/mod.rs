//! Geometric primitives for spatial block matching.
//!
//! Rectangles are stored in page space as corner coordinates with the
//! invariant `x0 <= x1` and `y0 <= y1`; constructors normalize flipped
//! corners so the invariant holds for every value that can be built.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge x-coordinate
    pub x0: f32,
    /// Top edge y-coordinate
    pub y0: f32,
    /// Right edge x-coordinate (>= `x0`)
    pub x1: f32,
    /// Bottom edge y-coordinate (>= `y0`)
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two corner points, normalizing order so that
    /// `x0 <= x1` and `y0 <= y1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use textlift::geometry::Rect;
    ///
    /// let r = Rect::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(r.width(), 100.0);
    /// assert_eq!(r.height(), 50.0);
    ///
    /// // Flipped corners are normalized
    /// let flipped = Rect::new(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(flipped, r);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Check if this rectangle overlaps another with positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// Compute the intersection of this rectangle with another.
    ///
    /// Returns `None` when the rectangles do not overlap with positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    /// Compute the smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Intersection-over-union overlap ratio in [0, 1].
    ///
    /// Returns 0.0 for disjoint rectangles and for degenerate input
    /// (zero combined area), so callers can threshold without NaN checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use textlift::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(0.0, 5.0, 10.0, 15.0);
    /// assert_eq!(a.iou(&b), 0.5 / 1.5);
    ///
    /// let c = Rect::new(100.0, 100.0, 110.0, 110.0);
    /// assert_eq!(a.iou(&c), 0.0);
    /// ```
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = match self.intersection(other) {
            Some(r) => r.area(),
            None => return 0.0,
        };
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(110.0, 70.0, 10.0, 20.0);
        assert_eq!(r.x0, 10.0);
        assert_eq!(r.y0, 20.0);
        assert_eq!(r.x1, 110.0);
        assert_eq!(r.y1, 70.0);
        assert!(r.x0 <= r.x1 && r.y0 <= r.y1);
    }

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
        assert_eq!(r.area(), 5000.0);
        assert_eq!(r.center(), (60.0, 45.0));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 150.0, 150.0);
        let c = Rect::new(200.0, 200.0, 300.0, 300.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        // Touching edges do not count as overlap
        let d = Rect::new(100.0, 0.0, 200.0, 100.0);
        assert!(!a.intersects(&d));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 150.0, 150.0);
        let inter = a.intersection(&b).unwrap();
        assert_eq!(inter, Rect::new(50.0, 50.0, 100.0, 100.0));

        let c = Rect::new(200.0, 200.0, 300.0, 300.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(25.0, 25.0, 75.0, 75.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_iou_identical() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // 10x5 boxes, 4 units of vertical overlap
        let geo = Rect::new(0.0, 0.0, 10.0, 5.0);
        let txt = Rect::new(0.0, 0.0, 10.0, 4.0);
        let iou = geo.iou(&txt);
        // inter = 40, union = 50 + 40 - 40 = 50
        assert!((iou - 0.8).abs() < 1e-6);
        assert!(iou > 0.3);
    }

    #[test]
    fn test_iou_degenerate_is_zero() {
        let line = Rect::new(0.0, 0.0, 10.0, 0.0);
        assert_eq!(line.iou(&line), 0.0);
    }
}
