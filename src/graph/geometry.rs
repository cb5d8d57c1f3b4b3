//! Edge clipping between rectangular node boxes.
//!
//! An edge is drawn along the line joining two box centers, trimmed so it
//! starts and ends on the box outlines instead of running underneath them.
//! The exit face is found by probing the ray at the box's half-diagonal and
//! classifying the probe with a Cohen–Sutherland style outcode. Only exits
//! through a single face are resolved; corner exits report an error and the
//! caller draws a zero-length segment instead.

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Half-planes of a box that a point lies strictly outside of.
    ///
    /// A zero-width box sets both `LEFT` and `RIGHT` for every point, a
    /// zero-height box both `TOP` and `BOTTOM`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outcode: u8 {
        const LEFT = 1;
        const TOP = 2;
        const RIGHT = 4;
        const BOTTOM = 8;
    }
}

/// A point in layout units. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box described by its center and size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    /// Create a box from its center.
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Create a box from its top-left corner, as stored on nodes.
    pub fn from_top_left(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x + width / 2.0, y + height / 2.0), width, height)
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    /// Distance from the center to any corner.
    pub fn half_diagonal(&self) -> f64 {
        0.5 * self.width.hypot(self.height)
    }

    /// Classify a point against this box.
    pub fn outcode(&self, point: Point) -> Outcode {
        let mut code = Outcode::empty();

        if self.width <= 0.0 {
            code |= Outcode::LEFT | Outcode::RIGHT;
        } else if point.x < self.left() {
            code |= Outcode::LEFT;
        } else if point.x > self.right() {
            code |= Outcode::RIGHT;
        }

        if self.height <= 0.0 {
            code |= Outcode::TOP | Outcode::BOTTOM;
        } else if point.y < self.top() {
            code |= Outcode::TOP;
        } else if point.y > self.bottom() {
            code |= Outcode::BOTTOM;
        }

        code
    }

    /// Point where a ray leaving the center in direction `(cos, sin)`
    /// crosses the outline.
    fn exit_point(&self, cos: f64, sin: f64) -> Result<Point, ClipError> {
        let reach = self.half_diagonal();
        let probe = Point::new(self.center.x + reach * cos, self.center.y + reach * sin);
        let code = self.outcode(probe);
        let c = self.center;

        // The face bit guarantees the matching direction component is non-zero.
        if code == Outcode::TOP || code == Outcode::BOTTOM {
            let y = if code == Outcode::TOP {
                self.top()
            } else {
                self.bottom()
            };
            Ok(Point::new(c.x + (y - c.y) * cos / sin, y))
        } else if code == Outcode::LEFT || code == Outcode::RIGHT {
            let x = if code == Outcode::LEFT {
                self.left()
            } else {
                self.right()
            };
            Ok(Point::new(x, c.y + (x - c.x) * sin / cos))
        } else {
            Err(ClipError::Unresolved { outcode: code })
        }
    }
}

/// A straight line segment `(x1, y1) - (x2, y2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
        }
    }

    /// A zero-length segment, drawn when clipping fails.
    pub fn degenerate_at(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() == 0.0
    }
}

/// Clipping could not find a single exit face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("edge exits through a corner or degenerate box (outcode {outcode:?})")]
    Unresolved { outcode: Outcode },
}

/// Computes the part of the center-to-center line lying outside both boxes.
///
/// The first endpoint lies on `from`'s outline, the second on `to`'s.
pub fn clip_segment(from: &NodeBox, to: &NodeBox) -> Result<Segment, ClipError> {
    let theta = (to.center.y - from.center.y).atan2(to.center.x - from.center.x);
    let (sin, cos) = theta.sin_cos();

    let start = from.exit_point(cos, sin)?;
    let end = to.exit_point(-cos, -sin)?;
    Ok(Segment::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_outcode_inside_is_empty() {
        let b = NodeBox::new(Point::new(0.0, 0.0), 100.0, 60.0);
        assert_eq!(b.outcode(Point::new(10.0, 10.0)), Outcode::empty());
        assert_eq!(b.outcode(Point::new(50.0, 30.0)), Outcode::empty());
    }

    #[test]
    fn test_outcode_faces() {
        let b = NodeBox::new(Point::new(0.0, 0.0), 100.0, 60.0);
        assert_eq!(b.outcode(Point::new(-60.0, 0.0)), Outcode::LEFT);
        assert_eq!(b.outcode(Point::new(60.0, 0.0)), Outcode::RIGHT);
        assert_eq!(b.outcode(Point::new(0.0, -40.0)), Outcode::TOP);
        assert_eq!(b.outcode(Point::new(0.0, 40.0)), Outcode::BOTTOM);
        assert_eq!(
            b.outcode(Point::new(60.0, 40.0)),
            Outcode::RIGHT | Outcode::BOTTOM
        );
    }

    #[test]
    fn test_outcode_degenerate_width() {
        let b = NodeBox::new(Point::new(0.0, 0.0), 0.0, 60.0);
        assert_eq!(
            b.outcode(Point::new(0.0, 0.0)),
            Outcode::LEFT | Outcode::RIGHT
        );
    }

    #[test]
    fn test_horizontal_neighbours_clip_to_facing_sides() {
        let a = NodeBox::new(Point::new(0.0, 0.0), 100.0, 60.0);
        let b = NodeBox::new(Point::new(300.0, 0.0), 100.0, 60.0);

        let seg = clip_segment(&a, &b).unwrap();
        assert!((seg.x1 - a.right()).abs() < EPS);
        assert!((seg.x2 - b.left()).abs() < EPS);
        assert!(seg.y1.abs() < EPS);
        assert!(seg.y2.abs() < EPS);
    }

    #[test]
    fn test_vertical_neighbours_clip_to_top_and_bottom() {
        let a = NodeBox::new(Point::new(0.0, 0.0), 100.0, 60.0);
        let b = NodeBox::new(Point::new(0.0, 200.0), 100.0, 60.0);

        let seg = clip_segment(&a, &b).unwrap();
        assert!(seg.x1.abs() < EPS);
        assert!((seg.y1 - a.bottom()).abs() < EPS);
        assert!(seg.x2.abs() < EPS);
        assert!((seg.y2 - b.top()).abs() < EPS);
    }

    #[test]
    fn test_sloped_line_hits_side_face() {
        let a = NodeBox::new(Point::new(0.0, 0.0), 100.0, 60.0);
        let b = NodeBox::new(Point::new(400.0, 100.0), 100.0, 60.0);

        let seg = clip_segment(&a, &b).unwrap();
        // slope 0.25, right face at x = 50
        assert!((seg.x1 - 50.0).abs() < EPS);
        assert!((seg.y1 - 12.5).abs() < EPS);
        assert!((seg.x2 - 350.0).abs() < EPS);
        assert!((seg.y2 - 87.5).abs() < EPS);
    }

    #[test]
    fn test_zero_width_box_reports_failure() {
        let a = NodeBox::new(Point::new(0.0, 0.0), 0.0, 60.0);
        let b = NodeBox::new(Point::new(300.0, 0.0), 100.0, 60.0);

        let err = clip_segment(&a, &b).unwrap_err();
        let ClipError::Unresolved { outcode } = err;
        assert!(outcode.contains(Outcode::LEFT | Outcode::RIGHT));
    }

    #[test]
    fn test_exact_diagonal_is_unresolved() {
        let a = NodeBox::new(Point::new(0.0, 0.0), 100.0, 100.0);
        let b = NodeBox::new(Point::new(300.0, 300.0), 100.0, 100.0);
        assert!(clip_segment(&a, &b).is_err());
    }

    #[test]
    fn test_from_top_left() {
        let b = NodeBox::from_top_left(10.0, 20.0, 100.0, 60.0);
        assert_eq!(b.center, Point::new(60.0, 50.0));
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.bottom(), 80.0);
    }

    #[test]
    fn test_degenerate_segment() {
        let seg = Segment::degenerate_at(Point::new(3.0, 4.0));
        assert!(seg.is_degenerate());
        assert_eq!(seg.start(), seg.end());
    }

    fn on_outline(b: &NodeBox, p: Point) -> bool {
        let tol = 1e-6;
        let on_vertical = ((p.x - b.left()).abs() < tol || (p.x - b.right()).abs() < tol)
            && p.y >= b.top() - tol
            && p.y <= b.bottom() + tol;
        let on_horizontal = ((p.y - b.top()).abs() < tol || (p.y - b.bottom()).abs() < tol)
            && p.x >= b.left() - tol
            && p.x <= b.right() + tol;
        on_vertical || on_horizontal
    }

    proptest! {
        #[test]
        fn resolved_endpoints_lie_on_outlines(
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
            w in 10.0f64..300.0,
            h in 10.0f64..300.0,
        ) {
            prop_assume!(dx.abs() > w || dy.abs() > h);
            let a = NodeBox::new(Point::new(0.0, 0.0), w, h);
            let b = NodeBox::new(Point::new(dx, dy), w, h);
            if let Ok(seg) = clip_segment(&a, &b) {
                prop_assert!(on_outline(&a, seg.start()));
                prop_assert!(on_outline(&b, seg.end()));
            }
        }
    }
}
