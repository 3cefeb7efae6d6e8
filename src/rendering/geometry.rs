//! Affine matrices, rectangles and clip areas.
//!
//! Matrices use the PDF 6-element form `[a b c d e f]`:
//!
//! ```text
//! | a c e |
//! | b d f |
//! | 0 0 1 |
//! ```

use std::sync::Arc;

use smallvec::SmallVec;

use super::path::Path;

/// 6-element affine matrix `[a b c d e f]`.
pub type Matrix = [f64; 6];

/// The identity matrix.
pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Composes two matrices so that points are mapped by `inner` first and
/// `outer` second.
pub fn concat(outer: &Matrix, inner: &Matrix) -> Matrix {
    let [a, b, c, d, e, f] = *inner;
    let [oa, ob, oc, od, oe, of] = *outer;

    [
        oa * a + oc * b,
        ob * a + od * b,
        oa * c + oc * d,
        ob * c + od * d,
        oa * e + oc * f + oe,
        ob * e + od * f + of,
    ]
}

/// Maps a point through `m`.
#[inline]
pub fn transform_point(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    let [a, b, c, d, e, f] = *m;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Lengths of the images of the unit x and y vectors under `m`.
pub fn scale_factors(m: &Matrix) -> (f64, f64) {
    let [a, b, c, d, _, _] = *m;
    ((a * a + b * b).sqrt(), (c * c + d * d).sqrt())
}

/// Axis-aligned rectangle with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Builds a rectangle from two corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Rect {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(x, y, x + width, y + height)
    }

    /// The square images are drawn into before their placement transform.
    pub fn unit() -> Self {
        Rect::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Overlap of two rectangles; empty (zero-sized) when they are apart.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1).max(x0);
        let y1 = self.y1.min(other.y1).max(y0);
        Rect { x0, y0, x1, y1 }
    }

    /// True when both rectangles enclose area and that area overlaps.
    ///
    /// Zero-width or zero-height rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }

    /// Bounding box of this rectangle mapped through `m`.
    pub fn transform(&self, m: &Matrix) -> Rect {
        let corners = [
            transform_point(m, self.x0, self.y0),
            transform_point(m, self.x1, self.y0),
            transform_point(m, self.x1, self.y1),
            transform_point(m, self.x0, self.y1),
        ];

        let mut out = Rect {
            x0: f64::MAX,
            y0: f64::MAX,
            x1: f64::MIN,
            y1: f64::MIN,
        };
        for (x, y) in corners {
            out.x0 = out.x0.min(x);
            out.y0 = out.y0.min(y);
            out.x1 = out.x1.max(x);
            out.y1 = out.y1.max(y);
        }
        out
    }
}

/// A clip path placed on the surface by the transform active when it was
/// pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipShape {
    pub path: Arc<Path>,
    pub transform: Matrix,
}

/// Device-space clip region.
///
/// The region is the base rectangle intersected with every shape in
/// `shapes`. `bounds` is a conservative box around that region and is what
/// culling tests use; devices that clip precisely walk `shapes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipArea {
    base: Rect,
    bounds: Rect,
    shapes: SmallVec<[ClipShape; 2]>,
}

impl ClipArea {
    /// A clip covering exactly `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        ClipArea {
            base: rect,
            bounds: rect,
            shapes: SmallVec::new(),
        }
    }

    /// This area further restricted to `path` drawn under `transform`.
    pub fn intersect_path(&self, path: &Arc<Path>, transform: &Matrix) -> ClipArea {
        let shape_bounds = path
            .bounds()
            .map(|b| b.transform(transform))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));

        let mut shapes = self.shapes.clone();
        shapes.push(ClipShape {
            path: Arc::clone(path),
            transform: *transform,
        });

        ClipArea {
            base: self.base,
            bounds: self.bounds.intersect(&shape_bounds),
            shapes,
        }
    }

    /// True if `rect` (device space) may overlap the clip region.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.bounds.intersects(rect)
    }

    /// Rectangle the area started from.
    pub fn base(&self) -> Rect {
        self.base
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn shapes(&self) -> &[ClipShape] {
        &self.shapes
    }

    /// True when nothing can be drawn through this clip.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_applies_inner_first() {
        let translate = [1.0, 0.0, 0.0, 1.0, 10.0, 20.0];
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];

        assert_eq!(concat(&translate, &scale), [2.0, 0.0, 0.0, 2.0, 10.0, 20.0]);
        assert_eq!(concat(&scale, &translate), [2.0, 0.0, 0.0, 2.0, 20.0, 40.0]);
        assert_eq!(concat(&IDENTITY, &scale), scale);
    }

    #[test]
    fn test_transform_point() {
        let m = [2.0, 0.0, 0.0, 3.0, 5.0, 10.0];
        assert_eq!(transform_point(&m, 1.0, 1.0), (7.0, 13.0));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let c = Rect::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.intersect(&b), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(a.intersect(&c).is_empty());
    }

    #[test]
    fn test_degenerate_rect_never_intersects() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let hairline = Rect::new(10.0, 50.0, 90.0, 50.0);
        assert!(!page.intersects(&hairline));
    }

    #[test]
    fn test_rect_transform_rotation() {
        // 90 degree rotation
        let m = [0.0, 1.0, -1.0, 0.0, 0.0, 0.0];
        let r = Rect::new(0.0, 0.0, 2.0, 1.0).transform(&m);
        assert_eq!(r, Rect::new(-1.0, 0.0, 0.0, 2.0));
    }

    #[test]
    fn test_clip_area_intersect_path() {
        let mut path = Path::new();
        path.rect(10.0, 10.0, 20.0, 20.0);
        let path = Arc::new(path);

        let page = ClipArea::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let clipped = page.intersect_path(&path, &[2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);

        assert_eq!(clipped.bounds(), Rect::new(20.0, 20.0, 60.0, 60.0));
        assert_eq!(clipped.base(), page.base());
        assert_eq!(clipped.shapes().len(), 1);
        assert!(!clipped.intersects(&Rect::new(70.0, 70.0, 80.0, 80.0)));
    }
}
