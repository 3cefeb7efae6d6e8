//! Geometry recorded into drawing logs.
//!
//! A [`Path`] is the "current geometry" a `FillPath`, `DrawStroke` or
//! `PushClip` operation refers to. It is built once by the content
//! interpreter and then shared (behind an `Arc`) by every replay.

use std::fmt;

use smallvec::{SmallVec, smallvec};

use super::geometry::{Matrix, Rect, transform_point};
use super::graphics_state::FillRule;

/// A path element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    /// Move to a new point (starts a new subpath)
    MoveTo(f64, f64),
    /// Line to a point
    LineTo(f64, f64),
    /// Cubic Bézier curve (cp1x, cp1y, cp2x, cp2y, x, y)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close the current subpath
    ClosePath,
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::MoveTo(x, y) => write!(f, "M {} {}", x, y),
            PathElement::LineTo(x, y) => write!(f, "L {} {}", x, y),
            PathElement::CurveTo(cp1x, cp1y, cp2x, cp2y, x, y) => {
                write!(f, "C {} {} {} {} {} {}", cp1x, cp1y, cp2x, cp2y, x, y)
            }
            PathElement::ClosePath => write!(f, "Z"),
        }
    }
}

/// Path geometry with the fill rule it is filled and clipped by.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    elements: Vec<PathElement>,
    fill_rule: FillRule,
    current_point: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
    has_open_subpath: bool,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    /// Create a new empty path using the nonzero winding rule.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
            fill_rule: FillRule::NonZero,
            current_point: None,
            subpath_start: None,
            has_open_subpath: false,
        }
    }

    /// Convenience constructor for a closed rectangle.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut path = Path::new();
        path.rect(x, y, width, height);
        path
    }

    /// Move to a new point, starting a new subpath.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.elements.push(PathElement::MoveTo(x, y));
        self.current_point = Some((x, y));
        self.subpath_start = Some((x, y));
        self.has_open_subpath = false;
    }

    /// Add a line segment from the current point to (x, y).
    pub fn line_to(&mut self, x: f64, y: f64) {
        // No current point: implicit move
        if self.current_point.is_none() {
            self.move_to(x, y);
            return;
        }

        self.elements.push(PathElement::LineTo(x, y));
        self.current_point = Some((x, y));
        self.has_open_subpath = true;
    }

    /// Add a cubic Bézier curve.
    pub fn curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        if self.current_point.is_none() {
            self.move_to(cp1x, cp1y);
        }

        self.elements
            .push(PathElement::CurveTo(cp1x, cp1y, cp2x, cp2y, x, y));
        self.current_point = Some((x, y));
        self.has_open_subpath = true;
    }

    /// Add a closed rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        if self.has_open_subpath {
            self.elements.push(PathElement::ClosePath);
            if let Some(start) = self.subpath_start {
                self.current_point = Some(start);
            }
            self.has_open_subpath = false;
        }
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    pub fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Get the current point.
    pub fn current_point(&self) -> Option<(f64, f64)> {
        self.current_point
    }

    /// Get the path elements.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Control-point bounding box in user space.
    ///
    /// Curves are bounded by their control polygon, which contains the
    /// curve, so the box may be slightly larger than the painted area.
    pub fn bounds(&self) -> Option<Rect> {
        bounds_of(self.control_points())
    }

    /// Device-space bounding box under `m`.
    ///
    /// Transforms every control point rather than the user-space box, so
    /// rotated paths do not pick up the corners of their unrotated bounds.
    pub fn device_bounds(&self, m: &Matrix) -> Option<Rect> {
        bounds_of(
            self.control_points()
                .map(|(x, y)| transform_point(m, x, y)),
        )
    }

    fn control_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.elements
            .iter()
            .flat_map(|el| -> SmallVec<[(f64, f64); 3]> {
                match *el {
                    PathElement::MoveTo(x, y) | PathElement::LineTo(x, y) => smallvec![(x, y)],
                    PathElement::CurveTo(x1, y1, x2, y2, x, y) => {
                        smallvec![(x1, y1), (x2, y2), (x, y)]
                    }
                    PathElement::ClosePath => SmallVec::new(),
                }
            })
    }
}

fn bounds_of(mut points: impl Iterator<Item = (f64, f64)>) -> Option<Rect> {
    let (x, y) = points.next()?;
    let mut bounds = Rect::new(x, y, x, y);
    for (x, y) in points {
        bounds.x0 = bounds.x0.min(x);
        bounds.y0 = bounds.y0.min(y);
        bounds.x1 = bounds.x1.max(x);
        bounds.y1 = bounds.y1.max(y);
    }
    Some(bounds)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for el in &self.elements {
            write!(f, "{} ", el)?;
        }
        Ok(())
    }
}

/// Builder for constructing paths.
pub struct PathBuilder {
    path: Path,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    /// Create a new path builder.
    pub fn new() -> Self {
        PathBuilder { path: Path::new() }
    }

    /// Move to a point.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.path.move_to(x, y);
        self
    }

    /// Add a line segment.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.path.line_to(x, y);
        self
    }

    /// Add a cubic Bézier curve.
    pub fn curve_to(
        &mut self,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        self.path.curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
        self
    }

    /// Add a rectangle.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.path.rect(x, y, width, height);
        self
    }

    /// Close the current subpath.
    pub fn close(&mut self) -> &mut Self {
        self.path.close_path();
        self
    }

    /// Set the fill rule.
    pub fn fill_rule(&mut self, rule: FillRule) -> &mut Self {
        self.path.set_fill_rule(rule);
        self
    }

    /// Build and return the path.
    pub fn build(&self) -> Path {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_has_no_bounds() {
        let path = Path::new();
        assert!(path.is_empty());
        assert_eq!(path.bounds(), None);
    }

    #[test]
    fn test_close_path() {
        let mut path = Path::new();
        path.move_to(10.0, 20.0);
        path.line_to(30.0, 40.0);
        path.close_path();
        assert_eq!(path.current_point(), Some((10.0, 20.0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_rect_bounds() {
        let path = Path::from_rect(10.0, 20.0, 100.0, 50.0);
        assert_eq!(path.len(), 5); // move + 3 lines + close
        assert_eq!(path.bounds(), Some(Rect::new(10.0, 20.0, 110.0, 70.0)));
    }

    #[test]
    fn test_curve_bounds_include_control_points() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.curve_to(5.0, 20.0, 15.0, -10.0, 20.0, 0.0);
        assert_eq!(path.bounds(), Some(Rect::new(0.0, -10.0, 20.0, 20.0)));
    }

    #[test]
    fn test_device_bounds_under_scale() {
        let path = Path::from_rect(1.0, 1.0, 2.0, 2.0);
        let bounds = path.device_bounds(&[10.0, 0.0, 0.0, 10.0, 5.0, 5.0]);
        assert_eq!(bounds, Some(Rect::new(15.0, 15.0, 35.0, 35.0)));
    }

    #[test]
    fn test_path_builder_fill_rule() {
        let mut builder = PathBuilder::new();
        builder
            .move_to(10.0, 20.0)
            .line_to(30.0, 40.0)
            .line_to(50.0, 60.0)
            .close()
            .fill_rule(FillRule::EvenOdd);

        let path = builder.build();
        assert_eq!(path.len(), 4);
        assert_eq!(path.fill_rule(), FillRule::EvenOdd);
    }

    #[test]
    fn test_implicit_move_to() {
        let mut path = Path::new();
        path.line_to(30.0, 40.0);
        assert_eq!(path.current_point(), Some((30.0, 40.0)));
        assert_eq!(path.elements(), &[PathElement::MoveTo(30.0, 40.0)]);
    }
}
