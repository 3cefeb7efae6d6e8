//! Paint and stroke state carried through a drawing log.
//!
//! These values are recorded into a [`crate::rendering::DrawingLog`] as
//! `SetPaint`, `SetStroke` and `SetComposite` operations and become the
//! active state during replay.

use std::sync::Arc;

use super::image::RasterImage;

/// Line cap style (ISO 32000-1, 8.4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Butt cap (default) - stroke is squared off at the endpoint
    #[default]
    Butt = 0,
    /// Round cap - semicircular arc with center at endpoint
    Round = 1,
    /// Projecting square cap - stroke continues beyond endpoint
    ProjectingSquare = 2,
}

/// Line join style (ISO 32000-1, 8.4.3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Miter join (default) - outer edges meet at a sharp point
    #[default]
    Miter = 0,
    /// Round join - circular arc between the edges
    Round = 1,
    /// Bevel join - outer edges meet at a beveled edge
    Bevel = 2,
}

/// Stroke descriptor for path rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeProps {
    /// Line width in user space units (default: 1.0)
    pub line_width: f64,

    /// Line cap style (default: Butt)
    pub line_cap: LineCap,

    /// Line join style (default: Miter)
    pub line_join: LineJoin,

    /// Miter limit (default: 10.0)
    pub miter_limit: f64,

    /// Dash pattern - array of dash lengths alternating on/off
    pub dash_array: Vec<f64>,

    /// Dash phase - offset into the dash pattern (default: 0)
    pub dash_offset: f64,
}

impl Default for StrokeProps {
    fn default() -> Self {
        StrokeProps {
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeProps {
    /// A solid stroke of the given width.
    pub fn with_width(line_width: f64) -> Self {
        StrokeProps {
            line_width,
            ..Default::default()
        }
    }
}

/// Color in a device color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Grayscale color (1 component: 0.0 = black, 1.0 = white)
    Gray(f64),
    /// RGB color (3 components: each 0.0-1.0)
    RGB(f64, f64, f64),
    /// CMYK color (4 components: each 0.0-1.0)
    CMYK(f64, f64, f64, f64),
}

impl Color {
    /// Create a black color (default stroke/fill color in PDF)
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// Create a white color
    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    /// Create an RGB color from u8 values (0-255).
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::RGB(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Get RGBA components as u8 values.
    ///
    /// Returns (r, g, b, a) where each component is 0-255.
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Gray(g) => {
                let v = (g.clamp(0.0, 1.0) * 255.0) as u8;
                (v, v, v, 255)
            }
            Color::RGB(r, g, b) => (
                (r.clamp(0.0, 1.0) * 255.0) as u8,
                (g.clamp(0.0, 1.0) * 255.0) as u8,
                (b.clamp(0.0, 1.0) * 255.0) as u8,
                255,
            ),
            Color::CMYK(c, m, y, k) => {
                let c = 1.0 - c.clamp(0.0, 1.0);
                let m = 1.0 - m.clamp(0.0, 1.0);
                let y = 1.0 - y.clamp(0.0, 1.0);
                let k = 1.0 - k.clamp(0.0, 1.0);

                (
                    (c * k * 255.0) as u8,
                    (m * k * 255.0) as u8,
                    (y * k * 255.0) as u8,
                    255,
                )
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

/// Image tile repeated across the filled area.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingPattern {
    /// One tile of the pattern
    pub tile: Arc<RasterImage>,
    /// Maps the tile's unit square into pattern space
    pub matrix: [f64; 6],
}

/// How a shape is filled or stroked.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Solid color
    Solid(Color),
    /// Repeated image tile
    Pattern(TilingPattern),
}

impl Paint {
    /// Create a solid black paint.
    pub fn black() -> Self {
        Paint::Solid(Color::black())
    }

    /// Create a solid paint from a color.
    pub fn from_color(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::black()
    }
}

/// Fill rule for path filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Nonzero winding number rule (default for most operations)
    #[default]
    NonZero,
    /// Even-odd rule
    EvenOdd,
}

/// Porter-Duff rule used to combine drawn pixels with the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeRule {
    #[default]
    SrcOver,
    Src,
    SrcIn,
    SrcOut,
    SrcAtop,
    DstOver,
    DstIn,
    DstOut,
    DstAtop,
    Xor,
    Clear,
}

/// Compositing rule plus constant alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub rule: CompositeRule,
    /// Constant alpha in 0.0..=1.0
    pub alpha: f32,
}

impl Composite {
    pub fn new(rule: CompositeRule, alpha: f32) -> Self {
        Composite {
            rule,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Source-over with the given alpha.
    pub fn src_over(alpha: f32) -> Self {
        Composite::new(CompositeRule::SrcOver, alpha)
    }
}

impl Default for Composite {
    fn default() -> Self {
        Composite::src_over(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_props_default() {
        let props = StrokeProps::default();
        assert_eq!(props.line_width, 1.0);
        assert_eq!(props.line_cap, LineCap::Butt);
        assert_eq!(props.line_join, LineJoin::Miter);
        assert_eq!(props.miter_limit, 10.0);
        assert!(props.dash_array.is_empty());
        assert_eq!(props.dash_offset, 0.0);
    }

    #[test]
    fn test_color_rgba() {
        assert_eq!(Color::black().rgba(), (0, 0, 0, 255));
        assert_eq!(Color::white().rgba(), (255, 255, 255, 255));
        assert_eq!(Color::CMYK(0.0, 0.0, 0.0, 1.0).rgba(), (0, 0, 0, 255));
        assert_eq!(Color::rgb(255, 0, 0).rgba(), (255, 0, 0, 255));
    }

    #[test]
    fn test_composite_alpha_is_clamped() {
        assert_eq!(Composite::src_over(1.5).alpha, 1.0);
        assert_eq!(Composite::new(CompositeRule::Xor, -0.5).alpha, 0.0);
        assert_eq!(Composite::default().rule, CompositeRule::SrcOver);
    }
}
