//! A tiny-skia based rendering device.

use tiny_skia::{
    BlendMode, FillRule as SkiaFillRule, FilterQuality, IntSize, LineCap as SkiaLineCap,
    LineJoin as SkiaLineJoin, Mask, Paint as SkiaPaint, PathBuilder, Pattern, Pixmap,
    PixmapPaint, SpreadMode, Stroke, StrokeDash, Transform,
};

use image::imageops::{self, FilterType};

use crate::core::error::{PDFError, PDFResult};
use crate::rendering::device::{Device, PathDrawMode};
use crate::rendering::geometry::{ClipArea, IDENTITY, Matrix, Rect, concat};
use crate::rendering::graphics_state::{
    Color, Composite, CompositeRule, FillRule, LineCap, LineJoin, Paint, StrokeProps,
};
use crate::rendering::image::{InterpolationQuality, RasterImage};
use crate::rendering::path::{Path, PathElement};
use crate::rendering::text::TextRun;

/// Largest decoded image, in bytes, composited at full resolution.
pub const DEFAULT_IMAGE_BUDGET: usize = 64 * 1024 * 1024;

// --- Conversion helpers ---

fn to_transform(m: &Matrix) -> Transform {
    Transform::from_row(
        m[0] as f32, m[1] as f32, m[2] as f32, m[3] as f32, m[4] as f32, m[5] as f32,
    )
}

fn to_skia_color(color: Color, alpha: f32) -> tiny_skia::Color {
    let (r, g, b, a) = color.rgba();
    let mut color = tiny_skia::Color::from_rgba8(r, g, b, a);
    color.apply_opacity(alpha);
    color
}

fn to_skia_line_cap(line_cap: LineCap) -> SkiaLineCap {
    match line_cap {
        LineCap::Butt => SkiaLineCap::Butt,
        LineCap::Round => SkiaLineCap::Round,
        LineCap::ProjectingSquare => SkiaLineCap::Square,
    }
}

fn to_skia_line_join(line_join: LineJoin) -> SkiaLineJoin {
    match line_join {
        LineJoin::Miter => SkiaLineJoin::Miter,
        LineJoin::Round => SkiaLineJoin::Round,
        LineJoin::Bevel => SkiaLineJoin::Bevel,
    }
}

fn to_skia_fill_rule(fill_rule: FillRule) -> SkiaFillRule {
    match fill_rule {
        FillRule::NonZero => SkiaFillRule::Winding,
        FillRule::EvenOdd => SkiaFillRule::EvenOdd,
    }
}

fn to_blend_mode(rule: CompositeRule) -> BlendMode {
    match rule {
        CompositeRule::SrcOver => BlendMode::SourceOver,
        CompositeRule::Src => BlendMode::Source,
        CompositeRule::SrcIn => BlendMode::SourceIn,
        CompositeRule::SrcOut => BlendMode::SourceOut,
        CompositeRule::SrcAtop => BlendMode::SourceAtop,
        CompositeRule::DstOver => BlendMode::DestinationOver,
        CompositeRule::DstIn => BlendMode::DestinationIn,
        CompositeRule::DstOut => BlendMode::DestinationOut,
        CompositeRule::DstAtop => BlendMode::DestinationAtop,
        CompositeRule::Xor => BlendMode::Xor,
        CompositeRule::Clear => BlendMode::Clear,
    }
}

fn to_skia_stroke(stroke_props: &StrokeProps) -> Stroke {
    let dash = if stroke_props.dash_array.is_empty() {
        None
    } else {
        StrokeDash::new(
            stroke_props.dash_array.iter().map(|d| *d as f32).collect(),
            stroke_props.dash_offset as f32,
        )
    };

    Stroke {
        width: stroke_props.line_width as f32,
        miter_limit: stroke_props.miter_limit as f32,
        line_cap: to_skia_line_cap(stroke_props.line_cap),
        line_join: to_skia_line_join(stroke_props.line_join),
        dash,
    }
}

/// Converts a path; `None` when it has nothing drawable.
fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathElement::MoveTo(x, y) => builder.move_to(x as f32, y as f32),
            PathElement::LineTo(x, y) => builder.line_to(x as f32, y as f32),
            PathElement::CurveTo(x1, y1, x2, y2, x, y) => builder.cubic_to(
                x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
            ),
            PathElement::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Premultiplies an RGBA image into a pixmap, refusing images over `budget`.
fn to_pixmap(image: &RasterImage, budget: usize) -> PDFResult<Pixmap> {
    if image.byte_len() > budget {
        return Err(PDFError::ResourceExhausted(format!(
            "{}x{} image needs {} bytes, budget is {}",
            image.width(),
            image.height(),
            image.byte_len(),
            budget
        )));
    }

    let mut data = Vec::with_capacity(image.byte_len());
    for px in image.pixels().pixels() {
        let [r, g, b, a] = px.0;
        let premul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        data.extend_from_slice(&[premul(r), premul(g), premul(b), a]);
    }

    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| PDFError::InvalidObject("empty image".to_string()))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| PDFError::RenderingError("failed to create image pixmap".to_string()))
}

/// Nearest-neighbour copy of `image` no larger than its device footprint.
fn shrink_to_footprint(image: &RasterImage, footprint: &Rect) -> Option<RasterImage> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let width = (footprint.width().ceil() as u32).clamp(1, image.width());
    let height = (footprint.height().ceil() as u32).clamp(1, image.height());
    if width == image.width() && height == image.height() {
        return None;
    }

    Some(RasterImage::new(imageops::resize(
        image.pixels(),
        width,
        height,
        FilterType::Nearest,
    )))
}

/// A [`Device`] that rasterises into an owned tiny-skia pixmap.
pub struct SkiaDevice {
    pixmap: Pixmap,
    transform: Matrix,
    clip: ClipArea,
    clip_mask: Option<Mask>,
    composite: Composite,
    image_budget: usize,
}

impl SkiaDevice {
    /// Creates a transparent `width` x `height` device.
    pub fn new(width: u32, height: u32) -> PDFResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PDFError::ResourceExhausted(format!("cannot allocate {}x{} pixmap", width, height))
        })?;

        Ok(SkiaDevice {
            pixmap,
            transform: IDENTITY,
            clip: ClipArea::from_rect(Rect::new(0.0, 0.0, width as f64, height as f64)),
            clip_mask: None,
            composite: Composite::default(),
            image_budget: DEFAULT_IMAGE_BUDGET,
        })
    }

    /// Largest image (in decoded bytes) drawn without degrading.
    pub fn with_image_budget(mut self, bytes: usize) -> Self {
        self.image_budget = bytes;
        self
    }

    /// Fill the whole surface, ignoring clip and transform.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(to_skia_color(color, 1.0));
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    fn page_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    fn build_mask(&self, clip: &ClipArea) -> PDFResult<Option<Mask>> {
        let page = self.page_rect();
        let base = clip.base();
        let covers_page = base.x0 <= page.x0
            && base.y0 <= page.y0
            && base.x1 >= page.x1
            && base.y1 >= page.y1;
        if clip.shapes().is_empty() && covers_page {
            return Ok(None);
        }

        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| PDFError::ResourceExhausted("cannot allocate clip mask".to_string()))?;

        if let Some(rect) =
            tiny_skia::Rect::from_ltrb(base.x0 as f32, base.y0 as f32, base.x1 as f32, base.y1 as f32)
        {
            let base_path = PathBuilder::from_rect(rect);
            mask.fill_path(&base_path, SkiaFillRule::Winding, false, Transform::identity());
        }

        for shape in clip.shapes() {
            match to_skia_path(&shape.path) {
                Some(path) => mask.intersect_path(
                    &path,
                    to_skia_fill_rule(shape.path.fill_rule()),
                    true,
                    to_transform(&shape.transform),
                ),
                // An empty clip path hides everything
                None => mask.data_mut().fill(0),
            }
        }

        Ok(Some(mask))
    }

    fn skia_paint<'p>(&self, paint: &Paint, tile: Option<&'p Pixmap>) -> SkiaPaint<'p> {
        let mut sk_paint = SkiaPaint::default();
        sk_paint.anti_alias = true;
        sk_paint.blend_mode = to_blend_mode(self.composite.rule);

        match (paint, tile) {
            (Paint::Pattern(pattern), Some(tile)) => {
                let tile_to_unit = [
                    1.0 / tile.width() as f64,
                    0.0,
                    0.0,
                    1.0 / tile.height() as f64,
                    0.0,
                    0.0,
                ];
                sk_paint.shader = Pattern::new(
                    tile.as_ref(),
                    SpreadMode::Repeat,
                    FilterQuality::Bilinear,
                    self.composite.alpha,
                    to_transform(&concat(&pattern.matrix, &tile_to_unit)),
                );
            }
            (Paint::Solid(color), _) => {
                sk_paint.set_color(to_skia_color(*color, self.composite.alpha));
            }
            (Paint::Pattern(_), None) => {
                sk_paint.set_color(to_skia_color(Color::black(), self.composite.alpha));
            }
        }
        sk_paint
    }

    fn tile_pixmap(&self, paint: &Paint) -> PDFResult<Option<Pixmap>> {
        match paint {
            Paint::Pattern(pattern) => to_pixmap(&pattern.tile, self.image_budget).map(Some),
            Paint::Solid(_) => Ok(None),
        }
    }
}

impl Device for SkiaDevice {
    fn transform(&self) -> Matrix {
        self.transform
    }

    fn set_transform(&mut self, matrix: &Matrix) {
        self.transform = *matrix;
    }

    fn clip(&self) -> ClipArea {
        self.clip.clone()
    }

    fn set_clip(&mut self, clip: &ClipArea) {
        self.clip_mask = match self.build_mask(clip) {
            Ok(mask) => mask,
            Err(e) => {
                log::warn!("clip ignored: {}", e);
                None
            }
        };
        self.clip = clip.clone();
    }

    fn composite(&self) -> Composite {
        self.composite
    }

    fn set_composite(&mut self, composite: Composite) {
        self.composite = composite;
    }

    fn draw_path(
        &mut self,
        path: &Path,
        mode: PathDrawMode,
        paint: &Paint,
        stroke_props: &StrokeProps,
    ) -> PDFResult<()> {
        let Some(sk_path) = to_skia_path(path) else {
            return Ok(());
        };

        let tile = self.tile_pixmap(paint)?;
        let sk_paint = self.skia_paint(paint, tile.as_ref());
        let transform = to_transform(&self.transform);

        match mode {
            PathDrawMode::Fill(fill_rule) => {
                self.pixmap.fill_path(
                    &sk_path,
                    &sk_paint,
                    to_skia_fill_rule(fill_rule),
                    transform,
                    self.clip_mask.as_ref(),
                );
            }
            PathDrawMode::Stroke => {
                let sk_stroke = to_skia_stroke(stroke_props);
                self.pixmap.stroke_path(
                    &sk_path,
                    &sk_paint,
                    &sk_stroke,
                    transform,
                    self.clip_mask.as_ref(),
                );
            }
        }

        Ok(())
    }

    fn draw_image(&mut self, image: &RasterImage, quality: InterpolationQuality) -> PDFResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PDFError::InvalidObject(format!(
                "empty {}x{} image",
                image.width(),
                image.height()
            )));
        }
        let footprint = Rect::unit().transform(&self.transform);

        let shrunk;
        let (source, filter) = match quality {
            InterpolationQuality::Smooth => (image, FilterQuality::Bicubic),
            InterpolationQuality::Fastest => {
                shrunk = shrink_to_footprint(image, &footprint);
                (shrunk.as_ref().unwrap_or(image), FilterQuality::Nearest)
            }
        };

        let image_pixmap = to_pixmap(source, self.image_budget)?;

        // Row 0 is the top of the unit square
        let pixels_to_unit = [
            1.0 / source.width() as f64,
            0.0,
            0.0,
            -1.0 / source.height() as f64,
            0.0,
            1.0,
        ];
        let placement = concat(&self.transform, &pixels_to_unit);

        let pixmap_paint = PixmapPaint {
            opacity: self.composite.alpha,
            blend_mode: to_blend_mode(self.composite.rule),
            quality: filter,
        };

        self.pixmap.draw_pixmap(
            0,
            0,
            image_pixmap.as_ref(),
            &pixmap_paint,
            to_transform(&placement),
            self.clip_mask.as_ref(),
        );

        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun, paint: &Paint) -> PDFResult<()> {
        let tile = self.tile_pixmap(paint)?;
        let sk_paint = self.skia_paint(paint, tile.as_ref());
        let run_to_device = concat(&self.transform, &run.matrix);

        for glyph in &run.glyphs {
            let Some(outline) = glyph.outline.as_deref() else {
                continue;
            };
            let Some(sk_path) = to_skia_path(outline) else {
                continue;
            };

            let origin = [1.0, 0.0, 0.0, 1.0, glyph.x, glyph.y];
            self.pixmap.fill_path(
                &sk_path,
                &sk_paint,
                SkiaFillRule::Winding,
                to_transform(&concat(&run_to_device, &origin)),
                self.clip_mask.as_ref(),
            );
        }

        Ok(())
    }
}
