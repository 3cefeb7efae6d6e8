//! Device trait for rendering backend abstraction.
//!
//! A [`Device`] is the drawing surface a [`crate::rendering::DrawingLog`]
//! replays onto. It owns a current transform (user space → device space)
//! and a device-space clip; replay reads both once at the start, then
//! drives them as it walks the log.

use super::geometry::{ClipArea, IDENTITY, Matrix, Rect};
use super::graphics_state::{Composite, FillRule, Paint, StrokeProps};
use super::image::{InterpolationQuality, RasterImage};
use super::path::Path;
use super::text::TextRun;
use crate::core::error::{PDFError, PDFResult};

/// How to draw a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDrawMode {
    /// Fill the path
    Fill(FillRule),
    /// Stroke the path outline
    Stroke,
}

/// A surface that drawing logs can be replayed onto.
pub trait Device {
    /// Current user → device transform.
    fn transform(&self) -> Matrix;

    /// Replace the current transform.
    fn set_transform(&mut self, matrix: &Matrix);

    /// Current clip in device space.
    fn clip(&self) -> ClipArea;

    /// Replace the current clip.
    fn set_clip(&mut self, clip: &ClipArea);

    /// Current compositing rule and alpha.
    fn composite(&self) -> Composite;

    /// Set how subsequent drawing is composited.
    fn set_composite(&mut self, composite: Composite);

    /// Fill or stroke `path` under the current transform and clip.
    fn draw_path(
        &mut self,
        path: &Path,
        mode: PathDrawMode,
        paint: &Paint,
        stroke_props: &StrokeProps,
    ) -> PDFResult<()>;

    /// Draw `image` into the unit square of the current transform.
    ///
    /// # Errors
    /// [`PDFError::ResourceExhausted`] when the device cannot allocate
    /// what compositing the image needs at `quality`.
    fn draw_image(&mut self, image: &RasterImage, quality: InterpolationQuality) -> PDFResult<()>;

    /// Draw a text run.
    fn draw_text(&mut self, run: &TextRun, paint: &Paint) -> PDFResult<()>;
}

/// A device that records every call for testing.
///
/// It produces no pixels. Each call appends one line to
/// [`TestDevice::operations`], so two replays can be compared verbatim.
#[derive(Debug)]
pub struct TestDevice {
    transform: Matrix,
    clip: ClipArea,
    composite: Composite,
    operations: Vec<String>,
    image_failures: usize,
}

impl TestDevice {
    /// Create a test device whose clip is the `width` x `height` page.
    pub fn new(width: f64, height: f64) -> Self {
        TestDevice {
            transform: IDENTITY,
            clip: ClipArea::from_rect(Rect::new(0.0, 0.0, width, height)),
            composite: Composite::default(),
            operations: Vec::new(),
            image_failures: 0,
        }
    }

    /// Start from `matrix` instead of the identity (e.g. a zoomed view).
    pub fn with_transform(mut self, matrix: Matrix) -> Self {
        self.transform = matrix;
        self
    }

    /// Make the next `count` image draws fail with
    /// [`PDFError::ResourceExhausted`].
    pub fn with_image_failures(mut self, count: usize) -> Self {
        self.image_failures = count;
        self
    }

    /// Get the recorded operations.
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Recorded draw calls only (fills, strokes, images, text).
    pub fn draws(&self) -> Vec<&str> {
        self.operations
            .iter()
            .map(String::as_str)
            .filter(|op| {
                ["fill", "stroke", "image", "text"]
                    .iter()
                    .any(|prefix| op.starts_with(prefix))
            })
            .collect()
    }

    /// Clear the recorded operations.
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }
}

impl Device for TestDevice {
    fn transform(&self) -> Matrix {
        self.transform
    }

    fn set_transform(&mut self, matrix: &Matrix) {
        self.transform = *matrix;
        self.operations.push(format!("set_transform({:?})", matrix));
    }

    fn clip(&self) -> ClipArea {
        self.clip.clone()
    }

    fn set_clip(&mut self, clip: &ClipArea) {
        self.clip = clip.clone();
        let b = clip.bounds();
        self.operations.push(format!(
            "set_clip({},{},{},{};{})",
            b.x0,
            b.y0,
            b.x1,
            b.y1,
            clip.shapes().len()
        ));
    }

    fn composite(&self) -> Composite {
        self.composite
    }

    fn set_composite(&mut self, composite: Composite) {
        self.composite = composite;
        self.operations
            .push(format!("set_composite({:?},{})", composite.rule, composite.alpha));
    }

    fn draw_path(
        &mut self,
        path: &Path,
        mode: PathDrawMode,
        paint: &Paint,
        stroke_props: &StrokeProps,
    ) -> PDFResult<()> {
        match mode {
            PathDrawMode::Fill(rule) => {
                self.operations
                    .push(format!("fill({:?}, {}, {:?})", rule, path, paint));
            }
            PathDrawMode::Stroke => {
                self.operations.push(format!(
                    "stroke({}, {:?}, w={})",
                    path, paint, stroke_props.line_width
                ));
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &RasterImage, quality: InterpolationQuality) -> PDFResult<()> {
        if self.image_failures > 0 {
            self.image_failures -= 1;
            self.operations.push(format!(
                "failed_image({}x{}, {:?})",
                image.width(),
                image.height(),
                quality
            ));
            return Err(PDFError::ResourceExhausted("test device out of memory".to_string()));
        }

        self.operations.push(format!(
            "image({}x{}, {:?}, {:?})",
            image.width(),
            image.height(),
            quality,
            self.transform
        ));
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun, paint: &Paint) -> PDFResult<()> {
        self.operations.push(format!(
            "text({}, {}, {:?}, {:?})",
            run.font_name,
            run.text(),
            paint,
            self.transform
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::graphics_state::CompositeRule;

    #[test]
    fn test_device_records_calls() {
        let mut device = TestDevice::new(612.0, 792.0);
        let path = Path::from_rect(0.0, 0.0, 10.0, 10.0);

        device
            .draw_path(&path, PathDrawMode::Stroke, &Paint::black(), &StrokeProps::default())
            .unwrap();
        device.set_composite(Composite::new(CompositeRule::SrcOver, 0.5));

        let ops = device.operations();
        assert!(ops[0].starts_with("stroke(M 0 0 L 10 0"));
        assert_eq!(ops[1], "set_composite(SrcOver,0.5)");
        assert_eq!(device.draws().len(), 1);
    }

    #[test]
    fn test_image_failures_are_consumed() {
        let mut device = TestDevice::new(10.0, 10.0).with_image_failures(1);
        let image = RasterImage::filled(2, 2, [0, 0, 0, 255]);

        assert!(matches!(
            device.draw_image(&image, InterpolationQuality::Smooth),
            Err(PDFError::ResourceExhausted(_))
        ));
        assert!(device.draw_image(&image, InterpolationQuality::Fastest).is_ok());
    }

    #[test]
    fn test_initial_clip_is_page() {
        let device = TestDevice::new(100.0, 50.0);
        assert_eq!(device.clip().bounds(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(device.transform(), IDENTITY);
    }
}
