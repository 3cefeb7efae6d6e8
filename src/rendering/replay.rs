//! Replay of drawing logs onto a device.
//!
//! Replay walks a log once, left to right, rebuilding transform, clip and
//! paint state as it goes. Nothing survives between replays, so the same
//! log can be replayed any number of times and from inside other logs.
//!
//! Two kinds of early stop exist, neither of them an error: the caller's
//! [`CancellationProbe`] asks to stop, or the log is disposed while the
//! replay runs. Either way the stop happens between two operations and the
//! device gets its starting transform and clip back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::device::{Device, PathDrawMode};
use super::display_list::{DrawingLog, DrawingOperation};
use super::geometry::{ClipArea, Matrix, Rect, concat, scale_factors};
use super::graphics_state::{Composite, Paint, StrokeProps};
use super::image::{InterpolationQuality, RasterImage};
use super::path::Path;
use super::text::TextRun;
use crate::core::error::PDFError;

/// Images this large in either axis are composited at the cheapest quality
/// when drawn smaller than their pixel size.
const LARGE_IMAGE_EXTENT: u32 = 600;

/// Polled once per operation; returning `true` stops the replay.
pub trait CancellationProbe {
    fn should_stop(&self) -> bool;
}

impl CancellationProbe for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F> CancellationProbe for F
where
    F: Fn() -> bool,
{
    fn should_stop(&self) -> bool {
        self()
    }
}

/// A probe that never stops the replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancellationProbe for NeverCancel {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Told when a replay has drawn enough new content to be worth a repaint.
///
/// Called on the replaying thread. The log being replayed may be read or
/// disposed from here, but not replayed again.
pub trait PagePaintListener: Send + Sync {
    fn page_painted(&self);
}

/// How a replay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Every operation was applied
    Completed,
    /// The cancellation probe asked to stop
    Cancelled,
    /// The log was disposed
    Retired,
}

impl ReplayOutcome {
    pub fn is_complete(self) -> bool {
        self == ReplayOutcome::Completed
    }
}

/// Progress reporting shared by a replay and every nested replay it starts,
/// so a whole page emits at most one notification per `delay`.
pub(crate) struct PaintProgress<'a> {
    listener: Option<&'a Arc<dyn PagePaintListener>>,
    delay: Duration,
    last_paint: Instant,
}

impl<'a> PaintProgress<'a> {
    pub(crate) fn new(listener: Option<&'a Arc<dyn PagePaintListener>>, delay: Duration) -> Self {
        PaintProgress {
            listener,
            delay,
            last_paint: Instant::now(),
        }
    }

    fn drawn(&mut self) {
        let Some(listener) = self.listener else {
            return;
        };
        if self.last_paint.elapsed() >= self.delay {
            listener.page_painted();
            self.last_paint = Instant::now();
        }
    }
}

/// State rebuilt by every replay.
pub(crate) struct ReplayState {
    geometry: Option<Arc<Path>>,
    base_transform: Matrix,
    transform: Matrix,
    original_clip: ClipArea,
    clip: ClipArea,
    paint: Paint,
    stroke: StrokeProps,
    saved_composite: Composite,
    composite_changed: bool,
}

impl ReplayState {
    fn new(device: &dyn Device) -> Self {
        let clip = device.clip();
        ReplayState {
            geometry: None,
            base_transform: device.transform(),
            transform: device.transform(),
            original_clip: clip.clone(),
            clip,
            paint: Paint::default(),
            stroke: StrokeProps::default(),
            saved_composite: device.composite(),
            composite_changed: false,
        }
    }

    /// Applies one operation. Returns an outcome only when a nested replay
    /// was cancelled and the outer one must stop too.
    fn apply(
        &mut self,
        op: &DrawingOperation,
        device: &mut dyn Device,
        probe: &dyn CancellationProbe,
        progress: &mut PaintProgress<'_>,
    ) -> Option<ReplayOutcome> {
        match op {
            DrawingOperation::Geometry(path) => self.geometry = Some(Arc::clone(path)),
            DrawingOperation::FillPath => self.fill(device, progress),
            DrawingOperation::DrawStroke => self.stroke(device, progress),
            DrawingOperation::PushClip => match &self.geometry {
                Some(path) => {
                    self.clip = self.original_clip.intersect_path(path, &self.transform);
                    device.set_clip(&self.clip);
                }
                // Nothing to clip to: fall back to the page clip.
                None => self.reset_clip(device),
            },
            DrawingOperation::ResetClip => self.reset_clip(device),
            DrawingOperation::SetTransform(delta) => {
                self.transform = concat(&self.base_transform, delta);
                device.set_transform(&self.transform);
                self.reset_clip(device);
            }
            DrawingOperation::SetPaint(paint) => self.paint = paint.clone(),
            DrawingOperation::SetStroke(stroke) => self.stroke = stroke.clone(),
            DrawingOperation::SetComposite(composite) => {
                device.set_composite(*composite);
                self.composite_changed = true;
            }
            DrawingOperation::Image(image) => self.draw_image(image, device, progress),
            DrawingOperation::TextRun(run) => self.draw_text(run, device, progress),
            DrawingOperation::Nested(nested) => {
                if nested.replay_with_progress(device, probe, progress) == ReplayOutcome::Cancelled {
                    return Some(ReplayOutcome::Cancelled);
                }
            }
        }
        None
    }

    fn reset_clip(&mut self, device: &mut dyn Device) {
        self.clip = self.original_clip.clone();
        device.set_clip(&self.clip);
    }

    fn fill(&mut self, device: &mut dyn Device, progress: &mut PaintProgress<'_>) {
        let Some(path) = self.geometry.as_deref() else {
            return;
        };
        let Some(bounds) = path.device_bounds(&self.transform) else {
            return;
        };
        if !self.clip.intersects(&bounds) {
            return;
        }

        let mode = PathDrawMode::Fill(path.fill_rule());
        match device.draw_path(path, mode, &self.paint, &self.stroke) {
            Ok(()) => progress.drawn(),
            Err(e) => log::debug!("fill skipped: {}", e),
        }
    }

    fn stroke(&mut self, device: &mut dyn Device, progress: &mut PaintProgress<'_>) {
        let Some(path) = self.geometry.as_deref() else {
            return;
        };
        let Some(bounds) = path.device_bounds(&self.transform) else {
            return;
        };

        // Hairlines have no area to intersect with, but must stay visible.
        let hairline = bounds.width() < 1.0 || bounds.height() < 1.0;
        if !hairline {
            let (sx, sy) = scale_factors(&self.transform);
            let pad = self.stroke.line_width * sx.max(sy) / 2.0;
            let padded = Rect::new(
                bounds.x0 - pad,
                bounds.y0 - pad,
                bounds.x1 + pad,
                bounds.y1 + pad,
            );
            if !self.clip.intersects(&padded) {
                return;
            }
        }

        match device.draw_path(path, PathDrawMode::Stroke, &self.paint, &self.stroke) {
            Ok(()) => progress.drawn(),
            Err(e) => log::debug!("stroke skipped: {}", e),
        }
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        device: &mut dyn Device,
        progress: &mut PaintProgress<'_>,
    ) {
        if image.width() == 0 || image.height() == 0 {
            log::debug!("skipping empty {}x{} image", image.width(), image.height());
            return;
        }
        let footprint = Rect::unit().transform(&self.transform);
        if !self.clip.intersects(&footprint) {
            return;
        }

        let quality = image_quality(image, &footprint);
        let result = match device.draw_image(image, quality) {
            Err(PDFError::ResourceExhausted(reason)) if quality != InterpolationQuality::Fastest => {
                log::debug!(
                    "retrying {}x{} image at fastest quality: {}",
                    image.width(),
                    image.height(),
                    reason
                );
                device.draw_image(image, InterpolationQuality::Fastest)
            }
            other => other,
        };

        match result {
            Ok(()) => progress.drawn(),
            Err(PDFError::ResourceExhausted(reason)) => log::warn!(
                "dropping {}x{} image: {}",
                image.width(),
                image.height(),
                reason
            ),
            Err(e) => log::debug!("image skipped: {}", e),
        }
    }

    fn draw_text(
        &mut self,
        run: &TextRun,
        device: &mut dyn Device,
        progress: &mut PaintProgress<'_>,
    ) {
        let bounds = run.user_bounds().transform(&self.transform);
        if !self.clip.intersects(&bounds) {
            return;
        }

        match device.draw_text(run, &self.paint) {
            Ok(()) => progress.drawn(),
            Err(e) => log::debug!("text run skipped: {}", e),
        }
    }

    fn restore(&self, device: &mut dyn Device) {
        if self.transform != self.base_transform {
            device.set_transform(&self.base_transform);
        }
        if self.clip != self.original_clip {
            device.set_clip(&self.original_clip);
        }
        if self.composite_changed {
            device.set_composite(self.saved_composite);
        }
    }
}

/// Interpolation for compositing `image` into `footprint` (device space).
pub fn image_quality(image: &RasterImage, footprint: &Rect) -> InterpolationQuality {
    let large = image.width() >= LARGE_IMAGE_EXTENT || image.height() >= LARGE_IMAGE_EXTENT;
    let shrunk =
        footprint.width() < image.width() as f64 || footprint.height() < image.height() as f64;

    if large && shrunk {
        InterpolationQuality::Fastest
    } else {
        InterpolationQuality::Smooth
    }
}

/// Walks `ops` once onto `device`.
pub(crate) fn replay_operations(
    log: &DrawingLog,
    ops: &[DrawingOperation],
    device: &mut dyn Device,
    probe: &dyn CancellationProbe,
    progress: &mut PaintProgress<'_>,
) -> ReplayOutcome {
    let mut state = ReplayState::new(device);
    let mut outcome = ReplayOutcome::Completed;

    for op in ops {
        if log.is_retired() {
            outcome = ReplayOutcome::Retired;
            break;
        }
        if probe.should_stop() {
            outcome = ReplayOutcome::Cancelled;
            break;
        }
        if let Some(stopped) = state.apply(op, device, probe, progress) {
            outcome = stopped;
            break;
        }
    }

    state.restore(device);
    outcome
}
