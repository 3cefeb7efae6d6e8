//! Drawing operation log.
//!
//! A [`DrawingLog`] is filled once by the content interpreter and then
//! replayed any number of times onto a [`Device`]. Logs for forms and
//! patterns nest inside page logs through [`DrawingOperation::Nested`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::config::ReplayConfig;
use super::device::Device;
use super::geometry::Matrix;
use super::graphics_state::{Composite, Paint, StrokeProps};
use super::image::{RasterImage, downscale_factor};
use super::path::Path;
use super::replay::{self, CancellationProbe, PagePaintListener, PaintProgress, ReplayOutcome};
use super::text::{PageText, TextRun};

/// Unused operation slots tolerated before [`DrawingLog::contract`] shrinks.
const CONTRACT_SLACK: usize = 200;

/// One recorded drawing command.
#[derive(Debug, Clone)]
pub enum DrawingOperation {
    /// Make `path` the current geometry
    Geometry(Arc<Path>),
    /// Stroke the current geometry
    DrawStroke,
    /// Fill the current geometry
    FillPath,
    /// Clip to the current geometry
    PushClip,
    /// Drop every clip pushed since the replay started
    ResetClip,
    /// Set the transform relative to the device's starting transform
    SetTransform(Matrix),
    SetPaint(Paint),
    SetStroke(StrokeProps),
    SetComposite(Composite),
    /// Draw an image into the unit square of the current transform
    Image(Arc<RasterImage>),
    TextRun(Arc<TextRun>),
    /// Replay another log in place
    Nested(Arc<DrawingLog>),
}

pub(crate) struct LogState {
    pub(crate) ops: Vec<DrawingOperation>,
    images: Vec<Arc<RasterImage>>,
    page_text: PageText,
}

impl LogState {
    fn release(&mut self) {
        self.ops = Vec::new();
        self.images = Vec::new();
        self.page_text.clear();
    }
}

/// Append-once, replay-many list of drawing operations for a page or form.
///
/// All methods take `&self`. Replays of one log run one at a time, each on
/// a snapshot of the operations, and the contents stay unlocked while they
/// draw. Listeners may read the log back, and [`DrawingLog::dispose`] may
/// run while a replay is in flight.
pub struct DrawingLog {
    state: Mutex<LogState>,
    replaying: Mutex<()>,
    retired: AtomicBool,
    listener: Mutex<Option<Arc<dyn PagePaintListener>>>,
    config: ReplayConfig,
}

impl Default for DrawingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DrawingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.state.try_lock().map(|state| state.ops.len()).ok();
        f.debug_struct("DrawingLog")
            .field("len", &len)
            .field("retired", &self.is_retired())
            .field("config", &self.config)
            .finish()
    }
}

impl DrawingLog {
    /// Create an empty log with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ReplayConfig::default())
    }

    pub fn with_config(config: ReplayConfig) -> Self {
        DrawingLog {
            state: Mutex::new(LogState {
                ops: Vec::new(),
                images: Vec::new(),
                page_text: PageText::new(),
            }),
            replaying: Mutex::new(()),
            retired: AtomicBool::new(false),
            listener: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Add one operation at the end of the log.
    ///
    /// Images wider than 1000 pixels are shrunk first (when
    /// `scale_images` is on) and the original pixels released. A nested
    /// log contributes its images and its page text to this log. Nesting
    /// that would make a log contain itself is refused.
    pub fn append(&self, op: DrawingOperation) {
        if self.is_retired() {
            log::debug!("append to a disposed drawing log ignored");
            return;
        }

        match op {
            DrawingOperation::Image(image) => {
                let image = self.scale_for_storage(image);
                let mut state = self.lock_state();
                state.images.push(Arc::clone(&image));
                state.ops.push(DrawingOperation::Image(image));
            }
            DrawingOperation::TextRun(run) => {
                let mut state = self.lock_state();
                state.page_text.push(Arc::clone(&run));
                state.ops.push(DrawingOperation::TextRun(run));
            }
            DrawingOperation::Nested(nested) => {
                if nested.contains_log(self) {
                    log::warn!("refusing to nest a drawing log inside itself");
                    return;
                }

                let (images, text) = {
                    let inner = nested.lock_state();
                    let images: Vec<_> = inner
                        .ops
                        .iter()
                        .filter_map(|op| match op {
                            DrawingOperation::Image(image) => Some(Arc::clone(image)),
                            _ => None,
                        })
                        .collect();
                    (images, inner.page_text.clone())
                };

                let mut state = self.lock_state();
                state.images.extend(images);
                state.page_text.merge(&text);
                state.ops.push(DrawingOperation::Nested(nested));
            }
            other => self.lock_state().ops.push(other),
        }
    }

    fn scale_for_storage(&self, image: Arc<RasterImage>) -> Arc<RasterImage> {
        if !self.config.scale_images {
            return image;
        }

        match downscale_factor(image.width()) {
            Some(factor) => {
                let owned = Arc::try_unwrap(image).unwrap_or_else(|shared| (*shared).clone());
                Arc::new(owned.downscaled(factor))
            }
            None => image,
        }
    }

    /// True if `target` is this log or is reachable through nested logs.
    fn contains_log(&self, target: &DrawingLog) -> bool {
        if std::ptr::eq(self, target) {
            return true;
        }

        let nested: Vec<Arc<DrawingLog>> = self
            .lock_state()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawingOperation::Nested(log) => Some(Arc::clone(log)),
                _ => None,
            })
            .collect();

        nested.iter().any(|log| log.contains_log(target))
    }

    /// Replay every operation onto `device`.
    ///
    /// `probe` is polled before each operation. The device's transform and
    /// clip are restored before returning, whatever the outcome.
    pub fn replay(&self, device: &mut dyn Device, probe: &dyn CancellationProbe) -> ReplayOutcome {
        let listener = self.paint_listener();
        let mut progress = PaintProgress::new(listener.as_ref(), self.config.paint_delay);
        self.replay_with_progress(device, probe, &mut progress)
    }

    /// Replay reporting to the enclosing replay's `progress`.
    pub(crate) fn replay_with_progress(
        &self,
        device: &mut dyn Device,
        probe: &dyn CancellationProbe,
        progress: &mut PaintProgress<'_>,
    ) -> ReplayOutcome {
        let _replaying = self.replaying.lock().unwrap_or_else(PoisonError::into_inner);
        let ops = {
            let state = self.lock_state();
            if self.is_retired() {
                return ReplayOutcome::Retired;
            }
            state.ops.clone()
        };

        replay::replay_operations(self, &ops, device, probe, progress)
    }

    /// Images owned by this log, including those of directly nested logs.
    pub fn images(&self) -> Vec<Arc<RasterImage>> {
        self.lock_state().images.clone()
    }

    /// Text of every run in this log and its nested logs, in append order.
    pub fn page_text(&self) -> PageText {
        self.lock_state().page_text.clone()
    }

    /// Release every operation and image.
    ///
    /// A replay in flight stops at its next operation boundary with
    /// [`ReplayOutcome::Retired`]; what it still holds is dropped when it
    /// returns.
    pub fn dispose(&self) {
        self.retired.store(true, Ordering::SeqCst);
        self.set_paint_listener(None);
        self.lock_state().release();
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    /// Give back spare operation capacity once building is over.
    pub fn contract(&self) {
        let mut state = self.lock_state();
        if state.ops.capacity() - state.ops.len() > CONTRACT_SLACK {
            state.ops.shrink_to_fit();
        }
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.lock_state().ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set who is told when a replay has drawn enough to repaint.
    pub fn set_paint_listener(&self, listener: Option<Arc<dyn PagePaintListener>>) {
        *self.lock_listener() = listener;
    }

    pub fn paint_listener(&self) -> Option<Arc<dyn PagePaintListener>> {
        self.lock_listener().clone()
    }

    // A listener that panicked on another thread must not wedge painting.
    fn lock_state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<Arc<dyn PagePaintListener>>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
