//! Drawing operation logs and their replay.
//!
//! The content interpreter records a page as a [`DrawingLog`]; repaints
//! replay it onto a [`Device`]:
//! - A Device trait for backend abstraction
//! - Paint, stroke and composite state
//! - Paths, images and text runs as shared, immutable operands
//! - Replay with progress notification and cooperative cancellation

pub mod config;
pub mod device;
pub mod display_list;
pub mod geometry;
pub mod graphics_state;
pub mod image;
pub mod page_cache;
pub mod path;
pub mod replay;
pub mod text;

// Re-export key types
pub use config::ReplayConfig;
pub use device::{Device, PathDrawMode, TestDevice};
pub use display_list::{DrawingLog, DrawingOperation};
pub use geometry::{ClipArea, ClipShape, IDENTITY, Matrix, Rect};
pub use graphics_state::{
    Color, Composite, CompositeRule, FillRule, LineCap, LineJoin, Paint, StrokeProps,
    TilingPattern,
};
pub use self::image::{InterpolationQuality, RasterImage, downscale_factor};
pub use page_cache::PageLogCache;
pub use path::{Path, PathBuilder, PathElement};
pub use replay::{CancellationProbe, NeverCancel, PagePaintListener, ReplayOutcome};
pub use text::{Glyph, PageText, TextRun};

#[cfg(feature = "rendering")]
pub mod skia_device;

#[cfg(feature = "rendering")]
pub use skia_device::SkiaDevice;
