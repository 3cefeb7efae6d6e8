//! # PDF-X Replay: page drawing logs and composite font metrics
//!
//! Two pieces of a PDF renderer that sit between content interpretation and
//! pixels:
//!
//! - **Drawing logs**: a page is interpreted once into an append-only
//!   [`DrawingLog`] of paths, clips, transforms, paint state, images, text
//!   runs and nested form logs. Each repaint replays the log onto a
//!   [`Device`], with progress notifications and cooperative cancellation.
//! - **Composite font metrics**: [`CompositeFont`] decodes a CIDFont's `/W`
//!   and `/DW` entries into per-CID advance widths and picks a substitute
//!   CJK font from the `CIDSystemInfo` ordering when no program is embedded.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pdf_x_replay::rendering::{
//!     DrawingLog, DrawingOperation, NeverCancel, Path, ReplayOutcome, TestDevice,
//! };
//!
//! let log = DrawingLog::new();
//! log.append(DrawingOperation::Geometry(Arc::new(Path::from_rect(10.0, 10.0, 50.0, 20.0))));
//! log.append(DrawingOperation::FillPath);
//!
//! let mut device = TestDevice::new(612.0, 792.0);
//! assert_eq!(log.replay(&mut device, &NeverCancel), ReplayOutcome::Completed);
//! assert_eq!(device.draws().len(), 1);
//! ```
//!
//! ## Font metrics
//!
//! ```rust
//! use std::collections::HashMap;
//! use pdf_x_replay::core::{CompositeFont, NamedFontCatalog, PDFObject, DEFAULT_CID_WIDTH};
//!
//! let mut dict = HashMap::new();
//! dict.insert("Subtype".to_string(), PDFObject::Name("CIDFontType0".to_string()));
//! dict.insert("DW".to_string(), PDFObject::Number(500.0));
//! dict.insert(
//!     "W".to_string(),
//!     PDFObject::Array(vec![
//!         PDFObject::Number(1.0),
//!         PDFObject::Array(vec![PDFObject::Number(250.0), PDFObject::Number(300.0)]),
//!     ]),
//! );
//!
//! let mut font = CompositeFont::from_dict(&PDFObject::Dictionary(dict))?;
//! font.init(&NamedFontCatalog::default())?;
//!
//! assert_eq!(font.width_of(2, DEFAULT_CID_WIDTH), 300.0);
//! assert_eq!(font.width_of(40, DEFAULT_CID_WIDTH), 500.0);
//! # Ok::<(), pdf_x_replay::core::PDFError>(())
//! ```
//!
//! ## Features
//!
//! - `rendering`: [`rendering::SkiaDevice`], a `tiny-skia` raster device.

pub mod core;
pub mod rendering;

// Re-export main types for convenience
pub use core::{CompositeFont, FontCatalog, PDFError, PDFObject, PDFResult, WidthTable};
pub use rendering::{Device, DrawingLog, DrawingOperation, ReplayConfig, ReplayOutcome};
