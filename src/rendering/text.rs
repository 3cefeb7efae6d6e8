//! Text runs recorded into drawing logs.
//!
//! Glyph outlines are produced by the font layer before the run is
//! appended; a run only needs to know where its glyphs go, what they look
//! like, and the box they occupy for clip culling.

use std::sync::Arc;

use super::geometry::{Matrix, Rect};
use super::path::Path;

/// One positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Character code as read from the content stream
    pub code: u32,
    /// Unicode text the glyph stands for, if known
    pub unicode: Option<char>,
    /// Origin in run space
    pub x: f64,
    pub y: f64,
    /// Advance in run space
    pub advance: f64,
    /// Outline relative to the glyph origin, already scaled to the font size
    pub outline: Option<Arc<Path>>,
}

/// A run of glyphs sharing one font and text matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub font_name: String,
    pub font_size: f64,
    /// Maps run space into the user space of the enclosing log
    pub matrix: Matrix,
    pub glyphs: Vec<Glyph>,
    /// Run-space box enclosing every glyph
    pub bounds: Rect,
}

impl TextRun {
    /// Bounds in the user space of the enclosing log.
    pub fn user_bounds(&self) -> Rect {
        self.bounds.transform(&self.matrix)
    }

    /// Unicode text of the run, skipping glyphs with no known mapping.
    pub fn text(&self) -> String {
        self.glyphs.iter().filter_map(|g| g.unicode).collect()
    }
}

/// Text of a page in document order, for extraction and search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    lines: Vec<Arc<TextRun>>,
}

impl PageText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, run: Arc<TextRun>) {
        self.lines.push(run);
    }

    /// Appends every line of `other`, preserving order.
    pub fn merge(&mut self, other: &PageText) {
        self.lines.extend(other.lines.iter().cloned());
    }

    pub fn lines(&self) -> &[Arc<TextRun>] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whole page text, one run per line.
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|run| run.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
