//! CID system identity and substitute font selection.
//!
//! When a CID-keyed font ships no usable embedded program, a replacement is
//! picked from a [`FontCatalog`] according to the character collection named
//! by the font's `/CIDSystemInfo` dictionary. The ordering string decides
//! the script family; the first matching prefix wins:
//!
//! | ordering prefix   | substitute                |
//! |-------------------|---------------------------|
//! | `GB1`, `CNS1`     | simplified Chinese        |
//! | `Korea1`          | Korean                    |
//! | `Japan1`          | Japanese                  |
//! | `Identity`        | generic system font       |
//! | anything else     | traditional Chinese       |
//!
//! The last row is a catch-all kept for compatibility with existing
//! renderings, even though it mis-resolves orderings it does not know.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::core::object::PDFObject;

bitflags! {
    /// Font descriptor `/Flags` (PDF 32000-1:2008, table 123).
    pub struct FontFlags: u32 {
        const FIXED_PITCH = 1;
        const SERIF = 1 << 1;
        const SYMBOLIC = 1 << 2;
        const SCRIPT = 1 << 3;
        const NONSYMBOLIC = 1 << 5;
        const ITALIC = 1 << 6;
        const ALL_CAP = 1 << 16;
        const SMALL_CAP = 1 << 17;
        const FORCE_BOLD = 1 << 18;
    }
}

/// Script family a substitute font is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstituteKind {
    SimplifiedChinese,
    Korean,
    Japanese,
    /// Whatever the platform would use for the base font name
    GenericSystem,
    TraditionalChinese,
}

impl SubstituteKind {
    /// Classifies an ordering string by case-sensitive prefix.
    pub fn for_ordering(ordering: &str) -> Self {
        if ordering.starts_with("GB1") || ordering.starts_with("CNS1") {
            SubstituteKind::SimplifiedChinese
        } else if ordering.starts_with("Korea1") {
            SubstituteKind::Korean
        } else if ordering.starts_with("Japan1") {
            SubstituteKind::Japanese
        } else if ordering.starts_with("Identity") {
            SubstituteKind::GenericSystem
        } else {
            SubstituteKind::TraditionalChinese
        }
    }
}

/// A font program usable for drawing glyphs.
#[derive(Clone, PartialEq, Eq)]
pub struct FontHandle {
    /// Family or PostScript name
    pub name: String,
    /// Font program bytes, when the handle carries them
    pub program: Option<Arc<[u8]>>,
}

impl FontHandle {
    /// Handle for a program embedded in the document.
    pub fn embedded(name: impl Into<String>, program: Vec<u8>) -> Self {
        FontHandle {
            name: name.into(),
            program: Some(program.into()),
        }
    }

    /// Handle that only names a font the host knows how to find.
    pub fn named(name: impl Into<String>) -> Self {
        FontHandle {
            name: name.into(),
            program: None,
        }
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("name", &self.name)
            .field("program_len", &self.program.as_ref().map(|p| p.len()))
            .finish()
    }
}

/// Source of substitute fonts.
pub trait FontCatalog {
    /// Finds a font of `kind`, using the base font name and descriptor
    /// flags as hints. Implementations always return something.
    fn lookup(&self, kind: SubstituteKind, base_font: &str, flags: FontFlags) -> FontHandle;
}

/// A [`FontCatalog`] answering with fixed family names per script.
///
/// Defaults to the Adobe standard CJK fonts. The generic kind answers with
/// the requested base font name, minus any subset tag.
#[derive(Debug, Clone)]
pub struct NamedFontCatalog {
    pub simplified_chinese: String,
    pub traditional_chinese: String,
    pub japanese: String,
    pub korean: String,
}

impl Default for NamedFontCatalog {
    fn default() -> Self {
        NamedFontCatalog {
            simplified_chinese: "STSong-Light".to_string(),
            traditional_chinese: "MSung-Light".to_string(),
            japanese: "HeiseiMin-W3".to_string(),
            korean: "HYSMyeongJo-Medium".to_string(),
        }
    }
}

impl FontCatalog for NamedFontCatalog {
    fn lookup(&self, kind: SubstituteKind, base_font: &str, _flags: FontFlags) -> FontHandle {
        let name = match kind {
            SubstituteKind::SimplifiedChinese => self.simplified_chinese.as_str(),
            SubstituteKind::TraditionalChinese => self.traditional_chinese.as_str(),
            SubstituteKind::Japanese => self.japanese.as_str(),
            SubstituteKind::Korean => self.korean.as_str(),
            SubstituteKind::GenericSystem => strip_subset_tag(base_font),
        };
        FontHandle::named(name)
    }
}

/// Removes a `ABCDEF+` subset prefix from a base font name.
pub fn strip_subset_tag(base_font: &str) -> &str {
    match base_font.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => base_font,
    }
}

/// Registry and ordering of a CID character collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidSystemInfo {
    pub registry: String,
    pub ordering: String,
    pub supplement: Option<i64>,
}

impl CidSystemInfo {
    /// Reads a `/CIDSystemInfo` dictionary.
    ///
    /// Returns `None` unless both `/Registry` and `/Ordering` are strings.
    pub fn from_pdf_object(obj: &PDFObject) -> Option<Self> {
        let registry = obj.get("Registry")?.as_text()?;
        let ordering = obj.get("Ordering")?.as_text()?;
        let supplement = obj
            .get("Supplement")
            .and_then(PDFObject::as_number)
            .map(|n| n as i64);

        Some(CidSystemInfo {
            registry,
            ordering,
            supplement,
        })
    }

    /// Name of the registry–ordering–UCS2 CMap that maps this collection's
    /// CIDs to Unicode, e.g. `Adobe-Japan1-UCS2`.
    pub fn ucs2_cmap_name(&self) -> String {
        format!("{}-{}-UCS2", self.registry, self.ordering)
    }
}

/// Outcome of a substitute font lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub font: FontHandle,
    pub kind: SubstituteKind,
    /// CMap a Unicode table would be synthesised from. Loading it is left
    /// to text extraction; only the name is recorded here.
    pub ucs2_cmap_name: String,
}

/// Picks a substitute font for a CID font.
///
/// A no-op (`None`) when there is no system info or an embedded program
/// has already been chosen.
pub fn resolve_substitute(
    info: Option<&CidSystemInfo>,
    embedded: Option<&FontHandle>,
    base_font: &str,
    flags: FontFlags,
    catalog: &dyn FontCatalog,
) -> Option<Substitution> {
    if embedded.is_some() {
        return None;
    }
    let info = info?;

    let kind = SubstituteKind::for_ordering(&info.ordering);
    let font = catalog.lookup(kind, base_font, flags);
    log::debug!(
        "Substituting {} ({}-{}) with {:?} font {}",
        base_font,
        info.registry,
        info.ordering,
        kind,
        font.name
    );

    Some(Substitution {
        font,
        kind,
        ucs2_cmap_name: info.ucs2_cmap_name(),
    })
}
