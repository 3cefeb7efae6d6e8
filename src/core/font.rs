//! Composite (CID-keyed) font metrics.
//!
//! This module owns per-font glyph sizing for the descendant CIDFont of a
//! Type0 font:
//! - **CompositeFont**: default width, dense width table, glyph height cache
//!   and the font program to draw with (embedded or substituted)
//! - **CidToGidMapping**: identity or explicit CID → GID mapping, chosen
//!   once per font subtype
//!
//! Metrics are built once by [`CompositeFont::init`] and read-only after
//! that, apart from the glyph height cache which fills in lazily.

use std::collections::HashMap;
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::core::cid::{
    CidSystemInfo, FontCatalog, FontFlags, FontHandle, SubstituteKind, resolve_substitute,
};
use crate::core::error::{PDFError, PDFResult};
use crate::core::object::PDFObject;
use crate::core::widths::WidthTable;

/// Width PDF implies for CIDs when a CIDFont has no `/DW` entry.
///
/// [`CompositeFont::width_of`] does not apply it on its own; pass it as the
/// fallback when that behaviour is wanted.
pub const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// PDF font type enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontType {
    /// Type1 font
    Type1,
    /// TrueType font
    TrueType,
    /// Type3 font (user-defined glyphs)
    Type3,
    /// Type0 composite font (wraps one CIDFont)
    Type0,
    /// CID font with CFF glyph descriptions
    CIDFontType0,
    /// CID font with TrueType glyph descriptions
    CIDFontType2,
    /// Unknown font type
    Unknown,
}

impl FontType {
    /// Parse font type from PDF font dictionary Subtype.
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "Type1" => FontType::Type1,
            "TrueType" => FontType::TrueType,
            "Type3" => FontType::Type3,
            "Type0" => FontType::Type0,
            "CIDFontType0" => FontType::CIDFontType0,
            "CIDFontType2" => FontType::CIDFontType2,
            _ => FontType::Unknown,
        }
    }

    /// Returns true if this is a CID font (multi-byte character IDs).
    pub fn is_cid_font(&self) -> bool {
        matches!(self, FontType::CIDFontType0 | FontType::CIDFontType2)
    }
}

/// How character identifiers select glyphs in the font program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CidToGidMapping {
    /// GID equals CID
    Identity,
    /// Decoded `/CIDToGIDMap` stream: big-endian 2-byte GIDs indexed by CID
    Explicit(Vec<u8>),
}

impl CidToGidMapping {
    /// Picks the mapping for a font subtype.
    ///
    /// `CIDFontType0` glyphs are always addressed by CID. `CIDFontType2`
    /// uses its `/CIDToGIDMap` stream when one is present.
    pub fn for_subtype(font_type: &FontType, map: Option<&PDFObject>) -> Self {
        match (font_type, map) {
            (FontType::CIDFontType2, Some(PDFObject::Stream { data, .. })) => {
                CidToGidMapping::Explicit(data.clone())
            }
            _ => CidToGidMapping::Identity,
        }
    }

    /// Maps a CID to a glyph index.
    ///
    /// Explicit maps return `None` for CIDs past the end of the stream.
    pub fn gid_for(&self, cid: u32) -> Option<u16> {
        match self {
            CidToGidMapping::Identity => u16::try_from(cid).ok(),
            CidToGidMapping::Explicit(data) => {
                let offset = cid as usize * 2;
                let bytes = data.get(offset..offset + 2)?;
                Some(u16::from_be_bytes([bytes[0], bytes[1]]))
            }
        }
    }
}

/// Metrics and program reference for one CIDFont.
pub struct CompositeFont {
    font_type: FontType,
    base_font: String,
    entries: HashMap<String, PDFObject>,
    cid_to_gid: CidToGidMapping,

    flags: FontFlags,
    /// `/DW`; `None` until read or when absent
    default_width: Option<f64>,
    widths: WidthTable,
    glyph_heights: RwLock<FxHashMap<u32, f64>>,

    ordering: Option<String>,
    registry: Option<String>,
    font: Option<FontHandle>,
    substitute_kind: Option<SubstituteKind>,
    ucs2_cmap_name: Option<String>,

    inited: bool,
}

impl CompositeFont {
    /// Creates an uninitialised font from a CIDFont dictionary.
    ///
    /// The CID → GID mapping variant is fixed here; everything else is
    /// read by [`CompositeFont::init`].
    pub fn from_dict(font_obj: &PDFObject) -> PDFResult<Self> {
        let dict = match font_obj {
            PDFObject::Dictionary(d) => d,
            _ => return Err(PDFError::InvalidObject("CIDFont is not a dictionary".to_string())),
        };

        let subtype = dict
            .get("Subtype")
            .and_then(PDFObject::as_name)
            .unwrap_or("Unknown");
        let font_type = FontType::from_subtype(subtype);
        if !font_type.is_cid_font() {
            return Err(PDFError::InvalidObject(format!(
                "Subtype {} is not a CIDFont",
                subtype
            )));
        }

        let base_font = dict
            .get("BaseFont")
            .and_then(PDFObject::as_name)
            .unwrap_or("Unknown")
            .to_string();

        let cid_to_gid = CidToGidMapping::for_subtype(&font_type, dict.get("CIDToGIDMap"));

        Ok(CompositeFont {
            font_type,
            base_font,
            entries: dict.clone(),
            cid_to_gid,
            flags: FontFlags::empty(),
            default_width: None,
            widths: WidthTable::default(),
            glyph_heights: RwLock::new(FxHashMap::default()),
            ordering: None,
            registry: None,
            font: None,
            substitute_kind: None,
            ucs2_cmap_name: None,
            inited: false,
        })
    }

    /// Reads descriptor flags, resolves the font program and builds the
    /// width table, in that order.
    ///
    /// Calling it again after a successful run does nothing. Each step is
    /// skipped when its source entry is absent.
    ///
    /// # Errors
    /// [`PDFError::MalformedWidthTable`] if `/DW` or `/W` cannot be decoded. The
    /// default width and the font program are already set at that point,
    /// so a caller may keep using the font with default spacing.
    pub fn init(&mut self, catalog: &dyn FontCatalog) -> PDFResult<()> {
        if self.inited {
            return Ok(());
        }

        self.parse_font_descriptor();
        self.parse_cid_system_info(catalog);
        self.parse_widths()?;

        self.inited = true;
        Ok(())
    }

    fn parse_font_descriptor(&mut self) {
        let Some(descriptor) = self.entries.get("FontDescriptor") else {
            return;
        };

        if let Some(flags) = descriptor.get("Flags").and_then(PDFObject::as_number) {
            self.flags = FontFlags::from_bits_truncate(flags as u32);
        }

        // FontFile2 is TrueType, FontFile3 CFF/OpenType, FontFile Type1.
        let program = ["FontFile2", "FontFile3", "FontFile"]
            .iter()
            .filter_map(|key| descriptor.get(key))
            .filter_map(PDFObject::stream_data)
            .find(|data| !data.is_empty());

        if let Some(data) = program {
            self.font = Some(FontHandle::embedded(self.base_font.clone(), data.to_vec()));
        }
    }

    fn parse_cid_system_info(&mut self, catalog: &dyn FontCatalog) {
        let info = self
            .entries
            .get("CIDSystemInfo")
            .and_then(CidSystemInfo::from_pdf_object);
        let Some(info) = info else {
            return;
        };

        if let Some(substitution) = resolve_substitute(
            Some(&info),
            self.font.as_ref(),
            &self.base_font,
            self.flags,
            catalog,
        ) {
            self.font = Some(substitution.font);
            self.substitute_kind = Some(substitution.kind);
            self.ucs2_cmap_name = Some(substitution.ucs2_cmap_name);
        }

        self.ordering = Some(info.ordering);
        self.registry = Some(info.registry);
    }

    fn parse_widths(&mut self) -> PDFResult<()> {
        if let Some(dw) = self.entries.get("DW") {
            let dw = dw.as_number().ok_or_else(|| {
                PDFError::MalformedWidthTable(format!("/DW is not a number: {:?}", dw))
            })?;
            self.default_width = Some(dw);
        }

        if let Some(w) = self.entries.get("W") {
            let entries = w.as_array().ok_or_else(|| {
                PDFError::MalformedWidthTable(format!("/W is not an array: {:?}", w))
            })?;
            self.widths = WidthTable::parse(entries).inspect_err(|e| {
                log::debug!("Width table for {} rejected: {}", self.base_font, e);
            })?;
        }

        Ok(())
    }

    /// Advance width of `code` in glyph space units (1/1000 em).
    ///
    /// Resolution order: the width table entry if present and non-zero,
    /// then `/DW`, then `fallback`. Codes beyond the table are answered by
    /// `/DW` like any unset code; this never indexes out of range.
    #[inline]
    pub fn width_of(&self, code: u32, fallback: f64) -> f64 {
        self.lookup_width(code).unwrap_or(fallback)
    }

    /// Like [`CompositeFont::width_of`] but reports `None` when neither the
    /// table nor `/DW` has a width, instead of substituting a value that
    /// could be mistaken for a measured zero-width glyph.
    #[inline]
    pub fn lookup_width(&self, code: u32) -> Option<f64> {
        self.widths.get(code).or(self.default_width)
    }

    /// Width of `code` scaled to user space for the given font size.
    #[inline]
    pub fn width_of_user_space(&self, code: u32, font_size: f64, fallback: f64) -> f64 {
        self.width_of(code, fallback) * font_size / 1000.0
    }

    /// Previously measured height of `code`, if any.
    pub fn glyph_height(&self, code: u32) -> Option<f64> {
        self.glyph_heights
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&code)
            .copied()
    }

    /// Records the measured height of `code`.
    pub fn cache_glyph_height(&self, code: u32, height: f64) {
        self.glyph_heights
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(code, height);
    }

    /// Maps a CID to the glyph index of the font program.
    pub fn gid_for(&self, cid: u32) -> Option<u16> {
        self.cid_to_gid.gid_for(cid)
    }

    pub fn cid_to_gid(&self) -> &CidToGidMapping {
        &self.cid_to_gid
    }

    /// True when the font program comes from the catalog rather than the
    /// document.
    pub fn is_substituted(&self) -> bool {
        self.substitute_kind.is_some()
    }

    pub fn substitute_kind(&self) -> Option<SubstituteKind> {
        self.substitute_kind
    }

    /// The program glyphs are drawn with, embedded or substituted.
    pub fn font(&self) -> Option<&FontHandle> {
        self.font.as_ref()
    }

    /// Name of the registry–ordering–UCS2 CMap recorded on substitution.
    pub fn ucs2_cmap_name(&self) -> Option<&str> {
        self.ucs2_cmap_name.as_deref()
    }

    pub fn default_width(&self) -> Option<f64> {
        self.default_width
    }

    pub fn widths(&self) -> &WidthTable {
        &self.widths
    }

    pub fn ordering(&self) -> Option<&str> {
        self.ordering.as_deref()
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn flags(&self) -> FontFlags {
        self.flags
    }

    /// Returns the font type.
    pub fn font_type(&self) -> &FontType {
        &self.font_type
    }

    /// Returns the base font name.
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn is_inited(&self) -> bool {
        self.inited
    }
}
