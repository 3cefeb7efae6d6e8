//! Glyph width tables for CID-keyed fonts.
//!
//! A CIDFont's `/W` array encodes widths sparsely, mixing two entry shapes:
//!
//! ```text
//! c [w0 w1 ... wk]      widths for codes c, c+1, ..., c+k
//! c_first c_last w      width w for every code in c_first..=c_last
//! ```
//!
//! [`WidthTable::parse`] expands this into a dense array indexed by code.
//! Codes the array never wrote hold `0.0`, which callers read as "use the
//! default width". A glyph that is genuinely zero-width is therefore
//! indistinguishable from an unset entry; this is a known limitation of the
//! table, kept for compatibility.

use crate::core::error::{PDFError, PDFResult};
use crate::core::object::PDFObject;

/// Highest character identifier a CID-keyed font can address.
pub const MAX_CID: u32 = 0xFFFF;

/// One decoded `/W` entry.
#[derive(Debug, Clone, PartialEq)]
enum WidthEntry {
    /// `c [w0 ... wk]`
    List { first: u32, widths: Vec<f64> },
    /// `c_first c_last w`
    Range { first: u32, last: u32, width: f64 },
}

impl WidthEntry {
    /// Highest code this entry writes, or `None` for an empty list.
    fn highest_code(&self) -> Option<u32> {
        match self {
            WidthEntry::List { first, widths } => {
                (!widths.is_empty()).then(|| first + widths.len() as u32 - 1)
            }
            WidthEntry::Range { last, .. } => Some(*last),
        }
    }
}

/// Dense code → advance width lookup built from a `/W` array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidthTable {
    widths: Vec<f64>,
}

impl WidthTable {
    /// Builds a dense table from the members of a `/W` array.
    ///
    /// The table length is `1 + highest code referenced by any entry`.
    /// Entries are applied left to right, so later entries overwrite
    /// earlier ones where they overlap.
    ///
    /// # Errors
    /// Returns [`PDFError::MalformedWidthTable`] if any entry has the wrong
    /// arity or a non-numeric member. Nothing is partially applied.
    pub fn parse(entries: &[PDFObject]) -> PDFResult<Self> {
        let decoded = decode_entries(entries)?;

        let len = decoded
            .iter()
            .filter_map(WidthEntry::highest_code)
            .max()
            .map_or(0, |max| max as usize + 1);

        let mut widths = vec![0.0; len];
        for entry in &decoded {
            match entry {
                WidthEntry::List { first, widths: list } => {
                    let start = *first as usize;
                    widths[start..start + list.len()].copy_from_slice(list);
                }
                WidthEntry::Range { first, last, width } => {
                    widths[*first as usize..=*last as usize].fill(*width);
                }
            }
        }

        Ok(WidthTable { widths })
    }

    /// Number of codes covered by the dense array.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Check if the table covers no codes at all.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Gets the width written for `code`.
    ///
    /// Returns `None` when `code` lies past the end of the table or the
    /// stored value is the unset marker `0.0`.
    #[inline]
    pub fn get(&self, code: u32) -> Option<f64> {
        self.widths
            .get(code as usize)
            .copied()
            .filter(|w| *w != 0.0)
    }

    /// Raw dense array, zeros included.
    pub fn as_slice(&self) -> &[f64] {
        &self.widths
    }
}

fn decode_entries(entries: &[PDFObject]) -> PDFResult<Vec<WidthEntry>> {
    let mut decoded = Vec::new();
    let mut i = 0;

    while i < entries.len() {
        let first = code_at(entries, i)?;

        match entries.get(i + 1) {
            Some(PDFObject::Array(list)) => {
                let widths = list
                    .iter()
                    .enumerate()
                    .map(|(j, w)| {
                        w.as_number().ok_or_else(|| {
                            malformed(format!("width {} of list at entry {} is not a number", j, i))
                        })
                    })
                    .collect::<PDFResult<Vec<f64>>>()?;

                if !widths.is_empty() && first + widths.len() as u32 - 1 > MAX_CID {
                    return Err(malformed(format!(
                        "list at entry {} runs past code {}",
                        i, MAX_CID
                    )));
                }

                decoded.push(WidthEntry::List { first, widths });
                i += 2;
            }
            Some(PDFObject::Number(_)) => {
                let last = code_at(entries, i + 1)?;
                if last < first {
                    return Err(malformed(format!(
                        "range at entry {} ends ({}) before it starts ({})",
                        i, last, first
                    )));
                }

                let width = entries
                    .get(i + 2)
                    .ok_or_else(|| malformed(format!("range at entry {} has no width", i)))?
                    .as_number()
                    .ok_or_else(|| malformed(format!("width of range at entry {} is not a number", i)))?;

                decoded.push(WidthEntry::Range { first, last, width });
                i += 3;
            }
            Some(other) => {
                return Err(malformed(format!(
                    "entry {} is followed by {:?}, expected an array or a number",
                    i, other
                )));
            }
            None => {
                return Err(malformed(format!("code at entry {} has no widths", i)));
            }
        }
    }

    Ok(decoded)
}

fn code_at(entries: &[PDFObject], index: usize) -> PDFResult<u32> {
    let value = entries
        .get(index)
        .and_then(PDFObject::as_number)
        .ok_or_else(|| malformed(format!("entry {} is not a number", index)))?;

    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_CID as f64 {
        return Err(malformed(format!(
            "entry {} is not a valid character code: {}",
            index, value
        )));
    }

    Ok(value as u32)
}

fn malformed(message: String) -> PDFError {
    PDFError::MalformedWidthTable(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> PDFObject {
        PDFObject::Number(v)
    }

    fn list(values: &[f64]) -> PDFObject {
        PDFObject::Array(values.iter().map(|v| n(*v)).collect())
    }

    #[test]
    fn test_list_form() {
        let table = WidthTable::parse(&[n(3.0), list(&[500.0, 600.0, 700.0])]).unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.as_slice(), &[0.0, 0.0, 0.0, 500.0, 600.0, 700.0]);
    }

    #[test]
    fn test_range_form() {
        let table = WidthTable::parse(&[n(2.0), n(4.0), n(1000.0)]).unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.get(1), None);
        assert_eq!(table.get(2), Some(1000.0));
        assert_eq!(table.get(4), Some(1000.0));
        assert_eq!(table.get(5), None);
    }

    #[test]
    fn test_mixed_forms_use_the_maximum_code() {
        // The range ends at 20, the later list only reaches 11.
        let table = WidthTable::parse(&[
            n(10.0),
            n(20.0),
            n(250.0),
            n(10.0),
            list(&[300.0, 310.0]),
        ])
        .unwrap();

        assert_eq!(table.len(), 21);
        assert_eq!(table.get(10), Some(300.0));
        assert_eq!(table.get(11), Some(310.0));
        assert_eq!(table.get(12), Some(250.0));
        assert_eq!(table.get(20), Some(250.0));
    }

    #[test]
    fn test_empty_array_gives_empty_table() {
        let table = WidthTable::parse(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let table = WidthTable::parse(&[n(5.0), list(&[]), n(1.0), list(&[400.0])]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(400.0));
    }

    #[test]
    fn test_zero_width_reads_as_unset() {
        let table = WidthTable::parse(&[n(0.0), list(&[0.0, 500.0])]).unwrap();
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(1), Some(500.0));
    }

    #[test]
    fn test_malformed_entries() {
        let cases: Vec<Vec<PDFObject>> = vec![
            vec![n(1.0)],
            vec![n(1.0), n(2.0)],
            vec![PDFObject::Name("W".into()), list(&[1.0])],
            vec![n(1.0), PDFObject::Null],
            vec![n(1.0), PDFObject::Array(vec![PDFObject::Boolean(true)])],
            vec![n(-1.0), list(&[1.0])],
            vec![n(1.5), list(&[1.0])],
            vec![n(5.0), n(2.0), n(100.0)],
            vec![n(1.0), n(2.0), PDFObject::Name("x".into())],
            vec![n(70000.0), list(&[1.0])],
            vec![n(0.0), list(&[500.0]), n(1.0)],
        ];

        for entries in cases {
            let result = WidthTable::parse(&entries);
            assert!(
                matches!(result, Err(PDFError::MalformedWidthTable(_))),
                "expected failure for {:?}",
                entries
            );
        }
    }
}
