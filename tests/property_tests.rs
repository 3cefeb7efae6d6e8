//! Property-based tests for width tables and drawing log replay.
//!
//! These tests use proptest to generate random inputs and verify invariants.

use std::sync::Arc;

use pdf_x_replay::core::*;
use pdf_x_replay::rendering::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Entry {
    List(u32, Vec<f64>),
    Range(u32, u32, f64),
}

fn entry_strategy() -> impl Strategy<Value = Entry> {
    let width = (1u32..2000).prop_map(f64::from);
    prop_oneof![
        (0u32..400, prop::collection::vec(width.clone(), 1..6))
            .prop_map(|(first, widths)| Entry::List(first, widths)),
        (0u32..400, 0u32..50, width).prop_map(|(first, span, w)| Entry::Range(first, first + span, w)),
    ]
}

fn to_pdf(entries: &[Entry]) -> Vec<PDFObject> {
    let mut out = Vec::new();
    for entry in entries {
        match entry {
            Entry::List(first, widths) => {
                out.push(PDFObject::Number(*first as f64));
                out.push(PDFObject::Array(
                    widths.iter().copied().map(PDFObject::Number).collect(),
                ));
            }
            Entry::Range(first, last, w) => {
                out.push(PDFObject::Number(*first as f64));
                out.push(PDFObject::Number(*last as f64));
                out.push(PDFObject::Number(*w));
            }
        }
    }
    out
}

/// Straightforward sparse model: apply every write in order.
fn model(entries: &[Entry]) -> Vec<Option<f64>> {
    let mut dense: Vec<Option<f64>> = Vec::new();
    let mut write = |code: u32, w: f64| {
        let code = code as usize;
        if dense.len() <= code {
            dense.resize(code + 1, None);
        }
        dense[code] = Some(w);
    };

    for entry in entries {
        match entry {
            Entry::List(first, widths) => {
                for (i, w) in widths.iter().enumerate() {
                    write(first + i as u32, *w);
                }
            }
            Entry::Range(first, last, w) => {
                for code in *first..=*last {
                    write(code, *w);
                }
            }
        }
    }
    dense
}

// ============================================================================
// Width Table Property Tests
// ============================================================================

/// Property: every code reads the last width written for it, and the table
/// ends right after the highest referenced code
proptest! {
    #[test]
    fn prop_width_table_matches_model(entries in prop::collection::vec(entry_strategy(), 0..12)) {
        let table = WidthTable::parse(&to_pdf(&entries)).unwrap();
        let expected = model(&entries);

        prop_assert_eq!(table.len(), expected.len());
        for code in 0..(expected.len() as u32 + 3) {
            let want = expected.get(code as usize).copied().flatten();
            prop_assert_eq!(table.get(code), want, "code {}", code);
        }
    }
}

/// Property: codes past the end of the table read the font's default width
proptest! {
    #[test]
    fn prop_codes_past_table_use_default(
        entries in prop::collection::vec(entry_strategy(), 1..6),
        dw in 1u32..3000,
        past in 0u32..10_000,
    ) {
        let mut dict = std::collections::HashMap::new();
        dict.insert("Subtype".to_string(), PDFObject::Name("CIDFontType0".to_string()));
        dict.insert("DW".to_string(), PDFObject::Number(dw as f64));
        dict.insert("W".to_string(), PDFObject::Array(to_pdf(&entries)));

        let mut font = CompositeFont::from_dict(&PDFObject::Dictionary(dict)).unwrap();
        font.init(&NamedFontCatalog::default()).unwrap();

        let code = font.widths().len() as u32 + past;
        prop_assert_eq!(font.width_of(code, DEFAULT_CID_WIDTH), dw as f64);
    }
}

// ============================================================================
// Replay Property Tests
// ============================================================================

/// Property: replaying twice gives the same device calls and leaves the
/// device as it was found
proptest! {
    #[test]
    fn prop_replay_is_repeatable_and_restores_device(
        rects in prop::collection::vec((-50.0f64..150.0, -50.0f64..150.0, 0.0f64..40.0, 0.0f64..40.0, 0u8..4), 0..30),
    ) {
        let log = DrawingLog::new();
        for (x, y, w, h, kind) in rects {
            log.append(DrawingOperation::Geometry(Arc::new(Path::from_rect(x, y, w, h))));
            log.append(match kind {
                0 => DrawingOperation::FillPath,
                1 => DrawingOperation::DrawStroke,
                2 => DrawingOperation::PushClip,
                _ => DrawingOperation::ResetClip,
            });
        }

        let mut first = TestDevice::new(100.0, 100.0);
        let mut second = TestDevice::new(100.0, 100.0);
        let clip = first.clip();
        prop_assert!(log.replay(&mut first, &NeverCancel).is_complete());
        prop_assert!(log.replay(&mut second, &NeverCancel).is_complete());

        prop_assert_eq!(first.operations(), second.operations());
        prop_assert_eq!(first.clip(), clip);
        prop_assert_eq!(first.transform(), IDENTITY);
    }
}
