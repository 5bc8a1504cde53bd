//! Generic embedded data blocks
//!
//! Payloads the decoder does not interpret structurally (images, rasters,
//! streams, ...) are shown as fixed-width hex slices. A slice is only emitted
//! once it is complete, unless the block or the stream ends first.

use std::ops::Range;

use crate::cursor::{Continuation, ParseCursor, Resume, Suspended};
use crate::row::{hex_dump, DecodedRow, RowCategory, RowSink};
use crate::tags::EmbeddedDataKind;

/// Which bytes of a window to show and how many to consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlicePlan {
    /// Ranges relative to the window start
    pub slices: Vec<Range<usize>>,
    pub consumed: usize,
}

/// Split the first `min(available, remaining)` bytes into slices of
/// `slice_len`. A trailing partial slice is kept back unless it finishes the
/// block or the stream has ended.
pub fn plan_slices(available: usize, remaining: u32, slice_len: usize, end_of_stream: bool) -> SlicePlan {
    let slice_len = slice_len.max(1);
    let usable = available.min(remaining as usize);
    let finishes = usable == remaining as usize;

    let mut slices = Vec::with_capacity(usable / slice_len + 1);
    let mut pos = 0;
    while usable - pos >= slice_len {
        slices.push(pos..pos + slice_len);
        pos += slice_len;
    }
    if pos < usable && (finishes || end_of_stream) {
        slices.push(pos..usable);
        pos = usable;
    }

    SlicePlan { slices, consumed: pos }
}

/// Printable ASCII rendering, `.` for everything else
pub fn ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
        .collect()
}

/// One binary row for `bytes` found at absolute `offset`
pub fn binary_row(level: u8, offset: u64, kind: EmbeddedDataKind, bytes: &[u8]) -> DecodedRow {
    DecodedRow::new(level, offset, RowCategory::Binary)
        .label(kind.label())
        .sequence(hex_dump(bytes))
        .description(ascii(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOutcome {
    /// Bytes of the block still to come
    pub remaining: u32,
    pub continuation: Option<Continuation>,
}

/// Show up to `remaining` bytes of an embedded block from the cursor
pub fn decode_block<S: RowSink + ?Sized>(
    buffer: &[u8],
    cursor: &mut ParseCursor,
    kind: EmbeddedDataKind,
    remaining: u32,
    slice_len: usize,
    sink: &mut S,
) -> BinaryOutcome {
    let window = cursor.window(buffer);
    let plan = plan_slices(window.len(), remaining, slice_len, cursor.end_of_stream);
    let base = cursor.position();

    for range in &plan.slices {
        sink.push(binary_row(
            cursor.level,
            base + range.start as u64,
            kind,
            &window[range.clone()],
        ));
    }
    cursor.advance(plan.consumed);

    let left = remaining - plan.consumed as u32;
    if left == 0 {
        return BinaryOutcome {
            remaining: 0,
            continuation: None,
        };
    }

    if cursor.end_of_stream {
        log::warn!("{} truncated, {} byte(s) missing", kind.label(), left);
        sink.push(
            DecodedRow::new(cursor.level, cursor.position(), RowCategory::Warning)
                .label("Warning")
                .description(format!("{} truncated: {} byte(s) missing", kind.label(), left)),
        );
        return BinaryOutcome {
            remaining: left,
            continuation: None,
        };
    }

    BinaryOutcome {
        remaining: left,
        continuation: Some(Continuation {
            resume: Resume::Continue { outstanding: left },
            suspended: Suspended::Binary { kind, remaining: left },
        }),
    }
}
