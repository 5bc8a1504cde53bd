//! Parse cursor and continuation values
//!
//! Every decode call works on a `(buffer, cursor)` pair. When a structural unit
//! does not fit in the buffer the call returns a [`Continuation`] describing how
//! to resume instead of consuming a partial unit.

use crate::error::{Error, Result};
use crate::font_char::FontCharBlock;
use crate::tags::EmbeddedDataKind;
use crate::text::TextResume;

/// Position within the caller's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCursor {
    /// Index of the next unread byte
    pub buffer_offset: usize,
    /// Unread bytes from `buffer_offset` to the end of the valid window
    pub bytes_remaining: usize,
    /// Absolute stream offset of buffer index 0
    pub file_offset: u64,
    /// Nesting depth, used for indentation and statistics bucketing
    pub level: u8,
    /// No more data will follow this buffer
    pub end_of_stream: bool,
}

impl ParseCursor {
    /// Cursor over `buffer[offset..offset + remaining]`
    pub fn new(buffer: &[u8], offset: usize, remaining: usize, file_offset: u64) -> Result<Self> {
        if offset.checked_add(remaining).map_or(true, |end| end > buffer.len()) {
            return Err(Error::CursorOverrun {
                offset,
                remaining,
                len: buffer.len(),
            });
        }
        Ok(Self {
            buffer_offset: offset,
            bytes_remaining: remaining,
            file_offset,
            level: 0,
            end_of_stream: false,
        })
    }

    /// Cursor over a whole buffer
    pub fn whole(buffer: &[u8], file_offset: u64) -> Self {
        Self {
            buffer_offset: 0,
            bytes_remaining: buffer.len(),
            file_offset,
            level: 0,
            end_of_stream: false,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn at_end_of_stream(mut self, end: bool) -> Self {
        self.end_of_stream = end;
        self
    }

    /// Absolute stream offset of the next unread byte
    pub fn position(&self) -> u64 {
        self.file_offset + self.buffer_offset as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_remaining == 0
    }

    /// Unread bytes
    pub fn window<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.buffer_offset..self.buffer_offset + self.bytes_remaining]
    }

    /// Consume `n` bytes
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.bytes_remaining);
        let n = n.min(self.bytes_remaining);
        self.buffer_offset += n;
        self.bytes_remaining -= n;
    }

    /// Give back `n` consumed bytes
    pub fn rewind(&mut self, n: usize) {
        debug_assert!(n <= self.buffer_offset);
        let n = n.min(self.buffer_offset);
        self.buffer_offset -= n;
        self.bytes_remaining += n;
    }
}

/// How a suspended unit resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// No rewind: bytes from the cursor on are re-delivered, followed by new
    /// data. `outstanding` more bytes are needed to finish the unit.
    Continue { outstanding: u32 },
    /// Rewind `by` bytes before the cursor and deliver a larger contiguous span
    Backtrack { by: u32 },
}

/// Which decoder picks up a continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationKind {
    TextRun,
    FontChar,
    Binary,
    Operator,
}

/// Decoder state carried across buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suspended {
    TextRun(TextResume),
    FontChar(FontCharBlock),
    Binary {
        kind: EmbeddedDataKind,
        remaining: u32,
    },
    Operator,
}

/// A suspended decode: what to resume, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub resume: Resume,
    pub suspended: Suspended,
}

impl Continuation {
    pub fn text(outstanding: u32, state: TextResume) -> Self {
        Self {
            resume: Resume::Continue { outstanding },
            suspended: Suspended::TextRun(state),
        }
    }

    pub fn operator(outstanding: u32) -> Self {
        Self {
            resume: Resume::Continue { outstanding },
            suspended: Suspended::Operator,
        }
    }

    pub fn backtrack(by: u32, suspended: Suspended) -> Self {
        Self {
            resume: Resume::Backtrack { by },
            suspended,
        }
    }

    pub fn kind(&self) -> ContinuationKind {
        match self.suspended {
            Suspended::TextRun(_) => ContinuationKind::TextRun,
            Suspended::FontChar(_) => ContinuationKind::FontChar,
            Suspended::Binary { .. } => ContinuationKind::Binary,
            Suspended::Operator => ContinuationKind::Operator,
        }
    }

    pub fn is_backtrack(&self) -> bool {
        matches!(self.resume, Resume::Backtrack { .. })
    }
}
