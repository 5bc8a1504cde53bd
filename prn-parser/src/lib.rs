//! PRN Parser - resumable PJL / PCL XL print stream decoder
//!
//! This crate turns the raw bytes of a print job into offset-annotated rows
//! and per-tag usage statistics. It never performs I/O: the caller feeds
//! buffers and gets back rows plus, when a structural unit does not fit, a
//! [`Continuation`] describing how to resume.
//!
//! The decoder is designed to:
//! - Produce the same rows for any split of the input into buffers
//! - Never fail on malformed input (it falls back to binary display)
//! - Handle single-byte, double-byte and UTF-8 text
//! - Decode embedded soft-font characters
//!
//! Reference: PCL XL Feature Reference Protocol Class 2.1

pub mod binary;
pub mod control;
pub mod cursor;
mod error;
pub mod font_char;
pub mod pclxl;
pub mod row;
pub mod stats;
pub mod stream;
pub mod tags;
pub mod text;
pub mod utf8;

pub use cursor::{Continuation, ContinuationKind, ParseCursor, Resume, Suspended};
pub use error::{Error, Result};
pub use font_char::{FontCharBlock, FontCharConfig, FontCharOutcome};
pub use pclxl::{PclXlDecoder, XlConfig, XlExit, XlOutcome};
pub use row::{DecodedRow, OffsetFormat, RowCategory, RowSink};
pub use stats::{TagCount, TagStats, TagSummary};
pub use stream::{Mode, StreamDecoder, StreamOutcome};
pub use tags::{EmbeddedDataKind, OperatorTagEntry, SideEffectHint};
pub use text::{SubstitutePolicy, TextConfig, TextOutcome, TextParseMethod, TextResume, TextStop};
