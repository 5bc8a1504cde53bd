//! PCL XL operator stream decoder
//!
//! Decodes the binary protocol into one row per atom: the stream header,
//! whitespace, typed data values, attribute ids, embedded data prefixes and
//! operators. Embedded payloads go to [`crate::font_char`] or
//! [`crate::binary`] depending on the operator that precedes them.
//!
//! An atom is only decoded once all of its bytes are in the buffer.

use std::fmt::Write as _;

use crate::binary::{self, binary_row};
use crate::control::{self, ESC, LF};
use crate::cursor::{Continuation, ParseCursor, Resume, Suspended};
use crate::font_char::{self, FontCharBlock, FontCharConfig};
use crate::row::{hex_dump, DecodedRow, RowCategory, RowSink};
use crate::stats::TagStats;
use crate::tags::{self, EmbeddedDataKind, SideEffectHint, OPERATOR_FIRST, OPERATOR_LAST};
use crate::text::{self, TextConfig, TextResume};

/// Longest stream header searched for its line feed
pub const MAX_HEADER_LEN: usize = 256;

/// Array elements shown before eliding
pub const MAX_ARRAY_ELEMENTS: usize = 16;

const ATTR_UBYTE: u8 = 0xF8;
const ATTR_UINT16: u8 = 0xF9;
const EMBEDDED_DATA: u8 = 0xFA;
const EMBEDDED_DATA_BYTE: u8 = 0xFB;

/// Byte order declared by the stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    LittleEndian,
    BigEndian,
    /// `_`: reserved for future use, read as little-endian
    Reserved,
}

impl Binding {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'(' => Some(Binding::LittleEndian),
            b')' => Some(Binding::BigEndian),
            b'_' => Some(Binding::Reserved),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Binding::LittleEndian => "Little-endian binding",
            Binding::BigEndian => "Big-endian binding",
            Binding::Reserved => "Reserved binding",
        }
    }

    fn u16(self, b: &[u8]) -> u16 {
        let raw = [b[0], b[1]];
        match self {
            Binding::BigEndian => u16::from_be_bytes(raw),
            _ => u16::from_le_bytes(raw),
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        let raw = [b[0], b[1], b[2], b[3]];
        match self {
            Binding::BigEndian => u32::from_be_bytes(raw),
            _ => u32::from_le_bytes(raw),
        }
    }
}

/// Element type of a data value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    UByte,
    UInt16,
    UInt32,
    SInt16,
    SInt32,
    Real32,
}

impl ValueType {
    /// Type encoded in the low three bits of a data type tag
    fn from_tag(tag: u8) -> Option<Self> {
        match tag & 0x07 {
            0 => Some(ValueType::UByte),
            1 => Some(ValueType::UInt16),
            2 => Some(ValueType::UInt32),
            3 => Some(ValueType::SInt16),
            4 => Some(ValueType::SInt32),
            5 => Some(ValueType::Real32),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        match self {
            ValueType::UByte => 1,
            ValueType::UInt16 | ValueType::SInt16 => 2,
            ValueType::UInt32 | ValueType::SInt32 | ValueType::Real32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::UByte => "ubyte",
            ValueType::UInt16 => "uint16",
            ValueType::UInt32 => "uint32",
            ValueType::SInt16 => "sint16",
            ValueType::SInt32 => "sint32",
            ValueType::Real32 => "real32",
        }
    }

    fn format(self, binding: Binding, b: &[u8]) -> String {
        match self {
            ValueType::UByte => b[0].to_string(),
            ValueType::UInt16 => binding.u16(b).to_string(),
            ValueType::UInt32 => binding.u32(b).to_string(),
            ValueType::SInt16 => (binding.u16(b) as i16).to_string(),
            ValueType::SInt32 => (binding.u32(b) as i32).to_string(),
            ValueType::Real32 => f32::from_bits(binding.u32(b)).to_string(),
        }
    }
}

/// Shape of a data value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Array,
    Xy,
    Box,
}

fn data_type(tag: u8) -> Option<(Shape, ValueType)> {
    let shape = match tag {
        0xC0..=0xC5 => Shape::Scalar,
        0xC8..=0xCD => Shape::Array,
        0xD0..=0xD5 => Shape::Xy,
        0xE0..=0xE5 => Shape::Box,
        _ => return None,
    };
    ValueType::from_tag(tag).map(|t| (shape, t))
}

/// Why the decoder handed control back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XlExit {
    /// Cursor is on an escape byte
    Escape,
    /// `EndSession` operator consumed
    EndSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XlOutcome {
    pub continuation: Option<Continuation>,
    pub exit: Option<XlExit>,
    /// `BeginPage` operators seen
    pub pages: u32,
    /// A page-marking operator was seen
    pub page_marked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XlConfig {
    pub font: FontCharConfig,
    pub max_line_len: usize,
}

impl Default for XlConfig {
    fn default() -> Self {
        Self {
            font: FontCharConfig::default(),
            max_line_len: 64,
        }
    }
}

/// Result of decoding the atom at the cursor
enum Atom {
    /// Rows staged, bytes used
    Done(usize),
    /// This many more bytes are needed
    Short(usize),
    Exit(XlExit, usize),
    /// Embedded data prefix of `prefix` bytes announcing `length` bytes
    Embedded { prefix: usize, length: u32 },
}

/// PCL XL decoder state kept between calls
#[derive(Debug, Clone)]
pub struct PclXlDecoder {
    config: XlConfig,
    binding: Option<Binding>,
    /// Embedded kind of the most recent operator
    pending_kind: EmbeddedDataKind,
}

impl PclXlDecoder {
    pub fn new(config: XlConfig) -> Self {
        Self {
            config,
            binding: None,
            pending_kind: EmbeddedDataKind::None,
        }
    }

    /// Forget the stream header, for a new XL session
    pub fn reset(&mut self) {
        self.binding = None;
        self.pending_kind = EmbeddedDataKind::None;
    }

    /// Decode atoms from the cursor until an exit or the buffer end
    ///
    /// `resume` is the suspended state of the previous call, if any.
    pub fn decode<S: RowSink + ?Sized>(
        &mut self,
        buffer: &[u8],
        cursor: &mut ParseCursor,
        resume: Option<Suspended>,
        stats: &mut TagStats,
        sink: &mut S,
    ) -> XlOutcome {
        let mut outcome = XlOutcome::default();

        match resume {
            Some(Suspended::FontChar(mut block)) => {
                let result = font_char::analyse(buffer, cursor, &mut block, &self.config.font, sink);
                if result.continuation.is_some() {
                    outcome.continuation = result.continuation;
                    return outcome;
                }
            }
            Some(Suspended::Binary { kind, remaining }) => {
                let result =
                    binary::decode_block(buffer, cursor, kind, remaining, self.config.font.slice_len, sink);
                if result.continuation.is_some() {
                    outcome.continuation = result.continuation;
                    return outcome;
                }
            }
            _ => {}
        }

        let mut staged = Vec::new();
        loop {
            let window = cursor.window(buffer);
            if window.is_empty() {
                return outcome;
            }

            let base = cursor.position();
            let atom = self.atom(buffer, cursor, stats, &mut staged, &mut outcome);

            match atom {
                Atom::Done(len) => {
                    flush(&mut staged, sink);
                    cursor.advance(len);
                }
                Atom::Exit(exit, len) => {
                    flush(&mut staged, sink);
                    cursor.advance(len);
                    log::debug!("pcl xl exit {:?} at {}", exit, cursor.position());
                    outcome.exit = Some(exit);
                    return outcome;
                }
                Atom::Short(needed) => {
                    staged.clear();
                    if cursor.end_of_stream {
                        truncated(buffer, cursor, sink);
                        return outcome;
                    }
                    log::trace!("pcl xl atom at {} needs {} more byte(s)", base, needed);
                    outcome.continuation = Some(Continuation::operator(needed as u32));
                    return outcome;
                }
                Atom::Embedded { prefix, length } => {
                    cursor.advance(prefix);
                    let kind = std::mem::replace(&mut self.pending_kind, EmbeddedDataKind::None);
                    if kind == EmbeddedDataKind::FontChar {
                        let mut block = FontCharBlock::new(length);
                        let result = font_char::analyse(buffer, cursor, &mut block, &self.config.font, &mut staged);
                        match result.continuation {
                            Some(Continuation {
                                resume: Resume::Backtrack { by },
                                ..
                            }) => {
                                // Restart from the embedded data tag
                                staged.clear();
                                let by = prefix + by as usize;
                                cursor.rewind(by);
                                self.pending_kind = kind;
                                log::debug!("font char at {} incomplete, backtracking {} byte(s)", base, by);
                                outcome.continuation = Some(Continuation::backtrack(by as u32, Suspended::Operator));
                                return outcome;
                            }
                            Some(cont) => {
                                flush(&mut staged, sink);
                                outcome.continuation = Some(cont);
                                return outcome;
                            }
                            None => flush(&mut staged, sink),
                        }
                    } else {
                        flush(&mut staged, sink);
                        let result = binary::decode_block(
                            buffer,
                            cursor,
                            kind,
                            length,
                            self.config.font.slice_len,
                            sink,
                        );
                        if result.continuation.is_some() {
                            outcome.continuation = result.continuation;
                            return outcome;
                        }
                    }
                }
            }
        }
    }

    /// Decode the atom at the cursor into `staged`
    fn atom(
        &mut self,
        buffer: &[u8],
        cursor: &ParseCursor,
        stats: &mut TagStats,
        staged: &mut Vec<DecodedRow>,
        outcome: &mut XlOutcome,
    ) -> Atom {
        let window = cursor.window(buffer);
        let tag = window[0];
        let level = cursor.level;
        let at = cursor.position();

        if tag == ESC {
            return Atom::Exit(XlExit::Escape, 0);
        }

        let Some(binding) = self.binding else {
            return self.stream_header(buffer, cursor, staged);
        };

        match tag {
            0x00 | 0x09..=0x0D | 0x20 => {
                let description = control::classify(tag).map_or("Space", |c| c.description);
                staged.push(
                    DecodedRow::new(level, at, RowCategory::ControlCode)
                        .label(control::bracketed(tag).unwrap_or_default())
                        .sequence(format!("{tag:02X}"))
                        .description(description),
                );
                Atom::Done(1)
            }
            OPERATOR_FIRST..=OPERATOR_LAST => {
                let (_, entry) = tags::lookup(tag);
                stats.record(tag, level);
                let category = if entry.is_reserved {
                    RowCategory::Warning
                } else {
                    RowCategory::Operator
                };
                staged.push(
                    DecodedRow::new(level, at, category)
                        .label("Operator")
                        .sequence(format!("{tag:02X}"))
                        .description(entry.description),
                );
                match entry.hint {
                    SideEffectHint::PageBegin => outcome.pages += 1,
                    SideEffectHint::PageMark => outcome.page_marked = true,
                    _ => {}
                }
                self.pending_kind = entry.embedded;
                if entry.is_end_session {
                    Atom::Exit(XlExit::EndSession, 1)
                } else {
                    Atom::Done(1)
                }
            }
            ATTR_UBYTE | ATTR_UINT16 => {
                let (len, id) = if tag == ATTR_UBYTE {
                    (2, window.get(1).map(|&b| b as u16))
                } else {
                    (3, window.get(1..3).map(|b| binding.u16(b)))
                };
                let Some(id) = id else {
                    return Atom::Short(len - window.len());
                };
                staged.push(
                    DecodedRow::new(level, at, RowCategory::Operator)
                        .label(if tag == ATTR_UBYTE { "attr_ubyte" } else { "attr_uint16" })
                        .sequence(hex_dump(&window[..len]))
                        .description(format!("Attribute {id} (0x{id:02X})")),
                );
                Atom::Done(len)
            }
            EMBEDDED_DATA | EMBEDDED_DATA_BYTE => {
                let (prefix, length) = if tag == EMBEDDED_DATA {
                    (5, window.get(1..5).map(|b| binding.u32(b)))
                } else {
                    (2, window.get(1).map(|&b| b as u32))
                };
                let Some(length) = length else {
                    return Atom::Short(prefix - window.len());
                };
                staged.push(
                    DecodedRow::new(level, at, RowCategory::Operator)
                        .label(if tag == EMBEDDED_DATA {
                            "embedded_data"
                        } else {
                            "embedded_data_byte"
                        })
                        .sequence(hex_dump(&window[..prefix]))
                        .description(format!("{} byte(s) of {}", length, self.pending_kind.label())),
                );
                Atom::Embedded { prefix, length }
            }
            _ => match data_type(tag) {
                Some((shape, value_type)) => self.data_value(window, shape, value_type, binding, level, at, staged),
                None => {
                    stats.record(tag, level);
                    staged.push(
                        DecodedRow::new(level, at, RowCategory::Error)
                            .label("Error")
                            .sequence(format!("{tag:02X}"))
                            .description(format!("Illegal tag: {}", tags::describe(tag))),
                    );
                    Atom::Done(1)
                }
            },
        }
    }

    fn stream_header(&mut self, buffer: &[u8], cursor: &ParseCursor, staged: &mut Vec<DecodedRow>) -> Atom {
        let window = cursor.window(buffer);
        let level = cursor.level;
        let at = cursor.position();

        let Some(binding) = Binding::from_byte(window[0]) else {
            staged.push(
                DecodedRow::new(level, at, RowCategory::Warning)
                    .label("Warning")
                    .description("No stream header, assuming little-endian binding"),
            );
            self.binding = Some(Binding::LittleEndian);
            return Atom::Done(0);
        };

        let limit = window.len().min(MAX_HEADER_LEN);
        let len = match window[..limit].iter().position(|&b| b == LF) {
            Some(pos) => pos + 1,
            None if limit == MAX_HEADER_LEN || cursor.end_of_stream => limit,
            None => return Atom::Short(1),
        };

        staged.push(
            DecodedRow::new(level, at, RowCategory::Operator)
                .label("Binding")
                .sequence(format!("{:02X}", window[0]))
                .description(binding.name()),
        );

        let Ok(mut line) = ParseCursor::new(buffer, cursor.buffer_offset + 1, len - 1, cursor.file_offset) else {
            return Atom::Done(len);
        };
        line = line.with_level(level).at_end_of_stream(true);
        let config = TextConfig {
            terminator: Some(LF),
            ignore_controls: true,
            max_line_len: self.config.max_line_len,
            ..TextConfig::default()
        };
        text::decode_lines(buffer, &mut line, &config, TextResume::default(), staged);

        self.binding = Some(binding);
        Atom::Done(len)
    }

    #[allow(clippy::too_many_arguments)]
    fn data_value(
        &self,
        window: &[u8],
        shape: Shape,
        value_type: ValueType,
        binding: Binding,
        level: u8,
        at: u64,
        staged: &mut Vec<DecodedRow>,
    ) -> Atom {
        let size = value_type.size();
        let (label, start, count) = match shape {
            Shape::Scalar => (value_type.name().to_string(), 1, 1),
            Shape::Xy => (format!("{}_xy", value_type.name()), 1, 2),
            Shape::Box => (format!("{}_box", value_type.name()), 1, 4),
            Shape::Array => {
                let Some(&len_tag) = window.get(1) else {
                    return Atom::Short(1);
                };
                let len_size = match len_tag {
                    0xC0 => 1,
                    0xC1 => 2,
                    _ => {
                        staged.push(
                            DecodedRow::new(level, at, RowCategory::Error)
                                .label("Error")
                                .sequence(hex_dump(&window[..2]))
                                .description("Array length must be ubyte or uint16"),
                        );
                        return Atom::Done(1);
                    }
                };
                let Some(len_bytes) = window.get(2..2 + len_size) else {
                    return Atom::Short(2 + len_size - window.len());
                };
                let count = if len_size == 1 {
                    len_bytes[0] as usize
                } else {
                    binding.u16(len_bytes) as usize
                };
                (format!("{}_array", value_type.name()), 2 + len_size, count)
            }
        };

        let total = start + size * count;
        if window.len() < total {
            return Atom::Short(total - window.len());
        }
        let values = &window[start..total];

        let description = match shape {
            Shape::Array if value_type == ValueType::UByte && is_printable(values) => {
                format!("\"{}\"", String::from_utf8_lossy(values))
            }
            _ => {
                let mut out = String::new();
                let open = if shape == Shape::Scalar { "" } else { "[" };
                out.push_str(open);
                for (i, chunk) in values.chunks(size).take(MAX_ARRAY_ELEMENTS).enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&value_type.format(binding, chunk));
                }
                if count > MAX_ARRAY_ELEMENTS {
                    let _ = write!(out, ", ... ({count} elements)");
                }
                if shape != Shape::Scalar {
                    out.push(']');
                }
                out
            }
        };

        staged.push(
            DecodedRow::new(level, at, RowCategory::Operator)
                .label(label)
                .sequence(hex_dump(&window[..start]))
                .description(description),
        );
        Atom::Done(total)
    }
}

fn is_printable(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|&b| (0x20..0x7F).contains(&b))
}

fn flush<S: RowSink + ?Sized>(staged: &mut Vec<DecodedRow>, sink: &mut S) {
    for row in staged.drain(..) {
        sink.push(row);
    }
}

/// Show what is left of a stream that ends inside an atom
fn truncated<S: RowSink + ?Sized>(buffer: &[u8], cursor: &mut ParseCursor, sink: &mut S) {
    let window = cursor.window(buffer);
    let at = cursor.position();
    log::warn!("pcl xl stream truncated at {} ({} byte(s) left)", at, window.len());
    sink.push(
        DecodedRow::new(cursor.level, at, RowCategory::Error)
            .label("Error")
            .sequence(format!("{:02X}", window[0]))
            .description("Truncated: stream ends inside this item"),
    );
    let plan = binary::plan_slices(window.len(), window.len() as u32, 16, true);
    for range in plan.slices {
        sink.push(binary_row(
            cursor.level,
            at + range.start as u64,
            EmbeddedDataKind::None,
            &window[range],
        ));
    }
    cursor.advance(window.len());
}
