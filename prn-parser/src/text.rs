//! Text run decoder
//!
//! Scans printable data between escape sequences (PJL lines, PCL text, the
//! PCL XL stream header). Bytes are consumed one-byte, two-byte or as UTF-8
//! according to the active text parsing method and accumulated into lines;
//! control codes, the terminator and line width limits split the output into
//! rows.
//!
//! A line or character that does not fit in the buffer is never emitted
//! partially: the cursor is left at its start and a continuation is returned,
//! so the rows do not depend on where the caller's chunk boundaries fall.

use serde::Deserialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::control::{self, ESC, LF, SPACE};
use crate::cursor::{Continuation, ParseCursor};
use crate::row::{hex_preview, DecodedRow, RowCategory, RowSink};
use crate::utf8::{self, Utf8Result};

/// Rule set deciding how many bytes make up one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextParseMethod {
    /// Single byte, C1 range shown as substituted characters
    #[default]
    OneByte,
    /// Single byte, C1 range interpreted as control codes
    OneByteAlt,
    /// Every byte from 0x20 up starts a two-byte character
    TwoByte,
    /// Asian 7-bit: 0x21-0xFF lead
    Asian7Bit,
    /// Shift-JIS: 0x81-0x9F and 0xE0-0xFC lead
    ShiftJis,
    /// Asian 8-bit: 0x80-0xFF lead
    Asian8Bit,
    Utf8,
    /// UTF-8 with C1 code points shown as control mnemonics
    Utf8Alt,
}

impl TextParseMethod {
    fn is_utf8(self) -> bool {
        matches!(self, TextParseMethod::Utf8 | TextParseMethod::Utf8Alt)
    }

    /// Whether `byte` starts a two-byte character
    fn is_lead(self, byte: u8) -> bool {
        match self {
            TextParseMethod::TwoByte => byte >= 0x20,
            TextParseMethod::Asian7Bit => byte >= 0x21,
            TextParseMethod::ShiftJis => matches!(byte, 0x81..=0x9F | 0xE0..=0xFC),
            TextParseMethod::Asian8Bit => byte >= 0x80,
            _ => false,
        }
    }

    /// Whether `byte` is a control code when taken as a single byte
    fn is_control(self, byte: u8) -> bool {
        match byte {
            0x00..=0x1F | control::DEL => true,
            0x80..=0x9F => self == TextParseMethod::OneByteAlt,
            _ => false,
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "one-byte" | "0" => Some(TextParseMethod::OneByte),
            "one-byte-alt" | "1" => Some(TextParseMethod::OneByteAlt),
            "two-byte" | "2" => Some(TextParseMethod::TwoByte),
            "asian-7bit" | "21" => Some(TextParseMethod::Asian7Bit),
            "shift-jis" | "31" => Some(TextParseMethod::ShiftJis),
            "asian-8bit" | "38" => Some(TextParseMethod::Asian8Bit),
            "utf8" | "utf-8" | "83" => Some(TextParseMethod::Utf8),
            "utf8-alt" | "1008" => Some(TextParseMethod::Utf8Alt),
            _ => None,
        }
    }
}

/// How non-graphic characters are shown inside a text line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutePolicy {
    /// `<NUL>`, `<LF>`, ...
    #[default]
    Mnemonic,
    /// As `Mnemonic`, and space shown as `<SP>`
    MnemonicAndSpace,
    /// `<0x0A>`
    Hex,
    Dot,
    Space,
    /// A caller-chosen replacement byte
    Byte(u8),
}

impl SubstitutePolicy {
    fn render(self, byte: u8) -> String {
        match self {
            SubstitutePolicy::Mnemonic | SubstitutePolicy::MnemonicAndSpace => {
                control::bracketed(byte).unwrap_or_else(|| format!("<0x{byte:02X}>"))
            }
            SubstitutePolicy::Hex => format!("<0x{byte:02X}>"),
            SubstitutePolicy::Dot => ".".to_string(),
            SubstitutePolicy::Space => " ".to_string(),
            SubstitutePolicy::Byte(b) => char::from(b).to_string(),
        }
    }

    /// Parse a policy name; `byte:X` keeps the case of `X`
    pub fn from_name(s: &str) -> Option<Self> {
        const BYTE_PREFIX: &str = "byte:";
        if let Some(prefix) = s.get(..BYTE_PREFIX.len()) {
            if prefix.eq_ignore_ascii_case(BYTE_PREFIX) {
                return s.as_bytes().get(BYTE_PREFIX.len()).copied().map(SubstitutePolicy::Byte);
            }
        }
        match s.to_lowercase().as_str() {
            "mnemonic" => Some(SubstitutePolicy::Mnemonic),
            "mnemonic-and-space" => Some(SubstitutePolicy::MnemonicAndSpace),
            "hex" => Some(SubstitutePolicy::Hex),
            "dot" => Some(SubstitutePolicy::Dot),
            "space" => Some(SubstitutePolicy::Space),
            _ => None,
        }
    }
}

/// Text run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextConfig {
    pub method: TextParseMethod,
    /// Byte that ends the run (LF for PJL lines)
    pub terminator: Option<u8>,
    /// Do not treat the first byte of the call as the terminator
    pub ignore_first_terminator: bool,
    /// Substitute control codes in-line instead of giving them their own rows
    pub ignore_controls: bool,
    pub substitute: SubstitutePolicy,
    /// Maximum display columns per row
    pub max_line_len: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            method: TextParseMethod::OneByte,
            terminator: None,
            ignore_first_terminator: false,
            ignore_controls: false,
            substitute: SubstitutePolicy::Mnemonic,
            max_line_len: 64,
        }
    }
}

/// Why the decoder returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStop {
    /// Terminator consumed
    Terminator,
    /// Cursor is on an escape byte
    Escape,
    /// Buffer used up
    Exhausted,
}

/// State a text run carries into the next buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextResume {
    /// The pending line is a later slice of an already split line
    pub continued: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutcome {
    pub stop: TextStop,
    /// At least one visible character was emitted
    pub page_marked: bool,
    pub continuation: Option<Continuation>,
}

impl TextOutcome {
    pub fn terminator_found(&self) -> bool {
        self.stop == TextStop::Terminator
    }
}

pub const INVALID_MARKER: &str = "<invalid>";

/// Line being accumulated
struct Line {
    text: String,
    width: usize,
    /// Buffer index of the first byte of the current slice
    start: usize,
    /// Buffer index just past the last byte of the current slice
    end: usize,
    multibyte: bool,
    continued: bool,
}

impl Line {
    fn new(resume: TextResume) -> Self {
        Self {
            text: String::new(),
            width: 0,
            start: 0,
            end: 0,
            multibyte: false,
            continued: resume.continued,
        }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

struct Decoder<'a, S: RowSink + ?Sized> {
    buffer: &'a [u8],
    cursor: &'a mut ParseCursor,
    config: &'a TextConfig,
    sink: &'a mut S,
    line: Line,
    page_marked: bool,
}

impl<S: RowSink + ?Sized> Decoder<'_, S> {
    fn max_width(&self) -> usize {
        self.config.max_line_len.max(1)
    }

    /// Append a rendered piece backed by `len` raw bytes at the cursor
    fn append(&mut self, piece: &str, width: usize, len: usize, multibyte: bool) {
        if !self.line.is_empty() && self.line.width + width > self.max_width() {
            self.flush_slice(true);
        }
        if self.line.is_empty() {
            self.line.start = self.cursor.buffer_offset;
        }
        self.line.text.push_str(piece);
        self.line.width += width;
        self.line.multibyte |= multibyte;
        self.cursor.advance(len);
        self.line.end = self.cursor.buffer_offset;
    }

    /// Emit the current slice; `more` marks the next slice as a continuation
    fn flush_slice(&mut self, more: bool) {
        if self.line.is_empty() {
            return;
        }
        let line = std::mem::replace(&mut self.line, Line::new(TextResume { continued: more }));
        let offset = self.cursor.file_offset + line.start as u64;
        let mut row = DecodedRow::new(self.cursor.level, offset, RowCategory::Text)
            .label("Text")
            .description(line.text)
            .continued(line.continued);
        if line.multibyte && !line.continued {
            row = row.sequence(hex_preview(&self.buffer[line.start..line.end]));
        }
        self.sink.push(row);
    }

    fn flush_line(&mut self) {
        self.flush_slice(false);
    }

    fn emit_control(&mut self, byte: u8) {
        self.flush_line();
        if let Some(code) = control::classify(byte) {
            let row = DecodedRow::new(self.cursor.level, self.cursor.position(), RowCategory::ControlCode)
                .label(format!("<{}>", code.mnemonic))
                .sequence(format!("{byte:02X}"))
                .description(code.description);
            self.sink.push(row);
        }
        self.cursor.advance(1);
    }

    fn single_byte(&mut self, byte: u8) {
        let method = self.config.method;
        if method.is_control(byte) {
            if !self.config.ignore_controls {
                self.emit_control(byte);
                return;
            }
            let piece = self.config.substitute.render(byte);
            let width = piece.width();
            self.append(&piece, width, 1, false);
            if byte == LF {
                self.flush_line();
            }
            return;
        }

        if (0x80..=0x9F).contains(&byte) {
            // C1 range taken as data
            let piece = self.config.substitute.render(byte);
            let width = piece.width();
            self.append(&piece, width, 1, false);
            return;
        }

        if byte == SPACE && self.config.substitute == SubstitutePolicy::MnemonicAndSpace {
            self.append("<SP>", 4, 1, false);
            return;
        }

        let c = char::from(byte);
        if byte != SPACE {
            self.page_marked = true;
        }
        let mut buf = [0u8; 4];
        self.append(c.encode_utf8(&mut buf), c.width().unwrap_or(1), 1, false);
    }

    fn utf8_char(&mut self, c: char, len: usize) {
        let cp = c as u32;
        if (0x80..=0x9F).contains(&cp) {
            let piece = match self.config.method {
                TextParseMethod::Utf8Alt => control::bracketed(cp as u8),
                _ => None,
            }
            .unwrap_or_else(|| format!("<U+{cp:04X}>"));
            let width = piece.width();
            self.append(&piece, width, len, true);
            return;
        }
        if c.is_control() {
            let piece = format!("<U+{cp:04X}>");
            let width = piece.width();
            self.append(&piece, width, len, true);
            return;
        }
        self.page_marked = true;
        let mut buf = [0u8; 4];
        self.append(c.encode_utf8(&mut buf), c.width().unwrap_or(1), len, true);
    }

    fn invalid(&mut self, len: usize) {
        self.append(INVALID_MARKER, INVALID_MARKER.len(), len, true);
    }

    /// Leave the pending line unconsumed and suspend
    fn suspend(&mut self, outstanding: usize) -> TextOutcome {
        let continued = self.line.continued;
        if !self.line.is_empty() {
            let back = self.cursor.buffer_offset - self.line.start;
            self.cursor.rewind(back);
        }
        log::trace!(
            "text run suspended at {} needing {} byte(s)",
            self.cursor.position(),
            outstanding
        );
        TextOutcome {
            stop: TextStop::Exhausted,
            page_marked: self.page_marked,
            continuation: Some(Continuation::text(outstanding as u32, TextResume { continued })),
        }
    }

    fn finish(&mut self, stop: TextStop) -> TextOutcome {
        self.flush_line();
        TextOutcome {
            stop,
            page_marked: self.page_marked,
            continuation: None,
        }
    }

    fn run(&mut self) -> TextOutcome {
        let first = self.cursor.buffer_offset;

        loop {
            let window = self.cursor.window(self.buffer);
            let Some(&byte) = window.first() else {
                if self.cursor.end_of_stream || self.line.is_empty() {
                    return self.finish(TextStop::Exhausted);
                }
                return self.suspend(1);
            };

            if byte == ESC {
                return self.finish(TextStop::Escape);
            }

            let is_first = self.cursor.buffer_offset == first;
            if self.config.terminator == Some(byte) && !(is_first && self.config.ignore_first_terminator) {
                self.single_byte(byte);
                return self.finish(TextStop::Terminator);
            }

            let method = self.config.method;
            if method.is_utf8() && byte >= 0x80 {
                match utf8::decode(window) {
                    Utf8Result::Char(c, len) => self.utf8_char(c, len),
                    Utf8Result::Invalid(len) => self.invalid(len),
                    Utf8Result::Incomplete { needed } => {
                        if self.cursor.end_of_stream {
                            self.invalid(window.len());
                        } else {
                            return self.suspend(needed);
                        }
                    }
                }
            } else if method.is_lead(byte) {
                if window.len() < 2 {
                    if self.cursor.end_of_stream {
                        self.invalid(1);
                    } else {
                        return self.suspend(1);
                    }
                } else {
                    let piece = format!("<{:02X}{:02X}>", window[0], window[1]);
                    self.page_marked = true;
                    self.append(&piece, piece.len(), 2, true);
                }
            } else {
                self.single_byte(byte);
            }
        }
    }
}

/// Decode text from the cursor until an escape, the terminator or the end of
/// the buffer
pub fn decode_lines<S: RowSink + ?Sized>(
    buffer: &[u8],
    cursor: &mut ParseCursor,
    config: &TextConfig,
    resume: TextResume,
    sink: &mut S,
) -> TextOutcome {
    let mut decoder = Decoder {
        buffer,
        cursor,
        config,
        sink,
        line: Line::new(resume),
        page_marked: false,
    };
    decoder.run()
}
