//! Job-level stream decoder
//!
//! A print job is PJL/PCL text with escape sequences until a PJL
//! `ENTER LANGUAGE = PCLXL` command hands the stream over to PCL XL. The XL
//! session lasts until an escape (normally the Universal Exit Language
//! sequence) or `EndSession`.

use crate::control::{self, ESC, LF};
use crate::cursor::{Continuation, ParseCursor, Suspended};
use crate::pclxl::{Binding, PclXlDecoder, XlConfig, XlExit};
use crate::row::{hex_dump, DecodedRow, RowCategory, RowSink};
use crate::stats::TagStats;
use crate::text::{self, TextConfig, TextResume, TextStop};

/// Universal Exit Language
pub const UEL: &[u8] = b"\x1b%-12345X";

/// Signature of a bare PCL XL stream after the binding byte
const XL_SIGNATURE: &[u8] = b" HP-PCL XL";

/// PJL command switching to PCL XL, whitespace removed
const ENTER_PCLXL: &str = "@PJLENTERLANGUAGE=PCLXL";

/// Bytes of a text line kept for command detection
const LINE_PROBE_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// PJL and PCL text
    Text,
    PclXl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub continuation: Option<Continuation>,
    pub mode: Mode,
}

/// Decoder for a whole print job
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    mode: Mode,
    text: TextConfig,
    xl: PclXlDecoder,
    started: bool,
    /// Raw bytes of the current text line
    line: Vec<u8>,
    pages: u32,
    page_marked: bool,
}

impl StreamDecoder {
    pub fn new(text: TextConfig, xl: XlConfig) -> Self {
        Self {
            mode: Mode::Text,
            text: TextConfig {
                terminator: Some(LF),
                ..text
            },
            xl: PclXlDecoder::new(xl),
            started: false,
            line: Vec::with_capacity(LINE_PROBE_LEN),
            pages: 0,
            page_marked: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// `BeginPage` operators seen so far
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Whether anything visible has been decoded
    pub fn page_marked(&self) -> bool {
        self.page_marked
    }

    /// Decode from the cursor until the buffer is used up or a unit needs
    /// more data
    pub fn decode<S: RowSink + ?Sized>(
        &mut self,
        buffer: &[u8],
        cursor: &mut ParseCursor,
        resume: Option<Continuation>,
        stats: &mut TagStats,
        sink: &mut S,
    ) -> StreamOutcome {
        let mut resume = resume;

        if !self.started {
            if let Some(cont) = self.detect_xl(buffer, cursor) {
                return self.suspend(cont);
            }
        }

        loop {
            // A pending unit still gets its end-of-stream call with no bytes
            if cursor.is_empty() {
                match resume.take() {
                    None => return self.suspend_none(),
                    Some(cont) if !cursor.end_of_stream => return self.suspend(cont),
                    Some(cont) => resume = Some(cont),
                }
            }

            match self.mode {
                Mode::Text => {
                    let state = match resume.take().map(|c| c.suspended) {
                        Some(Suspended::TextRun(state)) => state,
                        _ => TextResume::default(),
                    };
                    let start = cursor.buffer_offset;
                    let outcome = text::decode_lines(buffer, cursor, &self.text, state, sink);
                    self.page_marked |= outcome.page_marked;
                    self.probe(&buffer[start..cursor.buffer_offset]);

                    if let Some(cont) = outcome.continuation {
                        return self.suspend(cont);
                    }
                    match outcome.stop {
                        TextStop::Terminator => {
                            if self.requests_xl() {
                                log::debug!("PJL language switch to PCL XL at {}", cursor.position());
                                self.enter_xl();
                            }
                            self.line.clear();
                        }
                        TextStop::Escape => {
                            self.line.clear();
                            if let Some(cont) = self.escape(buffer, cursor, sink) {
                                return self.suspend(cont);
                            }
                        }
                        TextStop::Exhausted => return self.suspend_none(),
                    }
                }
                Mode::PclXl => {
                    let suspended = resume.take().map(|c| c.suspended);
                    let outcome = self.xl.decode(buffer, cursor, suspended, stats, sink);
                    self.pages += outcome.pages;
                    self.page_marked |= outcome.page_marked;

                    if let Some(cont) = outcome.continuation {
                        return self.suspend(cont);
                    }
                    match outcome.exit {
                        Some(XlExit::Escape) | Some(XlExit::EndSession) => {
                            log::debug!("leaving PCL XL at {}", cursor.position());
                            self.mode = Mode::Text;
                            self.xl.reset();
                        }
                        None => return self.suspend_none(),
                    }
                }
            }
        }
    }

    fn suspend(&self, continuation: Continuation) -> StreamOutcome {
        StreamOutcome {
            continuation: Some(continuation),
            mode: self.mode,
        }
    }

    fn suspend_none(&self) -> StreamOutcome {
        StreamOutcome {
            continuation: None,
            mode: self.mode,
        }
    }

    fn enter_xl(&mut self) {
        self.mode = Mode::PclXl;
        self.xl.reset();
    }

    /// A stream that starts with a PCL XL header needs no PJL
    fn detect_xl(&mut self, buffer: &[u8], cursor: &ParseCursor) -> Option<Continuation> {
        let window = cursor.window(buffer);
        let needed = 1 + XL_SIGNATURE.len();
        if window.len() < needed && !cursor.end_of_stream {
            return Some(Continuation::operator((needed - window.len()) as u32));
        }

        self.started = true;
        if window.len() >= needed
            && Binding::from_byte(window[0]).is_some()
            && &window[1..needed] == XL_SIGNATURE
        {
            log::debug!("stream starts with a PCL XL header");
            self.enter_xl();
        }
        None
    }

    /// Handle the escape at the cursor in text mode
    fn escape<S: RowSink + ?Sized>(
        &mut self,
        buffer: &[u8],
        cursor: &mut ParseCursor,
        sink: &mut S,
    ) -> Option<Continuation> {
        let window = cursor.window(buffer);
        let level = cursor.level;
        let at = cursor.position();

        if window.starts_with(UEL) {
            sink.push(
                DecodedRow::new(level, at, RowCategory::Operator)
                    .label("UEL")
                    .sequence(hex_dump(UEL))
                    .description("Universal Exit Language"),
            );
            cursor.advance(UEL.len());
            return None;
        }

        if window.len() < UEL.len() && UEL.starts_with(window) && !cursor.end_of_stream {
            return Some(Continuation::operator((UEL.len() - window.len()) as u32));
        }

        let description = control::classify(ESC).map_or("Escape", |c| c.description);
        sink.push(
            DecodedRow::new(level, at, RowCategory::ControlCode)
                .label("<Esc>")
                .sequence(format!("{ESC:02X}"))
                .description(description),
        );
        cursor.advance(1);
        None
    }

    fn probe(&mut self, consumed: &[u8]) {
        let room = LINE_PROBE_LEN.saturating_sub(self.line.len());
        self.line.extend_from_slice(&consumed[..consumed.len().min(room)]);
    }

    fn requests_xl(&self) -> bool {
        let squeezed: String = String::from_utf8_lossy(&self.line)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        squeezed.starts_with(ENTER_PCLXL)
    }
}
