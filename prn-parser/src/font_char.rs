//! Soft-font character blocks
//!
//! The payload of a `ReadChar` operator: a 2-byte block header (format and
//! class), a class-specific character header and the glyph data. Parsing is an
//! explicit stage machine; [`FontCharBlock::step`] computes one transition and
//! [`analyse`] applies transitions until the block ends or needs more data.
//!
//! Structural problems never abort the stream: the block is marked invalid,
//! one warning is emitted, and the rest of the declared length is shown as
//! binary.

use std::ops::Range;

use crate::binary::{binary_row, plan_slices};
use crate::cursor::{Continuation, ParseCursor, Resume, Suspended};
use crate::row::{hex_dump, DecodedRow, RowCategory, RowSink};
use crate::tags::EmbeddedDataKind;

/// Length of the format/class prefix
pub const BLOCK_HEADER_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    Bitmap,
    TrueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontCharClass {
    Bitmap,
    TtfDense,
    TtfSparse,
    TtfSparseRotated,
}

impl FontCharClass {
    /// Character header length following the block header
    pub fn header_len(self) -> usize {
        match self {
            FontCharClass::Bitmap => 8,
            FontCharClass::TtfDense => 4,
            FontCharClass::TtfSparse => 8,
            FontCharClass::TtfSparseRotated => 10,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FontCharClass::Bitmap => "Bitmap",
            FontCharClass::TtfDense => "TrueType",
            FontCharClass::TtfSparse => "TrueType with metrics",
            FontCharClass::TtfSparseRotated => "TrueType with vertical metrics",
        }
    }
}

/// Valid format/class combinations
fn classify(format: u8, class: u8) -> Option<(FontFormat, FontCharClass)> {
    match (format, class) {
        (0, 0) => Some((FontFormat::Bitmap, FontCharClass::Bitmap)),
        (1, 0) => Some((FontFormat::TrueType, FontCharClass::TtfDense)),
        (1, 1) => Some((FontFormat::TrueType, FontCharClass::TtfSparse)),
        (1, 2) => Some((FontFormat::TrueType, FontCharClass::TtfSparseRotated)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    CheckHeader,
    ShowHeader,
    ShowBody,
    ShowRemainder,
    EndOk,
    BadSeqA,
    BadSeqB,
}

/// Limits and display options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontCharConfig {
    /// Draw bitmap characters as `#`/`.` rows
    pub draw_chars: bool,
    pub max_width: u16,
    pub max_height: u16,
    /// Largest block (declared length) that is drawn
    pub max_size: u32,
    /// Bytes per binary row
    pub slice_len: usize,
}

impl Default for FontCharConfig {
    fn default() -> Self {
        Self {
            draw_chars: false,
            max_width: 256,
            max_height: 256,
            max_size: 65536,
            slice_len: 16,
        }
    }
}

/// Why a step stopped short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspend {
    /// Restart the block once a larger contiguous span is available
    Backtrack,
    /// Resume at the current stage; `outstanding` bytes of the block remain
    Continue { outstanding: u32 },
}

/// Output of a transition; offsets are relative to the step's window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Field {
        at: Range<usize>,
        name: &'static str,
        value: String,
    },
    Warning {
        at: usize,
        message: String,
    },
    Binary(Range<usize>),
    Shape {
        at: Range<usize>,
        pattern: String,
    },
    Suspend(Suspend),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Stage,
    /// Bytes of the window used up
    pub consume: usize,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: Stage) -> Self {
        Self {
            next,
            consume: 0,
            effects: Vec::new(),
        }
    }

    fn consume(mut self, n: usize) -> Self {
        self.consume = n;
        self
    }

    fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Input of a single transition
pub struct StepInput<'a> {
    /// Unread bytes of the block, at most `remaining` long
    pub window: &'a [u8],
    pub end_of_stream: bool,
    pub config: &'a FontCharConfig,
}

/// State of one character download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCharBlock {
    pub format: Option<FontFormat>,
    pub class: Option<FontCharClass>,
    pub header_len: usize,
    pub declared_len: u32,
    pub remaining: u32,
    pub width: u16,
    pub height: u16,
    pub data_size: u32,
    pub valid: bool,
    pub stage: Stage,
}

fn be_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn be_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn warning(at: usize, message: String) -> Effect {
    Effect::Warning { at, message }
}

impl FontCharBlock {
    /// New block of `declared_len` bytes
    pub fn new(declared_len: u32) -> Self {
        Self {
            format: None,
            class: None,
            header_len: 0,
            declared_len,
            remaining: declared_len,
            width: 0,
            height: 0,
            data_size: 0,
            valid: true,
            stage: Stage::Start,
        }
    }

    /// Forget everything learned so far
    pub fn restart(&mut self) {
        *self = Self::new(self.declared_len);
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::EndOk
    }

    /// Raster bytes per row of a bitmap character
    pub fn bytes_per_row(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    fn fits(&self, config: &FontCharConfig) -> bool {
        self.width <= config.max_width && self.height <= config.max_height && self.declared_len <= config.max_size
    }

    /// Compute the transition out of the current stage
    pub fn step(&mut self, input: &StepInput<'_>) -> Transition {
        match self.stage {
            Stage::Start => self.start(input),
            Stage::CheckHeader => self.check_header(input),
            Stage::ShowHeader => self.show_header(input),
            Stage::ShowBody => self.show_body(input),
            Stage::ShowRemainder => self.show_remainder(input, Stage::ShowRemainder),
            Stage::BadSeqA => {
                self.valid = false;
                log::warn!("font character block abandoned, showing remainder as binary");
                Transition::to(Stage::BadSeqB)
            }
            Stage::BadSeqB => self.show_remainder(input, Stage::BadSeqB),
            Stage::EndOk => Transition::to(Stage::EndOk),
        }
    }

    fn start(&mut self, input: &StepInput<'_>) -> Transition {
        if (self.declared_len as usize) < BLOCK_HEADER_LEN {
            return Transition::to(Stage::BadSeqA).effect(warning(
                0,
                format!("Character block of {} byte(s) has no header", self.declared_len),
            ));
        }

        let window = input.window;
        if window.len() < BLOCK_HEADER_LEN {
            if input.end_of_stream {
                return Transition::to(Stage::BadSeqA)
                    .effect(warning(0, "Character block header truncated".to_string()));
            }
            return Transition::to(Stage::Start).effect(Effect::Suspend(Suspend::Backtrack));
        }

        match classify(window[0], window[1]) {
            Some((format, class)) => {
                self.format = Some(format);
                self.class = Some(class);
                self.header_len = class.header_len();
                Transition::to(Stage::CheckHeader)
            }
            None => Transition::to(Stage::BadSeqA).effect(warning(
                0,
                format!("Invalid format/class combination {}/{}", window[0], window[1]),
            )),
        }
    }

    fn check_header(&mut self, input: &StepInput<'_>) -> Transition {
        let needed = BLOCK_HEADER_LEN + self.header_len;
        if (self.declared_len as usize) < needed {
            return Transition::to(Stage::BadSeqA).effect(warning(
                0,
                format!(
                    "Declared length {} is shorter than the {}-byte header",
                    self.declared_len, needed
                ),
            ));
        }

        let window = input.window;
        if window.len() < needed {
            if input.end_of_stream {
                return Transition::to(Stage::BadSeqA)
                    .effect(warning(0, "Character header truncated".to_string()));
            }
            return Transition::to(Stage::Start).effect(Effect::Suspend(Suspend::Backtrack));
        }

        if input.config.draw_chars && self.format == Some(FontFormat::Bitmap) {
            self.width = be_u16(window, 6);
            self.height = be_u16(window, 8);
            let whole = window.len() >= self.remaining as usize;
            if self.fits(input.config) && !whole && !input.end_of_stream {
                return Transition::to(Stage::Start).effect(Effect::Suspend(Suspend::Backtrack));
            }
        }

        Transition::to(Stage::ShowHeader)
    }

    fn show_header(&mut self, input: &StepInput<'_>) -> Transition {
        let window = input.window;
        let header_end = BLOCK_HEADER_LEN + self.header_len;
        let (Some(format), Some(class)) = (self.format, self.class) else {
            return Transition::to(Stage::BadSeqA)
                .effect(warning(0, "Character header read out of order".to_string()));
        };

        let format_name = match format {
            FontFormat::Bitmap => "Bitmap",
            FontFormat::TrueType => "TrueType",
        };
        let mut t = Transition::to(Stage::ShowRemainder)
            .consume(header_end)
            .effect(Effect::Field {
                at: 0..1,
                name: "Format",
                value: format!("{}: {}", window[0], format_name),
            })
            .effect(Effect::Field {
                at: 1..2,
                name: "Class",
                value: format!("{}: {}", window[1], class.name()),
            });

        match format {
            FontFormat::Bitmap => {
                let left = be_i16(window, 2);
                let top = be_i16(window, 4);
                self.width = be_u16(window, 6);
                self.height = be_u16(window, 8);
                t = t
                    .effect(Effect::Field {
                        at: 2..4,
                        name: "Left offset",
                        value: left.to_string(),
                    })
                    .effect(Effect::Field {
                        at: 4..6,
                        name: "Top offset",
                        value: top.to_string(),
                    })
                    .effect(Effect::Field {
                        at: 6..8,
                        name: "Width",
                        value: self.width.to_string(),
                    })
                    .effect(Effect::Field {
                        at: 8..10,
                        name: "Height",
                        value: self.height.to_string(),
                    });

                let raster = self.bytes_per_row() * self.height as usize;
                let expected = self.declared_len as usize - header_end;
                self.data_size = raster as u32;
                if raster != expected {
                    t.next = Stage::BadSeqA;
                    return t.effect(warning(
                        header_end,
                        format!("Raster size {raster} does not match declared data size {expected}"),
                    ));
                }
                t.next = Stage::ShowBody;
                t
            }
            FontFormat::TrueType => {
                let base = BLOCK_HEADER_LEN;
                self.data_size = be_u16(window, base) as u32;
                t = t.effect(Effect::Field {
                    at: base..base + 2,
                    name: "Data size",
                    value: self.data_size.to_string(),
                });

                if self.data_size + BLOCK_HEADER_LEN as u32 != self.declared_len {
                    t.next = Stage::BadSeqA;
                    return t.effect(warning(
                        base,
                        format!(
                            "Data size {} + {} does not match declared length {}",
                            self.data_size, BLOCK_HEADER_LEN, self.declared_len
                        ),
                    ));
                }

                let glyph_at = match class {
                    FontCharClass::TtfSparse | FontCharClass::TtfSparseRotated => {
                        t = t
                            .effect(Effect::Field {
                                at: base + 2..base + 4,
                                name: "Left side bearing",
                                value: be_i16(window, base + 2).to_string(),
                            })
                            .effect(Effect::Field {
                                at: base + 4..base + 6,
                                name: "Advance width",
                                value: be_u16(window, base + 4).to_string(),
                            });
                        if class == FontCharClass::TtfSparseRotated {
                            t = t.effect(Effect::Field {
                                at: base + 6..base + 8,
                                name: "Top side bearing",
                                value: be_i16(window, base + 6).to_string(),
                            });
                            base + 8
                        } else {
                            base + 6
                        }
                    }
                    _ => base + 2,
                };
                t.effect(Effect::Field {
                    at: glyph_at..glyph_at + 2,
                    name: "Glyph ID",
                    value: be_u16(window, glyph_at).to_string(),
                })
            }
        }
    }

    fn show_body(&mut self, input: &StepInput<'_>) -> Transition {
        let mut t = Transition::to(Stage::ShowRemainder);
        let window = input.window;
        let whole = window.len() >= self.remaining as usize;
        if !(input.config.draw_chars && self.fits(input.config) && whole) {
            return t;
        }

        let per_row = self.bytes_per_row();
        for row in 0..self.height as usize {
            let at = row * per_row..(row + 1) * per_row;
            let bits = &window[at.clone()];
            let pattern = (0..self.width as usize)
                .map(|x| if bits[x / 8] & (0x80 >> (x % 8)) != 0 { '#' } else { '.' })
                .collect();
            t = t.effect(Effect::Shape { at, pattern });
        }
        t
    }

    fn show_remainder(&mut self, input: &StepInput<'_>, stage: Stage) -> Transition {
        if self.remaining == 0 {
            return Transition::to(Stage::EndOk);
        }

        let plan = plan_slices(
            input.window.len(),
            self.remaining,
            input.config.slice_len,
            input.end_of_stream,
        );
        let mut t = Transition::to(stage).consume(plan.consumed);
        for range in plan.slices {
            t = t.effect(Effect::Binary(range));
        }

        let left = self.remaining - plan.consumed as u32;
        if left == 0 {
            t.next = Stage::EndOk;
        } else if input.end_of_stream {
            if stage == Stage::ShowRemainder {
                self.valid = false;
                t = t.effect(warning(
                    plan.consumed,
                    format!("Character data truncated: {left} byte(s) missing"),
                ));
            }
            t.next = Stage::EndOk;
        } else {
            t = t.effect(Effect::Suspend(Suspend::Continue { outstanding: left }));
        }
        t
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCharOutcome {
    pub valid: bool,
    pub continuation: Option<Continuation>,
}

/// Run the block's stage machine over the bytes at the cursor
pub fn analyse<S: RowSink + ?Sized>(
    buffer: &[u8],
    cursor: &mut ParseCursor,
    block: &mut FontCharBlock,
    config: &FontCharConfig,
    sink: &mut S,
) -> FontCharOutcome {
    let start = cursor.buffer_offset;

    while block.stage != Stage::EndOk {
        let full = cursor.window(buffer);
        let window = &full[..full.len().min(block.remaining as usize)];
        let input = StepInput {
            window,
            end_of_stream: cursor.end_of_stream,
            config,
        };
        let from = block.stage;
        let transition = block.step(&input);
        log::trace!("font char {:?} -> {:?}", from, transition.next);

        let base = cursor.position();
        let level = cursor.level;
        for effect in transition.effects {
            match effect {
                Effect::Field { at, name, value } => sink.push(
                    DecodedRow::new(level, base + at.start as u64, RowCategory::Text)
                        .label(name)
                        .sequence(hex_dump(&window[at]))
                        .description(value),
                ),
                Effect::Warning { at, message } => sink.push(
                    DecodedRow::new(level, base + at as u64, RowCategory::Warning)
                        .label("Warning")
                        .description(message),
                ),
                Effect::Binary(range) => sink.push(binary_row(
                    level,
                    base + range.start as u64,
                    EmbeddedDataKind::FontChar,
                    &window[range],
                )),
                Effect::Shape { at, pattern } => sink.push(
                    DecodedRow::new(level, base + at.start as u64, RowCategory::Text)
                        .label("Shape")
                        .sequence(hex_dump(&window[at]))
                        .description(pattern),
                ),
                Effect::Suspend(Suspend::Backtrack) => {
                    let by = cursor.buffer_offset - start;
                    cursor.rewind(by);
                    block.restart();
                    log::debug!("font char header incomplete, backtracking {by} byte(s)");
                    return FontCharOutcome {
                        valid: block.valid,
                        continuation: Some(Continuation::backtrack(
                            by as u32,
                            Suspended::FontChar(block.clone()),
                        )),
                    };
                }
                Effect::Suspend(Suspend::Continue { outstanding }) => {
                    cursor.advance(transition.consume);
                    block.remaining -= transition.consume as u32;
                    return FontCharOutcome {
                        valid: block.valid,
                        continuation: Some(Continuation {
                            resume: Resume::Continue { outstanding },
                            suspended: Suspended::FontChar(block.clone()),
                        }),
                    };
                }
            }
        }

        cursor.advance(transition.consume);
        block.remaining -= transition.consume as u32;
        block.stage = transition.next;
    }

    FontCharOutcome {
        valid: block.valid,
        continuation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: u16, height: u16, raster: &[u8]) -> Vec<u8> {
        let mut data = vec![0, 0];
        data.extend_from_slice(&(-1i16).to_be_bytes());
        data.extend_from_slice(&12i16.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(raster);
        data
    }

    fn run(data: &[u8], declared: u32, config: &FontCharConfig, eos: bool) -> (Vec<DecodedRow>, FontCharOutcome, FontCharBlock) {
        let mut rows = Vec::new();
        let mut cursor = ParseCursor::whole(data, 0).at_end_of_stream(eos);
        let mut block = FontCharBlock::new(declared);
        let outcome = analyse(data, &mut cursor, &mut block, config, &mut rows);
        (rows, outcome, block)
    }

    fn warnings(rows: &[DecodedRow]) -> usize {
        rows.iter().filter(|r| r.category == RowCategory::Warning).count()
    }

    #[test]
    fn test_valid_bitmap_character() {
        let data = bitmap(16, 16, &[0xF0; 32]);
        assert_eq!(data.len(), 42);
        let (rows, outcome, block) = run(&data, 42, &FontCharConfig::default(), false);

        assert!(outcome.valid);
        assert!(outcome.continuation.is_none());
        assert!(block.is_finished());
        assert_eq!(block.bytes_per_row() * block.height as usize, 32);
        assert_eq!(block.data_size, 32);
        assert_eq!(warnings(&rows), 0);

        let labels: Vec<_> = rows.iter().take(6).map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Format", "Class", "Left offset", "Top offset", "Width", "Height"]);
        assert_eq!(rows[2].description, "-1");
        assert_eq!(rows[4].sequence, "00 10");
        // 32 raster bytes in two binary rows
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[6].offset, Some(10));
    }

    #[test]
    fn test_mismatched_width_is_invalid() {
        let data = bitmap(24, 16, &[0xF0; 32]);
        let (rows, outcome, block) = run(&data, 42, &FontCharConfig::default(), false);

        assert!(!outcome.valid);
        assert!(outcome.continuation.is_none());
        assert_eq!(block.stage, Stage::EndOk);
        assert_eq!(warnings(&rows), 1);
        let consumed: usize = rows
            .iter()
            .filter(|r| r.category == RowCategory::Binary)
            .map(|r| r.sequence.split(' ').count())
            .sum();
        assert_eq!(consumed, 32);
    }

    #[test]
    fn test_invalid_format_class() {
        let data = [1u8, 7, 0, 0, 0, 0];
        let (rows, outcome, _) = run(&data, 6, &FontCharConfig::default(), false);
        assert!(!outcome.valid);
        assert_eq!(warnings(&rows), 1);
        assert_eq!(rows[0].category, RowCategory::Warning);
        assert_eq!(rows[1].category, RowCategory::Binary);
        assert_eq!(rows[1].sequence, "01 07 00 00 00 00");
    }

    #[test]
    fn test_header_split_backtracks_without_output() {
        let data = bitmap(16, 16, &[0xF0; 32]);
        let (rows, outcome, block) = run(&data[..6], 42, &FontCharConfig::default(), false);
        assert!(rows.is_empty());
        assert_eq!(block.stage, Stage::Start);
        let cont = outcome.continuation.expect("backtrack");
        assert!(cont.is_backtrack());

        let (rows, outcome, _) = run(&data[..1], 42, &FontCharConfig::default(), false);
        assert!(rows.is_empty());
        assert!(outcome.continuation.is_some_and(|c| c.is_backtrack()));
    }

    #[test]
    fn test_remainder_continues_across_buffers() {
        let data = bitmap(16, 16, &[0x0F; 32]);
        let config = FontCharConfig::default();
        let mut rows = Vec::new();
        let mut block = FontCharBlock::new(42);

        let first = &data[..20];
        let mut cursor = ParseCursor::whole(first, 0);
        let outcome = analyse(first, &mut cursor, &mut block, &config, &mut rows);
        assert_eq!(
            outcome.continuation.map(|c| c.resume),
            Some(Resume::Continue { outstanding: 32 })
        );
        // Header consumed, partial raster slice kept back
        assert_eq!(cursor.buffer_offset, 10);
        assert_eq!(block.stage, Stage::ShowRemainder);

        let rest = &data[10..];
        let mut cursor = ParseCursor::whole(rest, 10);
        let outcome = analyse(rest, &mut cursor, &mut block, &config, &mut rows);
        assert!(outcome.valid);
        assert!(outcome.continuation.is_none());

        let (whole, _, _) = run(&data, 42, &config, false);
        assert_eq!(rows, whole);
    }

    #[test]
    fn test_truncated_at_end_of_stream_warns_once() {
        let data = bitmap(16, 16, &[0xAA; 20]);
        let (rows, outcome, block) = run(&data, 42, &FontCharConfig::default(), true);
        assert!(!outcome.valid);
        assert!(block.is_finished());
        assert_eq!(warnings(&rows), 1);
    }

    #[test]
    fn test_draws_bitmap_shape() {
        let config = FontCharConfig {
            draw_chars: true,
            ..FontCharConfig::default()
        };
        let data = bitmap(10, 2, &[0b1010_0000, 0b0100_0000, 0xFF, 0x00]);
        let declared = data.len() as u32;

        let (rows, outcome, _) = run(&data[..12], declared, &config, false);
        assert!(rows.is_empty());
        assert!(outcome.continuation.is_some_and(|c| c.is_backtrack()));

        let (rows, outcome, _) = run(&data, declared, &config, false);
        assert!(outcome.valid);
        let shapes: Vec<_> = rows
            .iter()
            .filter(|r| r.label == "Shape")
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(shapes, vec!["#.#......#", "########.."]);
    }

    #[test]
    fn test_oversized_character_is_not_drawn() {
        let config = FontCharConfig {
            draw_chars: true,
            max_width: 8,
            ..FontCharConfig::default()
        };
        let data = bitmap(16, 16, &[0xF0; 32]);
        let (rows, outcome, _) = run(&data[..20], 42, &config, false);
        assert!(!rows.is_empty());
        assert!(!outcome.continuation.is_some_and(|c| c.is_backtrack()));
        assert!(rows.iter().all(|r| r.label != "Shape"));
    }

    #[test]
    fn test_truetype_classes() {
        // class 2: size, LSB, AW, TSB, glyph id, 2 bytes of glyph data
        let mut data = vec![1u8, 2];
        data.extend_from_slice(&12u16.to_be_bytes());
        data.extend_from_slice(&(-5i16).to_be_bytes());
        data.extend_from_slice(&600u16.to_be_bytes());
        data.extend_from_slice(&7i16.to_be_bytes());
        data.extend_from_slice(&0x0102u16.to_be_bytes());
        data.extend_from_slice(&[0xAB, 0xCD]);
        let (rows, outcome, _) = run(&data, data.len() as u32, &FontCharConfig::default(), false);
        assert!(outcome.valid);
        let fields: Vec<_> = rows
            .iter()
            .filter(|r| r.category == RowCategory::Text)
            .map(|r| (r.label.as_str(), r.description.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Format", "1: TrueType"),
                ("Class", "2: TrueType with vertical metrics"),
                ("Data size", "12"),
                ("Left side bearing", "-5"),
                ("Advance width", "600"),
                ("Top side bearing", "7"),
                ("Glyph ID", "258"),
            ]
        );

        // class 0 with a data size that disagrees with the declared length
        let data = [1u8, 0, 0x00, 0x09, 0x00, 0x01, 0xEE];
        let (rows, outcome, _) = run(&data, 7, &FontCharConfig::default(), false);
        assert!(!outcome.valid);
        assert_eq!(warnings(&rows), 1);
    }

    #[test]
    fn test_step_is_pure_transition() {
        let data = bitmap(16, 16, &[0; 32]);
        let config = FontCharConfig::default();
        let mut block = FontCharBlock::new(42);
        let input = StepInput {
            window: &data,
            end_of_stream: false,
            config: &config,
        };
        let t = block.step(&input);
        assert_eq!(t.next, Stage::CheckHeader);
        assert_eq!(t.consume, 0);
        assert!(t.effects.is_empty());
        assert_eq!(block.header_len, 8);
    }
}
