//! PCL XL operator tag table
//!
//! Every byte 0x00-0xFF resolves to exactly one entry: a named operator, a
//! `* Reserved *` slot inside the operator range, or the shared "unknown"
//! sentinel. The table is a compile-time literal indexed by byte value; usage
//! counters are kept separately in [`crate::stats::TagStats`].

use serde::Serialize;

use crate::error::{Error, Result};

/// Kind of binary payload that follows an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EmbeddedDataKind {
    None,
    Stream,
    PassThrough,
    FontHeader,
    FontChar,
    DitherMatrix,
    PointList,
    Image,
    RasterPattern,
    Scan,
}

impl EmbeddedDataKind {
    /// Label used on binary rows of this kind
    pub fn label(self) -> &'static str {
        match self {
            EmbeddedDataKind::None => "Data",
            EmbeddedDataKind::Stream => "Stream data",
            EmbeddedDataKind::PassThrough => "PassThrough data",
            EmbeddedDataKind::FontHeader => "Font header data",
            EmbeddedDataKind::FontChar => "Font char data",
            EmbeddedDataKind::DitherMatrix => "Dither matrix data",
            EmbeddedDataKind::PointList => "Point list data",
            EmbeddedDataKind::Image => "Image data",
            EmbeddedDataKind::RasterPattern => "Raster pattern data",
            EmbeddedDataKind::Scan => "Scan line data",
        }
    }
}

/// What an operator means for page-level tooling (overlay conversion etc.)
///
/// Opaque to the decoder; callers apply their own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SideEffectHint {
    None,
    PageBegin,
    PageEnd,
    PageMark,
    Remove,
    Illegal,
    Adjust,
}

/// Metadata for one tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperatorTagEntry {
    pub tag: u8,
    pub is_end_session: bool,
    pub is_reserved: bool,
    pub embedded: EmbeddedDataKind,
    pub hint: SideEffectHint,
    pub description: &'static str,
}

impl OperatorTagEntry {
    const fn op(tag: u8, description: &'static str) -> Self {
        Self {
            tag,
            is_end_session: false,
            is_reserved: false,
            embedded: EmbeddedDataKind::None,
            hint: SideEffectHint::None,
            description,
        }
    }

    const fn reserved(tag: u8) -> Self {
        Self {
            is_reserved: true,
            ..Self::op(tag, RESERVED_DESCRIPTION)
        }
    }

    const fn embeds(self, embedded: EmbeddedDataKind) -> Self {
        Self { embedded, ..self }
    }

    const fn hint(self, hint: SideEffectHint) -> Self {
        Self { hint, ..self }
    }

    const fn end_session(self) -> Self {
        Self {
            is_end_session: true,
            ..self
        }
    }
}

pub const RESERVED_DESCRIPTION: &str = "* Reserved *";
pub const UNKNOWN_DESCRIPTION: &str = "*** Unknown tag ***";

/// First and last byte of the operator range
pub const OPERATOR_FIRST: u8 = 0x41;
pub const OPERATOR_LAST: u8 = 0xBF;

/// Shared entry for every byte the protocol never assigned
pub static UNKNOWN: OperatorTagEntry = OperatorTagEntry::op(0x00, UNKNOWN_DESCRIPTION);

use EmbeddedDataKind as E;
use OperatorTagEntry as T;
use SideEffectHint as H;

/// Registered entries in ascending tag order
const ENTRIES: &[OperatorTagEntry] = &[
    T::op(0x41, "BeginSession").hint(H::Remove),
    T::op(0x42, "EndSession").end_session().hint(H::Remove),
    T::op(0x43, "BeginPage").hint(H::PageBegin),
    T::op(0x44, "EndPage").hint(H::PageEnd),
    T::reserved(0x45),
    T::op(0x46, "VendorUnique"),
    T::op(0x47, "Comment"),
    T::op(0x48, "OpenDataSource").hint(H::Remove),
    T::op(0x49, "CloseDataSource").hint(H::Remove),
    T::op(0x4A, "EchoComment"),
    T::op(0x4B, "Query"),
    T::op(0x4C, "Diagnostic3"),
    T::reserved(0x4D),
    T::reserved(0x4E),
    T::op(0x4F, "BeginFontHeader"),
    T::op(0x50, "ReadFontHeader").embeds(E::FontHeader),
    T::op(0x51, "EndFontHeader"),
    T::op(0x52, "BeginChar"),
    T::op(0x53, "ReadChar").embeds(E::FontChar),
    T::op(0x54, "EndChar"),
    T::op(0x55, "RemoveFont").hint(H::Illegal),
    T::op(0x56, "SetCharAttributes"),
    T::op(0x57, "SetDefaultGS"),
    T::op(0x58, "SetColorTreatment"),
    T::op(0x59, "SetGlobalAttributes"),
    T::op(0x5A, "ClearGlobalAttributes"),
    T::op(0x5B, "BeginStream").hint(H::Illegal),
    T::op(0x5C, "ReadStream").embeds(E::Stream).hint(H::Illegal),
    T::op(0x5D, "EndStream").hint(H::Illegal),
    T::op(0x5E, "ExecStream"),
    T::op(0x5F, "RemoveStream").hint(H::Illegal),
    T::op(0x60, "PopGS"),
    T::op(0x61, "PushGS"),
    T::op(0x62, "SetClipReplace"),
    T::op(0x63, "SetBrushSource"),
    T::op(0x64, "SetCharAngle"),
    T::op(0x65, "SetCharScale"),
    T::op(0x66, "SetCharShear"),
    T::op(0x67, "SetClipIntersect"),
    T::op(0x68, "SetClipRectangle"),
    T::op(0x69, "SetClipToPage"),
    T::op(0x6A, "SetColorSpace"),
    T::op(0x6B, "SetCursor"),
    T::op(0x6C, "SetCursorRel"),
    T::op(0x6D, "SetHalftoneMethod").embeds(E::DitherMatrix),
    T::op(0x6E, "SetFillMode"),
    T::op(0x6F, "SetFont"),
    T::op(0x70, "SetLineDash"),
    T::op(0x71, "SetLineCap"),
    T::op(0x72, "SetLineJoin"),
    T::op(0x73, "SetMiterLimit"),
    T::op(0x74, "SetPageDefaultCTM").hint(H::Adjust),
    T::op(0x75, "SetPageOrigin").hint(H::Adjust),
    T::op(0x76, "SetPageRotation").hint(H::Adjust),
    T::op(0x77, "SetPageScale").hint(H::Adjust),
    T::op(0x78, "SetPatternTxMode"),
    T::op(0x79, "SetPenSource"),
    T::op(0x7A, "SetPenWidth"),
    T::op(0x7B, "SetROP"),
    T::op(0x7C, "SetSourceTxMode"),
    T::op(0x7D, "SetCharBoldValue"),
    T::op(0x7E, "SetNeutralAxis"),
    T::op(0x7F, "SetClipMode"),
    T::op(0x80, "SetPathToClip"),
    T::op(0x81, "SetCharSubMode"),
    T::op(0x82, "BeginUserDefinedLineCap"),
    T::op(0x83, "EndUserDefinedLineCap"),
    T::op(0x84, "CloseSubPath"),
    T::op(0x85, "NewPath"),
    T::op(0x86, "PaintPath").hint(H::PageMark),
    T::reserved(0x87),
    T::reserved(0x88),
    T::reserved(0x89),
    T::reserved(0x8A),
    T::reserved(0x8B),
    T::reserved(0x8C),
    T::reserved(0x8D),
    T::reserved(0x8E),
    T::reserved(0x8F),
    T::reserved(0x90),
    T::op(0x91, "ArcPath"),
    T::op(0x92, "SetColorTrapping"),
    T::op(0x93, "BezierPath").embeds(E::PointList),
    T::op(0x94, "SetAdaptiveHalftoning"),
    T::op(0x95, "BezierRelPath").embeds(E::PointList),
    T::op(0x96, "Chord").hint(H::PageMark),
    T::op(0x97, "ChordPath"),
    T::op(0x98, "Ellipse").hint(H::PageMark),
    T::op(0x99, "EllipsePath"),
    T::reserved(0x9A),
    T::op(0x9B, "LinePath").embeds(E::PointList),
    T::reserved(0x9C),
    T::op(0x9D, "LineRelPath").embeds(E::PointList),
    T::op(0x9E, "Pie").hint(H::PageMark),
    T::op(0x9F, "PiePath"),
    T::op(0xA0, "Rectangle").hint(H::PageMark),
    T::op(0xA1, "RectanglePath"),
    T::op(0xA2, "RoundRectangle").hint(H::PageMark),
    T::op(0xA3, "RoundRectanglePath"),
    T::reserved(0xA4),
    T::reserved(0xA5),
    T::reserved(0xA6),
    T::reserved(0xA7),
    T::op(0xA8, "Text").hint(H::PageMark),
    T::op(0xA9, "TextPath"),
    T::reserved(0xAA),
    T::reserved(0xAB),
    T::reserved(0xAC),
    T::reserved(0xAD),
    T::reserved(0xAE),
    T::reserved(0xAF),
    T::op(0xB0, "BeginImage"),
    T::op(0xB1, "ReadImage").embeds(E::Image).hint(H::PageMark),
    T::op(0xB2, "EndImage"),
    T::op(0xB3, "BeginRastPattern"),
    T::op(0xB4, "ReadRastPattern").embeds(E::RasterPattern),
    T::op(0xB5, "EndRastPattern"),
    T::op(0xB6, "BeginScan"),
    T::reserved(0xB7),
    T::op(0xB8, "EndScan"),
    T::op(0xB9, "ScanLineRel").embeds(E::Scan).hint(H::PageMark),
    T::reserved(0xBA),
    T::reserved(0xBB),
    T::reserved(0xBC),
    T::reserved(0xBD),
    T::reserved(0xBE),
    T::op(0xBF, "PassThrough").embeds(E::PassThrough).hint(H::PageMark),
];

const NOT_REGISTERED: u8 = u8::MAX;

/// Byte value -> position in `ENTRIES`
static INDEX: [u8; 256] = build_index();

const fn build_index() -> [u8; 256] {
    let mut index = [NOT_REGISTERED; 256];
    let mut i = 0;
    while i < ENTRIES.len() {
        index[ENTRIES[i].tag as usize] = i as u8;
        i += 1;
    }
    index
}

/// Number of registered entries (the sentinel is not counted)
pub fn registered_count() -> usize {
    ENTRIES.len()
}

/// All registered entries in ascending tag order
pub fn entries() -> &'static [OperatorTagEntry] {
    ENTRIES
}

/// Slot of a tag in the registered list, `None` for the sentinel
pub(crate) fn slot(tag: u8) -> Option<usize> {
    match INDEX[tag as usize] {
        NOT_REGISTERED => None,
        i => Some(i as usize),
    }
}

/// Look up a tag byte; unregistered bytes resolve to [`UNKNOWN`]
pub fn lookup(tag: u8) -> (bool, &'static OperatorTagEntry) {
    match slot(tag) {
        Some(i) => (true, &ENTRIES[i]),
        None => (false, &UNKNOWN),
    }
}

/// Description of a tag, falling back to the sentinel's
pub fn describe(tag: u8) -> &'static str {
    lookup(tag).1.description
}

/// Description of a tag, failing for bytes never registered
pub fn describe_known(tag: u8) -> Result<&'static str> {
    match lookup(tag) {
        (true, entry) => Ok(entry.description),
        (false, _) => Err(Error::UnknownTag(tag)),
    }
}
