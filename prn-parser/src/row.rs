//! Decoded output rows
//!
//! The decoder only ever appends rows to a [`RowSink`]; it never reads them
//! back.

use std::fmt::Write as _;

use serde::Serialize;

/// Row classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowCategory {
    Binary,
    Text,
    ControlCode,
    Operator,
    Warning,
    Error,
}

/// One line of analysis output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRow {
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub category: RowCategory,
    /// Type or mnemonic
    pub label: String,
    /// Raw sequence or hex preview
    pub sequence: String,
    pub description: String,
    /// Later slice of a logical line split at the maximum width
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub continued: bool,
}

impl DecodedRow {
    pub fn new(level: u8, offset: u64, category: RowCategory) -> Self {
        Self {
            level,
            offset: Some(offset),
            category,
            label: String::new(),
            sequence: String::new(),
            description: String::new(),
            continued: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn continued(mut self, continued: bool) -> Self {
        self.continued = continued;
        self
    }
}

/// Append-only destination for rows
pub trait RowSink {
    fn push(&mut self, row: DecodedRow);
}

impl RowSink for Vec<DecodedRow> {
    fn push(&mut self, row: DecodedRow) {
        Vec::push(self, row);
    }
}

/// How offsets are shown in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetFormat {
    #[default]
    Decimal,
    Hexadecimal,
    Off,
}

impl OffsetFormat {
    pub fn format(self, offset: Option<u64>) -> String {
        match (self, offset) {
            (OffsetFormat::Off, _) | (_, None) => String::new(),
            (OffsetFormat::Decimal, Some(o)) => format!("{o:>10}"),
            (OffsetFormat::Hexadecimal, Some(o)) => format!("{o:08X}"),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dec" | "decimal" => Some(OffsetFormat::Decimal),
            "hex" | "hexadecimal" => Some(OffsetFormat::Hexadecimal),
            "none" | "off" => Some(OffsetFormat::Off),
            _ => None,
        }
    }
}

/// Maximum raw bytes shown in a multi-byte preview
pub const PREVIEW_BYTES: usize = 4;

/// `0x` + uppercase hex of the first four bytes, `...` if there are more
pub fn hex_preview(bytes: &[u8]) -> String {
    let mut out = String::from("0x");
    for b in bytes.iter().take(PREVIEW_BYTES) {
        let _ = write!(out, "{b:02X}");
    }
    if bytes.len() > PREVIEW_BYTES {
        out.push_str("...");
    }
    out
}

/// Space-separated uppercase hex dump
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}
