//! Text and JSON rendering of an analysis

use std::fmt::Write as _;

use serde::Serialize;

use prn_parser::{DecodedRow, OffsetFormat, TagSummary};

use crate::analyser::Analysis;
use crate::config::StatsSettings;
use crate::error::Result;

const LABEL_WIDTH: usize = 20;
const SEQUENCE_WIDTH: usize = 24;

/// Report renderer
#[derive(Debug, Clone, Copy)]
pub struct Report {
    offset_format: OffsetFormat,
    stats: StatsSettings,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    bytes: u64,
    pages: u32,
    page_marked: bool,
    rows: &'a [DecodedRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Vec<TagSummary>>,
}

impl Report {
    pub fn new(offset_format: OffsetFormat, stats: StatsSettings) -> Self {
        Self { offset_format, stats }
    }

    /// One line per row, then the statistics table when enabled
    pub fn render_text(&self, analysis: &Analysis) -> String {
        let mut out = String::new();
        for row in &analysis.rows {
            self.write_row(&mut out, row);
        }

        if self.stats.show {
            out.push('\n');
            let _ = writeln!(
                out,
                "{} byte(s), {} page(s), {} tag use(s)",
                analysis.bytes,
                analysis.pages,
                analysis.stats.grand_total()
            );
            out.push_str(&render_summary(&self.summarize(analysis)));
        }
        out
    }

    pub fn render_json(&self, analysis: &Analysis) -> Result<String> {
        let report = JsonReport {
            bytes: analysis.bytes,
            pages: analysis.pages,
            page_marked: analysis.page_marked,
            rows: &analysis.rows,
            stats: self.stats.show.then(|| self.summarize(analysis)),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn summarize(&self, analysis: &Analysis) -> Vec<TagSummary> {
        analysis
            .stats
            .summarize(self.stats.include_zero, self.stats.exclude_unused_reserved)
    }

    fn write_row(&self, out: &mut String, row: &DecodedRow) {
        let offset = self.offset_format.format(row.offset);
        if self.offset_format != OffsetFormat::Off {
            let width = match self.offset_format {
                OffsetFormat::Hexadecimal => 8,
                _ => 10,
            };
            let _ = write!(out, "{offset:>width$}  ");
        }

        let indent = "  ".repeat(row.level as usize);
        let label = if row.continued { "" } else { row.label.as_str() };
        let line = format!(
            "{indent}{label:<LABEL_WIDTH$} {:<SEQUENCE_WIDTH$} {}",
            row.sequence, row.description
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// Tag statistics as a fixed-width table
pub fn render_summary(rows: &[TagSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6}{:>8}{:>8}{:>8}  Description", "Tag", "Parent", "Child", "Total");
    for row in rows {
        let tag = row.tag.map_or_else(|| "----".to_string(), |t| format!("0x{t:02X}"));
        let _ = writeln!(
            out,
            "{tag:<6}{:>8}{:>8}{:>8}  {}",
            row.parent, row.child, row.total, row.description
        );
    }
    out
}
