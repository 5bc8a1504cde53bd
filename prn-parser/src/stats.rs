//! Per-session tag usage counters
//!
//! The tag table itself is immutable; each analysis owns one `TagStats`, so two
//! analyses never share counters.

use serde::Serialize;

use crate::tags::{self, OperatorTagEntry};

/// Counters for one tag slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// Uses at analysis level 0
    pub parent: u32,
    /// Uses at any deeper level
    pub child: u32,
    pub total: u32,
}

impl TagCount {
    fn is_zero(&self) -> bool {
        self.total == 0
    }
}

/// One line of the statistics summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    /// `None` for the unknown sentinel
    pub tag: Option<u8>,
    pub description: &'static str,
    pub parent: u32,
    pub child: u32,
    pub total: u32,
}

/// Usage counters for every registered tag plus the sentinel
#[derive(Debug, Clone)]
pub struct TagStats {
    /// Indexed like the registered entries; the last slot is the sentinel
    counts: Vec<TagCount>,
}

impl Default for TagStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TagStats {
    pub fn new() -> Self {
        Self {
            counts: vec![TagCount::default(); tags::registered_count() + 1],
        }
    }

    fn sentinel_slot(&self) -> usize {
        self.counts.len() - 1
    }

    fn slot(&self, tag: u8) -> usize {
        tags::slot(tag).unwrap_or_else(|| self.sentinel_slot())
    }

    /// Count one use of `tag` seen at analysis `level`
    pub fn record(&mut self, tag: u8, level: u8) {
        let slot = self.slot(tag);
        let count = &mut self.counts[slot];
        if level == 0 {
            count.parent = count.parent.saturating_add(1);
        } else {
            count.child = count.child.saturating_add(1);
        }
        count.total = count.total.saturating_add(1);
    }

    /// Counters for a tag (the sentinel's for unregistered bytes)
    pub fn count(&self, tag: u8) -> TagCount {
        self.counts[self.slot(tag)]
    }

    /// Counters of the unknown sentinel
    pub fn unknown_count(&self) -> TagCount {
        self.counts[self.sentinel_slot()]
    }

    /// Zero every counter, including the sentinel
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = TagCount::default());
    }

    /// Sum of all totals
    pub fn grand_total(&self) -> u64 {
        self.counts.iter().map(|c| c.total as u64).sum()
    }

    /// Summary rows: sentinel first, then registered tags in ascending order.
    ///
    /// Zero rows are dropped unless `include_zero`; when they are kept,
    /// `exclude_unused_reserved` still drops zero-count reserved slots.
    pub fn summarize(&self, include_zero: bool, exclude_unused_reserved: bool) -> Vec<TagSummary> {
        let keep = |count: &TagCount, reserved: bool| {
            if !count.is_zero() {
                true
            } else if !include_zero {
                false
            } else {
                !(reserved && exclude_unused_reserved)
            }
        };

        let mut rows = Vec::new();

        let unknown = self.unknown_count();
        if keep(&unknown, false) {
            rows.push(summary_row(None, &tags::UNKNOWN, unknown));
        }

        for (entry, count) in tags::entries().iter().zip(&self.counts) {
            if keep(count, entry.is_reserved) {
                rows.push(summary_row(Some(entry.tag), entry, *count));
            }
        }

        rows
    }
}

fn summary_row(tag: Option<u8>, entry: &OperatorTagEntry, count: TagCount) -> TagSummary {
    TagSummary {
        tag,
        description: entry.description,
        parent: count.parent,
        child: count.child,
        total: count.total,
    }
}
