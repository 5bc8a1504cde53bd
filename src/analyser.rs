//! Chunked analysis driver
//!
//! Reads a print job in fixed-size chunks and feeds them to the stream
//! decoder. Bytes the decoder leaves unconsumed stay in a window and are
//! delivered again, followed by the next chunk, together with the returned
//! continuation.

use std::io::{ErrorKind, Read};

use serde::Serialize;

use prn_parser::binary::binary_row;
use prn_parser::{Continuation, DecodedRow, EmbeddedDataKind, ParseCursor, StreamDecoder, TagStats};

use crate::config::{AnalyserConfig, MAX_CHUNK_SIZE};
use crate::error::Result;

/// Everything one analysis produced
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub rows: Vec<DecodedRow>,
    #[serde(skip)]
    pub stats: TagStats,
    /// `BeginPage` operators seen
    pub pages: u32,
    pub page_marked: bool,
    /// Bytes read from the input
    pub bytes: u64,
}

pub struct Analyser {
    config: AnalyserConfig,
}

impl Analyser {
    pub fn new(config: AnalyserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Chunk length actually used, whatever the unvalidated config says
    fn chunk_size(&self) -> usize {
        self.config.chunk_size.clamp(1, MAX_CHUNK_SIZE)
    }

    /// Analyse everything `reader` yields
    pub fn analyse_reader<R: Read>(&self, mut reader: R) -> Result<Analysis> {
        let mut session = Session::new(&self.config, self.chunk_size());
        let mut chunk = vec![0u8; self.chunk_size()];

        loop {
            let n = match reader.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                break;
            }
            session.feed(&chunk[..n], false);
        }

        Ok(session.finish())
    }

    /// Analyse an in-memory job, chunked the same way as a reader
    pub fn analyse_bytes(&self, data: &[u8]) -> Analysis {
        let mut session = Session::new(&self.config, self.chunk_size());
        for chunk in data.chunks(self.chunk_size()) {
            session.feed(chunk, false);
        }
        session.finish()
    }
}

/// State of one analysis between chunks
struct Session {
    decoder: StreamDecoder,
    stats: TagStats,
    rows: Vec<DecodedRow>,
    /// Unconsumed bytes followed by the newest chunk
    window: Vec<u8>,
    /// Absolute offset of `window[0]`
    offset: u64,
    pending: Option<Continuation>,
    bytes: u64,
    slice_len: usize,
}

impl Session {
    fn new(config: &AnalyserConfig, chunk_size: usize) -> Self {
        Self {
            decoder: StreamDecoder::new(config.text_config(), config.xl_config()),
            stats: TagStats::new(),
            rows: Vec::new(),
            window: Vec::with_capacity(chunk_size * 2),
            offset: 0,
            pending: None,
            bytes: 0,
            slice_len: config.binary_slice_len,
        }
    }

    fn feed(&mut self, chunk: &[u8], end_of_stream: bool) {
        self.bytes += chunk.len() as u64;
        self.window.extend_from_slice(chunk);

        let mut cursor = ParseCursor::whole(&self.window, self.offset).at_end_of_stream(end_of_stream);
        let outcome = self.decoder.decode(
            &self.window,
            &mut cursor,
            self.pending.take(),
            &mut self.stats,
            &mut self.rows,
        );

        if let Some(cont) = &outcome.continuation {
            log::trace!(
                "suspended at {} ({:?}, {:?})",
                cursor.position(),
                cont.kind(),
                cont.resume
            );
        }
        self.pending = outcome.continuation;

        let consumed = cursor.buffer_offset;
        self.window.drain(..consumed);
        self.offset += consumed as u64;
    }

    fn finish(mut self) -> Analysis {
        self.feed(&[], true);

        if let Some(cont) = self.pending.take() {
            log::warn!("stream ended with a pending {:?} unit", cont.kind());
        }
        if !self.window.is_empty() {
            log::warn!("{} trailing byte(s) left undecoded", self.window.len());
            for (i, slice) in self.window.chunks(self.slice_len.max(1)).enumerate() {
                let at = self.offset + (i * self.slice_len.max(1)) as u64;
                self.rows.push(binary_row(0, at, EmbeddedDataKind::None, slice));
            }
        }

        log::debug!(
            "analysed {} bytes: {} rows, {} page(s)",
            self.bytes,
            self.rows.len(),
            self.decoder.pages()
        );

        Analysis {
            rows: self.rows,
            stats: self.stats,
            pages: self.decoder.pages(),
            page_marked: self.decoder.page_marked(),
            bytes: self.bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prn_parser::RowCategory;

    const JOB: &[u8] = b"\x1b%-12345X@PJL JOB NAME=\"test\"\r\n@PJL ENTER LANGUAGE=PCLXL\r\n) HP-PCL XL;2;0\n\x41\x43\xC0\x01\xF8\x26\x44\x42\x1b%-12345X";

    fn analyser(chunk_size: usize) -> Analyser {
        Analyser::new(AnalyserConfig {
            chunk_size,
            ..AnalyserConfig::default()
        })
    }

    #[test]
    fn test_chunk_size_does_not_change_rows() {
        let whole = analyser(4096).analyse_bytes(JOB);
        for size in [1, 2, 3, 7, 16] {
            let chunked = analyser(size).analyse_bytes(JOB);
            assert_eq!(chunked.rows, whole.rows, "chunk size {size}");
        }
    }

    #[test]
    fn test_reader_matches_bytes() {
        let a = analyser(5);
        let from_reader = a.analyse_reader(JOB).unwrap();
        let from_bytes = a.analyse_bytes(JOB);
        assert_eq!(from_reader.rows, from_bytes.rows);
        assert_eq!(from_reader.bytes, JOB.len() as u64);
    }

    #[test]
    fn test_pages_and_stats() {
        let analysis = analyser(64).analyse_bytes(JOB);
        assert_eq!(analysis.pages, 1);
        assert_eq!(analysis.stats.count(0x43).total, 1);
        assert_eq!(analysis.stats.count(0x44).total, 1);
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyser(16).analyse_bytes(b"");
        assert!(analysis.rows.is_empty());
        assert_eq!(analysis.bytes, 0);
    }

    #[test]
    fn test_oversized_chunk_is_clamped() {
        let whole = analyser(4096).analyse_bytes(JOB);
        let huge = analyser(usize::MAX);
        assert_eq!(huge.analyse_bytes(JOB).rows, whole.rows);
        assert_eq!(huge.analyse_reader(JOB).unwrap().rows, whole.rows);
    }

    #[test]
    fn test_truncated_xl_reports_error() {
        let data = b"( HP-PCL XL;2;0\n\x41\xC1\x01";
        let analysis = analyser(4).analyse_bytes(data);
        assert!(analysis.rows.iter().any(|r| r.category == RowCategory::Error));
    }
}
