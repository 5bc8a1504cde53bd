#![no_main]

use libfuzzer_sys::fuzz_target;
use prn_parser::{
    Continuation, DecodedRow, ParseCursor, StreamDecoder, TagStats, TextConfig, XlConfig,
};

/// Feed `data` in pieces of `chunk` bytes, keeping unconsumed bytes
fn decode(data: &[u8], chunk: usize) -> Vec<DecodedRow> {
    let mut decoder = StreamDecoder::new(TextConfig::default(), XlConfig::default());
    let mut stats = TagStats::new();
    let mut rows = Vec::new();
    let mut window: Vec<u8> = Vec::new();
    let mut offset = 0u64;
    let mut pending: Option<Continuation> = None;

    for (i, piece) in data.chunks(chunk.max(1)).enumerate() {
        window.extend_from_slice(piece);
        let last = (i + 1) * chunk.max(1) >= data.len();
        let mut cursor = ParseCursor::whole(&window, offset).at_end_of_stream(last);
        let outcome = decoder.decode(&window, &mut cursor, pending.take(), &mut stats, &mut rows);
        pending = outcome.continuation;
        window.drain(..cursor.buffer_offset);
        offset += cursor.buffer_offset as u64;
    }

    // Decoders never suspend at end of stream
    assert!(pending.is_none());
    assert!(window.is_empty());
    rows
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let chunk = data[0] as usize % 17 + 1;
    let whole = decode(data, data.len());
    let split = decode(data, chunk);

    // Output must not depend on buffer boundaries
    assert_eq!(whole, split);
});
