use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use prn_parser::text::{self, TextConfig, TextParseMethod, TextResume};
use prn_parser::{ParseCursor, PclXlDecoder, StreamDecoder, TagStats, XlConfig};

fn generate_pjl(size: usize) -> Vec<u8> {
    let lines = [
        "@PJL SET RESOLUTION = 600\r\n",
        "@PJL SET DUPLEX = OFF\r\n",
        "@PJL COMMENT Benchmark job\r\n",
        "@PJL SET PAPER = A4\r\n",
    ];
    let mut data = b"\x1b%-12345X".to_vec();
    let mut i = 0;
    while data.len() < size {
        data.extend_from_slice(lines[i % lines.len()].as_bytes());
        i += 1;
    }
    data.truncate(size);
    data
}

fn generate_pclxl(size: usize) -> Vec<u8> {
    let mut data = b") HP-PCL XL;2;0\n".to_vec();
    data.push(0x41);
    while data.len() < size {
        // uint16_xy, attr_ubyte Point, SetCursor
        data.extend_from_slice(&[0xD1, 0x00, 0x64, 0x00, 0xC8, 0xF8, 0x4C, 0x6B]);
        // ubyte_array "Text", attr_ubyte TextData, Text
        data.extend_from_slice(&[0xC8, 0xC0, 0x04, b'T', b'e', b'x', b't', 0xF8, 0xAB, 0xA8]);
        // ReadImage with 32 bytes of embedded data
        data.extend_from_slice(&[0xB1, 0xFB, 0x20]);
        data.extend_from_slice(&[0x5A; 32]);
    }
    data
}

fn generate_utf8(size: usize) -> Vec<u8> {
    "Grüße, 世界! Καλημέρα. "
        .as_bytes()
        .iter()
        .cycle()
        .take(size)
        .copied()
        .collect()
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("text");

    let pjl = generate_pjl(64 * 1024);
    group.throughput(Throughput::Bytes(pjl.len() as u64));
    group.bench_function("pjl_lines", |b| {
        b.iter(|| {
            let mut decoder = StreamDecoder::new(TextConfig::default(), XlConfig::default());
            let mut stats = TagStats::new();
            let mut rows = Vec::new();
            let mut cursor = ParseCursor::whole(&pjl, 0).at_end_of_stream(true);
            decoder.decode(black_box(&pjl), &mut cursor, None, &mut stats, &mut rows);
            black_box(rows)
        })
    });

    let utf8 = generate_utf8(64 * 1024);
    let config = TextConfig {
        method: TextParseMethod::Utf8,
        ..TextConfig::default()
    };
    group.throughput(Throughput::Bytes(utf8.len() as u64));
    group.bench_function("utf8", |b| {
        b.iter(|| {
            let mut rows = Vec::new();
            let mut cursor = ParseCursor::whole(&utf8, 0).at_end_of_stream(true);
            text::decode_lines(black_box(&utf8), &mut cursor, &config, TextResume::default(), &mut rows);
            black_box(rows)
        })
    });

    group.finish();
}

fn bench_pclxl(c: &mut Criterion) {
    let mut group = c.benchmark_group("pclxl");

    let xl = generate_pclxl(64 * 1024);
    group.throughput(Throughput::Bytes(xl.len() as u64));
    group.bench_function("operators", |b| {
        b.iter(|| {
            let mut decoder = PclXlDecoder::new(XlConfig::default());
            let mut stats = TagStats::new();
            let mut rows = Vec::new();
            let mut cursor = ParseCursor::whole(&xl, 0).at_end_of_stream(true);
            decoder.decode(black_box(&xl), &mut cursor, None, &mut stats, &mut rows);
            black_box(rows)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_text, bench_pclxl);
criterion_main!(benches);
