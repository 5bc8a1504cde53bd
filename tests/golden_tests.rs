//! End-to-end tests for the analyser
//!
//! Each test feeds a complete print job through [`Analyser`] and checks the
//! rows, page count and statistics it produces.

use prn_analyser::{Analyser, AnalyserConfig, Analysis, Report};
use prn_parser::{OffsetFormat, RowCategory, TextParseMethod};

const UEL: &[u8] = b"\x1b%-12345X";

fn job(pjl: &[&str], xl_body: &[u8]) -> Vec<u8> {
    let mut data = UEL.to_vec();
    for line in pjl {
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");
    }
    data.extend_from_slice(b") HP-PCL XL;2;0\n");
    data.extend_from_slice(xl_body);
    data.extend_from_slice(UEL);
    data
}

fn analyse(data: &[u8]) -> Analysis {
    Analyser::new(AnalyserConfig::default()).analyse_bytes(data)
}

fn analyse_with(data: &[u8], edit: impl FnOnce(&mut AnalyserConfig)) -> Analysis {
    let mut config = AnalyserConfig::default();
    edit(&mut config);
    Analyser::new(config).analyse_bytes(data)
}

fn labels(analysis: &Analysis) -> Vec<&str> {
    analysis.rows.iter().map(|r| r.label.as_str()).collect()
}

#[test]
fn test_two_page_job() {
    let data = job(
        &["@PJL JOB NAME=\"report\"", "@PJL ENTER LANGUAGE=PCLXL"],
        &[0x41, 0x43, 0x44, 0x43, 0x44, 0x42],
    );
    let analysis = analyse(&data);

    assert_eq!(analysis.pages, 2);
    assert_eq!(analysis.bytes, data.len() as u64);
    assert_eq!(analysis.stats.count(0x43).total, 2);
    assert_eq!(analysis.stats.count(0x43).parent, 2);
    assert_eq!(analysis.stats.count(0x41).total, 1);

    let uel = labels(&analysis).iter().filter(|l| **l == "UEL").count();
    assert_eq!(uel, 2);
    assert!(analysis
        .rows
        .iter()
        .any(|r| r.category == RowCategory::Text && r.description == "@PJL JOB NAME=\"report\""));
}

#[test]
fn test_offsets_are_absolute() {
    let data = job(&["@PJL ENTER LANGUAGE=PCLXL"], &[0x41, 0x42]);
    let analysis = analyse_with(&data, |c| c.chunk_size = 3);

    let begin = analysis
        .rows
        .iter()
        .find(|r| r.description == "BeginSession")
        .expect("BeginSession row");
    let expected = (UEL.len() + "@PJL ENTER LANGUAGE=PCLXL\r\n".len() + ") HP-PCL XL;2;0\n".len()) as u64;
    assert_eq!(begin.offset, Some(expected));

    let offsets: Vec<u64> = analysis.rows.iter().filter_map(|r| r.offset).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_chunk_size_independence() {
    let mut body = vec![0x41, 0x43];
    // ubyte_array of 20 printable bytes, attribute 0x26
    body.extend_from_slice(&[0xC8, 0xC0, 20]);
    body.extend_from_slice(b"abcdefghijklmnopqrst");
    body.extend_from_slice(&[0xF8, 0x26]);
    // ReadImage with 40 bytes of embedded data
    body.extend_from_slice(&[0xB1, 0xFB, 40]);
    body.extend_from_slice(&[0xA5; 40]);
    body.extend_from_slice(&[0xB2, 0x44, 0x42]);
    let data = job(&["@PJL SET RESOLUTION=600", "@PJL ENTER LANGUAGE=PCLXL"], &body);

    let whole = analyse_with(&data, |c| c.chunk_size = data.len());
    for size in [1, 2, 5, 13, 64] {
        let chunked = analyse_with(&data, |c| c.chunk_size = size);
        assert_eq!(chunked.rows, whole.rows, "chunk size {size}");
        assert_eq!(chunked.pages, whole.pages);
    }
}

#[test]
fn test_embedded_font_character() {
    let mut body = vec![0x41, 0x52, 0x53, 0xFB, 42, 0, 0];
    body.extend_from_slice(&0i16.to_be_bytes());
    body.extend_from_slice(&0i16.to_be_bytes());
    body.extend_from_slice(&16u16.to_be_bytes());
    body.extend_from_slice(&16u16.to_be_bytes());
    body.extend_from_slice(&[0x81; 32]);
    body.extend_from_slice(&[0x54, 0x42]);
    let data = job(&["@PJL ENTER LANGUAGE=PCLXL"], &body);

    for size in [1, 4, 4096] {
        let analysis = analyse_with(&data, |c| {
            c.chunk_size = size;
            c.font.draw_chars = true;
        });
        assert!(analysis.rows.iter().any(|r| r.label == "Width" && r.description == "16"));
        assert!(analysis.rows.iter().all(|r| r.category != RowCategory::Warning));
        let shapes = analysis.rows.iter().filter(|r| r.label == "Shape").count();
        assert_eq!(shapes, 16, "chunk size {size}");
    }
}

#[test]
fn test_truncated_job_is_reported() {
    let mut data = job(&["@PJL ENTER LANGUAGE=PCLXL"], &[0x41, 0xB1, 0xFA, 0x00, 0x01, 0x00, 0x00]);
    // Drop the closing UEL and cut into the embedded data
    data.truncate(data.len() - UEL.len());
    data.extend_from_slice(&[1, 2, 3]);

    let analysis = analyse(&data);
    let last = analysis.rows.last().expect("rows");
    assert_eq!(last.category, RowCategory::Warning);
    assert!(last.description.contains("truncated"));
}

#[test]
fn test_utf8_text_lines() {
    let data = "@PJL COMMENT \"h\u{e9}llo \u{2603}\"\n".as_bytes().to_vec();
    let analysis = analyse_with(&data, |c| c.text.method = TextParseMethod::Utf8);
    assert_eq!(analysis.rows[0].description, "@PJL COMMENT \"h\u{e9}llo \u{2603}\"");
    assert_eq!(analysis.rows[1].label, "<LF>");
}

#[test]
fn test_long_line_is_split() {
    let line = "A".repeat(150);
    let data = format!("{line}\n").into_bytes();
    let analysis = analyse_with(&data, |c| c.chunk_size = 7);

    let text: Vec<_> = analysis.rows.iter().filter(|r| r.label == "Text" || r.continued).collect();
    assert_eq!(text.len(), 3);
    assert!(!text[0].continued);
    assert!(text[1].continued && text[2].continued);
    assert_eq!(text[0].description.len(), 64);
    assert_eq!(text[2].description.len(), 22);
    assert_eq!(text[1].offset, Some(64));
}

#[test]
fn test_report_round_trip() {
    let data = job(&["@PJL ENTER LANGUAGE=PCLXL"], &[0x41, 0x43, 0x44, 0x42]);
    let analysis = analyse(&data);
    let mut config = AnalyserConfig::default();
    config.stats.show = true;
    let report = Report::new(OffsetFormat::Hexadecimal, config.stats);

    let text = report.render_text(&analysis);
    assert!(text.contains("BeginPage"));
    assert!(text.contains("1 page(s)"));

    let json: serde_json::Value = serde_json::from_str(&report.render_json(&analysis).unwrap()).unwrap();
    assert_eq!(json["pages"], 1);
    assert_eq!(json["rows"].as_array().unwrap().len(), analysis.rows.len());
    assert!(json["stats"].as_array().unwrap().iter().any(|s| s["tag"] == 0x43));
}
