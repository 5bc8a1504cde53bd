//! UTF-8 decoding for text runs
//!
//! Slice-based: the text decoder looks at the bytes it has, and either gets a
//! character, an invalid span to skip, or the number of bytes still missing.

/// Result of decoding at the start of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Result {
    /// A valid character and the number of bytes it occupies
    Char(char, usize),
    /// Invalid data; skip this many bytes before scanning again
    Invalid(usize),
    /// The lead byte announces more bytes than the slice holds
    Incomplete { needed: usize },
}

/// Total sequence length announced by a lead byte, `None` if it cannot lead
pub fn sequence_len(lead: u8) -> Option<usize> {
    if lead < 0x80 {
        Some(1)
    } else if lead & 0b1110_0000 == 0b1100_0000 {
        Some(2)
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        Some(3)
    } else if lead & 0b1111_1000 == 0b1111_0000 {
        Some(4)
    } else {
        None
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Decode one character from the front of `bytes`
///
/// `bytes` must not be empty.
pub fn decode(bytes: &[u8]) -> Utf8Result {
    let lead = bytes[0];
    let expected = match sequence_len(lead) {
        Some(1) => return Utf8Result::Char(lead as char, 1),
        Some(n) => n,
        None => return Utf8Result::Invalid(1),
    };

    // Check what is available before asking for more
    let available = bytes.len().min(expected);
    if let Some(bad) = bytes[1..available].iter().position(|&b| !is_continuation(b)) {
        // Resume scanning at the offending byte
        return Utf8Result::Invalid(bad + 1);
    }
    if bytes.len() < expected {
        return Utf8Result::Incomplete {
            needed: expected - bytes.len(),
        };
    }

    let cp = match expected {
        2 => (lead as u32 & 0x1F) << 6 | (bytes[1] as u32 & 0x3F),
        3 => {
            (lead as u32 & 0x0F) << 12 | (bytes[1] as u32 & 0x3F) << 6 | (bytes[2] as u32 & 0x3F)
        }
        _ => {
            (lead as u32 & 0x07) << 18
                | (bytes[1] as u32 & 0x3F) << 12
                | (bytes[2] as u32 & 0x3F) << 6
                | (bytes[3] as u32 & 0x3F)
        }
    };

    // Overlong forms, surrogates and values past U+10FFFF
    let min = match expected {
        2 => 0x80,
        3 => 0x800,
        _ => 0x10000,
    };
    if cp < min || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        return Utf8Result::Invalid(expected);
    }

    match char::from_u32(cp) {
        Some(c) => Utf8Result::Char(c, expected),
        None => Utf8Result::Invalid(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(decode(b"A"), Utf8Result::Char('A', 1));
        assert_eq!(decode(b"\x00"), Utf8Result::Char('\0', 1));
    }

    #[test]
    fn test_two_byte() {
        // 'é' = U+00E9 = 0xC3 0xA9
        assert_eq!(decode(&[0xC3, 0xA9]), Utf8Result::Char('é', 2));
    }

    #[test]
    fn test_three_byte() {
        // '中' = U+4E2D = 0xE4 0xB8 0xAD
        assert_eq!(decode(&[0xE4, 0xB8, 0xAD, b'x']), Utf8Result::Char('中', 3));
    }

    #[test]
    fn test_four_byte() {
        assert_eq!(decode(&[0xF0, 0x9F, 0x98, 0x80]), Utf8Result::Char('😀', 4));
    }

    #[test]
    fn test_incomplete() {
        assert_eq!(decode(&[0xE4, 0xB8]), Utf8Result::Incomplete { needed: 1 });
        assert_eq!(decode(&[0xF0]), Utf8Result::Incomplete { needed: 3 });
    }

    #[test]
    fn test_invalid_start() {
        assert_eq!(decode(&[0xFF]), Utf8Result::Invalid(1));
        assert_eq!(decode(&[0x80, 0x80]), Utf8Result::Invalid(1));
    }

    #[test]
    fn test_invalid_continuation_resumes_at_offender() {
        assert_eq!(decode(&[0xE4, b'A', 0xAD]), Utf8Result::Invalid(1));
        assert_eq!(decode(&[0xE4, 0xB8, b'A']), Utf8Result::Invalid(2));
        // A bad byte is reported even before the sequence is complete
        assert_eq!(decode(&[0xF0, b'A']), Utf8Result::Invalid(1));
    }

    #[test]
    fn test_overlong_and_surrogate() {
        // Overlong encoding of 'A'
        assert_eq!(decode(&[0xC1, 0x81]), Utf8Result::Invalid(2));
        // U+D800
        assert_eq!(decode(&[0xED, 0xA0, 0x80]), Utf8Result::Invalid(3));
    }

    #[test]
    fn test_decode_std_encoded_sample() {
        let mut buf = [0u8; 4];
        for c in ['é', '中', '😀', '\u{FFFD}'] {
            let bytes = c.encode_utf8(&mut buf).as_bytes();
            assert_eq!(decode(bytes), Utf8Result::Char(c, bytes.len()));
        }
    }
}
