//! Control code classification
//!
//! C0 (0x00-0x1F), DEL (0x7F) and C1 (0x80-0x9F) bytes with their ISO 6429
//! mnemonics. Shared by every text-based language (PJL, PCL).

use crate::tags::SideEffectHint;

/// A classified control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCode {
    pub byte: u8,
    pub mnemonic: &'static str,
    pub description: &'static str,
    pub hint: SideEffectHint,
}

pub const ESC: u8 = 0x1B;
pub const LF: u8 = 0x0A;
pub const FF: u8 = 0x0C;
pub const SPACE: u8 = 0x20;
pub const DEL: u8 = 0x7F;

const C0: [(&str, &str); 32] = [
    ("NUL", "Null"),
    ("SOH", "Start of Heading"),
    ("STX", "Start of Text"),
    ("ETX", "End of Text"),
    ("EOT", "End of Transmission"),
    ("ENQ", "Enquiry"),
    ("ACK", "Acknowledge"),
    ("BEL", "Bell"),
    ("BS", "Backspace"),
    ("HT", "Horizontal Tab"),
    ("LF", "Line Feed"),
    ("VT", "Vertical Tab"),
    ("FF", "Form Feed"),
    ("CR", "Carriage Return"),
    ("SO", "Shift Out"),
    ("SI", "Shift In"),
    ("DLE", "Data Link Escape"),
    ("DC1", "Device Control 1"),
    ("DC2", "Device Control 2"),
    ("DC3", "Device Control 3"),
    ("DC4", "Device Control 4"),
    ("NAK", "Negative Acknowledge"),
    ("SYN", "Synchronous Idle"),
    ("ETB", "End of Transmission Block"),
    ("CAN", "Cancel"),
    ("EM", "End of Medium"),
    ("SUB", "Substitute"),
    ("Esc", "Escape"),
    ("FS", "File Separator"),
    ("GS", "Group Separator"),
    ("RS", "Record Separator"),
    ("US", "Unit Separator"),
];

const C1: [(&str, &str); 32] = [
    ("PAD", "Padding Character"),
    ("HOP", "High Octet Preset"),
    ("BPH", "Break Permitted Here"),
    ("NBH", "No Break Here"),
    ("IND", "Index"),
    ("NEL", "Next Line"),
    ("SSA", "Start of Selected Area"),
    ("ESA", "End of Selected Area"),
    ("HTS", "Horizontal Tab Set"),
    ("HTJ", "Horizontal Tab with Justification"),
    ("VTS", "Vertical Tab Set"),
    ("PLD", "Partial Line Down"),
    ("PLU", "Partial Line Up"),
    ("RI", "Reverse Index"),
    ("SS2", "Single Shift 2"),
    ("SS3", "Single Shift 3"),
    ("DCS", "Device Control String"),
    ("PU1", "Private Use 1"),
    ("PU2", "Private Use 2"),
    ("STS", "Set Transmit State"),
    ("CCH", "Cancel Character"),
    ("MW", "Message Waiting"),
    ("SPA", "Start of Protected Area"),
    ("EPA", "End of Protected Area"),
    ("SOS", "Start of String"),
    ("SGCI", "Single Graphic Character Introducer"),
    ("SCI", "Single Character Introducer"),
    ("CSI", "Control Sequence Introducer"),
    ("ST", "String Terminator"),
    ("OSC", "Operating System Command"),
    ("PM", "Privacy Message"),
    ("APC", "Application Program Command"),
];

/// Classify a byte, returning `None` for graphic characters
pub fn classify(byte: u8) -> Option<ControlCode> {
    let (mnemonic, description) = match byte {
        0x00..=0x1F => C0[byte as usize],
        DEL => ("DEL", "Delete"),
        0x80..=0x9F => C1[(byte - 0x80) as usize],
        _ => return None,
    };

    let hint = match byte {
        FF => SideEffectHint::PageEnd,
        _ => SideEffectHint::None,
    };

    Some(ControlCode {
        byte,
        mnemonic,
        description,
        hint,
    })
}

/// Bracketed mnemonic, e.g. `<LF>`; `<SP>` for space
pub fn bracketed(byte: u8) -> Option<String> {
    if byte == SPACE {
        return Some("<SP>".to_string());
    }
    classify(byte).map(|c| format!("<{}>", c.mnemonic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c0_mnemonics() {
        assert_eq!(classify(0x00).map(|c| c.mnemonic), Some("NUL"));
        assert_eq!(classify(LF).map(|c| c.mnemonic), Some("LF"));
        assert_eq!(classify(ESC).map(|c| c.description), Some("Escape"));
        assert_eq!(classify(0x1F).map(|c| c.mnemonic), Some("US"));
    }

    #[test]
    fn test_c1_and_del() {
        assert_eq!(classify(0x85).map(|c| c.mnemonic), Some("NEL"));
        assert_eq!(classify(0x9B).map(|c| c.mnemonic), Some("CSI"));
        assert_eq!(classify(DEL).map(|c| c.mnemonic), Some("DEL"));
    }

    #[test]
    fn test_graphic_is_not_control() {
        assert!(classify(b'A').is_none());
        assert!(classify(SPACE).is_none());
        assert!(classify(0xA0).is_none());
    }

    #[test]
    fn test_form_feed_ends_page() {
        assert_eq!(classify(FF).map(|c| c.hint), Some(SideEffectHint::PageEnd));
        assert_eq!(classify(LF).map(|c| c.hint), Some(SideEffectHint::None));
    }

    #[test]
    fn test_bracketed() {
        assert_eq!(bracketed(0x0D).as_deref(), Some("<CR>"));
        assert_eq!(bracketed(SPACE).as_deref(), Some("<SP>"));
        assert_eq!(bracketed(b'x'), None);
    }
}
