//! Text decoding with a single legacy fallback.

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text decoded from raw file bytes, with the encoding that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Decode `bytes` as UTF-8, retrying once with `fallback` on an invalid byte
/// sequence.
///
/// Both attempts are strict: a malformed UTF-8 sequence or a byte the
/// fallback encoding leaves unmapped is a failure, never a replacement
/// character. Returns `None` when neither encoding accepts the bytes.
pub fn decode_with_fallback(bytes: &[u8], fallback: &'static Encoding) -> Option<Decoded> {
    let utf8_bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(utf8_bytes) {
        return Some(Decoded {
            text: text.into_owned(),
            encoding: UTF_8,
        });
    }

    warn!("File is not valid UTF-8, retrying as {}", fallback.name());

    match fallback.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Some(Decoded {
            text: text.into_owned(),
            encoding: fallback,
        }),
        None => {
            debug!("Fallback decoding as {} failed", fallback.name());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{WINDOWS_1252, WINDOWS_874};

    #[test]
    fn test_utf8_is_preferred() {
        let decoded = decode_with_fallback("Area\nภาคเหนือ\n".as_bytes(), WINDOWS_874).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "Area\nภาคเหนือ\n");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Area\nNorth\n");
        let decoded = decode_with_fallback(&bytes, WINDOWS_874).unwrap();
        assert_eq!(decoded.text, "Area\nNorth\n");
    }

    #[test]
    fn test_thai_code_page_fallback() {
        let (bytes, _, had_errors) = WINDOWS_874.encode("Area\nภาคเหนือ\n");
        assert!(!had_errors);

        let decoded = decode_with_fallback(&bytes, WINDOWS_874).unwrap();
        assert_eq!(decoded.encoding, WINDOWS_874);
        assert_eq!(decoded.text, "Area\nภาคเหนือ\n");
    }

    #[test]
    fn test_western_code_page_fallback() {
        let bytes = b"Recruiter\nJos\xe9\n";
        let decoded = decode_with_fallback(bytes, WINDOWS_1252).unwrap();
        assert_eq!(decoded.encoding, WINDOWS_1252);
        assert_eq!(decoded.text, "Recruiter\nJosé\n");
    }

    #[test]
    fn test_both_encodings_fail() {
        // 0xFC..0xFF are invalid UTF-8 and unmapped in windows-874
        let bytes = b"Area\n\xfc\xfd\xfe\xff\n";
        assert!(decode_with_fallback(bytes, WINDOWS_874).is_none());
    }
}
