//! Patch text decoding.
//!
//! Patches are bytes: source files in old repositories are frequently not
//! UTF-8. Decoding tries, in order, a byte-order mark, strict UTF-8, the
//! configured fallback encodings, and finally statistical detection.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::domain::DecodeError;

/// Decodes raw patch bytes into text.
#[derive(Debug, Clone, Default)]
pub struct TextDecoder {
    fallbacks: Vec<&'static Encoding>,
}

impl TextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try `encoding` after UTF-8 and before detection. Fallbacks are tried
    /// in the order they were added.
    pub fn with_fallback(mut self, encoding: &'static Encoding) -> Self {
        self.fallbacks.push(encoding);
        self
    }

    /// Build a decoder from WHATWG encoding labels, ignoring unknown ones.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut decoder = Self::new();
        for label in labels {
            match Encoding::for_label(label.as_ref().as_bytes()) {
                Some(encoding) => decoder = decoder.with_fallback(encoding),
                None => warn!(label = %label.as_ref(), "unknown fallback encoding ignored"),
            }
        }
        decoder
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if !had_errors {
                return Ok(text.into_owned());
            }
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => return Ok(text.to_owned()),
            Err(e) => debug!(error = %e, "patch is not UTF-8"),
        }

        for encoding in &self.fallbacks {
            let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
            if !had_errors {
                debug!(encoding = encoding.name(), "decoded with fallback encoding");
                return Ok(text.into_owned());
            }
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let encoding = detector.guess(None, true);
        warn!(encoding = encoding.name(), "patch encoding guessed");

        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(DecodeError::Undecodable {
                encoding: encoding.name().to_string(),
            });
        }
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passes_through() {
        let text = "@@ -1 +1 @@\n- * @param é old\n";
        assert_eq!(TextDecoder::new().decode(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"int x;");
        assert_eq!(TextDecoder::new().decode(&bytes).unwrap(), "int x;");
    }

    #[test]
    fn test_latin1_fallback() {
        // "caf\xe9" is "café" in windows-1252 and invalid UTF-8.
        let bytes = b" * caf\xe9 au lait\n";
        let decoder = TextDecoder::new().with_fallback(encoding_rs::WINDOWS_1252);
        assert_eq!(decoder.decode(bytes).unwrap(), " * café au lait\n");
    }

    #[test]
    fn test_detection_without_fallbacks_still_decodes() {
        let bytes = b"/**\n * Gr\xfc\xdfe aus K\xf6ln, sch\xf6ne Gr\xfc\xdfe\n */\n";
        let text = TextDecoder::new().decode(bytes).unwrap();
        assert!(text.contains("aus K"));
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_from_labels_skips_unknown() {
        let decoder = TextDecoder::from_labels(&["latin1", "no-such-encoding"]);
        assert_eq!(decoder.fallbacks.len(), 1);
        assert_eq!(decoder.fallbacks[0], encoding_rs::WINDOWS_1252);
    }
}
