//! Charset detection and decoding of raw process output.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Default number of bytes fed to the charset detector.
pub const DEFAULT_MAX_DETECTION_SAMPLE: usize = 8192;

/// How raw output bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharsetConfig {
    /// Whether to guess the encoding from the bytes themselves.
    pub auto_detect: bool,
    /// Encoding used when detection is off or inconclusive.
    pub default_charset: &'static Encoding,
    /// Upper bound on the bytes inspected by the detector.
    pub max_sample_size: usize,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            auto_detect: false,
            default_charset: UTF_8,
            max_sample_size: DEFAULT_MAX_DETECTION_SAMPLE,
        }
    }
}

/// Guesses the encoding of `bytes` from at most `max_sample_size` of them.
///
/// A byte-order mark is trusted outright. Otherwise the sample goes through a
/// statistical detector; samples without any non-ASCII byte carry no signal
/// and yield `None`.
pub fn detect(bytes: &[u8], max_sample_size: usize) -> Option<&'static Encoding> {
    let sample_len = bytes.len().min(max_sample_size);
    let sample = &bytes[..sample_len];

    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
        return Some(encoding);
    }

    let mut detector = EncodingDetector::new();
    let saw_non_ascii = detector.feed(sample, sample_len == bytes.len());
    if !saw_non_ascii {
        return None;
    }

    Some(detector.guess(None, true))
}

/// Decodes `bytes` according to `config`. Never fails: malformed sequences
/// are replaced with U+FFFD.
pub fn decode(bytes: &[u8], config: &CharsetConfig) -> String {
    let encoding = if config.auto_detect {
        detect(bytes, config.max_sample_size).unwrap_or(config.default_charset)
    } else {
        config.default_charset
    };

    let (text, _encoding_used, _had_errors) = encoding.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, WINDOWS_1251};

    const RUSSIAN: &str = "Съешь же ещё этих мягких французских булок, да выпей чаю. \
        Широкая электрификация южных губерний даст мощный толчок подъёму сельского хозяйства. \
        В чащах юга жил бы цитрус? Да, но фальшивый экземпляр!";

    fn auto_detecting() -> CharsetConfig {
        CharsetConfig {
            auto_detect: true,
            ..CharsetConfig::default()
        }
    }

    #[test]
    fn empty_input_has_no_detected_charset() {
        assert_eq!(detect(b"", DEFAULT_MAX_DETECTION_SAMPLE), None);
    }

    #[test]
    fn ascii_input_has_no_detected_charset() {
        assert_eq!(detect(b"plain ascii log line\n", DEFAULT_MAX_DETECTION_SAMPLE), None);
    }

    #[test]
    fn bom_wins_over_statistics() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("héllo".as_bytes());
        assert_eq!(detect(&bytes, DEFAULT_MAX_DETECTION_SAMPLE), Some(UTF_8));
    }

    #[test]
    fn detects_windows_1251() {
        let (bytes, _, _) = WINDOWS_1251.encode(RUSSIAN);
        assert_eq!(decode(&bytes, &auto_detecting()), RUSSIAN);
    }

    #[test]
    fn detects_utf8_without_bom() {
        assert_eq!(decode(RUSSIAN.as_bytes(), &auto_detecting()), RUSSIAN);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let config = CharsetConfig {
            auto_detect: true,
            default_charset: SHIFT_JIS,
            ..CharsetConfig::default()
        };
        assert_eq!(decode(b"", &config), "");
        assert_eq!(decode(b"abc", &config), "abc");
    }

    #[test]
    fn without_auto_detect_default_is_always_used() {
        let (bytes, _, _) = WINDOWS_1251.encode(RUSSIAN);
        let config = CharsetConfig {
            auto_detect: false,
            default_charset: WINDOWS_1251,
            ..CharsetConfig::default()
        };
        assert_eq!(decode(&bytes, &config), RUSSIAN);

        let utf8 = CharsetConfig::default();
        assert!(decode(&bytes, &utf8).contains('\u{FFFD}'));
    }

    #[test]
    fn sample_size_limits_detection() {
        let mut bytes = b"ascii prefix ".repeat(10);
        bytes.extend_from_slice(RUSSIAN.as_bytes());
        assert_eq!(detect(&bytes, 16), None);
        assert!(detect(&bytes, bytes.len()).is_some());
    }
}
