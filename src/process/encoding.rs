use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::{borrow::Cow, fs, path::Path};
use tracing::info;

/// Statistically guess the encoding of the file at `path`.
pub fn detect_encoding(path: &Path) -> Result<&'static Encoding> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let encoding = sniff(&bytes);
    info!(sample = %path.display(), encoding = encoding.name(), "detected encoding");
    Ok(encoding)
}

pub fn sniff(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode `bytes`, replacing malformed sequences with U+FFFD. A byte order
/// mark wins over `encoding`. The flag reports whether anything was replaced.
pub fn decode_lossy<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> (Cow<'a, str>, bool) {
    let (text, _used, had_errors) = encoding.decode(bytes);
    (text, had_errors)
}
