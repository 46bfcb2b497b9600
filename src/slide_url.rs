//! Deterministic slide URL construction.

use crate::config::Config;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped within a single path segment. Everything outside the
/// RFC 3986 unreserved set is encoded, so non-ASCII folder names survive.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Builds the zero-padded filename for a 1-based slide index.
pub fn slide_file_name(config: &Config, index: u32) -> String {
    assert!(index >= 1, "slide index is 1-based");
    format!(
        "{:0pad$}.{ext}",
        index,
        pad = config.slide_pad,
        ext = config.slide_ext
    )
}

/// Resolves the URL of the Nth slide in a region folder.
///
/// Pure function, no network access. Each path segment is percent-encoded
/// independently; the base URL is taken as-is.
pub fn resolve(config: &Config, folder_name: &str, index: u32) -> String {
    let file = slide_file_name(config, index);

    let mut parts: Vec<String> = vec![config.base_url.trim_end_matches('/').to_string()];
    if !config.slides_root.is_empty() {
        parts.push(encode_segment(&config.slides_root));
    }
    parts.push(encode_segment(folder_name));
    parts.push(file);

    parts.join("/")
}
