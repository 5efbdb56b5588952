//! Content addressing for code block bodies.

use sha2::{Digest, Sha256};

/// Number of hex characters in a fingerprint.
pub const FINGERPRINT_LEN: usize = 32;

/// File name prefix of content-addressed renders.
pub const RENDER_PREFIX: &str = "render-";

/// Fingerprint a code block body.
///
/// Every line is hashed followed by `\n`, so the result is sensitive to line
/// order, whitespace and line count. The SHA-256 digest is truncated to
/// [`FINGERPRINT_LEN`] hex characters.
pub fn fingerprint<S: AsRef<str>>(body: &[S]) -> String {
    let mut hasher = Sha256::new();
    for line in body {
        hasher.update(line.as_ref().as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    digest[..FINGERPRINT_LEN / 2]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Content-addressed file name for a fingerprint: `render-<fingerprint>.<ext>`.
pub fn render_file_name(fingerprint: &str, extension: &str) -> String {
    format!("{}{}.{}", RENDER_PREFIX, fingerprint, extension)
}

/// Split a content-addressed file name into its fingerprint and extension.
///
/// Returns `None` for any name not of the form `render-<fingerprint>.<ext>`.
pub fn parse_render_file_name(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix(RENDER_PREFIX)?;
    let (hash, extension) = rest.split_once('.')?;
    let is_hash = hash.len() == FINGERPRINT_LEN
        && hash.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    (is_hash && !extension.is_empty()).then_some((hash, extension))
}
