//! Recognition and construction of image reference lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::fingerprint::{FINGERPRINT_LEN, RENDER_PREFIX};

// Matches: ![render-<hash>.svg](/optional/path/to/render-<hash>.svg)
static RENDERED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^!\[{prefix}(?P<hash>[0-9a-f]{{{len}}})\.[A-Za-z0-9]+\]\([^)]*{prefix}[0-9a-f]{{{len}}}\.[A-Za-z0-9]+\)$",
        prefix = regex::escape(RENDER_PREFIX),
        len = FINGERPRINT_LEN,
    );
    Regex::new(&pattern).expect("rendered image pattern is valid")
});

// Matches any single Markdown image: ![alt](target)
static ANY_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[[^\]]*\]\([^)]*\)$").expect("image pattern is valid"));

/// A previously emitted image reference found next to a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A content-addressed render, with the fingerprint recovered from its name.
    Fingerprinted(String),
    /// An image reference in the expected slot whose name carries no fingerprint.
    Named,
}

impl Marker {
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            Marker::Fingerprinted(hash) => Some(hash),
            Marker::Named => None,
        }
    }
}

/// Recognize a marker line.
///
/// Blocks with an explicit file name cannot embed a fingerprint, so for them
/// any image reference counts. Otherwise only a content-addressed reference
/// matches, and its fingerprint is returned.
pub fn recognize(line: &str, explicit_name: bool) -> Option<Marker> {
    let line = line.trim_end();
    if explicit_name {
        return ANY_IMAGE.is_match(line).then_some(Marker::Named);
    }
    RENDERED_IMAGE
        .captures(line)
        .map(|caps| Marker::Fingerprinted(caps["hash"].to_string()))
}

/// Build the canonical image reference line: `![<name>](<prefix><name>)`.
pub fn image_reference(file_name: &str, link_prefix: &str) -> String {
    format!("![{}]({}{})", file_name, link_prefix, file_name)
}
