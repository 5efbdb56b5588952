//! Render directives on opening fences: ```` ```dot render {"mode": "code-hidden"} ````

use std::ops::Range;

use serde::Deserialize;

use crate::error::ParseError;
use crate::template::Mode;

pub const FENCE: &str = "```";
pub const RENDER_KEYWORD: &str = "render";

/// Per-block configuration from the JSON suffix of a directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderOptions {
    #[serde(default)]
    pub mode: Mode,
    /// Explicit output file name. Disables fingerprint-based staleness detection.
    #[serde(default)]
    pub filename: Option<String>,
}

impl RenderOptions {
    pub fn has_explicit_name(&self) -> bool {
        self.filename.is_some()
    }
}

/// A recognized render directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub language: String,
    pub options: RenderOptions,
}

/// Parse an opening fence line as a render directive.
///
/// Returns `Ok(None)` for lines that are not directives for one of `languages`:
/// ordinary text, plain fences, and fences like ```` ```dot renderer ````.
/// The language token must equal an enabled language exactly.
pub fn parse_directive(
    line: &str,
    languages: &[String],
    span: Range<usize>,
    file_id: usize,
) -> Result<Option<Directive>, ParseError> {
    let Some(info) = line.strip_prefix(FENCE) else {
        return Ok(None);
    };
    let info = info.trim_end();
    let Some((language, rest)) = info.split_once(|c: char| c.is_whitespace()) else {
        return Ok(None);
    };
    if !languages.iter().any(|l| l == language) {
        return Ok(None);
    }
    let Some(rest) = rest.trim_start().strip_prefix(RENDER_KEYWORD) else {
        return Ok(None);
    };

    let suffix = rest.trim_start();
    let options = if suffix.is_empty() {
        RenderOptions::default()
    } else if suffix.starts_with('{') {
        parse_options(suffix, span, file_id)?
    } else {
        return Ok(None);
    };

    Ok(Some(Directive {
        language: language.to_string(),
        options,
    }))
}

fn parse_options(
    suffix: &str,
    span: Range<usize>,
    file_id: usize,
) -> Result<RenderOptions, ParseError> {
    if !suffix.ends_with('}') {
        return Err(
            ParseError::error("render options must end with `}`", span, file_id)
                .with_note(format!("found: {}", suffix)),
        );
    }

    let options: RenderOptions = serde_json::from_str(suffix).map_err(|e| {
        ParseError::error("malformed render options", span.clone(), file_id)
            .with_note(e.to_string())
    })?;

    if let Some(name) = &options.filename {
        validate_file_name(name).map_err(|reason| {
            ParseError::error(
                format!("invalid render filename `{}`", name),
                span.clone(),
                file_id,
            )
            .with_note(reason)
        })?;
    }

    Ok(options)
}

/// Explicit names must stay inside the output directory.
fn validate_file_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("filename must not be empty");
    }
    if name == "." || name == ".." {
        return Err("filename must name a file");
    }
    if name.contains(['/', '\\']) {
        return Err("filename must not contain path separators");
    }
    Ok(())
}
