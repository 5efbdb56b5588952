use std::ops::Range;

use crate::chunk::Chunk;

/// The separator used for splitting and joining documents.
pub const LINE_SEPARATOR: char = '\n';

/// A text document viewed as an ordered sequence of lines.
///
/// Splitting keeps an empty final line when the text ends with a newline, so
/// [`Document::text`] and [`join`] reproduce the input byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    lines: Vec<String>,
    /// Byte offset of the start of each line in the original text.
    offsets: Vec<usize>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut offsets = Vec::new();
        let mut start = 0;
        for line in text.split(LINE_SEPARATOR) {
            offsets.push(start);
            start += line.len() + LINE_SEPARATOR.len_utf8();
            lines.push(line.to_string());
        }
        Document { lines, offsets }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, or `None` when the index is past the end.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Byte span of a line (without its separator), for diagnostics.
    pub fn line_span(&self, index: usize) -> Range<usize> {
        match (self.offsets.get(index), self.lines.get(index)) {
            (Some(&start), Some(line)) => start..start + line.len(),
            _ => {
                let end = self.offsets.last().copied().unwrap_or(0)
                    + self.lines.last().map(String::len).unwrap_or(0);
                end..end
            }
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Reassemble chunks into document text, in chunk order.
pub fn join(chunks: &[Chunk]) -> String {
    let lines: Vec<&str> = chunks
        .iter()
        .flat_map(|chunk| chunk.lines().iter().map(String::as_str))
        .collect();
    lines.join("\n")
}
