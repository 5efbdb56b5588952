use std::ops::Range;

use crate::directive::RenderOptions;
use crate::fingerprint::fingerprint;
use crate::marker::Marker;
use crate::template::Mode;

/// A fenced code block: indices of its opening and closing fence lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock {
    pub open: usize,
    pub close: usize,
}

impl FencedBlock {
    pub fn body_range(&self) -> Range<usize> {
        self.open + 1..self.close
    }
}

/// A contiguous span of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Passed through unchanged.
    Ordinary {
        span: Range<usize>,
        lines: Vec<String>,
    },
    Renderable(RenderableChunk),
}

impl Chunk {
    /// Lines of the original document owned by this chunk.
    pub fn span(&self) -> &Range<usize> {
        match self {
            Chunk::Ordinary { span, .. } => span,
            Chunk::Renderable(chunk) => &chunk.span,
        }
    }

    /// Current line content.
    pub fn lines(&self) -> &[String] {
        match self {
            Chunk::Ordinary { lines, .. } => lines,
            Chunk::Renderable(chunk) => &chunk.lines,
        }
    }

    pub fn as_renderable(&self) -> Option<&RenderableChunk> {
        match self {
            Chunk::Renderable(chunk) => Some(chunk),
            Chunk::Ordinary { .. } => None,
        }
    }

    pub fn as_renderable_mut(&mut self) -> Option<&mut RenderableChunk> {
        match self {
            Chunk::Renderable(chunk) => Some(chunk),
            Chunk::Ordinary { .. } => None,
        }
    }
}

/// A render directive block together with its presentation wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableChunk {
    pub language: String,
    /// Code block body, fences excluded.
    pub body: Vec<String>,
    pub options: RenderOptions,
    /// Marker recovered from an earlier run, if the wrapper was detected.
    pub previous: Option<Marker>,
    /// Index of the image reference within `lines`.
    pub marker_offset: usize,
    pub span: Range<usize>,
    /// Current content: the detected wrapper, or a fresh template.
    pub lines: Vec<String>,
}

impl RenderableChunk {
    pub fn mode(&self) -> Mode {
        self.options.mode
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.body)
    }

    /// Body as handed to a renderer: every line terminated by `\n`.
    pub fn source_text(&self) -> String {
        self.body.iter().map(|line| format!("{}\n", line)).collect()
    }

    pub fn previous_fingerprint(&self) -> Option<&str> {
        self.previous.as_ref().and_then(Marker::fingerprint)
    }

    /// Whether a wrapper from an earlier run was found around the block.
    pub fn is_rendered_before(&self) -> bool {
        self.previous.is_some()
    }

    /// Whether the block must be rendered again.
    ///
    /// Explicitly named blocks always are: no fingerprint can be recovered
    /// from an arbitrary file name.
    pub fn is_stale(&self) -> bool {
        if self.options.has_explicit_name() {
            return true;
        }
        self.previous_fingerprint() != Some(self.fingerprint().as_str())
    }

    pub fn marker_line(&self) -> &str {
        &self.lines[self.marker_offset]
    }

    pub fn set_marker_line(&mut self, line: String) {
        self.lines[self.marker_offset] = line;
    }
}
