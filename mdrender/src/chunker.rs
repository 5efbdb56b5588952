use log::debug;

use crate::chunk::{Chunk, FencedBlock, RenderableChunk};
use crate::directive::{self, Directive, FENCE};
use crate::document::Document;
use crate::error::ParseError;

/// Splits a document into ordinary and renderable chunks.
pub struct Chunker<'a> {
    languages: &'a [String],
    file_id: usize,
}

impl<'a> Chunker<'a> {
    pub fn new(languages: &'a [String], file_id: usize) -> Self {
        Chunker { languages, file_id }
    }

    /// Walk the document once, left to right.
    ///
    /// The returned chunks cover every line exactly once, in order. Lines
    /// absorbed into a renderable chunk's wrapper are never scanned again.
    pub fn split(&self, document: &Document) -> Result<Vec<Chunk>, ParseError> {
        let lines = document.lines();
        let mut chunks = Vec::new();
        let mut cursor = 0;
        let mut i = 0;

        while i < lines.len() {
            let span = document.line_span(i);
            let Some(directive) =
                directive::parse_directive(&lines[i], self.languages, span, self.file_id)?
            else {
                i += 1;
                continue;
            };

            let block = self.find_closing_fence(document, i)?;
            let chunk = build_chunk(document, directive, block, cursor);

            if chunk.span.start > cursor {
                chunks.push(ordinary(document, cursor..chunk.span.start));
            }
            cursor = chunk.span.end;
            i = cursor;
            chunks.push(Chunk::Renderable(chunk));
        }

        if cursor < lines.len() {
            chunks.push(ordinary(document, cursor..lines.len()));
        }

        Ok(chunks)
    }

    fn find_closing_fence(&self, document: &Document, open: usize) -> Result<FencedBlock, ParseError> {
        document.lines()[open + 1..]
            .iter()
            .position(|line| line.trim_end() == FENCE)
            .map(|offset| FencedBlock {
                open,
                close: open + 1 + offset,
            })
            .ok_or_else(|| {
                ParseError::error("code block is unterminated", document.line_span(open), self.file_id)
                    .with_note("add a closing ``` line after the diagram source")
            })
    }
}

fn build_chunk(
    document: &Document,
    directive: Directive,
    block: FencedBlock,
    floor: usize,
) -> RenderableChunk {
    let Directive { language, options } = directive;
    let mode = options.mode;
    let body = document.lines()[block.body_range()].to_vec();

    match mode.detect_existing(document, &block, floor, options.has_explicit_name()) {
        Some(existing) => {
            debug!(
                "{} block at line {} was rendered before ({} mode)",
                language,
                block.open + 1,
                mode
            );
            RenderableChunk {
                language,
                body,
                options,
                previous: Some(existing.marker),
                marker_offset: existing.marker_offset,
                lines: document.lines()[existing.span.clone()].to_vec(),
                span: existing.span,
            }
        }
        None => {
            let template = mode.fresh_template(document, &block);
            RenderableChunk {
                language,
                body,
                options,
                previous: None,
                marker_offset: template.marker_offset,
                lines: template.lines,
                span: block.open..block.close + 1,
            }
        }
    }
}

fn ordinary(document: &Document, span: std::ops::Range<usize>) -> Chunk {
    Chunk::Ordinary {
        lines: document.lines()[span.clone()].to_vec(),
        span,
    }
}
