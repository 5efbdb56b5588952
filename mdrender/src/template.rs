//! Presentation modes and the wrapper lines each one places around a block.
//!
//! Every mode is described by a [`Layout`]: the structural lines expected
//! directly above the opening fence and directly below the closing fence.
//! The same layout drives both detection of a previous render and generation
//! of a fresh wrapper, so the two cannot drift apart.

use std::ops::Range;

use serde::Deserialize;

use crate::chunk::FencedBlock;
use crate::document::Document;
use crate::marker::{self, Marker};

/// Placeholder for the image reference in a fresh wrapper.
/// Always overwritten in the same pass that creates it.
pub const PLACEHOLDER: &str = "<!-- image here -->";

pub const SOURCE_DETAILS_OPEN: &str = "<details><summary>Source</summary>";
pub const IMAGE_DETAILS_OPEN: &str = "<details><summary>Image</summary>";
pub const DETAILS_CLOSE: &str = "</details>";
pub const COMMENT_OPEN: &str = "<!--";
pub const COMMENT_CLOSE: &str = "-->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// ~~~text
    /// ![](render-<hash>.svg)
    ///
    /// ```dot render
    /// ```
    /// ~~~
    #[default]
    Normal,
    /// ~~~text
    /// ![](render-<hash>.svg)
    ///
    /// <details><summary>Source</summary>
    ///
    /// ```dot render
    /// ```
    ///
    /// </details>
    /// ~~~
    CodeCollapsed,
    /// ~~~text
    /// ```dot render
    /// ```
    ///
    /// <details><summary>Image</summary>
    ///
    /// ![](render-<hash>.svg)
    ///
    /// </details>
    /// ~~~
    ImageCollapsed,
    /// ~~~text
    /// ![](render-<hash>.svg)
    ///
    /// <!--
    /// ```dot render
    /// ```
    /// -->
    /// ~~~
    CodeHidden,
}

/// One structural line of a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The image reference line.
    Marker,
    /// A separator line. Not checked during detection.
    Blank,
    /// A fixed line that must be present verbatim.
    Tag(&'static str),
}

impl Slot {
    fn fresh_line(self) -> &'static str {
        match self {
            Slot::Marker => PLACEHOLDER,
            Slot::Blank => "",
            Slot::Tag(tag) => tag,
        }
    }
}

/// Wrapper lines around the fence pair, listed top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub before: &'static [Slot],
    pub after: &'static [Slot],
}

const NORMAL: Layout = Layout {
    before: &[Slot::Marker, Slot::Blank],
    after: &[],
};

// Normal mode also accepts a marker directly above the fence.
const NORMAL_TIGHT: Layout = Layout {
    before: &[Slot::Marker],
    after: &[],
};

const CODE_COLLAPSED: Layout = Layout {
    before: &[
        Slot::Marker,
        Slot::Blank,
        Slot::Tag(SOURCE_DETAILS_OPEN),
        Slot::Blank,
    ],
    after: &[Slot::Blank, Slot::Tag(DETAILS_CLOSE)],
};

const IMAGE_COLLAPSED: Layout = Layout {
    before: &[],
    after: &[
        Slot::Blank,
        Slot::Tag(IMAGE_DETAILS_OPEN),
        Slot::Blank,
        Slot::Marker,
        Slot::Blank,
        Slot::Tag(DETAILS_CLOSE),
    ],
};

const CODE_HIDDEN: Layout = Layout {
    before: &[Slot::Marker, Slot::Blank, Slot::Tag(COMMENT_OPEN)],
    after: &[Slot::Tag(COMMENT_CLOSE)],
};

/// A wrapper found around a block from an earlier run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Existing {
    /// Lines covered by the wrapper, fences included.
    pub span: Range<usize>,
    /// Index of the marker line relative to `span.start`.
    pub marker_offset: usize,
    pub marker: Marker,
}

/// Lines of a fresh wrapper with the placeholder still in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub lines: Vec<String>,
    pub marker_offset: usize,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Normal,
        Mode::CodeCollapsed,
        Mode::ImageCollapsed,
        Mode::CodeHidden,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::CodeCollapsed => "code-collapsed",
            Mode::ImageCollapsed => "image-collapsed",
            Mode::CodeHidden => "code-hidden",
        }
    }

    /// The layout emitted for fresh renders.
    pub fn layout(self) -> Layout {
        match self {
            Mode::Normal => NORMAL,
            Mode::CodeCollapsed => CODE_COLLAPSED,
            Mode::ImageCollapsed => IMAGE_COLLAPSED,
            Mode::CodeHidden => CODE_HIDDEN,
        }
    }

    /// Layouts accepted as evidence of a previous render, in lookup order.
    fn accepted_layouts(self) -> &'static [Layout] {
        match self {
            Mode::Normal => &[NORMAL_TIGHT, NORMAL],
            Mode::CodeCollapsed => &[CODE_COLLAPSED],
            Mode::ImageCollapsed => &[IMAGE_COLLAPSED],
            Mode::CodeHidden => &[CODE_HIDDEN],
        }
    }

    /// Look for this mode's wrapper around `block`.
    ///
    /// Every tag and the marker must sit at their fixed offsets. Lines before
    /// `floor` belong to earlier chunks and count as out of bounds, as does
    /// anything past the end of the document.
    pub fn detect_existing(
        self,
        document: &Document,
        block: &FencedBlock,
        floor: usize,
        explicit_name: bool,
    ) -> Option<Existing> {
        self.accepted_layouts()
            .iter()
            .find_map(|layout| layout.detect(document, block, floor, explicit_name))
    }

    pub fn fresh_template(self, document: &Document, block: &FencedBlock) -> Template {
        self.layout().fresh(document, block)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Layout {
    /// Document indices of every slot, for a given fence pair.
    fn slots(&self, block: &FencedBlock) -> impl Iterator<Item = (usize, Slot)> {
        let (before, after) = (self.before, self.after);
        let first = block.open - before.len();
        let close = block.close;
        before
            .iter()
            .enumerate()
            .map(move |(i, s)| (first + i, *s))
            .chain(after.iter().enumerate().map(move |(i, s)| (close + 1 + i, *s)))
    }

    fn detect(
        &self,
        document: &Document,
        block: &FencedBlock,
        floor: usize,
        explicit_name: bool,
    ) -> Option<Existing> {
        let start = block.open.checked_sub(self.before.len())?;
        let end = block.close + 1 + self.after.len();
        if start < floor || end > document.len() {
            return None;
        }

        let mut found = None;
        for (index, slot) in self.slots(block) {
            let line = document.line(index)?;
            match slot {
                Slot::Blank => {}
                Slot::Tag(tag) => {
                    if line.trim_end() != tag {
                        return None;
                    }
                }
                Slot::Marker => {
                    found = Some((index, marker::recognize(line, explicit_name)?));
                }
            }
        }

        let (index, marker) = found?;
        Some(Existing {
            span: start..end,
            marker_offset: index - start,
            marker,
        })
    }

    fn fresh(&self, document: &Document, block: &FencedBlock) -> Template {
        let mut lines = Vec::with_capacity(
            self.before.len() + (block.close - block.open + 1) + self.after.len(),
        );
        let mut marker_offset = 0;

        for slot in self.before {
            if *slot == Slot::Marker {
                marker_offset = lines.len();
            }
            lines.push(slot.fresh_line().to_string());
        }
        lines.extend(document.lines()[block.open..=block.close].iter().cloned());
        for slot in self.after {
            if *slot == Slot::Marker {
                marker_offset = lines.len();
            }
            lines.push(slot.fresh_line().to_string());
        }

        Template {
            lines,
            marker_offset,
        }
    }
}
