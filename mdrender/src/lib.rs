//! Chunking and idempotent re-render engine for diagram code blocks in
//! Markdown documents.
//!
//! A document is split into ordinary text and renderable regions. Each
//! renderable region is a fenced block such as
//!
//! ~~~text
//! ```dot render {"mode": "code-collapsed"}
//! digraph { a -> b }
//! ```
//! ~~~
//!
//! plus the wrapper lines an earlier run placed around it. The image
//! reference left by that run carries the fingerprint of the body it was
//! rendered from, so the document itself records which blocks are current.

pub mod chunk;
pub mod chunker;
pub mod directive;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod marker;
pub mod template;

pub use chunk::{Chunk, FencedBlock, RenderableChunk};
pub use chunker::Chunker;
pub use directive::{Directive, RenderOptions};
pub use document::{Document, join};
pub use error::ParseError;
pub use fingerprint::fingerprint;
pub use marker::Marker;
pub use template::Mode;
