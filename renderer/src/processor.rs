use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use mdrender::marker::image_reference;
use mdrender::{Chunk, Chunker, Document, RenderableChunk, fingerprint::render_file_name, join};
use tempfile::NamedTempFile;

use crate::error::ProcessError;
use crate::format::ImageFormat;
use crate::registry::RendererRegistry;

/// Settings shared by every file of a run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Languages whose `render` directives are processed.
    pub languages: Vec<String>,
    /// Where images are written. Defaults to the directory of each document.
    pub output_dir: Option<PathBuf>,
    /// Prepended to the file name in image links.
    pub link_prefix: String,
}

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// File names of the images written, in document order.
    pub rendered: Vec<String>,
    /// Whether the document was rewritten.
    pub changed: bool,
}

/// Rendered document text and the images produced for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub text: String,
    pub rendered: Vec<String>,
}

/// Whether a chunk needs its image (re)rendered.
pub fn should_render(chunk: &Chunk) -> bool {
    chunk.as_renderable().is_some_and(RenderableChunk::is_stale)
}

pub struct Processor {
    registry: RendererRegistry,
    settings: Settings,
}

impl Processor {
    pub fn new(registry: RendererRegistry, settings: Settings) -> Self {
        Processor { registry, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Process files strictly in order, stopping at the first error.
    pub fn process_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        out: &mut dyn Write,
    ) -> Result<Vec<FileReport>, ProcessError> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.process_file(path.as_ref(), out)?);
        }
        Ok(reports)
    }

    /// Render every stale block of a document and rewrite it if anything changed.
    ///
    /// A progress line `file=<path> rendered=<name>` is written to `out` for
    /// each image produced.
    pub fn process_file(&self, path: &Path, out: &mut dyn Write) -> Result<FileReport, ProcessError> {
        validate_input(path)?;
        let source = fs::read_to_string(path).map_err(|source| ProcessError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let output_dir = self.output_dir_for(path);
        let RenderedDocument { text, rendered } =
            self.render_document(path, &source, &output_dir, out)?;

        let changed = text != source;
        if changed {
            store(path, &text)?;
            info!("updated {}", path.display());
        } else {
            debug!("{} is up to date", path.display());
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            rendered,
            changed,
        })
    }

    /// Chunk `source`, render stale blocks into `output_dir`, and reassemble.
    ///
    /// `path` is used for messages only; nothing is read from it.
    pub fn render_document(
        &self,
        path: &Path,
        source: &str,
        output_dir: &Path,
        out: &mut dyn Write,
    ) -> Result<RenderedDocument, ProcessError> {
        let document = Document::parse(source);
        let mut chunks = Chunker::new(&self.settings.languages, 0)
            .split(&document)
            .map_err(|error| ProcessError::Parse {
                path: path.to_path_buf(),
                text: source.to_string(),
                error,
            })?;

        let mut rendered = Vec::new();
        for chunk in &mut chunks {
            if !should_render(chunk) {
                if let Some(chunk) = chunk.as_renderable() {
                    debug!(
                        "skipping unchanged {} block at line {}",
                        chunk.language,
                        chunk.span.start + 1
                    );
                }
                continue;
            }
            let Some(chunk) = chunk.as_renderable_mut() else {
                continue;
            };
            let file_name = self.render_chunk(path, chunk, output_dir)?;
            writeln!(out, "file={} rendered={}", path.display(), file_name)
                .map_err(ProcessError::Output)?;
            rendered.push(file_name);
        }

        Ok(RenderedDocument {
            text: join(&chunks),
            rendered,
        })
    }

    /// Render one block, write its image, and point the marker line at it.
    pub fn render_chunk(
        &self,
        path: &Path,
        chunk: &mut RenderableChunk,
        output_dir: &Path,
    ) -> Result<String, ProcessError> {
        let renderer =
            self.registry
                .get(&chunk.language)
                .ok_or_else(|| ProcessError::UnsupportedLanguage {
                    path: path.to_path_buf(),
                    language: chunk.language.clone(),
                })?;

        let (file_name, format) = match &chunk.options.filename {
            Some(name) => (
                name.clone(),
                ImageFormat::from_file_name(name).unwrap_or_else(|| renderer.default_format()),
            ),
            None => {
                let format = renderer.default_format();
                (render_file_name(&chunk.fingerprint(), format.extension()), format)
            }
        };

        debug!(
            "rendering {} block at line {} as {}",
            chunk.language,
            chunk.span.start + 1,
            file_name
        );
        let bytes = renderer
            .render(&chunk.source_text(), format)
            .map_err(|source| ProcessError::Render {
                path: path.to_path_buf(),
                source,
            })?;

        let target = output_dir.join(&file_name);
        write_image(&target, &bytes).map_err(|source| ProcessError::Write {
            path: target.clone(),
            source,
        })?;

        chunk.set_marker_line(image_reference(&file_name, &self.settings.link_prefix));
        Ok(file_name)
    }

    fn output_dir_for(&self, path: &Path) -> PathBuf {
        match &self.settings.output_dir {
            Some(dir) => dir.clone(),
            None => parent_dir(path).to_path_buf(),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

fn validate_input(path: &Path) -> Result<(), ProcessError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(ProcessError::IsDirectory {
            path: path.to_path_buf(),
        }),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ProcessError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ProcessError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_image(target: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::create_dir_all(parent_dir(target))?;
    fs::write(target, bytes)
}

/// Replace the document in one step: write a sibling temp file, then rename it
/// over the original. The original's permissions are kept.
fn store(path: &Path, text: &str) -> Result<(), ProcessError> {
    let write_error = |source: io::Error| ProcessError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path).map_err(write_error)?;
    let permissions = fs::metadata(&target).map_err(write_error)?.permissions();

    let mut tmp = NamedTempFile::new_in(parent_dir(&target)).map_err(write_error)?;
    tmp.write_all(text.as_bytes()).map_err(write_error)?;
    tmp.as_file().set_permissions(permissions).map_err(write_error)?;
    tmp.persist(&target).map_err(|e| write_error(e.error))?;
    Ok(())
}
