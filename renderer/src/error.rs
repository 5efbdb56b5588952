use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use mdrender::ParseError;
use thiserror::Error;

use crate::format::ImageFormat;

/// Failure of an external renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot run `{program}`: {source}")]
    CommandNotFound { program: String, source: io::Error },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("`{program}` timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("I/O error talking to `{program}`: {source}")]
    Io { program: String, source: io::Error },

    #[error("`{program}` cannot produce {format} images")]
    UnsupportedFormat { program: String, format: ImageFormat },

    #[error("{0}")]
    Other(String),
}

/// Failure while processing one document. Aborts the whole run.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("{} is a directory", path.display())]
    IsDirectory { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Carries the document text so the caller can point at the offending line.
    #[error("{}: {error}", path.display())]
    Parse {
        path: PathBuf,
        text: String,
        error: ParseError,
    },

    #[error("{}: no renderer registered for language `{language}`", path.display())]
    UnsupportedLanguage { path: PathBuf, language: String },

    #[error("{}: {source}", path.display())]
    Render { path: PathBuf, source: RenderError },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot remove {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },

    #[error("cannot write progress output: {0}")]
    Output(io::Error),
}
