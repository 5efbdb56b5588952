//! Removal of content-addressed images no document links to anymore.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use mdrender::fingerprint::parse_render_file_name;

use crate::error::ProcessError;
use crate::format::ImageFormat;

/// Content-addressed images in `image_dir` whose names appear in none of `documents`.
///
/// Only names like `render-<fingerprint>.svg` are candidates, so explicitly
/// named renders and unrelated files are never reported. Results are sorted.
pub fn find_orphans<P: AsRef<Path>>(
    documents: &[P],
    image_dir: &Path,
) -> Result<Vec<PathBuf>, ProcessError> {
    let mut contents = Vec::with_capacity(documents.len());
    for path in documents {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProcessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        contents.push(text);
    }

    let read_dir_error = |source| ProcessError::Read {
        path: image_dir.to_path_buf(),
        source,
    };
    let mut orphans = Vec::new();
    for entry in fs::read_dir(image_dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        if !entry.file_type().map_err(read_dir_error)?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_render_image(name) {
            continue;
        }
        if contents.iter().any(|text| text.contains(name)) {
            debug!("{} is still referenced", name);
            continue;
        }
        orphans.push(entry.path());
    }

    orphans.sort();
    Ok(orphans)
}

/// Delete the given files, stopping at the first failure.
pub fn remove_files(paths: &[PathBuf]) -> Result<(), ProcessError> {
    for path in paths {
        fs::remove_file(path).map_err(|source| ProcessError::Remove {
            path: path.clone(),
            source,
        })?;
        info!("removed {}", path.display());
    }
    Ok(())
}

fn is_render_image(name: &str) -> bool {
    parse_render_file_name(name)
        .is_some_and(|(_, extension)| ImageFormat::from_extension(extension).is_some())
}
