use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sat_parser_core::{DocumentKind, FileCandidate};

/// Builds an upload candidate from a local path. The declared MIME type comes
/// from the extension, as a browser file picker would report it.
pub fn candidate_from_path(path: &Path) -> Result<FileCandidate> {
    let meta = fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileCandidate::new(
        name,
        DocumentKind::mime_for_path(path),
        meta.len(),
        path,
    ))
}
