//! Reading the interface-definition documents the tree is generated from.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::contract::SourceDocuments;
use crate::error::SourceError;

const SKIPPED_DIRS: &[&str] = &[".git", "target", "node_modules"];

/// Recursively collects every `*.{extension}` file under `dir`, keyed by its
/// `/`-separated path relative to `dir`.
pub fn read_source_documents(dir: &Path, extension: &str) -> Result<SourceDocuments, SourceError> {
    info!(dir = %dir.display(), extension, "Scanning for source documents");

    fn visit_dir(
        dir: &Path,
        root: &Path,
        extension: &str,
        documents: &mut SourceDocuments,
    ) -> Result<(), SourceError> {
        let read_err = |source| SourceError::Read {
            path: dir.to_path_buf(),
            source,
        };
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if SKIPPED_DIRS.contains(&name) {
                    debug!(path = %path.display(), "Skipping directory");
                    continue;
                }
                visit_dir(&path, root, extension, documents)?;
            } else if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(extension)
            {
                let text = fs::read_to_string(&path).map_err(|source| SourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                let relative = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                debug!(file = %relative, size = text.len(), "Read source document");
                documents.insert(relative, text);
            }
        }
        Ok(())
    }

    let mut documents = SourceDocuments::new();
    visit_dir(dir, dir, extension, &mut documents)?;

    if documents.is_empty() {
        return Err(SourceError::NoDocuments {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    info!(count = documents.len(), "Collected source documents");
    Ok(documents)
}
