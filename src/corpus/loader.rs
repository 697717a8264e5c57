use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};
use crate::error::ClientError;

/// A loaded support file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportDocument {
    pub source: PathBuf,
    pub text:   String,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Loads every regular file under `dir`, recursively, in path order.
///
/// Hidden files and directories are skipped, as are files that are not
/// valid UTF-8.
pub fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<SupportDocument>, ClientError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ClientError::Io {
            path:    dir.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut docs = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable corpus entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let bytes = std::fs::read(path).map_err(|e| ClientError::Io {
            path:    path.display().to_string(),
            message: e.to_string(),
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => docs.push(SupportDocument { source: path.to_path_buf(), text }),
            Err(_) => tracing::warn!(path = %path.display(), "skipping non-UTF-8 document"),
        }
    }

    tracing::info!(dir = %dir.display(), documents = docs.len(), "support corpus loaded");
    Ok(docs)
}
