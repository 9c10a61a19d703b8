use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::metadata::MediaKind;

/// A supported media file found in the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: PathBuf,
    /// File name without directory.
    pub name: String,
    /// Lowercase extension including the dot, e.g. ".jpg".
    pub ext: String,
    pub kind: MediaKind,
}

impl InputFile {
    /// `None` when the path has no usable name or an unsupported extension.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let ext = format!(".{}", path.extension()?.to_str()?.to_ascii_lowercase());
        let kind = MediaKind::from_extension(&ext)?;
        Some(Self {
            path,
            name,
            ext,
            kind,
        })
    }
}

/// Supported files directly inside `dir`, sorted by name. Subdirectories are not entered.
pub fn list_files(dir: &Path) -> anyhow::Result<Vec<InputFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("error reading contents of folder {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            continue;
        }
        if let Some(file) = InputFile::from_path(path) {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
