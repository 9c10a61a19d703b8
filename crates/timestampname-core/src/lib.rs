pub mod listing;
pub mod metadata;
pub mod rename;

use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use listing::InputFile;
use metadata::FileSource;
use rename::{FileMetadata, RenameOperation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Folder whose media files get renamed.
    pub dir: PathBuf,
    /// Plan and verify only.
    #[serde(default)]
    pub dry_run: bool,
    /// Leave out the ordinal counter in target names.
    #[serde(default)]
    pub no_prefix: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub files_found: u64,
    pub operations: Vec<RenameOperation>,
    pub files_renamed: u64,
}

/// Type alias for progress callback: `(stage, current, total, message)`.
///
/// Stages are reported in order: `scan`, `extract`, `verify`, `rename`.
/// `extract` is reported from worker threads.
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Open `file` and extract its capture timestamp.
pub fn extract_file_timestamp(file: &InputFile) -> anyhow::Result<String> {
    let handle =
        File::open(&file.path).with_context(|| format!("{}: failed to open", file.name))?;
    let source = FileSource::new(handle, file.name.clone())
        .with_context(|| format!("{}: failed to stat", file.name))?;
    metadata::extract_timestamp_for_extension(&source, &file.ext)
        .with_context(|| format!("{}: failed to extract {} timestamp", file.name, file.kind.label()))
}

/// Extract timestamps of all files in parallel. Fails with the first error
/// in listing order.
pub fn extract_all(
    files: Vec<InputFile>,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<Vec<FileMetadata>> {
    let total = files.len() as u64;
    let counter = AtomicU64::new(0);

    let results: Vec<anyhow::Result<FileMetadata>> = files
        .into_par_iter()
        .map(|file| {
            let result = extract_file_timestamp(&file).map(|timestamp| FileMetadata { file, timestamp });
            let current = counter.fetch_add(1, Ordering::Relaxed);
            progress_callback("extract", current, total, "");
            result
        })
        .collect();

    results.into_iter().collect()
}

/// Run the full pipeline: list, extract, plan, verify, rename.
pub fn process(
    options: &ProcessOptions,
    progress_callback: &ProgressCallback<'_>,
) -> anyhow::Result<ProcessResult> {
    // Stage 1: Scan folder
    let files = listing::list_files(&options.dir)?;
    let files_found = files.len() as u64;
    progress_callback("scan", files_found, files_found, "");
    if files.is_empty() {
        return Ok(ProcessResult {
            files_found,
            operations: vec![],
            files_renamed: 0,
        });
    }

    // Stage 2: Extract timestamps
    let metadata = extract_all(files, progress_callback)?;

    // Stage 3: Plan and verify
    let plan = rename::plan_renames(metadata, options.no_prefix)?;
    let total = plan.operations.len() as u64;
    for (index, operation) in plan.operations.iter().enumerate() {
        let line = format!(
            "{:>width$}    =>    {}",
            operation.from_name,
            operation.to_name,
            width = plan.longest_source_name
        );
        progress_callback("verify", index as u64, total, &line);
    }
    rename::verify_operations(&plan.operations)?;

    // Stage 4: Rename
    let mut files_renamed = 0;
    if !options.dry_run {
        for (index, operation) in plan.operations.iter().enumerate() {
            progress_callback("rename", index as u64, total, &operation.to_name);
            rename::execute_operation(operation)?;
            files_renamed += 1;
        }
    }

    Ok(ProcessResult {
        files_found,
        operations: plan.operations,
        files_renamed,
    })
}
