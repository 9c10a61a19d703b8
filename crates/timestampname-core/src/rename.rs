use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::listing::InputFile;

/// A file together with its extracted capture timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file: InputFile,
    /// Canonical `YYYYMMDD-HHMMSS`.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOperation {
    pub from: PathBuf,
    pub to: PathBuf,
    pub from_name: String,
    pub to_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub operations: Vec<RenameOperation>,
    /// Length of the longest source name, for aligned listings.
    pub longest_source_name: usize,
}

/// Digits of the ordinal prefix for `total` files.
fn counter_width(total: usize) -> anyhow::Result<usize> {
    match total {
        0..=9 => Ok(1),
        10..=99 => Ok(2),
        100..=999 => Ok(3),
        1_000..=9_999 => Ok(4),
        10_000..=99_999 => Ok(5),
        _ => bail!("too many files: {}", total),
    }
}

fn target_name(counter: usize, width: Option<usize>, metadata: &FileMetadata) -> String {
    match width {
        Some(width) => format!(
            "{:0width$}-{}{}",
            counter,
            metadata.timestamp,
            metadata.file.ext,
            width = width
        ),
        None => format!("{}{}", metadata.timestamp, metadata.file.ext),
    }
}

/// Order files by capture time and assign target names.
///
/// Files sharing a timestamp keep shorter names first, then sort by name,
/// which keeps Android same-second shots (`20180430_184327.jpg`,
/// `20180430_184327(0).jpg`) in shooting order.
pub fn plan_renames(mut files: Vec<FileMetadata>, no_prefix: bool) -> anyhow::Result<RenamePlan> {
    let mut seen = HashSet::new();
    for metadata in &files {
        if !seen.insert(metadata.file.path.as_path()) {
            bail!("{}: encountered twice", metadata.file.name);
        }
    }

    files.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.file.name.len().cmp(&b.file.name.len()))
            .then_with(|| a.file.name.cmp(&b.file.name))
    });

    let width = if no_prefix {
        None
    } else {
        Some(counter_width(files.len())?)
    };

    let mut longest_source_name = 0;
    let operations = files
        .iter()
        .enumerate()
        .map(|(index, metadata)| {
            let to_name = target_name(index + 1, width, metadata);
            longest_source_name = longest_source_name.max(metadata.file.name.len());
            RenameOperation {
                from: metadata.file.path.clone(),
                to: metadata.file.path.with_file_name(&to_name),
                from_name: metadata.file.name.clone(),
                to_name,
            }
        })
        .collect();

    Ok(RenamePlan {
        operations,
        longest_source_name,
    })
}

/// Fail on two operations sharing a target, or on a target that already
/// exists and is not the file being renamed.
fn verify_operation(operation: &RenameOperation, targets: &mut HashSet<PathBuf>) -> anyhow::Result<()> {
    if !targets.insert(operation.to.clone()) {
        bail!("{}: duplicate rename", operation.to_name);
    }
    if operation.from != operation.to && operation.to.exists() {
        bail!("{}: exists on file system", operation.to_name);
    }
    Ok(())
}

pub fn verify_operations(operations: &[RenameOperation]) -> anyhow::Result<()> {
    let mut targets = HashSet::with_capacity(operations.len());
    operations
        .iter()
        .try_for_each(|operation| verify_operation(operation, &mut targets))
}

/// Rename the file and make it read-only.
pub fn execute_operation(operation: &RenameOperation) -> anyhow::Result<()> {
    fs::rename(&operation.from, &operation.to)
        .with_context(|| format!("{}: rename", operation.from_name))?;
    let mut permissions = fs::metadata(&operation.to)
        .with_context(|| format!("{}: stat", operation.to_name))?
        .permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&operation.to, permissions)
        .with_context(|| format!("{}: chmod", operation.to_name))?;
    Ok(())
}
