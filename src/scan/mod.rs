//! Repository tree scanner.
//!
//! Walks the working tree breadth-first, consulting the exclusion filter
//! at every directory and file, and returns the files eligible for
//! analysis in discovery order.

pub mod filter;

pub use filter::{ExclusionFilter, ExclusionRules};

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

/// Walk the tree under `root` and collect every file that passes the
/// exclusion rules and the extension allow-list.
///
/// Excluded directories are pruned without descent. Dot-prefixed entries
/// (`.git`, editor droppings) are never surfaced, and unreadable
/// directories are skipped rather than failing the scan.
pub fn scan(root: &Path, filter: &ExclusionFilter) -> Result<Vec<PathBuf>> {
    let mut queue: VecDeque<PathBuf> = VecDeque::from([root.to_path_buf()]);
    let mut files = Vec::new();

    while let Some(dir) = queue.pop_front() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let rel = match path.strip_prefix(root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            if path.is_dir() {
                if !filter.is_excluded(&rel, true) {
                    queue.push_back(path);
                }
            } else if path.is_file()
                && !filter.is_excluded(&rel, false)
                && filter.extension_allowed(&rel)
            {
                files.push(path);
            }
        }
    }

    debug!("scan of {} found {} eligible files", root.display(), files.len());
    Ok(files)
}
