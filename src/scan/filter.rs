//! Layered exclusion rules for the repository scanner.
//!
//! Three independent rule sets decide whether a candidate is skipped:
//! path glob patterns (files and directories), filename/stem matches
//! (files only), and exact file matches (files only). Files that survive
//! all three are then gated by an extension allow-list.
//!
//! Rules are collected with builder-style adds on [`ExclusionRules`] and
//! compiled once into an [`ExclusionFilter`]; the filter is immutable for
//! the duration of a scan.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

/// Extensions analyzed by default. The empty string stands for
/// extensionless files (Makefile, LICENSE, shell scripts without suffix).
/// Callers may extend this set but never shrink it implicitly.
const DEFAULT_EXTENSIONS: &[&str] = &[
    "", "c", "cc", "cpp", "css", "go", "h", "hpp", "htm", "html", "java", "js", "jsx", "less",
    "md", "php", "py", "rb", "rs", "sass", "scss", "sh", "sql", "toml", "ts", "tsx", "yaml", "yml",
];

/// Exclusion rule sets collected prior to a scan.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    path_globs: Vec<String>,
    filenames: HashSet<String>,
    files: HashSet<String>,
    extensions: HashSet<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionRules {
    pub fn new() -> Self {
        Self {
            path_globs: Vec::new(),
            filenames: HashSet::new(),
            files: HashSet::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Exclude everything matching a glob pattern, where `*` matches any
    /// sequence of characters including `/`.
    ///
    /// Patterns apply to repository-relative paths and are anchored, so
    /// `build/*` prunes the top-level `build` directory (and everything
    /// under it) without touching `src/build`; use `*/build/*` to reach
    /// nested directories.
    pub fn exclude_path(mut self, pattern: impl Into<String>) -> Self {
        self.path_globs.push(pattern.into());
        self
    }

    /// Exclude files whose name equals `name`, with or without extension
    /// (`mod.rs` and `mod` both match a file named `mod.rs`).
    pub fn exclude_filename(mut self, name: impl Into<String>) -> Self {
        self.filenames.insert(name.into());
        self
    }

    /// Exclude one exact file, given relative to the repository root.
    pub fn exclude_file(mut self, path: impl Into<String>) -> Self {
        self.files.insert(normalize_separators(&path.into()));
        self
    }

    /// Accept an additional file extension. Pass `""` to accept
    /// extensionless files (already accepted by default).
    pub fn allow_extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.insert(ext.into());
        self
    }

    /// Compile the collected rules into an immutable filter. Each glob is
    /// translated and compiled exactly once here, not per candidate.
    pub fn build(self) -> Result<ExclusionFilter> {
        let patterns = self
            .path_globs
            .iter()
            .map(|glob| glob_to_regex(glob))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExclusionFilter {
            patterns,
            filenames: self.filenames,
            files: self.files,
            extensions: self.extensions,
        })
    }
}

/// Translate a glob into an anchored regex: `*` becomes `.*`, everything
/// else is matched literally.
fn glob_to_regex(glob: &str) -> Result<Regex> {
    let normalized = normalize_separators(glob);
    let translated = normalized
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{translated}$"))
        .with_context(|| format!("invalid exclude pattern: {glob}"))
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Compiled, immutable exclusion rules.
#[derive(Debug)]
pub struct ExclusionFilter {
    patterns: Vec<Regex>,
    filenames: HashSet<String>,
    files: HashSet<String>,
    extensions: HashSet<String>,
}

impl ExclusionFilter {
    /// Whether a candidate should be skipped. `rel_path` is the
    /// repository-relative path with `/` separators. Excluded directories
    /// are not descended into.
    pub fn is_excluded(&self, rel_path: &str, is_dir: bool) -> bool {
        // Directories are probed with a trailing slash as well, so a
        // `build/*` pattern prunes `build` itself.
        let dir_probe;
        let probe: &str = if is_dir {
            dir_probe = format!("{rel_path}/");
            &dir_probe
        } else {
            rel_path
        };
        if self
            .patterns
            .iter()
            .any(|re| re.is_match(probe) || (is_dir && re.is_match(rel_path)))
        {
            return true;
        }

        if is_dir {
            return false;
        }

        let name = Path::new(rel_path)
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let stem = Path::new(name.as_ref())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.filenames.contains(name.as_ref()) || self.filenames.contains(&stem) {
            return true;
        }

        self.files.contains(rel_path)
    }

    /// Allow-list gate, applied last: a file is analyzed only when its
    /// extension (or `""` for none) is in the set. Files failing this are
    /// silently omitted, not reported as excluded.
    pub fn extension_allowed(&self, rel_path: &str) -> bool {
        let ext = Path::new(rel_path)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.extensions.contains(&ext)
    }
}
