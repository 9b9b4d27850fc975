//! Authorship analysis engine.
//!
//! Control flow: scan the working tree (exclusion rules applied during
//! traversal), run the external blame command for each eligible file,
//! parse the raw text into per-line records, and accumulate them into a
//! per-author report. A file whose blame output cannot be obtained or
//! parsed costs nothing but its own lines; the rest of the report is
//! preserved.

pub mod blame;
pub mod report;

pub use blame::BlameLineRecord;
pub use report::{AnalysisReport, AuthorStats, UNCOMMITTED};

use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::scan::{self, ExclusionFilter};

/// Build the authorship report for the tree under `root`.
///
/// `blame_invoker` runs the external blame command for one file and
/// returns its raw textual output. Fully sequential; each invocation
/// blocks until the subprocess output is buffered.
pub fn analyze<F>(root: &Path, filter: &ExclusionFilter, blame_invoker: F) -> Result<AnalysisReport>
where
    F: Fn(&Path) -> Result<String>,
{
    let files = scan::scan(root, filter)?;
    debug!("analyzing {} files", files.len());

    let mut report = AnalysisReport::new();
    for file in &files {
        accumulate_file(&mut report, file, &blame_invoker);
    }
    Ok(report)
}

/// Parallel variant of [`analyze`]: files fan out across the rayon pool,
/// each worker folds its share into a partial report, and partials merge
/// by summing counters. Accumulation is pure counting, so the result is
/// identical to the sequential pass regardless of scheduling.
pub fn analyze_parallel<F>(
    root: &Path,
    filter: &ExclusionFilter,
    blame_invoker: F,
) -> Result<AnalysisReport>
where
    F: Fn(&Path) -> Result<String> + Sync,
{
    let files = scan::scan(root, filter)?;
    debug!("analyzing {} files across the thread pool", files.len());

    let report = files
        .par_iter()
        .fold(AnalysisReport::new, |mut partial, file| {
            accumulate_file(&mut partial, file, &blame_invoker);
            partial
        })
        .reduce(AnalysisReport::new, |mut merged, partial| {
            merged.merge(partial);
            merged
        });
    Ok(report)
}

fn accumulate_file<F>(report: &mut AnalysisReport, file: &Path, blame_invoker: &F)
where
    F: Fn(&Path) -> Result<String>,
{
    match blame_invoker(file) {
        Ok(raw) => {
            for record in blame::parse(&raw) {
                report.accumulate(&record);
            }
        }
        Err(e) => warn!("blame failed for {}: {e:#}", file.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ExclusionRules;
    use std::fs;

    /// Canned blame output keyed by file name; stands in for the external
    /// git invocation.
    fn canned_blame(file: &Path) -> Result<String> {
        let name = file.file_name().unwrap().to_string_lossy();
        Ok(match name.as_ref() {
            "a.rs" => "(Jane 2021-03-04 10:00:00 +0000 1) x\n(Jane 2021-03-04 10:00:00 +0000 2) y\n".to_string(),
            "b.rs" => "(Bob 2020-01-01 00:00:00 +0000 1) z\n".to_string(),
            _ => String::new(),
        })
    }

    fn tree_with(files: &[&str]) -> Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        for name in files {
            fs::write(dir.path().join(name), "content\n")?;
        }
        Ok(dir)
    }

    #[test]
    fn sequential_and_parallel_agree() -> Result<()> {
        let dir = tree_with(&["a.rs", "b.rs"])?;
        let filter = ExclusionRules::new().build()?;

        let sequential = analyze(dir.path(), &filter, canned_blame)?;
        let parallel = analyze_parallel(dir.path(), &filter, canned_blame)?;

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.total_lines(), 3);
        assert_eq!(sequential.authors()["Jane"].all_lines, 2);
        assert_eq!(sequential.authors()["Bob"].all_lines, 1);
        Ok(())
    }

    #[test]
    fn one_failing_file_preserves_the_rest() -> Result<()> {
        let dir = tree_with(&["a.rs", "b.rs"])?;
        let filter = ExclusionRules::new().build()?;

        let flaky = |file: &Path| -> Result<String> {
            if file.ends_with("b.rs") {
                anyhow::bail!("simulated blame failure");
            }
            canned_blame(file)
        };

        let report = analyze(dir.path(), &filter, flaky)?;
        assert_eq!(report.authors()["Jane"].all_lines, 2);
        assert!(!report.authors().contains_key("Bob"));
        Ok(())
    }

    #[test]
    fn empty_repository_yields_empty_report() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let filter = ExclusionRules::new().build()?;
        let report = analyze(dir.path(), &filter, canned_blame)?;
        assert!(report.is_empty());
        Ok(())
    }
}
