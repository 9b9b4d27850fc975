//! Git CLI facade.
//!
//! Wraps the external `git` executable for repository introspection:
//! branch discovery and switching, remote listing, the small
//! add/commit/push/pull/init orchestration, and the per-author authorship
//! analysis built from line-level blame output.
//!
//! All invocations are structured (program + argument list + working
//! directory); every parse of git's textual output is best-effort, and the
//! only fatal condition is a git executable that cannot be spawned at all,
//! which is detected once when the client is opened.

pub mod branches;
pub mod remotes;

pub use branches::{plan_checkout, BranchSet, CheckoutAction};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::analysis::{self, AnalysisReport};
use crate::exec::{CommandRunner, SystemRunner};
use crate::scan::ExclusionRules;

/// Client for one repository working directory.
pub struct GitClient {
    repo: PathBuf,
    program: String,
    runner: Box<dyn CommandRunner>,
}

impl std::fmt::Debug for GitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitClient")
            .field("repo", &self.repo)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl GitClient {
    /// Open a client for `repo` using the `git` found on `PATH`.
    pub fn open(repo: impl Into<PathBuf>) -> Result<Self> {
        Self::with_runner(repo, "git", Box::new(SystemRunner))
    }

    /// Open a client invoking a specific git executable (absolute path
    /// when `git` is not directly resolvable).
    pub fn with_program(repo: impl Into<PathBuf>, program: impl Into<String>) -> Result<Self> {
        Self::with_runner(repo, program, Box::new(SystemRunner))
    }

    /// Open a client with a caller-supplied [`CommandRunner`].
    ///
    /// The executable is probed once with `--version`; an unresolvable
    /// program is the one fatal startup condition. Everything after this
    /// point degrades to empty or partial results instead of failing.
    pub fn with_runner(
        repo: impl Into<PathBuf>,
        program: impl Into<String>,
        runner: Box<dyn CommandRunner>,
    ) -> Result<Self> {
        let client = Self {
            repo: normalize_repo_path(repo.into()),
            program: program.into(),
            runner,
        };
        client
            .runner
            .run(&client.program, &["--version"], Path::new("."))
            .context("git is required but could not be invoked")?;
        Ok(client)
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        Ok(self.runner.run(&self.program, args, &self.repo)?)
    }

    /// All branch names, local and remote-tracking collapsed together,
    /// with the current branch marked.
    pub fn branches(&self) -> Result<BranchSet> {
        Ok(BranchSet::parse(&self.git(&["branch", "-a"])?))
    }

    /// The checked-out branch, derived freshly from the branch listing.
    /// Empty string when it cannot be determined (detached HEAD, empty
    /// repository).
    pub fn current_branch(&self) -> Result<String> {
        Ok(self.branches()?.current().to_string())
    }

    /// Case-insensitive branch existence test.
    pub fn has_branch(&self, name: &str) -> Result<bool> {
        Ok(self.branches()?.contains(name))
    }

    /// Switch to `name`, creating the branch when it does not exist yet.
    /// Blank names are ignored. Returns the action that was taken.
    pub fn checkout(&self, name: &str) -> Result<CheckoutAction> {
        let action = plan_checkout(name, &self.branches()?);
        let name = name.trim();
        match action {
            CheckoutAction::Switch => {
                self.git(&["checkout", name])?;
                info!("switched to branch {name}");
            }
            CheckoutAction::CreateAndSwitch => {
                self.git(&["checkout", "-b", name])?;
                info!("created and switched to branch {name}");
            }
            CheckoutAction::NoOp => {}
        }
        Ok(action)
    }

    /// Remote name → url pairs from `git remote -v`.
    pub fn remotes(&self) -> Result<HashMap<String, String>> {
        Ok(remotes::parse_remotes(&self.git(&["remote", "-v"])?))
    }

    /// Whether the repository path, or any ancestor up to the filesystem
    /// root, holds a `.git` directory.
    pub fn is_repo(&self) -> bool {
        self.repo.ancestors().any(|p| p.join(".git").is_dir())
    }

    /// Initialize a repository at the client's path.
    pub fn init(&self) -> Result<()> {
        self.git(&["init"])?;
        Ok(())
    }

    /// Stage a pathspec (callers usually pass `.`).
    pub fn add(&self, pathspec: &str) -> Result<()> {
        self.git(&["add", pathspec])?;
        Ok(())
    }

    /// Commit staged changes; the message is prefixed with the current
    /// local timestamp.
    pub fn commit(&self, message: &str) -> Result<()> {
        let stamped = format!("{} {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        self.git(&["commit", "-m", stamped.as_str()])?;
        Ok(())
    }

    /// Push the current branch to every configured remote.
    pub fn push(&self) -> Result<()> {
        let branch = self.current_branch()?;
        for remote in self.remotes()?.keys() {
            self.git(&["push", remote.as_str(), branch.as_str()])?;
        }
        Ok(())
    }

    /// Pull the current branch from every configured remote.
    pub fn pull(&self) -> Result<()> {
        let branch = self.current_branch()?;
        for remote in self.remotes()?.keys() {
            self.git(&["pull", remote.as_str(), branch.as_str()])?;
        }
        Ok(())
    }

    /// Raw blame text for one file of the working tree.
    pub fn blame_file(&self, file: &Path) -> Result<String> {
        let file = file.to_string_lossy();
        self.git(&["blame", file.as_ref()])
    }

    /// Per-author authorship report for the working tree, honoring the
    /// given exclusion rules. Fully sequential.
    pub fn authorship(&self, rules: ExclusionRules) -> Result<AnalysisReport> {
        let filter = rules.build()?;
        analysis::analyze(&self.repo, &filter, |file| self.blame_file(file))
    }

    /// Parallel variant of [`GitClient::authorship`]; per-file blame
    /// invocations fan out across the rayon pool and partial reports
    /// merge at the end.
    pub fn authorship_parallel(&self, rules: ExclusionRules) -> Result<AnalysisReport> {
        let filter = rules.build()?;
        analysis::analyze_parallel(&self.repo, &filter, |file| self.blame_file(file))
    }
}

/// Normalize separators to `/` and trim any trailing slash, mirroring how
/// paths are compared against exclusion rules.
fn normalize_repo_path(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy().replace('\\', "/");
    let trimmed = if s.len() > 1 {
        s.trim_end_matches('/').to_string()
    } else {
        s
    };
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecError;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

    /// Scripted runner: hands back canned output per subcommand and logs
    /// every invocation.
    struct ScriptedRunner {
        branch_listing: String,
        remote_listing: String,
        calls: CallLog,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, _program: &str, args: &[&str], _cwd: &Path) -> Result<String, ExecError> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|a| a.to_string()).collect());
            Ok(match args.first().copied() {
                Some("branch") => self.branch_listing.clone(),
                Some("remote") => self.remote_listing.clone(),
                _ => String::new(),
            })
        }
    }

    fn scripted_client(branch_listing: &str, remote_listing: &str) -> (GitClient, CallLog) {
        let calls: CallLog = Arc::default();
        let runner = ScriptedRunner {
            branch_listing: branch_listing.to_string(),
            remote_listing: remote_listing.to_string(),
            calls: Arc::clone(&calls),
        };
        let client = GitClient::with_runner("/repo", "git", Box::new(runner)).unwrap();
        (client, calls)
    }

    #[test]
    fn current_branch_is_derived_freshly_each_time() -> Result<()> {
        let (client, calls) = scripted_client("* main\n  dev\n", "");
        assert_eq!(client.current_branch()?, "main");
        assert_eq!(client.current_branch()?, "main");
        // --version probe plus two branch listings, no caching in between.
        let listings = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some("branch"))
            .count();
        assert_eq!(listings, 2);
        Ok(())
    }

    #[test]
    fn checkout_switches_known_and_creates_unknown() -> Result<()> {
        let (client, calls) = scripted_client("* main\n  dev\n", "");
        assert_eq!(client.checkout("dev")?, CheckoutAction::Switch);
        assert_eq!(client.checkout("feature-x")?, CheckoutAction::CreateAndSwitch);
        assert_eq!(client.checkout("   ")?, CheckoutAction::NoOp);

        let calls = calls.lock().unwrap();
        assert!(calls.contains(&vec!["checkout".to_string(), "dev".to_string()]));
        assert!(calls.contains(&vec![
            "checkout".to_string(),
            "-b".to_string(),
            "feature-x".to_string()
        ]));
        Ok(())
    }

    #[test]
    fn push_targets_every_remote_with_current_branch() -> Result<()> {
        let (client, calls) =
            scripted_client("* main\n", "origin url-a (fetch)\nmirror url-b (fetch)\n");
        client.push()?;

        let calls = calls.lock().unwrap();
        let pushes: Vec<_> = calls
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some("push"))
            .collect();
        assert_eq!(pushes.len(), 2);
        for push in pushes {
            assert_eq!(push[2], "main");
        }
        Ok(())
    }

    #[test]
    fn empty_listings_degrade_to_empty_results() -> Result<()> {
        let (client, _calls) = scripted_client("", "");
        assert!(client.branches()?.is_empty());
        assert_eq!(client.current_branch()?, "");
        assert!(client.remotes()?.is_empty());
        Ok(())
    }

    #[test]
    fn repo_path_is_normalized() -> Result<()> {
        let runner = ScriptedRunner {
            branch_listing: String::new(),
            remote_listing: String::new(),
            calls: Arc::default(),
        };
        let client = GitClient::with_runner(r"C:\work\repo\", "git", Box::new(runner))?;
        assert_eq!(client.repo(), Path::new("C:/work/repo"));
        Ok(())
    }
}
