//! CLI command definitions and handlers

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::AnalysisReport;
use crate::git::{CheckoutAction, GitClient};
use crate::scan::ExclusionRules;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Gitscope - git repository introspection
#[derive(Parser, Debug)]
#[command(name = "gitscope")]
#[command(
    version,
    about = "Git repository introspection — branches, remotes, and per-author authorship analysis",
    after_help = "\
Examples:
  gitscope branches                    List branches, current one marked
  gitscope checkout feature-x          Switch, creating the branch if needed
  gitscope analyze --format json       Authorship report as JSON
  gitscope analyze --exclude-path 'vendor/*' --ext proto
  gitscope analyze --workers 8         Blame files in parallel"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, long, default_value = ".")]
    pub repo: PathBuf,

    /// Git executable to invoke (absolute path if not on PATH)
    #[arg(global = true, long, default_value = "git")]
    pub git_bin: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List branches; the current branch is marked with *
    Branches,

    /// Switch to a branch, creating it when it does not exist
    Checkout {
        /// Branch name (blank input is a no-op)
        name: String,
    },

    /// List configured remotes (name and url)
    Remotes,

    /// Per-author authorship report from line-level blame data
    Analyze {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Exclude paths matching a glob pattern, repo-relative (repeatable)
        #[arg(long = "exclude-path", value_name = "GLOB")]
        exclude_path: Vec<String>,

        /// Exclude files by name, with or without extension (repeatable)
        #[arg(long = "exclude-name", value_name = "NAME")]
        exclude_name: Vec<String>,

        /// Exclude one exact file, relative to the repo root (repeatable)
        #[arg(long = "exclude-file", value_name = "PATH")]
        exclude_file: Vec<String>,

        /// Additional file extensions to analyze (repeatable)
        #[arg(long = "ext", value_name = "EXT")]
        ext: Vec<String>,

        /// Number of parallel blame workers (1-64); 1 runs sequentially
        #[arg(long, default_value = "1", value_parser = parse_workers)]
        workers: usize,
    },

    /// Stage files for commit
    Add {
        /// Pathspec to stage
        #[arg(default_value = ".")]
        pathspec: String,
    },

    /// Commit staged changes with a timestamp-prefixed message
    Commit {
        /// Commit message body
        #[arg(short, long, default_value = "update")]
        message: String,
    },

    /// Push the current branch to every configured remote
    Push,

    /// Pull the current branch from every configured remote
    Pull,

    /// Initialize a repository at the given path
    Init,
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let client = GitClient::with_program(&cli.repo, &cli.git_bin)?;

    match cli.command {
        Commands::Branches => cmd_branches(&client),
        Commands::Checkout { name } => cmd_checkout(&client, &name),
        Commands::Remotes => cmd_remotes(&client),
        Commands::Analyze {
            format,
            exclude_path,
            exclude_name,
            exclude_file,
            ext,
            workers,
        } => cmd_analyze(
            &client,
            &format,
            exclude_path,
            exclude_name,
            exclude_file,
            ext,
            workers,
        ),
        Commands::Add { pathspec } => client.add(&pathspec),
        Commands::Commit { message } => client.commit(&message),
        Commands::Push => client.push(),
        Commands::Pull => client.pull(),
        Commands::Init => client.init(),
    }
}

fn cmd_branches(client: &GitClient) -> Result<()> {
    let set = client.branches()?;
    if set.is_empty() {
        println!("no branches");
        return Ok(());
    }
    for name in set.names() {
        if name == set.current() {
            println!("* {}", style(name).green().bold());
        } else {
            println!("  {name}");
        }
    }
    Ok(())
}

fn cmd_checkout(client: &GitClient, name: &str) -> Result<()> {
    match client.checkout(name)? {
        CheckoutAction::Switch => println!("switched to {name}"),
        CheckoutAction::CreateAndSwitch => println!("created and switched to {name}"),
        CheckoutAction::NoOp => println!("nothing to do"),
    }
    Ok(())
}

fn cmd_remotes(client: &GitClient) -> Result<()> {
    let remotes = client.remotes()?;
    if remotes.is_empty() {
        println!("no remotes");
        return Ok(());
    }
    let mut names: Vec<_> = remotes.keys().collect();
    names.sort();
    for name in names {
        println!("{}\t{}", style(name).bold(), remotes[name]);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    client: &GitClient,
    format: &str,
    exclude_path: Vec<String>,
    exclude_name: Vec<String>,
    exclude_file: Vec<String>,
    ext: Vec<String>,
    workers: usize,
) -> Result<()> {
    let mut rules = ExclusionRules::new();
    for glob in exclude_path {
        rules = rules.exclude_path(glob);
    }
    for name in exclude_name {
        rules = rules.exclude_filename(name);
    }
    for file in exclude_file {
        rules = rules.exclude_file(file);
    }
    for e in ext {
        rules = rules.allow_extension(e);
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
    );
    bar.set_message("blaming files");
    bar.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = if workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        pool.install(|| client.authorship_parallel(rules))?
    } else {
        client.authorship(rules)?
    };
    bar.finish_and_clear();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text_report(&report),
    }
    Ok(())
}

fn print_text_report(report: &AnalysisReport) {
    if report.is_empty() {
        println!("no blame data found");
        return;
    }

    println!(
        "{} lines across {} authors\n",
        style(report.total_lines()).bold(),
        report.authors().len()
    );

    for (author, stats) in report.authors() {
        println!("{}  {} lines", style(author).cyan().bold(), stats.all_lines);
        for (year, count) in &stats.by_year {
            println!("    {year}: {count}");
        }
    }
}
