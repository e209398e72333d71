//! CLI command definitions and handlers

mod blame;
mod files;
mod mine;
mod reference;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use git_forensics::batch::CancellationToken;
use git_forensics::config::{load_config, load_config_file, ForensicsConfig};
use git_forensics::models::LocationSet;
use git_forensics::reporters::OutputFormat;
use git_forensics::scm::ScmContext;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Exit status used when a pass was cancelled and partial results were printed
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Parse a `FILE:LINE` location argument
fn parse_location(s: &str) -> Result<(String, i32), String> {
    LocationSet::parse_entry(s).ok_or_else(|| format!("'{}' is not a valid location", s))
}

/// git-forensics - Git blame and repository mining
#[derive(Parser, Debug)]
#[command(name = "git-forensics")]
#[command(
    version,
    about = "Blame source locations and mine per-file Git history statistics",
    after_help = "\
Examples:
  git-forensics blame --location src/main.rs:42     Who last touched line 42
  git-forensics . blame --locations-file issues.txt Blame every path:line entry in a file
  git-forensics mine --format json                  History statistics for all files
  git-forensics reference --branch main             Latest commit shared with main
  git-forensics files --revision v1.0               Files tracked at a tag"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Output format: text, json
    #[arg(long, short = 'f', global = true, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Configuration file (overrides git-forensics.toml and the user config)
    #[arg(long, global = true, env = "GIT_FORENSICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// SCM kind to use instead of detecting it (e.g. git)
    #[arg(long, global = true)]
    pub scm: Option<String>,

    /// Stop after this many seconds and print partial results
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attribute source locations to authors and commits
    #[command(after_help = "\
Lines <= 0 (or a path without a line) blame the whole file with its last commit.
Locations files contain one path:line entry per line; # starts a comment.")]
    Blame {
        /// Revision to blame at (default: HEAD or [blame] revision)
        #[arg(long, short = 'r')]
        revision: Option<String>,

        /// Location to blame, as FILE:LINE (repeatable)
        #[arg(long, short = 'l', value_parser = parse_location)]
        location: Vec<(String, i32)>,

        /// File with one FILE:LINE entry per line
        #[arg(long)]
        locations_file: Option<PathBuf>,
    },

    /// Fold file histories into per-file statistics
    Mine {
        /// Revision whose history is mined (default: HEAD or [mining] revision)
        #[arg(long, short = 'r')]
        revision: Option<String>,

        /// Files to analyze (default: all files at the revision)
        files: Vec<String>,
    },

    /// Find the latest commit shared with a reference branch
    Reference {
        /// Reference branch (default: main or [reference] branch)
        #[arg(long, short = 'b')]
        branch: Option<String>,

        /// Maximum number of commits of the current branch to inspect
        #[arg(long)]
        max_commits: Option<usize>,
    },

    /// List the files tracked at a revision
    Files {
        /// Revision to list (default: HEAD)
        #[arg(long, short = 'r')]
        revision: Option<String>,
    },
}

/// Settings shared by all commands
pub(crate) struct Session {
    pub path: PathBuf,
    pub config: ForensicsConfig,
    pub scm: Option<String>,
    pub format: OutputFormat,
    pub token: CancellationToken,
}

impl Session {
    fn new(cli: &Cli) -> Result<Self> {
        let config = load_settings(&cli.path, cli.config.as_deref())?;
        let scm = cli.scm.clone().or_else(|| config.scm.clone());
        let token = CancellationToken::new();
        if let Some(seconds) = cli.timeout {
            start_watchdog(token.clone(), Duration::from_secs(seconds));
        }
        Ok(Self {
            path: cli.path.clone(),
            config,
            scm,
            format: OutputFormat::from_str(&cli.format)?,
            token,
        })
    }

    pub fn context(&self, revision: &str) -> ScmContext {
        ScmContext::new(&self.path, revision)
            .with_max_logged_errors(self.config.max_logged_errors())
    }
}

/// Result of a command that may have been cut short
pub(crate) enum Outcome {
    Completed,
    Interrupted,
}

pub fn run(cli: Cli) -> Result<()> {
    let session = Session::new(&cli)?;

    let outcome = match cli.command {
        Commands::Blame {
            revision,
            location,
            locations_file,
        } => blame::run(&session, revision, location, locations_file.as_deref())?,

        Commands::Mine { revision, files } => mine::run(&session, revision, files)?,

        Commands::Reference {
            branch,
            max_commits,
        } => reference::run(&session, branch, max_commits)?,

        Commands::Files { revision } => files::run(&session, revision)?,
    };

    if let Outcome::Interrupted = outcome {
        eprintln!(
            "{} results are partial",
            console::style("Interrupted:").yellow().bold()
        );
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    Ok(())
}

/// Load config from all sources; an explicit file overrides everything else.
fn load_settings(path: &Path, explicit: Option<&Path>) -> Result<ForensicsConfig> {
    let mut config = load_config(path);
    if let Some(file) = explicit {
        let overrides = load_config_file(file)
            .with_context(|| format!("Failed to load config file {}", file.display()))?;
        config.merge(overrides);
    }
    Ok(config)
}

/// Cancel `token` once `timeout` has elapsed.
fn start_watchdog(token: CancellationToken, timeout: Duration) {
    std::thread::spawn(move || {
        std::thread::sleep(timeout);
        debug!("Timeout of {:?} reached, cancelling", timeout);
        token.cancel();
    });
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Start a spinner on stderr; hidden automatically when stderr is not a terminal.
pub(crate) fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blame_command() {
        let cli = Cli::try_parse_from([
            "git-forensics",
            "/repo",
            "blame",
            "--location",
            "src/a.rs:12",
            "-l",
            "README.md",
            "--revision",
            "v1",
        ])
        .expect("valid arguments");

        assert_eq!(cli.path, PathBuf::from("/repo"));
        match cli.command {
            Commands::Blame {
                revision, location, ..
            } => {
                assert_eq!(revision.as_deref(), Some("v1"));
                assert_eq!(
                    location,
                    vec![("src/a.rs".to_string(), 12), ("README.md".to_string(), 0)]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_mine_files_without_path() {
        let cli = Cli::try_parse_from(["git-forensics", "mine", "a.txt", "b.txt", "-f", "json"])
            .expect("valid arguments");

        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Mine { files, .. } => assert_eq!(files, vec!["a.txt", "b.txt"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_reference_and_timeout() {
        let cli = Cli::try_parse_from([
            "git-forensics",
            "reference",
            "--branch",
            "develop",
            "--max-commits",
            "50",
            "--timeout",
            "5",
        ])
        .expect("valid arguments");

        assert_eq!(cli.timeout, Some(5));
        match cli.command {
            Commands::Reference {
                branch,
                max_commits,
            } => {
                assert_eq!(branch.as_deref(), Some("develop"));
                assert_eq!(max_commits, Some(50));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_location_rejected() {
        assert!(Cli::try_parse_from(["git-forensics", "blame", "--location", ":12"]).is_err());
        assert!(Cli::try_parse_from(["git-forensics", "blame", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_explicit_config_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("git-forensics.toml"), "max_logged_errors = 3\n")?;
        let explicit = dir.path().join("ci.toml");
        std::fs::write(&explicit, "[reference]\nbranch = \"release\"\n")?;

        let config = load_settings(dir.path(), Some(&explicit))?;
        assert_eq!(config.max_logged_errors(), 3);
        assert_eq!(config.reference_branch(), "release");

        assert!(load_settings(dir.path(), Some(&dir.path().join("missing.toml"))).is_err());
        Ok(())
    }

    #[test]
    fn test_watchdog_cancels() {
        let token = CancellationToken::new();
        start_watchdog(token.clone(), Duration::from_millis(10));
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !token.is_cancelled() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(token.is_cancelled());
    }
}
