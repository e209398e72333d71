//! Mine command implementation

use super::{spinner, Outcome, Session};
use anyhow::Result;
use git_forensics::reporters::{report_with_format, Report};
use git_forensics::scm::ScmRegistry;
use std::collections::BTreeSet;

pub(super) fn run(
    session: &Session,
    revision: Option<String>,
    files: Vec<String>,
) -> Result<Outcome> {
    let revision = revision.unwrap_or_else(|| session.config.mining_revision().to_string());
    let files: BTreeSet<String> = files.into_iter().collect();

    let registry = ScmRegistry::with_defaults();
    let miner = registry.miner(session.scm.as_deref(), &session.context(&revision));

    let message = if files.is_empty() {
        "Mining history of all files...".to_string()
    } else {
        format!("Mining history of {} files...", files.len())
    };
    let progress = spinner(message);
    let result = miner.mine(&files, &session.token);
    progress.finish_and_clear();

    let (statistics, outcome) = match result {
        Ok(statistics) => (statistics, Outcome::Completed),
        Err(interrupted) => (interrupted.into_partial(), Outcome::Interrupted),
    };

    let output = report_with_format(
        &Report::Mining {
            revision: &revision,
            interrupted: matches!(outcome, Outcome::Interrupted),
            statistics: &statistics,
        },
        session.format,
    )?;
    println!("{}", output);
    Ok(outcome)
}
