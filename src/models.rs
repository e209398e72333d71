//! Result types produced by the blame and mining engines
//!
//! These are plain serializable values. The transient state used while they
//! are being computed (author identity sets, open repositories) lives in the
//! `git` module and never ends up in here.

use crate::log::FilteredLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder for attribution fields that could not be determined
pub const EMPTY: &str = "-";

/// Line numbers at or below this value request whole-file attribution
pub const WHOLE_FILE: i32 = 0;

// ============================================================================
// Locations
// ============================================================================

/// Requested source locations: file path to the set of line numbers to blame.
///
/// Lines are 1-based. A line `<= 0` asks for whole-file attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSet {
    files: BTreeMap<String, BTreeSet<i32>>,
}

impl LocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requested line for a file.
    pub fn add_line(&mut self, path: impl Into<String>, line: i32) {
        self.files.entry(path.into()).or_default().insert(line);
    }

    /// Request whole-file attribution for a file.
    pub fn add_file(&mut self, path: impl Into<String>) {
        self.add_line(path, WHOLE_FILE);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn lines(&self, path: &str) -> Option<&BTreeSet<i32>> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<i32>)> {
        self.files.iter()
    }

    /// Parse a `path:line` entry. A missing line number means the whole file.
    ///
    /// The line is split off the last `:` only when it is numeric, so Windows
    /// drive letters and paths containing colons survive.
    pub fn parse_entry(entry: &str) -> Option<(String, i32)> {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with('#') {
            return None;
        }
        if let Some((path, line)) = entry.rsplit_once(':') {
            if let Ok(line) = line.trim().parse::<i32>() {
                if path.is_empty() {
                    return None;
                }
                return Some((path.to_string(), line));
            }
        }
        Some((entry.to_string(), WHOLE_FILE))
    }
}

impl FromIterator<(String, i32)> for LocationSet {
    fn from_iter<T: IntoIterator<Item = (String, i32)>>(iter: T) -> Self {
        let mut locations = LocationSet::new();
        for (path, line) in iter {
            locations.add_line(path, line);
        }
        locations
    }
}

// ============================================================================
// Blame
// ============================================================================

/// Attribution of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlame {
    pub name: String,
    pub email: String,
    pub commit: String,
    /// Commit time in seconds since the epoch
    pub time: i64,
}

impl Default for LineBlame {
    fn default() -> Self {
        Self {
            name: EMPTY.to_string(),
            email: EMPTY.to_string(),
            commit: EMPTY.to_string(),
            time: 0,
        }
    }
}

impl LineBlame {
    /// True when neither an author nor a commit could be determined.
    pub fn is_empty(&self) -> bool {
        *self == LineBlame::default()
    }
}

/// Blame results for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlame {
    file_name: String,
    lines: BTreeMap<i32, LineBlame>,
}

impl FileBlame {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            lines: BTreeMap::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Entry for a line, created with empty placeholders on first access.
    pub fn line_mut(&mut self, line: i32) -> &mut LineBlame {
        self.lines.entry(line).or_default()
    }

    pub fn set_name(&mut self, line: i32, name: impl Into<String>) {
        self.line_mut(line).name = name.into();
    }

    pub fn set_email(&mut self, line: i32, email: impl Into<String>) {
        self.line_mut(line).email = email.into();
    }

    pub fn set_commit(&mut self, line: i32, commit: impl Into<String>) {
        self.line_mut(line).commit = commit.into();
    }

    pub fn set_time(&mut self, line: i32, time: i64) {
        self.line_mut(line).time = time;
    }

    pub fn get(&self, line: i32) -> Option<&LineBlame> {
        self.lines.get(&line)
    }

    pub fn name(&self, line: i32) -> &str {
        self.lines.get(&line).map_or(EMPTY, |l| l.name.as_str())
    }

    pub fn email(&self, line: i32) -> &str {
        self.lines.get(&line).map_or(EMPTY, |l| l.email.as_str())
    }

    pub fn commit(&self, line: i32) -> &str {
        self.lines.get(&line).map_or(EMPTY, |l| l.commit.as_str())
    }

    pub fn time(&self, line: i32) -> i64 {
        self.lines.get(&line).map_or(0, |l| l.time)
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = i32> + '_ {
        self.lines.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &LineBlame)> {
        self.lines.iter().map(|(line, blame)| (*line, blame))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take over the line entries of another record for the same file.
    /// Entries of `other` replace existing entries for the same line.
    pub fn merge(&mut self, other: FileBlame) {
        self.lines.extend(other.lines);
    }
}

/// Blame results for a set of files, plus the log of the pass that built them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blames {
    files: BTreeMap<String, FileBlame>,
    log: FilteredLog,
}

impl Blames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: FilteredLog) -> Self {
        Self {
            files: BTreeMap::new(),
            log,
        }
    }

    /// Add a file record. A record for the same file is merged line by line.
    pub fn add(&mut self, blame: FileBlame) {
        match self.files.get_mut(blame.file_name()) {
            Some(existing) => existing.merge(blame),
            None => {
                self.files.insert(blame.file_name().to_string(), blame);
            }
        }
    }

    /// Fold another collection into this one; see [`add`](Self::add).
    pub fn merge(&mut self, other: Blames) {
        for (_, blame) in other.files {
            self.add(blame);
        }
        self.log.merge(other.log);
    }

    pub fn get(&self, file: &str) -> Option<&FileBlame> {
        self.files.get(file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileBlame> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn log(&self) -> &FilteredLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut FilteredLog {
        &mut self.log
    }

    /// Same files and line entries, ignoring the logs.
    pub fn same_results(&self, other: &Blames) -> bool {
        self.files == other.files
    }
}

// ============================================================================
// Mining
// ============================================================================

/// Change statistics for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatistics {
    pub file_name: String,
    pub number_of_authors: usize,
    pub number_of_commits: usize,
    /// Time of the oldest commit seen, seconds since the epoch (0 = none)
    pub creation_time: i64,
    /// Time of the newest commit seen, seconds since the epoch (0 = none)
    pub last_modification_time: i64,
    pub added_lines: usize,
    pub deleted_lines: usize,
}

impl FileStatistics {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Lines added plus lines deleted over the whole history.
    pub fn churn(&self) -> usize {
        self.added_lines + self.deleted_lines
    }

    /// Net line count derived from the history (added minus deleted).
    pub fn lines_of_code(&self) -> i64 {
        self.added_lines as i64 - self.deleted_lines as i64
    }

    /// Days between creation and `now`, or None if no commit was seen.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        days_since(self.creation_time, now)
    }

    /// Days between the last modification and `now`, or None if no commit was seen.
    pub fn last_modified_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        days_since(self.last_modification_time, now)
    }
}

fn days_since(timestamp: i64, now: DateTime<Utc>) -> Option<i64> {
    if timestamp == 0 {
        return None;
    }
    let then = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
    Some((now - then).num_days())
}

/// Statistics for all scanned files of one mining run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryStatistics {
    files: BTreeMap<String, FileStatistics>,
    log: FilteredLog,
}

impl RepositoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: FilteredLog) -> Self {
        Self {
            files: BTreeMap::new(),
            log,
        }
    }

    /// Add statistics for a file, replacing earlier statistics for it.
    pub fn add(&mut self, statistics: FileStatistics) {
        self.files.insert(statistics.file_name.clone(), statistics);
    }

    pub fn add_all(&mut self, statistics: impl IntoIterator<Item = FileStatistics>) {
        for s in statistics {
            self.add(s);
        }
    }

    pub fn get(&self, file: &str) -> Option<&FileStatistics> {
        self.files.get(file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileStatistics> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of commits over all files (a commit touching two files counts twice).
    pub fn total_commits(&self) -> usize {
        self.files.values().map(|f| f.number_of_commits).sum()
    }

    pub fn total_churn(&self) -> usize {
        self.files.values().map(FileStatistics::churn).sum()
    }

    /// Newest modification time over all files, if any file has history.
    pub fn latest_modification(&self) -> Option<i64> {
        self.files
            .values()
            .map(|f| f.last_modification_time)
            .filter(|t| *t != 0)
            .max()
    }

    pub fn log(&self) -> &FilteredLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut FilteredLog {
        &mut self.log
    }
}

// ============================================================================
// Reference point
// ============================================================================

/// Result of searching for the latest commit shared with a reference branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "commit", rename_all = "snake_case")]
pub enum ReferencePoint {
    /// Latest shared commit id
    Found(String),
    /// No shared commit within the search budget
    NotFound,
}

impl ReferencePoint {
    pub fn commit(&self) -> Option<&str> {
        match self {
            ReferencePoint::Found(id) => Some(id),
            ReferencePoint::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ReferencePoint::Found(_))
    }
}
