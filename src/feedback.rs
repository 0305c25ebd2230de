//! Append-only feedback log.
//!
//! Each submission is one CSV record appended to the log file; the header is
//! written when the file is first created. Existing entries are never
//! rewritten on submission.

use anyhow::{Result, bail};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, info};

/// A usefulness rating from 1 (not useful) to 5 (very useful).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            bail!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submitted piece of feedback. Columns are `Feedback` and `Rating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(rename = "Feedback")]
    pub text: String,
    #[serde(rename = "Rating")]
    pub rating: Rating,
}

impl FeedbackEntry {
    pub fn new(text: impl Into<String>, rating: Rating) -> Self {
        Self {
            text: text.into(),
            rating,
        }
    }
}

/// Appends one entry to the feedback log at `path`.
///
/// Creates the file with headers if it does not exist or is empty. Identical
/// entries are appended again, never merged.
pub fn append_feedback(path: &str, entry: &FeedbackEntry) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let len = file.metadata()?.len();
    let needs_header = len == 0;
    debug!(path, needs_header, "Appending feedback record");

    // A hand-edited log may end without a line terminator.
    if !needs_header {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);

    writer.serialize(entry)?;
    writer.flush()?;

    info!(path, rating = entry.rating.get(), "Feedback recorded");
    Ok(())
}

/// Reads every entry in the feedback log. A missing file is an empty log.
pub fn load_feedback(path: &str) -> Result<Vec<FeedbackEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rdr = csv::Reader::from_reader(file);
    let mut entries = Vec::new();

    for result in rdr.deserialize() {
        let entry: FeedbackEntry = result?;
        entries.push(entry);
    }

    Ok(entries)
}
