//! Logical save paths of the form `action/job/unit/filename`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::job::{JobIdentity, JobRef};

/// A parsed save path.
///
/// The first three segments are single path components; the filename is
/// everything after the third slash and may itself contain slashes. Segments
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SavePath {
    action: String,
    job: String,
    unit: String,
    filename: String,
}

impl SavePath {
    /// Parse a save path, failing with `MalformedPath` unless it has four
    /// non-empty segments.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut parts = raw.splitn(4, '/');
        let mut next = || parts.next().filter(|s| !s.is_empty());

        match (next(), next(), next(), next()) {
            (Some(action), Some(job), Some(unit), Some(filename)) => Ok(Self {
                action: action.to_string(),
                job: job.to_string(),
                unit: unit.to_string(),
                filename: filename.to_string(),
            }),
            _ => Err(AppError::malformed_path(format!(
                "Save path '{raw}' does not match action/job/unit/filename"
            ))),
        }
    }

    /// Build the save path for a file produced by one work unit of `job`.
    pub fn for_unit(job: &JobRef, unit_id: u64, filename: &str) -> AppResult<Self> {
        Self::parse(&format!(
            "{}/{}/unit_{unit_id}/{filename}",
            job.action,
            job.job_segment()
        ))
    }

    /// The action segment.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The job segment.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// The work-unit segment.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The filename (may contain slashes).
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The `action/job` identity of the owning job.
    pub fn job_identity(&self) -> JobIdentity {
        JobIdentity::from_segments(&self.action, &self.job)
    }
}

impl fmt::Display for SavePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.action, self.job, self.unit, self.filename
        )
    }
}

impl FromStr for SavePath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SavePath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SavePath> for String {
    fn from(path: SavePath) -> Self {
        path.to_string()
    }
}
