//! Job references and the job-identity string shared by save and cleanup.
//!
//! The document store indexes saved files by the `job` field written during
//! save, and cleanup queries the same index by key. Both strings are produced
//! here so they cannot drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A finished job as seen by the asset store: the action that ran and its
/// numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRef {
    /// Name of the action the job ran (e.g. `"resize"`).
    pub action: String,
    /// Numeric job id assigned by the scheduler.
    pub id: u64,
}

impl JobRef {
    /// Create a new job reference.
    pub fn new(action: impl Into<String>, id: u64) -> Self {
        Self {
            action: action.into(),
            id,
        }
    }

    /// The job segment used in save paths (`job_{id}`).
    pub fn job_segment(&self) -> String {
        format!("job_{}", self.id)
    }

    /// The identity string files of this job are indexed under.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::from_segments(&self.action, &self.job_segment())
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.action, self.job_segment())
    }
}

/// The `"action/job"` string stored in every document's `job` field and used
/// as the lookup key during cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobIdentity(String);

impl JobIdentity {
    /// Build the identity from the first two save-path segments.
    pub fn from_segments(action: &str, job: &str) -> Self {
        Self(format!("{action}/{job}"))
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of a cleanup in which every file of the job was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// The job whose files were removed.
    pub job: JobIdentity,
    /// Identifiers of the removed files (document ids or relative paths).
    pub deleted: Vec<String>,
}

impl CleanupReport {
    /// Number of files removed.
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_format() {
        let job = JobRef::new("resize", 42);
        assert_eq!(job.identity().as_str(), "resize/job_42");
        assert_eq!(job.to_string(), "resize/job_42");
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let identity = JobRef::new("resize", 7).identity();
        let json = serde_json::to_string(&identity).expect("serialize");
        assert_eq!(json, r#""resize/job_7""#);
    }
}
