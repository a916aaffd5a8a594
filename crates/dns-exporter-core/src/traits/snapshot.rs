// # Snapshot Repository Trait
//
// The version-controlled directory holding the export tree. Implementations
// are blocking; the snapshot manager only calls them before and after the
// async export phases.
//
// ## Implementations
//
// - git: `dns-exporter-git` crate

use chrono::{DateTime, Utc};

use crate::snapshot::{RemoteTarget, SnapshotIdentity};

/// Result of pulling from the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// Local branch already matched the remote
    UpToDate,
    /// Local branch was fast-forwarded
    Updated,
}

/// Result of staging and committing the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Working tree was clean
    NothingToCommit,
    /// A commit was created
    Committed {
        /// Commit id as reported by the repository
        id: String,
    },
}

impl CommitOutcome {
    /// Whether a commit was created
    pub fn committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Trait for the versioned repository behind the export tree
///
/// Credentials for remote operations are owned by the implementation.
pub trait SnapshotRepository: Send {
    /// Check whether a repository already exists locally
    fn exists(&self) -> Result<bool, crate::Error>;

    /// Initialize a new empty repository
    fn init(&self) -> Result<(), crate::Error>;

    /// Clone a single branch of the remote with depth 1
    fn clone_remote(&self, remote: &RemoteTarget) -> Result<(), crate::Error>;

    /// Fetch and fast-forward from the remote
    fn pull(&self, remote: &RemoteTarget) -> Result<PullOutcome, crate::Error>;

    /// Stage every change (deletions included) and commit if anything changed
    ///
    /// The commit message is `timestamp` formatted as `%Y-%m-%dT%H:%M:%S`;
    /// author and committer are both taken from `identity`.
    fn stage_and_commit(
        &self,
        timestamp: DateTime<Utc>,
        identity: &SnapshotIdentity,
    ) -> Result<CommitOutcome, crate::Error>;

    /// Push the current branch to the remote
    fn push(&self, remote: &RemoteTarget) -> Result<(), crate::Error>;
}
