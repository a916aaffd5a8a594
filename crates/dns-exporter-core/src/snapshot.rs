//! Snapshot lifecycle
//!
//! The export tree is a version-controlled working copy. Before an export
//! the [`SnapshotManager`] brings it into a usable state; afterwards it
//! records whatever changed as one commit and publishes it.
//!
//! ## Preparation
//!
//! | local repository | remote configured | action              |
//! |------------------|-------------------|---------------------|
//! | missing          | no                | initialize          |
//! | missing          | yes               | shallow clone       |
//! | present          | yes               | pull                |
//! | present          | no                | use as-is           |

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::traits::{CommitOutcome, PullOutcome, SnapshotRepository};

/// Where the snapshot is published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// Clone URL
    pub url: String,
    /// Branch to track
    pub branch: String,
}

/// Identity used for every commit of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotIdentity {
    pub author_name: String,
    pub author_email: String,
    pub remote: Option<RemoteTarget>,
}

/// What [`SnapshotManager::prepare`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareAction {
    /// A new empty repository was created
    Initialized,
    /// The remote was cloned
    Cloned,
    /// The existing repository was pulled
    Pulled(PullOutcome),
    /// The existing repository is used without remote sync
    UsedLocal,
}

/// What [`SnapshotManager::record`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Nothing changed since the previous snapshot
    NothingToCommit,
    /// A commit was created
    Committed {
        /// Commit id
        id: String,
        /// Whether the commit was pushed
        pushed: bool,
    },
}

impl RecordOutcome {
    /// Whether a commit was created
    pub fn committed(&self) -> bool {
        matches!(self, RecordOutcome::Committed { .. })
    }
}

/// Drives a [`SnapshotRepository`] around one export run
pub struct SnapshotManager<R> {
    repository: R,
    identity: SnapshotIdentity,
}

impl<R: SnapshotRepository> SnapshotManager<R> {
    /// Create a manager for `repository`, committing as `identity`
    pub fn new(repository: R, identity: SnapshotIdentity) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// The commit identity
    pub fn identity(&self) -> &SnapshotIdentity {
        &self.identity
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Bring the local repository into a usable state before exporting
    pub fn prepare(&self) -> Result<PrepareAction> {
        let exists = self.repository.exists()?;

        let action = match (exists, &self.identity.remote) {
            (false, None) => {
                self.repository.init()?;
                info!("Initialized a new snapshot repository");
                PrepareAction::Initialized
            }
            (false, Some(remote)) => {
                self.repository.clone_remote(remote)?;
                info!("Cloned {} (branch {})", remote.url, remote.branch);
                PrepareAction::Cloned
            }
            (true, Some(remote)) => {
                let outcome = self.repository.pull(remote)?;
                match outcome {
                    PullOutcome::UpToDate => info!("Snapshot repository already up to date"),
                    PullOutcome::Updated => info!("Pulled {} (branch {})", remote.url, remote.branch),
                }
                PrepareAction::Pulled(outcome)
            }
            (true, None) => {
                info!("Using existing local snapshot repository");
                PrepareAction::UsedLocal
            }
        };

        Ok(action)
    }

    /// Commit the export tree and push it when a remote is configured
    ///
    /// A clean working tree is not an error; nothing is committed or pushed.
    pub fn record(&self, timestamp: DateTime<Utc>) -> Result<RecordOutcome> {
        let id = match self.repository.stage_and_commit(timestamp, &self.identity)? {
            CommitOutcome::NothingToCommit => {
                info!("nothing to commit, working tree clean");
                return Ok(RecordOutcome::NothingToCommit);
            }
            CommitOutcome::Committed { id } => id,
        };
        info!("Committed snapshot {}", id);

        let pushed = match &self.identity.remote {
            Some(remote) => {
                self.repository.push(remote)?;
                info!("Pushed snapshot to {} (branch {})", remote.url, remote.branch);
                true
            }
            None => false,
        };

        Ok(RecordOutcome::Committed { id, pushed })
    }
}
