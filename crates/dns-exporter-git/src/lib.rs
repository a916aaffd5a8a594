// # Git Snapshot Repository
//
// This crate stores the export tree in a git repository via libgit2.
//
// ## Remote Authentication
//
// Remote operations authenticate with a username and access token over
// HTTPS basic auth. The token NEVER appears in logs or Debug output.
//
// ## Layout
//
// The repository working directory is the export data directory itself;
// every provider directory under it is tracked.

use chrono::{DateTime, Utc};
use dns_exporter_core::config::DEFAULT_BRANCH;
use dns_exporter_core::snapshot::{RemoteTarget, SnapshotIdentity};
use dns_exporter_core::traits::{CommitOutcome, PullOutcome, SnapshotRepository};
use dns_exporter_core::{Error, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Cred, ErrorCode, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks, Repository,
    RepositoryInitOptions, Signature, Time,
};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Remote name used for clone, pull and push
const REMOTE_NAME: &str = "origin";

/// Commit message format
const COMMIT_MESSAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn git_error(context: &'static str) -> impl Fn(git2::Error) -> Error {
    move |e| Error::snapshot(format!("{}: {}", context, e.message()))
}

/// Username and token for HTTPS remotes
#[derive(Clone)]
struct BasicAuth {
    username: String,
    token: String,
}

/// A git repository rooted at the export directory
#[derive(Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    auth: Option<BasicAuth>,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .field("username", &self.auth.as_ref().map(|a| a.username.as_str()))
            .field("token", &self.auth.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl GitRepository {
    /// Repository at `workdir`, without remote credentials
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            auth: None,
        }
    }

    /// Authenticate remote operations with a username and token
    pub fn with_credentials(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            token: token.into(),
        });
        self
    }

    /// The repository working directory
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.workdir).map_err(git_error("open repository"))
    }

    /// Callbacks answering credential requests once
    ///
    /// libgit2 keeps asking while the server rejects the credentials.
    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        if let Some(auth) = &self.auth {
            let attempted = Cell::new(false);
            callbacks.credentials(move |_url, _username, _allowed| {
                if attempted.replace(true) {
                    return Err(git2::Error::from_str("remote rejected the credentials"));
                }
                Cred::userpass_plaintext(&auth.username, &auth.token)
            });
        }
        callbacks
    }
}

impl SnapshotRepository for GitRepository {
    fn exists(&self) -> Result<bool> {
        match Repository::open(&self.workdir) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(git_error("open repository")(e)),
        }
    }

    fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.workdir).map_err(|e| {
            Error::filesystem(format!("create {}: {}", self.workdir.display(), e))
        })?;

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(DEFAULT_BRANCH);
        Repository::init_opts(&self.workdir, &opts).map_err(git_error("init repository"))?;

        tracing::debug!("Initialized repository at {}", self.workdir.display());
        Ok(())
    }

    /// Depth-1 clone of the configured branch
    ///
    /// Needs an http(s) or ssh remote. libgit2's local transport does not
    /// support shallow fetch, so a plain path or file:// URL is rejected.
    fn clone_remote(&self, remote: &RemoteTarget) -> Result<()> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(self.callbacks());
        fetch.depth(1);

        let refspec = format!(
            "+refs/heads/{0}:refs/remotes/{1}/{0}",
            remote.branch, REMOTE_NAME
        );
        RepoBuilder::new()
            .branch(&remote.branch)
            .fetch_options(fetch)
            .remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec))
            .clone(&remote.url, &self.workdir)
            .map_err(git_error("clone remote"))?;

        tracing::debug!("Cloned {} ({}) into {}", remote.url, remote.branch, self.workdir.display());
        Ok(())
    }

    fn pull(&self, remote: &RemoteTarget) -> Result<PullOutcome> {
        let repo = self.open()?;

        {
            let mut origin = repo
                .find_remote(REMOTE_NAME)
                .map_err(git_error("find remote"))?;
            let mut fetch = FetchOptions::new();
            fetch.remote_callbacks(self.callbacks());
            origin
                .fetch(&[remote.branch.as_str()], Some(&mut fetch), None)
                .map_err(git_error("fetch"))?;
        }

        let fetch_head = repo
            .find_reference("FETCH_HEAD")
            .map_err(git_error("read FETCH_HEAD"))?;
        let incoming = repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(git_error("read FETCH_HEAD"))?;
        let (analysis, _) = repo
            .merge_analysis(&[&incoming])
            .map_err(git_error("merge analysis"))?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }
        if !(analysis.is_fast_forward() || analysis.is_unborn()) {
            return Err(Error::snapshot(format!(
                "local branch {} has diverged from {}",
                remote.branch, remote.url
            )));
        }

        let refname = format!("refs/heads/{}", remote.branch);
        let message = format!("fast-forward {} to {}", refname, incoming.id());
        match repo.find_reference(&refname) {
            Ok(mut reference) => {
                reference
                    .set_target(incoming.id(), &message)
                    .map_err(git_error("fast-forward"))?;
            }
            Err(_) => {
                repo.reference(&refname, incoming.id(), true, &message)
                    .map_err(git_error("fast-forward"))?;
            }
        }
        repo.set_head(&refname).map_err(git_error("set HEAD"))?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))
            .map_err(git_error("checkout"))?;

        Ok(PullOutcome::Updated)
    }

    fn stage_and_commit(
        &self,
        timestamp: DateTime<Utc>,
        identity: &SnapshotIdentity,
    ) -> Result<CommitOutcome> {
        let repo = self.open()?;

        let mut index = repo.index().map_err(git_error("open index"))?;
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(git_error("stage files"))?;
        index
            .update_all(["*"].iter(), None)
            .map_err(git_error("stage deletions"))?;
        index.write().map_err(git_error("write index"))?;
        let tree_id = index.write_tree().map_err(git_error("write tree"))?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(git_error("read HEAD"))?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(git_error("read HEAD")(e)),
        };

        let unchanged = match &parent {
            Some(commit) => commit.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree = repo.find_tree(tree_id).map_err(git_error("find tree"))?;
        let signature = Signature::new(
            &identity.author_name,
            &identity.author_email,
            &Time::new(timestamp.timestamp(), 0),
        )
        .map_err(git_error("build signature"))?;
        let message = timestamp.format(COMMIT_MESSAGE_FORMAT).to_string();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let id = repo
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)
            .map_err(git_error("commit"))?;

        Ok(CommitOutcome::Committed { id: id.to_string() })
    }

    fn push(&self, remote: &RemoteTarget) -> Result<()> {
        let repo = self.open()?;
        let mut origin = repo
            .find_remote(REMOTE_NAME)
            .map_err(git_error("find remote"))?;

        let rejection: Cell<Option<String>> = Cell::new(None);
        let mut callbacks = self.callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                rejection.set(Some(format!("{}: {}", refname, status)));
            }
            Ok(())
        });

        let mut opts = PushOptions::new();
        opts.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", remote.branch);
        origin
            .push(&[refspec.as_str()], Some(&mut opts))
            .map_err(git_error("push"))?;
        drop(opts);

        if let Some(reason) = rejection.take() {
            return Err(Error::snapshot(format!("push rejected ({})", reason)));
        }
        Ok(())
    }
}
