//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the core
//! drives its collaborators without talking to real providers or git.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dns_exporter_core::error::{Error, Result};
use dns_exporter_core::records::{RawRecordSet, RecordCursor, RecordSetPage, ZoneRecords};
use dns_exporter_core::snapshot::{RemoteTarget, SnapshotIdentity};
use dns_exporter_core::traits::{
    CommitOutcome, DnsProvider, PullOutcome, RecordSetSource, SnapshotRepository, ZoneContent,
};
use dns_exporter_core::zone::{Zone, ZonePage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A provider answering from scripted zone pages and zone contents
#[derive(Clone)]
pub struct ScriptedProvider {
    name: &'static str,
    separates_visibility: bool,
    pages: Vec<ZonePage>,
    listing_error: Option<String>,
    listing_delay: Duration,
    contents: HashMap<String, std::result::Result<ZoneContent, String>>,
    /// Call counter for list_zones()
    list_calls: Arc<AtomicUsize>,
    /// Zone ids passed to fetch_zone(), in call order
    fetched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            separates_visibility: false,
            pages: Vec::new(),
            listing_error: None,
            listing_delay: Duration::ZERO,
            contents: HashMap::new(),
            list_calls: Arc::new(AtomicUsize::new(0)),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Report public and private zones separately
    pub fn with_visibility(mut self) -> Self {
        self.separates_visibility = true;
        self
    }

    /// Serve these zones as consecutive pages, one page per inner vector
    pub fn with_zone_pages(mut self, pages: Vec<Vec<Zone>>) -> Self {
        let count = pages.len();
        self.pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, zones)| ZonePage {
                zones,
                is_truncated: i + 1 < count,
                next_cursor: (i + 1 < count).then(|| (i + 1).to_string()),
            })
            .collect();
        self
    }

    /// Serve exactly these pages; cursors are page indices
    pub fn with_raw_pages(mut self, pages: Vec<ZonePage>) -> Self {
        self.pages = pages;
        self
    }

    /// Fail every listing call after sleeping `delay`
    pub fn failing_listing(mut self, message: &str, delay: Duration) -> Self {
        self.listing_error = Some(message.to_string());
        self.listing_delay = delay;
        self
    }

    /// Sleep before answering listing calls
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = delay;
        self
    }

    /// Content returned for a zone id
    pub fn with_content(mut self, zone_id: &str, content: ZoneContent) -> Self {
        self.contents.insert(zone_id.to_string(), Ok(content));
        self
    }

    /// Make fetch_zone() fail for a zone id
    pub fn with_failing_zone(mut self, zone_id: &str, message: &str) -> Self {
        self.contents
            .insert(zone_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for ScriptedProvider {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn separates_visibility(&self) -> bool {
        self.separates_visibility
    }

    async fn list_zones(&self, cursor: Option<&str>) -> Result<ZonePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.listing_delay.is_zero() {
            tokio::time::sleep(self.listing_delay).await;
        }
        if let Some(message) = &self.listing_error {
            return Err(Error::provider(self.name, message.clone()));
        }

        let index: usize = match cursor {
            None => 0,
            Some(c) => c
                .parse()
                .map_err(|_| Error::provider(self.name, format!("bad cursor {c}")))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn fetch_zone(&self, zone: &Zone) -> Result<ZoneContent> {
        self.fetched.lock().unwrap().push(zone.id.clone());
        match self.contents.get(&zone.id) {
            Some(Ok(content)) => Ok(content.clone()),
            Some(Err(message)) => Err(Error::provider(self.name, message.clone())),
            None => Err(Error::provider(self.name, format!("no such zone {}", zone.id))),
        }
    }
}

/// A record source serving fixed pages and recording the cursors it got
pub struct PagedRecordSource {
    pages: Vec<RecordSetPage>,
    calls: Arc<AtomicUsize>,
    cursors: Arc<Mutex<Vec<Option<RecordCursor>>>>,
}

impl PagedRecordSource {
    /// Pages are served in order regardless of the cursor passed
    pub fn new(pages: Vec<RecordSetPage>) -> Self {
        Self {
            pages,
            calls: Arc::new(AtomicUsize::new(0)),
            cursors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cursors(&self) -> Vec<Option<RecordCursor>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSetSource for PagedRecordSource {
    fn source_name(&self) -> &'static str {
        "paged"
    }

    async fn list_record_sets(
        &self,
        _zone_id: &str,
        cursor: Option<&RecordCursor>,
    ) -> Result<RecordSetPage> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(cursor.cloned());
        self.pages
            .get(call)
            .cloned()
            .ok_or_else(|| Error::provider("paged", format!("page {call} requested past the end")))
    }
}

/// An in-memory repository whose working tree is a single string
///
/// `stage_and_commit` compares the working tree with the last commit, so
/// tests can drive clean and dirty runs.
#[derive(Clone)]
pub struct MockSnapshotRepository {
    exists: Arc<AtomicBool>,
    pull_outcome: PullOutcome,
    fail_push: bool,
    working_tree: Arc<Mutex<String>>,
    head: Arc<Mutex<Option<String>>>,
    commits: Arc<Mutex<Vec<(String, String)>>>,
    init_calls: Arc<AtomicUsize>,
    clone_calls: Arc<AtomicUsize>,
    pull_calls: Arc<AtomicUsize>,
    push_calls: Arc<AtomicUsize>,
}

impl MockSnapshotRepository {
    pub fn new(exists: bool) -> Self {
        Self {
            exists: Arc::new(AtomicBool::new(exists)),
            pull_outcome: PullOutcome::UpToDate,
            fail_push: false,
            working_tree: Arc::new(Mutex::new(String::new())),
            head: Arc::new(Mutex::new(None)),
            commits: Arc::new(Mutex::new(Vec::new())),
            init_calls: Arc::new(AtomicUsize::new(0)),
            clone_calls: Arc::new(AtomicUsize::new(0)),
            pull_calls: Arc::new(AtomicUsize::new(0)),
            push_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_pull_outcome(mut self, outcome: PullOutcome) -> Self {
        self.pull_outcome = outcome;
        self
    }

    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Replace the working tree content
    pub fn write(&self, content: &str) {
        *self.working_tree.lock().unwrap() = content.to_string();
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn clone_calls(&self) -> usize {
        self.clone_calls.load(Ordering::SeqCst)
    }

    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }

    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// (message, author) of every commit
    pub fn commits(&self) -> Vec<(String, String)> {
        self.commits.lock().unwrap().clone()
    }
}

impl SnapshotRepository for MockSnapshotRepository {
    fn exists(&self) -> Result<bool> {
        Ok(self.exists.load(Ordering::SeqCst))
    }

    fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clone_remote(&self, _remote: &RemoteTarget) -> Result<()> {
        self.clone_calls.fetch_add(1, Ordering::SeqCst);
        self.exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pull(&self, _remote: &RemoteTarget) -> Result<PullOutcome> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pull_outcome)
    }

    fn stage_and_commit(
        &self,
        timestamp: DateTime<Utc>,
        identity: &SnapshotIdentity,
    ) -> Result<CommitOutcome> {
        let working = self.working_tree.lock().unwrap().clone();
        let mut head = self.head.lock().unwrap();
        if head.as_deref() == Some(working.as_str()) || (head.is_none() && working.is_empty()) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        *head = Some(working);

        let mut commits = self.commits.lock().unwrap();
        commits.push((
            timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{} <{}>", identity.author_name, identity.author_email),
        ));
        Ok(CommitOutcome::Committed {
            id: format!("{:040x}", commits.len()),
        })
    }

    fn push(&self, _remote: &RemoteTarget) -> Result<()> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_push {
            return Err(Error::snapshot("push rejected"));
        }
        Ok(())
    }
}

/// A raw literal record set
pub fn raw(name: &str, record_type: &str, ttl: i64, values: &[&str]) -> RawRecordSet {
    RawRecordSet {
        name: name.to_string(),
        record_type: record_type.to_string(),
        ttl: Some(ttl),
        values: values.iter().map(|v| v.to_string()).collect(),
        alias_target: None,
    }
}

/// A raw alias record set
pub fn alias(name: &str, record_type: &str, target: &str) -> RawRecordSet {
    RawRecordSet {
        name: name.to_string(),
        record_type: record_type.to_string(),
        ttl: None,
        values: Vec::new(),
        alias_target: Some(target.to_string()),
    }
}

/// A minimal zone: just an SOA record with the given serial
pub fn soa_only(zone: &str, serial: u64) -> ZoneRecords {
    let mut records = ZoneRecords::new();
    records
        .push(&raw(
            zone,
            "SOA",
            900,
            &[format!("ns-1.example.net. hostmaster.example.net. {serial} 7200 900 1209600 86400").as_str()],
        ))
        .unwrap();
    records
}

/// A fixed commit timestamp
pub fn timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:30:45Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A remote target used by snapshot tests
pub fn remote() -> RemoteTarget {
    RemoteTarget {
        url: "https://github.com/acme/dns-snapshots.git".to_string(),
        branch: "master".to_string(),
    }
}
