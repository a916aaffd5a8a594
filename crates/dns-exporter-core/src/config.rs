//! Configuration types for the DNS exporter
//!
//! This module defines all configuration structures used throughout the crate.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::snapshot::{RemoteTarget, SnapshotIdentity};

/// Author name used when no remote is configured
pub const DEFAULT_AUTHOR_NAME: &str = "DNS-EXPORTER";

/// Author email used when no remote is configured
pub const DEFAULT_AUTHOR_EMAIL: &str = "no-email@dns-exporter.com";

/// Branch used when a remote is configured without one
pub const DEFAULT_BRANCH: &str = "master";

const REMOTE_URL_PATTERN: &str = r"^https://[a-zA-Z0-9.-]+\.[a-zA-Z]+/[a-zA-Z0-9._-]+/[a-zA-Z0-9._-]+\.git$";

/// Main exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Enabled DNS providers
    pub providers: Vec<ProviderConfig>,

    /// Export tree settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Snapshot repository settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl ExporterConfig {
    /// Create a configuration with no providers and default settings
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            export: ExportConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.providers.is_empty() {
            return Err(crate::Error::config("no enabled DNS providers"));
        }

        for (i, provider) in self.providers.iter().enumerate() {
            provider.validate()?;
            if self.providers[..i]
                .iter()
                .any(|p| p.type_name() == provider.type_name())
            {
                return Err(crate::Error::config(format!(
                    "provider {} is configured more than once",
                    provider.type_name()
                )));
            }
        }

        self.export.validate()?;
        self.snapshot.validate()?;

        Ok(())
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare, authenticated with account email and global API key
    Cloudflare {
        /// Account email
        email: String,
        /// Global API key
        api_key: String,
    },

    /// AWS Route53
    Route53 {
        /// Access key id
        access_key_id: String,
        /// Secret access key
        secret_access_key: String,
        /// Session token for temporary credentials
        #[serde(default)]
        session_token: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { email, api_key } => {
                if email.is_empty() {
                    return Err(crate::Error::config("Cloudflare email cannot be empty"));
                }
                if api_key.is_empty() {
                    return Err(crate::Error::config("Cloudflare API key cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                ..
            } => {
                if access_key_id.is_empty() || secret_access_key.is_empty() {
                    return Err(crate::Error::config(
                        "Route53 requires an access key id and a secret access key",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Route53 { .. } => "route53",
        }
    }
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare { email, .. } => f
                .debug_struct("Cloudflare")
                .field("email", email)
                .field("api_key", &"<REDACTED>")
                .finish(),
            ProviderConfig::Route53 {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<REDACTED>")
                .field("session_token", &session_token.as_ref().map(|_| "<REDACTED>"))
                .finish(),
        }
    }
}

/// Export tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root of the export tree, also the snapshot repository workdir
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Pause between two zones of the same provider (in seconds)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl ExportConfig {
    /// Validate the export configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(crate::Error::config("data directory cannot be empty"));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_delay_secs() -> u64 {
    1
}

/// Snapshot repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Commit author name
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Commit author email
    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Remote to clone from and push to
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl SnapshotConfig {
    /// Validate the snapshot configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.author_name.is_empty() || self.author_email.is_empty() {
            return Err(crate::Error::config("commit author name and email cannot be empty"));
        }
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        Ok(())
    }

    /// Commit identity derived from this configuration
    pub fn identity(&self) -> SnapshotIdentity {
        SnapshotIdentity {
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
            remote: self.remote.as_ref().map(RemoteConfig::target),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
            remote: None,
        }
    }
}

fn default_author_name() -> String {
    DEFAULT_AUTHOR_NAME.to_string()
}

fn default_author_email() -> String {
    DEFAULT_AUTHOR_EMAIL.to_string()
}

/// Remote repository configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// HTTPS clone URL (`https://host.tld/owner/repo.git`)
    pub url: String,

    /// Branch to clone, pull and push
    #[serde(default = "default_branch")]
    pub branch: String,

    /// User for HTTP basic authentication
    pub username: String,

    /// Token used as the basic authentication password
    /// ⚠️ NEVER log this value
    pub token: String,
}

impl RemoteConfig {
    /// Validate the remote configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let pattern = Regex::new(REMOTE_URL_PATTERN)
            .map_err(|e| crate::Error::config(format!("remote URL pattern: {}", e)))?;
        if !pattern.is_match(&self.url) {
            return Err(crate::Error::config(format!(
                "remote URL {} does not look like https://host.tld/owner/repo.git",
                self.url
            )));
        }
        if self.branch.is_empty() {
            return Err(crate::Error::config("remote branch cannot be empty"));
        }
        if self.username.is_empty() || self.token.is_empty() {
            return Err(crate::Error::config("remote requires a user and a token"));
        }
        Ok(())
    }

    /// Where to clone from and push to, without credentials
    pub fn target(&self) -> RemoteTarget {
        RemoteTarget {
            url: self.url.clone(),
            branch: self.branch.clone(),
        }
    }
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("branch", &self.branch)
            .field("username", &self.username)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}
