use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::Exporter;
use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::traits::{DnsProvider, Filesystem, ZoneContent};
use crate::zone::{ProviderZones, Visibility, Zone};
use crate::zonefile;

impl Exporter {
    /// Write a zonefile for every fetched zone
    ///
    /// One task per provider; zones of a provider are exported one after
    /// the other with the configured delay in between. A failing zone is
    /// logged and skipped, and its provider is reported as failed once all
    /// of its zones were attempted.
    ///
    /// # Errors
    ///
    /// `Error::Phase` naming every provider with at least one failed zone
    /// or an unusable output directory.
    pub async fn export_all(&self) -> Result<()> {
        let mut handles = Vec::with_capacity(self.providers.len());

        for entry in &self.providers {
            let provider = Arc::clone(&entry.provider);
            let zones = entry.zones.clone();
            let fs = Arc::clone(&self.fs);
            let root = self.root.clone();
            let delay = self.delay;

            let name = provider.provider_name();
            let handle = tokio::spawn(async move {
                export_provider(provider.as_ref(), &zones, fs.as_ref(), &root, delay).await
            });
            handles.push((name, handle));
        }

        let mut failed = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(written)) => info!(provider = name, zones = written, "exported zones"),
                Ok(Err(e)) => {
                    error!(provider = name, error = %e, "zone export failed");
                    failed.push(name.to_string());
                }
                Err(e) => {
                    error!(provider = name, error = %e, "zone exporting task aborted");
                    failed.push(name.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Phase {
                phase: "exporting",
                failed,
            })
        }
    }
}

async fn export_provider(
    provider: &dyn DnsProvider,
    zones: &ProviderZones,
    fs: &dyn Filesystem,
    root: &Path,
    delay: Duration,
) -> Result<usize> {
    let name = provider.provider_name();
    let provider_dir = root.join(name);
    ensure_dir(fs, &provider_dir, true).await?;
    if provider.separates_visibility() {
        for visibility in [Visibility::Public, Visibility::Private] {
            ensure_dir(fs, &provider_dir.join(visibility.dir_name()), true).await?;
        }
    }

    let total = zones.len();
    let mut written = 0usize;
    for (i, zone) in zones.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let dir = if provider.separates_visibility() {
            provider_dir.join(zone.visibility.dir_name())
        } else {
            provider_dir.clone()
        };

        match export_zone(provider, &zone, fs, &dir).await {
            Ok(path) => {
                info!(provider = name, zone = %zone.name, path = %path.display(), "exported zone");
                written += 1;
            }
            Err(e) => {
                error!(provider = name, zone = %zone.name, error = %e, "failed to export zone");
            }
        }
    }

    if written < total {
        return Err(Error::provider(
            name,
            format!("{} of {} zone(s) failed to export", total - written, total),
        ));
    }
    Ok(written)
}

async fn export_zone(
    provider: &dyn DnsProvider,
    zone: &Zone,
    fs: &dyn Filesystem,
    dir: &Path,
) -> Result<PathBuf> {
    let text = match provider.fetch_zone(zone).await? {
        ZoneContent::Records(records) => zonefile::serialize(&records)?,
        ZoneContent::Exported(text) => zonefile::normalize_export(&text)?,
    };

    let path = dir.join(zonefile::zonefile_name(&zone.name));
    fs.write_file(&path, text.as_bytes()).await?;
    Ok(path)
}
