use std::sync::Arc;

use tracing::{debug, error, info};

use super::{Exporter, ProviderEntry};
use crate::error::{Error, Result};
use crate::traits::DnsProvider;
use crate::zone::ProviderZones;

impl Exporter {
    /// List the zones of every provider
    ///
    /// Spawns one task per provider. Each task owns its provider's entry
    /// while it runs and hands it back when joined, so zone maps are never
    /// shared between tasks. All tasks are awaited even when some fail.
    ///
    /// # Errors
    ///
    /// `Error::Phase` naming every provider whose listing failed. Zones of
    /// the other providers are kept.
    pub async fn fetch_all(&mut self) -> Result<()> {
        let entries = std::mem::take(&mut self.providers);
        let mut handles = Vec::with_capacity(entries.len());

        for mut entry in entries {
            let provider = Arc::clone(&entry.provider);
            let handle = tokio::spawn(async move {
                entry.zones = ProviderZones::new();
                let result = list_all_zones(entry.provider.as_ref(), &mut entry.zones).await;
                (entry, result)
            });
            handles.push((provider, handle));
        }

        let mut failed = Vec::new();
        for (provider, handle) in handles {
            let name = provider.provider_name();
            match handle.await {
                Ok((entry, Ok(()))) => {
                    info!(
                        provider = name,
                        public = entry.zones.public.len(),
                        private = entry.zones.private.len(),
                        "fetched zones"
                    );
                    self.providers.push(entry);
                }
                Ok((entry, Err(e))) => {
                    error!(provider = name, error = %e, "failed to fetch zones");
                    failed.push(name.to_string());
                    self.providers.push(entry);
                }
                Err(e) => {
                    error!(provider = name, error = %e, "zone fetching task aborted");
                    failed.push(name.to_string());
                    self.providers.push(ProviderEntry::new(provider));
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Phase {
                phase: "fetching",
                failed,
            })
        }
    }
}

async fn list_all_zones(provider: &dyn DnsProvider, zones: &mut ProviderZones) -> Result<()> {
    let mut cursor: Option<String> = None;

    loop {
        let page = provider.list_zones(cursor.as_deref()).await?;
        debug!(
            "{}: {} zone(s) on page, truncated: {}",
            provider.provider_name(),
            page.zones.len(),
            page.is_truncated
        );
        for zone in page.zones {
            zones.insert(zone);
        }

        if !page.is_truncated {
            return Ok(());
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(Error::provider(
                    provider.provider_name(),
                    "truncated zone listing without a cursor",
                ));
            }
        }
    }
}
