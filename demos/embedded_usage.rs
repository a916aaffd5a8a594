//! Minimal embedding example for dns-exporter-core
//!
//! Runs the fetch and export phases against an in-process provider and an
//! in-memory filesystem, then prints the resulting tree.

use async_trait::async_trait;
use dns_exporter_core::traits::{DnsProvider, ZoneContent};
use dns_exporter_core::zone::{Zone, ZonePage};
use dns_exporter_core::{Exporter, MemoryFilesystem, RawRecordSet, Result, ZoneRecords};
use std::sync::Arc;
use std::time::Duration;

/// A provider serving one hard-coded zone
struct StaticProvider;

fn record(name: &str, record_type: &str, ttl: i64, value: &str) -> RawRecordSet {
    RawRecordSet {
        name: name.to_string(),
        record_type: record_type.to_string(),
        ttl: Some(ttl),
        values: vec![value.to_string()],
        alias_target: None,
    }
}

#[async_trait]
impl DnsProvider for StaticProvider {
    fn provider_name(&self) -> &'static str {
        "Static"
    }

    async fn list_zones(&self, _cursor: Option<&str>) -> Result<ZonePage> {
        Ok(ZonePage {
            zones: vec![Zone::public("example.com.", "static-1")],
            is_truncated: false,
            next_cursor: None,
        })
    }

    async fn fetch_zone(&self, zone: &Zone) -> Result<ZoneContent> {
        let mut records = ZoneRecords::new();
        records.append(&[
            record(
                &zone.name,
                "SOA",
                900,
                "ns1.example.com. hostmaster.example.com. 2024010101 7200 900 1209600 86400",
            ),
            record(&zone.name, "NS", 172800, "ns1.example.com."),
            record(&zone.name, "A", 300, "192.0.2.1"),
            record(&format!("www.{}", zone.name), "CNAME", 300, &zone.name),
        ])?;
        Ok(ZoneContent::Records(records))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let fs = Arc::new(MemoryFilesystem::new());
    let mut exporter = Exporter::new(fs.clone(), "/export", Duration::ZERO);
    exporter.add_provider(Arc::new(StaticProvider));

    exporter.fetch_all().await?;
    exporter.export_all().await?;

    for path in fs.files().await {
        println!("== {}", path.display());
        if let Some(text) = fs.read_to_string(&path).await {
            println!("{}", text);
        }
    }

    Ok(())
}
