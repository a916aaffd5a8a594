//! Contract Test: Fetch Isolation
//!
//! This test verifies that zone listing runs one task per provider and that
//! providers do not affect each other.
//!
//! Constraints verified:
//! - A failing provider does not stop or cancel a healthy one
//! - All tasks are joined before the aggregate failure is returned
//! - Zone listing pagination stops on the truncation flag
//!
//! If this test fails, a single flaky provider can break the whole export.

mod common;

use common::*;
use dns_exporter_core::zone::{Zone, ZonePage};
use dns_exporter_core::{Error, Exporter, MemoryFilesystem};
use std::sync::Arc;
use std::time::Duration;

fn exporter() -> Exporter {
    Exporter::new(Arc::new(MemoryFilesystem::new()), "data", Duration::ZERO)
}

#[tokio::test]
async fn failing_provider_does_not_stop_healthy_one() {
    // The healthy provider is slower than the failing one, so an early
    // return on first failure would leave its map empty.
    let failing = ScriptedProvider::new("CloudFlare").failing_listing("403 Forbidden", Duration::ZERO);
    let healthy = ScriptedProvider::new("Route53")
        .with_visibility()
        .with_listing_delay(Duration::from_millis(50))
        .with_zone_pages(vec![
            vec![Zone::public("example.com.", "Z1"), Zone::private("internal.", "Z2")],
            vec![Zone::public("example.org.", "Z3")],
        ]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(failing.clone()));
    exporter.add_provider(Arc::new(healthy.clone()));

    let err = exporter.fetch_all().await.unwrap_err();
    match err {
        Error::Phase { phase, failed } => {
            assert_eq!(phase, "fetching");
            assert_eq!(failed, vec!["CloudFlare".to_string()]);
        }
        other => panic!("expected a phase failure, got {other:?}"),
    }
    assert!(
        Error::Phase { phase: "fetching", failed: vec![] }
            .to_string()
            .starts_with("errors encountered during zone fetching")
    );

    let zones = exporter.zones("Route53").unwrap();
    assert_eq!(zones.public.len(), 2);
    assert_eq!(zones.private.get("internal."), Some(&"Z2".to_string()));
    assert_eq!(healthy.list_calls(), 2);

    assert!(exporter.zones("CloudFlare").unwrap().is_empty());
    assert_eq!(exporter.providers().len(), 2);
}

#[tokio::test]
async fn all_providers_succeeding_returns_ok() {
    let a = ScriptedProvider::new("CloudFlare")
        .with_zone_pages(vec![vec![Zone::public("example.com.", "cf-1")]]);
    let b = ScriptedProvider::new("Route53")
        .with_visibility()
        .with_zone_pages(vec![vec![Zone::private("corp.", "Z9")]]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(a));
    exporter.add_provider(Arc::new(b));

    exporter.fetch_all().await.unwrap();

    let names: Vec<&str> = exporter.providers().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["CloudFlare", "Route53"]);
    assert_eq!(exporter.zones("CloudFlare").unwrap().len(), 1);
    assert_eq!(exporter.zones("Route53").unwrap().private.len(), 1);
}

#[tokio::test]
async fn single_entry_pages_are_all_read() {
    let provider = ScriptedProvider::new("Route53").with_zone_pages(vec![
        vec![Zone::public("a.example.", "1")],
        vec![Zone::public("b.example.", "2")],
        vec![Zone::public("c.example.", "3")],
    ]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(provider.clone()));
    exporter.fetch_all().await.unwrap();

    assert_eq!(provider.list_calls(), 3);
    assert_eq!(exporter.zones("Route53").unwrap().public.len(), 3);
}

#[tokio::test]
async fn cursor_without_truncation_flag_is_not_followed() {
    let provider = ScriptedProvider::new("Route53").with_raw_pages(vec![
        ZonePage {
            zones: vec![Zone::public("a.example.", "1")],
            is_truncated: false,
            next_cursor: Some("1".to_string()),
        },
        ZonePage {
            zones: vec![Zone::public("never.example.", "2")],
            is_truncated: false,
            next_cursor: None,
        },
    ]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(provider.clone()));
    exporter.fetch_all().await.unwrap();

    assert_eq!(provider.list_calls(), 1);
    assert!(!exporter.zones("Route53").unwrap().public.contains_key("never.example."));
}

#[tokio::test]
async fn truncated_page_without_cursor_fails_the_provider() {
    let provider = ScriptedProvider::new("Route53").with_raw_pages(vec![ZonePage {
        zones: vec![Zone::public("a.example.", "1")],
        is_truncated: true,
        next_cursor: None,
    }]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(provider.clone()));

    assert!(matches!(exporter.fetch_all().await, Err(Error::Phase { .. })));
    assert_eq!(provider.list_calls(), 1);
}

#[tokio::test]
async fn refetch_replaces_previous_zones() {
    let provider = ScriptedProvider::new("CloudFlare")
        .with_zone_pages(vec![vec![Zone::public("example.com.", "1")]]);

    let mut exporter = exporter();
    exporter.add_provider(Arc::new(provider));
    exporter.fetch_all().await.unwrap();
    exporter.fetch_all().await.unwrap();

    assert_eq!(exporter.zones("CloudFlare").unwrap().len(), 1);
}
