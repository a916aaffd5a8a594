//! Route53 REST API response payloads
//!
//! Only the elements the exporter reads are modeled; everything else in
//! the documents is ignored.

use dns_exporter_core::records::{RawRecordSet, RecordCursor, RecordSetPage};
use dns_exporter_core::zone::{Zone, ZonePage};
use serde::Deserialize;

/// Prefix of hosted zone ids as returned by the listing
pub const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

#[derive(Debug, Deserialize)]
pub struct ListHostedZonesResponse {
    #[serde(rename = "HostedZones", default)]
    pub hosted_zones: HostedZones,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextMarker")]
    pub next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HostedZones {
    #[serde(rename = "HostedZone", default)]
    pub zones: Vec<HostedZone>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZone {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Config")]
    pub config: Option<HostedZoneConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZoneConfig {
    #[serde(rename = "PrivateZone", default)]
    pub private_zone: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListResourceRecordSetsResponse {
    #[serde(rename = "ResourceRecordSets", default)]
    pub record_sets: ResourceRecordSets,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextRecordName")]
    pub next_record_name: Option<String>,
    #[serde(rename = "NextRecordType")]
    pub next_record_type: Option<String>,
    #[serde(rename = "NextRecordIdentifier")]
    pub next_record_identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceRecordSets {
    #[serde(rename = "ResourceRecordSet", default)]
    pub sets: Vec<ResourceRecordSet>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecordSet {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "TTL")]
    pub ttl: Option<i64>,
    #[serde(rename = "ResourceRecords", default)]
    pub records: ResourceRecords,
    #[serde(rename = "AliasTarget")]
    pub alias_target: Option<AliasTarget>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceRecords {
    #[serde(rename = "ResourceRecord", default)]
    pub records: Vec<ResourceRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AliasTarget {
    #[serde(rename = "DNSName")]
    pub dns_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Strip the `/hostedzone/` prefix from a zone id
pub fn bare_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id)
}

impl From<ListHostedZonesResponse> for ZonePage {
    fn from(response: ListHostedZonesResponse) -> Self {
        let zones = response
            .hosted_zones
            .zones
            .into_iter()
            .map(|z| {
                let private = z.config.map(|c| c.private_zone).unwrap_or(false);
                if private {
                    Zone::private(z.name, z.id)
                } else {
                    Zone::public(z.name, z.id)
                }
            })
            .collect();

        ZonePage {
            zones,
            is_truncated: response.is_truncated,
            next_cursor: response.next_marker,
        }
    }
}

impl From<ListResourceRecordSetsResponse> for RecordSetPage {
    fn from(response: ListResourceRecordSetsResponse) -> Self {
        let record_sets = response
            .record_sets
            .sets
            .into_iter()
            .map(|set| RawRecordSet {
                name: set.name,
                record_type: set.record_type,
                ttl: set.ttl,
                values: set.records.records.into_iter().map(|r| r.value).collect(),
                alias_target: set.alias_target.map(|a| a.dns_name),
            })
            .collect();

        let next = match (response.next_record_type, response.next_record_name) {
            (Some(record_type), Some(record_name)) => Some(RecordCursor {
                record_type,
                record_name,
                identifier: response.next_record_identifier,
            }),
            _ => None,
        };

        RecordSetPage {
            record_sets,
            is_truncated: response.is_truncated,
            next,
        }
    }
}
