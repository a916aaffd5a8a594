//! Record aggregation
//!
//! Providers that hand out structured record sets (Route53) are read page by
//! page. Every page is appended to a [`ZoneRecords`], which buckets the
//! entries by [`RecordType`] while keeping the provider's enumeration order.
//!
//! ```text
//! list_record_sets(cursor) ──▶ RecordSetPage ──▶ ZoneRecords::append
//!          ▲                         │
//!          └──── next cursor ◀───────┘   (while is_truncated)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::RecordSetSource;

/// Record types a zone export understands
///
/// The variant order is the order sections appear in a serialized zonefile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordType {
    Soa,
    Ns,
    Mx,
    A,
    Aaaa,
    Cname,
    Txt,
    Srv,
    Ptr,
    Spf,
    Naptr,
    Caa,
}

impl RecordType {
    /// Every non-SOA type, in section order
    pub const SECTIONS: [RecordType; 11] = [
        RecordType::Ns,
        RecordType::Mx,
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Txt,
        RecordType::Srv,
        RecordType::Ptr,
        RecordType::Spf,
        RecordType::Naptr,
        RecordType::Caa,
    ];

    /// Zonefile mnemonic of the type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Soa => "SOA",
            RecordType::Ns => "NS",
            RecordType::Mx => "MX",
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Ptr => "PTR",
            RecordType::Spf => "SPF",
            RecordType::Naptr => "NAPTR",
            RecordType::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let record_type = match s {
            "SOA" => RecordType::Soa,
            "NS" => RecordType::Ns,
            "MX" => RecordType::Mx,
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            "SRV" => RecordType::Srv,
            "PTR" => RecordType::Ptr,
            "SPF" => RecordType::Spf,
            "NAPTR" => RecordType::Naptr,
            "CAA" => RecordType::Caa,
            other => return Err(Error::UnsupportedRecordType(other.to_string())),
        };
        Ok(record_type)
    }
}

/// A record set in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Owner name
    pub name: String,
    /// Time-to-live, forced to 0 for aliases
    pub ttl: i64,
    /// Values in provider order; a single target for aliases
    pub values: Vec<String>,
    /// The provider resolved this entry to a target resource
    pub is_alias: bool,
}

/// A record set exactly as a provider reports it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecordSet {
    pub name: String,
    /// Type string as reported (`A`, `CNAME`, ...)
    pub record_type: String,
    /// Absent for alias records
    pub ttl: Option<i64>,
    pub values: Vec<String>,
    /// Resolved target of an alias record
    pub alias_target: Option<String>,
}

/// Opaque position in a record listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCursor {
    pub record_type: String,
    pub record_name: String,
    pub identifier: Option<String>,
}

/// One page of a record listing
#[derive(Debug, Clone, Default)]
pub struct RecordSetPage {
    pub record_sets: Vec<RawRecordSet>,
    /// Whether the provider has more pages
    pub is_truncated: bool,
    /// Where the next page starts, only honored when `is_truncated` is set
    pub next: Option<RecordCursor>,
}

/// All records of one zone, bucketed by type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneRecords {
    soa: Option<RecordSet>,
    sections: BTreeMap<RecordType, Vec<RecordSet>>,
}

impl ZoneRecords {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every record set of a page
    ///
    /// Fails on the first record set whose type is not supported, or on a
    /// second SOA record.
    pub fn append(&mut self, page: &[RawRecordSet]) -> Result<()> {
        for raw in page {
            self.push(raw)?;
        }
        Ok(())
    }

    /// Append a single raw record set
    pub fn push(&mut self, raw: &RawRecordSet) -> Result<()> {
        let record_type: RecordType = raw.record_type.parse()?;

        let record = match &raw.alias_target {
            Some(target) => RecordSet {
                name: raw.name.clone(),
                ttl: 0,
                values: vec![target.clone()],
                is_alias: true,
            },
            None => RecordSet {
                name: raw.name.clone(),
                ttl: raw.ttl.unwrap_or_default(),
                values: raw.values.clone(),
                is_alias: false,
            },
        };

        if record_type == RecordType::Soa {
            if let Some(existing) = &self.soa {
                return Err(Error::invalid_record(format!(
                    "second SOA record {} (already have {})",
                    record.name, existing.name
                )));
            }
            self.soa = Some(record);
        } else {
            self.sections.entry(record_type).or_default().push(record);
        }
        Ok(())
    }

    /// The zone's SOA record, if one was seen
    pub fn soa(&self) -> Option<&RecordSet> {
        self.soa.as_ref()
    }

    /// Records of one type in encounter order
    pub fn section(&self, record_type: RecordType) -> &[RecordSet] {
        self.sections
            .get(&record_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of non-SOA record sets
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Check if neither SOA nor any other record was appended
    pub fn is_empty(&self) -> bool {
        self.soa.is_none() && self.sections.is_empty()
    }
}

/// Read every record page of a zone into a [`ZoneRecords`]
///
/// Pages are requested until the source reports no truncation. A truncated
/// page without a cursor is treated as a provider fault.
pub async fn collect_records(
    source: &dyn RecordSetSource,
    zone_id: &str,
) -> Result<ZoneRecords> {
    let mut records = ZoneRecords::new();
    let mut cursor: Option<RecordCursor> = None;
    let mut pages = 0usize;

    loop {
        let page = source.list_record_sets(zone_id, cursor.as_ref()).await?;
        pages += 1;
        records.append(&page.record_sets)?;

        if !page.is_truncated {
            break;
        }
        match page.next {
            Some(next) => cursor = Some(next),
            None => {
                return Err(Error::provider(
                    source.source_name(),
                    format!("zone {zone_id}: truncated record page without a cursor"),
                ));
            }
        }
    }

    debug!("Collected {} record sets for zone {} in {} page(s)", records.len(), zone_id, pages);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, record_type: &str, ttl: i64, values: &[&str]) -> RawRecordSet {
        RawRecordSet {
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl: Some(ttl),
            values: values.iter().map(|v| v.to_string()).collect(),
            alias_target: None,
        }
    }

    fn alias(name: &str, record_type: &str, target: &str) -> RawRecordSet {
        RawRecordSet {
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl: None,
            values: Vec::new(),
            alias_target: Some(target.to_string()),
        }
    }

    #[test]
    fn test_every_supported_type_lands_in_its_bucket() {
        let mut records = ZoneRecords::new();
        for record_type in RecordType::SECTIONS {
            records
                .push(&raw("example.com.", record_type.as_str(), 300, &["value"]))
                .unwrap();
        }

        for record_type in RecordType::SECTIONS {
            let section = records.section(record_type);
            assert_eq!(section.len(), 1, "bucket {record_type}");
        }
        assert!(records.soa().is_none());
        assert_eq!(records.len(), RecordType::SECTIONS.len());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut records = ZoneRecords::new();
        let err = records
            .append(&[
                raw("example.com.", "A", 300, &["1.2.3.4"]),
                raw("example.com.", "DS", 300, &["12345 13 2 abcdef"]),
            ])
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedRecordType(ref t) if t == "DS"));
    }

    #[test]
    fn test_values_and_ttl_copied_verbatim() {
        let mut records = ZoneRecords::new();
        records
            .push(&raw("example.com.", "NS", 172800, &["ns-1.example.net.", "ns-2.example.org."]))
            .unwrap();

        let ns = &records.section(RecordType::Ns)[0];
        assert_eq!(ns.ttl, 172800);
        assert_eq!(ns.values, vec!["ns-1.example.net.", "ns-2.example.org."]);
        assert!(!ns.is_alias);
    }

    #[test]
    fn test_alias_ttl_forced_to_zero() {
        let mut records = ZoneRecords::new();
        let mut aliased = alias("www.example.com.", "A", "lb.example.net.");
        aliased.ttl = Some(60);
        records.push(&aliased).unwrap();

        let a = &records.section(RecordType::A)[0];
        assert!(a.is_alias);
        assert_eq!(a.ttl, 0);
        assert_eq!(a.values, vec!["lb.example.net."]);
    }

    #[test]
    fn test_second_soa_is_rejected() {
        let mut records = ZoneRecords::new();
        let soa = raw("example.com.", "SOA", 900, &["ns. admin. 1 7200 900 1209600 86400"]);
        records.push(&soa).unwrap();

        let err = records.push(&soa).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_sections_keep_encounter_order() {
        let mut records = ZoneRecords::new();
        records
            .append(&[
                raw("b.example.com.", "A", 300, &["2.2.2.2"]),
                raw("a.example.com.", "A", 300, &["1.1.1.1"]),
            ])
            .unwrap();

        let names: Vec<&str> = records
            .section(RecordType::A)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["b.example.com.", "a.example.com."]);
    }

    #[test]
    fn test_record_type_parse_round_trip() {
        for record_type in RecordType::SECTIONS {
            assert_eq!(record_type.as_str().parse::<RecordType>().unwrap(), record_type);
        }
        assert!("a".parse::<RecordType>().is_err());
    }
}
