//! Zonefile serialization
//!
//! Two paths produce the text that lands in the snapshot:
//!
//! - [`serialize`] renders a [`ZoneRecords`] aggregate into BIND-style text.
//! - [`normalize_export`] cleans up a BIND export produced by the provider.
//!
//! Both replace the SOA serial with [`SOA_SERIAL_SENTINEL`]. Providers bump
//! the serial on every change (or every export), which would make each run
//! show up as a diff even when no record moved.
//!
//! ## Layout
//!
//! ```text
//! ;; SOA Record
//! example.com.	900	IN	SOA	ns. admin. 1 7200 900 1209600 86400
//!
//! ;; A Records
//! example.com.	300	IN	A	192.0.2.1
//!
//! ;; Alias Records
//! www.example.com.	0	IN	A	lb.example.net.
//! ```

use regex::Regex;

use crate::error::{Error, Result};
use crate::records::{RecordSet, RecordType, ZoneRecords};

/// Value every SOA serial is rewritten to
pub const SOA_SERIAL_SENTINEL: &str = "1";

/// Marker line opening the SOA section
pub const SOA_MARKER: &str = ";; SOA Record";

const ALIAS_HEADER: &str = ";; Alias Records\n";

const EXPORTED_SOA_PATTERN: &str = r"^(?P<name>\S+)\s+(?P<ttl>\d+)\s+IN\s+SOA\s+(?P<mname>\S+)\s+(?P<rname>\S+)\s+\d+\s+(?P<refresh>\d+)\s+(?P<retry>\d+)\s+(?P<expire>\d+)\s+(?P<minimum>\d+)\s*$";

/// Render a zone's records as zonefile text
///
/// Sections follow [`RecordType::SECTIONS`]. Alias entries are collected
/// into a single trailing block, in the order they were met.
///
/// # Errors
///
/// `Error::Parse` when the zone has no SOA record or the SOA value has
/// fewer than three fields.
pub fn serialize(records: &ZoneRecords) -> Result<String> {
    let soa = records
        .soa()
        .ok_or_else(|| Error::parse("zone has no SOA record"))?;
    let soa_value = soa
        .values
        .first()
        .ok_or_else(|| Error::parse(format!("SOA record {} has no value", soa.name)))?;

    let mut out = String::new();
    out.push_str(SOA_MARKER);
    out.push('\n');
    push_line(&mut out, &soa.name, soa.ttl, RecordType::Soa, &normalize_soa_value(soa_value)?);
    out.push('\n');

    let mut aliases = String::new();
    for record_type in RecordType::SECTIONS {
        let section = records.section(record_type);
        if section.is_empty() {
            continue;
        }

        out.push_str(&format!(";; {record_type} Records\n"));
        for record in section {
            if record.is_alias {
                if aliases.is_empty() {
                    aliases.push_str(ALIAS_HEADER);
                }
                push_record(&mut aliases, record, record_type);
            } else {
                push_record(&mut out, record, record_type);
            }
        }
        out.push('\n');
    }

    out.push_str(&aliases);
    Ok(out)
}

/// Strip the export banner and pin the SOA serial of a provider export
///
/// Everything before the `;; SOA Record` marker is dropped. The SOA line
/// that follows is re-emitted tab separated with the serial pinned; the
/// remaining text is kept verbatim.
pub fn normalize_export(text: &str) -> Result<String> {
    let (_, after_marker) = text
        .split_once(SOA_MARKER)
        .ok_or_else(|| Error::parse("export has no SOA Record section"))?;
    let after_marker = after_marker.trim_start_matches(['\r', '\n']);

    let (soa_line, rest) = match after_marker.split_once('\n') {
        Some((line, rest)) => (line, Some(rest)),
        None => (after_marker, None),
    };

    let pattern = Regex::new(EXPORTED_SOA_PATTERN)
        .map_err(|e| Error::parse(format!("SOA line pattern: {e}")))?;
    let caps = pattern
        .captures(soa_line)
        .ok_or_else(|| Error::parse(format!("unexpected SOA line: {soa_line:?}")))?;

    let mut out = String::with_capacity(text.len());
    out.push_str(SOA_MARKER);
    out.push('\n');
    out.push_str(&format!(
        "{}\t{}\tIN\tSOA\t{} {} {} {} {} {} {}",
        &caps["name"],
        &caps["ttl"],
        &caps["mname"],
        &caps["rname"],
        SOA_SERIAL_SENTINEL,
        &caps["refresh"],
        &caps["retry"],
        &caps["expire"],
        &caps["minimum"],
    ));
    if let Some(rest) = rest {
        out.push('\n');
        out.push_str(rest);
    }
    Ok(out)
}

/// File name a zone is exported to
///
/// One trailing dot is dropped and the first remaining dot becomes a dash:
/// `www.example.com.` → `www-example.com.txt`.
pub fn zonefile_name(zone_name: &str) -> String {
    let trimmed = zone_name.strip_suffix('.').unwrap_or(zone_name);
    format!("{}.txt", trimmed.replacen('.', "-", 1))
}

fn normalize_soa_value(value: &str) -> Result<String> {
    let mut fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(Error::parse(format!("SOA value has no serial field: {value:?}")));
    }
    fields[2] = SOA_SERIAL_SENTINEL;
    Ok(fields.join(" "))
}

fn push_record(out: &mut String, record: &RecordSet, record_type: RecordType) {
    for value in &record.values {
        push_line(out, &record.name, record.ttl, record_type, value);
    }
}

fn push_line(out: &mut String, name: &str, ttl: i64, record_type: RecordType, value: &str) {
    out.push_str(&format!("{name}\t{ttl}\tIN\t{record_type}\t{value}\n"));
}
