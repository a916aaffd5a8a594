//! Zone listing types
//!
//! A provider enumerates its hosted zones page by page. Each zone lands in
//! the public or private map of its [`ProviderZones`], keyed by zone name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a zone answers on the public internet or only inside a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Publicly resolvable zone
    Public,
    /// Zone attached to private networks only
    Private,
}

impl Visibility {
    /// Directory name used under the provider's export directory
    pub fn dir_name(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }
}

/// A hosted zone as reported by a provider listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone name, usually with a trailing dot (`example.com.`)
    pub name: String,
    /// Provider-side identifier used for later retrieval
    pub id: String,
    /// Public or private
    pub visibility: Visibility,
}

impl Zone {
    /// Create a public zone
    pub fn public(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            visibility: Visibility::Public,
        }
    }

    /// Create a private zone
    pub fn private(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            visibility: Visibility::Private,
        }
    }
}

/// One page of a zone listing
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    /// Zones on this page
    pub zones: Vec<Zone>,
    /// Whether the provider has more pages
    pub is_truncated: bool,
    /// Opaque cursor for the next page, only honored when `is_truncated` is set
    pub next_cursor: Option<String>,
}

/// Zone name → zone id maps of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderZones {
    /// Public zones
    pub public: BTreeMap<String, String>,
    /// Private zones
    pub private: BTreeMap<String, String>,
}

impl ProviderZones {
    /// Create empty maps
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a zone into the map matching its visibility
    pub fn insert(&mut self, zone: Zone) {
        let map = match zone.visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
        };
        map.insert(zone.name, zone.id);
    }

    /// Total number of zones
    pub fn len(&self) -> usize {
        self.public.len() + self.private.len()
    }

    /// Check if no zone was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all zones, public first, each map in name order
    pub fn iter(&self) -> impl Iterator<Item = Zone> + '_ {
        let public = self
            .public
            .iter()
            .map(|(name, id)| Zone::public(name.clone(), id.clone()));
        let private = self
            .private
            .iter()
            .map(|(name, id)| Zone::private(name.clone(), id.clone()));
        public.chain(private)
    }
}
