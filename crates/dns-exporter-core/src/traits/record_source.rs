// # Record Set Source
//
// Paginated access to the structured record sets of a zone. Providers that
// return records rather than a ready-made export implement this and feed
// it to `records::collect_records`.

use async_trait::async_trait;

use crate::records::{RecordCursor, RecordSetPage};

/// Trait for paginated record set listings
#[async_trait]
pub trait RecordSetSource: Send + Sync {
    /// Name used when reporting provider faults
    fn source_name(&self) -> &'static str;

    /// List one page of record sets of a zone
    ///
    /// `cursor` is `None` for the first page and the previous page's `next`
    /// afterwards.
    async fn list_record_sets(
        &self,
        zone_id: &str,
        cursor: Option<&RecordCursor>,
    ) -> Result<RecordSetPage, crate::Error>;
}
