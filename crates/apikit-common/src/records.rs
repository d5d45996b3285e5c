//! Record and pagination helpers

use serde_json::Value;

/// An opaque backend record; this layer never validates field values
pub type Record = serde_json::Map<String, Value>;

/// Largest page size [`handle_pagination`] accepts by default
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Offset/limit window for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

/// Translate a 1-indexed page into a limit/offset window
///
/// The page is clamped to at least 1 and the page size to `1..=max_page_size`.
/// Offsets past `usize::MAX` saturate.
pub fn handle_pagination(page: usize, page_size: usize, max_page_size: usize) -> Pagination {
    let limit = page_size.min(max_page_size).max(1);
    let page = page.max(1);
    Pagination {
        limit,
        offset: (page - 1).saturating_mul(limit),
    }
}

/// Collect the `id_field` of every record that has one
pub fn extract_ids(records: &[Value], id_field: &str) -> Vec<Value> {
    records
        .iter()
        .filter_map(|record| record.get(id_field).cloned())
        .collect()
}

/// Split a slice into chunks of at most `chunk_size` items
pub fn chunk_list<T: Clone>(items: &[T], chunk_size: usize) -> Vec<Vec<T>> {
    if chunk_size == 0 {
        return Vec::new();
    }
    items.chunks(chunk_size).map(<[T]>::to_vec).collect()
}
