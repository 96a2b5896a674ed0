//! Catalog merger: remote catalog plus locally published drafts

mod library;
mod record;
mod source;

pub use library::{Library, Renderer};
pub use record::{CatalogRecord, ChapterRecord, ChapterView, EXCERPT_CHARS};
pub use source::{
    parse_catalog, CatalogSource, HttpCatalogSource, StaticCatalog, StoreCatalogSource,
};

use std::collections::HashMap;

/// Merge remote and local records into one list ordered by title
///
/// Records are de-duplicated by [`CatalogRecord::identity_key`]; local
/// records replace remote ones with the same key.
pub fn merge_catalog(
    remote: Vec<CatalogRecord>,
    local: Vec<CatalogRecord>,
) -> Vec<CatalogRecord> {
    let mut merged: Vec<CatalogRecord> = Vec::with_capacity(remote.len() + local.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for record in remote.into_iter().chain(local) {
        let key = record.identity_key();
        if let Some(&slot) = slots.get(&key) {
            merged[slot] = record;
        } else {
            slots.insert(key, merged.len());
            merged.push(record);
        }
    }

    merged.sort_by_cached_key(CatalogRecord::sort_key);
    merged
}
