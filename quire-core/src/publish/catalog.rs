//! Editing the remote catalog document

use crate::error::{QuireError, Result};
use crate::types::CatalogEntry;
use serde_json::Value;

fn entries(current: Option<&[u8]>) -> Result<Vec<Value>> {
    let data = match current {
        Some(data) if !data.iter().all(u8::is_ascii_whitespace) => data,
        _ => return Ok(Vec::new()),
    };

    match serde_json::from_slice(data) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(QuireError::Validation(
            "remote catalog is not a JSON array".to_string(),
        )),
        Err(e) => Err(QuireError::Validation(format!(
            "remote catalog is malformed: {}",
            e
        ))),
    }
}

fn has_path(value: &Value, path: &str) -> bool {
    value.get("path").and_then(Value::as_str) == Some(path)
}

/// Replace the entry with the same `path`, or append it
///
/// Other entries are kept as they are, including ones this crate does not
/// understand.
pub fn upsert_entry(current: Option<&[u8]>, entry: &CatalogEntry) -> Result<Vec<u8>> {
    let mut entries = entries(current)?;
    let value = serde_json::to_value(entry)?;

    match entries.iter_mut().find(|e| has_path(e, &entry.path)) {
        Some(slot) => *slot = value,
        None => entries.push(value),
    }

    Ok(serde_json::to_vec_pretty(&entries)?)
}

pub(super) fn contains_path(current: &[u8], path: &str) -> Result<bool> {
    Ok(entries(Some(current))?.iter().any(|e| has_path(e, path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(path: &str, title: &str) -> CatalogEntry {
        CatalogEntry {
            id: None,
            path: path.to_string(),
            title: title.to_string(),
            author: "A".to_string(),
            updated: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn parse(data: &[u8]) -> Vec<Value> {
        serde_json::from_slice(data).unwrap()
    }

    #[test]
    fn test_missing_catalog_is_created() {
        let out = upsert_entry(None, &entry("books/a.json", "A")).unwrap();
        let entries = parse(&out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["updated"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_same_path_is_replaced() {
        let first = upsert_entry(None, &entry("books/a.json", "Old")).unwrap();
        let second = upsert_entry(Some(&first), &entry("books/b.json", "B")).unwrap();
        let third = upsert_entry(Some(&second), &entry("books/a.json", "New")).unwrap();

        let entries = parse(&third);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["title"], "New");
        assert_eq!(entries[1]["title"], "B");
    }

    #[test]
    fn test_resubmitting_is_byte_identical() {
        let once = upsert_entry(None, &entry("books/a.json", "A")).unwrap();
        let twice = upsert_entry(Some(&once), &entry("books/a.json", "A")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_foreign_entries_are_preserved() {
        let current = br#"[{"title": "Hand written", "tags": ["x"]}]"#;
        let out = upsert_entry(Some(current), &entry("books/a.json", "A")).unwrap();
        let entries = parse(&out);
        assert_eq!(entries[0]["tags"][0], "x");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_non_array_catalog_is_rejected() {
        let err = upsert_entry(Some(br#"{"books": []}"#), &entry("p", "t")).unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[test]
    fn test_contains_path() {
        let current = upsert_entry(None, &entry("books/a.json", "A")).unwrap();
        assert!(contains_path(&current, "books/a.json").unwrap());
        assert!(!contains_path(&current, "books/b.json").unwrap());
    }
}
