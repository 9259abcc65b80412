//! Resource catalog operations
//!
//! Maps subject codes to per-unit resource links: upsert, single-field
//! removal and overwrite, full subject deletion, and bulk JSON import.

use std::collections::BTreeSet;

use studydesk_core::{
    ImportEntry, Link, ResourceKind, SubjectCode, SubjectListing, Unit, UnitLinks,
};

use crate::store::{ResourceRow, Store, StoreResult};

/// Result of removing a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    RowNotFound,
    LinkNotFound(ResourceKind),
}

/// Result of overwriting a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    RowNotFound,
}

/// Result of a bulk import attempt
#[derive(Debug)]
pub enum BulkImportOutcome {
    /// The payload was not valid JSON
    MalformedJson,
    /// The payload parsed but was not a JSON array
    NotAnArray,
    Completed(ImportReport),
}

/// Per-batch accounting for a completed bulk import
#[derive(Debug, Default)]
pub struct ImportReport {
    pub succeeded: u32,
    pub failed: u32,
    /// 1-based item number and reason, in input order
    pub errors: Vec<(usize, String)>,
    /// Distinct subject codes touched by successful items, sorted
    pub subjects: Vec<String>,
}

/// Insert or update one link for (code, unit).
///
/// The subject name is overwritten with the supplied one; other links on the
/// row are left alone.
pub fn upsert<S: Store>(
    store: &S,
    code: &SubjectCode,
    name: &str,
    unit: Unit,
    kind: ResourceKind,
    link: Link,
) -> StoreResult<()> {
    let mut row = match store.get_resource(code, unit)? {
        Some(existing) => existing,
        None => ResourceRow {
            code: code.clone(),
            name: String::new(),
            unit,
            links: UnitLinks::default(),
        },
    };

    row.name = name.to_string();
    row.links.set(kind, Some(link));
    store.put_resource(&row)
}

/// The stored subject name, if the subject has any rows
pub fn subject_name<S: Store>(store: &S, code: &SubjectCode) -> StoreResult<Option<String>> {
    let rows = store.list_resources(code)?;
    Ok(rows.into_iter().next().map(|row| row.name))
}

/// Full listing for a subject: all six units, absent links left absent.
///
/// Returns None when the subject has no rows at all.
pub fn subject_listing<S: Store>(
    store: &S,
    code: &SubjectCode,
) -> StoreResult<Option<SubjectListing>> {
    let rows = store.list_resources(code)?;

    let name = match rows.first() {
        Some(row) => row.name.clone(),
        None => return Ok(None),
    };

    let mut listing = SubjectListing::new(code.clone(), name);
    for row in rows {
        *listing.unit_mut(row.unit) = row.links;
    }

    Ok(Some(listing))
}

/// Clear one link; deletes the row when its last link is removed
pub fn remove_link<S: Store>(
    store: &S,
    code: &SubjectCode,
    unit: Unit,
    kind: ResourceKind,
) -> StoreResult<RemoveOutcome> {
    let mut row = match store.get_resource(code, unit)? {
        Some(row) => row,
        None => return Ok(RemoveOutcome::RowNotFound),
    };

    if row.links.get(kind).is_none() {
        return Ok(RemoveOutcome::LinkNotFound(kind));
    }

    row.links.set(kind, None);

    // No empty rows persist
    if row.links.is_empty() {
        store.delete_resource(code, unit)?;
    } else {
        store.put_resource(&row)?;
    }

    Ok(RemoveOutcome::Removed)
}

/// Overwrite one link on an existing row, keeping the stored name
pub fn edit_link<S: Store>(
    store: &S,
    code: &SubjectCode,
    unit: Unit,
    kind: ResourceKind,
    link: Link,
) -> StoreResult<EditOutcome> {
    let mut row = match store.get_resource(code, unit)? {
        Some(row) => row,
        None => return Ok(EditOutcome::RowNotFound),
    };

    row.links.set(kind, Some(link));
    store.put_resource(&row)?;

    Ok(EditOutcome::Updated)
}

/// Delete every row for a subject, returning how many were removed
pub fn delete_subject<S: Store>(store: &S, code: &SubjectCode) -> StoreResult<u64> {
    store.delete_subject(code)
}

/// Import a JSON array of resource entries.
///
/// Items are independent: a bad item is recorded and skipped, good items are
/// committed. A store failure aborts the batch; items already committed stay.
pub fn bulk_import<S: Store>(store: &S, data: &[u8]) -> StoreResult<BulkImportOutcome> {
    let value: serde_json::Value = match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(_) => return Ok(BulkImportOutcome::MalformedJson),
    };

    let items = match value.as_array() {
        Some(items) => items,
        None => return Ok(BulkImportOutcome::NotAnArray),
    };

    let mut report = ImportReport::default();
    let mut subjects = BTreeSet::new();

    for (index, item) in items.iter().enumerate() {
        match ImportEntry::from_value(item) {
            Ok(entry) => {
                upsert(store, &entry.code, &entry.name, entry.unit, entry.kind, entry.link)?;
                report.succeeded += 1;
                subjects.insert(entry.code.as_str().to_string());
            }
            Err(err) => {
                report.failed += 1;
                report.errors.push((index + 1, err.to_string()));
            }
        }
    }

    report.subjects = subjects.into_iter().collect();
    Ok(BulkImportOutcome::Completed(report))
}
