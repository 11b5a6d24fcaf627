//! Pure title filtering over an enumeration snapshot.

use super::types::{WindowQuery, WindowRecord};

/// Apply the query's title criteria to a snapshot.
///
/// `list_all` passes every record through unchanged (hidden-window
/// inclusion has already been decided by the enumerator). Otherwise a
/// record passes on whole-title equality (`exact_match`) or substring
/// containment, byte-exact or lowercased per `case_sensitive`. Relative
/// order is preserved and nothing is deduplicated, so filtering an
/// already-filtered snapshot with the same query returns it unchanged.
pub fn filter_records(records: Vec<WindowRecord>, query: &WindowQuery) -> Vec<WindowRecord> {
    if query.list_all {
        return records;
    }

    // The handler rejects title-less searches; a bare query here means
    // "no criteria" and passes the snapshot through.
    let Some(title) = query.title.as_deref() else {
        return records;
    };

    let needle = if query.case_sensitive {
        title.to_string()
    } else {
        title.to_lowercase()
    };

    records
        .into_iter()
        .filter(|record| {
            if query.case_sensitive {
                if query.exact_match {
                    record.title == needle
                } else {
                    record.title.contains(&needle)
                }
            } else {
                let haystack = record.title.to_lowercase();
                if query.exact_match {
                    haystack == needle
                } else {
                    haystack.contains(&needle)
                }
            }
        })
        .collect()
}
