//! Form and field-test tracking.
//!
//! A page scan is merged into the record of the page itself (an implicit GET
//! observation) as a [`FormSummary`]. Each field in the summary gets a row in
//! the field-test matrix, keyed by [`field_key`], with one cell per
//! [`TestName`].
//!
//! Whether a record's tests are complete is never stored: [`field_state`]
//! derives it from `(formSummary, fieldTests)` every time. The stored
//! `fieldsChecked` flag is only a user confirmation latch, and [`recompute`]
//! clears it whenever the derived state is not complete.

mod scan;

use std::collections::BTreeSet;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::config::{AUTO_NOTE_FIELD_LIMIT, AUTO_NOTE_PREFIX, FORM_SCAN_RESOURCE_TYPE, UNNAMED_FIELD};
use crate::models::{EndpointRecord, FieldInfo, FieldTests, FormInfo, FormSummary, TestName};
use crate::normalize::{normalize_method, normalize_url, resolve_action_path};
use crate::store::{EndpointStore, RecordRef};
use crate::utils::truncate_note;

pub use scan::{ScanPayload, ScannedField, ScannedForm};

/// Completion state of a record's field-test matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldState {
    /// No form summary, or a summary without fields
    NoFields,
    /// At least one (field, test) cell is false or missing
    Incomplete,
    /// Every (field, test) cell is true
    Complete,
    /// Complete and confirmed by the user
    Checked,
}

/// Field key for a field inside form `form_index`, or a loose field when
/// `form_index` is `None`.
///
/// # Examples
///
/// ```
/// use endpoint_inventory::forms::field_key;
///
/// assert_eq!(field_key(Some(0), "email"), "form:0|email");
/// assert_eq!(field_key(None, ""), "loose|(unnamed)");
/// ```
pub fn field_key(form_index: Option<usize>, field_name: &str) -> String {
    let name = if field_name.is_empty() {
        UNNAMED_FIELD
    } else {
        field_name
    };
    match form_index {
        Some(i) => format!("form:{i}|{name}"),
        None => format!("loose|{name}"),
    }
}

/// Every field key derivable from a summary, in form order then loose order.
pub fn summary_field_keys(summary: &FormSummary) -> Vec<String> {
    let in_forms = summary.forms.iter().enumerate().flat_map(|(i, form)| {
        form.fields
            .iter()
            .map(move |field| field_key(Some(i), &field.name))
    });
    let loose = summary
        .loose_fields
        .iter()
        .map(|field| field_key(None, &field.name));
    in_forms.chain(loose).collect()
}

/// True when the summary has fields and every (field, test) cell is true.
pub fn is_complete(summary: Option<&FormSummary>, tests: &FieldTests) -> bool {
    let Some(summary) = summary else {
        return false;
    };
    let keys = summary_field_keys(summary);
    if keys.is_empty() {
        return false;
    }
    keys.iter().all(|key| {
        tests.get(key).is_some_and(|cells| {
            TestName::iter().all(|test| cells.get(&test).copied().unwrap_or(false))
        })
    })
}

/// Derives the completion state of a record.
pub fn field_state(record: &EndpointRecord) -> FieldState {
    let has_fields = record
        .form_summary
        .as_ref()
        .is_some_and(|s| s.field_count() > 0);
    if !has_fields {
        return FieldState::NoFields;
    }
    if !is_complete(record.form_summary.as_ref(), &record.field_tests) {
        return FieldState::Incomplete;
    }
    if record.fields_checked {
        FieldState::Checked
    } else {
        FieldState::Complete
    }
}

/// Clears `fieldsChecked` unless the matrix is complete.
pub fn recompute(record: &mut EndpointRecord) {
    if record.fields_checked && !is_complete(record.form_summary.as_ref(), &record.field_tests) {
        record.fields_checked = false;
    }
}

/// Sets one (field, test) cell.
///
/// Writing `false` always clears `fieldsChecked`.
pub fn set_field_test(record: &mut EndpointRecord, field_key: &str, test: TestName, value: bool) {
    record
        .field_tests
        .entry(field_key.to_string())
        .or_default()
        .insert(test, value);
    if !value {
        record.fields_checked = false;
    }
    recompute(record);
}

/// Requests a value for `fieldsChecked`.
///
/// `false` is always accepted. `true` is only accepted when the matrix is
/// complete; otherwise the flag stays false. Returns whether the request was
/// honored.
pub fn set_fields_checked(record: &mut EndpointRecord, desired: bool) -> bool {
    if desired && !is_complete(record.form_summary.as_ref(), &record.field_tests) {
        record.fields_checked = false;
        return false;
    }
    record.fields_checked = desired;
    true
}

/// Builds the stored summary from a scan payload.
pub fn build_summary(payload: &ScanPayload, now: i64) -> FormSummary {
    let forms = payload
        .forms
        .iter()
        .map(|form| {
            let action_path_template = resolve_action_path(&payload.url, &form.action)
                .or_else(|| normalize_url(&payload.url).map(|n| n.path_template))
                .unwrap_or_default();
            FormInfo {
                method: normalize_method(&form.method),
                enctype: form.enctype.to_lowercase(),
                action_path_template,
                fields: form.fields.iter().map(ScannedField::to_field_info).collect(),
            }
        })
        .collect();

    FormSummary {
        title: payload.title.clone(),
        detected_at: now,
        forms,
        loose_fields: payload
            .loose_fields
            .iter()
            .map(ScannedField::to_field_info)
            .collect(),
    }
}

/// Renders the auto-populated note for a summary, or `None` if it has no
/// named fields.
pub fn auto_note(summary: &FormSummary) -> Option<String> {
    let mut seen = BTreeSet::new();
    let names: Vec<&str> = summary
        .forms
        .iter()
        .flat_map(|form| form.fields.iter())
        .chain(summary.loose_fields.iter())
        .map(|field: &FieldInfo| field.name.as_str())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect();

    if names.is_empty() {
        return None;
    }
    let listed = &names[..names.len().min(AUTO_NOTE_FIELD_LIMIT)];
    let mut note = format!("{AUTO_NOTE_PREFIX}{}", listed.join(", "));
    if names.len() > AUTO_NOTE_FIELD_LIMIT {
        note.push_str(&format!(" (+{} more)", names.len() - AUTO_NOTE_FIELD_LIMIT));
    }
    Some(truncate_note(&note))
}

/// Merges a page scan into the store.
///
/// Records an implicit GET observation of the page (no status, type
/// `document`), then overwrites that record's form summary wholesale. An
/// empty note is filled with the detected field names; an existing note is
/// never replaced. Returns `None` without touching the store when the page
/// URL is malformed.
pub fn merge_form_scan(
    store: &mut EndpointStore,
    payload: &ScanPayload,
    now: i64,
) -> Option<RecordRef> {
    let at = store.upsert(&payload.url, "GET", None, Some(FORM_SCAN_RESOURCE_TYPE), now)?;
    let summary = build_summary(payload, now);
    let record = store.get_mut(&at.origin, &at.key)?;

    if record.note.is_empty() {
        if let Some(note) = auto_note(&summary) {
            record.note = note;
        }
    }
    record.form_summary = Some(summary);
    recompute(record);
    Some(at)
}
