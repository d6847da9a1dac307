//! Endpoint inventory data model.
//!
//! The store is a two-level mapping `origin -> record key -> EndpointRecord`.
//! Records serialize with camelCase keys; sets become arrays and maps become
//! plain objects, which is also the persisted shape.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::normalize::record_key;

/// The fixed set of security tests tracked per form field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum TestName {
    Xss,
    Sqli,
    Ssrf,
    File,
    Auth,
}

impl TestName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestName::Xss => "xss",
            TestName::Sqli => "sqli",
            TestName::Ssrf => "ssrf",
            TestName::File => "file",
            TestName::Auth => "auth",
        }
    }
}

impl std::fmt::Display for TestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field key -> test name -> passed.
pub type FieldTests = BTreeMap<String, BTreeMap<TestName, bool>>;

/// Point-in-time view of the store: origin -> records.
pub type Snapshot = BTreeMap<String, Vec<EndpointRecord>>;

/// A form field as recorded in a form summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub multiple: bool,
    pub accept: String,
}

/// A form as recorded in a form summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormInfo {
    pub method: String,
    pub enctype: String,
    pub action_path_template: String,
    pub fields: Vec<FieldInfo>,
}

/// Result of the most recent page scan merged into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSummary {
    pub title: String,
    /// Milliseconds since the Unix epoch
    pub detected_at: i64,
    pub forms: Vec<FormInfo>,
    pub loose_fields: Vec<FieldInfo>,
}

impl FormSummary {
    /// Total number of fields, in forms and loose.
    pub fn field_count(&self) -> usize {
        self.forms.iter().map(|f| f.fields.len()).sum::<usize>() + self.loose_fields.len()
    }
}

/// One unique `(origin, method, pathTemplate, querySkeleton)` endpoint.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    pub method: String,
    pub path_template: String,
    #[serde(default)]
    pub query_skeleton: String,
    #[serde(default)]
    pub types: BTreeSet<String>,
    #[serde(default)]
    pub statuses: BTreeSet<u16>,
    #[serde(default)]
    pub status_counts: BTreeMap<u16, u64>,
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub first_seen: i64,
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default)]
    pub tested: bool,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_summary: Option<FormSummary>,
    #[serde(default)]
    pub fields_checked: bool,
    #[serde(default)]
    pub field_tests: FieldTests,
}

impl EndpointRecord {
    /// Creates an empty record; `hits` stays 0 until the first observation.
    pub fn new(method: &str, path_template: &str, query_skeleton: &str, now: i64) -> Self {
        Self {
            method: crate::normalize::normalize_method(method),
            path_template: path_template.to_string(),
            query_skeleton: query_skeleton.to_string(),
            types: BTreeSet::new(),
            statuses: BTreeSet::new(),
            status_counts: BTreeMap::new(),
            hits: 0,
            first_seen: now,
            last_seen: now,
            tested: false,
            note: String::new(),
            form_summary: None,
            fields_checked: false,
            field_tests: FieldTests::new(),
        }
    }

    /// The record key this record is stored under.
    pub fn key(&self) -> String {
        record_key(&self.method, &self.path_template, &self.query_skeleton)
    }

    /// Merges one observation into the record.
    ///
    /// Sets grow by union, counts by addition, so merging is order-independent.
    pub fn observe(&mut self, resource_type: Option<&str>, status: Option<u16>, now: i64) {
        if let Some(resource_type) = resource_type.filter(|t| !t.is_empty()) {
            self.types.insert(resource_type.to_string());
        }
        if let Some(status) = status {
            self.statuses.insert(status);
            *self.status_counts.entry(status).or_insert(0) += 1;
        }
        self.hits += 1;
        self.last_seen = self.last_seen.max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_merges_counts_and_sets() {
        let mut rec = EndpointRecord::new("get", "/users/:id", "", 1_000);
        rec.observe(Some("xmlhttprequest"), Some(200), 1_500);
        rec.observe(Some("script"), Some(404), 2_000);
        rec.observe(Some("xmlhttprequest"), None, 2_500);

        assert_eq!(rec.method, "GET");
        assert_eq!(rec.hits, 3);
        assert_eq!(rec.types.len(), 2);
        assert_eq!(rec.statuses, BTreeSet::from([200, 404]));
        assert_eq!(rec.status_counts.get(&200), Some(&1));
        assert_eq!(rec.status_counts.values().sum::<u64>(), 2);
        assert_eq!(rec.first_seen, 1_000);
        assert_eq!(rec.last_seen, 2_500);
    }

    #[test]
    fn test_record_key_matches_normalizer() {
        let rec = EndpointRecord::new("post", "/login", "?next=:param", 0);
        assert_eq!(rec.key(), "POST /login?next=:param");
    }

    #[test]
    fn test_record_serializes_camel_case_with_string_status_keys() {
        let mut rec = EndpointRecord::new("GET", "/", "", 5);
        rec.observe(None, Some(200), 6);
        rec.field_tests
            .entry("loose|q".to_string())
            .or_default()
            .insert(TestName::Xss, true);
        let json = serde_json::to_value(&rec).expect("serializes");
        assert_eq!(json["pathTemplate"], "/");
        assert_eq!(json["statusCounts"]["200"], 1);
        assert_eq!(json["statuses"], serde_json::json!([200]));
        assert_eq!(json["fieldTests"]["loose|q"]["xss"], true);
        assert!(json.get("formSummary").is_none());
    }

    #[test]
    fn test_record_deserializes_with_missing_optional_fields() {
        let rec: EndpointRecord = serde_json::from_value(serde_json::json!({
            "method": "GET",
            "pathTemplate": "/a",
            "statusCounts": {"404": 3}
        }))
        .expect("deserializes");
        assert_eq!(rec.status_counts.get(&404), Some(&3));
        assert_eq!(rec.hits, 0);
        assert!(rec.note.is_empty());
        assert!(rec.form_summary.is_none());
    }

    #[test]
    fn test_form_summary_field_count() {
        let summary = FormSummary {
            forms: vec![FormInfo {
                fields: vec![FieldInfo::default(), FieldInfo::default()],
                ..Default::default()
            }],
            loose_fields: vec![FieldInfo::default()],
            ..Default::default()
        };
        assert_eq!(summary.field_count(), 3);
    }
}
