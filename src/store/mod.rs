//! Endpoint store: the deduplicating `origin -> record key -> record` map.
//!
//! All mutation goes through the methods here. The store does not know about
//! the enabled flag or persistence; the engine gates and schedules around it.

use std::collections::BTreeMap;

use crate::models::{EndpointRecord, Snapshot};
use crate::normalize::{normalize_url, record_key};


/// Persisted store shape: origin -> record key -> record.
pub type StoreData = BTreeMap<String, BTreeMap<String, EndpointRecord>>;

/// Location of a record inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub origin: String,
    pub key: String,
}

/// Deduplicating endpoint store.
///
/// Within one origin no two records share a record key. Origins and record
/// keys iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointStore {
    origins: StoreData,
}

impl EndpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from its persisted shape.
    ///
    /// Records are re-keyed from their own fields, so a stale or hand-edited
    /// key cannot break the key invariant. Missing timestamps default to `now`
    /// and `hits` is raised to at least 1.
    pub fn from_data(data: StoreData, now: i64) -> Self {
        let mut store = Self::new();
        for (origin, records) in data {
            for (_, record) in records {
                store.insert(&origin, revive_record(record, now));
            }
        }
        store
    }

    /// Clones the store into its persisted shape.
    pub fn to_data(&self) -> StoreData {
        self.origins.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }

    pub fn record_count(&self) -> usize {
        self.origins.values().map(BTreeMap::len).sum()
    }

    pub fn get(&self, origin: &str, key: &str) -> Option<&EndpointRecord> {
        self.origins.get(origin)?.get(key)
    }

    pub fn get_mut(&mut self, origin: &str, key: &str) -> Option<&mut EndpointRecord> {
        self.origins.get_mut(origin)?.get_mut(key)
    }

    /// Iterates `(origin, record)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointRecord)> {
        self.origins
            .iter()
            .flat_map(|(origin, records)| records.values().map(move |r| (origin.as_str(), r)))
    }

    /// Returns the record for `(origin, method, path, query)`, creating an
    /// empty one (hits 0, timestamps `now`) if it does not exist yet.
    pub fn get_or_create(
        &mut self,
        origin: &str,
        method: &str,
        path_template: &str,
        query_skeleton: &str,
        now: i64,
    ) -> &mut EndpointRecord {
        let key = record_key(method, path_template, query_skeleton);
        self.origins
            .entry(origin.to_string())
            .or_default()
            .entry(key)
            .or_insert_with(|| EndpointRecord::new(method, path_template, query_skeleton, now))
    }

    /// Records one network observation.
    ///
    /// Returns the location of the updated record, or `None` without touching
    /// the store when `url` is not an absolute URL.
    pub fn upsert(
        &mut self,
        url: &str,
        method: &str,
        status: Option<u16>,
        resource_type: Option<&str>,
        now: i64,
    ) -> Option<RecordRef> {
        let normalized = normalize_url(url)?;
        let record = self.get_or_create(
            &normalized.origin,
            method,
            &normalized.path_template,
            &normalized.query_skeleton,
            now,
        );
        record.observe(resource_type, status, now);
        Some(RecordRef {
            key: record.key(),
            origin: normalized.origin,
        })
    }

    /// Inserts a fully-formed record under its own key, replacing any record
    /// with the same key.
    pub fn insert(&mut self, origin: &str, record: EndpointRecord) {
        self.origins
            .entry(origin.to_string())
            .or_default()
            .insert(record.key(), record);
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.origins.clear();
    }

    /// Discards the entire store and rebuilds it from `entries`.
    ///
    /// This is a replace, never a merge: origins absent from `entries` are
    /// gone afterwards. Later entries win over earlier ones with the same key.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (String, EndpointRecord)>) {
        self.origins.clear();
        for (origin, record) in entries {
            self.insert(&origin, record);
        }
    }

    /// Point-in-time copy of the store as `origin -> records`.
    pub fn snapshot(&self) -> Snapshot {
        self.origins
            .iter()
            .map(|(origin, records)| (origin.clone(), records.values().cloned().collect()))
            .collect()
    }
}

fn revive_record(mut record: EndpointRecord, now: i64) -> EndpointRecord {
    if record.first_seen <= 0 {
        record.first_seen = if record.last_seen > 0 {
            record.last_seen
        } else {
            now
        };
    }
    record.last_seen = record.last_seen.max(record.first_seen);
    record.hits = record.hits.max(1);
    record.method = crate::normalize::normalize_method(&record.method);
    record
}
