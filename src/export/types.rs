//! Export filter options.

use serde::Deserialize;

use super::assets::is_static_asset;
use crate::models::EndpointRecord;

/// Filter on the tested flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestedFilter {
    /// Only records marked tested
    Tested,
    /// Only records not yet marked tested
    Untested,
}

/// Narrows which records an export includes.
///
/// Every criterion is optional; an empty filter exports everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportFilter {
    /// Exact origin, e.g. `https://api.example.com`
    pub origin: Option<String>,
    /// HTTP method, case-insensitive
    pub method: Option<String>,
    /// Keep records that have seen this status
    pub status: Option<u16>,
    pub tested: Option<TestedFilter>,
    /// Case-insensitive substring of `origin method path+query`
    pub search: Option<String>,
    /// Drop records that look like static assets
    pub hide_assets: bool,
}

impl ExportFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `record` under `origin` passes every criterion.
    pub fn matches(&self, origin: &str, record: &EndpointRecord) -> bool {
        if let Some(wanted) = self.origin.as_deref().filter(|o| !o.is_empty()) {
            if wanted != origin {
                return false;
            }
        }
        if let Some(method) = self.method.as_deref().filter(|m| !m.is_empty()) {
            if !method.eq_ignore_ascii_case(&record.method) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if !record.status_counts.contains_key(&status) && !record.statuses.contains(&status) {
                return false;
            }
        }
        match self.tested {
            Some(TestedFilter::Tested) if !record.tested => return false,
            Some(TestedFilter::Untested) if record.tested => return false,
            _ => {}
        }
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let haystack = format!(
                "{} {} {}{}",
                origin, record.method, record.path_template, record.query_skeleton
            )
            .to_lowercase();
            if !haystack.contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.hide_assets && is_static_asset(record) {
            return false;
        }
        true
    }
}
