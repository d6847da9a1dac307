//! CSV codec for the endpoint store.
//!
//! Cells are quoted only when they contain a delimiter, a quote or a line
//! break; embedded quotes are doubled. One malformed row never aborts an
//! import: it is dropped and counted in [`DropStats`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use regex::Regex;

use super::types::ExportFilter;
use crate::error_handling::{CsvError, DropReason, DropStats};
use crate::models::{EndpointRecord, FieldTests};
use crate::normalize::normalize_method;
use crate::store::EndpointStore;
use crate::utils::{format_timestamp, parse_timestamp, truncate_note};

/// Column order of every exported file.
pub const CSV_COLUMNS: [&str; 12] = [
    "origin",
    "method",
    "path",
    "query",
    "hits",
    "statusCounts",
    "statuses",
    "tested",
    "fieldsChecked",
    "fieldTests",
    "note",
    "lastSeen",
];

static STATUS_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})x(\d+)$").expect("valid status count regex"));

/// One record parsed from an import, with the origin it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedEntry {
    pub origin: String,
    pub record: EndpointRecord,
}

/// Serializes the records that pass `filter` to CSV text.
///
/// Rows follow store order: origins, then record keys, lexicographically. An
/// empty store yields just the header row.
pub fn export_csv(store: &EndpointStore, filter: &ExportFilter) -> Result<String, CsvError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_COLUMNS)?;
    let mut rows = 0usize;
    for (origin, record) in store.iter().filter(|(o, r)| filter.matches(o, r)) {
        writer.write_record(export_row(origin, record))?;
        rows += 1;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Io(e.into_error()))?;
    log::debug!("Exported {} of {} record(s) to CSV", rows, store.record_count());
    Ok(String::from_utf8(bytes)?)
}

fn export_row(origin: &str, record: &EndpointRecord) -> [String; 12] {
    let status_counts = record
        .status_counts
        .iter()
        .map(|(code, count)| format!("{code}x{count}"))
        .collect::<Vec<_>>()
        .join("|");
    let statuses = record
        .statuses
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join("|");
    let field_tests = if record.field_tests.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&record.field_tests).unwrap_or_default()
    };

    [
        origin.to_string(),
        record.method.clone(),
        record.path_template.clone(),
        record.query_skeleton.clone(),
        record.hits.to_string(),
        status_counts,
        statuses,
        flag(record.tested).to_string(),
        flag(record.fields_checked).to_string(),
        field_tests,
        record.note.clone(),
        format_timestamp(record.last_seen),
    ]
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Header positions, looked up by name so column order on import is free.
struct Columns {
    by_name: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let by_name = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { by_name }
    }

    /// `None` when the column is absent from the header; `""` when the row is
    /// shorter than the header.
    fn cell<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.by_name
            .get(name)
            .map(|&i| row.get(i).unwrap_or(""))
    }
}

/// Parses CSV text into store entries.
///
/// Fails only when the text cannot be read as CSV at all. Rows without an
/// origin, method column or path column are dropped and counted; a zero-row
/// result is still a success. `now` stands in for unparseable `lastSeen`
/// cells.
pub fn import_csv(text: &str, stats: &DropStats, now: i64) -> Result<Vec<ImportedEntry>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = Columns::new(reader.headers()?);
    let mut entries = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match parse_row(&columns, &row, stats, now) {
            Some(entry) => entries.push(entry),
            None => {
                log::debug!("Dropping CSV row {:?}", row.position().map(|p| p.line()));
                stats.increment(DropReason::MalformedCsvRow);
            }
        }
    }

    log::debug!("Parsed {} CSV row(s)", entries.len());
    Ok(entries)
}

fn parse_row(
    columns: &Columns,
    row: &StringRecord,
    stats: &DropStats,
    now: i64,
) -> Option<ImportedEntry> {
    let origin = columns
        .cell(row, "origin")
        .map(str::trim)
        .filter(|o| !o.is_empty())?;
    let method = normalize_method(columns.cell(row, "method")?);
    let path = match columns.cell(row, "path")? {
        "" => "/",
        path => path,
    };
    let query = columns.cell(row, "query").unwrap_or("");

    let last_seen = columns
        .cell(row, "lastSeen")
        .and_then(parse_timestamp)
        .unwrap_or(now);
    let mut record = EndpointRecord::new(&method, path, query, last_seen);

    record.hits = columns
        .cell(row, "hits")
        .and_then(|h| h.trim().parse::<u64>().ok())
        .unwrap_or(0)
        .max(1);
    record.status_counts = parse_status_counts(columns.cell(row, "statusCounts").unwrap_or(""));
    record.statuses = parse_statuses(columns.cell(row, "statuses").unwrap_or(""));
    record.tested = parse_flag(columns.cell(row, "tested").unwrap_or(""));
    record.fields_checked = parse_flag(columns.cell(row, "fieldsChecked").unwrap_or(""));
    record.field_tests = parse_field_tests(columns.cell(row, "fieldTests").unwrap_or(""), stats);
    record.note = truncate_note(columns.cell(row, "note").unwrap_or(""));

    Some(ImportedEntry {
        origin: origin.to_string(),
        record,
    })
}

/// `200x5|404x1` -> `{200: 5, 404: 1}`. Malformed parts are skipped; repeated
/// codes add up.
fn parse_status_counts(cell: &str) -> BTreeMap<u16, u64> {
    let mut counts = BTreeMap::new();
    for part in cell.split('|').map(str::trim) {
        let Some(caps) = STATUS_COUNT_RE.captures(part) else {
            continue;
        };
        if let (Ok(code), Ok(count)) = (caps[1].parse::<u16>(), caps[2].parse::<u64>()) {
            *counts.entry(code).or_insert(0) += count;
        }
    }
    counts
}

fn parse_statuses(cell: &str) -> BTreeSet<u16> {
    cell.split('|')
        .filter_map(|s| s.trim().parse::<u16>().ok())
        .filter(|code| *code <= 999)
        .collect()
}

fn parse_flag(cell: &str) -> bool {
    let cell = cell.trim();
    cell == "1" || cell.eq_ignore_ascii_case("true")
}

fn parse_field_tests(cell: &str, stats: &DropStats) -> FieldTests {
    let cell = cell.trim();
    if cell.is_empty() {
        return FieldTests::new();
    }
    match serde_json::from_str(cell) {
        Ok(tests) => tests,
        Err(e) => {
            log::debug!("Ignoring malformed fieldTests cell: {}", e);
            stats.increment(DropReason::MalformedFieldTests);
            FieldTests::new()
        }
    }
}
