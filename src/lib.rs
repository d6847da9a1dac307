//! endpoint_inventory library: passive endpoint inventory engine
//!
//! This library turns a stream of observed network requests and page form
//! scans into a deduplicated inventory of endpoints. Every request URL is
//! normalized to an `(origin, METHOD pathTemplate querySkeleton)` identity,
//! so `/users/42` and `/users/7` land in the same record, and each record
//! tracks hit counts, statuses, a tested flag, notes and a per-field security
//! test checklist. The inventory is persisted with a debounced writer and can
//! be exported to and re-imported from CSV.
//!
//! # Example
//!
//! ```no_run
//! use endpoint_inventory::{Config, Engine, ExportFilter};
//!
//! let config = Config::default();
//! let mut engine = Engine::new(config.flush_interval);
//! engine.set_enabled(true);
//! engine.upsert("https://api.example.com/users/42?utm_source=x", "GET", Some(200), None);
//!
//! let csv = engine.export_csv(&ExportFilter::default()).unwrap();
//! assert!(csv.contains("/users/:id"));
//! ```
//!
//! # Requirements
//!
//! The engine itself is synchronous. [`run_engine`], [`run_server`] and
//! [`run_ingest`] require a Tokio runtime.

mod app;
pub mod config;
pub mod engine;
pub mod error_handling;
pub mod export;
pub mod forms;
pub mod initialization;
pub mod models;
pub mod normalize;
pub mod persistence;
mod run;
pub mod status_server;
pub mod store;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use engine::{run_engine, Engine, EngineHandle, Message, Reply};
pub use error_handling::{CsvError, DropReason, DropStats, PersistenceError};
pub use export::{export_csv, import_csv, is_static_asset, ExportFilter, ImportedEntry, TestedFilter};
pub use forms::{FieldState, ScanPayload};
pub use models::{EndpointRecord, FieldTests, FormSummary, Snapshot, TestName};
pub use normalize::{normalize_url, query_skeleton, record_key, template_path, NormalizedUrl};
pub use persistence::{FlushScheduler, JsonFileSink, MemorySink, PersistedState, StateSink};
pub use run::{
    open_engine, run_export, run_import, run_ingest, run_reset, run_server, run_set_enabled,
    ExportReport, IngestReport, RunReport,
};
pub use store::{EndpointStore, RecordRef};
pub use utils::{format_timestamp, now_millis, parse_timestamp};
