//! CSV export and import of the endpoint store.
//!
//! The CSV shape is fixed: a header row followed by one row per record, with
//! multi-valued columns packed into single cells (`200x5|404x1`, `200|404`,
//! JSON for field tests). Import replaces the store wholesale.

mod assets;
mod csv;
mod types;

pub use assets::is_static_asset;
pub use self::csv::{export_csv, import_csv, ImportedEntry, CSV_COLUMNS};
pub use types::{ExportFilter, TestedFilter};
