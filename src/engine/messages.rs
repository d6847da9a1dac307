//! Wire format of the control surface.
//!
//! Messages are JSON objects tagged by `type`, e.g.
//! `{"type":"setTested","origin":"https://a.com","recKey":"GET /","tested":true}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::export::ExportFilter;
use crate::forms::ScanPayload;
use crate::models::{Snapshot, TestName};
use crate::store::RecordRef;

/// A command sent to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Message {
    GetState,
    /// Capture flag plus store counts, read in one step.
    GetStatus,
    SetEnabled {
        enabled: bool,
    },
    GetData,
    ResetData,
    SetTested {
        origin: String,
        rec_key: String,
        tested: bool,
    },
    SetManyTested {
        #[serde(default)]
        items: Vec<RecordTarget>,
        tested: bool,
    },
    SetNote {
        origin: String,
        rec_key: String,
        #[serde(default)]
        note: String,
    },
    SetFieldTest {
        origin: String,
        rec_key: String,
        field_key: String,
        test: TestName,
        value: bool,
    },
    SetFieldsChecked {
        origin: String,
        rec_key: String,
        checked: bool,
    },
    /// One network request event.
    Observe {
        url: String,
        #[serde(default)]
        method: String,
        #[serde(default, deserialize_with = "lenient_status")]
        status_code: Option<u16>,
        #[serde(default)]
        resource_type: Option<String>,
    },
    ReportForms {
        payload: ScanPayload,
    },
    ImportCsv {
        csv: String,
    },
    ExportCsv {
        #[serde(default)]
        filter: ExportFilter,
    },
    #[serde(other)]
    Unknown,
}

impl Message {
    /// Name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetState => "getState",
            Message::GetStatus => "getStatus",
            Message::SetEnabled { .. } => "setEnabled",
            Message::GetData => "getData",
            Message::ResetData => "resetData",
            Message::SetTested { .. } => "setTested",
            Message::SetManyTested { .. } => "setManyTested",
            Message::SetNote { .. } => "setNote",
            Message::SetFieldTest { .. } => "setFieldTest",
            Message::SetFieldsChecked { .. } => "setFieldsChecked",
            Message::Observe { .. } => "observe",
            Message::ReportForms { .. } => "reportForms",
            Message::ImportCsv { .. } => "importCsv",
            Message::ExportCsv { .. } => "exportCsv",
            Message::Unknown => "unknown",
        }
    }
}

/// `{origin, recKey}` pair addressing one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTarget {
    pub origin: String,
    pub rec_key: String,
}

impl From<RecordTarget> for RecordRef {
    fn from(target: RecordTarget) -> Self {
        RecordRef {
            origin: target.origin,
            key: target.rec_key,
        }
    }
}

/// Answer to a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Reply {
    Imported { ok: bool, imported: usize },
    Failed { ok: bool, error: String },
    Ok { ok: bool },
    Status {
        enabled: bool,
        origins: usize,
        records: usize,
        tested_records: usize,
    },
    State { enabled: bool },
    Data { data: Snapshot },
    Csv { csv: String },
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Ok { ok: true }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Reply::Failed {
            ok: false,
            error: error.to_string(),
        }
    }
}

/// Accepts only an integer in `0..=999` as a status code; anything else
/// (float, string, out of range, null) is treated as absent.
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .filter(|code| *code <= 999)
        .and_then(|code| u16::try_from(code).ok()))
}
