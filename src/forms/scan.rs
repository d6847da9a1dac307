//! Form-scan payload as reported by the page-side scanner.
//!
//! Only the attributes the tracker uses are kept; anything else the scanner
//! sends (placeholder, pattern, options, ...) is ignored.

use serde::Deserialize;

use crate::models::FieldInfo;

/// One page scan.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanPayload {
    pub url: String,
    pub title: String,
    pub forms: Vec<ScannedForm>,
    pub loose_fields: Vec<ScannedField>,
}

/// A `<form>` element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScannedForm {
    pub action: String,
    pub method: String,
    pub enctype: String,
    pub fields: Vec<ScannedField>,
}

/// An input, select or textarea element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScannedField {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub multiple: bool,
    pub accept: String,
}

impl ScannedField {
    /// Converts to the stored field, using the element id when the field has
    /// no name.
    pub fn to_field_info(&self) -> FieldInfo {
        let name = if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        FieldInfo {
            name,
            field_type: self.field_type.clone(),
            required: self.required,
            multiple: self.multiple,
            accept: self.accept.clone(),
        }
    }
}
