//! Bulk-import entries
//!
//! Admin bulk uploads carry a JSON array of objects with keys
//! `subject_code, subject_name, unit, type, link`. Each array element is
//! validated on its own so one bad item never sinks the batch.

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Link, ResourceKind, Result, SubjectCode, Unit};

/// One raw bulk-import item as uploaded
#[derive(Debug, Default, Deserialize)]
pub struct RawEntry {
    pub subject_code: Option<String>,
    pub subject_name: Option<String>,
    pub unit: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub link: Option<String>,
}

/// A fully validated bulk-import item
#[derive(Debug, Clone)]
pub struct ImportEntry {
    pub code: SubjectCode,
    pub name: String,
    pub unit: Unit,
    pub kind: ResourceKind,
    pub link: Link,
}

impl ImportEntry {
    /// Validate one array element from an uploaded document
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawEntry = serde_json::from_value(value.clone())?;
        raw.validate()
    }
}

impl RawEntry {
    /// Check all five fields, reporting the first problem found
    pub fn validate(self) -> Result<ImportEntry> {
        let code = required(self.subject_code, "subject_code")?;
        let name = required(self.subject_name, "subject_name")?;
        let unit = self.unit.ok_or(Error::MissingField("unit"))?;
        let kind = required(self.kind, "type")?;
        let link = required(self.link, "link")?;

        Ok(ImportEntry {
            code: SubjectCode::parse(&code)?,
            name,
            unit: unit_from_value(&unit)?,
            kind: ResourceKind::parse(&kind)?,
            link: Link::parse(&link)?,
        })
    }
}

// Internal: presence check treating whitespace-only values as absent
fn required(field: Option<String>, name: &'static str) -> Result<String> {
    let value = field.ok_or(Error::MissingField(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField(name));
    }
    Ok(value.to_string())
}

// Internal: `unit` may arrive as a JSON number or a numeric string
fn unit_from_value(value: &Value) -> Result<Unit> {
    match value {
        Value::Number(n) => Unit::new(n.as_i64().ok_or(Error::InvalidUnit)?),
        Value::String(s) => Unit::parse(s),
        _ => Err(Error::InvalidUnit),
    }
}
