//! JSON sidecar support: export a project summary into a JSON document
//! (typically `package.json`) and import field values back from one.
//!
//! Both directions work on a selectable set of [`SummaryKey`]s. Exports merge
//! into the existing document so unrelated keys survive.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::field::FieldError;
use crate::project::{FieldName, ProjectInfo};

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Field(#[from] FieldError),
    #[error("unknown summary key `{0}`")]
    UnknownKey(String),
}

// ── ProjectSummary ───────────────────────────────────────────────────────────

/// The fields shown to users and written to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name:         String,
    pub description:  String,
    pub author:       String,
    pub email:        String,
    pub homepage:     String,
    pub version:      String,
    pub full_version: String,
    pub major:        i32,
    pub minor:        i32,
    pub patch:        i32,
    pub date:         i32,
}

impl From<&ProjectInfo> for ProjectSummary {
    fn from(info: &ProjectInfo) -> Self {
        ProjectSummary {
            name:         info.name.value().into_owned(),
            description:  info.description.value().into_owned(),
            author:       info.author.value().into_owned(),
            email:        info.email.value().into_owned(),
            homepage:     info.homepage.value().into_owned(),
            version:      info.version(),
            full_version: info.full_version(),
            major:        info.major.value(),
            minor:        info.minor.value(),
            patch:        info.patch.value(),
            date:         info.date.value(),
        }
    }
}

impl ProjectSummary {
    pub fn value(&self, key: SummaryKey) -> Value {
        match key {
            SummaryKey::Name        => Value::from(self.name.as_str()),
            SummaryKey::Description => Value::from(self.description.as_str()),
            SummaryKey::Author      => Value::from(self.author.as_str()),
            SummaryKey::Major       => Value::from(self.major),
            SummaryKey::Minor       => Value::from(self.minor),
            SummaryKey::Patch       => Value::from(self.patch),
            SummaryKey::Date        => Value::from(self.date),
            SummaryKey::Version     => Value::from(self.version.as_str()),
            SummaryKey::FullVersion => Value::from(self.full_version.as_str()),
        }
    }
}

// ── SummaryKey ───────────────────────────────────────────────────────────────

/// Keys that can be imported, exported, or displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKey {
    Name,
    Description,
    Author,
    Major,
    Minor,
    Patch,
    Date,
    Version,
    FullVersion,
}

impl SummaryKey {
    /// Default selection, in the order edits are applied.
    pub const ALL: [SummaryKey; 9] = [
        SummaryKey::Name,
        SummaryKey::Description,
        SummaryKey::Author,
        SummaryKey::Major,
        SummaryKey::Minor,
        SummaryKey::Patch,
        SummaryKey::Date,
        SummaryKey::Version,
        SummaryKey::FullVersion,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SummaryKey::Name        => "name",
            SummaryKey::Description => "description",
            SummaryKey::Author      => "author",
            SummaryKey::Major       => "major",
            SummaryKey::Minor       => "minor",
            SummaryKey::Patch       => "patch",
            SummaryKey::Date        => "date",
            SummaryKey::Version     => "version",
            SummaryKey::FullVersion => "fullVersion",
        }
    }

    /// The plain field this key maps to, `None` for the version views.
    pub fn field(self) -> Option<FieldName> {
        Some(match self {
            SummaryKey::Name        => FieldName::Name,
            SummaryKey::Description => FieldName::Description,
            SummaryKey::Author      => FieldName::Author,
            SummaryKey::Major       => FieldName::Major,
            SummaryKey::Minor       => FieldName::Minor,
            SummaryKey::Patch       => FieldName::Patch,
            SummaryKey::Date        => FieldName::Date,
            SummaryKey::Version | SummaryKey::FullVersion => return None,
        })
    }

    /// Parse a comma separated list such as `version,name,author`.
    /// The result keeps the canonical order of [`SummaryKey::ALL`].
    pub fn parse_list(list: &str) -> Result<Vec<SummaryKey>, SidecarError> {
        let wanted = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SummaryKey::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SummaryKey::ALL.into_iter().filter(|k| wanted.contains(k)).collect())
    }

    /// Apply a value to `info`: `version`/`fullVersion` use the version
    /// setter, everything else sets the field directly.
    pub fn apply(self, info: &mut ProjectInfo, value: &str) -> Result<(), FieldError> {
        match self.field() {
            Some(field) => info.set(field, value),
            None if self == SummaryKey::Version => {
                info.set_version(value);
                Ok(())
            }
            None => {
                info.set_full_version(value);
                Ok(())
            }
        }
    }
}

impl FromStr for SummaryKey {
    type Err = SidecarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ver" {
            return Ok(SummaryKey::Version);
        }
        SummaryKey::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| SidecarError::UnknownKey(s.to_owned()))
    }
}

// ── Documents ────────────────────────────────────────────────────────────────

/// Read a JSON document. A missing or malformed file yields an empty object.
pub fn read_document<P: AsRef<Path>>(path: P) -> Value {
    let path = path.as_ref();
    let parsed = fs::read(path)
        .map_err(SidecarError::from)
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).map_err(SidecarError::from));
    match parsed {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using an empty JSON document");
            Value::Object(Map::new())
        }
    }
}

pub fn write_document<P: AsRef<Path>>(path: P, document: &Value) -> Result<(), SidecarError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    fs::write(path, bytes)?;
    Ok(())
}

/// Merge the selected keys of `summary` into `document`. A document that is
/// not an object is replaced with one.
pub fn export_into(document: Value, summary: &ProjectSummary, keys: &[SummaryKey]) -> Value {
    let mut map = match document {
        Value::Object(map) => map,
        _                  => Map::new(),
    };
    for &key in keys {
        map.insert(key.key().to_owned(), summary.value(key));
    }
    Value::Object(map)
}

/// The selected keys of `summary` for display, leaving out empty strings and
/// zero integers.
pub fn display_map(summary: &ProjectSummary, keys: &[SummaryKey]) -> Map<String, Value> {
    keys.iter()
        .map(|&key| (key, summary.value(key)))
        .filter(|(_, value)| match value {
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_i64() != Some(0),
            _                => true,
        })
        .map(|(key, value)| (key.key().to_owned(), value))
        .collect()
}

/// Apply the selected keys found in `document` to `info`, in canonical key
/// order. Strings and numbers are accepted. Returns the keys applied.
///
/// Both `version` and the legacy `ver` spelling are read for
/// [`SummaryKey::Version`].
pub fn import_from(
    document: &Value,
    keys:     &[SummaryKey],
    info:     &mut ProjectInfo,
) -> Result<Vec<SummaryKey>, SidecarError> {
    let Some(map) = document.as_object() else {
        return Ok(Vec::new());
    };
    let mut applied = Vec::new();
    for &key in keys {
        let found = match key {
            SummaryKey::Version => map.get("ver").or_else(|| map.get("version")),
            _                   => map.get(key.key()),
        };
        let text = match found {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                debug!(key = key.key(), value = %other, "ignoring non-scalar JSON value");
                continue;
            }
            None => continue,
        };
        key.apply(info, &text)?;
        applied.push(key);
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> ProjectInfo {
        let mut info = ProjectInfo::default();
        info.name.set("编辑器").unwrap();
        info.author.set("someone").unwrap();
        info.set(FieldName::Major, "1").unwrap();
        info.set(FieldName::Patch, "3").unwrap();
        info.set(FieldName::Date, "230101").unwrap();
        info
    }

    #[test]
    fn summary_serializes_camel_case() {
        let value = serde_json::to_value(ProjectSummary::from(&info())).unwrap();
        assert_eq!(value["fullVersion"], "1.0.3.230101");
        assert_eq!(value["name"], "编辑器");
    }

    #[test]
    fn parse_list_accepts_ver_alias() {
        let keys = SummaryKey::parse_list("ver, name,author").unwrap();
        assert_eq!(keys, [SummaryKey::Name, SummaryKey::Author, SummaryKey::Version]);
        assert!(SummaryKey::parse_list("name,nope").is_err());
    }

    #[test]
    fn export_keeps_unrelated_keys() {
        let doc = json!({ "name": "old", "dependencies": { "a": "1" } });
        let summary = ProjectSummary::from(&info());
        let out = export_into(doc, &summary, &[SummaryKey::Name, SummaryKey::Version, SummaryKey::Minor]);
        assert_eq!(out["name"], "编辑器");
        assert_eq!(out["version"], "1.0.3");
        assert_eq!(out["dependencies"]["a"], "1");
        assert_eq!(out["minor"], 0);
    }

    #[test]
    fn display_skips_empty_and_zero() {
        let map = display_map(&ProjectSummary::from(&info()), &SummaryKey::ALL);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert!(keys.contains(&"name"));
        assert!(keys.contains(&"fullVersion"));
        assert!(!keys.contains(&"description"));
        assert!(!keys.contains(&"minor"));
    }

    #[test]
    fn export_replaces_non_object() {
        let out = export_into(json!([1, 2]), &ProjectSummary::from(&info()), &[SummaryKey::Author]);
        assert_eq!(out, json!({ "author": "someone" }));
    }

    #[test]
    fn import_applies_fields_then_versions() {
        let doc = json!({ "author": "new", "major": 4, "version": "5.6.7", "homepage": "ignored" });
        let mut info = info();
        let applied = import_from(&doc, &SummaryKey::ALL, &mut info).unwrap();
        assert_eq!(applied, [SummaryKey::Author, SummaryKey::Major, SummaryKey::Version]);
        assert_eq!(info.author.value(), "new");
        assert_eq!(info.full_version(), "5.6.7.230101");
    }

    #[test]
    fn import_respects_selection() {
        let doc = json!({ "author": "new", "name": "renamed" });
        let mut info = info();
        import_from(&doc, &[SummaryKey::Name], &mut info).unwrap();
        assert_eq!(info.name.value(), "renamed");
        assert_eq!(info.author.value(), "someone");
    }

    #[test]
    fn import_rejects_bad_integer() {
        let doc = json!({ "minor": "two" });
        let err = import_from(&doc, &SummaryKey::ALL, &mut info()).unwrap_err();
        assert!(matches!(err, SidecarError::Field(FieldError::InvalidInteger { .. })));
    }

    #[test]
    fn missing_document_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = read_document(dir.path().join("absent.json"));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn document_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        write_document(&path, &json!({ "name": "x" })).unwrap();
        assert_eq!(read_document(&path), json!({ "name": "x" }));
    }
}
