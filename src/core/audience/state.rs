//! Persisted audience state records
//!
//! One YAML document per audience, keyed by the audience name:
//!
//! ```yaml
//! Sample:
//!   description: Sample audience
//!   source:
//!     endpoint: https://gateway.example.com/audiences/sample
//!     params: {segment: sample}
//!     last_response: {date: '20250101', status: 200, message: ok}
//!   adtechA:
//!     name: Sample
//!     id: null
//!     audience_type: TYPE_X
//!     last_response: {date: null, status: null, message: null}
//! ```
//!
//! Per-kind destination settings are kept in their raw form here and are
//! validated when the destination adapter is constructed, so a bad value is
//! reported against its destination kind and field.

use crate::domain::{AudienceName, LastResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of one audience
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudienceState {
    #[serde(default)]
    pub description: String,

    pub source: SourceState,

    #[serde(rename = "adtechA", default, skip_serializing_if = "Option::is_none")]
    pub adtech_a: Option<AdtechAState>,

    #[serde(rename = "adtechB", default, skip_serializing_if = "Option::is_none")]
    pub adtech_b: Option<AdtechBState>,
}

/// Data source location and its last response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceState {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub last_response: LastResponse,
}

/// adtechA destination record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdtechAState {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "id_text::deserialize")]
    pub id: Option<String>,

    #[serde(default)]
    pub audience_type: Option<String>,

    #[serde(default)]
    pub last_response: LastResponse,
}

/// adtechB destination record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdtechBState {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "id_text::deserialize")]
    pub id: Option<String>,

    #[serde(default)]
    pub expiration_time: Option<IntegerSetting>,

    #[serde(default)]
    pub last_response: LastResponse,
}

/// Integer setting that may be written as a number or as a quoted string
///
/// Only the shape is checked when the document is decoded; the value is
/// parsed and range-checked by the destination that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerSetting {
    Number(i64),
    Text(String),
}

impl IntegerSetting {
    /// Parses the setting, trimming surrounding whitespace from text values
    pub fn to_i64(&self) -> Result<i64, String> {
        match self {
            IntegerSetting::Number(value) => Ok(*value),
            IntegerSetting::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("'{text}' is not an integer")),
        }
    }
}

impl From<i64> for IntegerSetting {
    fn from(value: i64) -> Self {
        IntegerSetting::Number(value)
    }
}

/// Destination ids are kept as text; a bare number in the document is accepted
mod id_text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawId>::deserialize(deserializer)? {
            None => None,
            Some(RawId::Number(value)) => Some(value.to_string()),
            Some(RawId::Text(value)) => Some(value),
        })
    }
}

/// A named audience state, encoded as a single-entry mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<AudienceName, AudienceState>",
    into = "BTreeMap<AudienceName, AudienceState>"
)]
pub struct AudienceDocument {
    pub name: AudienceName,
    pub state: AudienceState,
}

impl AudienceDocument {
    pub fn new(name: AudienceName, state: AudienceState) -> Self {
        Self { name, state }
    }
}

impl TryFrom<BTreeMap<AudienceName, AudienceState>> for AudienceDocument {
    type Error = String;

    fn try_from(map: BTreeMap<AudienceName, AudienceState>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "expected exactly one audience per document, found {}",
                map.len()
            ));
        }
        let (name, state) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty state document".to_string())?;
        Ok(Self { name, state })
    }
}

impl From<AudienceDocument> for BTreeMap<AudienceName, AudienceState> {
    fn from(document: AudienceDocument) -> Self {
        BTreeMap::from([(document.name, document.state)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_defaults() {
        let document: AudienceDocument =
            serde_yaml::from_str("Sample:\n  source:\n    endpoint: https://example.com\n")
                .unwrap();
        assert_eq!(document.name.as_str(), "Sample");
        assert_eq!(document.state.description, "");
        assert!(document.state.source.params.is_empty());
        assert_eq!(document.state.source.last_response, LastResponse::default());
        assert!(document.state.adtech_a.is_none());
        assert!(document.state.adtech_b.is_none());
    }

    #[test]
    fn test_document_requires_single_audience() {
        let yaml = "A:\n  source: {endpoint: x}\nB:\n  source: {endpoint: y}\n";
        assert!(serde_yaml::from_str::<AudienceDocument>(yaml).is_err());
        assert!(serde_yaml::from_str::<AudienceDocument>("{}").is_err());
    }

    #[test]
    fn test_unconfigured_destinations_not_written() {
        let document = AudienceDocument::new(
            AudienceName::new("Sample").unwrap(),
            AudienceState::default(),
        );
        let yaml = serde_yaml::to_string(&document).unwrap();
        assert!(!yaml.contains("adtechA"));
        assert!(!yaml.contains("adtechB"));
    }

    #[test]
    fn test_destination_keys_use_camel_case() {
        let yaml = r#"
Sample:
  source: {endpoint: x}
  adtechA: {name: Sample, id: null, audience_type: TYPE_X}
  adtechB: {name: Sample, id: "0987654321", expiration_time: 30}
"#;
        let document: AudienceDocument = serde_yaml::from_str(yaml).unwrap();
        let a = document.state.adtech_a.unwrap();
        let b = document.state.adtech_b.unwrap();
        assert_eq!(a.audience_type.as_deref(), Some("TYPE_X"));
        assert_eq!(a.id, None);
        assert_eq!(b.id.as_deref(), Some("0987654321"));
        assert_eq!(b.expiration_time, Some(IntegerSetting::Number(30)));
    }

    #[test]
    fn test_numeric_id_decodes_as_text() {
        let yaml = "Sample:\n  source: {endpoint: x}\n  adtechA: {id: 123456789, audience_type: TYPE_X}\n";
        let document: AudienceDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(document.state.adtech_a.unwrap().id.as_deref(), Some("123456789"));
    }

    #[test]
    fn test_quoted_expiration_decodes() {
        let yaml = "Sample:\n  source:\n    endpoint: https://x\n  adtechB:\n    expiration_time: '30'\n";
        let document: AudienceDocument = serde_yaml::from_str(yaml).unwrap();
        let setting = document.state.adtech_b.unwrap().expiration_time.unwrap();
        assert_eq!(setting, IntegerSetting::Text("30".to_string()));
        assert_eq!(setting.to_i64(), Ok(30));
    }

    #[test]
    fn test_integer_setting_parsing() {
        assert_eq!(IntegerSetting::Number(-4).to_i64(), Ok(-4));
        assert_eq!(IntegerSetting::Text(" 540 ".to_string()).to_i64(), Ok(540));
        assert!(IntegerSetting::Text("abc".to_string()).to_i64().is_err());
    }

    #[test]
    fn test_integer_setting_serializes_as_number() {
        let yaml = serde_yaml::to_string(&IntegerSetting::from(1000)).unwrap();
        assert_eq!(yaml.trim(), "1000");
    }
}
