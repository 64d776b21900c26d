//! adtechA destination
//!
//! Payload:
//!
//! ```json
//! {"name": "...", "description": "...", "type": "TYPE_X",
//!  "data": [{"emails": [...], "phoneNumbers": [...], "zipCodes": [...]}]}
//! ```

use super::{Destination, DestinationCore, DestinationState};
use crate::core::audience::state::AdtechAState;
use crate::core::members::MemberSet;
use crate::domain::{DestinationError, DestinationKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Audience categories accepted by adtechA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudienceType {
    #[serde(rename = "TYPE_X")]
    TypeX,
}

impl AudienceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceType::TypeX => "TYPE_X",
        }
    }
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudienceType {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TYPE_X" => Ok(AudienceType::TypeX),
            other => Err(format!("unknown audience type '{other}', expected one of: TYPE_X")),
        }
    }
}

/// adtechA adapter
#[derive(Debug, Clone)]
pub struct AdtechA {
    core: DestinationCore,
    audience_type: AudienceType,
}

impl AdtechA {
    /// Builds the adapter from its persisted record
    ///
    /// The adapter is always named after the audience; a `name` in the
    /// record is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::InvalidConfig`] if `audience_type` is
    /// missing or unknown.
    pub fn new(
        audience_name: &str,
        description: &str,
        state: &AdtechAState,
        record_count: usize,
    ) -> Result<Self, DestinationError> {
        let invalid = |reason: String| DestinationError::InvalidConfig {
            kind: DestinationKind::AdtechA,
            field: "audience_type".to_string(),
            reason,
        };

        let audience_type = state
            .audience_type
            .as_deref()
            .ok_or_else(|| invalid("missing".to_string()))?
            .parse::<AudienceType>()
            .map_err(invalid)?;

        Ok(Self {
            core: DestinationCore::new(
                DestinationKind::AdtechA,
                audience_name,
                description,
                state.id.clone(),
                state.last_response.clone(),
                record_count,
            ),
            audience_type,
        })
    }

    pub fn audience_type(&self) -> AudienceType {
        self.audience_type
    }
}

impl Destination for AdtechA {
    fn core(&self) -> &DestinationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DestinationCore {
        &mut self.core
    }

    fn settings_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("type".to_string(), json!(self.audience_type.as_str()));
        fields
    }

    fn member_fields(&self, members: &MemberSet) -> Map<String, Value> {
        let data: Vec<Value> = members
            .iter()
            .map(|record| {
                json!({
                    "emails": record.emails(),
                    "phoneNumbers": record.phone_numbers(),
                    "zipCodes": record.zip_codes(),
                })
            })
            .collect();

        let mut fields = Map::new();
        fields.insert("data".to_string(), Value::Array(data));
        fields
    }

    fn snapshot(&self) -> DestinationState {
        DestinationState::AdtechA(AdtechAState {
            name: Some(self.core.name().to_string()),
            id: self.core.snapshot_id(),
            audience_type: Some(self.audience_type.as_str().to_string()),
            last_response: self.core.last_response().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::destination::SyncStatus;
    use crate::core::members::RawMemberRow;
    use crate::core::normalize::{digest, RawValue};
    use crate::domain::LastResponse;

    fn state(audience_type: Option<&str>) -> AdtechAState {
        AdtechAState {
            name: None,
            id: None,
            audience_type: audience_type.map(str::to_string),
            last_response: LastResponse::default(),
        }
    }

    #[test]
    fn test_audience_type_parsing() {
        assert_eq!("type_x".parse::<AudienceType>().unwrap(), AudienceType::TypeX);
        assert!("TYPE_Y".parse::<AudienceType>().is_err());
    }

    #[test]
    fn test_missing_audience_type_rejected() {
        let err = AdtechA::new("Sample", "", &state(None), 1).unwrap_err();
        match err {
            DestinationError::InvalidConfig { kind, field, .. } => {
                assert_eq!(kind, DestinationKind::AdtechA);
                assert_eq!(field, "audience_type");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_audience_type_rejected() {
        assert!(AdtechA::new("Sample", "", &state(Some("TYPE_Q")), 1).is_err());
    }

    #[test]
    fn test_payload_shape() {
        let members = MemberSet::from_rows(vec![
            RawMemberRow {
                email: RawValue::from("a@x.com"),
                phone_number: RawValue::Null,
                zip_code: RawValue::from("94105"),
            },
            RawMemberRow {
                email: RawValue::from("b@x.com"),
                ..Default::default()
            },
        ]);
        let destination = AdtechA::new("Sample", "", &state(Some("TYPE_X")), members.len()).unwrap();
        assert_eq!(destination.status(), SyncStatus::NotPosted);

        let payload = destination.build_payload(&members);
        assert_eq!(
            payload,
            json!({
                "name": "Sample",
                "type": "TYPE_X",
                "data": [
                    {"emails": [digest("a@x.com")], "zipCodes": [digest("94105")]},
                    {"emails": [digest("b@x.com")]}
                ]
            })
        );
    }

    #[test]
    fn test_persisted_name_does_not_override_audience_name() {
        let record: AdtechAState =
            serde_yaml::from_str("name: OldName\naudience_type: TYPE_X").unwrap();
        let members = MemberSet::from_rows(vec![RawMemberRow {
            email: RawValue::from("a@x.com"),
            ..Default::default()
        }]);
        let destination = AdtechA::new("Sample", "", &record, members.len()).unwrap();

        assert_eq!(destination.build_payload(&members)["name"], "Sample");
        let DestinationState::AdtechA(snapshot) = destination.snapshot() else {
            panic!("wrong destination kind");
        };
        assert_eq!(snapshot.name.as_deref(), Some("Sample"));
    }

    #[test]
    fn test_snapshot_normalizes_config() {
        let destination = AdtechA::new("Sample", "", &state(Some("type_x")), 0).unwrap();
        let DestinationState::AdtechA(snapshot) = destination.snapshot() else {
            panic!("wrong destination kind");
        };
        assert_eq!(snapshot.name.as_deref(), Some("Sample"));
        assert_eq!(snapshot.audience_type.as_deref(), Some("TYPE_X"));
        assert_eq!(snapshot.id, None);
    }
}
