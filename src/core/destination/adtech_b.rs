//! adtechB destination
//!
//! Payload rows are positional and follow the declared schema:
//!
//! ```json
//! {"name": "...", "description": "...", "expiration": 1000,
//!  "schema": ["EMAIL", "PHONE", "ZIP"],
//!  "data": [[[email digests], [phone digests], [zip digests]]]}
//! ```

use super::{Destination, DestinationCore, DestinationState};
use crate::core::audience::state::{AdtechBState, IntegerSetting};
use crate::core::members::MemberSet;
use crate::domain::{DestinationError, DestinationKind};
use serde_json::{json, Map, Value};
use std::fmt;

/// Column order of adtechB rows
pub const SCHEMA: [&str; 3] = ["EMAIL", "PHONE", "ZIP"];

/// Audience lifetime on adtechB, in days
///
/// Valid values are `0..=540`, or `1000` meaning the audience never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationTime(u16);

impl ExpirationTime {
    /// Longest finite lifetime in days
    pub const MAX_DAYS: u16 = 540;

    /// Sentinel for no expiration
    pub const NEVER: ExpirationTime = ExpirationTime(1000);

    pub fn new(days: i64) -> Result<Self, String> {
        if days == i64::from(Self::NEVER.0) {
            return Ok(Self::NEVER);
        }
        match u16::try_from(days) {
            Ok(days) if days <= Self::MAX_DAYS => Ok(Self(days)),
            _ => Err(format!(
                "{days} is out of range, expected 0..={} or {}",
                Self::MAX_DAYS,
                Self::NEVER.0
            )),
        }
    }

    pub fn days(&self) -> u16 {
        self.0
    }

    pub fn is_never(&self) -> bool {
        *self == Self::NEVER
    }
}

impl Default for ExpirationTime {
    fn default() -> Self {
        Self::NEVER
    }
}

impl fmt::Display for ExpirationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// adtechB adapter
#[derive(Debug, Clone)]
pub struct AdtechB {
    core: DestinationCore,
    expiration_time: ExpirationTime,
}

impl AdtechB {
    /// Builds the adapter from its persisted record
    ///
    /// A missing `expiration_time` defaults to [`ExpirationTime::NEVER`]; a
    /// quoted number is accepted. The adapter is always named after the
    /// audience.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::InvalidConfig`] if `expiration_time` is not
    /// an integer or is out of range.
    pub fn new(
        audience_name: &str,
        description: &str,
        state: &AdtechBState,
        record_count: usize,
    ) -> Result<Self, DestinationError> {
        let expiration_time = match &state.expiration_time {
            Some(setting) => setting
                .to_i64()
                .and_then(ExpirationTime::new)
                .map_err(|reason| DestinationError::InvalidConfig {
                    kind: DestinationKind::AdtechB,
                    field: "expiration_time".to_string(),
                    reason,
                })?,
            None => ExpirationTime::default(),
        };

        Ok(Self {
            core: DestinationCore::new(
                DestinationKind::AdtechB,
                audience_name,
                description,
                state.id.clone(),
                state.last_response.clone(),
                record_count,
            ),
            expiration_time,
        })
    }

    pub fn expiration_time(&self) -> ExpirationTime {
        self.expiration_time
    }
}

impl Destination for AdtechB {
    fn core(&self) -> &DestinationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DestinationCore {
        &mut self.core
    }

    fn settings_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("expiration".to_string(), json!(self.expiration_time.days()));
        fields
    }

    fn member_fields(&self, members: &MemberSet) -> Map<String, Value> {
        let data: Vec<Value> = members
            .iter()
            .map(|record| json!([record.emails(), record.phone_numbers(), record.zip_codes()]))
            .collect();

        let mut fields = Map::new();
        fields.insert("schema".to_string(), json!(SCHEMA));
        fields.insert("data".to_string(), Value::Array(data));
        fields
    }

    fn snapshot(&self) -> DestinationState {
        DestinationState::AdtechB(AdtechBState {
            name: Some(self.core.name().to_string()),
            id: self.core.snapshot_id(),
            expiration_time: Some(IntegerSetting::from(i64::from(self.expiration_time.days()))),
            last_response: self.core.last_response().clone(),
        })
    }
}
