//! Last-response records
//!
//! Both the data source and every destination remember the outcome of their
//! most recent remote call. The record is persisted verbatim in the state
//! document, with the date in compact `YYYYMMDD` form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of the most recent remote call
///
/// All fields are optional: a destination that never uploaded carries an
/// all-null record, and a transport failure carries a date and a message but
/// no status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastResponse {
    #[serde(default, with = "compact_date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,
}

impl LastResponse {
    /// Creates a record for a received response
    pub fn received(date: NaiveDate, status: u16, message: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            status: Some(status),
            message: Some(message.into()),
        }
    }

    /// Creates a record for a call that produced no response
    pub fn failed(date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            status: None,
            message: Some(message.into()),
        }
    }

    /// Returns true if a 2xx status was recorded
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(is_success_status)
    }
}

/// Returns true for 2xx HTTP status codes
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

mod compact_date {
    use chrono::NaiveDate;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    const FORMAT: &str = "%Y%m%d";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Option::<RawDate>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(RawDate::Number(value)) => value.to_string(),
            Some(RawDate::Text(value)) => value,
        };

        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(text, FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid date '{text}': {e}")))
    }
}
