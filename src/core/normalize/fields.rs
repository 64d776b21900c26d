//! Per-field canonicalization of raw member cells

use super::digest::{digest, is_digest};
use phonenumber::Mode;
use serde::{Deserialize, Serialize};

/// Separator for multiple values packed into one scalar cell
pub const VALUE_DELIMITER: char = '|';

/// A raw cell from a decoded member data blob
///
/// Cells arrive as whatever the upstream export produced: text, numbers
/// (zip codes are frequently numeric), nulls, or lists of those. Booleans
/// are accepted so one stray flag does not reject the blob, but carry no
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Flattens the cell into individual string values, splitting scalars on `|`
    ///
    /// # Examples
    ///
    /// ```
    /// use dmp_sync::core::normalize::RawValue;
    ///
    /// let cell = RawValue::Text("a@x.com|b@x.com".to_string());
    /// assert_eq!(cell.split_values(), vec!["a@x.com", "b@x.com"]);
    /// assert!(RawValue::Null.split_values().is_empty());
    /// ```
    pub fn split_values(&self) -> Vec<String> {
        let mut values = Vec::new();
        self.collect_into(&mut values);
        values
    }

    fn collect_into(&self, values: &mut Vec<String>) {
        match self {
            RawValue::Null | RawValue::Bool(_) => {}
            RawValue::Integer(value) => values.push(value.to_string()),
            RawValue::Float(value) => values.push(render_float(*value)),
            RawValue::Text(text) => {
                values.extend(text.split(VALUE_DELIMITER).map(str::to_string));
            }
            RawValue::List(items) => {
                for item in items {
                    item.collect_into(values);
                }
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Numeric exports render whole numbers with a trailing `.0`
fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Identifying member fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Phone,
    Zip,
}

impl FieldKind {
    /// Canonicalizes one value before digesting
    ///
    /// Returns `None` when the value cannot be used (blank, or an invalid phone
    /// number). Digest-shaped values are returned untouched.
    pub fn canonicalize(&self, value: &str) -> Option<String> {
        if is_digest(value) {
            return Some(value.to_string());
        }

        let canonical = match self {
            FieldKind::Email => normalize_email(value),
            FieldKind::Phone => normalize_phone(value)?,
            FieldKind::Zip => value.to_string(),
        };

        if canonical.trim().is_empty() {
            None
        } else {
            Some(canonical)
        }
    }

    /// Normalizes a raw cell into a deduplicated sequence of digests
    ///
    /// The order of first occurrence is kept.
    pub fn normalize(&self, raw: &RawValue) -> Vec<String> {
        let mut digests: Vec<String> = Vec::new();
        for value in raw.split_values() {
            let Some(canonical) = self.canonicalize(&value) else {
                continue;
            };
            let digested = digest(&canonical);
            if !digests.contains(&digested) {
                digests.push(digested);
            }
        }
        digests
    }
}

/// Trims and lowercases an email address
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Parses an international phone number and formats it as E.164
///
/// Returns `None` for unparseable or invalid numbers.
///
/// # Examples
///
/// ```
/// use dmp_sync::core::normalize::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 650-253-0000").as_deref(), Some("+16502530000"));
/// assert_eq!(normalize_phone("not a phone"), None);
/// ```
pub fn normalize_phone(value: &str) -> Option<String> {
    let number = phonenumber::parse(None, value.trim()).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}
