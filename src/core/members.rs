//! Normalized audience members
//!
//! A [`MemberSet`] is decoded once per audience from the raw data blob and is
//! never mutated afterwards. Its length drives every destination's status.

use crate::adapters::encoding::members::decode_rows;
use crate::core::normalize::{FieldKind, RawValue};
use crate::domain::EncodingError;
use serde::{Deserialize, Serialize};

/// One undecoded row of member data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMemberRow {
    #[serde(default)]
    pub email: RawValue,

    #[serde(default)]
    pub phone_number: RawValue,

    #[serde(default)]
    pub zip_code: RawValue,
}

/// A normalized member
///
/// Every field is an ordered, deduplicated sequence of lowercase SHA-256 hex
/// digests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRecord {
    emails: Vec<String>,
    phone_numbers: Vec<String>,
    zip_codes: Vec<String>,
}

impl MemberRecord {
    /// Normalizes a raw row
    pub fn from_row(row: &RawMemberRow) -> Self {
        Self {
            emails: FieldKind::Email.normalize(&row.email),
            phone_numbers: FieldKind::Phone.normalize(&row.phone_number),
            zip_codes: FieldKind::Zip.normalize(&row.zip_code),
        }
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    pub fn zip_codes(&self) -> &[String] {
        &self.zip_codes
    }

    /// Returns true if no field produced a usable digest
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phone_numbers.is_empty() && self.zip_codes.is_empty()
    }
}

/// Ordered collection of normalized members for one audience
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSet {
    records: Vec<MemberRecord>,
}

impl MemberSet {
    /// Builds a member set from raw rows, preserving row order
    ///
    /// Rows are kept even when every field normalizes to nothing, so the
    /// record count always matches the source row count.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawMemberRow>,
    {
        Self {
            records: rows.into_iter().map(|row| MemberRecord::from_row(&row)).collect(),
        }
    }

    /// Decodes and normalizes a raw member data blob
    ///
    /// An empty blob decodes to an empty set.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        Ok(Self::from_rows(decode_rows(bytes)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MemberRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a MemberRecord;
    type IntoIter = std::slice::Iter<'a, MemberRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::digest;

    fn row(email: &str, phone: &str, zip: &str) -> RawMemberRow {
        RawMemberRow {
            email: RawValue::from(email),
            phone_number: RawValue::from(phone),
            zip_code: RawValue::from(zip),
        }
    }

    #[test]
    fn test_record_normalizes_every_field() {
        let record = MemberRecord::from_row(&row("A@x.com", "+1 650-253-0000", "94105"));
        assert_eq!(record.emails(), [digest("a@x.com")]);
        assert_eq!(record.phone_numbers(), [digest("+16502530000")]);
        assert_eq!(record.zip_codes(), [digest("94105")]);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_renormalizing_is_idempotent() {
        let first = MemberRecord::from_row(&row("a@x.com|b@x.com", "+1 650-253-0000", "94105"));
        let again = MemberRecord::from_row(&RawMemberRow {
            email: RawValue::List(first.emails().iter().map(|d| RawValue::from(d.as_str())).collect()),
            phone_number: RawValue::List(
                first
                    .phone_numbers()
                    .iter()
                    .map(|d| RawValue::from(d.as_str()))
                    .collect(),
            ),
            zip_code: RawValue::List(first.zip_codes().iter().map(|d| RawValue::from(d.as_str())).collect()),
        });
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_rows_are_counted() {
        let set = MemberSet::from_rows(vec![RawMemberRow::default(), row("a@x.com", "", "")]);
        assert_eq!(set.len(), 2);
        assert!(set.iter().next().is_some_and(MemberRecord::is_empty));
    }

    #[test]
    fn test_decode_empty_blob() {
        let set = MemberSet::decode(&[]).unwrap();
        assert!(set.is_empty());
    }
}
