//! Member data blob codec
//!
//! A member blob is a gzip-compressed JSON object of equal-length columns:
//!
//! ```json
//! {"email": ["a@x.com", null], "phone_number": ["+16502530000", null], "zip_code": [94105, "10001"]}
//! ```
//!
//! A column that is absent entirely is read as all-null.

use crate::core::members::RawMemberRow;
use crate::core::normalize::RawValue;
use crate::domain::EncodingError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemberColumns {
    #[serde(default)]
    email: Vec<RawValue>,

    #[serde(default)]
    phone_number: Vec<RawValue>,

    #[serde(default)]
    zip_code: Vec<RawValue>,
}

/// Decodes a member blob into raw rows
///
/// An empty blob decodes to no rows.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<RawMemberRow>, EncodingError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| EncodingError::MemberDecode(format!("gzip: {e}")))?;

    let columns: MemberColumns = serde_json::from_slice(&json)
        .map_err(|e| EncodingError::MemberDecode(format!("json: {e}")))?;

    let row_count = columns
        .email
        .len()
        .max(columns.phone_number.len())
        .max(columns.zip_code.len());

    for (name, column) in [
        ("email", &columns.email),
        ("phone_number", &columns.phone_number),
        ("zip_code", &columns.zip_code),
    ] {
        if !column.is_empty() && column.len() != row_count {
            return Err(EncodingError::MemberDecode(format!(
                "column '{name}' has {} values, expected {row_count}",
                column.len()
            )));
        }
    }

    let mut emails = columns.email.into_iter();
    let mut phones = columns.phone_number.into_iter();
    let mut zips = columns.zip_code.into_iter();

    Ok((0..row_count)
        .map(|_| RawMemberRow {
            email: emails.next().unwrap_or_default(),
            phone_number: phones.next().unwrap_or_default(),
            zip_code: zips.next().unwrap_or_default(),
        })
        .collect())
}

/// Encodes raw rows into a member blob
pub fn encode_rows(rows: &[RawMemberRow]) -> Result<Vec<u8>, EncodingError> {
    let columns = MemberColumns {
        email: rows.iter().map(|row| row.email.clone()).collect(),
        phone_number: rows.iter().map(|row| row.phone_number.clone()).collect(),
        zip_code: rows.iter().map(|row| row.zip_code.clone()).collect(),
    };

    let json = serde_json::to_vec(&columns)
        .map_err(|e| EncodingError::MemberEncode(format!("json: {e}")))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| EncodingError::MemberEncode(format!("gzip: {e}")))?;
    encoder
        .finish()
        .map_err(|e| EncodingError::MemberEncode(format!("gzip: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gzip(json: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_columns_into_rows() {
        let blob = gzip(
            r#"{"email": ["a@x.com", null], "phone_number": ["+16502530000", ""], "zip_code": [94105, "10001"]}"#,
        );
        let rows = decode_rows(&blob).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email, RawValue::from("a@x.com"));
        assert_eq!(rows[0].zip_code, RawValue::Integer(94105));
        assert_eq!(rows[1].email, RawValue::Null);
    }

    #[test]
    fn test_boolean_cell_decodes_and_is_dropped() {
        let blob = gzip(
            r#"{"email": ["a@x.com", true], "phone_number": [false, null], "zip_code": ["94105", [true, "10001"]]}"#,
        );
        let rows = decode_rows(&blob).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].email, RawValue::Bool(true));
        assert!(rows[1].email.split_values().is_empty());
        assert!(rows[0].phone_number.split_values().is_empty());
        assert_eq!(rows[1].zip_code.split_values(), vec!["10001"]);
    }

    #[test]
    fn test_missing_column_reads_as_null() {
        let blob = gzip(r#"{"email": ["a@x.com", "b@x.com"]}"#);
        let rows = decode_rows(&blob).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.zip_code == RawValue::Null));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let blob = gzip(r#"{"email": ["a@x.com", "b@x.com"], "zip_code": ["94105"]}"#);
        let err = decode_rows(&blob).unwrap_err();
        assert!(err.to_string().contains("zip_code"));
    }

    #[test]
    fn test_not_gzip_rejected() {
        let err = decode_rows(b"{\"email\": []}").unwrap_err();
        assert!(matches!(err, EncodingError::MemberDecode(_)));
    }

    #[test]
    fn test_encode_then_decode() {
        let rows = vec![RawMemberRow {
            email: RawValue::from("a@x.com|b@x.com"),
            phone_number: RawValue::Null,
            zip_code: RawValue::Integer(94105),
        }];
        let decoded = decode_rows(&encode_rows(&rows).unwrap()).unwrap();
        assert_eq!(decoded, rows);
    }
}
