//! Integration tests for member normalization and pseudonymization

use dmp_sync::adapters::encoding::encode_rows;
use dmp_sync::core::members::{MemberSet, RawMemberRow};
use dmp_sync::core::normalize::{digest, is_digest, FieldKind, RawValue};
use fake::faker::address::en::ZipCode;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use test_case::test_case;

#[test_case("alice@example.com" ; "already canonical")]
#[test_case("  alice@example.com  " ; "surrounding whitespace")]
#[test_case("Alice@Example.COM" ; "mixed case")]
#[test_case(" ALICE@EXAMPLE.COM|" ; "trailing delimiter")]
fn test_email_variants_share_digest(raw: &str) {
    assert_eq!(
        FieldKind::Email.normalize(&RawValue::from(raw)),
        vec![digest("alice@example.com")]
    );
}

#[test_case("+16502530000" ; "e164")]
#[test_case("+1 650-253-0000" ; "dashes")]
#[test_case("+1 (650) 253-0000" ; "parentheses")]
#[test_case(" +1 650 253 0000 " ; "spaces")]
fn test_phone_variants_share_digest(raw: &str) {
    assert_eq!(
        FieldKind::Phone.normalize(&RawValue::from(raw)),
        vec![digest("+16502530000")]
    );
}

#[test_case("" ; "empty")]
#[test_case("12345" ; "too short")]
#[test_case("call me" ; "not a number")]
fn test_unusable_phones_dropped(raw: &str) {
    assert!(FieldKind::Phone.normalize(&RawValue::from(raw)).is_empty());
}

#[test]
fn test_normalization_is_idempotent() {
    for _ in 0..25 {
        let email: String = SafeEmail().fake();
        let zip: String = ZipCode().fake();

        for (kind, raw) in [(FieldKind::Email, email), (FieldKind::Zip, zip)] {
            let once = kind.normalize(&RawValue::from(raw.as_str()));
            assert_eq!(once.len(), 1, "{raw} normalized to nothing");
            assert!(is_digest(&once[0]));

            let twice = kind.normalize(&RawValue::Text(once.join("|")));
            assert_eq!(twice, once);
        }
    }
}

#[test]
fn test_duplicates_collapse_in_first_occurrence_order() {
    let cell = RawValue::List(vec![
        RawValue::from("b@example.com|A@example.com"),
        RawValue::from("a@example.com"),
        RawValue::from("B@EXAMPLE.COM"),
    ]);
    assert_eq!(
        FieldKind::Email.normalize(&cell),
        vec![digest("b@example.com"), digest("a@example.com")]
    );
}

#[test]
fn test_member_set_keeps_every_row() {
    let emails: Vec<String> = (0..10).map(|_| SafeEmail().fake()).collect();
    let mut rows: Vec<RawMemberRow> = emails
        .iter()
        .map(|email| RawMemberRow {
            email: RawValue::from(email.as_str()),
            ..Default::default()
        })
        .collect();
    // A row with nothing usable still counts as a member
    rows.push(RawMemberRow {
        phone_number: RawValue::from("not a phone"),
        ..Default::default()
    });

    let members = MemberSet::decode(&encode_rows(&rows).unwrap()).unwrap();

    assert_eq!(members.len(), 11);
    for (record, email) in members.iter().zip(&emails) {
        assert_eq!(record.emails(), &[digest(&email.to_lowercase())]);
    }
    assert!(members.iter().last().unwrap().is_empty());
}

#[test]
fn test_numeric_zip_matches_text_zip() {
    assert_eq!(
        FieldKind::Zip.normalize(&RawValue::Integer(94105)),
        FieldKind::Zip.normalize(&RawValue::from("94105"))
    );
    assert_eq!(
        FieldKind::Zip.normalize(&RawValue::Float(94105.0)),
        vec![digest("94105")]
    );
}
