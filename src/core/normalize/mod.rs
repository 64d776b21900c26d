//! Field normalization and pseudonymization
//!
//! Raw member cells are split on `|`, canonicalized per field kind, and
//! digested with SHA-256. Every step tolerates input that has already been
//! through the pipeline, so normalizing a normalized record is a no-op.

pub mod digest;
pub mod fields;

pub use digest::{digest, is_digest};
pub use fields::{normalize_email, normalize_phone, FieldKind, RawValue, VALUE_DELIMITER};
