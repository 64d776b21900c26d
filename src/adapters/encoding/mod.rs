//! Byte encodings for persisted blobs
//!
//! - [`state`] - YAML audience state documents
//! - [`members`] - gzip-compressed columnar JSON member data

pub mod members;
pub mod state;

pub use members::{decode_rows, encode_rows};
pub use state::{decode_state, encode_state};
