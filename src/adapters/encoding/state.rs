//! YAML codec for audience state documents

use crate::core::audience::state::AudienceDocument;
use crate::domain::EncodingError;

/// Decodes a state document
pub fn decode_state(bytes: &[u8]) -> Result<AudienceDocument, EncodingError> {
    serde_yaml::from_slice(bytes).map_err(|e| EncodingError::StateDecode(e.to_string()))
}

/// Encodes a state document
pub fn encode_state(document: &AudienceDocument) -> Result<Vec<u8>, EncodingError> {
    serde_yaml::to_string(document)
        .map(String::into_bytes)
        .map_err(|e| EncodingError::StateEncode(e.to_string()))
}
