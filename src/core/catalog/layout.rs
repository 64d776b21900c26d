//! Object key layout
//!
//! ```text
//! <state_prefix>/<name>.yml        audience state document
//! <data_prefix>/<name>.json.gz     member data blob
//! ```

use crate::config::StorageConfig;
use crate::domain::ids::AudienceName;

const STATE_SUFFIX: &str = ".yml";
const DATA_SUFFIX: &str = ".json.gz";

/// Maps audience names to object keys and back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    state_prefix: String,
    data_prefix: String,
}

impl KeyLayout {
    pub fn new(state_prefix: impl AsRef<str>, data_prefix: impl AsRef<str>) -> Self {
        Self {
            state_prefix: state_prefix.as_ref().trim_matches('/').to_string(),
            data_prefix: data_prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.state_prefix, &config.data_prefix)
    }

    pub fn state_prefix(&self) -> &str {
        &self.state_prefix
    }

    pub fn state_key(&self, name: &AudienceName) -> String {
        format!("{}/{}{}", self.state_prefix, name, STATE_SUFFIX)
    }

    pub fn data_key(&self, name: &AudienceName) -> String {
        format!("{}/{}{}", self.data_prefix, name, DATA_SUFFIX)
    }

    /// Extracts the audience name from a state key
    ///
    /// Returns `None` for keys outside the state namespace or without the
    /// state suffix.
    pub fn name_from_state_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.state_prefix.as_str())?
            .strip_prefix('/')?
            .strip_suffix(STATE_SUFFIX)
            .filter(|name| !name.is_empty())
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("state", "data")
    }
}
