//! Domain identifier types with validation
//!
//! [`AudienceName`] is the sole join key between an audience's state document,
//! its member data blob and its destination payloads, so it must stay usable
//! as an object key segment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audience name newtype wrapper
///
/// # Examples
///
/// ```
/// use dmp_sync::domain::ids::AudienceName;
/// use std::str::FromStr;
///
/// let name = AudienceName::from_str("Sample").unwrap();
/// assert_eq!(name.as_str(), "Sample");
/// assert!(AudienceName::new("state/Sample").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AudienceName(String);

impl AudienceName {
    /// Creates a new AudienceName from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(AudienceName)` if the name is usable as a key segment,
    /// `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Audience name cannot be empty".to_string());
        }
        if name.trim() != name {
            return Err(format!(
                "Audience name '{name}' must not have leading or trailing whitespace"
            ));
        }
        if name.contains(['/', '\\']) {
            return Err(format!("Audience name '{name}' must not contain path separators"));
        }
        if name.starts_with('.') {
            return Err(format!("Audience name '{name}' must not start with '.'"));
        }
        Ok(Self(name))
    }

    /// Returns the audience name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AudienceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AudienceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AudienceName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AudienceName> for String {
    fn from(name: AudienceName) -> Self {
        name.0
    }
}

impl AsRef<str> for AudienceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Advertising destination kinds
///
/// The display form is the key used for the destination inside a persisted
/// state document (`adtechA`); the configuration form is the TOML table name
/// (`adtech_a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DestinationKind {
    #[serde(rename = "adtechA")]
    AdtechA,
    #[serde(rename = "adtechB")]
    AdtechB,
}

impl DestinationKind {
    /// All supported kinds, in evaluation order
    pub const ALL: [DestinationKind; 2] = [DestinationKind::AdtechA, DestinationKind::AdtechB];

    /// Key of this destination inside a state document
    pub fn state_key(&self) -> &'static str {
        match self {
            DestinationKind::AdtechA => "adtechA",
            DestinationKind::AdtechB => "adtechB",
        }
    }

    /// Name of this destination's configuration table
    pub fn config_key(&self) -> &'static str {
        match self {
            DestinationKind::AdtechA => "adtech_a",
            DestinationKind::AdtechB => "adtech_b",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state_key())
    }
}

impl FromStr for DestinationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DestinationKind::ALL
            .into_iter()
            .find(|kind| s == kind.state_key() || s == kind.config_key())
            .ok_or_else(|| format!("Unknown destination kind '{s}'"))
    }
}
