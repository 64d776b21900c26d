//! Per-destination sync status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upload eligibility of one destination for one audience
///
/// Derived once when the adapter is constructed and not changed during the
/// run, even after a successful upload. The next run derives `Posted` from
/// the persisted id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// No member records are available
    NotFetched,
    /// Members are available and the destination has no id yet
    NotPosted,
    /// The destination already holds this audience
    Posted,
}

impl SyncStatus {
    /// Derives the status from the persisted id and the member record count
    ///
    /// # Examples
    ///
    /// ```
    /// use dmp_sync::core::destination::SyncStatus;
    ///
    /// assert_eq!(SyncStatus::derive(Some("123"), 0), SyncStatus::Posted);
    /// assert_eq!(SyncStatus::derive(None, 2), SyncStatus::NotPosted);
    /// assert_eq!(SyncStatus::derive(None, 0), SyncStatus::NotFetched);
    /// ```
    pub fn derive(assigned_id: Option<&str>, record_count: usize) -> Self {
        match (assigned_id, record_count) {
            (Some(_), _) => SyncStatus::Posted,
            (None, 0) => SyncStatus::NotFetched,
            (None, _) => SyncStatus::NotPosted,
        }
    }

    /// Numeric code shown next to the status name by the `status` command
    pub fn code(&self) -> i8 {
        match self {
            SyncStatus::NotFetched => -1,
            SyncStatus::NotPosted => 0,
            SyncStatus::Posted => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::NotFetched => "NOT_FETCHED",
            SyncStatus::NotPosted => "NOT_POSTED",
            SyncStatus::Posted => "POSTED",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
