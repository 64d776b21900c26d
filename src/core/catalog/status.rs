//! Audience status reports

use crate::core::destination::SyncStatus;
use crate::domain::ids::{AudienceName, DestinationKind};
use crate::domain::LastResponse;

/// Where an audience stands, as read from storage
#[derive(Debug, Clone, PartialEq)]
pub struct AudienceStatus {
    pub name: AudienceName,

    /// False when the audience only exists as a configured seed
    pub persisted: bool,

    /// Member records in the stored data blob, zero when there is none
    pub records: usize,

    pub source: LastResponse,

    pub destinations: Vec<DestinationStatus>,

    /// Why the audience could not be evaluated
    pub error: Option<String>,
}

impl AudienceStatus {
    pub(crate) fn unreadable(name: AudienceName, persisted: bool, error: String) -> Self {
        Self {
            name,
            persisted,
            records: 0,
            source: LastResponse::default(),
            destinations: Vec::new(),
            error: Some(error),
        }
    }

    /// True once every configured destination holds an id
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
            && !self.destinations.is_empty()
            && self
                .destinations
                .iter()
                .all(|d| d.status == SyncStatus::Posted)
    }
}

/// Status of one destination of an audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationStatus {
    pub kind: DestinationKind,
    pub status: SyncStatus,
    pub id: Option<String>,
    pub last_response: LastResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(status: SyncStatus) -> DestinationStatus {
        DestinationStatus {
            kind: DestinationKind::AdtechA,
            status,
            id: None,
            last_response: LastResponse::default(),
        }
    }

    #[test]
    fn test_is_complete() {
        let mut status = AudienceStatus {
            name: AudienceName::new("Sample").unwrap(),
            persisted: true,
            records: 2,
            source: LastResponse::default(),
            destinations: vec![destination(SyncStatus::Posted)],
            error: None,
        };
        assert!(status.is_complete());

        status.destinations.push(destination(SyncStatus::NotPosted));
        assert!(!status.is_complete());

        status.destinations.clear();
        assert!(!status.is_complete());
    }

    #[test]
    fn test_unreadable_is_never_complete() {
        let status = AudienceStatus::unreadable(
            AudienceName::new("Sample").unwrap(),
            true,
            "broken".to_string(),
        );
        assert!(!status.is_complete());
        assert_eq!(status.error.as_deref(), Some("broken"));
    }
}
