// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy of the manager operations

use thiserror::Error;
use wsman_adapters::{AllocatorError, ClusterError};
use wsman_core::WorkspaceId;
use wsman_state::CacheError;

/// Errors returned by manager operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("{0} not found")]
    NotFound(String),
    /// More than one live compute unit claims the identity
    #[error("found {count} candidates for workspace {id}")]
    DuplicateIdentity { id: WorkspaceId, count: usize },
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("deadline exceeded: {0}")]
    Timeout(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl ManagerError {
    pub fn workspace_not_found(id: &WorkspaceId) -> Self {
        ManagerError::NotFound(format!("workspace {}", id))
    }

    /// Whether retrying the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ManagerError::Transient(_) | ManagerError::Timeout(_))
    }
}

impl From<ClusterError> for ManagerError {
    fn from(e: ClusterError) -> Self {
        ManagerError::Transient(e.to_string())
    }
}

impl From<AllocatorError> for ManagerError {
    fn from(e: AllocatorError) -> Self {
        match e {
            AllocatorError::Unsupported => ManagerError::Unsupported(e.to_string()),
            AllocatorError::Exhausted(_) | AllocatorError::Failed(_) => {
                ManagerError::ResourceExhausted(e.to_string())
            }
        }
    }
}

impl From<CacheError> for ManagerError {
    fn from(e: CacheError) -> Self {
        ManagerError::Timeout(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wsman_core::ObjectKind;
    use yare::parameterized;

    #[test]
    fn duplicate_identity_message_names_count_and_id() {
        let err = ManagerError::DuplicateIdentity {
            id: WorkspaceId::new("foobar"),
            count: 2,
        };
        assert_eq!(err.to_string(), "found 2 candidates for workspace foobar");
    }

    #[parameterized(
        transient = { ManagerError::Transient("x".into()), true },
        timeout = { ManagerError::Timeout("x".into()), true },
        not_found = { ManagerError::NotFound("x".into()), false },
        validation = { ManagerError::Validation("x".into()), false },
        exhausted = { ManagerError::ResourceExhausted("x".into()), false },
        unsupported = { ManagerError::Unsupported("x".into()), false },
    )]
    fn retryable(err: ManagerError, expected: bool) {
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn adapter_errors_map_into_taxonomy() {
        let conflict = ClusterError::Conflict {
            kind: ObjectKind::Service,
            name: "ws-x-ports".into(),
        };
        assert!(matches!(ManagerError::from(conflict), ManagerError::Transient(_)));
        assert!(matches!(
            ManagerError::from(AllocatorError::Exhausted("full".into())),
            ManagerError::ResourceExhausted(_)
        ));
        assert!(matches!(
            ManagerError::from(AllocatorError::Unsupported),
            ManagerError::Unsupported(_)
        ));
        assert!(matches!(
            ManagerError::from(CacheError::SyncTimeout(Duration::from_secs(1))),
            ManagerError::Timeout(_)
        ));
    }
}
