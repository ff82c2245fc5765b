// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlines for blocking steps of an operation.

use crate::error::ManagerError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline `timeout` from now
pub fn deadline_in(timeout: Duration) -> Instant {
    Instant::now() + timeout
}

/// Time left until `deadline`, zero once it has passed
pub fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Run one step of an operation, failing with `Timeout` at the deadline.
pub async fn within<F: Future>(
    deadline: Instant,
    what: &str,
    fut: F,
) -> Result<F::Output, ManagerError> {
    tokio::time::timeout_at(deadline, fut)
        .await
        .map_err(|_| ManagerError::Timeout(format!("{what} did not finish before the deadline")))
}
