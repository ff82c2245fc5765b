// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the manager crate.

use std::path::PathBuf;
use std::time::Duration;

/// Config file location override
pub fn config_path() -> Option<PathBuf> {
    std::env::var("WSMAN_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Namespace override
pub fn namespace() -> Option<String> {
    std::env::var("WSMAN_NAMESPACE")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Operation timeout override
pub fn operation_timeout() -> Option<Duration> {
    std::env::var("WSMAN_OPERATION_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
