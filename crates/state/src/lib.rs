// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wsman-state: in-memory mirror of the cluster objects backing workspaces

mod backoff;
mod cache;
mod handler;
mod index;
mod reflector;

pub use backoff::Backoff;
pub use cache::{CacheConfig, CacheError, CacheSnapshot, ClusterStateCache};
pub use handler::{HandlerFns, ResourceEventHandler};
pub use index::{CachedObject, Delta, KindIndex};
