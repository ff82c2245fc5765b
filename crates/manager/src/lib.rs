// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wsman-manager: workspace status, port control and start requests on
//! top of the cluster state cache

pub mod config;
mod deadline;
pub mod env;
mod error;
pub mod locate;
mod locks;
mod manager;
mod notify;
mod ports;
pub mod start;
pub mod status;
pub mod template;
pub mod validate;

pub use config::{Config, ConfigError};
pub use error::ManagerError;
pub use locate::{find_workspace_pod, select_unit};
pub use locks::WorkspaceLocks;
pub use manager::Manager;
pub use notify::{StatusBroadcaster, StatusSubscription};
pub use ports::PortController;
pub use start::{DefinitePodBuilder, StartContext, StartContextBuilder};
pub use status::{compute_status, get_workspaces, PortUrls};
pub use template::{TemplateError, UrlTemplate};
pub use validate::validate_start_request;
