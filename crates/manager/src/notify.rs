// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status change subscriptions.
//!
//! Publishing never blocks: the channel is bounded and a subscriber that
//! falls behind loses its oldest pending updates. The loss is counted and
//! logged when the subscriber next receives.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use wsman_core::WorkspaceStatus;

#[derive(Clone)]
pub struct StatusBroadcaster {
    tx: broadcast::Sender<WorkspaceStatus>,
}

impl StatusBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            rx: self.tx.subscribe(),
            missed: 0,
        }
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, status: WorkspaceStatus) -> usize {
        tracing::trace!(workspace_id = %status.id, phase = %status.phase, "status published");
        self.tx.send(status).unwrap_or(0)
    }
}

pub struct StatusSubscription {
    rx: broadcast::Receiver<WorkspaceStatus>,
    missed: u64,
}

impl StatusSubscription {
    /// Next status update; `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<WorkspaceStatus> {
        loop {
            match self.rx.recv().await {
                Ok(status) => return Some(status),
                Err(RecvError::Lagged(n)) => self.record_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published update, if any.
    pub fn try_recv(&mut self) -> Option<WorkspaceStatus> {
        loop {
            match self.rx.try_recv() {
                Ok(status) => return Some(status),
                Err(TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Updates dropped because this subscriber fell behind
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn record_lag(&mut self, n: u64) {
        self.missed += n;
        tracing::warn!(dropped = n, "status subscriber lagging, oldest updates dropped");
    }
}
