//! # Network Monitor
//!
//! Decides whether the task server is reachable right now.
//!
//! ## Features
//!
//! - **Connectivity Detection**: `GET /tasks` answered with 2xx means online
//! - **Last-known Status**: connected flag plus the time of the last check
//! - **Live Updates**: `watch` subscription for a connectivity indicator
//!
//! Probing never fails; every transport error reads as offline. Overlapping
//! probes run independently and the most recent answer overwrites the status.

use crate::client::api::TaskServer;
use crate::shared::task::get_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Last observed server reachability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the last probe reached the server
    pub is_connected: bool,
    /// RFC3339 time of the last probe, `None` before the first one
    pub last_checked: Option<String>,
}

/// Periodic reachability check shared by the synchronizer and the
/// reconciliation engine
pub struct ConnectivityProber {
    server: Arc<dyn TaskServer>,
    status: watch::Sender<ConnectionStatus>,
}

impl std::fmt::Debug for ConnectivityProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityProber")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl ConnectivityProber {
    /// Create a prober; the status reads as offline until the first probe
    pub fn new(server: Arc<dyn TaskServer>) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self { server, status }
    }

    /// Check reachability now and record the answer
    pub async fn probe(&self) -> bool {
        let is_connected = self.server.ping().await;
        let previous = self.status.send_replace(ConnectionStatus {
            is_connected,
            last_checked: Some(get_timestamp()),
        });
        if previous.is_connected != is_connected {
            tracing::info!(
                "Task server is now {}",
                if is_connected { "reachable" } else { "unreachable" }
            );
        }
        is_connected
    }

    /// Result of the most recent probe
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.status.borrow().is_connected
    }

    /// Receive every status change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }
}
