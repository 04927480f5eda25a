//! Station connection-state tracking.

use log::debug;
use std::sync::{PoisonError, RwLock};

use crate::Result;
use crate::api::models::ConnectionState;
use crate::core::daemon::StationDaemon;
use crate::types::constants::station_state;

/// Owns the connecting flag and the currently associated network.
///
/// Seeded once from the daemon at load; afterwards only the dispatcher
/// mutates it.
#[derive(Debug, Default)]
pub(crate) struct ConnectionStateTracker {
    state: RwLock<ConnectionState>,
}

impl ConnectionStateTracker {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reads `State` and `ConnectedNetwork` from the daemon.
    ///
    /// A `ConnectedNetwork` without a value seeds `None`.
    pub(crate) async fn load(daemon: &dyn StationDaemon) -> Result<Self> {
        let state = daemon.station_state().await?;
        let current_network_id = daemon.connected_network().await?;
        debug!("Initial station state: {state}, connected network: {current_network_id:?}");

        Ok(Self {
            state: RwLock::new(ConnectionState {
                current_network_id,
                is_connecting: state == station_state::CONNECTING,
            }),
        })
    }

    pub(crate) fn get(&self) -> ConnectionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_connecting(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_connecting
    }

    pub(crate) fn current_network_id(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_network_id
            .clone()
    }

    /// Applies a `State` change.
    ///
    /// `connecting` sets the flag. Any other value clears it only if it was
    /// set; otherwise nothing changes.
    pub(crate) fn apply_station_state(&self, value: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if value == station_state::CONNECTING {
            state.is_connecting = true;
        } else if state.is_connecting {
            state.is_connecting = false;
        }
    }

    pub(crate) fn set_current_network(&self, id: Option<String>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .current_network_id = id;
    }
}
