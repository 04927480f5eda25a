//! Routing of station notifications into the cache and the state tracker.
//!
//! [`EventDispatcher`] handles one notification at a time. State changes are
//! applied immediately; a finished scan yields a [`RefreshTicket`] and the
//! refresh itself runs as a separate task. Its result comes back through
//! [`EventDispatcher::complete_refresh`] on the same loop, so a swap never
//! interleaves with notification handling.

use futures::StreamExt;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::Result;
use crate::api::models::{IwdError, PropertyChange, ScanListener, StationNotification};
use crate::core::cache::{NetworkCache, NetworkSnapshot};
use crate::core::daemon::{NotificationStream, StationDaemon};
use crate::core::state::ConnectionStateTracker;
use crate::types::constants::{iwd, station_property};

/// Sequence number of an issued refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RefreshTicket(u64);

pub(crate) struct EventDispatcher {
    cache: Arc<NetworkCache>,
    tracker: Arc<ConnectionStateTracker>,
    issued: u64,
    applied: u64,
}

impl EventDispatcher {
    pub(crate) fn new(cache: Arc<NetworkCache>, tracker: Arc<ConnectionStateTracker>) -> Self {
        Self {
            cache,
            tracker,
            issued: 0,
            applied: 0,
        }
    }

    /// Handles one notification.
    ///
    /// Returns a ticket when the notification reports a finished scan and the
    /// cache must be refreshed.
    pub(crate) fn dispatch(&mut self, notification: &StationNotification) -> Option<RefreshTicket> {
        if notification.interface != iwd::STATION_INTERFACE {
            debug!("Ignoring property changes on {}", notification.interface);
            return None;
        }

        let mut scan_finished = false;
        for change in &notification.changed {
            debug!("Station property changed: {change}");
            match change {
                PropertyChange::Scanning(false) => scan_finished = true,
                PropertyChange::Scanning(true) => {}
                PropertyChange::State(value) => self.tracker.apply_station_state(value),
                PropertyChange::ConnectedNetwork(id) => {
                    self.tracker.set_current_network(Some(id.clone()))
                }
                PropertyChange::Unrecognized(_) => {}
            }
        }

        for name in &notification.invalidated {
            if name == station_property::CONNECTED_NETWORK {
                debug!("ConnectedNetwork invalidated");
                self.tracker.set_current_network(None);
            }
        }

        scan_finished.then(|| self.issue())
    }

    fn issue(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Applies the outcome of the refresh issued as `ticket`.
    ///
    /// Returns `true` if the snapshot was swapped in. Failed refreshes and
    /// refreshes overtaken by a newer applied one change nothing.
    pub(crate) fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<NetworkSnapshot>,
    ) -> bool {
        match outcome {
            Ok(snapshot) if ticket.0 > self.applied => {
                debug!(
                    "Applying refresh #{}: {} networks",
                    ticket.0,
                    snapshot.len()
                );
                self.applied = ticket.0;
                self.cache.replace(snapshot);
                true
            }
            Ok(_) => {
                debug!(
                    "Discarding refresh #{} (#{} already applied)",
                    ticket.0, self.applied
                );
                false
            }
            Err(e) => {
                warn!("Refresh #{} failed, keeping previous networks: {e}", ticket.0);
                false
            }
        }
    }
}

/// Drives `dispatcher` until `shutdown` fires or the stream ends.
///
/// Refreshes run on a [`JoinSet`] owned by this loop; returning (or being
/// aborted) drops the set and cancels any refresh still in flight, so its
/// result is never applied.
pub(crate) async fn run(
    mut dispatcher: EventDispatcher,
    daemon: Arc<dyn StationDaemon>,
    mut notifications: NotificationStream,
    mut shutdown: watch::Receiver<()>,
    listener: Option<ScanListener>,
) -> Result<()> {
    let mut refreshes: JoinSet<(RefreshTicket, Result<NetworkSnapshot>)> = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                debug!("Dispatcher shutting down with {} refreshes pending", refreshes.len());
                return Ok(());
            }
            Some(joined) = refreshes.join_next(), if !refreshes.is_empty() => {
                match joined {
                    Ok((ticket, outcome)) => {
                        if dispatcher.complete_refresh(ticket, outcome)
                            && let Some(listener) = &listener
                        {
                            listener();
                        }
                    }
                    Err(e) => warn!("Refresh task did not complete: {e}"),
                }
            }
            next = notifications.next() => {
                let Some(notification) = next else {
                    warn!("Property change stream ended unexpectedly");
                    return Err(IwdError::MonitorEnded);
                };
                if let Some(ticket) = dispatcher.dispatch(&notification) {
                    let daemon = Arc::clone(&daemon);
                    refreshes.spawn(async move {
                        let outcome = NetworkSnapshot::fetch(daemon.as_ref()).await;
                        (ticket, outcome)
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ConnectionState, NetworkEntry};

    fn dispatcher() -> (EventDispatcher, Arc<NetworkCache>, Arc<ConnectionStateTracker>) {
        let cache = Arc::new(NetworkCache::new());
        let tracker = Arc::new(ConnectionStateTracker::new());
        let dispatcher = EventDispatcher::new(Arc::clone(&cache), Arc::clone(&tracker));
        (dispatcher, cache, tracker)
    }

    fn station(changed: Vec<PropertyChange>) -> StationNotification {
        StationNotification::changed(iwd::STATION_INTERFACE, changed)
    }

    fn snapshot(ids: &[&str]) -> NetworkSnapshot {
        NetworkSnapshot::from_ordered(ids.iter().map(|id| NetworkEntry::new(*id, 50, *id, "open")))
    }

    #[test]
    fn test_scan_finished_requests_refresh() {
        let (mut d, _, _) = dispatcher();
        assert!(d.dispatch(&station(vec![PropertyChange::Scanning(false)])).is_some());
    }

    #[test]
    fn test_scan_started_is_ignored() {
        let (mut d, _, tracker) = dispatcher();
        assert!(d.dispatch(&station(vec![PropertyChange::Scanning(true)])).is_none());
        assert_eq!(tracker.get(), ConnectionState::default());
    }

    #[test]
    fn test_state_changes_drive_latch() {
        let (mut d, _, tracker) = dispatcher();
        let mut seen = Vec::new();
        for value in ["idle", "connecting", "connected"] {
            d.dispatch(&station(vec![PropertyChange::State(value.into())]));
            seen.push(tracker.is_connecting());
        }
        assert_eq!(seen, [false, true, false]);
    }

    #[test]
    fn test_connected_network_set_and_invalidated() {
        let (mut d, _, tracker) = dispatcher();
        d.dispatch(&station(vec![PropertyChange::ConnectedNetwork("/net/0".into())]));
        assert_eq!(tracker.current_network_id().as_deref(), Some("/net/0"));

        d.dispatch(&StationNotification::invalidated(
            iwd::STATION_INTERFACE,
            vec!["ConnectedNetwork".into()],
        ));
        assert_eq!(tracker.current_network_id(), None);
    }

    #[test]
    fn test_invalidation_wins_over_change_in_same_notification() {
        let (mut d, _, tracker) = dispatcher();
        d.dispatch(&StationNotification {
            interface: iwd::STATION_INTERFACE.into(),
            changed: vec![PropertyChange::ConnectedNetwork("/net/0".into())],
            invalidated: vec!["ConnectedNetwork".into()],
        });
        assert_eq!(tracker.current_network_id(), None);
    }

    #[test]
    fn test_other_interfaces_are_ignored() {
        let (mut d, _, tracker) = dispatcher();
        let ticket = d.dispatch(&StationNotification {
            interface: iwd::DEVICE_INTERFACE.into(),
            changed: vec![
                PropertyChange::Scanning(false),
                PropertyChange::State("connecting".into()),
            ],
            invalidated: vec!["ConnectedNetwork".into()],
        });
        assert!(ticket.is_none());
        assert!(!tracker.is_connecting());
    }

    #[test]
    fn test_multiple_changes_processed_together() {
        let (mut d, _, tracker) = dispatcher();
        let ticket = d.dispatch(&station(vec![
            PropertyChange::State("connecting".into()),
            PropertyChange::Unrecognized("Affinities".into()),
            PropertyChange::ConnectedNetwork("/net/1".into()),
            PropertyChange::Scanning(false),
        ]));
        assert!(ticket.is_some());
        assert!(tracker.is_connecting());
        assert_eq!(tracker.current_network_id().as_deref(), Some("/net/1"));
    }

    #[test]
    fn test_complete_refresh_swaps_snapshot() {
        let (mut d, cache, _) = dispatcher();
        let ticket = d.dispatch(&station(vec![PropertyChange::Scanning(false)]));
        let Some(ticket) = ticket else {
            panic!("expected a refresh ticket");
        };
        assert!(d.complete_refresh(ticket, Ok(snapshot(&["/net/0", "/net/1"]))));
        assert_eq!(cache.ordered_ids(), ["/net/0", "/net/1"]);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let (mut d, cache, _) = dispatcher();
        cache.replace(snapshot(&["/net/0"]));
        let ticket = d.issue();
        assert!(!d.complete_refresh(ticket, Err(IwdError::NetworkNotFound("/net/1".into()))));
        assert_eq!(cache.ordered_ids(), ["/net/0"]);
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let (mut d, cache, _) = dispatcher();
        let older = d.issue();
        let newer = d.issue();
        assert!(older < newer);

        assert!(d.complete_refresh(newer, Ok(snapshot(&["/net/new"]))));
        assert!(!d.complete_refresh(older, Ok(snapshot(&["/net/old"]))));
        assert_eq!(cache.ordered_ids(), ["/net/new"]);
    }
}
