//! In-memory stand-in for iwd used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::mpsc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use iwdrs::{
    IwdError, NetworkAttributes, NotificationStream, PropertyChange, StationDaemon,
    StationNotification,
};

pub const STATION: &str = "net.connman.iwd.Station";
pub const DEVICE: &str = "net.connman.iwd.Device";

#[derive(Default)]
struct Script {
    networks: Vec<(String, i16)>,
    attributes: HashMap<String, NetworkAttributes>,
    failing: HashSet<String>,
    state: String,
    connected: Option<String>,
    fail_calls: bool,
    connects: Vec<String>,
}

/// Scripted daemon with call counters and an injectable notification feed.
#[derive(Default)]
pub struct MockDaemon {
    script: Mutex<Script>,
    feed: Mutex<Option<mpsc::UnboundedSender<StationNotification>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    pub refreshes: AtomicUsize,
    pub scans: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl MockDaemon {
    pub fn new(state: &str) -> Arc<Self> {
        let daemon = Self::default();
        daemon.script.lock().unwrap().state = state.to_string();
        Arc::new(daemon)
    }

    /// Sets the ordered network list and attributes returned by the next refresh.
    pub fn set_networks(&self, networks: &[(&str, i16, &str, &str)]) {
        let mut script = self.script.lock().unwrap();
        script.networks = networks
            .iter()
            .map(|(id, signal, _, _)| (id.to_string(), *signal))
            .collect();
        script.attributes = networks
            .iter()
            .map(|(id, _, name, security)| {
                (
                    id.to_string(),
                    NetworkAttributes {
                        name: name.to_string(),
                        security: security.to_string(),
                    },
                )
            })
            .collect();
    }

    /// Makes attribute queries for `id` fail.
    pub fn fail_network(&self, id: &str) {
        self.script.lock().unwrap().failing.insert(id.to_string());
    }

    /// Makes scan, connect and disconnect fail.
    pub fn fail_calls(&self) {
        self.script.lock().unwrap().fail_calls = true;
    }

    pub fn set_connected(&self, id: Option<&str>) {
        self.script.lock().unwrap().connected = id.map(str::to_string);
    }

    pub fn connects(&self) -> Vec<String> {
        self.script.lock().unwrap().connects.clone()
    }

    /// Blocks attribute queries until [`open_gate`](Self::open_gate).
    pub fn close_gate(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn open_gate(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Delivers a notification to the current subscriber.
    pub fn notify(&self, notification: StationNotification) {
        let feed = self.feed.lock().unwrap();
        feed.as_ref()
            .expect("no subscriber")
            .unbounded_send(notification)
            .expect("subscriber gone");
    }

    /// Closes the notification stream handed to the current subscriber.
    pub fn end_notifications(&self) {
        self.feed.lock().unwrap().take();
    }

    pub fn notify_station(&self, changed: Vec<PropertyChange>) {
        self.notify(StationNotification::changed(STATION, changed));
    }

    fn failure(what: &str) -> IwdError {
        IwdError::Dbus(zbus::Error::Failure(format!("{what} failed")))
    }
}

#[async_trait]
impl StationDaemon for MockDaemon {
    async fn ordered_networks(&self) -> iwdrs::Result<Vec<(String, i16)>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().networks.clone())
    }

    async fn network_attributes(&self, id: &str) -> iwdrs::Result<NetworkAttributes> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }

        let script = self.script.lock().unwrap();
        if script.failing.contains(id) {
            return Err(Self::failure("GetProperties"));
        }
        script
            .attributes
            .get(id)
            .cloned()
            .ok_or_else(|| Self::failure("GetProperties"))
    }

    async fn station_state(&self) -> iwdrs::Result<String> {
        Ok(self.script.lock().unwrap().state.clone())
    }

    async fn connected_network(&self) -> iwdrs::Result<Option<String>> {
        Ok(self.script.lock().unwrap().connected.clone())
    }

    async fn scan(&self) -> iwdrs::Result<()> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if self.script.lock().unwrap().fail_calls {
            return Err(Self::failure("Scan"));
        }
        Ok(())
    }

    async fn disconnect(&self) -> iwdrs::Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.script.lock().unwrap().fail_calls {
            return Err(Self::failure("Disconnect"));
        }
        Ok(())
    }

    async fn connect(&self, id: &str) -> iwdrs::Result<()> {
        let mut script = self.script.lock().unwrap();
        if script.fail_calls {
            return Err(Self::failure("Connect"));
        }
        script.connects.push(id.to_string());
        Ok(())
    }

    async fn subscribe(&self) -> iwdrs::Result<NotificationStream> {
        let (tx, rx) = mpsc::unbounded();
        *self.feed.lock().unwrap() = Some(tx);
        Ok(Box::pin(rx))
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Counter bumped by a scan listener.
pub fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let listener = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, listener)
}
