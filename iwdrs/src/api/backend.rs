use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use zbus::Connection;

use crate::Result;
use crate::api::models::{BackendConfig, ConnectionState, IwdError, NetworkEntry};
use crate::core::cache::{NetworkCache, NetworkSnapshot};
use crate::core::daemon::{IwdDaemon, StationDaemon};
use crate::core::dispatch::{self, EventDispatcher};
use crate::core::locator::{daemon_available, locate_device};
use crate::core::state::ConnectionStateTracker;

/// Wireless backend over iwd, exposing the host framework's operation set.
///
/// The backend keeps a local view of the visible networks and the station's
/// connection state, and keeps it current from iwd's property-change signals.
/// Read operations are lookups against that view and never touch the bus.
///
/// # Lifecycle
///
/// A backend is created unloaded. [`load`](Self::load) resolves the device,
/// seeds the connection state, performs the first network refresh and starts
/// listening for changes. [`unload`](Self::unload) stops listening and
/// discards all cached state. Loading requires a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use iwdrs::{BackendConfig, IwdBackend};
///
/// # async fn example() -> iwdrs::Result<()> {
/// let config = BackendConfig::new()
///     .with_device_name("wlan0")
///     .with_scan_listener(|| println!("new scan results"));
///
/// let mut backend = IwdBackend::new(config);
/// if backend.can_load().await {
///     backend.load().await?;
///     for id in backend.list_network_ids() {
///         let net = backend.get_network_properties(&id)?;
///         println!("{} {}% {}", net.essid, net.strength, net.encryption);
///     }
///     backend.scan().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct IwdBackend {
    config: BackendConfig,
    session: Option<Session>,
}

/// Everything owned by one loaded instance.
struct Session {
    daemon: Arc<dyn StationDaemon>,
    cache: Arc<NetworkCache>,
    tracker: Arc<ConnectionStateTracker>,
    shutdown: watch::Sender<()>,
    monitor: JoinHandle<()>,
}

impl IwdBackend {
    /// Creates an unloaded backend.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// The configuration this backend was created with.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Returns `true` if iwd is running on the system bus.
    pub async fn can_load(&self) -> bool {
        let probe = async {
            let conn = Connection::system().await?;
            daemon_available(&conn).await
        };
        match probe.await {
            Ok(available) => available,
            Err(e) => {
                warn!("Failed to probe for iwd: {e}");
                false
            }
        }
    }

    /// Loads the backend against iwd on the system bus.
    ///
    /// # Errors
    ///
    /// Returns `IwdError::NoDevice` if no station device matches the
    /// configured name, or the D-Bus error of any failed initial query.
    pub async fn load(&mut self) -> Result<()> {
        let conn = Connection::system().await?;
        let device = locate_device(&conn, self.config.device_name.as_deref()).await?;
        let daemon = IwdDaemon::new(&conn, device).await?;
        self.load_with(Arc::new(daemon)).await
    }

    /// Loads the backend against an arbitrary [`StationDaemon`].
    ///
    /// Any previously loaded instance is unloaded first. The notification
    /// subscription is opened before the initial queries so that changes
    /// raised while loading are not lost.
    pub async fn load_with(&mut self, daemon: Arc<dyn StationDaemon>) -> Result<()> {
        self.unload();

        let notifications = daemon.subscribe().await?;
        let tracker = Arc::new(ConnectionStateTracker::load(daemon.as_ref()).await?);
        let cache = Arc::new(NetworkCache::new());
        cache.refresh(daemon.as_ref()).await?;

        let (shutdown, shutdown_rx) = watch::channel(());
        let dispatcher = EventDispatcher::new(Arc::clone(&cache), Arc::clone(&tracker));
        let listener = self.config.scan_listener.clone();
        let monitor = tokio::spawn({
            let daemon = Arc::clone(&daemon);
            async move {
                match dispatch::run(dispatcher, daemon, notifications, shutdown_rx, listener).await {
                    Ok(()) => debug!("Dispatcher stopped"),
                    Err(e) => warn!("Dispatcher stopped: {e}"),
                }
            }
        });

        info!(
            "iwd backend loaded with {} networks",
            cache.snapshot().len()
        );
        self.session = Some(Session {
            daemon,
            cache,
            tracker,
            shutdown,
            monitor,
        });
        Ok(())
    }

    /// Stops listening for changes and drops all cached state.
    ///
    /// A refresh still in flight is cancelled and never applied. Calling this
    /// on an unloaded backend does nothing.
    pub fn unload(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.shutdown.send(());
            session.monitor.abort();
            info!("iwd backend unloaded");
        }
    }

    /// Returns `true` between a successful `load` and `unload`, as long as
    /// the backend is still receiving iwd's property changes.
    ///
    /// If the change stream ends the cached view can no longer be kept
    /// current: the backend reports itself unloaded, reads return nothing
    /// and daemon calls fail with `IwdError::MonitorEnded` until it is
    /// loaded again.
    pub fn is_loaded(&self) -> bool {
        self.live().is_some()
    }

    /// Ids of the visible networks, most preferred first.
    pub fn list_network_ids(&self) -> Vec<String> {
        self.live().map(|s| s.cache.ordered_ids()).unwrap_or_default()
    }

    /// All visible networks, most preferred first, from one snapshot.
    pub fn networks(&self) -> Arc<NetworkSnapshot> {
        self.live().map(|s| s.cache.snapshot()).unwrap_or_default()
    }

    /// Requests a scan. Results arrive through the scan listener.
    pub async fn scan(&self) -> Result<()> {
        self.session()?.daemon.scan().await
    }

    /// Cached properties of one network.
    ///
    /// # Errors
    ///
    /// Returns `IwdError::NetworkNotFound` if `id` is not in the cache.
    pub fn get_network_properties(&self, id: &str) -> Result<NetworkEntry> {
        self.session()?
            .cache
            .lookup(id)
            .ok_or_else(|| IwdError::NetworkNotFound(id.to_owned()))
    }

    /// Connects to the network with the given id.
    pub async fn connect(&self, id: &str) -> Result<()> {
        debug!("Connecting to {id}");
        self.session()?.daemon.connect(id).await
    }

    /// Disconnects the station.
    pub async fn disconnect(&self) -> Result<()> {
        self.session()?.daemon.disconnect().await
    }

    /// Id of the network currently associated to, if any.
    pub fn get_current_network_id(&self) -> Option<String> {
        self.live().and_then(|s| s.tracker.current_network_id())
    }

    /// Returns `true` while the station reports `connecting`.
    pub fn is_connecting(&self) -> bool {
        self.live().is_some_and(|s| s.tracker.is_connecting())
    }

    /// Snapshot of the whole connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.live().map(|s| s.tracker.get()).unwrap_or_default()
    }

    /// This backend never manages wired devices.
    pub fn is_wired(&self) -> bool {
        false
    }

    fn session(&self) -> Result<&Session> {
        match &self.session {
            None => Err(IwdError::NotLoaded),
            Some(session) if session.monitor.is_finished() => Err(IwdError::MonitorEnded),
            Some(session) => Ok(session),
        }
    }

    fn live(&self) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|session| !session.monitor.is_finished())
    }
}

impl Drop for IwdBackend {
    fn drop(&mut self) {
        self.unload();
    }
}
