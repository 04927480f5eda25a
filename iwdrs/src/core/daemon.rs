//! The daemon seam: everything the core asks of iwd.
//!
//! [`StationDaemon`] is the request/response and notification surface the
//! cache, the state tracker and the dispatcher are written against.
//! [`IwdDaemon`] implements it over the system bus for one device.

use async_trait::async_trait;
use futures::stream::Stream;
use log::debug;
use std::pin::Pin;
use zbus::Connection;
use zbus::proxy::CacheProperties;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{NetworkAttributes, StationNotification};
use crate::dbus::{IwdNetworkProxy, IwdStationProxy};
use crate::monitoring::station::property_changes;

/// Stream of property-change notifications for the managed device.
pub type NotificationStream = Pin<Box<dyn Stream<Item = StationNotification> + Send>>;

/// Operations the backend needs from the wireless daemon.
///
/// Every method maps to one D-Bus call (or one subscription) against the
/// device the backend was loaded for. Implementations must not retry.
#[async_trait]
pub trait StationDaemon: Send + Sync {
    /// Visible networks, most preferred first, with raw signal in centi-dBm.
    async fn ordered_networks(&self) -> Result<Vec<(String, i16)>>;

    /// `Name` and `Type` of one network object.
    async fn network_attributes(&self, id: &str) -> Result<NetworkAttributes>;

    /// Current value of the Station `State` property.
    async fn station_state(&self) -> Result<String>;

    /// Currently associated network. A property with no value is `None`.
    async fn connected_network(&self) -> Result<Option<String>>;

    /// Requests a scan.
    async fn scan(&self) -> Result<()>;

    /// Disconnects the station.
    async fn disconnect(&self) -> Result<()>;

    /// Connects to the network with the given id.
    async fn connect(&self, id: &str) -> Result<()>;

    /// Subscribes to property changes on the device object.
    async fn subscribe(&self) -> Result<NotificationStream>;
}

/// Whether a failed property read means the property currently has no value.
///
/// iwd answers `Get` for an unset property with a generic `Failed` error;
/// other implementations use `InvalidArgs` or `UnknownProperty`.
fn is_absent(e: &zbus::Error) -> bool {
    matches!(
        e,
        zbus::Error::FDO(fdo) if matches!(
            **fdo,
            zbus::fdo::Error::Failed(_)
                | zbus::fdo::Error::InvalidArgs(_)
                | zbus::fdo::Error::UnknownProperty(_)
        )
    )
}

/// [`StationDaemon`] backed by iwd on the system bus.
#[derive(Debug, Clone)]
pub struct IwdDaemon {
    conn: Connection,
    device: OwnedObjectPath,
    station: IwdStationProxy<'static>,
}

impl IwdDaemon {
    /// Binds to the station interface of the device at `device`.
    pub async fn new(conn: &Connection, device: OwnedObjectPath) -> Result<Self> {
        let station = IwdStationProxy::builder(conn)
            .path(device.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        Ok(Self {
            conn: conn.clone(),
            device,
            station,
        })
    }

    /// Object path of the managed device.
    pub fn device_path(&self) -> &OwnedObjectPath {
        &self.device
    }

    async fn network(&self, id: &str) -> Result<IwdNetworkProxy<'static>> {
        let path = OwnedObjectPath::try_from(id.to_owned())?;
        Ok(IwdNetworkProxy::builder(&self.conn)
            .path(path)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }
}

#[async_trait]
impl StationDaemon for IwdDaemon {
    async fn ordered_networks(&self) -> Result<Vec<(String, i16)>> {
        let networks = self.station.get_ordered_networks().await?;
        Ok(networks
            .into_iter()
            .map(|(path, signal)| (path.as_str().to_owned(), signal))
            .collect())
    }

    async fn network_attributes(&self, id: &str) -> Result<NetworkAttributes> {
        let network = self.network(id).await?;
        Ok(NetworkAttributes {
            name: network.name().await?,
            security: network.network_type().await?,
        })
    }

    async fn station_state(&self) -> Result<String> {
        Ok(self.station.state().await?)
    }

    async fn connected_network(&self) -> Result<Option<String>> {
        match self.station.connected_network().await {
            Ok(path) => Ok(Some(path.as_str().to_owned())),
            Err(e) if is_absent(&e) => {
                debug!("ConnectedNetwork has no value: {e}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scan(&self) -> Result<()> {
        Ok(self.station.scan().await?)
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(self.station.disconnect().await?)
    }

    async fn connect(&self, id: &str) -> Result<()> {
        let network = self.network(id).await?;
        Ok(network.connect().await?)
    }

    async fn subscribe(&self) -> Result<NotificationStream> {
        property_changes(&self.conn, self.device.clone()).await
    }
}
