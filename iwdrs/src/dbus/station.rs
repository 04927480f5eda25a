//! iwd Station proxy.

use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for the iwd station interface.
///
/// Provides scanning, disconnection and the daemon's ranked view of visible
/// networks.
#[proxy(
    interface = "net.connman.iwd.Station",
    default_service = "net.connman.iwd"
)]
pub trait IwdStation {
    /// Requests a scan. Fails with `net.connman.iwd.Busy` while one is running.
    fn scan(&self) -> Result<()>;

    /// Disconnects from the current network.
    fn disconnect(&self) -> Result<()>;

    /// Visible networks, most preferred first, paired with their signal
    /// strength in 100 * dBm.
    fn get_ordered_networks(&self) -> Result<Vec<(OwnedObjectPath, i16)>>;

    /// Connection state ("connected", "disconnected", "connecting", ...).
    #[zbus(property)]
    fn state(&self) -> Result<String>;

    /// Network object currently associated to. Absent when disconnected.
    #[zbus(property)]
    fn connected_network(&self) -> Result<OwnedObjectPath>;
}
