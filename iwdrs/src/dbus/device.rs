//! iwd Device proxy.

use zbus::{Result, proxy};

/// Proxy for the iwd device interface.
///
/// A device object represents one wireless interface. When the device runs
/// in station mode the same object also carries the `Station` interface.
#[proxy(
    interface = "net.connman.iwd.Device",
    default_service = "net.connman.iwd"
)]
pub trait IwdDevice {
    /// The network interface name (e.g., "wlan0").
    #[zbus(property)]
    fn name(&self) -> Result<String>;
}
