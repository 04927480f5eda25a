//! iwd Network proxy.

use zbus::{Result, proxy};

/// Proxy for the iwd network interface.
#[proxy(
    interface = "net.connman.iwd.Network",
    default_service = "net.connman.iwd"
)]
pub trait IwdNetwork {
    /// Connects to this network. Secrets are requested through the
    /// registered agent, if any.
    fn connect(&self) -> Result<()>;

    /// Network name (SSID as text).
    #[zbus(property)]
    fn name(&self) -> Result<String>;

    /// Security type ("open", "wep", "psk" or "8021x").
    #[zbus(property, name = "Type")]
    fn network_type(&self) -> Result<String>;
}
