use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use thiserror::Error;
use zvariant::Value;

use crate::types::constants::station_property;

/// Represents one visible Wi-Fi network.
///
/// Entries are produced by a cache refresh from iwd's ordered network list
/// and the per-network `Name`/`Type` properties.
///
/// # Examples
///
/// ```rust
/// use iwdrs::NetworkEntry;
///
/// let entry = NetworkEntry::new("/net/connman/iwd/0/3/486f6d65_psk", 75, "Home", "psk");
/// assert_eq!(entry.essid, "Home");
/// assert!(entry.bssid.is_empty());
/// assert_eq!(entry.channel, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Network object path, unique and stable while the network is visible
    pub id: String,
    /// Signal strength category (0, 25, 50, 75 or 100)
    pub strength: u8,
    /// Display name (may be empty)
    pub essid: String,
    /// Security type label ("open", "psk", "8021x", ...)
    pub encryption: String,
    /// Not reported by iwd; always empty
    pub bssid: String,
    /// Not reported by iwd; always zero
    pub channel: u32,
}

impl NetworkEntry {
    /// Creates an entry with the placeholder `bssid`/`channel` fields left empty.
    pub fn new(
        id: impl Into<String>,
        strength: u8,
        essid: impl Into<String>,
        encryption: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            strength,
            essid: essid.into(),
            encryption: encryption.into(),
            bssid: String::new(),
            channel: 0,
        }
    }

    /// Returns `true` if the network requires no credentials.
    pub fn is_open(&self) -> bool {
        self.encryption == "open"
    }
}

/// Per-network attributes iwd reports on the `Network` interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAttributes {
    /// The `Name` property
    pub name: String,
    /// The `Type` property
    pub security: String,
}

/// Connection state of the station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Object path of the associated network, if any
    pub current_network_id: Option<String>,
    /// Set while the station reports `connecting`
    pub is_connecting: bool,
}

/// A recognized Station property change.
///
/// Produced from the `(name, value)` pairs of a `PropertiesChanged` signal.
/// Anything the dispatcher does not act on decodes to `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyChange {
    /// `Scanning` changed; `false` means a scan finished.
    Scanning(bool),
    /// `State` changed to the given value.
    State(String),
    /// `ConnectedNetwork` changed to the given network object path.
    ConnectedNetwork(String),
    /// Any other property, or a known one carrying an unexpected value type.
    Unrecognized(String),
}

impl PropertyChange {
    /// Decodes a changed property from its D-Bus name and value.
    pub fn decode(name: &str, value: &Value<'_>) -> Self {
        match (name, value) {
            (station_property::SCANNING, Value::Bool(scanning)) => Self::Scanning(*scanning),
            (station_property::STATE, Value::Str(state)) => Self::State(state.as_str().to_owned()),
            (station_property::CONNECTED_NETWORK, Value::ObjectPath(path)) => {
                Self::ConnectedNetwork(path.as_str().to_owned())
            }
            (station_property::CONNECTED_NETWORK, Value::Str(path)) => {
                Self::ConnectedNetwork(path.as_str().to_owned())
            }
            (other, _) => Self::Unrecognized(other.to_owned()),
        }
    }
}

impl Display for PropertyChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning(v) => write!(f, "Scanning={v}"),
            Self::State(v) => write!(f, "State={v}"),
            Self::ConnectedNetwork(v) => write!(f, "ConnectedNetwork={v}"),
            Self::Unrecognized(name) => write!(f, "{name} (ignored)"),
        }
    }
}

/// One property-change notification from the device object.
///
/// Mirrors the arguments of `org.freedesktop.DBus.Properties.PropertiesChanged`:
/// the interface whose properties changed, the changed values and the names
/// of properties that were invalidated (removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationNotification {
    /// Interface the change belongs to
    pub interface: String,
    /// Changed properties, in delivery order
    pub changed: Vec<PropertyChange>,
    /// Names of properties that no longer have a value
    pub invalidated: Vec<String>,
}

impl StationNotification {
    /// Creates a notification with only changed properties.
    pub fn changed(interface: impl Into<String>, changed: Vec<PropertyChange>) -> Self {
        Self {
            interface: interface.into(),
            changed,
            invalidated: Vec::new(),
        }
    }

    /// Creates a notification with only invalidated properties.
    pub fn invalidated(interface: impl Into<String>, invalidated: Vec<String>) -> Self {
        Self {
            interface: interface.into(),
            changed: Vec::new(),
            invalidated,
        }
    }
}

/// Callback invoked whenever a finished scan has been folded into the cache.
pub type ScanListener = Arc<dyn Fn() + Send + Sync>;

/// Configuration for an [`IwdBackend`](crate::IwdBackend).
///
/// # Examples
///
/// ```rust
/// use iwdrs::BackendConfig;
///
/// let config = BackendConfig::new()
///     .with_device_name("wlan0")
///     .with_scan_listener(|| println!("scan results are in"));
/// assert_eq!(config.device_name.as_deref(), Some("wlan0"));
/// ```
#[derive(Clone, Default)]
pub struct BackendConfig {
    /// Interface name of the device to manage. `None` picks the first
    /// station-capable device.
    pub device_name: Option<String>,
    /// Notified after each scan whose results were applied to the cache
    pub scan_listener: Option<ScanListener>,
}

impl BackendConfig {
    /// Creates a configuration with no device preference and no listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the device whose `Name` property equals `name`.
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Registers the scan-completion listener.
    pub fn with_scan_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.scan_listener = Some(Arc::new(listener));
        self
    }
}

impl Debug for BackendConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("device_name", &self.device_name)
            .field("scan_listener", &self.scan_listener.is_some())
            .finish()
    }
}

/// Errors that can occur while loading or operating the backend.
#[derive(Debug, Error)]
pub enum IwdError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A standard D-Bus interface call failed.
    #[error("D-Bus interface error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    /// A D-Bus value could not be converted.
    #[error("D-Bus value error: {0}")]
    Variant(#[from] zvariant::Error),

    /// No station device matched the configured name.
    #[error("no iwd station device found matching {0:?}")]
    NoDevice(String),

    /// The backend has not been loaded, or was unloaded.
    #[error("backend is not loaded")]
    NotLoaded,

    /// The network id is not part of the current cache.
    #[error("network not found: {0}")]
    NetworkNotFound(String),

    /// The daemon's notification stream closed.
    #[error("property change stream ended")]
    MonitorEnded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use zvariant::ObjectPath;

    #[test]
    fn test_network_entry_placeholders() {
        let entry = NetworkEntry::new("/net/0", 100, "Home", "psk");
        assert_eq!(entry.bssid, "");
        assert_eq!(entry.channel, 0);
        assert!(!entry.is_open());
        assert!(NetworkEntry::new("/net/1", 75, "Office", "open").is_open());
    }

    #[test]
    fn test_connection_state_default() {
        let state = ConnectionState::default();
        assert_eq!(state.current_network_id, None);
        assert!(!state.is_connecting);
    }

    #[test]
    fn test_decode_scanning() {
        assert_eq!(
            PropertyChange::decode("Scanning", &Value::from(false)),
            PropertyChange::Scanning(false)
        );
        assert_eq!(
            PropertyChange::decode("Scanning", &Value::from(true)),
            PropertyChange::Scanning(true)
        );
    }

    #[test]
    fn test_decode_state() {
        assert_eq!(
            PropertyChange::decode("State", &Value::from("connecting")),
            PropertyChange::State("connecting".into())
        );
    }

    #[test]
    fn test_decode_connected_network() {
        let path = ObjectPath::try_from("/net/connman/iwd/0/3/486f6d65_psk").unwrap();
        assert_eq!(
            PropertyChange::decode("ConnectedNetwork", &Value::ObjectPath(path)),
            PropertyChange::ConnectedNetwork("/net/connman/iwd/0/3/486f6d65_psk".into())
        );
    }

    #[test]
    fn test_decode_wrong_shape_is_unrecognized() {
        assert_eq!(
            PropertyChange::decode("Scanning", &Value::from("yes")),
            PropertyChange::Unrecognized("Scanning".into())
        );
        assert_eq!(
            PropertyChange::decode("State", &Value::from(3u32)),
            PropertyChange::Unrecognized("State".into())
        );
    }

    #[test]
    fn test_decode_unknown_property() {
        assert_eq!(
            PropertyChange::decode("Affinities", &Value::from(true)),
            PropertyChange::Unrecognized("Affinities".into())
        );
    }

    #[test]
    fn test_config_builder() {
        let config = BackendConfig::new().with_device_name("wlan1");
        assert_eq!(config.device_name.as_deref(), Some("wlan1"));
        assert!(config.scan_listener.is_none());

        let config = config.with_scan_listener(|| {});
        assert!(config.scan_listener.is_some());
        assert!(format!("{config:?}").contains("wlan1"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(IwdError::NotLoaded.to_string(), "backend is not loaded");
        assert_eq!(
            IwdError::NetworkNotFound("/net/9".into()).to_string(),
            "network not found: /net/9"
        );
        assert!(IwdError::NoDevice("wlan0".into()).to_string().contains("wlan0"));
    }
}
