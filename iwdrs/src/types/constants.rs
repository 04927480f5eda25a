//! Constants for iwd D-Bus names and property values.
//!
//! These correspond to the well-known bus name, interface names and
//! string-valued property states that iwd exposes over the system bus.

/// Bus and interface names used by iwd.
pub mod iwd {
    pub const SERVICE: &str = "net.connman.iwd";
    pub const DEVICE_INTERFACE: &str = "net.connman.iwd.Device";
    pub const STATION_INTERFACE: &str = "net.connman.iwd.Station";
}

/// Station property names the dispatcher reacts to.
pub mod station_property {
    pub const SCANNING: &str = "Scanning";
    pub const STATE: &str = "State";
    pub const CONNECTED_NETWORK: &str = "ConnectedNetwork";
}

/// Values of the Station `State` property.
pub mod station_state {
    pub const CONNECTING: &str = "connecting";
    // pub const CONNECTED: &str = "connected";
    // pub const DISCONNECTED: &str = "disconnected";
}

/// Signal thresholds in centi-dBm (100 * dBm), as reported by
/// `GetOrderedNetworks`. A reading above a threshold earns the category.
pub mod signal_strength {
    pub const EXCELLENT: i16 = -6000;
    pub const GOOD: i16 = -6700;
    pub const FAIR: i16 = -7400;
    pub const WEAK: i16 = -8100;
}

/// Percentage thresholds for bar display
pub mod strength_bars {
    pub const BAR_1_MAX: u8 = 24;
    pub const BAR_2_MIN: u8 = BAR_1_MAX + 1;
    pub const BAR_2_MAX: u8 = 49;
    pub const BAR_3_MIN: u8 = BAR_2_MAX + 1;
    pub const BAR_3_MAX: u8 = 74;
}
