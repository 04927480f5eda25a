//! D-Bus proxy interfaces for iwd.
//!
//! This module contains low-level D-Bus proxy definitions for communicating
//! with iwd over the system bus.
//!
//! # iwd D-Bus Structure
//!
//! - `/net/connman/iwd/<phy>/<n>` - Device objects (`Device` and, in station
//!   mode, `Station`)
//! - `/net/connman/iwd/<phy>/<n>/<ssid>_<type>` - Network objects
//!
//! Objects are enumerated through `org.freedesktop.DBus.ObjectManager` at `/`
//! and property changes arrive through `org.freedesktop.DBus.Properties`.

mod device;
mod network;
mod station;

pub(crate) use device::IwdDeviceProxy;
pub(crate) use network::IwdNetworkProxy;
pub(crate) use station::IwdStationProxy;
