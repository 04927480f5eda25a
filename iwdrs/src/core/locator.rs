//! Resolution of the managed device's object path.
//!
//! iwd publishes every device through its object manager at `/`. A device is
//! usable by the backend only while it also carries the `Station` interface
//! (that is, while it is powered and in station mode).

use log::debug;
use zbus::Connection;
use zbus::fdo::{DBusProxy, ObjectManagerProxy};
use zbus::names::BusName;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::IwdError;
use crate::dbus::IwdDeviceProxy;
use crate::try_log;
use crate::types::constants::iwd;

/// Returns `true` if iwd currently owns its well-known name on `conn`.
pub(crate) async fn daemon_available(conn: &Connection) -> Result<bool> {
    let dbus = DBusProxy::new(conn).await?;
    let name = BusName::try_from(iwd::SERVICE).map_err(zbus::Error::from)?;
    Ok(dbus.name_has_owner(name).await?)
}

/// Finds the station device whose interface name is `wanted`, or the first
/// station device when `wanted` is `None`.
///
/// # Errors
///
/// Returns `IwdError::NoDevice` when nothing matches.
pub(crate) async fn locate_device(
    conn: &Connection,
    wanted: Option<&str>,
) -> Result<OwnedObjectPath> {
    let manager = ObjectManagerProxy::builder(conn)
        .destination(iwd::SERVICE)?
        .path("/")?
        .build()
        .await?;

    let mut stations: Vec<OwnedObjectPath> = manager
        .get_managed_objects()
        .await?
        .into_iter()
        .filter(|(_, ifaces)| {
            let has = |iface: &str| ifaces.keys().any(|name| name.as_str() == iface);
            has(iwd::DEVICE_INTERFACE) && has(iwd::STATION_INTERFACE)
        })
        .map(|(path, _)| path)
        .collect();
    stations.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut candidates = Vec::with_capacity(stations.len());
    for path in stations {
        if let Some(name) = device_name(conn, &path).await {
            candidates.push((path, name));
        }
    }

    let label = wanted.unwrap_or("<any>").to_owned();
    let path = select_device(candidates, wanted).ok_or(IwdError::NoDevice(label))?;
    debug!("Resolved iwd device: {path}");
    Ok(path)
}

/// Reads the interface name of the device at `path`, logging failures.
async fn device_name(conn: &Connection, path: &OwnedObjectPath) -> Option<String> {
    let builder = try_log!(
        IwdDeviceProxy::builder(conn).path(path.clone()),
        "Failed to create device proxy builder"
    );
    let dev = try_log!(builder.build().await, "Failed to build device proxy");
    Some(try_log!(dev.name().await, format!("Failed to read Name of {path}")))
}

/// Picks the device matching `wanted` from `(path, name)` candidates,
/// which must already be in path order.
fn select_device<P>(candidates: Vec<(P, String)>, wanted: Option<&str>) -> Option<P> {
    candidates
        .into_iter()
        .find(|(_, name)| wanted.is_none_or(|w| w == name.as_str()))
        .map(|(path, _)| path)
}
