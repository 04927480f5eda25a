//! Station property monitoring using D-Bus signals.
//!
//! Subscribes to `org.freedesktop.DBus.Properties.PropertiesChanged` on the
//! device object and decodes each signal into a [`StationNotification`].
//! The signal is emitted once per interface, so the device object yields
//! notifications for both `Device` and `Station`; filtering by interface is
//! left to the dispatcher.

use futures::stream::StreamExt;
use log::{debug, warn};
use zbus::Connection;
use zbus::fdo::PropertiesProxy;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{PropertyChange, StationNotification};
use crate::core::daemon::NotificationStream;
use crate::types::constants::iwd;

/// Returns a stream of decoded property changes for the object at `path`.
///
/// Signals whose arguments fail to parse are logged and skipped.
pub(crate) async fn property_changes(
    conn: &Connection,
    path: OwnedObjectPath,
) -> Result<NotificationStream> {
    let props = PropertiesProxy::builder(conn)
        .destination(iwd::SERVICE)?
        .path(path.clone())?
        .build()
        .await?;

    let stream = props.receive_properties_changed().await?;
    debug!("Subscribed to PropertiesChanged on {path}");

    let decoded = stream.filter_map(|signal| async move {
        match signal.args() {
            Ok(args) => {
                let changed = args
                    .changed_properties()
                    .iter()
                    .map(|(name, value)| PropertyChange::decode(name, value))
                    .collect();

                Some(StationNotification {
                    interface: args.interface_name().to_string(),
                    changed,
                    invalidated: args
                        .invalidated_properties()
                        .iter()
                        .map(|name| (*name).to_owned())
                        .collect(),
                })
            }
            Err(e) => {
                warn!("Failed to parse PropertiesChanged args: {e}");
                None
            }
        }
    });

    Ok(Box::pin(decoded))
}
