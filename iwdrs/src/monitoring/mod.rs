//! Real-time monitoring of station property changes.
//!
//! This module turns iwd's `PropertiesChanged` signals into
//! [`StationNotification`](crate::StationNotification)s for the dispatcher.

pub(crate) mod station;
