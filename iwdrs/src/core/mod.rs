//! Core internal logic for the network cache and connection state.
//!
//! This module contains the cache, the connection-state tracker, the
//! notification dispatcher and the daemon seam they are written against.

pub(crate) mod cache;
pub(crate) mod daemon;
pub(crate) mod dispatch;
pub(crate) mod locator;
pub(crate) mod state;
