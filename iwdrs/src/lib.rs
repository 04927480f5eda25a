//! A Rust library for tracking Wi-Fi networks and connection state via iwd.
//!
//! This crate keeps a local, consistent view of what iwd knows about one
//! wireless device:
//!
//! - The visible networks, in iwd's priority order
//! - Each network's name, security type and signal strength
//! - Whether the station is connecting, and which network it is associated to
//!
//! The view is kept current from iwd's `PropertiesChanged` signals instead of
//! polling, and is exposed through [`IwdBackend`], whose operation set mirrors
//! what a network-manager front-end expects from a wireless backend.
//!
//! # Example
//!
//! ```no_run
//! use iwdrs::{BackendConfig, IwdBackend};
//!
//! # async fn example() -> iwdrs::Result<()> {
//! let mut backend = IwdBackend::new(BackendConfig::new().with_device_name("wlan0"));
//! backend.load().await?;
//!
//! for net in backend.networks().iter() {
//!     println!("{} ({}%)", net.essid, net.strength);
//! }
//!
//! if let Some(id) = backend.list_network_ids().first() {
//!     backend.connect(id).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency
//!
//! The network list is never edited in place. Every refresh builds a complete
//! new snapshot and swaps it in only if all daemon queries succeeded; a failed
//! refresh leaves the previous snapshot in effect. Notifications are handled
//! one at a time, and refreshes triggered by a finished scan run as separate
//! tasks whose results are applied back on the dispatcher loop.
//!
//! # Error Handling
//!
//! All fallible operations return `Result<T, IwdError>`. Daemon call failures
//! are passed through unchanged; the crate does not retry.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:

//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod monitoring;
mod types;
mod util;

// Public API modules
pub mod api;

// Re-exported public API
pub use api::backend::IwdBackend;
pub use api::models::{
    BackendConfig, ConnectionState, IwdError, NetworkAttributes, NetworkEntry, PropertyChange,
    ScanListener, StationNotification,
};
pub use crate::core::cache::NetworkSnapshot;
pub use crate::core::daemon::{IwdDaemon, NotificationStream, StationDaemon};
pub use util::utils::{bars_from_strength, strength_from_signal};

/// A specialized `Result` type for iwd backend operations.
pub type Result<T> = std::result::Result<T, IwdError>;
