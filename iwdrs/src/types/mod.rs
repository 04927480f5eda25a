//! Type definitions and constants.
//!
//! This module contains iwd D-Bus names and value constants.

pub(crate) mod constants;
