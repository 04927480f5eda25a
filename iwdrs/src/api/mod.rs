//! Public API module.
//!
//! This module contains the high-level user-facing API for the `iwdrs` crate.

pub mod backend;
pub mod models;
