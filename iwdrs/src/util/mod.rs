//! Internal helpers shared across the crate.

pub(crate) mod utils;
