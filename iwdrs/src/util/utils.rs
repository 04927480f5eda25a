//! Utility functions for Wi-Fi data conversion and display.
//!
//! Provides helpers for converting between Wi-Fi data representations:
//! raw signal readings to strength categories, categories to visual bars.

use crate::types::constants::{signal_strength, strength_bars};

/// Converts a raw signal reading (centi-dBm) to a strength percentage.
///
/// The result is always one of `0`, `25`, `50`, `75` or `100`:
/// - above -60 dBm:         100
/// - above -67 dBm:         75
/// - above -74 dBm:         50
/// - above -81 dBm:         25
/// - -81 dBm and weaker:    0
pub fn strength_from_signal(signal: i16) -> u8 {
    match signal {
        s if s > signal_strength::EXCELLENT => 100,
        s if s > signal_strength::GOOD => 75,
        s if s > signal_strength::FAIR => 50,
        s if s > signal_strength::WEAK => 25,
        _ => 0,
    }
}

/// Converts signal strength (0-100) to a visual bar representation.
///
/// Returns a 4-character string using Unicode block characters:
/// - 0-24%:   `▂___` (1 bar)
/// - 25-49%:  `▂▄__` (2 bars)
/// - 50-74%:  `▂▄▆_` (3 bars)
/// - 75-100%: `▂▄▆█` (4 bars)
pub fn bars_from_strength(s: u8) -> &'static str {
    match s {
        0..=strength_bars::BAR_1_MAX => "▂___",
        strength_bars::BAR_2_MIN..=strength_bars::BAR_2_MAX => "▂▄__",
        strength_bars::BAR_3_MIN..=strength_bars::BAR_3_MAX => "▂▄▆_",
        _ => "▂▄▆█",
    }
}

/// Macro to convert Result to Option with error logging.
/// Usage: `try_log!(result, "context message")`
#[macro_export]
macro_rules! try_log {
    ($result:expr, $context:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: {:?}", $context, e);
                return None;
            }
        }
    };
}
