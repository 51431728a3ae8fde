//! Core engine for the simulator control panel firmware.
//!
//! Turns noisy switch readings into debounced position changes and
//! dispatches them as keyboard key events or mode-flag updates. The crate
//! is `no_std` so the AVR firmware and the native CLI tool share one
//! engine.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod debounce;
pub mod input;
pub mod keycode;
pub mod panel;
pub mod predicate;
pub mod vkey;

pub use input::PinReader;
pub use panel::{ConfigError, Panel};
pub use vkey::HidSink;

use core::fmt;

/// Lookup of a name that is not in its registry's fixed table.
///
/// The startup validation pass resolves every configured name, so hitting
/// this at runtime indicates a caller bug rather than a recoverable
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownName(pub &'static str);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown name {:?}", self.0)
    }
}
