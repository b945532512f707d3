//! Two-zone SK6812 light fixture controller.
//!
//! Two push-buttons step two strip zones through a two-stage brightness
//! cycle; a third button powers the fixture down after a long press.
//!
//! The crate is split the same way the firmware is wired:
//! - [`button`]: edge-timestamped press classification with a
//!   read-and-clear mailbox, plus the EXTI-side watcher that feeds it
//! - [`animator`]: set / show / wipe of a color across a pixel selection
//! - [`control`]: the polling loop and per-zone toggle state machine
//! - [`hardware`]: traits the core is generic over, and their board bindings
//!
//! # Testing
//!
//! Everything except the board bindings is portable. Run tests on host with:
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod animator;
pub mod button;
pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod hardware;
pub mod zone;

#[cfg(test)]
mod mock;

pub use animator::{Direction, ZoneAnimator};
pub use button::{ButtonMonitor, Edge, EdgeWatcher, Press};
pub use color::Color;
pub use control::{Fixture, Flow, Palette, ZoneControl};
pub use error::{ConfigError, Error};
pub use zone::{Pixels, Zone, ZoneSetup};
