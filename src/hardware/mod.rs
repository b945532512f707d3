//! Hardware abstraction.
//!
//! The core is generic over [`traits`]; the `gpio_*` modules bind those
//! traits to STM32 peripherals and only exist on the firmware target.

pub mod led_strip;
pub mod traits;

#[cfg(target_arch = "arm")]
pub mod gpio_button;
#[cfg(target_arch = "arm")]
pub mod gpio_power;
