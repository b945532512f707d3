//! Fixture configuration.
//!
//! Strip geometry, zone layout, button timing and colors of the reference
//! fixture (Blue Pill, 300-pixel SK6812 GRBW strip).

use embassy_time::Duration;

use crate::color::Color;
use crate::control::Palette;
use crate::error::ConfigError;
use crate::zone::{Zone, ZoneSetup};

/// Physical pixel count of the strip.
pub const PIXEL_COUNT: usize = 300;

/// Storage reserved per zone.
pub const ZONE_CAPACITY: usize = 192;

/// Zone 1: `(start, stop, step)`, stop exclusive.
pub const ZONE_1: (i32, i32, i32) = (0, 176, 1);
/// Zone 2 runs from the far end of the strip back towards zone 1.
pub const ZONE_2: (i32, i32, i32) = (299, 177, -1);

/// Stage one lights each zone from this offset onwards.
pub const ZONE_1_STAGE1_SKIP: usize = 0;
pub const ZONE_2_STAGE1_SKIP: usize = 60;

// Buttons sit on port B, pulled up, shorting to ground when pressed
pub const BUTTON_1_PIN: u8 = 12;
pub const BUTTON_2_PIN: u8 = 13;
pub const SHUTDOWN_BUTTON_PIN: u8 = 14;

pub const LONG_PRESS: Duration = Duration::from_millis(1500);
pub const SHUTDOWN_LONG_PRESS: Duration = Duration::from_millis(3000);

/// Contact settle time between an edge interrupt and re-reading the pin.
pub const DEBOUNCE_SETTLE: Duration = Duration::from_millis(20);

/// Pause between pixels of the power-on, shutdown and termination wipes.
pub const WIPE_STEP: Duration = Duration::from_millis(5);

/// SPI clock for the strip; ws2812-spi needs 2-3.8 MHz.
pub const STRIP_SPI_HZ: u32 = 3_000_000;

pub const PALETTE: Palette = Palette {
    off: Color::OFF,
    stage1: Color::new(0, 0, 0, 1),
    stage2: Color::new(0, 0, 0, 3),
    power_on: Color::new(10, 0, 0, 10),
    shutdown: Color::new(0, 10, 0, 10),
};

/// Build both zones, checked against [`PIXEL_COUNT`].
pub fn zones() -> Result<[ZoneSetup<ZONE_CAPACITY>; 2], ConfigError> {
    let (start, stop, step) = ZONE_1;
    let zone1 = ZoneSetup::new(
        Zone::stepped(start, stop, step, PIXEL_COUNT)?,
        ZONE_1_STAGE1_SKIP,
    )?;

    let (start, stop, step) = ZONE_2;
    let zone2 = ZoneSetup::new(
        Zone::stepped(start, stop, step, PIXEL_COUNT)?,
        ZONE_2_STAGE1_SKIP,
    )?;

    Ok([zone1, zone2])
}
