use crate::color::Color;
use crate::error::ConfigError;

/// Frame-buffered pixel strip.
///
/// `set_pixel` only stages; nothing reaches the LEDs until `flush`, which
/// pushes the whole buffer and returns once the transfer is done.
pub trait PixelStrip {
    type Error;

    fn pixel_count(&self) -> usize;
    fn set_pixel(&mut self, index: usize, color: Color) -> Result<(), ConfigError>;
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Push-button wired active-low against a pull-up.
#[allow(async_fn_in_trait)]
pub trait Button {
    /// Resolve on the next level change in either direction.
    async fn wait_for_any_edge(&mut self);
    fn is_pressed(&self) -> bool;
}

/// Whatever keeps the fixture powered.
pub trait PowerControl {
    type Error;

    /// Cut power. Only returns if that failed.
    fn power_off(&mut self) -> Result<(), Self::Error>;
}
