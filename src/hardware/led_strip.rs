use super::traits::PixelStrip;
use crate::color::Color;
use crate::error::ConfigError;
use smart_leds::SmartLedsWrite;

/// Frame buffer in front of a `smart-leds` writer.
///
/// `N` is the physical pixel count. `flush` hands the whole buffer to the
/// writer, which for `ws2812-spi` clocks it out over SPI before returning.
pub struct LedStrip<W, const N: usize> {
    writer: W,
    frame: [Color; N],
}

impl<W, const N: usize> LedStrip<W, N> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frame: [Color::OFF; N],
        }
    }

    pub fn frame(&self) -> &[Color; N] {
        &self.frame
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W, const N: usize> PixelStrip for LedStrip<W, N>
where
    W: SmartLedsWrite,
    Color: Into<W::Color>,
{
    type Error = W::Error;

    fn pixel_count(&self) -> usize {
        N
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<(), ConfigError> {
        let pixel = self
            .frame
            .get_mut(index)
            .ok_or(ConfigError::IndexOutOfRange { index, len: N })?;
        *pixel = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), W::Error> {
        self.writer.write(self.frame.iter().copied())
    }
}
