//! Color staging and rendering over pixel selections.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

use crate::color::Color;
use crate::error::{ConfigError, Error};
use crate::hardware::traits::PixelStrip;
use crate::zone::Pixels;

/// Order in which a wipe walks its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Direction {
    /// As given
    Up,
    /// Reversed
    Down,
}

/// Draws colors onto a [`PixelStrip`].
///
/// `set` only stages into the frame buffer, `show` stages and flushes,
/// `wipe` flushes once per pixel with a pause in between. None of them can
/// be interrupted; the caller is blocked for the whole animation.
pub struct ZoneAnimator<S, D> {
    strip: S,
    delay: D,
}

impl<S: PixelStrip, D: DelayNs> ZoneAnimator<S, D> {
    pub fn new(strip: S, delay: D) -> Self {
        Self { strip, delay }
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Check that every selected index exists on the strip.
    pub fn validate(&self, pixels: Pixels<'_>) -> Result<(), ConfigError> {
        if let Pixels::Indices(indices) = pixels {
            let len = self.strip.pixel_count();
            if let Some(&index) = indices.iter().find(|&&index| usize::from(index) >= len) {
                return Err(ConfigError::IndexOutOfRange {
                    index: usize::from(index),
                    len,
                });
            }
        }
        Ok(())
    }

    /// Stage `color` on the selected pixels without flushing.
    ///
    /// A bad selection is rejected before any pixel is touched.
    pub fn set(&mut self, color: Color, pixels: Pixels<'_>) -> Result<(), Error<S::Error>> {
        self.validate(pixels)?;
        match pixels {
            Pixels::All => {
                for index in 0..self.strip.pixel_count() {
                    self.strip.set_pixel(index, color)?;
                }
            }
            Pixels::Indices(indices) => {
                for &index in indices {
                    self.strip.set_pixel(usize::from(index), color)?;
                }
            }
        }
        Ok(())
    }

    /// Stage `color` on the selected pixels and flush the whole strip.
    pub fn show(&mut self, color: Color, pixels: Pixels<'_>) -> Result<(), Error<S::Error>> {
        self.set(color, pixels)?;
        if matches!(pixels, Pixels::Indices(indices) if indices.is_empty()) {
            return Ok(());
        }
        self.strip.flush().map_err(Error::Driver)
    }

    /// Paint the selection one pixel at a time: set, flush the whole strip,
    /// wait `interval`, next pixel.
    pub async fn wipe(
        &mut self,
        color: Color,
        pixels: Pixels<'_>,
        direction: Direction,
        interval: Duration,
    ) -> Result<(), Error<S::Error>> {
        self.validate(pixels)?;
        let step = u32::try_from(interval.as_micros()).unwrap_or(u32::MAX);

        match (pixels, direction) {
            (Pixels::All, Direction::Up) => {
                let count = self.strip.pixel_count();
                self.wipe_over(color, 0..count, step).await
            }
            (Pixels::All, Direction::Down) => {
                let count = self.strip.pixel_count();
                self.wipe_over(color, (0..count).rev(), step).await
            }
            (Pixels::Indices(indices), Direction::Up) => {
                self.wipe_over(color, indices.iter().map(|&i| usize::from(i)), step)
                    .await
            }
            (Pixels::Indices(indices), Direction::Down) => {
                self.wipe_over(color, indices.iter().rev().map(|&i| usize::from(i)), step)
                    .await
            }
        }
    }

    async fn wipe_over(
        &mut self,
        color: Color,
        order: impl Iterator<Item = usize>,
        step_us: u32,
    ) -> Result<(), Error<S::Error>> {
        for index in order {
            self.strip.set_pixel(index, color)?;
            self.strip.flush().map_err(Error::Driver)?;
            self.delay.delay_us(step_us).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::led_strip::LedStrip;
    use crate::mock::{RecordingDelay, RecordingWriter};
    use embassy_futures::block_on;

    const RED: Color = Color::new(255, 0, 0, 0);
    const STAGE1: Color = Color::new(0, 0, 0, 1);

    type Animator<const N: usize> = ZoneAnimator<LedStrip<RecordingWriter, N>, RecordingDelay>;

    fn animator<const N: usize>() -> Animator<N> {
        ZoneAnimator::new(
            LedStrip::new(RecordingWriter::default()),
            RecordingDelay::default(),
        )
    }

    fn lit(frame: &[Color], color: Color) -> std::vec::Vec<usize> {
        frame
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == color)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_set_does_not_flush() {
        let mut anim = animator::<8>();
        anim.set(RED, Pixels::Indices(&[1, 3])).unwrap();

        assert_eq!(lit(anim.strip().frame(), RED), [1, 3]);
        assert_eq!(anim.strip().writer().flushes(), 0);
    }

    #[test]
    fn test_set_all() {
        let mut anim = animator::<5>();
        anim.set(RED, Pixels::All).unwrap();
        assert_eq!(lit(anim.strip().frame(), RED), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_set_then_show() {
        let mut anim = animator::<8>();
        anim.set(RED, Pixels::All).unwrap();

        anim.set(Color::OFF, Pixels::Indices(&[])).unwrap();
        anim.show(STAGE1, Pixels::Indices(&[0, 1, 2])).unwrap();

        let frame = anim.strip().writer().last_frame();
        assert_eq!(lit(frame, STAGE1), [0, 1, 2]);
        assert_eq!(lit(frame, RED), [3, 4, 5, 6, 7]);
        assert_eq!(anim.strip().writer().flushes(), 1);
    }

    #[test]
    fn test_show_empty_is_noop() {
        let mut anim = animator::<4>();
        anim.show(RED, Pixels::Indices(&[])).unwrap();
        assert_eq!(anim.strip().writer().flushes(), 0);
    }

    #[test]
    fn test_out_of_range_rejected_before_writing() {
        let mut anim = animator::<4>();
        let result = anim.set(RED, Pixels::Indices(&[0, 1, 4]));

        assert_eq!(
            result,
            Err(Error::Config(ConfigError::IndexOutOfRange { index: 4, len: 4 }))
        );
        assert!(lit(anim.strip().frame(), RED).is_empty());
    }

    #[test]
    fn test_wipe_up_sequence() {
        let mut anim = animator::<12>();
        block_on(anim.wipe(
            RED,
            Pixels::Indices(&[2, 5, 9]),
            Direction::Up,
            Duration::from_millis(10),
        ))
        .unwrap();

        let frames = anim.strip().writer().frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(lit(&frames[0], RED), [2]);
        assert_eq!(lit(&frames[1], RED), [2, 5]);
        assert_eq!(lit(&frames[2], RED), [2, 5, 9]);
        assert_eq!(lit(&frames[2], Color::OFF).len(), 9);
        assert_eq!(anim.delay().waits_ns(), &[10_000_000; 3]);
    }

    #[test]
    fn test_wipe_down_reverses() {
        let mut anim = animator::<12>();
        block_on(anim.wipe(
            RED,
            Pixels::Indices(&[2, 5, 9]),
            Direction::Down,
            Duration::from_millis(1),
        ))
        .unwrap();

        let frames = anim.strip().writer().frames();
        assert_eq!(lit(&frames[0], RED), [9]);
        assert_eq!(lit(&frames[1], RED), [5, 9]);
    }

    #[test]
    fn test_wipe_all_down_starts_at_last_pixel() {
        let mut anim = animator::<4>();
        block_on(anim.wipe(RED, Pixels::All, Direction::Down, Duration::from_millis(5))).unwrap();

        let frames = anim.strip().writer().frames();
        assert_eq!(frames.len(), 4);
        assert_eq!(lit(&frames[0], RED), [3]);
        assert_eq!(lit(&frames[3], RED), [0, 1, 2, 3]);
    }

    #[test]
    fn test_wipe_empty_does_nothing() {
        let mut anim = animator::<4>();
        block_on(anim.wipe(
            RED,
            Pixels::Indices(&[]),
            Direction::Up,
            Duration::from_millis(10),
        ))
        .unwrap();

        assert_eq!(anim.strip().writer().flushes(), 0);
        assert!(anim.delay().waits_ns().is_empty());
    }
}
