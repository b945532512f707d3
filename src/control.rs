//! Fixture control loop.
//!
//! Polls the three button monitors, and drives the two zones through their
//! OFF → stage 1 → stage 2 → stage 1 ... cycle. The loop never sleeps on its
//! own; it only yields between ticks and is otherwise paced by the
//! animations it runs.

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

use crate::animator::{Direction, ZoneAnimator};
use crate::button::{ButtonMonitor, Press};
use crate::color::Color;
use crate::error::Error;
use crate::hardware::traits::{PixelStrip, PowerControl};
use crate::zone::{Pixels, ZoneSetup};

/// Colors used by the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub off: Color,
    pub stage1: Color,
    pub stage2: Color,
    /// Wiped across the strip at power-on
    pub power_on: Color,
    /// Flashed before powering off
    pub shutdown: Color,
}

/// Which stage color a short press selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Stage {
    One,
    Two,
}

/// Two-valued per-zone counter, advanced on every short press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toggle(u8);

impl Toggle {
    pub fn count(&self) -> u8 {
        self.0
    }

    /// Stage for the current count, then advance modulo 2.
    pub fn advance(&mut self) -> Stage {
        let stage = if self.0 == 0 { Stage::One } else { Stage::Two };
        self.0 = (self.0 + 1) % 2;
        stage
    }
}

/// One zone, the button that drives it, and its toggle state.
pub struct ZoneControl<'a, const N: usize> {
    button: &'a ButtonMonitor,
    setup: ZoneSetup<N>,
    toggle: Toggle,
}

impl<'a, const N: usize> ZoneControl<'a, N> {
    pub fn new(button: &'a ButtonMonitor, setup: ZoneSetup<N>) -> Self {
        Self {
            button,
            setup,
            toggle: Toggle::default(),
        }
    }

    pub fn toggle(&self) -> Toggle {
        self.toggle
    }
}

/// Outcome of one loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Flow {
    Continue,
    /// Shutdown button held; strip is dark and power was released
    Shutdown,
    /// Termination requested; strip is dark
    Terminated,
}

/// Application context: everything the control loop touches, built once at
/// startup.
pub struct Fixture<'a, S, D, P, const N: usize> {
    animator: ZoneAnimator<S, D>,
    zones: [ZoneControl<'a, N>; 2],
    shutdown_button: &'a ButtonMonitor,
    power: P,
    terminate: &'a Signal<CriticalSectionRawMutex, ()>,
    palette: Palette,
    wipe_step: Duration,
}

impl<'a, S, D, P, const N: usize> Fixture<'a, S, D, P, N>
where
    S: PixelStrip,
    D: DelayNs,
    P: PowerControl,
{
    /// Assemble the fixture. Fails if a zone does not fit the strip, before
    /// anything is written to it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        animator: ZoneAnimator<S, D>,
        zones: [ZoneControl<'a, N>; 2],
        shutdown_button: &'a ButtonMonitor,
        power: P,
        terminate: &'a Signal<CriticalSectionRawMutex, ()>,
        palette: Palette,
        wipe_step: Duration,
    ) -> Result<Self, Error<S::Error>> {
        for zone in &zones {
            animator.validate(zone.setup.pixels())?;
        }

        Ok(Self {
            animator,
            zones,
            shutdown_button,
            power,
            terminate,
            palette,
            wipe_step,
        })
    }

    pub fn animator(&self) -> &ZoneAnimator<S, D> {
        &self.animator
    }

    pub fn zone(&self, index: usize) -> Option<&ZoneControl<'a, N>> {
        self.zones.get(index)
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    /// Power-on indicator: wipe up, then back off.
    pub async fn startup(&mut self) -> Result<(), Error<S::Error>> {
        info!("power-on sequence");
        self.wipe_all(self.palette.power_on, Direction::Up).await?;
        self.wipe_all(self.palette.off, Direction::Down).await
    }

    /// Run ticks until the fixture shuts down or is told to stop.
    pub async fn run(&mut self) -> Result<Flow, Error<S::Error>> {
        loop {
            match self.tick().await? {
                Flow::Continue => yield_now().await,
                flow => return Ok(flow),
            }
        }
    }

    /// Poll every button once and act on what was pressed.
    pub async fn tick(&mut self) -> Result<Flow, Error<S::Error>> {
        if self.terminate.try_take().is_some() {
            info!("termination requested");
            self.wipe_all(self.palette.off, Direction::Down).await?;
            return Ok(Flow::Terminated);
        }

        let shutdown = self.shutdown_button.state();
        let presses = [self.zones[0].button.state(), self.zones[1].button.state()];

        if shutdown == Press::Long {
            self.shutdown().await?;
            return Ok(Flow::Shutdown);
        }

        for (index, press) in presses.into_iter().enumerate() {
            self.apply(index, press)?;
        }

        Ok(Flow::Continue)
    }

    fn apply(&mut self, index: usize, press: Press) -> Result<(), Error<S::Error>> {
        let zone = &mut self.zones[index];
        match press {
            Press::Long => {
                debug!("zone {=usize}: off", index);
                self.animator.show(self.palette.off, zone.setup.pixels())?;
            }
            Press::Short => {
                let stage = zone.toggle.advance();
                debug!("zone {=usize}: {}", index, stage);
                let (color, pixels) = match stage {
                    Stage::One => (self.palette.stage1, zone.setup.stage1_pixels()),
                    Stage::Two => (self.palette.stage2, zone.setup.pixels()),
                };
                self.animator.set(self.palette.off, zone.setup.pixels())?;
                self.animator.show(color, pixels)?;
            }
            Press::Low | Press::High => {}
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Error<S::Error>> {
        info!("shutdown sequence");
        for _ in 0..2 {
            self.wipe_all(self.palette.shutdown, Direction::Up).await?;
            self.wipe_all(self.palette.off, Direction::Down).await?;
        }

        self.power.power_off().map_err(|_| {
            error!("power latch release failed");
            Error::PowerOff
        })
    }

    async fn wipe_all(
        &mut self,
        color: Color,
        direction: Direction,
    ) -> Result<(), Error<S::Error>> {
        self.animator
            .wipe(color, Pixels::All, direction, self.wipe_step)
            .await
    }
}
