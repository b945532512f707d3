use super::traits::PowerControl;
use core::convert::Infallible;
use embassy_stm32::gpio::Output;

/// Soft-power latch: the supply stays on while the pin is held high.
pub struct GpioPowerLatch<'d> {
    pin: Output<'d>,
}

impl<'d> GpioPowerLatch<'d> {
    /// Takes the latch pin and holds the supply on.
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_high();
        Self { pin }
    }
}

impl<'d> PowerControl for GpioPowerLatch<'d> {
    type Error = Infallible;

    fn power_off(&mut self) -> Result<(), Infallible> {
        self.pin.set_low();
        Ok(())
    }
}
