use super::traits::Button;
use embassy_stm32::exti::ExtiInput;

pub struct GpioButton<'d> {
    pin: ExtiInput<'d>,
}

impl<'d> GpioButton<'d> {
    pub fn new(pin: ExtiInput<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> Button for GpioButton<'d> {
    async fn wait_for_any_edge(&mut self) {
        self.pin.wait_for_any_edge().await
    }

    fn is_pressed(&self) -> bool {
        self.pin.is_low()
    }
}
