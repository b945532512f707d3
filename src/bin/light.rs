//! STM32F103 Blue Pill Two-Zone SK6812 Light Fixture
//! =============================================================================================
//!
//! Two push-buttons cycle two zones of an SK6812 GRBW strip through
//! OFF -> stage 1 -> stage 2 -> stage 1 ...; a long press turns the zone off.
//! Holding the third button for 3 s flashes the strip and releases the
//! soft-power latch.
//!
//! Hardware Connections:
//!   SK6812 strip (300 pixels):
//!      DIN  -> PA7 (SPI1 MOSI, 3 MHz)
//!
//!   Buttons (to GND, internal pull-up):
//!      Zone 1   -> PB12
//!      Zone 2   -> PB13
//!      Shutdown -> PB14
//!
//!   Power:
//!      Latch    -> PA1 (held high while running)
//!      Sense    -> PB15 (falls when the supply is going away)
//!
//! Edge watchers run on an interrupt executor so the blocking strip flush in
//! the control loop never delays their timestamps.

#![no_std]
#![no_main]

use defmt::{error, info, unwrap};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    interrupt,
    interrupt::{InterruptExt, Priority},
    mode::Blocking,
    spi::{self, Spi},
    time::Hertz,
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Delay;
use static_cell::StaticCell;
use ws2812_spi::{Ws2812, devices::Sk6812w};
use {defmt_rtt as _, panic_probe as _}; // Logging and panic handlers

use zone_light::{
    ButtonMonitor, EdgeWatcher, Fixture, Flow, ZoneAnimator, ZoneControl, config,
    hardware::{gpio_button::GpioButton, gpio_power::GpioPowerLatch, led_strip::LedStrip},
};

type Strip = LedStrip<Ws2812<Spi<'static, Blocking>, Sk6812w>, { config::PIXEL_COUNT }>;

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static MONITORS: StaticCell<[ButtonMonitor; 3]> = StaticCell::new();
static TERMINATE: StaticCell<Signal<CriticalSectionRawMutex, ()>> = StaticCell::new();

#[interrupt]
unsafe fn USART3() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Zone layout is checked before any pin is driven
    let zones = unwrap!(config::zones());

    // System clock: 8MHz HSE * 9 = 72MHz
    let mut hw_config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        hw_config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        hw_config.rcc.pll = Some(Pll {
            src: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL9,
        });
        hw_config.rcc.sys = Sysclk::PLL1_P;
        hw_config.rcc.ahb_pre = AHBPrescaler::DIV1;
        hw_config.rcc.apb1_pre = APBPrescaler::DIV2;
        hw_config.rcc.apb2_pre = APBPrescaler::DIV1;
    }
    let p = embassy_stm32::init(hw_config);
    info!("fixture starting");

    // Hold the supply on before anything else
    let power = GpioPowerLatch::new(Output::new(p.PA1, Level::High, Speed::Low));

    let monitors: &'static [ButtonMonitor; 3] = MONITORS.init([
        ButtonMonitor::new(config::BUTTON_1_PIN, config::LONG_PRESS),
        ButtonMonitor::new(config::BUTTON_2_PIN, config::LONG_PRESS),
        ButtonMonitor::new(config::SHUTDOWN_BUTTON_PIN, config::SHUTDOWN_LONG_PRESS),
    ]);
    let [button_1, button_2, shutdown_button] = monitors;
    let terminate: &'static Signal<CriticalSectionRawMutex, ()> = TERMINATE.init(Signal::new());

    // Edge watchers preempt the control loop
    interrupt::USART3.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::USART3);

    unwrap!(high.spawn(button_task(
        button_1,
        GpioButton::new(ExtiInput::new(p.PB12, p.EXTI12, Pull::Up)),
    )));
    unwrap!(high.spawn(button_task(
        button_2,
        GpioButton::new(ExtiInput::new(p.PB13, p.EXTI13, Pull::Up)),
    )));
    unwrap!(high.spawn(button_task(
        shutdown_button,
        GpioButton::new(ExtiInput::new(p.PB14, p.EXTI14, Pull::Up)),
    )));
    unwrap!(high.spawn(supply_sense_task(
        ExtiInput::new(p.PB15, p.EXTI15, Pull::None),
        terminate,
    )));

    // Strip on SPI1 (PA5 SCK unused by the strip, PA7 MOSI -> DIN)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(config::STRIP_SPI_HZ);
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);
    let strip: Strip = LedStrip::new(Ws2812::new_sk6812w(spi));

    let [zone1, zone2] = zones;
    let mut fixture = unwrap!(Fixture::new(
        ZoneAnimator::new(strip, Delay),
        [
            ZoneControl::new(button_1, zone1),
            ZoneControl::new(button_2, zone2),
        ],
        shutdown_button,
        power,
        terminate,
        config::PALETTE,
        config::WIPE_STEP,
    ));

    if let Err(err) = fixture.startup().await {
        error!("power-on sequence failed: {}", err);
    }

    match fixture.run().await {
        Ok(Flow::Terminated) => info!("terminated, strip dark"),
        Ok(flow) => error!("still running after {}", flow),
        Err(err) => error!("control loop stopped: {}", err),
    }

    // Nothing left to do but wait for the supply to go
    loop {
        cortex_m::asm::wfi();
    }
}

/// Button Edge Task
///
/// Feeds one button monitor from its EXTI line, with debounce and watchdog.
#[embassy_executor::task(pool_size = 3)]
async fn button_task(monitor: &'static ButtonMonitor, button: GpioButton<'static>) {
    info!("watching button {=u8}", monitor.pin());
    let mut watcher = EdgeWatcher::new(monitor, button, config::DEBOUNCE_SETTLE);
    watcher.run().await;
}

/// Supply Sense Task
///
/// Raises the termination request once the supply sense line falls.
#[embassy_executor::task]
async fn supply_sense_task(
    mut sense: ExtiInput<'static>,
    terminate: &'static Signal<CriticalSectionRawMutex, ()>,
) {
    sense.wait_for_falling_edge().await;
    info!("supply going down");
    terminate.signal(());
}
