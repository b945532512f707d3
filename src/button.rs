//! Button press classification.
//!
//! A [`ButtonMonitor`] is fed timestamped edges from the GPIO side and
//! classifies each press/release cycle as short or long. The result sits in
//! a single-slot mailbox until the control loop reads it with
//! [`ButtonMonitor::state`], which clears it. A newer edge overwrites an
//! unread result; there is no queue.
//!
//! [`EdgeWatcher`] is the GPIO side: it waits for EXTI edges, lets the
//! contacts settle, and falls back to a watchdog pseudo-edge when a press
//! never produces a release.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer, with_timeout};

use crate::hardware::traits::Button;

/// Edge level reported when the button goes down (pull-up wiring).
pub const LEVEL_FALLING: u8 = 0;
/// Edge level reported when the button is released.
pub const LEVEL_RISING: u8 = 1;
/// Pseudo-level reported when the watchdog expires.
pub const LEVEL_TIMEOUT: u8 = 2;

/// Watchdog interval as a multiple of the long-press threshold.
pub const WATCHDOG_FACTOR: u32 = 4;

/// Classification of the current press cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Press {
    /// Nothing pending
    Low,
    /// Button is being held, not classified yet
    High,
    /// Released within the long-press threshold
    Short,
    /// Held longer than the long-press threshold
    Long,
}

/// Decoded edge level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
    /// Watchdog expiry, or any level the GPIO side could not decode
    Timeout,
}

impl Edge {
    pub const fn from_level(level: u8) -> Self {
        match level {
            LEVEL_FALLING => Edge::Falling,
            LEVEL_RISING => Edge::Rising,
            _ => Edge::Timeout,
        }
    }
}

#[derive(Clone, Copy)]
struct Slot {
    press: Press,
    pressed_at: Option<Instant>,
}

/// Press classifier for one physical button.
///
/// Shared between the edge watcher (higher priority) and the control loop.
/// Classification and press timestamp sit behind one critical section so
/// neither side sees them half-updated.
pub struct ButtonMonitor {
    pin: u8,
    long_press: Duration,
    slot: Mutex<CriticalSectionRawMutex, Cell<Slot>>,
}

impl ButtonMonitor {
    pub const fn new(pin: u8, long_press: Duration) -> Self {
        Self {
            pin,
            long_press,
            slot: Mutex::new(Cell::new(Slot {
                press: Press::Low,
                pressed_at: None,
            })),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Longest a press may stay unreleased before it is discarded.
    pub fn watchdog(&self) -> Duration {
        self.long_press * WATCHDOG_FACTOR
    }

    /// Feed one edge. Edges for other pins are ignored.
    pub fn on_edge(&self, pin: u8, level: u8, at: Instant) {
        if pin != self.pin {
            return;
        }

        let edge = Edge::from_level(level);
        self.slot.lock(|cell| {
            let mut slot = cell.get();
            match edge {
                Edge::Falling => {
                    slot.pressed_at = Some(at);
                    slot.press = Press::High;
                }
                Edge::Rising => {
                    slot.press = match slot.pressed_at.take() {
                        Some(pressed_at) => {
                            // A clock going backwards counts as an instant release
                            let held = at
                                .checked_duration_since(pressed_at)
                                .unwrap_or(Duration::from_ticks(0));
                            if held > self.long_press {
                                Press::Long
                            } else {
                                Press::Short
                            }
                        }
                        None => Press::Low,
                    };
                }
                Edge::Timeout => {
                    if slot.pressed_at.is_some() {
                        warn!("button {=u8}: watchdog dropped unreleased press", self.pin);
                    }
                    slot.press = Press::Low;
                    slot.pressed_at = None;
                }
            }
            cell.set(slot);
            trace!("button {=u8}: {} -> {}", self.pin, edge, slot.press);
        });
    }

    /// Current classification. `Short` and `Long` are handed out once and
    /// then cleared back to `Low`.
    pub fn state(&self) -> Press {
        self.slot.lock(|cell| {
            let mut slot = cell.get();
            let press = slot.press;
            if matches!(press, Press::Short | Press::Long) {
                slot.press = Press::Low;
                cell.set(slot);
            }
            press
        })
    }
}

/// Feeds a [`ButtonMonitor`] from a GPIO button.
///
/// After each edge interrupt the level is re-read once the contacts had
/// `settle` time; edges that settle back to the last reported level are
/// bounce and get dropped. The edge is timestamped at the interrupt, not
/// after settling.
pub struct EdgeWatcher<'a, B> {
    monitor: &'a ButtonMonitor,
    button: B,
    settle: Duration,
    pressed: bool,
}

impl<'a, B: Button> EdgeWatcher<'a, B> {
    pub fn new(monitor: &'a ButtonMonitor, button: B, settle: Duration) -> Self {
        let pressed = button.is_pressed();
        Self {
            monitor,
            button,
            settle,
            pressed,
        }
    }

    pub fn button(&self) -> &B {
        &self.button
    }

    /// Wait for one edge or one watchdog expiry and report it.
    ///
    /// A level change that lands between the last settled read and re-arming
    /// the edge wait raises no interrupt; it is picked up by the level check
    /// before waiting, or at the latest when the watchdog expires.
    pub async fn step(&mut self) {
        let pin = self.monitor.pin();
        if self.report_level(pin, Instant::now()) {
            debug!("button {=u8}: level changed without an edge", pin);
            return;
        }

        match with_timeout(self.monitor.watchdog(), self.button.wait_for_any_edge()).await {
            Err(_) => {
                let now = Instant::now();
                if !self.report_level(pin, now) {
                    self.monitor.on_edge(pin, LEVEL_TIMEOUT, now);
                }
            }
            Ok(()) => {
                let at = Instant::now();
                Timer::after(self.settle).await;
                if !self.report_level(pin, at) {
                    trace!("button {=u8}: bounce", pin);
                }
            }
        }
    }

    /// Report the current level if it differs from the last reported one.
    fn report_level(&mut self, pin: u8, at: Instant) -> bool {
        let pressed = self.button.is_pressed();
        if pressed == self.pressed {
            return false;
        }
        self.pressed = pressed;

        let level = if pressed { LEVEL_FALLING } else { LEVEL_RISING };
        self.monitor.on_edge(pin, level, at);
        true
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedButton;
    use embassy_futures::block_on;

    const PIN: u8 = 27;

    fn monitor() -> ButtonMonitor {
        ButtonMonitor::new(PIN, Duration::from_millis(1500))
    }

    fn press(monitor: &ButtonMonitor, held_ms: u64) {
        let start = Instant::from_millis(10_000);
        monitor.on_edge(PIN, LEVEL_FALLING, start);
        monitor.on_edge(PIN, LEVEL_RISING, start + Duration::from_millis(held_ms));
    }

    #[test]
    fn test_short_press() {
        let monitor = monitor();
        press(&monitor, 1200);
        assert_eq!(monitor.state(), Press::Short);
    }

    #[test]
    fn test_long_press() {
        let monitor = monitor();
        press(&monitor, 1800);
        assert_eq!(monitor.state(), Press::Long);
    }

    #[test]
    fn test_threshold_is_short() {
        let monitor = monitor();
        press(&monitor, 1500);
        assert_eq!(monitor.state(), Press::Short);

        press(&monitor, 1501);
        assert_eq!(monitor.state(), Press::Long);
    }

    #[test]
    fn test_state_clears_after_read() {
        let monitor = monitor();
        press(&monitor, 100);
        assert_eq!(monitor.state(), Press::Short);
        assert_eq!(monitor.state(), Press::Low);

        press(&monitor, 2000);
        assert_eq!(monitor.state(), Press::Long);
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_held_is_not_cleared_by_read() {
        let monitor = monitor();
        monitor.on_edge(PIN, LEVEL_FALLING, Instant::from_millis(0));
        assert_eq!(monitor.state(), Press::High);
        assert_eq!(monitor.state(), Press::High);
    }

    #[test]
    fn test_rising_without_press_is_low() {
        let monitor = monitor();
        monitor.on_edge(PIN, LEVEL_RISING, Instant::from_millis(500));
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_timeout_clears_pending_press() {
        let monitor = monitor();
        monitor.on_edge(PIN, LEVEL_FALLING, Instant::from_millis(0));
        monitor.on_edge(PIN, LEVEL_TIMEOUT, Instant::from_millis(6000));
        assert_eq!(monitor.state(), Press::Low);

        // press timestamp is gone, so the late release classifies nothing
        monitor.on_edge(PIN, LEVEL_RISING, Instant::from_millis(6100));
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_any_unknown_level_is_timeout() {
        assert_eq!(Edge::from_level(7), Edge::Timeout);

        let monitor = monitor();
        press(&monitor, 100);
        monitor.on_edge(PIN, 0xff, Instant::from_millis(20_000));
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_other_pin_ignored() {
        let monitor = monitor();
        monitor.on_edge(PIN + 1, LEVEL_FALLING, Instant::from_millis(0));
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_newer_press_overwrites_unread() {
        let monitor = monitor();
        press(&monitor, 2000);
        press(&monitor, 100);
        assert_eq!(monitor.state(), Press::Short);
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_watchdog_is_four_thresholds() {
        assert_eq!(monitor().watchdog(), Duration::from_millis(6000));
    }

    #[test]
    fn test_watcher_reports_press_and_release() {
        let monitor = monitor();
        let button = ScriptedButton::new(false, &[true, false]);
        let mut watcher = EdgeWatcher::new(&monitor, button, Duration::from_millis(1));

        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::High);

        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::Short);
    }

    #[test]
    fn test_watcher_drops_bounce() {
        let monitor = monitor();
        let button = ScriptedButton::new(false, &[false]);
        let mut watcher = EdgeWatcher::new(&monitor, button, Duration::from_millis(1));

        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_watcher_watchdog_expiry() {
        let monitor = ButtonMonitor::new(PIN, Duration::from_millis(5));
        monitor.on_edge(PIN, LEVEL_FALLING, Instant::from_millis(0));

        let button = ScriptedButton::new(true, &[]);
        let mut watcher = EdgeWatcher::new(&monitor, button, Duration::from_millis(1));

        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::Low);
    }

    #[test]
    fn test_watcher_catches_change_without_edge() {
        let monitor = monitor();
        let button = ScriptedButton::new(false, &[]);
        let mut watcher = EdgeWatcher::new(&monitor, button, Duration::from_millis(1));

        watcher.button().set_pressed(true);
        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::High);

        watcher.button().set_pressed(false);
        block_on(watcher.step());
        assert_eq!(monitor.state(), Press::Short);
    }
}
