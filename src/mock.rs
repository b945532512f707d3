//! Test doubles for the hardware traits.

use core::cell::Cell;
use core::convert::Infallible;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use smart_leds::SmartLedsWrite;

use crate::color::Color;
use crate::hardware::traits::{Button, PowerControl};

/// `smart-leds` writer that keeps every frame it was handed.
#[derive(Default)]
pub struct RecordingWriter {
    frames: Vec<Vec<Color>>,
}

impl RecordingWriter {
    pub fn flushes(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Vec<Color>] {
        &self.frames
    }

    pub fn last_frame(&self) -> &[Color] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl SmartLedsWrite for RecordingWriter {
    type Error = Infallible;
    type Color = Color;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frames.push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}

/// Delay that returns immediately and remembers what it was asked for.
#[derive(Default)]
pub struct RecordingDelay {
    waits_ns: Vec<u32>,
}

impl RecordingDelay {
    pub fn waits_ns(&self) -> &[u32] {
        &self.waits_ns
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ns.push(ns);
    }
}

/// Button that replays a fixed list of levels, one per edge, then goes quiet.
pub struct ScriptedButton {
    levels: Vec<bool>,
    next: usize,
    pressed: Cell<bool>,
}

impl ScriptedButton {
    /// `levels` are the settled "pressed" readings after each edge.
    pub fn new(pressed: bool, levels: &[bool]) -> Self {
        Self {
            levels: levels.to_vec(),
            next: 0,
            pressed: Cell::new(pressed),
        }
    }

    /// Change the level without raising an edge.
    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.set(pressed);
    }
}

impl Button for ScriptedButton {
    async fn wait_for_any_edge(&mut self) {
        match self.levels.get(self.next) {
            Some(&level) => {
                self.next += 1;
                self.pressed.set(level);
            }
            None => core::future::pending::<()>().await,
        }
    }

    fn is_pressed(&self) -> bool {
        self.pressed.get()
    }
}

/// Power latch that counts how often it was released.
#[derive(Default)]
pub struct MockPower {
    pub offs: usize,
    pub fail: bool,
}

impl PowerControl for MockPower {
    type Error = ();

    fn power_off(&mut self) -> Result<(), ()> {
        self.offs += 1;
        if self.fail { Err(()) } else { Ok(()) }
    }
}
