//! Hardware seams for the device core.
//!
//! The controller never touches a peripheral directly; it owns boxed trait
//! objects for the five things the platform has to provide: a monotonic clock,
//! an analog brightness input, a digital trigger input, a HID sink, and the
//! byte-stream transport the protocol runs over. Production implementations
//! live in [`pi`], [`hid`] and [`serial`]; tests script the same seams through
//! [`mock`].

pub mod hid;
pub mod pi;
pub mod serial;

#[cfg(test)]
pub mod mock;

use std::time::Instant;

/// Faults raised by a peripheral. The controller treats these as tick-local:
/// they are logged and the loop keeps running.
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("brightness sensor fault: {0}")]
    Sensor(String),

    #[error("trigger input fault: {0}")]
    Trigger(String),

    #[error("HID sink fault: {0}")]
    Hid(String),

    #[error("transport fault: {0}")]
    Transport(String),
}

/// What the HID sink should actuate: a mouse button or a keyboard key,
/// identified by its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    Mouse(u8),
    Keyboard(u8),
}

/// Monotonic microsecond clock. Wrap-around is not expected within a session.
pub trait MonotonicClock: Send {
    fn now_us(&self) -> u64;
}

/// Analog brightness input. Full-scale inverted by convention: a higher value
/// means brighter (the raw photodiode reading is darker-is-higher).
pub trait BrightnessInput: Send {
    fn read_brightness(&mut self) -> Result<u16, HalError>;
}

/// Digital trigger (button) input, already normalized to active = pressed.
pub trait TriggerInput: Send {
    fn is_active(&mut self) -> Result<bool, HalError>;
}

/// Mouse/keyboard emulation sink the host application under test reacts to.
pub trait HidSink: Send {
    fn press(&mut self, target: ActionTarget) -> Result<(), HalError>;
    fn release(&mut self, target: ActionTarget) -> Result<(), HalError>;
}

/// Reliable, ordered byte stream carrying 16-byte frames in both directions.
pub trait FrameTransport: Send {
    fn bytes_available(&mut self) -> Result<usize, HalError>;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), HalError>;
    fn write_all(&mut self, buf: &[u8]) -> Result<(), HalError>;
}

/// The full set of peripherals handed to the device on construction.
pub struct Hardware {
    pub clock: Box<dyn MonotonicClock>,
    pub brightness: Box<dyn BrightnessInput>,
    pub trigger: Box<dyn TriggerInput>,
    pub hid: Box<dyn HidSink>,
    pub transport: Box<dyn FrameTransport>,
}

/// Process-lifetime monotonic clock backed by `std::time::Instant`.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
