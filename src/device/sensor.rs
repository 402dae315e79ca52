//! Brightness sensor latch.

use crate::hal::{BrightnessInput, HalError};

/// Owns the analog seam and the one sample the rest of the tick works from.
/// `measure` is called exactly once per tick; everything else reads the latch.
pub struct Sensor {
    input: Box<dyn BrightnessInput>,
    brightness: u16,
}

impl Sensor {
    pub fn new(input: Box<dyn BrightnessInput>) -> Self {
        Self {
            input,
            brightness: 0,
        }
    }

    pub fn measure(&mut self) -> Result<(), HalError> {
        self.brightness = self.input.read_brightness()?;
        Ok(())
    }

    pub fn brightness(&self) -> u16 {
        self.brightness
    }
}
