//! Raspberry Pi peripheral bindings via rppal.
//!
//! The photodiode hangs off an MCP3008 on SPI0 (the Pi has no on-board ADC)
//! and the trigger button is a plain GPIO with the internal pull-up, wired
//! active-low.

use rppal::gpio::{Gpio, InputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::info;

use super::{BrightnessInput, HalError, TriggerInput};

/// ADC sample width. The MCP3008 is a 10-bit converter.
pub const ADC_RESOLUTION_BITS: u8 = 10;

const ADC_FULL_SCALE: u16 = (1 << ADC_RESOLUTION_BITS) - 1;

/// Photodiode front-end on one MCP3008 channel.
///
/// The raw conversion is darker-is-higher, so the reading is inverted against
/// full scale before it leaves this type: callers see brighter-is-higher.
pub struct Mcp3008Brightness {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Brightness {
    pub fn new(channel: u8) -> Result<Self, HalError> {
        if channel > 7 {
            return Err(HalError::Sensor(format!(
                "MCP3008 has channels 0-7, got {channel}"
            )));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_350_000, Mode::Mode0)
            .map_err(|e| HalError::Sensor(e.to_string()))?;
        info!("MCP3008 brightness input ready on SPI0 channel {channel}");
        Ok(Self { spi, channel })
    }
}

impl BrightnessInput for Mcp3008Brightness {
    fn read_brightness(&mut self) -> Result<u16, HalError> {
        // Single-ended conversion: start bit, SGL + channel, one clocking byte.
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HalError::Sensor(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        Ok(raw ^ ADC_FULL_SCALE)
    }
}

/// Active-low momentary button on a GPIO pin with the internal pull-up.
pub struct GpioTrigger {
    pin: InputPin,
}

impl GpioTrigger {
    pub fn new(pin: u8) -> Result<Self, HalError> {
        let pin = Gpio::new()
            .and_then(|gpio| gpio.get(pin))
            .map_err(|e| HalError::Trigger(e.to_string()))?
            .into_input_pullup();
        info!("trigger button ready on GPIO {}", pin.pin());
        Ok(Self { pin })
    }
}

impl TriggerInput for GpioTrigger {
    fn is_active(&mut self) -> Result<bool, HalError> {
        Ok(self.pin.is_low())
    }
}
