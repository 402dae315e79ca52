//! The configured output action: which HID target a trigger edge actuates.

use crate::hal::{ActionTarget, HalError, HidSink};

/// Wire encoding of the action mode byte.
const MODE_MOUSE: u8 = 0;
const MODE_KEYBOARD: u8 = 1;

/// Host-configurable press target. Validation of both the mode and the code
/// happens here so the controller can treat an out-of-range SET_ACTION exactly
/// like an out-of-range report mode: ignore it, keep the old config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionConfig {
    target: ActionTarget,
}

impl ActionConfig {
    pub fn new(target: ActionTarget) -> Self {
        Self { target }
    }

    /// Decodes a (mode, code) pair from the wire. Mouse codes are limited to
    /// the three buttons the HID sink carries, keyboard codes to ASCII a-z.
    pub fn from_wire(mode: u8, code: u8) -> Option<Self> {
        match mode {
            MODE_MOUSE if matches!(code, 1 | 2 | 4) => {
                Some(Self::new(ActionTarget::Mouse(code)))
            }
            MODE_KEYBOARD if code.is_ascii_lowercase() => {
                Some(Self::new(ActionTarget::Keyboard(code)))
            }
            _ => None,
        }
    }

    pub fn to_wire(self) -> [u8; 2] {
        match self.target {
            ActionTarget::Mouse(code) => [MODE_MOUSE, code],
            ActionTarget::Keyboard(code) => [MODE_KEYBOARD, code],
        }
    }

    pub fn press(&self, sink: &mut dyn HidSink) -> Result<(), HalError> {
        sink.press(self.target)
    }

    pub fn release(&self, sink: &mut dyn HidSink) -> Result<(), HalError> {
        sink.release(self.target)
    }
}

impl Default for ActionConfig {
    /// Left mouse button, matching the original device profile.
    fn default() -> Self {
        Self::new(ActionTarget::Mouse(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let action = ActionConfig::from_wire(1, b'x').unwrap();
        assert_eq!(action.to_wire(), [1, b'x']);
        let action = ActionConfig::from_wire(0, 4).unwrap();
        assert_eq!(action.to_wire(), [0, 4]);
    }

    #[test]
    fn out_of_range_mode_is_rejected() {
        assert!(ActionConfig::from_wire(2, 1).is_none());
        assert!(ActionConfig::from_wire(255, b'a').is_none());
    }

    #[test]
    fn invalid_codes_are_rejected() {
        assert!(ActionConfig::from_wire(0, 3).is_none()); // no such mouse button
        assert!(ActionConfig::from_wire(1, b'A').is_none()); // uppercase
        assert!(ActionConfig::from_wire(1, 0x7F).is_none());
    }
}
