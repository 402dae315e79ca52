//! Manual trigger (button) edge detection.

use crate::hal::{HalError, TriggerInput};

/// Two-sample edge detector over the digital trigger seam. The HAL impl has
/// already normalized polarity, so `is_active` means "pressed".
pub struct TriggerButton {
    input: Box<dyn TriggerInput>,
    last: bool,
    current: bool,
}

impl TriggerButton {
    pub fn new(input: Box<dyn TriggerInput>) -> Self {
        Self {
            input,
            last: false,
            current: false,
        }
    }

    pub fn measure(&mut self) -> Result<(), HalError> {
        self.last = self.current;
        self.current = self.input.is_active()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.current
    }

    /// True when the most recent `measure` changed the level.
    pub fn changed(&self) -> bool {
        self.last != self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::MockTrigger;

    #[test]
    fn detects_both_edges() {
        let level = MockTrigger::new(false);
        let mut button = TriggerButton::new(Box::new(level.clone()));

        button.measure().unwrap();
        assert!(!button.is_active());
        assert!(!button.changed());

        level.set_active(true);
        button.measure().unwrap();
        assert!(button.is_active());
        assert!(button.changed());

        // held: no edge
        button.measure().unwrap();
        assert!(button.is_active());
        assert!(!button.changed());

        level.set_active(false);
        button.measure().unwrap();
        assert!(!button.is_active());
        assert!(button.changed());
    }
}
