//! Rolling brightness threshold.
//!
//! A fixed ring of the last [`WINDOW_SIZE`] samples yields a moving average;
//! the host-settable bias sits on top of it. The first `WINDOW_SIZE` calls
//! average over a window partially filled with zeros — the warm-up reads low
//! on purpose, there is no fill-tracking.

/// Number of brightness samples in the rolling window.
pub const WINDOW_SIZE: usize = 150;

pub struct ThresholdEstimator {
    window: [u16; WINDOW_SIZE],
    count: usize,
    bias: i16,
}

impl ThresholdEstimator {
    pub fn new(bias: i16) -> Self {
        Self {
            window: [0; WINDOW_SIZE],
            count: 0,
            bias,
        }
    }

    /// Folds one sample into the window and returns the current crossing
    /// threshold: window average plus bias, saturated into the u16 range.
    pub fn observe(&mut self, sample: u16) -> u16 {
        self.window[self.count % WINDOW_SIZE] = sample;
        self.count = self.count.wrapping_add(1);
        let sum: u32 = self.window.iter().map(|&v| u32::from(v)).sum();
        let average = (sum / WINDOW_SIZE as u32) as i32;
        (average + i32::from(self.bias)).clamp(0, i32::from(u16::MAX)) as u16
    }

    pub fn bias(&self) -> i16 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: i16) {
        self.bias = bias;
    }
}
