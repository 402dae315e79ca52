//! Scripted peripheral doubles for unit tests.
//!
//! Each double is driven through a cloneable handle so a test can keep feeding
//! inputs and inspecting outputs after the double itself has been boxed and
//! moved into the device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    ActionTarget, BrightnessInput, FrameTransport, HalError, HidSink, MonotonicClock, TriggerInput,
};

/// Manually advanced clock.
#[derive(Clone)]
pub struct MockClock {
    now: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new(start_us: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_us)),
        }
    }

    pub fn advance(&self, delta_us: u64) {
        self.now.fetch_add(delta_us, Ordering::SeqCst);
    }
}

impl MonotonicClock for MockClock {
    fn now_us(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Brightness input fed from a queue; repeats the last value once drained.
#[derive(Clone)]
pub struct MockBrightness {
    samples: Arc<Mutex<VecDeque<u16>>>,
    last: Arc<AtomicU64>,
}

impl MockBrightness {
    pub fn new(initial: u16) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(AtomicU64::new(u64::from(initial))),
        }
    }

    pub fn push(&self, sample: u16) {
        self.samples.lock().unwrap().push_back(sample);
    }

    pub fn push_all(&self, samples: impl IntoIterator<Item = u16>) {
        let mut queue = self.samples.lock().unwrap();
        queue.extend(samples);
    }
}

impl BrightnessInput for MockBrightness {
    fn read_brightness(&mut self) -> Result<u16, HalError> {
        if let Some(next) = self.samples.lock().unwrap().pop_front() {
            self.last.store(u64::from(next), Ordering::SeqCst);
        }
        Ok(self.last.load(Ordering::SeqCst) as u16)
    }
}

/// Trigger input with a settable level.
#[derive(Clone)]
pub struct MockTrigger {
    active: Arc<Mutex<bool>>,
}

impl MockTrigger {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(Mutex::new(active)),
        }
    }

    pub fn set_active(&self, active: bool) {
        *self.active.lock().unwrap() = active;
    }
}

impl TriggerInput for MockTrigger {
    fn is_active(&mut self) -> Result<bool, HalError> {
        Ok(*self.active.lock().unwrap())
    }
}

/// Records every press/release in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidEvent {
    Press(ActionTarget),
    Release(ActionTarget),
}

#[derive(Clone)]
pub struct MockHid {
    events: Arc<Mutex<Vec<HidEvent>>>,
}

impl MockHid {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<HidEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Presses minus releases; > 0 means the output is currently held down.
    pub fn held_count(&self) -> i32 {
        self.events.lock().unwrap().iter().fold(0, |acc, e| match e {
            HidEvent::Press(_) => acc + 1,
            HidEvent::Release(_) => acc - 1,
        })
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl HidSink for MockHid {
    fn press(&mut self, target: ActionTarget) -> Result<(), HalError> {
        self.events.lock().unwrap().push(HidEvent::Press(target));
        Ok(())
    }

    fn release(&mut self, target: ActionTarget) -> Result<(), HalError> {
        self.events.lock().unwrap().push(HidEvent::Release(target));
        Ok(())
    }
}

/// In-memory transport: the test enqueues host->device bytes and reads back
/// everything the device wrote.
#[derive(Clone)]
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<u8>>>,
    outbound: Arc<Mutex<Vec<u8>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            outbound: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.inbound.lock().unwrap().extend(bytes.iter().copied());
    }

    /// Drains and returns everything written by the device so far.
    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut *self.outbound.lock().unwrap())
    }

    /// Splits the outbound stream into 16-byte frames.
    pub fn take_frames(&self) -> Vec<[u8; crate::protocol::FRAME_LEN]> {
        self.take_outbound()
            .chunks(crate::protocol::FRAME_LEN)
            .filter_map(|chunk| chunk.try_into().ok())
            .collect()
    }
}

impl FrameTransport for MockTransport {
    fn bytes_available(&mut self) -> Result<usize, HalError> {
        Ok(self.inbound.lock().unwrap().len())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
        let mut inbound = self.inbound.lock().unwrap();
        if inbound.len() < buf.len() {
            return Err(HalError::Transport("short read".into()));
        }
        for slot in buf.iter_mut() {
            *slot = inbound.pop_front().unwrap();
        }
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), HalError> {
        self.outbound.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }
}
