//! HID injection through a uinput virtual device.
//!
//! One virtual device carries both the three mouse buttons and the a-z key
//! range, so switching the action mode at runtime never needs a new device
//! node.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use tracing::info;

use super::{ActionTarget, HalError, HidSink};

const KEY_TABLE: [(u8, Key); 26] = [
    (b'a', Key::KEY_A),
    (b'b', Key::KEY_B),
    (b'c', Key::KEY_C),
    (b'd', Key::KEY_D),
    (b'e', Key::KEY_E),
    (b'f', Key::KEY_F),
    (b'g', Key::KEY_G),
    (b'h', Key::KEY_H),
    (b'i', Key::KEY_I),
    (b'j', Key::KEY_J),
    (b'k', Key::KEY_K),
    (b'l', Key::KEY_L),
    (b'm', Key::KEY_M),
    (b'n', Key::KEY_N),
    (b'o', Key::KEY_O),
    (b'p', Key::KEY_P),
    (b'q', Key::KEY_Q),
    (b'r', Key::KEY_R),
    (b's', Key::KEY_S),
    (b't', Key::KEY_T),
    (b'u', Key::KEY_U),
    (b'v', Key::KEY_V),
    (b'w', Key::KEY_W),
    (b'x', Key::KEY_X),
    (b'y', Key::KEY_Y),
    (b'z', Key::KEY_Z),
];

/// Virtual mouse+keyboard backed by /dev/uinput.
pub struct UinputHid {
    device: VirtualDevice,
}

impl UinputHid {
    pub fn new() -> Result<Self, HalError> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_LEFT);
        keys.insert(Key::BTN_RIGHT);
        keys.insert(Key::BTN_MIDDLE);
        for (_, key) in KEY_TABLE {
            keys.insert(key);
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| HalError::Hid(e.to_string()))?
            .name("fakeldat")
            .with_keys(&keys)
            .map_err(|e| HalError::Hid(e.to_string()))?
            .build()
            .map_err(|e| HalError::Hid(e.to_string()))?;

        info!("uinput HID sink created");
        Ok(Self { device })
    }

    fn emit(&mut self, target: ActionTarget, value: i32) -> Result<(), HalError> {
        let key = key_for(target)?;
        self.device
            .emit(&[InputEvent::new(EventType::KEY, key.code(), value)])
            .map_err(|e| HalError::Hid(e.to_string()))
    }
}

impl HidSink for UinputHid {
    fn press(&mut self, target: ActionTarget) -> Result<(), HalError> {
        self.emit(target, 1)
    }

    fn release(&mut self, target: ActionTarget) -> Result<(), HalError> {
        self.emit(target, 0)
    }
}

fn key_for(target: ActionTarget) -> Result<Key, HalError> {
    match target {
        ActionTarget::Mouse(1) => Ok(Key::BTN_LEFT),
        ActionTarget::Mouse(2) => Ok(Key::BTN_RIGHT),
        ActionTarget::Mouse(4) => Ok(Key::BTN_MIDDLE),
        ActionTarget::Mouse(code) => {
            Err(HalError::Hid(format!("unmapped mouse code {code}")))
        }
        ActionTarget::Keyboard(code) => KEY_TABLE
            .iter()
            .find(|(ascii, _)| *ascii == code)
            .map(|(_, key)| *key)
            .ok_or_else(|| HalError::Hid(format!("unmapped key code {code}"))),
    }
}
