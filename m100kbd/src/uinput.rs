//! Virtual keyboard on the Linux input layer, via `/dev/uinput`.

use std::fmt::{Debug, Formatter};
use std::io;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use log::{info, trace};
use crate::emitter::Emitter;
use crate::keymap::KeyCode;
use crate::layer::CODE_RAW_SCAN_CODE;

const KEY_PRESS: i32 = 1;
const KEY_RELEASE: i32 = 0;

fn key_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, code, value)
}

fn click_sequence(code: u16) -> [InputEvent; 2] {
    [key_event(code, KEY_PRESS), key_event(code, KEY_RELEASE)]
}

fn combo_sequence(modifier: u16, code: u16) -> [InputEvent; 4] {
    [
        key_event(modifier, KEY_PRESS),
        key_event(code, KEY_PRESS),
        key_event(code, KEY_RELEASE),
        key_event(modifier, KEY_RELEASE),
    ]
}

/// The set of keys the virtual device announces.
fn supported_keys() -> AttributeSet<Key> {
    let mut keys = AttributeSet::<Key>::new();
    for key in KeyCode::ALL {
        keys.insert(Key::new(key.code()));
    }
    keys.insert(Key::new(CODE_RAW_SCAN_CODE));
    keys
}

/// [Emitter] that injects events through a uinput virtual keyboard.
///
/// The device disappears from the host when this is dropped.
pub struct UinputEmitter {
    name: String,
    device: VirtualDevice,
}

impl UinputEmitter {
    pub fn new(name: &str) -> io::Result<Self> {
        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&supported_keys())?
            .build()?;
        info!("Created uinput keyboard device {:?}.", name);
        Ok(UinputEmitter {
            name: name.to_owned(),
            device,
        })
    }

    /// Sends each event in its own report, so the host sees every transition.
    fn send(&mut self, events: &[InputEvent]) -> io::Result<()> {
        for event in events {
            trace!("uinput <- type {:?} code {} value {}", event.event_type(), event.code(), event.value());
            self.device.emit(std::slice::from_ref(event))?;
        }
        Ok(())
    }
}

impl Debug for UinputEmitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "UinputEmitter({:?})", self.name)
    }
}

impl Emitter for UinputEmitter {
    fn click(&mut self, key: KeyCode) -> io::Result<()> {
        self.send(&click_sequence(key.code()))
    }

    fn combo(&mut self, modifier: KeyCode, key: KeyCode) -> io::Result<()> {
        self.send(&combo_sequence(modifier.code(), key.code()))
    }

    fn raw_event(&mut self, type_code: u16, scan_code: u16) -> io::Result<()> {
        let events = [
            InputEvent::new(EventType(type_code), scan_code, KEY_PRESS),
            InputEvent::new(EventType(type_code), scan_code, KEY_RELEASE),
        ];
        self.send(&events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(events: &[InputEvent]) -> Vec<(u16, i32)> {
        events.iter().map(|e| (e.code(), e.value())).collect()
    }

    #[test]
    fn click_is_press_then_release() {
        let events = click_sequence(KeyCode::A.code());
        assert!(events.iter().all(|e| e.event_type() == EventType::KEY));
        assert_eq!(summary(&events), vec![(30, 1), (30, 0)]);
    }

    #[test]
    fn combo_wraps_key_in_modifier() {
        let events = combo_sequence(KeyCode::LeftCtrl.code(), KeyCode::Q.code());
        assert_eq!(summary(&events), vec![(29, 1), (16, 1), (16, 0), (29, 0)]);
    }

    #[test]
    fn device_announces_table_and_special_keys() {
        let keys = supported_keys();
        assert!(keys.contains(Key::KEY_Q));
        assert!(keys.contains(Key::KEY_PAGEUP));
        assert!(keys.contains(Key::KEY_PAGEDOWN));
        assert!(keys.contains(Key::new(124)));
        assert_eq!(keys.iter().count(), KeyCode::ALL.len() + 1);
    }
}
