use std::io;
use crate::keymap::KeyCode;
use crate::layer::Action;

/// Sink for the key events sent to the host.
pub trait Emitter {
    /// Presses and releases `key`.
    fn click(&mut self, key: KeyCode) -> io::Result<()>;
    /// Presses `modifier`, presses and releases `key`, then releases `modifier`.
    fn combo(&mut self, modifier: KeyCode, key: KeyCode) -> io::Result<()>;
    /// Sends a key that has no [KeyCode], by raw event type and scan code.
    fn raw_event(&mut self, type_code: u16, scan_code: u16) -> io::Result<()>;

    /// Sends whatever `action` calls for.
    fn perform(&mut self, action: Action) -> io::Result<()> {
        match action {
            Action::Click(key) => self.click(key),
            Action::Combo { modifier, key } => self.combo(modifier, key),
            Action::Raw { type_code, scan_code } => self.raw_event(type_code, scan_code),
            Action::Nothing => Ok(()),
        }
    }
}
