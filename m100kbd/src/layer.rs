//! Sticky modifier/layer latches and how they shape the next key.
//!
//! The Model 100 wires SHIFT, CTRL, GRPH (alt) and CODE to the modifier column. A
//! closure there arms a latch, and the next data key consumes it.

use log::debug;
use crate::keymap::{KeyCode, MatrixPosition};

/// Event type of raw key events (`EV_KEY`).
pub const RAW_KEY_EVENT: u16 = 0x01;
/// Scan code sent for CODE + `\`, which has no symbolic key.
pub const CODE_RAW_SCAN_CODE: u16 = 124;

/// A latch armed from the modifier column.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Latch {
    Control,
    Shift,
    Alt,
    Code,
}

impl Latch {
    /// The latch armed by a modifier column closure on `row`, if that row arms one.
    ///
    /// Rows 4, 6 and 7 carry ordinary keys on the modifier column instead.
    pub fn for_row(row: usize) -> Option<Latch> {
        match row {
            0 | 5 => Some(Latch::Shift),
            1 => Some(Latch::Control),
            2 => Some(Latch::Alt),
            3 => Some(Latch::Code),
            _ => None,
        }
    }
}

/// The four independent latches.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ModifierState {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
    pub code: bool,
}

impl ModifierState {
    pub fn set(&mut self, latch: Latch) {
        match latch {
            Latch::Control => self.control = true,
            Latch::Shift => self.shift = true,
            Latch::Alt => self.alt = true,
            Latch::Code => self.code = true,
        }
    }

    pub fn clear(&mut self, latch: Latch) {
        match latch {
            Latch::Control => self.control = false,
            Latch::Shift => self.shift = false,
            Latch::Alt => self.alt = false,
            Latch::Code => self.code = false,
        }
    }

    pub fn is_set(&self, latch: Latch) -> bool {
        match latch {
            Latch::Control => self.control,
            Latch::Shift => self.shift,
            Latch::Alt => self.alt,
            Latch::Code => self.code,
        }
    }

    /// Drops every latch.
    pub fn release_all(&mut self) {
        *self = ModifierState::default();
    }

    pub fn any(&self) -> bool {
        self.control || self.shift || self.alt || self.code
    }

    /// The layer the next key resolves in.
    ///
    /// With several latches armed, control wins over shift, shift over alt and alt
    /// over code. Only the winning latch is consumed; the others stay armed.
    pub fn layer(&self) -> Layer {
        if self.control {
            Layer::ControlArmed
        } else if self.shift {
            Layer::ShiftArmed
        } else if self.alt {
            Layer::AltArmed
        } else if self.code {
            Layer::CodeArmed
        } else {
            Layer::Idle
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Layer {
    Idle,
    ControlArmed,
    ShiftArmed,
    AltArmed,
    CodeArmed,
}

impl Layer {
    /// The latch consumed when resolving a key in this layer.
    pub fn latch(self) -> Option<Latch> {
        match self {
            Layer::Idle => None,
            Layer::ControlArmed => Some(Latch::Control),
            Layer::ShiftArmed => Some(Latch::Shift),
            Layer::AltArmed => Some(Latch::Alt),
            Layer::CodeArmed => Some(Latch::Code),
        }
    }
}

/// What to send to the host for one resolved key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Press and release a key.
    Click(KeyCode),
    /// Press `modifier`, click `key`, release `modifier`.
    Combo { modifier: KeyCode, key: KeyCode },
    /// A key with no symbolic code.
    Raw { type_code: u16, scan_code: u16 },
    /// Nothing is sent.
    Nothing,
}

/// Special functions of the CODE layer, addressed by matrix position.
const CODE_LAYER: [(MatrixPosition, Action); 3] = [
    // CODE + space
    (MatrixPosition::new(6, 5), Action::Click(KeyCode::PageUp)),
    // CODE + delete
    (MatrixPosition::new(7, 5), Action::Click(KeyCode::PageDown)),
    // CODE + backslash
    (MatrixPosition::new(3, 3), Action::Raw { type_code: RAW_KEY_EVENT, scan_code: CODE_RAW_SCAN_CODE }),
];

fn code_layer_action(position: MatrixPosition) -> Action {
    CODE_LAYER
        .iter()
        .find(|(p, _)| *p == position)
        .map_or(Action::Nothing, |&(_, action)| action)
}

/// Resolves a key through the armed layer, consuming the latch that layer used.
pub fn resolve(
    mut state: ModifierState,
    position: MatrixPosition,
    key: KeyCode,
) -> (ModifierState, Action) {
    let layer = state.layer();
    let action = match layer {
        Layer::Idle => Action::Click(key),
        Layer::ControlArmed => Action::Combo { modifier: KeyCode::LeftCtrl, key },
        Layer::ShiftArmed => Action::Combo { modifier: KeyCode::LeftShift, key },
        Layer::AltArmed => Action::Combo { modifier: KeyCode::LeftAlt, key },
        Layer::CodeArmed => {
            let action = code_layer_action(position);
            if action == Action::Nothing {
                debug!("{} has no CODE function.", position);
            }
            action
        }
    };

    if let Some(latch) = layer.latch() {
        state.clear(latch);
    }

    debug!("{:?} resolves {} to {:?}.", layer, key, action);

    (state, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(latch: Latch) -> ModifierState {
        let mut state = ModifierState::default();
        state.set(latch);
        state
    }

    #[test]
    fn idle_emits_plain_click() {
        let (state, action) = resolve(ModifierState::default(), MatrixPosition::new(0, 2), KeyCode::Q);
        assert_eq!(action, Action::Click(KeyCode::Q));
        assert_eq!(state, ModifierState::default());
    }

    #[test]
    fn control_chords_and_clears() {
        let (state, action) = resolve(armed(Latch::Control), MatrixPosition::new(0, 2), KeyCode::Q);
        assert_eq!(action, Action::Combo { modifier: KeyCode::LeftCtrl, key: KeyCode::Q });
        assert!(!state.any());
    }

    #[test]
    fn shift_and_alt_chord() {
        let (state, action) = resolve(armed(Latch::Shift), MatrixPosition::new(1, 1), KeyCode::S);
        assert_eq!(action, Action::Combo { modifier: KeyCode::LeftShift, key: KeyCode::S });
        assert!(!state.shift);

        let (state, action) = resolve(armed(Latch::Alt), MatrixPosition::new(2, 1), KeyCode::D);
        assert_eq!(action, Action::Combo { modifier: KeyCode::LeftAlt, key: KeyCode::D });
        assert!(!state.alt);
    }

    #[test]
    fn control_wins_over_shift_and_leaves_it_armed() {
        let mut state = armed(Latch::Control);
        state.set(Latch::Shift);

        let (state, action) = resolve(state, MatrixPosition::new(1, 2), KeyCode::W);
        assert_eq!(action, Action::Combo { modifier: KeyCode::LeftCtrl, key: KeyCode::W });
        assert!(!state.control);
        assert!(state.shift);
        assert_eq!(state.layer(), Layer::ShiftArmed);
    }

    #[test]
    fn alt_wins_over_code() {
        let mut state = armed(Latch::Code);
        state.set(Latch::Alt);
        assert_eq!(state.layer(), Layer::AltArmed);

        let (state, _) = resolve(state, MatrixPosition::new(6, 5), KeyCode::Space);
        assert!(state.code);
    }

    #[test]
    fn code_layer_page_keys() {
        let (state, action) = resolve(armed(Latch::Code), MatrixPosition::new(6, 5), KeyCode::Space);
        assert_eq!(action, Action::Click(KeyCode::PageUp));
        assert!(!state.code);

        let (_, action) = resolve(armed(Latch::Code), MatrixPosition::new(7, 5), KeyCode::Delete);
        assert_eq!(action, Action::Click(KeyCode::PageDown));
    }

    #[test]
    fn code_layer_raw_key() {
        let (_, action) = resolve(armed(Latch::Code), MatrixPosition::new(3, 3), KeyCode::Backslash);
        assert_eq!(action, Action::Raw { type_code: 0x01, scan_code: 124 });
    }

    #[test]
    fn unmapped_code_position_emits_nothing_and_clears() {
        let (state, action) = resolve(armed(Latch::Code), MatrixPosition::new(6, 6), KeyCode::Esc);
        assert_eq!(action, Action::Nothing);
        assert!(!state.any());
    }

    #[test]
    fn latch_rows() {
        assert_eq!(Latch::for_row(0), Some(Latch::Shift));
        assert_eq!(Latch::for_row(1), Some(Latch::Control));
        assert_eq!(Latch::for_row(2), Some(Latch::Alt));
        assert_eq!(Latch::for_row(3), Some(Latch::Code));
        assert_eq!(Latch::for_row(5), Some(Latch::Shift));
        for row in [4, 6, 7] {
            assert_eq!(Latch::for_row(row), None);
        }
    }

    #[test]
    fn release_all_clears_every_latch() {
        let mut state = ModifierState { control: true, shift: true, alt: true, code: true };
        state.release_all();
        assert!(!state.any());
        assert_eq!(state.layer(), Layer::Idle);
    }
}
