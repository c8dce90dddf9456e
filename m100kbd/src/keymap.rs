//! Key codes and the translation table of the Model 100 matrix.

use std::fmt::{Display, Formatter};
use crate::config::{COLUMNS, ROWS};

/// Linux input key codes (`linux/input-event-codes.h`) produced by this keyboard.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum KeyCode {
    Esc = 1,
    N1 = 2,
    N2 = 3,
    N3 = 4,
    N4 = 5,
    N5 = 6,
    N6 = 7,
    N7 = 8,
    N8 = 9,
    N9 = 10,
    N0 = 11,
    Minus = 12,
    Equal = 13,
    Backspace = 14,
    Tab = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LeftBrace = 26,
    RightBrace = 27,
    Enter = 28,
    LeftCtrl = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    Semicolon = 39,
    Apostrophe = 40,
    LeftShift = 42,
    Backslash = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    Comma = 51,
    Dot = 52,
    Slash = 53,
    LeftAlt = 56,
    Space = 57,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F11 = 87,
    F12 = 88,
    Up = 103,
    PageUp = 104,
    Left = 105,
    Right = 106,
    Down = 108,
    PageDown = 109,
    Delete = 111,
}

impl KeyCode {
    /// Every key this keyboard can emit symbolically.
    pub const ALL: [KeyCode; 70] = {
        use KeyCode::*;
        [
            Esc, N1, N2, N3, N4, N5, N6, N7, N8, N9, N0, Minus, Equal, Backspace, Tab,
            Q, W, E, R, T, Y, U, I, O, P, LeftBrace, RightBrace, Enter, LeftCtrl,
            A, S, D, F, G, H, J, K, L, Semicolon, Apostrophe, LeftShift, Backslash,
            Z, X, C, V, B, N, M, Comma, Dot, Slash, LeftAlt, Space,
            F1, F2, F3, F4, F5, F6, F7, F11, F12,
            Up, PageUp, Left, Right, Down, PageDown, Delete,
        ]
    };

    /// The numeric Linux key code.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// The `KEY_*` name of the key, for diagnostics.
    pub const fn name(self) -> &'static str {
        use KeyCode::*;

        match self {
            Esc => "KEY_ESC",
            N1 => "KEY_1",
            N2 => "KEY_2",
            N3 => "KEY_3",
            N4 => "KEY_4",
            N5 => "KEY_5",
            N6 => "KEY_6",
            N7 => "KEY_7",
            N8 => "KEY_8",
            N9 => "KEY_9",
            N0 => "KEY_0",
            Minus => "KEY_MINUS",
            Equal => "KEY_EQUAL",
            Backspace => "KEY_BACKSPACE",
            Tab => "KEY_TAB",
            Q => "KEY_Q",
            W => "KEY_W",
            E => "KEY_E",
            R => "KEY_R",
            T => "KEY_T",
            Y => "KEY_Y",
            U => "KEY_U",
            I => "KEY_I",
            O => "KEY_O",
            P => "KEY_P",
            LeftBrace => "KEY_LEFTBRACE",
            RightBrace => "KEY_RIGHTBRACE",
            Enter => "KEY_ENTER",
            LeftCtrl => "KEY_LEFTCTRL",
            A => "KEY_A",
            S => "KEY_S",
            D => "KEY_D",
            F => "KEY_F",
            G => "KEY_G",
            H => "KEY_H",
            J => "KEY_J",
            K => "KEY_K",
            L => "KEY_L",
            Semicolon => "KEY_SEMICOLON",
            Apostrophe => "KEY_APOSTROPHE",
            LeftShift => "KEY_LEFTSHIFT",
            Backslash => "KEY_BACKSLASH",
            Z => "KEY_Z",
            X => "KEY_X",
            C => "KEY_C",
            V => "KEY_V",
            B => "KEY_B",
            N => "KEY_N",
            M => "KEY_M",
            Comma => "KEY_COMMA",
            Dot => "KEY_DOT",
            Slash => "KEY_SLASH",
            LeftAlt => "KEY_LEFTALT",
            Space => "KEY_SPACE",
            F1 => "KEY_F1",
            F2 => "KEY_F2",
            F3 => "KEY_F3",
            F4 => "KEY_F4",
            F5 => "KEY_F5",
            F6 => "KEY_F6",
            F7 => "KEY_F7",
            F11 => "KEY_F11",
            F12 => "KEY_F12",
            Up => "KEY_UP",
            PageUp => "KEY_PAGEUP",
            Left => "KEY_LEFT",
            Right => "KEY_RIGHT",
            Down => "KEY_DOWN",
            PageDown => "KEY_PAGEDOWN",
            Delete => "KEY_DELETE",
        }
    }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A key switch location in the matrix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MatrixPosition {
    pub row: usize,
    pub column: usize,
}

impl MatrixPosition {
    pub const fn new(row: usize, column: usize) -> Self {
        MatrixPosition { row, column }
    }
}

impl Display for MatrixPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {} Col {}", self.row, self.column)
    }
}

/// The key assignment of every matrix position, indexed `[row][column]`.
///
/// The modifier column entries of rows 0, 1, 2, 3 and 5 are never looked up: those
/// switches arm a latch instead of producing a key.
pub const KEYMAP: [[KeyCode; COLUMNS]; ROWS] = {
    use KeyCode::*;
    [
        [Z, A, Q, O, N1, N9, Backspace, F1, LeftShift],
        [X, S, W, P, N2, N0, Up, F2, LeftCtrl],
        [C, D, E, Equal, N3, Semicolon, Down, F3, LeftAlt],
        [V, F, R, Backslash, N4, Apostrophe, Left, F4, LeftShift],
        [B, G, T, Comma, N5, Minus, Right, F5, LeftShift],
        [N, H, Y, Dot, N6, LeftBrace, Tab, F6, LeftShift],
        [M, J, U, Slash, N7, Space, Esc, F7, LeftShift],
        [L, K, I, RightBrace, N8, Delete, Enter, F11, F12],
    ]
};

/// Translates a matrix position to its key code.
///
/// The scanner only produces positions inside the matrix.
pub fn translate(position: MatrixPosition) -> KeyCode {
    KEYMAP[position.row][position.column]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn translates_letters_and_digits() {
        assert_eq!(translate(MatrixPosition::new(0, 2)), KeyCode::Q);
        assert_eq!(translate(MatrixPosition::new(7, 0)), KeyCode::L);
        assert_eq!(translate(MatrixPosition::new(3, 4)), KeyCode::N4);
        assert_eq!(translate(MatrixPosition::new(1, 5)), KeyCode::N0);
    }

    #[test]
    fn translates_modifier_column() {
        assert_eq!(translate(MatrixPosition::new(4, 8)), KeyCode::LeftShift);
        assert_eq!(translate(MatrixPosition::new(6, 8)), KeyCode::LeftShift);
        assert_eq!(translate(MatrixPosition::new(7, 8)), KeyCode::F12);
        assert_eq!(translate(MatrixPosition::new(1, 8)), KeyCode::LeftCtrl);
    }

    #[test]
    fn every_position_is_mapped() {
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let key = translate(MatrixPosition::new(row, column));
                assert!(KeyCode::ALL.contains(&key), "{} missing from ALL", key);
            }
        }
    }

    #[test]
    fn all_keys_are_unique() {
        let codes: HashSet<u16> = KeyCode::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), KeyCode::ALL.len());
    }

    #[test]
    fn names_match_linux_identifiers() {
        assert_eq!(KeyCode::Q.name(), "KEY_Q");
        assert_eq!(KeyCode::N9.name(), "KEY_9");
        assert_eq!(KeyCode::PageDown.to_string(), "KEY_PAGEDOWN");
        assert_eq!(KeyCode::Delete.code(), 111);
    }

    #[test]
    fn positions_display_like_diagnostics() {
        let position = MatrixPosition::new(0, 2);
        assert_eq!(position.to_string(), "Row 0 Col 2");
    }
}
