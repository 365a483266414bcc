//! Keyboard state and key mapping.
//!
//! Only the keys the diagram actually reacts to are modeled: text entry for
//! the rename editor, cursor movement within it, and Enter/Escape for
//! committing or dismissing overlays. Everything else maps to `Unknown`.

use std::collections::HashSet;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard modifier keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const fn empty() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
            super_key: false,
        }
    }

    pub fn from_winit(mods: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: mods.shift_key(),
            ctrl: mods.control_key(),
            alt: mods.alt_key(),
            super_key: mods.super_key(),
        }
    }

    /// Check if only ctrl is pressed (for Ctrl+C, etc.)
    pub fn only_ctrl(&self) -> bool {
        self.ctrl && !self.shift && !self.alt && !self.super_key
    }
}

/// A logical key representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Numbers
    Num0, Num1, Num2, Num3, Num4,
    Num5, Num6, Num7, Num8, Num9,

    // Caret movement inside the rename editor
    Left, Right, Home, End,

    // Editing
    Backspace, Delete, Enter,

    // Overlay dismissal
    Escape,
    Space,

    // Punctuation
    Minus,
    Equals,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Grave,

    // Unknown/other
    Unknown,
}

impl Key {
    /// Convert from winit key codes
    pub fn from_winit(physical: &PhysicalKey, _logical: &winit::keyboard::Key) -> Self {
        let PhysicalKey::Code(code) = physical else {
            return Key::Unknown;
        };
        match code {
            KeyCode::KeyA => Key::A,
            KeyCode::KeyB => Key::B,
            KeyCode::KeyC => Key::C,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyF => Key::F,
            KeyCode::KeyG => Key::G,
            KeyCode::KeyH => Key::H,
            KeyCode::KeyI => Key::I,
            KeyCode::KeyJ => Key::J,
            KeyCode::KeyK => Key::K,
            KeyCode::KeyL => Key::L,
            KeyCode::KeyM => Key::M,
            KeyCode::KeyN => Key::N,
            KeyCode::KeyO => Key::O,
            KeyCode::KeyP => Key::P,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyR => Key::R,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyT => Key::T,
            KeyCode::KeyU => Key::U,
            KeyCode::KeyV => Key::V,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyX => Key::X,
            KeyCode::KeyY => Key::Y,
            KeyCode::KeyZ => Key::Z,

            KeyCode::Digit0 => Key::Num0,
            KeyCode::Digit1 => Key::Num1,
            KeyCode::Digit2 => Key::Num2,
            KeyCode::Digit3 => Key::Num3,
            KeyCode::Digit4 => Key::Num4,
            KeyCode::Digit5 => Key::Num5,
            KeyCode::Digit6 => Key::Num6,
            KeyCode::Digit7 => Key::Num7,
            KeyCode::Digit8 => Key::Num8,
            KeyCode::Digit9 => Key::Num9,

            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,

            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,

            KeyCode::Escape => Key::Escape,
            KeyCode::Space => Key::Space,

            KeyCode::Minus => Key::Minus,
            KeyCode::Equal => Key::Equals,
            KeyCode::BracketLeft => Key::LeftBracket,
            KeyCode::BracketRight => Key::RightBracket,
            KeyCode::Backslash => Key::Backslash,
            KeyCode::Semicolon => Key::Semicolon,
            KeyCode::Quote => Key::Quote,
            KeyCode::Comma => Key::Comma,
            KeyCode::Period => Key::Period,
            KeyCode::Slash => Key::Slash,
            KeyCode::Backquote => Key::Grave,

            _ => Key::Unknown,
        }
    }

    /// Check if this key produces a character in the rename editor
    pub fn is_printable(&self) -> bool {
        !matches!(
            self,
            Key::Left
                | Key::Right
                | Key::Home
                | Key::End
                | Key::Backspace
                | Key::Delete
                | Key::Enter
                | Key::Escape
                | Key::Unknown
        )
    }
}

/// Tracks which keys are currently held
pub struct KeyState {
    pressed: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
        }
    }

    pub fn set_pressed(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_maps_from_both_enter_keys() {
        let logical = winit::keyboard::Key::Unidentified(winit::keyboard::NativeKey::Unidentified);
        assert_eq!(
            Key::from_winit(&PhysicalKey::Code(KeyCode::Enter), &logical),
            Key::Enter
        );
        assert_eq!(
            Key::from_winit(&PhysicalKey::Code(KeyCode::NumpadEnter), &logical),
            Key::Enter
        );
    }

    #[test]
    fn function_keys_are_not_modeled() {
        let logical = winit::keyboard::Key::Unidentified(winit::keyboard::NativeKey::Unidentified);
        assert_eq!(
            Key::from_winit(&PhysicalKey::Code(KeyCode::F5), &logical),
            Key::Unknown
        );
    }

    #[test]
    fn navigation_keys_are_not_printable() {
        assert!(Key::A.is_printable());
        assert!(Key::Space.is_printable());
        assert!(!Key::Home.is_printable());
        assert!(!Key::Escape.is_printable());
    }
}
