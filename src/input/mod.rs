//! Input handling.
//!
//! Translates winit window events into application-level `InputEvent`s and
//! keeps the running keyboard/mouse state needed to attach modifiers and
//! pointer coordinates to them.

mod keyboard;
mod mouse;

pub use keyboard::{Key, KeyState, Modifiers};
pub use mouse::{MouseButton, MouseState};

/// A unified input event for the application
#[derive(Clone, Debug)]
pub enum InputEvent {
    /// A key was pressed or released
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        /// Character text from winit's logical key (for text insertion fallback
        /// when IME doesn't fire on X11/Wayland)
        text: Option<String>,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },

    /// Text input (for text fields)
    TextInput(String),

    /// Mouse button pressed
    MouseDown {
        button: MouseButton,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Mouse button released
    MouseUp {
        button: MouseButton,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Mouse moved
    MouseMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Mouse scroll (wheel)
    Scroll {
        delta_x: f32,
        delta_y: f32,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Get the position of a mouse event, if applicable
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            InputEvent::MouseDown { x, y, .. }
            | InputEvent::MouseUp { x, y, .. }
            | InputEvent::MouseMove { x, y, .. }
            | InputEvent::Scroll { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Response from handling an input event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventResponse {
    /// Event was not handled, should bubble up
    #[default]
    Ignored,
    /// Event was handled, stop propagation
    Consumed,
}

impl EventResponse {
    pub fn is_consumed(&self) -> bool {
        matches!(self, EventResponse::Consumed)
    }
}

/// Tracks overall input state
pub struct InputState {
    pub keyboard: KeyState,
    pub mouse: MouseState,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keyboard: KeyState::new(),
            mouse: MouseState::new(),
            modifiers: Modifiers::empty(),
        }
    }

    /// Update state from a winit WindowEvent and optionally produce an InputEvent
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) -> Option<InputEvent> {
        use winit::event::WindowEvent;

        match event {
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = Modifiers::from_winit(mods.state());
                None
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key = Key::from_winit(&event.physical_key, &event.logical_key);

                // Extract character text from winit's logical key for text insertion fallback.
                // This handles keyboard layouts correctly without a manual mapping table.
                let text = if let winit::keyboard::Key::Character(s) = &event.logical_key {
                    Some(s.to_string())
                } else {
                    None
                };

                match event.state {
                    winit::event::ElementState::Pressed => {
                        self.keyboard.set_pressed(key, true);
                        Some(InputEvent::KeyDown {
                            key,
                            modifiers: self.modifiers,
                            text,
                        })
                    }
                    winit::event::ElementState::Released => {
                        self.keyboard.set_pressed(key, false);
                        Some(InputEvent::KeyUp {
                            key,
                            modifiers: self.modifiers,
                        })
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let x = position.x as f32;
                let y = position.y as f32;
                self.mouse.update_position(x, y);
                Some(InputEvent::MouseMove {
                    x,
                    y,
                    modifiers: self.modifiers,
                })
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = MouseButton::from_winit(*button);
                let (x, y) = self.mouse.position();

                match state {
                    winit::event::ElementState::Pressed => {
                        self.mouse.set_pressed(button, true);
                        Some(InputEvent::MouseDown {
                            button,
                            x,
                            y,
                            modifiers: self.modifiers,
                        })
                    }
                    winit::event::ElementState::Released => {
                        self.mouse.set_pressed(button, false);
                        Some(InputEvent::MouseUp {
                            button,
                            x,
                            y,
                            modifiers: self.modifiers,
                        })
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (delta_x, delta_y) = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => (*x * 20.0, *y * 20.0),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        (pos.x as f32, pos.y as f32)
                    }
                };
                let (x, y) = self.mouse.position();
                Some(InputEvent::Scroll {
                    delta_x,
                    delta_y,
                    x,
                    y,
                    modifiers: self.modifiers,
                })
            }

            WindowEvent::Ime(ime) => {
                use winit::event::Ime;
                match ime {
                    Ime::Commit(text) => {
                        Some(InputEvent::TextInput(text.clone()))
                    }
                    _ => None,
                }
            }

            _ => None,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_events_carry_a_position() {
        let event = InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 12.0,
            y: 34.0,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(event.position(), Some((12.0, 34.0)));

        let event = InputEvent::KeyDown {
            key: Key::Enter,
            modifiers: Modifiers::empty(),
            text: None,
        };
        assert_eq!(event.position(), None);
    }

    #[test]
    fn mouse_state_attaches_last_cursor_position() {
        let mut state = InputState::new();
        state.mouse.update_position(100.0, 50.0);
        state.mouse.set_pressed(MouseButton::Left, true);
        assert!(state.mouse.is_pressed(MouseButton::Left));
        assert_eq!(state.mouse.position(), (100.0, 50.0));
    }
}
