//! Modal confirmation dialog for destructive actions.
//!
//! Only deletion goes through here, so the accept button is always the
//! danger-styled "Delete". Enter confirms, Escape or a click outside cancels.

use crate::input::{EventResponse, InputEvent, Key, MouseButton};
use crate::ui::widget::{create_dialog_backdrop, theme, Widget, WidgetOutput};
use crate::ui::widgets::Button;
use crate::ui::{Rect, TextRenderer};

/// Actions from the confirm dialog
#[derive(Clone, Debug)]
pub enum ConfirmDialogAction {
    Confirm,
    Cancel,
}

pub struct ConfirmDialog {
    visible: bool,
    title: String,
    message: String,
    delete_button: Button,
    cancel_button: Button,
    pending_action: Option<ConfirmDialogAction>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            title: String::new(),
            message: String::new(),
            delete_button: Button::new("Delete").danger(),
            cancel_button: Button::new("Cancel"),
            pending_action: None,
        }
    }

    pub fn show(&mut self, title: &str, message: &str) {
        self.visible = true;
        self.title = title.to_string();
        self.message = message.to_string();
        self.pending_action = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn take_action(&mut self) -> Option<ConfirmDialogAction> {
        self.pending_action.take()
    }

    fn resolve(&mut self, action: ConfirmDialogAction) {
        self.pending_action = Some(action);
        self.hide();
    }

    /// Compute dialog bounds centered in screen
    fn dialog_bounds(&self, screen: Rect, scale: f32) -> Rect {
        let w = (360.0 * scale).min(screen.width * 0.8);
        let h = (150.0 * scale).min(screen.height * 0.5);
        Rect::new(
            screen.x + (screen.width - w) / 2.0,
            screen.y + (screen.height - h) / 2.0,
            w,
            h,
        )
    }

    /// Cancel on the left, the destructive action in the bottom-right corner
    fn button_row(dialog: Rect, scale: f32) -> (Rect, Rect) {
        let padding = 16.0 * scale;
        let button_h = 32.0 * scale;
        let button_w = 80.0 * scale;
        let gap = 8.0 * scale;
        let y = dialog.bottom() - padding - button_h;
        let delete_x = dialog.right() - padding - button_w;
        let cancel_x = delete_x - button_w - gap;
        (
            Rect::new(delete_x, y, button_w, button_h),
            Rect::new(cancel_x, y, button_w, button_h),
        )
    }
}

impl Widget for ConfirmDialog {
    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResponse {
        if !self.visible {
            return EventResponse::Ignored;
        }

        let scale = (bounds.height / 720.0).max(1.0);
        let dialog = self.dialog_bounds(bounds, scale);
        let (delete_bounds, cancel_bounds) = Self::button_row(dialog, scale);

        if let InputEvent::KeyDown { key, .. } = event {
            match key {
                Key::Escape => {
                    self.resolve(ConfirmDialogAction::Cancel);
                    return EventResponse::Consumed;
                }
                Key::Enter => {
                    self.resolve(ConfirmDialogAction::Confirm);
                    return EventResponse::Consumed;
                }
                _ => {}
            }
        }

        if self.delete_button.handle_event(event, delete_bounds).is_consumed() {
            if self.delete_button.was_clicked() {
                self.resolve(ConfirmDialogAction::Confirm);
            }
            return EventResponse::Consumed;
        }

        if self.cancel_button.handle_event(event, cancel_bounds).is_consumed() {
            if self.cancel_button.was_clicked() {
                self.resolve(ConfirmDialogAction::Cancel);
            }
            return EventResponse::Consumed;
        }

        // Click outside dialog dismisses (cancel)
        if let InputEvent::MouseDown { button: MouseButton::Left, x, y, .. } = event
            && !dialog.contains(*x, *y)
        {
            self.resolve(ConfirmDialogAction::Cancel);
            return EventResponse::Consumed;
        }

        // Modal: nothing below the dialog sees input
        EventResponse::Consumed
    }

    fn layout(&self, text_renderer: &TextRenderer, bounds: Rect) -> WidgetOutput {
        let mut output = WidgetOutput::new();

        if !self.visible {
            return output;
        }

        let scale = (bounds.height / 720.0).max(1.0);
        let dialog = self.dialog_bounds(bounds, scale);
        let padding = 16.0 * scale;

        create_dialog_backdrop(&mut output, &bounds, &dialog, scale);

        output.text_vertices.extend(text_renderer.layout_text(
            &self.title,
            dialog.x + padding,
            dialog.y + padding,
            theme::TEXT_BRIGHT.to_array(),
        ));

        output.text_vertices.extend(text_renderer.layout_text_small(
            &self.message,
            dialog.x + padding,
            dialog.y + 44.0 * scale,
            theme::TEXT.to_array(),
        ));

        let (delete_bounds, cancel_bounds) = Self::button_row(dialog, scale);
        output.extend(self.cancel_button.layout(text_renderer, cancel_bounds));
        output.extend(self.delete_button.layout(text_renderer, delete_bounds));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn screen() -> Rect {
        Rect::from_size(800.0, 600.0)
    }

    #[test]
    fn enter_confirms_and_hides() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Delete worktree?", "This cannot be undone.");

        let event = InputEvent::KeyDown {
            key: Key::Enter,
            modifiers: Modifiers::empty(),
            text: None,
        };
        assert!(dialog.handle_event(&event, screen()).is_consumed());
        assert!(matches!(dialog.take_action(), Some(ConfirmDialogAction::Confirm)));
        assert!(!dialog.is_visible());
    }

    #[test]
    fn clicking_outside_cancels() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Delete worktree?", "This cannot be undone.");

        let event = InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 5.0,
            y: 5.0,
            modifiers: Modifiers::empty(),
        };
        assert!(dialog.handle_event(&event, screen()).is_consumed());
        assert!(matches!(dialog.take_action(), Some(ConfirmDialogAction::Cancel)));
    }

    #[test]
    fn events_are_swallowed_while_visible() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Delete worktree?", "");

        let event = InputEvent::MouseMove {
            x: 400.0,
            y: 300.0,
            modifiers: Modifiers::empty(),
        };
        assert!(dialog.handle_event(&event, screen()).is_consumed());
        assert!(dialog.take_action().is_none());
        assert!(dialog.is_visible());
    }
}
