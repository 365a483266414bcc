//! Context menu widget - right-click popup overlay

use crate::input::{EventResponse, InputEvent, Key, MouseButton};
use crate::ui::widget::{create_rect_outline_vertices, create_rect_vertices, theme, WidgetOutput};
use crate::ui::{Rect, TextRenderer};

/// A single item in the context menu
#[derive(Clone, Debug)]
pub struct MenuItem {
    pub label: String,
    pub shortcut: Option<String>,
    pub action_id: String,
    /// Destructive actions render in the danger color
    pub danger: bool,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shortcut: None,
            action_id: action_id.into(),
            danger: false,
        }
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn destructive(mut self) -> Self {
        self.danger = true;
        self
    }
}

/// Result from a menu interaction
#[derive(Clone, Debug)]
pub enum MenuAction {
    Selected(String),
}

/// A popup context menu overlay
///
/// The menu opens with its top-left corner exactly at the click position,
/// even near window edges; it is never repositioned to fit.
pub struct ContextMenu {
    visible: bool,
    items: Vec<MenuItem>,
    /// Position where the menu was opened (top-left of menu)
    pos_x: f32,
    pos_y: f32,
    /// Which item is hovered
    hovered_index: Option<usize>,
    /// Pending action to be consumed
    pending_action: Option<MenuAction>,
    /// Menu dimensions (computed during layout)
    menu_width: f32,
    item_height: f32,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self {
            visible: false,
            items: Vec::new(),
            pos_x: 0.0,
            pos_y: 0.0,
            hovered_index: None,
            pending_action: None,
            menu_width: 200.0,
            item_height: 24.0,
        }
    }

    /// Show the context menu at a given position with the specified items
    pub fn show(&mut self, items: Vec<MenuItem>, x: f32, y: f32) {
        self.items = items;
        self.pos_x = x;
        self.pos_y = y;
        self.visible = true;
        self.hovered_index = None;
        self.pending_action = None;
    }

    /// Hide the context menu
    pub fn hide(&mut self) {
        self.visible = false;
        self.items.clear();
        self.hovered_index = None;
    }

    /// Check if the context menu is currently visible
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Take the pending action (consume it)
    pub fn take_action(&mut self) -> Option<MenuAction> {
        self.pending_action.take()
    }

    /// Get the bounding rectangle of the menu
    fn menu_bounds(&self) -> Rect {
        let height = self.items.len() as f32 * self.item_height + 4.0; // 2px padding top+bottom
        Rect::new(self.pos_x, self.pos_y, self.menu_width, height)
    }

    /// Handle an input event. Returns EventResponse::Consumed if the menu handled it.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        if !self.visible {
            return EventResponse::Ignored;
        }

        let bounds = self.menu_bounds();

        match event {
            InputEvent::MouseMove { x, y, .. } => {
                if bounds.contains(*x, *y) {
                    let rel_y = *y - bounds.y - 2.0; // account for padding
                    let idx = (rel_y / self.item_height) as usize;
                    if idx < self.items.len() {
                        self.hovered_index = Some(idx);
                    } else {
                        self.hovered_index = None;
                    }
                } else {
                    self.hovered_index = None;
                }
                EventResponse::Consumed
            }
            InputEvent::MouseDown { button: MouseButton::Left, x, y, .. } => {
                if bounds.contains(*x, *y) {
                    let rel_y = *y - bounds.y - 2.0;
                    let idx = (rel_y / self.item_height) as usize;
                    if idx < self.items.len() {
                        let action_id = self.items[idx].action_id.clone();
                        self.pending_action = Some(MenuAction::Selected(action_id));
                        self.hide();
                    }
                    EventResponse::Consumed
                } else {
                    // Click outside menu -> close, but let the click through so
                    // the thing under the cursor still reacts
                    self.hide();
                    EventResponse::Ignored
                }
            }
            InputEvent::MouseDown { button: MouseButton::Right, .. } => {
                // Another right-click while menu is open; close and let the view
                // decide whether to open a new one at the new position
                self.hide();
                EventResponse::Ignored
            }
            InputEvent::KeyDown { key: Key::Escape, .. } => {
                self.hide();
                EventResponse::Consumed
            }
            // Consume all other events while visible (prevent interaction with widgets behind)
            InputEvent::MouseUp { .. } | InputEvent::Scroll { .. } => EventResponse::Consumed,
            _ => EventResponse::Ignored,
        }
    }

    /// Layout the context menu and produce rendering output.
    /// Call this LAST in the draw order so it renders on top.
    pub fn layout(&mut self, text_renderer: &TextRenderer) -> WidgetOutput {
        let mut output = WidgetOutput::new();

        if !self.visible || self.items.is_empty() {
            return output;
        }

        // Update item height based on font metrics
        self.item_height = (text_renderer.line_height() * 1.6).max(22.0);
        self.menu_width = 200.0;

        // Compute menu width based on content
        for item in &self.items {
            let label_width = text_renderer.measure_text(&item.label);
            let shortcut_width = item
                .shortcut
                .as_ref()
                .map(|s| text_renderer.measure_text(s) + 24.0)
                .unwrap_or(0.0);
            let total = label_width + shortcut_width + 32.0; // padding
            if total > self.menu_width {
                self.menu_width = total;
            }
        }

        let bounds = self.menu_bounds();
        let line_height = text_renderer.line_height();

        // Shadow (offset dark rect behind menu)
        let shadow_rect = Rect::new(bounds.x + 3.0, bounds.y + 3.0, bounds.width, bounds.height);
        output
            .spline_vertices
            .extend(create_rect_vertices(&shadow_rect, [0.0, 0.0, 0.0, 0.4]));

        // Menu background
        let bg_color = theme::SURFACE_RAISED.lighten(0.02);
        output
            .spline_vertices
            .extend(create_rect_vertices(&bounds, bg_color.to_array()));

        // Menu border
        output.spline_vertices.extend(create_rect_outline_vertices(
            &bounds,
            theme::BORDER_LIGHT.to_array(),
            1.0,
        ));

        // Menu items
        let pad_x = 12.0;
        for (idx, item) in self.items.iter().enumerate() {
            let item_y = bounds.y + 2.0 + idx as f32 * self.item_height;
            let item_rect = Rect::new(bounds.x + 1.0, item_y, bounds.width - 2.0, self.item_height);

            // Hover highlight
            if self.hovered_index == Some(idx) {
                let highlight = if item.danger {
                    theme::DANGER.with_alpha(0.25)
                } else {
                    theme::ACCENT.with_alpha(0.25)
                };
                output
                    .spline_vertices
                    .extend(create_rect_vertices(&item_rect, highlight.to_array()));
            }

            // Label text
            let text_y = item_y + (self.item_height - line_height) / 2.0;
            let label_color = if item.danger {
                theme::DANGER
            } else if self.hovered_index == Some(idx) {
                theme::TEXT_BRIGHT
            } else {
                theme::TEXT
            };
            output.text_vertices.extend(text_renderer.layout_text(
                &item.label,
                bounds.x + pad_x,
                text_y,
                label_color.to_array(),
            ));

            // Shortcut hint (right-aligned, dimmer)
            if let Some(ref shortcut) = item.shortcut {
                let shortcut_width = text_renderer.measure_text(shortcut);
                let shortcut_x = bounds.right() - pad_x - shortcut_width;
                output.text_vertices.extend(text_renderer.layout_text(
                    shortcut,
                    shortcut_x,
                    text_y,
                    theme::TEXT_MUTED.to_array(),
                ));
            }
        }

        output
    }
}

impl Default for ContextMenu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn open_menu() -> ContextMenu {
        let mut menu = ContextMenu::new();
        menu.show(
            vec![
                MenuItem::new("Rename", "rename"),
                MenuItem::new("Delete", "delete").destructive(),
            ],
            50.0,
            50.0,
        );
        menu
    }

    fn left_click(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::Left,
            x,
            y,
            modifiers: Modifiers::empty(),
        }
    }

    #[test]
    fn clicking_an_item_selects_it_and_closes() {
        let mut menu = open_menu();
        assert!(menu.handle_event(&left_click(60.0, 60.0)).is_consumed());
        let Some(MenuAction::Selected(id)) = menu.take_action() else {
            panic!("expected a selection");
        };
        assert_eq!(id, "rename");
        assert!(!menu.is_visible());
    }

    #[test]
    fn outside_click_closes_but_falls_through() {
        let mut menu = open_menu();
        let response = menu.handle_event(&left_click(400.0, 400.0));
        assert!(!response.is_consumed());
        assert!(menu.take_action().is_none());
        assert!(!menu.is_visible());
    }

    #[test]
    fn escape_closes_without_selecting() {
        let mut menu = open_menu();
        let event = InputEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::empty(),
            text: None,
        };
        assert!(menu.handle_event(&event).is_consumed());
        assert!(menu.take_action().is_none());
        assert!(!menu.is_visible());
    }

    #[test]
    fn right_click_closes_and_lets_the_view_reopen() {
        let mut menu = open_menu();
        let event = InputEvent::MouseDown {
            button: MouseButton::Right,
            x: 300.0,
            y: 80.0,
            modifiers: Modifiers::empty(),
        };
        assert!(!menu.handle_event(&event).is_consumed());
        assert!(!menu.is_visible());
    }
}
