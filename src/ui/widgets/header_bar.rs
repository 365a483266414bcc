//! Header bar widget - project identity and panel toggle

use crate::input::{EventResponse, InputEvent};
use crate::ui::widget::{create_rect_vertices, create_rounded_rect_vertices, theme, Widget, WidgetOutput};
use crate::ui::widgets::Button;
use crate::ui::{Color, Rect, TextRenderer};

/// Actions that can be triggered from the header bar
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderAction {
    TogglePanel,
}

/// Header bar widget displaying the project badge, name and worktree count
pub struct HeaderBar {
    /// Project name
    pub project_name: String,
    /// Single glyph shown inside the icon badge
    pub icon_glyph: String,
    /// Badge tint, taken from the project's accent
    pub accent: [f32; 4],
    /// Worktree count shown next to the name
    pub worktree_count: usize,
    /// Pending action (set after button click)
    pending_action: Option<HeaderAction>,
    panel_button: Button,
}

impl HeaderBar {
    pub fn new() -> Self {
        Self {
            project_name: String::new(),
            icon_glyph: String::new(),
            accent: [1.0, 1.0, 1.0, 1.0],
            worktree_count: 0,
            pending_action: None,
            panel_button: Button::new("Details").ghost(),
        }
    }

    /// Update the displayed project identity
    pub fn set_project(&mut self, name: String, icon_glyph: String, accent: [f32; 4]) {
        self.project_name = name;
        self.icon_glyph = icon_glyph;
        self.accent = accent;
    }

    /// Check if an action was triggered and clear it
    pub fn take_action(&mut self) -> Option<HeaderAction> {
        self.pending_action.take()
    }

    fn panel_button_bounds(&self, bounds: Rect) -> Rect {
        let scale = (bounds.height / 48.0).max(1.0);
        let button_height = bounds.height - 16.0 * scale;
        let button_width = 80.0 * scale;
        let gap = 12.0 * scale;
        Rect::new(
            bounds.right() - button_width - gap,
            bounds.y + 8.0 * scale,
            button_width,
            button_height,
        )
    }

    fn badge_bounds(&self, bounds: Rect) -> Rect {
        let scale = (bounds.height / 48.0).max(1.0);
        let size = bounds.height - 16.0 * scale;
        Rect::new(bounds.x + 16.0 * scale, bounds.y + 8.0 * scale, size, size)
    }
}

impl Default for HeaderBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for HeaderBar {
    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResponse {
        let button_bounds = self.panel_button_bounds(bounds);
        if self.panel_button.handle_event(event, button_bounds).is_consumed() {
            if self.panel_button.was_clicked() {
                self.pending_action = Some(HeaderAction::TogglePanel);
            }
            return EventResponse::Consumed;
        }

        EventResponse::Ignored
    }

    fn layout(&self, text_renderer: &TextRenderer, bounds: Rect) -> WidgetOutput {
        let mut output = WidgetOutput::new();

        // Background - elevated surface for header prominence
        output
            .spline_vertices
            .extend(create_rect_vertices(&bounds, theme::SURFACE_RAISED.to_array()));

        // Icon badge: rounded square tinted with the project accent
        let badge = self.badge_bounds(bounds);
        let tint = Color::rgba(self.accent[0], self.accent[1], self.accent[2], 0.18);
        output.spline_vertices.extend(create_rounded_rect_vertices(
            &badge,
            tint.to_array(),
            badge.height * 0.25,
        ));

        let line_height = text_renderer.line_height();
        if !self.icon_glyph.is_empty() {
            let glyph_w = text_renderer.measure_text(&self.icon_glyph);
            output.text_vertices.extend(text_renderer.layout_text(
                &self.icon_glyph,
                badge.x + (badge.width - glyph_w) / 2.0,
                badge.y + (badge.height - line_height) / 2.0,
                self.accent,
            ));
        }

        // Project name
        let text_y = bounds.y + (bounds.height - line_height) / 2.0;
        let name_x = badge.right() + 12.0;
        output.text_vertices.extend(text_renderer.layout_text(
            &self.project_name,
            name_x,
            text_y,
            theme::TEXT_BRIGHT.to_array(),
        ));

        // Worktree count, dimmer
        let count_text = if self.worktree_count == 1 {
            "1 worktree".to_string()
        } else {
            format!("{} worktrees", self.worktree_count)
        };
        let count_x = name_x + text_renderer.measure_text(&self.project_name) + 16.0;
        output.text_vertices.extend(text_renderer.layout_text_small(
            &count_text,
            count_x,
            text_y + (line_height - text_renderer.line_height_small()) / 2.0,
            theme::TEXT_MUTED.to_array(),
        ));

        output.extend(self.panel_button.layout(text_renderer, self.panel_button_bounds(bounds)));

        // Drop shadow below header: 4 strips fading from rgba(0,0,0,0.15) to transparent
        let shadow_strip_height = 2.0;
        for i in 0..4u32 {
            let alpha = 0.15 * (1.0 - i as f32 / 4.0);
            let strip_y = bounds.bottom() + i as f32 * shadow_strip_height;
            let strip = Rect::new(bounds.x, strip_y, bounds.width, shadow_strip_height);
            output
                .spline_vertices
                .extend(create_rect_vertices(&strip, [0.0, 0.0, 0.0, alpha]));
        }

        output
    }
}
