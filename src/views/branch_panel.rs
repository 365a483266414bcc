//! Branch detail panel - shows the selected branch and its actions

use crate::input::{EventResponse, InputEvent};
use crate::store::Branch;
use crate::ui::widget::{
    create_rect_vertices, create_rounded_rect_vertices, theme, Widget, WidgetOutput,
};
use crate::ui::widgets::Button;
use crate::ui::{Color, Rect, TextRenderer};

/// Actions emitted by the panel buttons
#[derive(Clone, Debug, PartialEq)]
pub enum PanelAction {
    OpenBranch { worktree_id: String, name: String },
    NewIngestion { worktree_id: String, name: String },
}

/// Details of the branch currently shown in the panel
#[derive(Clone, Debug)]
struct Selection {
    worktree_id: String,
    worktree_name: String,
    branch: Branch,
    accent: [f32; 4],
}

/// Right-hand panel with details for the selected branch
pub struct BranchPanel {
    selection: Option<Selection>,
    open_button: Button,
    ingest_button: Button,
    pending_action: Option<PanelAction>,
}

impl BranchPanel {
    pub fn new() -> Self {
        Self {
            selection: None,
            open_button: Button::new("Open").primary(),
            ingest_button: Button::new("New ingestion").ghost(),
            pending_action: None,
        }
    }

    /// Show details for a branch
    pub fn set_selection(
        &mut self,
        worktree_id: String,
        worktree_name: String,
        branch: Branch,
        accent: [f32; 4],
    ) {
        self.selection = Some(Selection {
            worktree_id,
            worktree_name,
            branch,
            accent,
        });
    }

    /// Clear the panel (e.g. after the branch was deleted or renamed away)
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected_branch(&self) -> Option<(&str, &str)> {
        self.selection
            .as_ref()
            .map(|s| (s.worktree_id.as_str(), s.branch.name.as_str()))
    }

    /// Check if an action was triggered and clear it
    pub fn take_action(&mut self) -> Option<PanelAction> {
        self.pending_action.take()
    }

    fn button_bounds(&self, bounds: Rect) -> (Rect, Rect) {
        let inner = bounds.inset(16.0);
        let button_h = 32.0;
        let gap = 8.0;
        let open = Rect::new(inner.x, inner.bottom() - button_h, inner.width, button_h);
        let ingest = Rect::new(
            inner.x,
            open.y - gap - button_h,
            inner.width,
            button_h,
        );
        (open, ingest)
    }

    pub fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResponse {
        let Some(selection) = self.selection.clone() else {
            return EventResponse::Ignored;
        };

        let (open_bounds, ingest_bounds) = self.button_bounds(bounds);

        if self.open_button.handle_event(event, open_bounds).is_consumed() {
            if self.open_button.was_clicked() {
                self.pending_action = Some(PanelAction::OpenBranch {
                    worktree_id: selection.worktree_id,
                    name: selection.branch.name,
                });
            }
            return EventResponse::Consumed;
        }

        if self.ingest_button.handle_event(event, ingest_bounds).is_consumed() {
            if self.ingest_button.was_clicked() {
                self.pending_action = Some(PanelAction::NewIngestion {
                    worktree_id: selection.worktree_id,
                    name: selection.branch.name,
                });
            }
            return EventResponse::Consumed;
        }

        // Clicks inside the panel never reach the canvas behind it
        if let Some((x, y)) = event.position() {
            if bounds.contains(x, y) && matches!(event, InputEvent::MouseDown { .. }) {
                return EventResponse::Consumed;
            }
        }

        EventResponse::Ignored
    }

    pub fn layout(&self, text_renderer: &TextRenderer, bounds: Rect) -> WidgetOutput {
        let mut output = WidgetOutput::new();

        // Panel background with a left edge border
        output
            .spline_vertices
            .extend(create_rect_vertices(&bounds, theme::PANEL_SIDEBAR.to_array()));
        let border_rect = Rect::new(bounds.x, bounds.y, 1.0, bounds.height);
        output
            .spline_vertices
            .extend(create_rect_vertices(&border_rect, theme::BORDER.to_array()));

        let inner = bounds.inset(16.0);
        let line_height = text_renderer.line_height();
        let small_height = text_renderer.line_height_small();

        let Some(selection) = &self.selection else {
            // Empty state
            let hint = "Select a branch";
            let hint_w = text_renderer.measure_text(hint);
            output.text_vertices.extend(text_renderer.layout_text(
                hint,
                inner.x + (inner.width - hint_w) / 2.0,
                inner.y + inner.height / 2.0 - line_height / 2.0,
                theme::TEXT_MUTED.to_array(),
            ));
            return output;
        };

        let mut y = inner.y;

        // Branch name with accent swatch
        let swatch = Rect::new(inner.x, y + line_height / 2.0 - 5.0, 10.0, 10.0);
        output.spline_vertices.extend(create_rounded_rect_vertices(
            &swatch,
            selection.accent,
            5.0,
        ));
        output.text_vertices.extend(text_renderer.layout_text(
            &selection.branch.name,
            inner.x + 18.0,
            y,
            theme::TEXT_BRIGHT.to_array(),
        ));
        y += line_height + 6.0;

        // Parent worktree
        output.text_vertices.extend(text_renderer.layout_text_small(
            &format!("in {}", selection.worktree_name),
            inner.x,
            y,
            theme::TEXT_MUTED.to_array(),
        ));
        y += small_height + 14.0;

        // Status chips
        let mut chip_x = inner.x;
        if selection.branch.is_default {
            chip_x = self.draw_chip(&mut output, text_renderer, chip_x, y, "default", theme::ACCENT);
        }
        if selection.branch.is_current {
            let green = Color::rgb(0.20, 0.78, 0.55);
            self.draw_chip(&mut output, text_renderer, chip_x, y, "current", green);
        }
        if selection.branch.is_default || selection.branch.is_current {
            y += small_height + 18.0;
        }

        // Last commit
        output.text_vertices.extend(text_renderer.layout_text_small(
            "Last commit",
            inner.x,
            y,
            theme::TEXT_MUTED.to_array(),
        ));
        y += small_height + 4.0;
        output.text_vertices.extend(text_renderer.layout_text(
            &selection.branch.last_commit,
            inner.x,
            y,
            theme::TEXT.to_array(),
        ));

        // Buttons at the bottom
        let (open_bounds, ingest_bounds) = self.button_bounds(bounds);
        output.extend(self.open_button.layout(text_renderer, open_bounds));
        output.extend(self.ingest_button.layout(text_renderer, ingest_bounds));

        output
    }

    fn draw_chip(
        &self,
        output: &mut WidgetOutput,
        text_renderer: &TextRenderer,
        x: f32,
        y: f32,
        label: &str,
        color: Color,
    ) -> f32 {
        let text_w = text_renderer.measure_text_scaled(label, 0.85);
        let pad = 8.0;
        let chip_h = text_renderer.line_height_small() + 6.0;
        let chip = Rect::new(x, y - 3.0, text_w + pad * 2.0, chip_h);
        output.spline_vertices.extend(create_rounded_rect_vertices(
            &chip,
            color.with_alpha(0.18).to_array(),
            chip_h / 2.0,
        ));
        output.text_vertices.extend(text_renderer.layout_text_small(
            label,
            x + pad,
            y,
            color.to_array(),
        ));
        chip.right() + 8.0
    }
}

impl Default for BranchPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Branch;

    #[test]
    fn selection_round_trip() {
        let mut panel = BranchPanel::new();
        assert!(panel.selected_branch().is_none());

        panel.set_selection(
            "wt-1".into(),
            "Main".into(),
            Branch::new("develop", false, true, "2 hours ago"),
            [0.2, 0.8, 0.5, 1.0],
        );
        assert_eq!(panel.selected_branch(), Some(("wt-1", "develop")));

        panel.clear_selection();
        assert!(panel.selected_branch().is_none());
    }
}
