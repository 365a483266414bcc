//! Zoom HUD widget - floating zoom controls over the diagram canvas

use crate::input::{EventResponse, InputEvent};
use crate::ui::widget::{
    create_rounded_rect_outline_vertices, create_rounded_rect_vertices, theme, Widget,
    WidgetOutput,
};
use crate::ui::widgets::Button;
use crate::ui::{Rect, TextRenderer};

/// Actions from the zoom controls
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoomAction {
    ZoomIn,
    ZoomOut,
    Fit,
}

/// A small pill of zoom controls: [-] 100% [+] [Fit]
///
/// Anchored to the bottom-left corner of the canvas by the caller; the HUD
/// only knows how to lay itself out inside the bounds it is given.
pub struct ZoomHud {
    /// Current zoom level, 1.0 = 100%
    pub zoom: f32,
    pending_action: Option<ZoomAction>,
    out_button: Button,
    in_button: Button,
    fit_button: Button,
}

const BUTTON_SIZE: f32 = 24.0;
const FIT_WIDTH: f32 = 40.0;
const PERCENT_WIDTH: f32 = 48.0;
const PADDING: f32 = 6.0;
const GAP: f32 = 4.0;

impl ZoomHud {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            pending_action: None,
            out_button: Button::new("-").ghost(),
            in_button: Button::new("+").ghost(),
            fit_button: Button::new("Fit").ghost(),
        }
    }

    /// Preferred size of the whole pill
    pub fn size() -> (f32, f32) {
        (
            PADDING * 2.0 + BUTTON_SIZE * 2.0 + PERCENT_WIDTH + FIT_WIDTH + GAP * 3.0,
            PADDING * 2.0 + BUTTON_SIZE,
        )
    }

    /// Check if an action was triggered and clear it
    pub fn take_action(&mut self) -> Option<ZoomAction> {
        self.pending_action.take()
    }

    fn button_bounds(&self, bounds: Rect) -> (Rect, Rect, Rect) {
        let y = bounds.y + PADDING;
        let out_x = bounds.x + PADDING;
        let in_x = out_x + BUTTON_SIZE + GAP + PERCENT_WIDTH + GAP;
        let fit_x = in_x + BUTTON_SIZE + GAP;
        (
            Rect::new(out_x, y, BUTTON_SIZE, BUTTON_SIZE),
            Rect::new(in_x, y, BUTTON_SIZE, BUTTON_SIZE),
            Rect::new(fit_x, y, FIT_WIDTH, BUTTON_SIZE),
        )
    }
}

impl Default for ZoomHud {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for ZoomHud {
    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResponse {
        let (out_bounds, in_bounds, fit_bounds) = self.button_bounds(bounds);

        if self.out_button.handle_event(event, out_bounds).is_consumed() {
            if self.out_button.was_clicked() {
                self.pending_action = Some(ZoomAction::ZoomOut);
            }
            return EventResponse::Consumed;
        }

        if self.in_button.handle_event(event, in_bounds).is_consumed() {
            if self.in_button.was_clicked() {
                self.pending_action = Some(ZoomAction::ZoomIn);
            }
            return EventResponse::Consumed;
        }

        if self.fit_button.handle_event(event, fit_bounds).is_consumed() {
            if self.fit_button.was_clicked() {
                self.pending_action = Some(ZoomAction::Fit);
            }
            return EventResponse::Consumed;
        }

        // Swallow clicks on the pill body so they don't reach the canvas
        if let Some((x, y)) = event.position() {
            if matches!(event, InputEvent::MouseDown { .. }) && bounds.contains(x, y) {
                return EventResponse::Consumed;
            }
        }

        EventResponse::Ignored
    }

    fn layout(&self, text_renderer: &TextRenderer, bounds: Rect) -> WidgetOutput {
        let mut output = WidgetOutput::new();
        let radius = bounds.height / 2.0;

        output.spline_vertices.extend(create_rounded_rect_vertices(
            &bounds,
            theme::SURFACE_RAISED.with_alpha(0.92).to_array(),
            radius,
        ));
        output.spline_vertices.extend(create_rounded_rect_outline_vertices(
            &bounds,
            theme::BORDER.to_array(),
            radius,
            1.0,
        ));

        let (out_bounds, in_bounds, fit_bounds) = self.button_bounds(bounds);
        output.extend(self.out_button.layout(text_renderer, out_bounds));
        output.extend(self.in_button.layout(text_renderer, in_bounds));
        output.extend(self.fit_button.layout(text_renderer, fit_bounds));

        // Percentage readout between the - and + buttons
        let percent = format!("{}%", (self.zoom * 100.0).round() as i32);
        let text_w = text_renderer.measure_text(&percent);
        let percent_x = out_bounds.right() + GAP + (PERCENT_WIDTH - text_w) / 2.0;
        let text_y = bounds.y + (bounds.height - text_renderer.line_height()) / 2.0;
        output.text_vertices.extend(text_renderer.layout_text(
            &percent,
            percent_x,
            text_y,
            theme::TEXT.to_array(),
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, MouseButton};

    fn click(hud: &mut ZoomHud, bounds: Rect, x: f32, y: f32) {
        let down = InputEvent::MouseDown { button: MouseButton::Left, x, y, modifiers: Modifiers::empty() };
        let up = InputEvent::MouseUp { button: MouseButton::Left, x, y, modifiers: Modifiers::empty() };
        hud.handle_event(&down, bounds);
        hud.handle_event(&up, bounds);
    }

    #[test]
    fn buttons_emit_their_actions() {
        let (w, h) = ZoomHud::size();
        let bounds = Rect::new(10.0, 10.0, w, h);
        let mut hud = ZoomHud::new();

        let (out_b, in_b, fit_b) = hud.button_bounds(bounds);

        click(&mut hud, bounds, out_b.x + 2.0, out_b.y + 2.0);
        assert_eq!(hud.take_action(), Some(ZoomAction::ZoomOut));

        click(&mut hud, bounds, in_b.x + 2.0, in_b.y + 2.0);
        assert_eq!(hud.take_action(), Some(ZoomAction::ZoomIn));

        click(&mut hud, bounds, fit_b.x + 2.0, fit_b.y + 2.0);
        assert_eq!(hud.take_action(), Some(ZoomAction::Fit));

        assert_eq!(hud.take_action(), None);
    }

    #[test]
    fn clicks_on_the_pill_body_are_swallowed() {
        let (w, h) = ZoomHud::size();
        let bounds = Rect::new(0.0, 0.0, w, h);
        let mut hud = ZoomHud::new();

        let down = InputEvent::MouseDown {
            button: MouseButton::Left,
            x: bounds.right() - 1.0,
            y: 1.0,
            modifiers: Modifiers::empty(),
        };
        assert!(hud.handle_event(&down, bounds).is_consumed());
        assert_eq!(hud.take_action(), None);
    }
}
