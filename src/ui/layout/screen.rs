//! Screen layout builder - creates the main application layout

use super::Rect;

/// Fixed header strip height at scale 1.0
const HEADER_HEIGHT: f32 = 48.0;

/// Branch detail panel width at scale 1.0
const SIDE_PANEL_WIDTH: f32 = 300.0;

/// The computed layout regions for the main screen
#[derive(Clone, Debug)]
pub struct ScreenLayout {
    /// Header bar region (project identity, full width)
    pub header: Rect,
    /// Diagram canvas region (everything below the header, minus the panel)
    pub canvas: Rect,
    /// Branch detail panel region (right side; zero-width when hidden)
    pub side_panel: Rect,
}

impl ScreenLayout {
    /// Create the screen layout from the given window bounds
    ///
    /// Layout structure:
    /// ```text
    /// +----------------------------------------------------------+
    /// |                     HEADER (48px)                        |
    /// +---------------------------------------------+------------+
    /// |                                             |            |
    /// |                                             |   PANEL    |
    /// |                 CANVAS                      |   300px    |
    /// |                                             |            |
    /// |                                             |            |
    /// +---------------------------------------------+------------+
    /// ```
    pub fn compute(bounds: Rect, panel_visible: bool) -> Self {
        Self::compute_scaled(bounds, 1.0, panel_visible)
    }

    /// Create the screen layout, with pixel constants scaled for HiDPI
    pub fn compute_scaled(bounds: Rect, scale: f32, panel_visible: bool) -> Self {
        let (header, main) = bounds.take_top(HEADER_HEIGHT * scale);

        if !panel_visible {
            let side_panel = Rect::new(main.right(), main.y, 0.0, main.height);
            return Self {
                header,
                canvas: main,
                side_panel,
            };
        }

        // Panel never eats more than a third of the window
        let panel_width = (SIDE_PANEL_WIDTH * scale).min(main.width / 3.0);
        let (canvas, side_panel) = main.take_right(panel_width);

        Self {
            header,
            canvas,
            side_panel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout() {
        let bounds = Rect::from_size(1280.0, 720.0);
        let layout = ScreenLayout::compute(bounds, true);

        // Header spans the top
        assert_eq!(layout.header.y, 0.0);
        assert_eq!(layout.header.width, 1280.0);
        assert_eq!(layout.header.height, 48.0);

        // Panel sits flush against the right edge
        assert_eq!(layout.side_panel.width, 300.0);
        assert!((layout.side_panel.right() - 1280.0).abs() < 0.001);

        // Canvas fills the rest
        assert!((layout.canvas.width - 980.0).abs() < 0.001);
        assert_eq!(layout.canvas.y, 48.0);
    }

    #[test]
    fn test_hidden_panel_gives_canvas_full_width() {
        let bounds = Rect::from_size(1280.0, 720.0);
        let layout = ScreenLayout::compute(bounds, false);

        assert_eq!(layout.canvas.width, 1280.0);
        assert_eq!(layout.side_panel.width, 0.0);
    }

    #[test]
    fn test_panel_caps_at_a_third_of_narrow_windows() {
        let bounds = Rect::from_size(600.0, 400.0);
        let layout = ScreenLayout::compute(bounds, true);

        assert_eq!(layout.side_panel.width, 200.0);
    }
}
