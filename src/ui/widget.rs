//! Core widget trait and shape helpers
//!
//! Widgets keep their own state but regenerate vertices every frame. A
//! widget's `layout` returns a `WidgetOutput` batch; the caller concatenates
//! batches in draw order and uploads them once per pipeline.

use std::f32::consts::PI;

use crate::input::{EventResponse, InputEvent};
use crate::ui::{Rect, SplineVertex, TextRenderer, TextVertex};

/// Common widget state
#[derive(Clone, Debug, Default)]
pub struct WidgetState {
    pub hovered: bool,
    pub focused: bool,
    pub pressed: bool,
    pub enabled: bool,
}

impl WidgetState {
    pub fn new() -> Self {
        Self {
            hovered: false,
            focused: false,
            pressed: false,
            enabled: true,
        }
    }
}

/// Vertex batches produced by a widget's layout pass.
#[derive(Default)]
pub struct WidgetOutput {
    pub spline_vertices: Vec<SplineVertex>,
    pub text_vertices: Vec<TextVertex>,
}

impl WidgetOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, other: WidgetOutput) {
        self.spline_vertices.extend(other.spline_vertices);
        self.text_vertices.extend(other.text_vertices);
    }
}

/// The core widget trait
pub trait Widget {
    /// Handle an input event, returning whether it was consumed
    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResponse {
        let _ = (event, bounds);
        EventResponse::Ignored
    }

    /// Layout the widget and produce rendering output
    fn layout(&self, text_renderer: &TextRenderer, bounds: Rect) -> WidgetOutput;

    fn set_focused(&mut self, focused: bool) {
        let _ = focused;
    }
}

/// Filled rectangle as two triangles
pub fn create_rect_vertices(rect: &Rect, color: [f32; 4]) -> Vec<SplineVertex> {
    let x0 = rect.x;
    let y0 = rect.y;
    let x1 = rect.right();
    let y1 = rect.bottom();

    vec![
        SplineVertex { position: [x0, y0], color },
        SplineVertex { position: [x1, y0], color },
        SplineVertex { position: [x0, y1], color },
        SplineVertex { position: [x1, y0], color },
        SplineVertex { position: [x1, y1], color },
        SplineVertex { position: [x0, y1], color },
    ]
}

/// Rectangle outline as four edge strips
pub fn create_rect_outline_vertices(rect: &Rect, color: [f32; 4], thickness: f32) -> Vec<SplineVertex> {
    let mut vertices = Vec::new();

    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x, rect.y, rect.width, thickness),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x, rect.bottom() - thickness, rect.width, thickness),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x, rect.y + thickness, thickness, rect.height - 2.0 * thickness),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.right() - thickness, rect.y + thickness, thickness, rect.height - 2.0 * thickness),
        color,
    ));

    vertices
}

const CORNER_SEGMENTS: usize = 6;

/// Filled rectangle with rounded corners: three bands plus four corner fans.
pub fn create_rounded_rect_vertices(rect: &Rect, color: [f32; 4], radius: f32) -> Vec<SplineVertex> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.5 {
        return create_rect_vertices(rect, color);
    }

    let mut vertices = Vec::new();

    // Middle band (full width), top and bottom bands (inset by radius)
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x, rect.y + r, rect.width, rect.height - 2.0 * r),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x + r, rect.y, rect.width - 2.0 * r, r),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x + r, rect.bottom() - r, rect.width - 2.0 * r, r),
        color,
    ));

    // Corner fans: (center, start angle)
    let corners = [
        (rect.x + r, rect.y + r, PI),                       // top-left
        (rect.right() - r, rect.y + r, 1.5 * PI),           // top-right
        (rect.right() - r, rect.bottom() - r, 0.0),         // bottom-right
        (rect.x + r, rect.bottom() - r, 0.5 * PI),          // bottom-left
    ];
    for (cx, cy, start) in corners {
        for i in 0..CORNER_SEGMENTS {
            let a0 = start + (i as f32 / CORNER_SEGMENTS as f32) * 0.5 * PI;
            let a1 = start + ((i + 1) as f32 / CORNER_SEGMENTS as f32) * 0.5 * PI;
            vertices.push(SplineVertex { position: [cx, cy], color });
            vertices.push(SplineVertex {
                position: [cx + r * a0.cos(), cy + r * a0.sin()],
                color,
            });
            vertices.push(SplineVertex {
                position: [cx + r * a1.cos(), cy + r * a1.sin()],
                color,
            });
        }
    }

    vertices
}

/// Rounded rectangle outline: edge strips plus quarter-arc ribbons.
pub fn create_rounded_rect_outline_vertices(
    rect: &Rect,
    color: [f32; 4],
    radius: f32,
    thickness: f32,
) -> Vec<SplineVertex> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.5 {
        return create_rect_outline_vertices(rect, color, thickness);
    }

    let mut vertices = Vec::new();

    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x + r, rect.y, rect.width - 2.0 * r, thickness),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x + r, rect.bottom() - thickness, rect.width - 2.0 * r, thickness),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.x, rect.y + r, thickness, rect.height - 2.0 * r),
        color,
    ));
    vertices.extend(create_rect_vertices(
        &Rect::new(rect.right() - thickness, rect.y + r, thickness, rect.height - 2.0 * r),
        color,
    ));

    let corners = [
        (rect.x + r, rect.y + r, PI),
        (rect.right() - r, rect.y + r, 1.5 * PI),
        (rect.right() - r, rect.bottom() - r, 0.0),
        (rect.x + r, rect.bottom() - r, 0.5 * PI),
    ];
    let inner = (r - thickness).max(0.0);
    for (cx, cy, start) in corners {
        for i in 0..CORNER_SEGMENTS {
            let a0 = start + (i as f32 / CORNER_SEGMENTS as f32) * 0.5 * PI;
            let a1 = start + ((i + 1) as f32 / CORNER_SEGMENTS as f32) * 0.5 * PI;
            let (o0, o1) = (
                [cx + r * a0.cos(), cy + r * a0.sin()],
                [cx + r * a1.cos(), cy + r * a1.sin()],
            );
            let (i0, i1) = (
                [cx + inner * a0.cos(), cy + inner * a0.sin()],
                [cx + inner * a1.cos(), cy + inner * a1.sin()],
            );
            vertices.push(SplineVertex { position: o0, color });
            vertices.push(SplineVertex { position: i0, color });
            vertices.push(SplineVertex { position: o1, color });
            vertices.push(SplineVertex { position: i0, color });
            vertices.push(SplineVertex { position: i1, color });
            vertices.push(SplineVertex { position: o1, color });
        }
    }

    vertices
}

/// Dashed rectangle outline, used for ghost affordances.
pub fn create_dashed_rect_outline_vertices(
    rect: &Rect,
    color: [f32; 4],
    thickness: f32,
    dash_length: f32,
    gap_length: f32,
) -> Vec<SplineVertex> {
    let mut vertices = Vec::new();

    let create_dashes = |x0: f32, y0: f32, x1: f32, y1: f32, horizontal: bool| -> Vec<SplineVertex> {
        let mut dash_vertices = Vec::new();
        let length = if horizontal { (x1 - x0).abs() } else { (y1 - y0).abs() };
        let pitch = dash_length + gap_length;
        let count = (length / pitch).ceil() as i32;

        for i in 0..count {
            let start = i as f32 * pitch;
            let end = (start + dash_length).min(length);
            if horizontal {
                let dx0 = x0.min(x1) + start;
                let dx1 = x0.min(x1) + end;
                dash_vertices.extend(create_rect_vertices(
                    &Rect::new(dx0, y0, dx1 - dx0, thickness),
                    color,
                ));
            } else {
                let dy0 = y0.min(y1) + start;
                let dy1 = y0.min(y1) + end;
                dash_vertices.extend(create_rect_vertices(
                    &Rect::new(x0, dy0, thickness, dy1 - dy0),
                    color,
                ));
            }
        }
        dash_vertices
    };

    vertices.extend(create_dashes(rect.x, rect.y, rect.right(), rect.y, true));
    vertices.extend(create_dashes(
        rect.x,
        rect.bottom() - thickness,
        rect.right(),
        rect.bottom() - thickness,
        true,
    ));
    vertices.extend(create_dashes(
        rect.x,
        rect.y + thickness,
        rect.x,
        rect.bottom() - thickness,
        false,
    ));
    vertices.extend(create_dashes(
        rect.right() - thickness,
        rect.y + thickness,
        rect.right() - thickness,
        rect.bottom() - thickness,
        false,
    ));

    vertices
}

/// Filled circle as a triangle fan.
pub fn create_circle_vertices(cx: f32, cy: f32, radius: f32, color: [f32; 4]) -> Vec<SplineVertex> {
    const SEGMENTS: usize = 16;
    let mut vertices = Vec::with_capacity(SEGMENTS * 3);
    for i in 0..SEGMENTS {
        let a0 = (i as f32 / SEGMENTS as f32) * 2.0 * PI;
        let a1 = ((i + 1) as f32 / SEGMENTS as f32) * 2.0 * PI;
        vertices.push(SplineVertex { position: [cx, cy], color });
        vertices.push(SplineVertex {
            position: [cx + radius * a0.cos(), cy + radius * a0.sin()],
            color,
        });
        vertices.push(SplineVertex {
            position: [cx + radius * a1.cos(), cy + radius * a1.sin()],
            color,
        });
    }
    vertices
}

/// Shared modal chrome: dimmed backdrop, drop shadow, raised dialog surface.
pub fn create_dialog_backdrop(output: &mut WidgetOutput, screen: &Rect, dialog: &Rect, scale: f32) {
    let corner_radius = 8.0 * scale;

    output
        .spline_vertices
        .extend(create_rect_vertices(screen, [0.0, 0.0, 0.0, 0.6]));

    let shadow_offset = 3.0 * scale;
    let shadow_rect = Rect::new(
        dialog.x + shadow_offset,
        dialog.y + shadow_offset,
        dialog.width,
        dialog.height,
    );
    output.spline_vertices.extend(create_rounded_rect_vertices(
        &shadow_rect,
        [0.0, 0.0, 0.0, 0.5],
        corner_radius,
    ));
    output.spline_vertices.extend(create_rounded_rect_vertices(
        dialog,
        theme::SURFACE_RAISED.lighten(0.06).to_array(),
        corner_radius,
    ));
}

/// Theme colors - classic dark mode
pub mod theme {
    use crate::ui::Color;

    pub const BACKGROUND: Color = Color::rgba(0.051, 0.051, 0.051, 1.0);      // #0d0d0d
    pub const SURFACE: Color = Color::rgba(0.102, 0.102, 0.102, 1.0);         // #1a1a1a - panels
    pub const SURFACE_RAISED: Color = Color::rgba(0.145, 0.145, 0.145, 1.0);  // #252525 - elevated
    pub const SURFACE_HOVER: Color = Color::rgba(0.180, 0.180, 0.180, 1.0);   // #2e2e2e
    pub const BORDER: Color = Color::rgba(0.200, 0.200, 0.200, 1.0);          // #333333
    pub const BORDER_LIGHT: Color = Color::rgba(0.250, 0.250, 0.250, 1.0);    // #404040
    pub const TEXT: Color = Color::rgba(0.878, 0.878, 0.878, 1.0);            // #e0e0e0
    pub const TEXT_BRIGHT: Color = Color::rgba(0.940, 0.940, 0.940, 1.0);     // #f0f0f0
    pub const TEXT_MUTED: Color = Color::rgba(0.502, 0.502, 0.502, 1.0);      // #808080

    // Accent for selections, focus rings and primary buttons
    pub const ACCENT: Color = Color::rgba(0.259, 0.647, 0.961, 1.0);          // #42A5F5
    pub const DANGER: Color = Color::rgba(0.937, 0.325, 0.314, 1.0);          // #EF5350

    // Canvas behind the diagram, slightly darker than panels
    pub const PANEL_CANVAS: Color = Color::rgba(0.043, 0.043, 0.055, 1.0);
    pub const PANEL_SIDEBAR: Color = Color::rgba(0.075, 0.075, 0.075, 1.0);   // #131313
}
