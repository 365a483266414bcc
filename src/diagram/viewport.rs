//! Pan/zoom state for the diagram.
//!
//! Screen position = diagram position * scale + pan. The viewport starts at
//! identity and is never persisted; `fit_to_view` recomputes it from the
//! diagram bounds whenever requested.

use crate::diagram::geometry::{MAX_SCALE, MIN_SCALE};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagram_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.pan_x, y * self.scale + self.pan_y)
    }

    pub fn screen_to_diagram(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pan_x) / self.scale, (y - self.pan_y) / self.scale)
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the scale by `factor`, keeping the diagram point under the
    /// given screen position stationary. Scale is clamped; the pan is
    /// derived from the clamped scale so a clamped zoom still anchors
    /// correctly.
    pub fn zoom_at(&mut self, screen_x: f32, screen_y: f32, factor: f32) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.pan_x = screen_x - (screen_x - self.pan_x) * ratio;
        self.pan_y = screen_y - (screen_y - self.pan_y) * ratio;
        self.scale = new_scale;
    }

    /// Zoom anchored at the container center, for the HUD buttons.
    pub fn zoom_by(&mut self, factor: f32, container_w: f32, container_h: f32) {
        self.zoom_at(container_w / 2.0, container_h / 2.0, factor);
    }

    /// Scale and center the whole diagram inside the container, leaving
    /// `padding` pixels spare in the tighter dimension. Does nothing when
    /// the container is unmeasured or the diagram is empty.
    pub fn fit_to_view(
        &mut self,
        container_w: f32,
        container_h: f32,
        diagram_w: f32,
        diagram_h: f32,
        padding: f32,
    ) {
        if container_w <= 0.0 || container_h <= 0.0 || diagram_w <= 0.0 || diagram_h <= 0.0 {
            return;
        }
        let scale_x = (container_w - padding) / diagram_w;
        let scale_y = (container_h - padding) / diagram_h;
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);
        self.pan_x = (container_w - diagram_w * self.scale) / 2.0;
        self.pan_y = (container_h - diagram_h * self.scale) / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_creation() {
        let vp = Viewport::new();
        assert_eq!(vp.scale, 1.0);
        assert_eq!((vp.pan_x, vp.pan_y), (0.0, 0.0));
    }

    #[test]
    fn transforms_round_trip() {
        let mut vp = Viewport::new();
        vp.pan_by(13.0, -7.0);
        vp.zoom_at(100.0, 50.0, 1.7);
        let (sx, sy) = vp.diagram_to_screen(42.0, 99.0);
        let (dx, dy) = vp.screen_to_diagram(sx, sy);
        assert!((dx - 42.0).abs() < 1e-4);
        assert!((dy - 99.0).abs() < 1e-4);
    }

    #[test]
    fn scale_clamps_both_ends() {
        let mut vp = Viewport::new();
        for _ in 0..50 {
            vp.zoom_at(0.0, 0.0, 2.0);
        }
        assert_eq!(vp.scale, MAX_SCALE);
        for _ in 0..50 {
            vp.zoom_at(0.0, 0.0, 0.5);
        }
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn zoom_keeps_cursor_point_stationary() {
        let mut vp = Viewport::new();
        vp.pan_by(-30.0, 12.0);
        let cursor = (250.0, 140.0);
        let before = vp.screen_to_diagram(cursor.0, cursor.1);
        vp.zoom_at(cursor.0, cursor.1, 1.35);
        let after = vp.screen_to_diagram(cursor.0, cursor.1);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn zoom_by_anchors_at_container_center() {
        let mut vp = Viewport::new();
        let center = (400.0, 300.0);
        let before = vp.screen_to_diagram(center.0, center.1);
        vp.zoom_by(1.25, 800.0, 600.0);
        let after = vp.screen_to_diagram(center.0, center.1);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn fit_scales_and_centers() {
        // 1000x400 into 800x600 with 32 padding: width is the tighter
        // dimension, (800-32)/1000 = 0.768.
        let mut vp = Viewport::new();
        vp.fit_to_view(800.0, 600.0, 1000.0, 400.0, 32.0);
        assert!((vp.scale - 0.768).abs() < 1e-4);
        assert!((vp.pan_x - (800.0 - 1000.0 * 0.768) / 2.0).abs() < 1e-3);
        assert!((vp.pan_y - (600.0 - 400.0 * 0.768) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn fit_clamps_tiny_and_huge_diagrams() {
        let mut vp = Viewport::new();
        vp.fit_to_view(800.0, 600.0, 10.0, 10.0, 32.0);
        assert_eq!(vp.scale, MAX_SCALE);

        let mut vp = Viewport::new();
        vp.fit_to_view(800.0, 600.0, 100_000.0, 100.0, 32.0);
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn fit_ignores_unmeasured_container() {
        let mut vp = Viewport::new();
        vp.pan_by(5.0, 5.0);
        let before = vp;
        vp.fit_to_view(0.0, 0.0, 1000.0, 400.0, 32.0);
        assert_eq!(vp, before);
        vp.fit_to_view(800.0, 600.0, 0.0, 0.0, 32.0);
        assert_eq!(vp, before);
    }
}
