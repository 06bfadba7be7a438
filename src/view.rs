use eframe::egui;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;

/// Pan and zoom of one surface inside its canvas rectangle. At the default
/// view the surface is centered at 1:1 scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub pan: egui::Vec2,
    pub zoom: f32,
    /// Surface size in canvas pixels.
    pub size: egui::Vec2,
}

impl Viewport {
    pub fn new(size: (f32, f32)) -> Self {
        Self {
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            size: egui::vec2(size.0, size.1),
        }
    }

    pub fn reset(&mut self) {
        self.pan = egui::Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub fn is_default(&self) -> bool {
        self.pan == egui::Vec2::ZERO && self.zoom == 1.0
    }

    /// Surface canvas coords to screen coords.
    pub fn to_screen(&self, rect: egui::Rect, canvas: egui::Pos2) -> egui::Pos2 {
        rect.center() + self.pan + (canvas.to_vec2() - self.size * 0.5) * self.zoom
    }

    /// Screen coords to surface canvas coords.
    pub fn to_canvas(&self, rect: egui::Rect, screen: egui::Pos2) -> egui::Pos2 {
        let rel = screen - rect.center() - self.pan;
        (rel / self.zoom + self.size * 0.5).to_pos2()
    }

    pub fn surface_rect(&self, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.to_screen(rect, egui::Pos2::ZERO),
            self.to_screen(rect, self.size.to_pos2()),
        )
    }

    /// Scale by `factor`, keeping the canvas point under `cursor` fixed.
    pub fn zoom_at(&mut self, rect: egui::Rect, cursor: egui::Pos2, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let cursor_rel = cursor - rect.center() - self.pan;
        self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
        self.zoom = new_zoom;
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.pan += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn close(a: egui::Pos2, b: egui::Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn default_view_centers_surface() {
        let v = Viewport::new((200.0, 100.0));
        let r = v.surface_rect(rect());
        assert!(close(r.min, egui::pos2(300.0, 250.0)));
        assert!(close(r.max, egui::pos2(500.0, 350.0)));
    }

    #[test]
    fn screen_and_canvas_are_inverse() {
        let mut v = Viewport::new((200.0, 100.0));
        v.pan = egui::vec2(13.0, -7.0);
        v.zoom = 2.5;
        let p = egui::pos2(42.0, 17.5);
        assert!(close(v.to_canvas(rect(), v.to_screen(rect(), p)), p));
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut v = Viewport::new((200.0, 100.0));
        let cursor = egui::pos2(320.0, 260.0);
        let before = v.to_canvas(rect(), cursor);
        v.zoom_at(rect(), cursor, 3.0);
        assert!(close(v.to_canvas(rect(), cursor), before));
        assert_eq!(v.zoom, 3.0);
    }

    #[test]
    fn zoom_is_clamped_and_reset_restores() {
        let mut v = Viewport::new((10.0, 10.0));
        v.zoom_at(rect(), rect().center(), 1000.0);
        assert_eq!(v.zoom, MAX_ZOOM);
        v.pan_by(egui::vec2(5.0, 5.0));
        assert!(!v.is_default());
        v.reset();
        assert!(v.is_default());
    }
}
