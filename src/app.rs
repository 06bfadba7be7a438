use crate::config::{AppConfig, MarkerStyle};
use crate::point::{AnnotationSet, MarkedPoint};
use crate::render::{default_export_path, export_png};
use crate::store::{apply_click, SurfaceStore};
use crate::surface::{resolve_click, ImageSurface, ScatterSurface, Surface, SurfaceId};
use crate::view::Viewport;
use eframe::egui;
use std::path::{Path, PathBuf};

const HELP: &[&str] = &[
    "Click once to add a marker. Click it again to remove it.",
    "On the image a click marks the pixel under the cursor.",
    "On the plot a click marks the nearest data point.",
    "Scroll to zoom, drag with the middle button to pan.",
    "Double-click or \"Reset view\" restores the default zoom.",
    "\"Save PNG\" (or Ctrl+S for both) keeps all markers in the exported image.",
];

const MIN_CANVAS_HEIGHT: f32 = 240.0;
const MAX_CANVAS_HEIGHT: f32 = 520.0;

/// One clickable surface with its own markers, store and view.
struct SurfacePanel {
    surface: Box<dyn Surface>,
    store: SurfaceStore,
    points: AnnotationSet,
    view: Viewport,
    texture: Option<egui::TextureHandle>,
}

impl SurfacePanel {
    fn new(surface: Box<dyn Surface>, store: SurfaceStore) -> Self {
        let points = store.load();
        let view = Viewport::new(surface.canvas_size());
        log::debug!(
            "{} starts with {} markers",
            surface.id().key(),
            points.len()
        );
        Self {
            surface,
            store,
            points,
            view,
            texture: None,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let base = self.surface.base();
        let size = [base.width() as usize, base.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, base.as_raw());
        let options = match self.surface.id() {
            SurfaceId::Image => egui::TextureOptions::NEAREST,
            SurfaceId::Graph => egui::TextureOptions::LINEAR,
        };
        self.texture = Some(ctx.load_texture(self.surface.id().key(), color_image, options));
    }

    fn click(&mut self, canvas: egui::Pos2, marker_size: f32, tolerance: f32) {
        // Markers are drawn at a fixed screen size, so scale by zoom.
        let event = resolve_click(
            self.surface.as_ref(),
            &self.points,
            (canvas.x, canvas.y),
            marker_size / 2.0 / self.view.zoom,
            tolerance / self.view.zoom,
        );
        self.points = apply_click(&mut self.store, Some(&event));
    }

    fn hovered_point(&self, canvas: egui::Pos2, tolerance: f32) -> Option<MarkedPoint> {
        self.surface
            .hit((canvas.x, canvas.y), tolerance / self.view.zoom)
            .first_point()
    }

    fn export(&self, path: &Path, style: &MarkerStyle) -> String {
        match export_png(self.surface.as_ref(), &self.points, style, path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("{e}");
                e.to_string()
            }
        }
    }

    fn show(&mut self, ui: &mut egui::Ui, config: &AppConfig, image_path: &Path, status: &mut String) {
        let ctx = ui.ctx().clone();
        self.ensure_texture(&ctx);

        ui.heading(self.surface.title());
        ui.horizontal(|ui| {
            ui.label(format!("Markers: {}", self.points.len()));
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", self.view.zoom * 100.0));
            ui.separator();
            if ui
                .add_enabled(!self.view.is_default(), egui::Button::new("Reset view"))
                .clicked()
            {
                self.view.reset();
            }
            if ui.button("Save PNG").clicked() {
                let key = self.surface.id().key();
                let suggested = default_export_path(image_path, key);
                let mut dialog = rfd::FileDialog::new().add_filter("PNG", &["png"]);
                if let Some(name) = suggested.file_name().and_then(|n| n.to_str()) {
                    dialog = dialog.set_file_name(name);
                }
                if let Some(dir) = suggested.parent() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.save_file() {
                    *status = self.export(&path, &config.marker);
                }
            }
        });

        let (_, natural_height) = self.surface.canvas_size();
        let height = natural_height.clamp(MIN_CANVAS_HEIGHT, MAX_CANVAS_HEIGHT);
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click_and_drag(),
        );
        let canvas_rect = response.rect;
        let painter = painter.with_clip_rect(canvas_rect);

        painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
        if let Some(ref tex) = self.texture {
            painter.image(
                tex.id(),
                self.view.surface_rect(canvas_rect),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        let [r, g, b] = config.marker.color;
        let marker_color = egui::Color32::from_rgb(r, g, b);
        for p in self.points.iter() {
            let (cx, cy) = self.surface.to_canvas(p);
            let center = self.view.to_screen(canvas_rect, egui::pos2(cx, cy));
            painter.circle_filled(center, config.marker.size / 2.0, marker_color);
        }

        // Pan (middle mouse button)
        if response.hovered() && ctx.input(|i| i.pointer.middle_down()) {
            self.view.pan_by(ctx.input(|i| i.pointer.delta()));
        }

        // Zoom (scroll wheel); the enclosing scroll area must not see it too.
        if response.hovered() {
            let scroll_delta = take_scroll(&ctx);
            if let (true, Some(cursor)) = (scroll_delta != 0.0, response.hover_pos()) {
                self.view
                    .zoom_at(canvas_rect, cursor, 1.0 + scroll_delta * 0.002);
            }
        }

        if let Some(cursor) = response.hover_pos() {
            let canvas = self.view.to_canvas(canvas_rect, cursor);
            if let Some(p) = self.hovered_point(canvas, config.hit_tolerance) {
                painter.text(
                    cursor + egui::vec2(12.0, -4.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!("x: {}, y: {}", p.x, p.y),
                    egui::FontId::monospace(12.0),
                    egui::Color32::WHITE,
                );
            }
        }

        if response.double_clicked() {
            self.view.reset();
        } else if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let canvas = self.view.to_canvas(canvas_rect, pos);
                self.click(canvas, config.marker.size, config.hit_tolerance);
            }
        }
    }
}

/// Vertical wheel delta for this frame, consumed.
fn take_scroll(ctx: &egui::Context) -> f32 {
    ctx.input_mut(|i| std::mem::take(&mut i.smooth_scroll_delta).y)
}

pub struct ClickAnnotateApp {
    image_path: PathBuf,
    config: AppConfig,
    panels: Vec<SurfacePanel>,
    status: String,
}

impl ClickAnnotateApp {
    pub fn new(image: ImageSurface, image_path: PathBuf, config: AppConfig) -> Self {
        let graph = ScatterSurface::new(&config.scatter);
        let panels = [
            Box::new(image) as Box<dyn Surface>,
            Box::new(graph) as Box<dyn Surface>,
        ]
        .into_iter()
        .map(|surface| {
            let store = SurfaceStore::open(config.storage, &image_path, surface.id().key());
            SurfacePanel::new(surface, store)
        })
        .collect();

        Self {
            image_path,
            config,
            panels,
            status: String::new(),
        }
    }

    fn export_all(&mut self) {
        let mut saved = Vec::new();
        for panel in &self.panels {
            let path = default_export_path(&self.image_path, panel.surface.id().key());
            saved.push(panel.export(&path, &self.config.marker));
        }
        self.status = saved.join("; ");
    }
}

impl eframe::App for ClickAnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.export_all();
        }

        egui::TopBottomPanel::top("help").show(ctx, |ui| {
            ui.heading("Image or data annotation");
            egui::CollapsingHeader::new("How to use")
                .default_open(false)
                .show(ui, |ui| {
                    for line in HELP {
                        ui.label(format!("• {line}"));
                    }
                });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                for panel in &mut self.panels {
                    panel.show(ui, &self.config, &self.image_path, &mut self.status);
                    ui.add_space(12.0);
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_zoom_consumes_the_wheel() {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            ctx.input_mut(|i| i.smooth_scroll_delta = egui::vec2(0.0, 30.0));
            assert_eq!(take_scroll(ctx), 30.0);
            assert_eq!(ctx.input(|i| i.smooth_scroll_delta), egui::Vec2::ZERO);
            assert_eq!(take_scroll(ctx), 0.0);
        });
    }
}
