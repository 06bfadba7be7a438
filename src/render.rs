use crate::config::MarkerStyle;
use crate::point::AnnotationSet;
use crate::surface::Surface;
use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Base surface with one marker per point, in order.
pub fn render(surface: &dyn Surface, points: &AnnotationSet, style: &MarkerStyle) -> RgbaImage {
    let mut img = surface.base().clone();
    let [r, g, b] = style.color;
    for p in points.iter() {
        let (cx, cy) = surface.to_canvas(p);
        draw_disc(&mut img, cx, cy, style.size / 2.0, [r, g, b, 255]);
    }
    img
}

pub fn export_png(
    surface: &dyn Surface,
    points: &AnnotationSet,
    style: &MarkerStyle,
    path: &Path,
) -> Result<(), ExportError> {
    render(surface, points, style)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Exported {} markers to {}", points.len(), path.display());
    Ok(())
}

/// `photo.jpg` -> `photo_annotated.png`, next to the image.
pub fn default_export_path(image_path: &Path, surface_key: &str) -> PathBuf {
    let stem = match surface_key {
        "image" => image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image"),
        other => other,
    };
    image_path.with_file_name(format!("{stem}_annotated.png"))
}

/// Fill every pixel whose center lies within `radius` of `(cx, cy)`.
pub fn draw_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    let y0 = (cy - radius).floor() as i32;
    let y1 = (cy + radius).ceil() as i32;
    let r2 = radius * radius;

    for py in y0.max(0)..=y1.min(h - 1) {
        for px in x0.max(0)..=x1.min(w - 1) {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(px as u32, py as u32, image::Rgba(color));
            }
        }
    }
}
