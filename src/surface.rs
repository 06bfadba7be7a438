use crate::click::{ClickEvent, PointHit};
use crate::config::ScatterConfig;
use crate::point::{AnnotationSet, MarkedPoint};
use crate::render::draw_disc;
use image::{Rgba, RgbaImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Image,
    Graph,
}

impl SurfaceId {
    /// Stable name used for store files and export names.
    pub fn key(self) -> &'static str {
        match self {
            SurfaceId::Image => "image",
            SurfaceId::Graph => "graph",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Failed to load image {path:?}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Something that can be clicked and drawn on.
///
/// Canvas coordinates are pixels of [`Surface::base`], origin top-left.
pub trait Surface {
    fn id(&self) -> SurfaceId;
    fn title(&self) -> &str;
    /// Background without markers, computed once.
    fn base(&self) -> &RgbaImage;
    fn to_canvas(&self, point: &MarkedPoint) -> (f32, f32);
    /// Click at `pos`. `tolerance` is in canvas pixels.
    fn hit(&self, pos: (f32, f32), tolerance: f32) -> ClickEvent;

    fn canvas_size(&self) -> (f32, f32) {
        let base = self.base();
        (base.width() as f32, base.height() as f32)
    }
}

/// Resolve a click at canvas `pos`. The topmost marker within
/// `marker_radius` wins, so clicking anywhere on a drawn marker erases it;
/// otherwise the surface decides. Both distances are in canvas pixels.
pub fn resolve_click(
    surface: &dyn Surface,
    markers: &AnnotationSet,
    pos: (f32, f32),
    marker_radius: f32,
    tolerance: f32,
) -> ClickEvent {
    let on_marker = markers.iter().rev().find(|p| {
        let (cx, cy) = surface.to_canvas(p);
        (cx - pos.0).powi(2) + (cy - pos.1).powi(2) <= marker_radius * marker_radius
    });
    match on_marker {
        Some(p) => ClickEvent::single(PointHit {
            x: p.x,
            y: p.y,
            point_index: None,
        }),
        None => surface.hit(pos, tolerance),
    }
}

// ── Image ───────────────────────────────────────────────────────────────────

pub struct ImageSurface {
    title: String,
    base: RgbaImage,
}

impl ImageSurface {
    pub fn open(path: &Path) -> Result<Self, SurfaceError> {
        let img = image::open(path).map_err(|source| SurfaceError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Image")
            .replace('_', " ");
        let title = format!("{stem}: click to mark any pixel.");
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_image(title, img.to_rgba8()))
    }

    pub fn from_image(title: String, base: RgbaImage) -> Self {
        Self { title, base }
    }
}

impl Surface for ImageSurface {
    fn id(&self) -> SurfaceId {
        SurfaceId::Image
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Pixel `i` covers canvas `[i, i + 1)`; markers sit on its center.
    fn to_canvas(&self, point: &MarkedPoint) -> (f32, f32) {
        (point.x as f32 + 0.5, point.y as f32 + 0.5)
    }

    fn hit(&self, pos: (f32, f32), _tolerance: f32) -> ClickEvent {
        let (w, h) = self.canvas_size();
        if !(0.0..w).contains(&pos.0) || !(0.0..h).contains(&pos.1) {
            return ClickEvent::empty();
        }
        ClickEvent::single(PointHit {
            x: pos.0.floor() as f64,
            y: pos.1.floor() as f64,
            point_index: None,
        })
    }
}

// ── Scatter ─────────────────────────────────────────────────────────────────

const PLOT_WIDTH: u32 = 760;
const PLOT_HEIGHT: u32 = 450;
const PLOT_MARGIN: f32 = 24.0;
const DOT_RADIUS: f32 = 4.0;
const DOT_COLOR: [u8; 4] = [99, 110, 250, 255];

/// Maps data units onto the plot canvas. Data y grows upward.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PlotFrame {
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl PlotFrame {
    fn around(min: i64, max: i64) -> Self {
        let span = ((max - min) as f64).max(1.0);
        let pad = span * 0.05;
        let range = (min as f64 - pad, max as f64 + pad);
        Self {
            x_range: range,
            y_range: range,
        }
    }

    fn to_canvas(&self, x: f64, y: f64) -> (f32, f32) {
        let inner_w = PLOT_WIDTH as f32 - 2.0 * PLOT_MARGIN;
        let inner_h = PLOT_HEIGHT as f32 - 2.0 * PLOT_MARGIN;
        let tx = (x - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        let ty = (y - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        (
            PLOT_MARGIN + tx as f32 * inner_w,
            PLOT_HEIGHT as f32 - PLOT_MARGIN - ty as f32 * inner_h,
        )
    }
}

/// Fixed cloud of random dots. Clicks snap to the nearest dot.
pub struct ScatterSurface {
    title: String,
    samples: Vec<(i64, i64)>,
    frame: PlotFrame,
    base: RgbaImage,
}

impl ScatterSurface {
    pub fn new(config: &ScatterConfig) -> Self {
        let samples = generate_samples(config);
        let frame = PlotFrame::around(config.min, config.max);

        let mut base = RgbaImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, Rgba([255, 255, 255, 255]));
        for &(x, y) in &samples {
            let (cx, cy) = frame.to_canvas(x as f64, y as f64);
            draw_disc(&mut base, cx, cy, DOT_RADIUS, DOT_COLOR);
        }

        Self {
            title: "Random dots: click to mark any data point.".to_owned(),
            samples,
            frame,
            base,
        }
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[(i64, i64)] {
        &self.samples
    }
}

/// All x values are drawn first, then all y values.
fn generate_samples(config: &ScatterConfig) -> Vec<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let xs: Vec<i64> = (0..config.count)
        .map(|_| rng.gen_range(config.min..=config.max))
        .collect();
    let ys: Vec<i64> = (0..config.count)
        .map(|_| rng.gen_range(config.min..=config.max))
        .collect();
    xs.into_iter().zip(ys).collect()
}

impl Surface for ScatterSurface {
    fn id(&self) -> SurfaceId {
        SurfaceId::Graph
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn base(&self) -> &RgbaImage {
        &self.base
    }

    fn to_canvas(&self, point: &MarkedPoint) -> (f32, f32) {
        self.frame.to_canvas(point.x, point.y)
    }

    fn hit(&self, pos: (f32, f32), tolerance: f32) -> ClickEvent {
        let mut best: Option<(usize, f32)> = None;
        for (i, &(x, y)) in self.samples.iter().enumerate() {
            let (cx, cy) = self.frame.to_canvas(x as f64, y as f64);
            let d = ((cx - pos.0).powi(2) + (cy - pos.1).powi(2)).sqrt();
            if d <= tolerance && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        match best {
            Some((i, _)) => {
                let (x, y) = self.samples[i];
                ClickEvent::single(PointHit {
                    x: x as f64,
                    y: y as f64,
                    point_index: Some(i),
                })
            }
            None => ClickEvent::empty(),
        }
    }
}
