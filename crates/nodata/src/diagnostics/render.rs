//! Rendering of diagnostic layers to PNG files.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use log::{debug, info};

use super::layer::{FeatureGroup, LayerSpec};
use crate::error::{NodataError, Result};
use crate::schema::{BoundingBox, Coord, Geometry};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LEGEND_SWATCH: u32 = 12;

/// Consumes diagnostic layers and writes one image per layer.
pub trait Renderer {
    /// Render `layers` into `output_dir`.
    ///
    /// Each file is named `{prefix}_{layer}_{timestamp}.png`. Returns the
    /// written paths in layer order.
    fn render(
        &self,
        layers: &[LayerSpec],
        output_dir: &Path,
        prefix: &str,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>>;
}

/// File name a renderer should use for a layer.
pub fn layer_file_name(layer: &LayerSpec, prefix: &str, timestamp: &str) -> String {
    format!("{}_{}_{}.png", prefix, layer.kind.file_stem(), timestamp)
}

/// Canvas configuration for the PNG renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Blank border around the plotted extent, in pixels.
    pub margin: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            margin: 24,
        }
    }
}

/// Draws layers as raster maps. Axes are equal-scaled and hidden.
pub struct PngRenderer {
    config: RenderConfig,
}

impl PngRenderer {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Draw one layer into an image.
    pub fn draw(&self, layer: &LayerSpec) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.config.width, self.config.height, BACKGROUND);

        if let Some(bbox) = layer.bounding_box() {
            let view = Viewport::fit(bbox, &self.config);
            for group in &layer.groups {
                draw_group(&mut img, &view, group);
            }
        }

        draw_legend(&mut img, layer);
        img
    }
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PngRenderer {
    fn render(
        &self,
        layers: &[LayerSpec],
        output_dir: &Path,
        prefix: &str,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(layers.len());
        for layer in layers {
            let path = output_dir.join(layer_file_name(layer, prefix, timestamp));
            self.draw(layer).save(&path).map_err(|e| {
                NodataError::Visualization(format!("could not write {}: {}", path.display(), e))
            })?;
            debug!("Rendered '{}' to {}", layer.title, path.display());
            paths.push(path);
        }
        info!("Saved {} diagnostic map(s) to {}", paths.len(), output_dir.display());
        Ok(paths)
    }
}

/// Maps data coordinates to pixel coordinates.
struct Viewport {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    fn fit(bbox: BoundingBox, config: &RenderConfig) -> Self {
        let usable_w = config.width.saturating_sub(2 * config.margin).max(1) as f64;
        let usable_h = config.height.saturating_sub(2 * config.margin).max(1) as f64;

        let scale = match (bbox.width() > 0.0, bbox.height() > 0.0) {
            (true, true) => (usable_w / bbox.width()).min(usable_h / bbox.height()),
            (true, false) => usable_w / bbox.width(),
            (false, true) => usable_h / bbox.height(),
            (false, false) => 1.0,
        };

        // Center the extent inside the usable area.
        let offset_x = config.margin as f64 + (usable_w - bbox.width() * scale) / 2.0;
        let offset_y = config.margin as f64 + (usable_h - bbox.height() * scale) / 2.0;

        Self {
            min_x: bbox.min_x,
            max_y: bbox.max_y,
            scale,
            offset_x,
            offset_y,
        }
    }

    fn project(&self, c: Coord) -> (i64, i64) {
        let px = self.offset_x + (c.x - self.min_x) * self.scale;
        let py = self.offset_y + (self.max_y - c.y) * self.scale;
        (px.round() as i64, py.round() as i64)
    }
}

fn draw_group(img: &mut RgbImage, view: &Viewport, group: &FeatureGroup) {
    let color = Rgb(group.style.color);
    let marker = group.style.marker_size.max(1) as i64;

    for feature in &group.features {
        match &feature.geometry {
            Geometry::Point(c) => draw_marker(img, view.project(*c), marker, color),
            Geometry::MultiPoint(points) => {
                for c in points {
                    draw_marker(img, view.project(*c), marker, color);
                }
            }
            Geometry::LineString(parts) => {
                for part in parts {
                    draw_path(img, view, part, color);
                }
            }
            Geometry::Polygon(rings) => {
                let projected: Vec<Vec<(i64, i64)>> = rings
                    .iter()
                    .map(|r| r.points.iter().map(|c| view.project(*c)).collect())
                    .collect();
                fill_polygon(img, &projected, color);
                for ring in rings {
                    draw_path(img, view, &ring.points, color);
                }
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_marker(img: &mut RgbImage, (cx, cy): (i64, i64), size: i64, color: Rgb<u8>) {
    let half = size / 2;
    for y in (cy - half)..(cy - half + size) {
        for x in (cx - half)..(cx - half + size) {
            put(img, x, y, color);
        }
    }
}

fn draw_path(img: &mut RgbImage, view: &Viewport, points: &[Coord], color: Rgb<u8>) {
    for pair in points.windows(2) {
        draw_line(img, view.project(pair[0]), view.project(pair[1]), color);
    }
}

/// Bresenham line.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;

    loop {
        put(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Even-odd scanline fill across all rings, so inner rings leave holes.
fn fill_polygon(img: &mut RgbImage, rings: &[Vec<(i64, i64)>], color: Rgb<u8>) {
    let ys = rings.iter().flatten().map(|&(_, y)| y);
    let (Some(min_y), Some(max_y)) = (ys.clone().min(), ys.max()) else {
        return;
    };

    let min_y = min_y.max(0);
    let max_y = max_y.min(img.height() as i64 - 1);

    for y in min_y..=max_y {
        let scan = y as f64 + 0.5;
        let mut crossings: Vec<f64> = Vec::new();

        for ring in rings {
            for edge in ring.windows(2) {
                let ((x0, y0), (x1, y1)) = (edge[0], edge[1]);
                let (y0f, y1f) = (y0 as f64, y1 as f64);
                if (y0f <= scan && y1f > scan) || (y1f <= scan && y0f > scan) {
                    let t = (scan - y0f) / (y1f - y0f);
                    crossings.push(x0 as f64 + t * (x1 - x0) as f64);
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let start = span[0].round() as i64;
            let end = span[1].round() as i64;
            for x in start..end {
                put(img, x, y, color);
            }
        }
    }
}

/// Colored swatches in the top-left corner, one per legend entry.
fn draw_legend(img: &mut RgbImage, layer: &LayerSpec) {
    let size = LEGEND_SWATCH as i64;
    for (i, entry) in layer.legend().iter().enumerate() {
        let top = 6 + i as i64 * (size + 4);
        for y in top..top + size {
            for x in 6..6 + size {
                put(img, x, y, Rgb(entry.color));
            }
        }
    }
}
