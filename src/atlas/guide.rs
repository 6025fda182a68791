//! Guide overlay: an upscaled copy of the atlas with every island border
//! and UV outline drawn on top, used as a painting template outside the app.

use std::path::Path;

use image::{Pixel, Rgba, RgbaImage};
use tracing::info;

use crate::error::Result;
use crate::raster::{codec, RasterSurface};
use crate::types::Shape;

use super::uv_mapper::outline_in_raster;

/// Colors and sizes of the overlay strokes, in output pixels.
#[derive(Debug, Clone)]
pub struct GuideStyle {
    pub border: Rgba<u8>,
    pub outline: Rgba<u8>,
    pub vertex: Rgba<u8>,
    pub outline_width: u32,
    pub vertex_radius: u32,
    /// Dash and gap length of island borders.
    pub dash: u32,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            border: Rgba([0, 0, 0, 128]),
            outline: Rgba([255, 0, 255, 255]),
            vertex: Rgba([0, 255, 255, 255]),
            outline_width: 2,
            vertex_radius: 4,
            dash: 8,
        }
    }
}

/// Render the guide at `export_size x export_size`.
pub fn render_guide<'a, I>(raster: &RasterSurface, shapes: I, export_size: u32, style: &GuideStyle) -> RgbaImage
where
    I: IntoIterator<Item = &'a Shape>,
{
    let mut image = raster.export_scaled(export_size);
    let scale = export_size as f32 / raster.size() as f32;

    for shape in shapes {
        let island = &shape.island;
        draw_dashed_rect(
            &mut image,
            (island.x as f32 * scale).round() as i32,
            (island.y as f32 * scale).round() as i32,
            (island.right() as f32 * scale).round() as i32,
            (island.bottom() as f32 * scale).round() as i32,
            style.dash,
            style.border,
        );

        let outline: Vec<[i32; 2]> = outline_in_raster(shape)
            .into_iter()
            .map(|[x, y]| [(x * scale).round() as i32, (y * scale).round() as i32])
            .collect();

        for (i, from) in outline.iter().enumerate() {
            let to = outline[(i + 1) % outline.len()];
            draw_line(&mut image, *from, to, style.outline_width, style.outline);
        }
        for point in &outline {
            fill_circle(&mut image, *point, style.vertex_radius as i32, style.vertex);
        }
    }

    image
}

/// Render and write the guide as PNG.
pub fn write_guide<'a, I>(path: &Path, raster: &RasterSurface, shapes: I, export_size: u32) -> Result<()>
where
    I: IntoIterator<Item = &'a Shape>,
{
    let image = render_guide(raster, shapes, export_size, &GuideStyle::default());
    std::fs::write(path, codec::encode_png(&image)?)?;
    info!(path = %path.display(), size = export_size, "Wrote guide image");
    Ok(())
}

fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return;
    }
    image.get_pixel_mut(x as u32, y as u32).blend(&color);
}

/// Square stamp of side `width` centred on `(x, y)`.
fn stamp(image: &mut RgbaImage, x: i32, y: i32, width: u32, color: Rgba<u8>) {
    let width = width.max(1) as i32;
    let half = width / 2;
    for dy in -half..width - half {
        for dx in -half..width - half {
            blend_pixel(image, x + dx, y + dy, color);
        }
    }
}

/// Bresenham line.
fn draw_line(image: &mut RgbaImage, from: [i32; 2], to: [i32; 2], width: u32, color: Rgba<u8>) {
    let [mut x0, mut y0] = from;
    let [x1, y1] = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(image, x0, y0, width, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// One-pixel rectangle outline, dashed along each edge from its start.
fn draw_dashed_rect(image: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, dash: u32, color: Rgba<u8>) {
    let dash = dash.max(1) as i32;
    let on = |d: i32| (d / dash) % 2 == 0;

    for x in x0..=x1 {
        if on(x - x0) {
            blend_pixel(image, x, y0, color);
            blend_pixel(image, x, y1, color);
        }
    }
    // Corners already drawn by the horizontal edges
    for y in (y0 + 1)..y1 {
        if on(y - y0) {
            blend_pixel(image, x0, y, color);
            blend_pixel(image, x1, y, color);
        }
    }
}

fn fill_circle(image: &mut RgbaImage, center: [i32; 2], radius: i32, color: Rgba<u8>) {
    let [cx, cy] = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                blend_pixel(image, cx + dx, cy + dy, color);
            }
        }
    }
}
