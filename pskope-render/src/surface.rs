//! Drawing surfaces

use crate::color::Rgba;
use thiserror::Error;

/// Pixel size of every stage surface
pub const STAGE_SURFACE: (u32, u32) = (500, 250);

/// Pixel size of the dynamic (focus/context or live tap) surface
pub const DYNAMIC_SURFACE: (u32, u32) = (500, 100);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface dimensions must be non-zero, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },
}

/// A point in surface pixel coordinates, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Line paint parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

/// Text drawn onto a surface
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: Rgba,
}

/// Fixed-size 2D raster target
///
/// Renderers borrow a surface for the duration of one call and never keep it.
pub trait DrawSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reset every pixel to transparent and drop all text
    fn clear(&mut self);

    /// Stroke a polyline through `points`
    fn stroke_path(&mut self, points: &[Point], stroke: Stroke);

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Rgba);
}

/// In-memory RGBA surface
///
/// Text is not rasterized; runs are kept alongside the pixels and laid out by
/// whatever displays the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    text: Vec<TextRun>,
    clears: u64,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSized { width, height });
        }
        Ok(Self::sized(width, height))
    }

    /// A 500x250 stage surface
    pub fn stage() -> Self {
        Self::sized(STAGE_SURFACE.0, STAGE_SURFACE.1)
    }

    /// A 500x100 dynamic surface
    pub fn dynamic() -> Self {
        Self::sized(DYNAMIC_SURFACE.0, DYNAMIC_SURFACE.1)
    }

    fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            text: Vec::new(),
            clears: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.text
    }

    /// Number of times the surface has been cleared
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// True when nothing is drawn
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.pixels.iter().all(|p| p.is_transparent())
    }

    /// Whether any pixel in column `x` is painted
    pub fn column_painted(&self, x: u32) -> bool {
        (0..self.height).any(|y| self.pixel(x, y).is_some_and(|p| !p.is_transparent()))
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize) * self.width as usize + x as usize;
        self.pixels[idx] = color.over(self.pixels[idx]);
    }

    fn stamp(&mut self, x: f32, y: f32, size: i64, color: Rgba) {
        let x0 = x.floor() as i64 - (size - 1) / 2;
        let y0 = y.floor() as i64 - (size - 1) / 2;
        for dy in 0..size {
            for dx in 0..size {
                self.blend(x0 + dx, y0 + dy, color);
            }
        }
    }

    fn segment(&mut self, from: Point, to: Point, size: i64, color: Rgba) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        // First point of every segment after the first was stamped by the
        // previous one
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            self.stamp(from.x + dx * t, from.y + dy * t, size, color);
        }
    }
}

impl DrawSurface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
        self.text.clear();
        self.clears += 1;
    }

    fn stroke_path(&mut self, points: &[Point], stroke: Stroke) {
        let finite = |p: &&Point| p.x.is_finite() && p.y.is_finite();
        let mut points = points.iter().filter(finite);
        let Some(&first) = points.next() else {
            return;
        };

        let size = stroke.width.round().max(1.0) as i64;
        self.stamp(first.x, first.y, size, stroke.color);

        let mut prev = first;
        for &point in points {
            self.segment(prev, point, size, stroke.color);
            prev = point;
        }
    }

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        self.text.push(TextRun {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
