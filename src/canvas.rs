//! Freehand signature capture.
//!
//! Pointer and touch input are normalized to a single stroke-event variant
//! and accumulated into a persistent RGBA raster. The raster is the single
//! source of truth for "has the client signed": emptiness is a full-buffer
//! scan, never a flag.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};

use crate::error::AppError;

/// Stroke color: #2c3e50.
const STROKE_COLOR: [u8; 4] = [0x2c, 0x3e, 0x50, 0xff];
const LINE_WIDTH: f32 = 2.0;

/// Default capture surface size (desktop layout).
pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Normalized stroke input, regardless of origin device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeEvent {
    Begin(Point),
    Extend(Point),
    End,
}

/// Raw pointer event as delivered by the host input layer, in device
/// coordinates.
#[derive(Debug, Clone, Copy)]
pub struct RawPointer {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Touch phases map onto the same three primitives as mouse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

impl RawPointer {
    pub fn from_touch(phase: TouchPhase, x: f32, y: f32) -> Self {
        let kind = match phase {
            TouchPhase::Start => PointerKind::Down,
            TouchPhase::Move => PointerKind::Move,
            TouchPhase::End => PointerKind::Up,
        };
        Self { kind, x, y }
    }
}

/// Translate a raw pointer event into a stroke event, converting device
/// coordinates to surface-local ones via the surface's screen offset.
pub fn normalize(raw: RawPointer, offset: (f32, f32)) -> StrokeEvent {
    let local = Point::new(raw.x - offset.0, raw.y - offset.1);
    match raw.kind {
        PointerKind::Down => StrokeEvent::Begin(local),
        PointerKind::Move => StrokeEvent::Extend(local),
        PointerKind::Up | PointerKind::Leave => StrokeEvent::End,
    }
}

/// The signature surface. Owns the raster exclusively.
#[derive(Debug)]
pub struct StrokeCanvas {
    width: u32,
    height: u32,
    /// RGBA, row-major, `width * height * 4` bytes.
    pixels: Vec<u8>,
    /// Last point of the active stroke; `None` when no stroke is active.
    cursor: Option<Point>,
}

impl StrokeCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            cursor: None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Dispatch one normalized stroke event.
    pub fn handle(&mut self, event: StrokeEvent) {
        match event {
            StrokeEvent::Begin(p) => self.begin(p),
            StrokeEvent::Extend(p) => self.extend(p),
            StrokeEvent::End => self.end(),
        }
    }

    /// Start a stroke. Nothing is painted until the first extension, so a
    /// click without movement leaves the canvas empty.
    pub fn begin(&mut self, p: Point) {
        self.cursor = Some(p);
    }

    /// Extend the active stroke with a line segment. No-op without an
    /// active stroke.
    pub fn extend(&mut self, p: Point) {
        if let Some(last) = self.cursor {
            self.draw_segment(last, p);
            self.cursor = Some(p);
        }
    }

    pub fn end(&mut self) {
        self.cursor = None;
    }

    /// Erase the raster. Stroke styling and any in-progress stroke state
    /// are untouched.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// True iff every channel of every pixel is exactly zero. A full scan,
    /// so antialiasing residue can never read as "unsigned".
    pub fn is_empty(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    /// Resize the surface. Stroke styling carries over; the drawing does
    /// not: the raster comes back zeroed and any active stroke is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height * 4) as usize];
        self.cursor = None;
    }

    /// Export the raster as a self-describing `data:image/png;base64,…` URL.
    pub fn to_data_url(&self) -> Result<String, AppError> {
        let mut png = Vec::new();
        PngEncoder::new(Cursor::new(&mut png))
            .write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(|e| AppError::Internal(format!("PNG encode failed: {e}")))?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
    }

    // --------------------------------------------------------------------
    // Rasterization
    // --------------------------------------------------------------------

    /// Paint a round-capped segment by stamping discs along its length.
    fn draw_segment(&mut self, a: Point, b: Point) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let dist = (dx * dx + dy * dy).sqrt();
        // Two stamps per pixel of travel keeps the joint solid.
        let steps = ((dist * 2.0).ceil() as u32).max(1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(a.x + dx * t, a.y + dy * t);
        }
    }

    fn stamp(&mut self, cx: f32, cy: f32) {
        let r = LINE_WIDTH / 2.0;
        let x0 = (cx - r).floor() as i64;
        let x1 = (cx + r).ceil() as i64;
        let y0 = (cy - r).floor() as i64;
        let y1 = (cy + r).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    continue;
                }
                let px = x as f32 + 0.5 - cx;
                let py = y as f32 + 0.5 - cy;
                if px * px + py * py <= r * r {
                    let i = ((y as u32 * self.width + x as u32) * 4) as usize;
                    self.pixels[i..i + 4].copy_from_slice(&STROKE_COLOR);
                }
            }
        }
    }
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
