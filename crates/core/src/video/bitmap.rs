//! Indexed-color raster with a parallel one-byte plane.
//!
//! Video chips write pen numbers here scanline by scanline. The second
//! plane carries a per-pixel flag (opacity, priority) that downstream
//! mixers may use. Writes outside the bitmap are ignored.

use crate::types::Frame;
use crate::video::palette::IndexedPalette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBitmap {
    width: usize,
    height: usize,
    pens: Vec<u16>,
    plane: Vec<u8>,
}

impl IndexedBitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pens: vec![0; width * height],
            plane: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pen(&self, x: usize, y: usize) -> u16 {
        if x < self.width && y < self.height {
            self.pens[y * self.width + x]
        } else {
            0
        }
    }

    pub fn plane(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.plane[y * self.width + x]
        } else {
            0
        }
    }

    /// Pens of row `y`
    pub fn row(&self, y: usize) -> &[u16] {
        let start = y.min(self.height) * self.width;
        &self.pens[start..(start + self.width).min(self.pens.len())]
    }

    /// Plane values of row `y`
    pub fn plane_row(&self, y: usize) -> &[u8] {
        let start = y.min(self.height) * self.width;
        &self.plane[start..(start + self.width).min(self.plane.len())]
    }

    pub fn put(&mut self, x: usize, y: usize, pen: u16, plane: u8) {
        if x < self.width && y < self.height {
            let i = y * self.width + x;
            self.pens[i] = pen;
            self.plane[i] = plane;
        }
    }

    /// Fill `[x0, x1)` of row `y`, clipped to the bitmap.
    pub fn fill_span(&mut self, y: usize, x0: usize, x1: usize, pen: u16, plane: u8) {
        if y >= self.height {
            return;
        }
        let x1 = x1.min(self.width);
        if x0 >= x1 {
            return;
        }
        let base = y * self.width;
        self.pens[base + x0..base + x1].fill(pen);
        self.plane[base + x0..base + x1].fill(plane);
    }

    pub fn clear(&mut self, pen: u16) {
        self.pens.fill(pen);
        self.plane.fill(0);
    }

    /// Resolve every pen through `palette` into an ARGB frame.
    pub fn to_frame(&self, palette: &impl IndexedPalette) -> Frame {
        let mut frame = Frame::new(self.width as u32, self.height as u32);
        for (dst, &pen) in frame.pixels.iter_mut().zip(&self.pens) {
            *dst = palette.get_color(pen as usize);
        }
        frame
    }

    /// Resolve `[x0, x1)` of row `y` into an existing frame of the same size.
    pub fn resolve_span(
        &self,
        frame: &mut Frame,
        palette: &impl IndexedPalette,
        y: usize,
        x0: usize,
        x1: usize,
    ) {
        if y >= self.height || frame.pixels.len() != self.pens.len() {
            return;
        }
        let x1 = x1.min(self.width);
        let base = y * self.width;
        for x in x0..x1 {
            frame.pixels[base + x] = palette.get_color(self.pens[base + x] as usize);
        }
    }
}
