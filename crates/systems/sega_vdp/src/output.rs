//! Output raster and the final composition of each line.

use crate::config::{ACTIVE_X, LBORDER_START, LBORDER_WIDTH, RBORDER_START, RBORDER_WIDTH, WIDTH};
use crate::mode::DisplayMode;
use crate::quirks::OutputPolicy;
use crate::vdp::Vdp;
use emu_core::types::Frame;
use emu_core::video::{IndexedBitmap, IndexedPalette, RamPalette};

/// Bitmap of output pens plus the y1 plane, and the resolved ARGB picture.
///
/// The y1 plane is 1 wherever the pixel came from a non-zero pen (or a
/// non-zero backdrop index); external mixers use it to key video overlays.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    bitmap: IndexedBitmap,
    palette: RamPalette,
    frame: Frame,
}

impl Framebuffer {
    pub fn new(height: i32, palette: RamPalette) -> Self {
        let bitmap = IndexedBitmap::new(WIDTH as usize, height as usize);
        let frame = bitmap.to_frame(&palette);
        Self {
            bitmap,
            palette,
            frame,
        }
    }

    pub fn bitmap(&self) -> &IndexedBitmap {
        &self.bitmap
    }

    pub fn palette(&self) -> &RamPalette {
        &self.palette
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn pen(&self, x: i32, y: i32) -> u16 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.bitmap.pen(x as usize, y as usize)
    }

    pub fn y1(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.bitmap.plane(x as usize, y as usize) != 0
    }

    /// ARGB value of the pixel
    pub fn color(&self, x: i32, y: i32) -> u32 {
        self.palette.get_color(self.pen(x, y) as usize)
    }

    pub(crate) fn fill(&mut self, row: i32, x0: i32, x1: i32, pen: u16, y1: bool) {
        if row < 0 || x0 >= x1 {
            return;
        }
        let (y, x0, x1) = (row as usize, x0.max(0) as usize, x1.max(0) as usize);
        self.bitmap.fill_span(y, x0, x1, pen, y1 as u8);
        self.bitmap.resolve_span(&mut self.frame, &self.palette, y, x0, x1);
    }

    pub(crate) fn put_span(&mut self, row: i32, x0: i32, pens: &[u16], y1: impl Fn(usize) -> bool) {
        if row < 0 || x0 < 0 {
            return;
        }
        let y = row as usize;
        for (i, &pen) in pens.iter().enumerate() {
            self.bitmap.put(x0 as usize + i, y, pen, y1(i) as u8);
        }
        let x0 = x0 as usize;
        self.bitmap.resolve_span(&mut self.frame, &self.palette, y, x0, x0 + pens.len());
    }

    pub(crate) fn clear(&mut self, pen: u16) {
        self.bitmap.clear(pen);
        self.frame = self.bitmap.to_frame(&self.palette);
    }

    /// Fill the whole frame with a raw ARGB color, bypassing the pens.
    pub(crate) fn clear_color(&mut self, color: u32) {
        self.bitmap.clear(0);
        self.frame.pixels.iter_mut().for_each(|p| *p = color);
    }
}

impl Vdp {
    /// Palette slot used for borders and blank areas
    pub(crate) fn backdrop_index(&self) -> usize {
        let bank = if self.raster.mode == DisplayMode::Mode4 { 0x10 } else { 0 };
        bank + self.regs.backdrop_index() as usize
    }

    pub(crate) fn backdrop_pen(&self) -> u16 {
        self.mem.current_palette[self.backdrop_index()]
    }

    fn backdrop_y1(&self) -> bool {
        self.regs.backdrop_index() != 0
    }

    pub(crate) fn fill_backdrop(&mut self, row: i32, x0: i32, x1: i32) {
        let (pen, y1) = (self.backdrop_pen(), self.backdrop_y1());
        self.framebuffer.fill(row, x0, x1, pen, y1);
    }

    pub(crate) fn draw_left_border(&mut self, row: i32) {
        self.update_palette();
        self.fill_backdrop(row, LBORDER_START, LBORDER_START + LBORDER_WIDTH);
    }

    pub(crate) fn draw_right_border(&mut self, row: i32) {
        self.update_palette();
        self.fill_backdrop(row, RBORDER_START, RBORDER_START + RBORDER_WIDTH);
    }

    /// Copy a finished line into the active area of `row`.
    pub(crate) fn blit_scanline(&mut self, pens: &[u16; 256], priority: &[u16; 256], row: i32, line: i32) {
        let handheld = self.quirks.output == OutputPolicy::GameGear && !self.raster.compat_mode;
        if handheld {
            self.fill_backdrop(row, ACTIVE_X, ACTIVE_X + 48);
            if (24..168).contains(&line) {
                self.framebuffer
                    .put_span(row, ACTIVE_X + 48, &pens[48..208], |i| priority[48 + i] & 0x0F != 0);
            } else {
                self.fill_backdrop(row, ACTIVE_X + 48, ACTIVE_X + 208);
            }
            self.fill_backdrop(row, ACTIVE_X + 208, ACTIVE_X + 256);
            return;
        }

        let mut x = 0;
        if self.raster.mode == DisplayMode::Mode4 && self.regs.mask_column0() {
            self.fill_backdrop(row, ACTIVE_X, ACTIVE_X + 8);
            x = 8;
        }
        self.framebuffer
            .put_span(row, ACTIVE_X + x as i32, &pens[x..], |i| priority[x + i] & 0x0F != 0);
    }
}
