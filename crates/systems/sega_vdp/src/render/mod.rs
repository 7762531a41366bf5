//! Scanline composition.
//!
//! A line is built into two 256-entry buffers, the resolved output pens and
//! a priority word per pixel, then copied into the framebuffer. The priority
//! word carries the tile priority bit (0x1000) and the low nibble of the pen
//! that produced the pixel; a non-zero nibble marks the pixel for the y1
//! plane.

mod mode4;
mod tms9918;

use crate::mode::DisplayMode;
use crate::vdp::Vdp;

/// Set in the priority buffer by background tiles drawn in front of sprites
pub const PRIORITY_BIT: u16 = 0x1000;

/// Lines above the active area on which sprites are still evaluated for
/// collisions in 192-line modes
const SPRITE_TOP_MARGIN: i32 = 13;

pub(crate) type LineBuffer = [u16; 256];

/// Pixel `bit` (0 = leftmost) of a pattern byte
#[inline]
pub(crate) fn pattern_bit(byte: u8, bit: i32) -> u8 {
    (byte >> (7 - bit)) & 1
}

impl Vdp {
    /// Render active line `line` to bitmap row `row_base + line`, starting
    /// at column `x`.
    pub(crate) fn draw_scanline(&mut self, row_base: i32, line: i32) {
        let mut pens: LineBuffer = [0; 256];
        let mut priority: LineBuffer = [1; 256];
        let active = self.frame_timing.active as i32;
        let sprites_visible =
            line >= 0 || (line >= -SPRITE_TOP_MARGIN && self.raster.y_pixels == 192);

        if line < active {
            match self.raster.mode {
                DisplayMode::Graphics1 => {
                    if line >= 0 {
                        self.draw_graphics1(&mut pens, line);
                    }
                    if sprites_visible {
                        self.draw_tms_sprites(&mut pens, line);
                    }
                }
                DisplayMode::Text => {
                    if line >= 0 {
                        self.draw_text(&mut pens, line);
                    }
                }
                DisplayMode::Graphics2 => {
                    if line >= 0 {
                        self.draw_graphics2(&mut pens, line);
                    }
                    if sprites_visible {
                        self.draw_tms_sprites(&mut pens, line);
                    }
                }
                DisplayMode::Multicolor => {
                    if line >= 0 {
                        self.draw_multicolor(&mut pens, line);
                    }
                    if sprites_visible {
                        self.draw_tms_sprites(&mut pens, line);
                    }
                }
                DisplayMode::Mode4 => {
                    if line >= 0 {
                        self.draw_mode4_background(&mut pens, &mut priority, line);
                    }
                    if sprites_visible {
                        self.draw_sprites_mode4(&mut pens, &mut priority, line);
                    }
                }
                DisplayMode::Mode5 => {}
            }
        }

        let row = row_base + line;
        if self.raster.display_disabled || line < 0 || line >= active {
            self.fill_backdrop(row, crate::config::ACTIVE_X, crate::config::RBORDER_START);
        } else {
            self.blit_scanline(&pens, &priority, row, line);
        }
    }

    /// Pen for a TMS9918 color index; 0 shows the backdrop.
    pub(crate) fn tms_pen(&self, color: u8) -> u16 {
        let color = if color == 0 {
            self.backdrop_index()
        } else {
            color as usize
        };
        self.mem.current_palette[(color + self.config.palette_offset as usize) & 0x1F]
    }
}
