//! TMS9918 compatible modes 0-3 and their 1bpp sprites.

use super::{pattern_bit, LineBuffer};
use crate::registers::VRAM_MASK;
use crate::vdp::Vdp;
use emu_core::video::{Mono1Bpp, TileDecoder};

impl Vdp {
    fn name_base(&self, line: i32) -> u16 {
        (((self.regs.get(2) as u16) & 0x0F) << 10) + ((line >> 3) * 32) as u16
    }

    /// Mode 0: one color byte per group of eight patterns.
    pub(crate) fn draw_graphics1(&self, pens: &mut LineBuffer, line: i32) {
        let name_base = self.name_base(line);
        let color_base = ((self.regs.get(3) as u16) << 6) & VRAM_MASK;
        let pattern_base = ((self.regs.get(4) as u16) << 11) & VRAM_MASK;

        for column in 0..32u16 {
            let name = self.mem.vram_read(name_base + column) as u16;
            let pattern = self.mem.vram_read(pattern_base + (name << 3) + (line & 0x07) as u16);
            let colors = self.mem.vram_read(color_base + (name >> 3));
            self.plot_pattern(pens, (column << 3) as usize, pattern, colors);
        }
    }

    /// Mode 1: 40 columns of 6 pixels, colors from register 7.
    pub(crate) fn draw_text(&self, pens: &mut LineBuffer, line: i32) {
        let name_base = self.name_base(line);
        let pattern_base = ((self.regs.get(4) as u16) << 11) & VRAM_MASK;
        let colors = self.regs.get(7);
        let backdrop = self.mem.current_palette[self.backdrop_index()];

        pens[..8].fill(backdrop);
        for column in 0..40u16 {
            let name = self.mem.vram_read(name_base + column) as u16;
            let pattern = self.mem.vram_read(pattern_base + (name << 3) + (line & 0x07) as u16);
            for px in 0..6 {
                let color = if pattern_bit(pattern, px) != 0 {
                    colors >> 4
                } else {
                    colors & 0x0F
                };
                pens[column as usize * 6 + px as usize + 8] = self.tms_pen(color);
            }
        }
        pens[248..].fill(backdrop);
    }

    /// Mode 2: the screen is split in three bands with their own patterns
    /// and colors.
    pub(crate) fn draw_graphics2(&self, pens: &mut LineBuffer, line: i32) {
        let name_base = self.name_base(line);
        let color_base = ((self.regs.get(3) as u16) & 0x80) << 6;
        let color_mask = (((self.regs.get(3) as u16) & 0x7F) << 3) | 0x07;
        let pattern_base = ((self.regs.get(4) as u16) & 0x04) << 11;
        let pattern_mask = (((self.regs.get(4) as u16) & 0x03) << 8) | 0xFF;
        let pattern_offset = ((line & 0xC0) << 2) as u16;
        let row = (line & 0x07) as u16;

        for column in 0..32u16 {
            let name = self.mem.vram_read(name_base + column) as u16;
            let pattern = self
                .mem
                .vram_read(pattern_base + (((pattern_offset + name) & pattern_mask) * 8) + row);
            let colors = self
                .mem
                .vram_read(color_base + (((pattern_offset + name) & color_mask) * 8) + row);
            self.plot_pattern(pens, (column << 3) as usize, pattern, colors);
        }
    }

    /// Mode 3: 4x4 blocks of solid color.
    pub(crate) fn draw_multicolor(&self, pens: &mut LineBuffer, line: i32) {
        let name_base = self.name_base(line);
        let pattern_base = ((self.regs.get(4) as u16) << 11) & VRAM_MASK;

        for column in 0..32u16 {
            let name = self.mem.vram_read(name_base + column) as u16;
            let pattern = self.mem.vram_read(
                pattern_base + (name << 3) + ((((line >> 3) & 3) << 1) + ((line & 4) >> 2)) as u16,
            );
            for px in 0..8usize {
                let color = (pattern >> (!px & 4)) & 0x0F;
                pens[((column as usize) << 3) + px] = self.tms_pen(color);
            }
        }
    }

    fn plot_pattern(&self, pens: &mut LineBuffer, x: usize, pattern: u8, colors: u8) {
        let row = Mono1Bpp.decode_row(&[pattern]);
        for (px, &bit) in row.iter().enumerate() {
            let color = if bit != 0 { colors >> 4 } else { colors & 0x0F };
            pens[x + px] = self.tms_pen(color);
        }
    }

    /// Single color sprites of modes 0, 2 and 3.
    pub(crate) fn draw_tms_sprites(&mut self, pens: &mut LineBuffer, line: i32) {
        if self.raster.display_disabled || self.sprites.count == 0 {
            return;
        }

        let mut collision_buffer = [false; 256];
        let mut collided = false;
        let mut collision_x = 255;

        for slot_index in (0..self.sprites.count).rev() {
            let slot = self.sprites.slots[slot_index];
            let pen_selected = self.config.palette_offset as usize + (slot.flags & 0x0F) as usize;
            let zoom = if slot_index as i32 <= self.config.max_sprite_zoom_hcount {
                self.sprites.zoom_scale
            } else {
                1
            };
            let mut x = slot.x;
            let mut tile = slot.tile;
            if slot.flags & 0x80 != 0 {
                // early clock
                x -= 32;
            }

            for height in (8..=self.sprites.height).step_by(8) {
                if height == 16 {
                    tile += 2;
                    x += if zoom > 1 { 16 } else { 8 };
                }
                let pattern = self
                    .mem
                    .vram_read(slot.pattern_line.wrapping_add((tile * 8) as u16));

                for px in 0..8 {
                    if pen_selected == 0 || pattern_bit(pattern, px) == 0 {
                        continue;
                    }
                    let mut plot_x = x + if zoom > 1 { px << 1 } else { px };
                    for z in 0..zoom {
                        plot_x += z;
                        if !(0..=255).contains(&plot_x) {
                            continue;
                        }
                        let xi = plot_x as usize;
                        pens[xi] = self.mem.current_palette[pen_selected & 0x1F];
                        if collision_buffer[xi] {
                            collided = true;
                            collision_x = collision_x.min(plot_x);
                        } else {
                            collision_buffer[xi] = true;
                        }
                    }
                }
            }
            if collided {
                self.sprite_collision(line, collision_x);
            }
        }
    }
}
