//! Mode 4: 4bpp tiles with per-tile palette, flip and priority, and
//! 8x8 / 8x16 sprites.

use super::{pattern_bit, LineBuffer, PRIORITY_BIT};
use crate::quirks::Column0Fill;
use crate::vdp::Vdp;
use emu_core::video::{Planar4Bpp, TileDecoder};

const NAME_PRIORITY: u16 = 0x1000;
const NAME_PALETTE: u16 = 0x0800;
const NAME_VFLIP: u16 = 0x0400;
const NAME_HFLIP: u16 = 0x0200;
const NAME_TILE: u16 = 0x01FF;

impl Vdp {
    fn tile_row(&self, tile: i32, tile_line: i32) -> [u8; 4] {
        let addr = ((tile << 5) + ((tile_line & 0x07) << 2)) as u16;
        [
            self.mem.vram_read(addr),
            self.mem.vram_read(addr.wrapping_add(1)),
            self.mem.vram_read(addr.wrapping_add(2)),
            self.mem.vram_read(addr.wrapping_add(3)),
        ]
    }

    /// Pixels left of the first complete tile column when fine scrolled.
    fn draw_column0(
        &self,
        pens: &mut LineBuffer,
        priority: &mut LineBuffer,
        fine: i32,
        palette_selected: bool,
        tile_line: i32,
    ) {
        let upper_palette = match self.quirks.column0 {
            Column0Fill::Sprite0Plane1 => {
                // bit plane 1 of sprite 0, pixel 4, on this row
                let tile = self.select_sprite_tile(0, tile_line & 0x07);
                let plane1 = self.tile_row(tile, tile_line)[1];
                pattern_bit(plane1, 4) != 0
            }
            Column0Fill::NextTilePalette => palette_selected,
        };
        let pen = self.mem.current_palette[if upper_palette { 0x10 } else { 0x00 }];
        for x in 0..fine as usize {
            pens[x] = pen;
            priority[x] = 0;
        }
    }

    pub(crate) fn draw_mode4_background(&self, pens: &mut LineBuffer, priority: &mut LineBuffer, line: i32) {
        let x_scroll = if self.regs.hscroll_lock_top() && line < 16 {
            0
        } else {
            self.raster.reg8copy as i32
        };
        let start_column = 32 - (x_scroll >> 3);
        let fine = x_scroll & 0x07;

        let (name_table, scroll_mod) = if self.raster.y_pixels != 192 {
            ((((self.regs.get(2) as u16) & 0x0C) << 10) | 0x0700, 256)
        } else {
            (((self.regs.get(2) as u16) << 10) & 0x3800, 224)
        };

        for column in 0..32 {
            let table_column = (((column + start_column) & 0x1F) << 1) as u16;
            let y_scroll = if self.regs.vscroll_lock_right() && column > 23 {
                0
            } else {
                self.raster.reg9copy as i32
            };

            let row = (self.quirks.name_table_row)(&self.regs, (line + y_scroll) % scroll_mod);
            let entry = self.mem.vram_read_word(name_table.wrapping_add(row).wrapping_add(table_column));

            let tile = (entry & NAME_TILE) as i32;
            let priority_select = entry & NAME_PRIORITY;
            let palette_selected = entry & NAME_PALETTE != 0;
            let mut tile_line = line - ((0x07 - (y_scroll & 0x07)) + 1);
            if entry & NAME_VFLIP != 0 {
                tile_line = 0x07 - tile_line;
            }
            let hflip = entry & NAME_HFLIP != 0;

            if column == 0 && fine > 0 {
                self.draw_column0(pens, priority, fine, palette_selected, tile_line);
            }

            let decoded = Planar4Bpp.decode_row(&self.tile_row(tile, tile_line));
            for (px, &pen) in decoded.iter().enumerate() {
                let pen = pen as usize | if palette_selected { 0x10 } else { 0 };
                let px = px as i32;
                let x = fine + (column << 3) + if hflip { 7 - px } else { px };
                if x < 256 {
                    pens[x as usize] = self.mem.current_palette[pen];
                    priority[x as usize] = priority_select | (pen as u16 & 0x0F);
                }
            }
        }
    }

    /// Draw the selected sprites over the line and record collisions.
    pub(crate) fn draw_sprites_mode4(&mut self, pens: &mut LineBuffer, priority: &mut LineBuffer, line: i32) {
        if self.raster.display_disabled || self.sprites.count == 0 {
            return;
        }

        let mut collision_buffer = [false; 256];
        let mut collided = false;
        let mut collision_x = 255;

        for slot_index in (0..self.sprites.count).rev() {
            let slot = self.sprites.slots[slot_index];
            let zoom = if slot_index as i32 <= self.config.max_sprite_zoom_hcount {
                self.sprites.zoom_scale
            } else {
                1
            };
            let addr = ((slot.tile << 5) as u16).wrapping_add(slot.pattern_line);
            let row = [
                self.mem.vram_read(addr),
                self.mem.vram_read(addr.wrapping_add(1)),
                self.mem.vram_read(addr.wrapping_add(2)),
                self.mem.vram_read(addr.wrapping_add(3)),
            ];
            let decoded = Planar4Bpp.decode_row(&row);

            for (px, &pen) in decoded.iter().enumerate() {
                let pen = pen as u16 | 0x10;
                if pen == 0x10 {
                    continue;
                }
                let mut x = slot.x + if zoom > 1 { (px as i32) << 1 } else { px as i32 };
                for z in 0..zoom {
                    x += z;
                    if !(0..=255).contains(&x) {
                        continue;
                    }
                    let xi = x as usize;
                    if priority[xi] & PRIORITY_BIT == 0 || priority[xi] == PRIORITY_BIT {
                        pens[xi] = self.mem.current_palette[pen as usize];
                        priority[xi] = pen;
                    }
                    if collision_buffer[xi] {
                        collided = true;
                        collision_x = collision_x.min(x);
                    } else {
                        collision_buffer[xi] = true;
                    }
                }
            }
            if collided {
                self.sprite_collision(line, collision_x);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::VdpConfig;
    use crate::render::PRIORITY_BIT;
    use crate::status::STATUS_SPRCOL;
    use crate::vdp::Vdp;

    fn mode4(config: VdpConfig) -> Vdp {
        let mut vdp = Vdp::new(config);
        vdp.write_register(0, 0x04);
        vdp.write_register(1, 0x40);
        // name table 0x3800, sprites at 0x3F00
        vdp.write_register(2, 0xFF);
        vdp.write_register(5, 0xFF);
        for i in 0..32u8 {
            vdp.write_cram(i, i);
        }
        vdp.update_palette();
        vdp
    }

    /// Tile `tile` row `row` is solid pen `pen`
    fn solid_row(vdp: &mut Vdp, tile: u16, row: u16, pen: u8) {
        for plane in 0..4 {
            let value = if pen & (1 << plane) != 0 { 0xFF } else { 0x00 };
            vdp.vram_write((tile << 5) + (row << 2) + plane, value);
        }
    }

    #[test]
    fn test_background_tile_and_palette() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        // column 0 of row 0: tile 1, upper palette
        vdp.vram_write(0x3800, 0x01);
        vdp.vram_write(0x3801, 0x08);
        solid_row(&mut vdp, 1, 0, 5);
        let mut pens = [0; 256];
        let mut prio = [1; 256];
        vdp.draw_mode4_background(&mut pens, &mut prio, 0);
        assert_eq!(pens[0], 0x15);
        assert_eq!(prio[0], 5);
        assert_eq!(pens[8], 0);
    }

    #[test]
    fn test_horizontal_flip_and_priority() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        vdp.vram_write(0x3800, 0x01);
        vdp.vram_write(0x3801, 0x12);
        // leftmost pixel only, pen 1
        vdp.vram_write(0x20, 0x80);
        let mut pens = [0; 256];
        let mut prio = [1; 256];
        vdp.draw_mode4_background(&mut pens, &mut prio, 0);
        assert_eq!(pens[7], 1);
        assert_eq!(prio[7], PRIORITY_BIT | 1);
        assert_eq!(prio[0], PRIORITY_BIT);
    }

    #[test]
    fn test_fine_scroll_fills_column0() {
        let mut vdp = mode4(VdpConfig::sega315_5313_mode4());
        vdp.write_register(8, 0x03);
        // first visible tile selects the upper palette
        vdp.vram_write(0x3800, 0x00);
        vdp.vram_write(0x3801, 0x08);
        let mut pens = [0xFFFF; 256];
        let mut prio = [1; 256];
        vdp.draw_mode4_background(&mut pens, &mut prio, 0);
        assert_eq!(&pens[0..3], &[0x10, 0x10, 0x10]);
        assert_eq!(&prio[0..3], &[0, 0, 0]);
    }

    #[test]
    fn test_sprite_behind_priority_tile() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        vdp.vram_write(0x3F00, 0);
        vdp.vram_write(0x3F01, 0xD0);
        vdp.vram_write(0x3F80, 0);
        vdp.vram_write(0x3F81, 2);
        solid_row(&mut vdp, 2, 0, 3);
        vdp.select_sprites(1);

        let mut pens = [0; 256];
        let mut prio = [1; 256];
        prio[0] = PRIORITY_BIT | 4;
        prio[1] = PRIORITY_BIT;
        vdp.draw_sprites_mode4(&mut pens, &mut prio, 1);
        assert_eq!(pens[0], 0);
        assert_eq!(pens[1], 0x13);
        assert_eq!(pens[2], 0x13);
        assert_eq!(prio[2], 0x13);
    }

    #[test]
    fn test_zoomed_sprite_doubles_width() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        vdp.write_register(1, 0x41);
        vdp.vram_write(0x3F00, 0);
        vdp.vram_write(0x3F01, 0xD0);
        vdp.vram_write(0x3F80, 10);
        vdp.vram_write(0x3F81, 2);
        // one pixel, leftmost
        vdp.vram_write(0x40, 0x80);
        vdp.select_sprites(1);
        let mut pens = [0; 256];
        let mut prio = [1; 256];
        vdp.draw_sprites_mode4(&mut pens, &mut prio, 1);
        assert_eq!(&pens[9..13], &[0, 0x11, 0x11, 0]);
    }

    #[test]
    fn test_collision_sets_pending_with_hpos() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        for i in 0..2u16 {
            vdp.vram_write(0x3F00 + i, 0);
            vdp.vram_write(0x3F80 + i * 2, 20 + i as u8 * 4);
            vdp.vram_write(0x3F81 + i * 2, 2);
        }
        vdp.vram_write(0x3F02, 0xD0);
        solid_row(&mut vdp, 2, 0, 1);
        vdp.select_sprites(1);
        let mut pens = [0; 256];
        let mut prio = [1; 256];
        vdp.draw_sprites_mode4(&mut pens, &mut prio, 1);
        let latch = vdp.status_latch();
        assert_ne!(latch.pending() & STATUS_SPRCOL, 0);
        vdp.check_pending_flags_at(59 + 23);
        assert_eq!(vdp.status_latch().status() & STATUS_SPRCOL, 0);
        vdp.check_pending_flags_at(59 + 24);
        assert_ne!(vdp.status_latch().status() & STATUS_SPRCOL, 0);
    }

    #[test]
    fn test_collision_masked_in_column0() {
        let mut vdp = mode4(VdpConfig::sega315_5246());
        vdp.write_register(0, 0x24);
        for i in 0..2u16 {
            vdp.vram_write(0x3F00 + i, 0);
            vdp.vram_write(0x3F80 + i * 2, 0);
            vdp.vram_write(0x3F81 + i * 2, 2);
        }
        vdp.vram_write(0x3F02, 0xD0);
        vdp.vram_write(0x40, 0x80);
        vdp.select_sprites(1);
        let mut pens = [0; 256];
        let mut prio = [1; 256];
        vdp.draw_sprites_mode4(&mut pens, &mut prio, 1);
        assert_eq!(vdp.status_latch().pending() & STATUS_SPRCOL, 0);
    }
}
