//! Per-line sprite evaluation.
//!
//! Sprites for a line are chosen during the line before it, so selection
//! runs from the line event and drawing later uses the stored slots.

use crate::mode::DisplayMode;
use crate::quirks::SpriteChecks;
use crate::vdp::Vdp;
use serde::{Deserialize, Serialize};

pub const MAX_SPRITES_MODE4: usize = 8;
pub const MAX_SPRITES_TMS: usize = 4;
/// Y value that ends the attribute table in 192-line modes
const SPRITE_TABLE_END: i32 = 0xD0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSlot {
    pub x: i32,
    pub tile: i32,
    /// Mode 4: byte offset of the row within the tile. TMS: absolute
    /// address of the pattern row minus the tile offset.
    pub pattern_line: u16,
    /// TMS color and early clock bit
    pub flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteScratch {
    pub slots: [SpriteSlot; MAX_SPRITES_MODE4],
    pub count: usize,
    pub height: i32,
    pub zoom_scale: i32,
    pub base: u16,
}

impl Default for SpriteScratch {
    fn default() -> Self {
        Self {
            slots: [SpriteSlot::default(); MAX_SPRITES_MODE4],
            count: 0,
            height: 8,
            zoom_scale: 1,
            base: 0,
        }
    }
}

impl Vdp {
    /// Tile number of mode 4 sprite `index` for a row inside the sprite.
    pub(crate) fn select_sprite_tile(&self, index: i32, sprite_line: i32) -> i32 {
        let addr = (self.quirks.sprite_attr_addr)(&self.regs, self.sprites.base.wrapping_add(0x81))
            .wrapping_add((index << 1) as u16);
        let mut tile = (self.quirks.sprite_tile_mask)(&self.regs, self.mem.vram_read(addr)) as i32;
        if self.regs.get(6) & 0x04 != 0 {
            tile += 256;
        }
        if self.sprites.height == 16 {
            tile &= 0x01FE;
        }
        if sprite_line > 0x07 {
            tile += 1;
        }
        tile
    }

    fn sprite_count_overflow(&mut self, line: i32, index: i32) {
        if self.quirks.sprite_checks == SpriteChecks::EmbeddedMode4 && self.raster.display_disabled {
            return;
        }
        let active = self.frame_timing.active as i32;
        if !self.status.vint_visible() && line >= 0 && line < active {
            self.status.raise_overflow(index);
        }
    }

    /// Raise the collision flag for a collision first seen at `x`.
    pub(crate) fn sprite_collision(&mut self, line: i32, x: i32) {
        let base = self.config.line_timing.sprcol_base_hpos;
        match self.quirks.sprite_checks {
            SpriteChecks::Legacy => {
                if self.regs.mask_column0() && x < 8 {
                    return;
                }
                self.status.raise_collision(base + x);
            }
            SpriteChecks::EmbeddedMode4 => {
                if line >= 0 && line < self.frame_timing.active as i32 {
                    self.status.raise_collision(base);
                }
            }
        }
    }

    /// Evaluate the attribute table for `line`.
    pub(crate) fn select_sprites(&mut self, line: i32) {
        self.sprites.height = if self.regs.tall_sprites() { 16 } else { 8 };
        self.sprites.zoom_scale = if self.regs.zoomed_sprites() { 2 } else { 1 };
        self.sprites.count = 0;

        match self.raster.mode {
            DisplayMode::Graphics1 | DisplayMode::Graphics2 => self.select_tms_sprites(line),
            _ => self.select_mode4_sprites(line),
        }

        // The Mega Drive fills its sprite line buffer a line ahead, so
        // collisions are known before the line is shown
        if self.quirks.sprite_checks == SpriteChecks::EmbeddedMode4
            && self.sprites.count > 0
            && !self.raster.display_disabled
        {
            let mut pens = [0u16; 256];
            let mut priority = [1u16; 256];
            self.draw_sprites_mode4(&mut pens, &mut priority, line);
        }
    }

    /// Returns the row within the sprite if `line` crosses a sprite at `y`.
    fn sprite_row(&self, line: i32, y: i32) -> Option<i32> {
        let mut parse_line = line - 1;
        let mut y = if y >= 240 { y - 256 } else { y };
        if self.sprites.zoom_scale > 1 && self.sprites.count as i32 <= self.config.max_sprite_zoom_vcount {
            parse_line >>= 1;
            y >>= 1;
        }
        if parse_line >= y && parse_line < y + self.sprites.height {
            Some(parse_line - y)
        } else {
            None
        }
    }

    fn select_tms_sprites(&mut self, line: i32) {
        self.sprites.base = (self.regs.get(5) as u16 & 0x7F) << 7;
        let base = self.sprites.base;

        for index in (0..32 * 4).step_by(4) {
            let y = self.mem.vram_read(base + index as u16) as i32;
            if y == SPRITE_TABLE_END {
                break;
            }
            let Some(mut sprite_line) = self.sprite_row(line, y) else {
                continue;
            };
            if self.sprites.count >= MAX_SPRITES_TMS {
                self.sprite_count_overflow(line, index);
                continue;
            }

            let x = self.mem.vram_read(base + index as u16 + 1) as i32;
            let mut tile = self.mem.vram_read(base + index as u16 + 2) as i32;
            let flags = self.mem.vram_read(base + index as u16 + 3);
            if self.sprites.height == 16 {
                tile &= 0xFC;
                if sprite_line > 0x07 {
                    tile += 1;
                    sprite_line -= 8;
                }
            }
            self.sprites.slots[self.sprites.count] = SpriteSlot {
                x,
                tile,
                pattern_line: ((self.regs.get(6) as u16 & 0x07) << 11) + sprite_line as u16,
                flags,
            };
            self.sprites.count += 1;
        }
    }

    fn select_mode4_sprites(&mut self, line: i32) {
        self.sprites.base = ((self.regs.get(5) as u16) << 7) & 0x3F00;
        let base = self.sprites.base;
        let table_end_allowed = self.raster.y_pixels == 192;

        for index in 0..64 {
            let y = self.mem.vram_read(base + index as u16) as i32;
            if table_end_allowed && y == SPRITE_TABLE_END {
                break;
            }
            let Some(sprite_line) = self.sprite_row(line, y) else {
                continue;
            };
            if self.sprites.count >= MAX_SPRITES_MODE4 {
                self.sprite_count_overflow(line, index);
                continue;
            }

            let tile = self.select_sprite_tile(index, sprite_line);
            let x_addr = (self.quirks.sprite_attr_addr)(&self.regs, base + 0x80).wrapping_add((index << 1) as u16);
            let mut x = self.mem.vram_read(x_addr) as i32;
            if self.regs.sprite_shift_left() {
                x -= 0x08;
            }
            self.sprites.slots[self.sprites.count] = SpriteSlot {
                x,
                tile,
                pattern_line: ((sprite_line & 0x07) << 2) as u16,
                flags: 0,
            };
            self.sprites.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::VdpConfig;
    use crate::status::STATUS_SPROVR;
    use crate::vdp::Vdp;

    fn mode4_vdp(config: VdpConfig) -> Vdp {
        let mut vdp = Vdp::new(config);
        vdp.write_register(0, 0x04);
        vdp.write_register(1, 0x40);
        // attribute table at 0x3F00
        vdp.write_register(5, 0xFF);
        vdp
    }

    #[test]
    fn test_mode4_selection_caps_at_eight() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        for i in 0..10 {
            vdp.vram_write(0x3F00 + i, 49);
            vdp.vram_write(0x3F80 + i * 2, (i * 10) as u8);
            vdp.vram_write(0x3F81 + i * 2, i as u8);
        }
        vdp.vram_write(0x3F0A, 0xD0);
        vdp.select_sprites(50);
        let scratch = vdp.sprite_scratch();
        assert_eq!(scratch.count, 8);
        assert_eq!(scratch.slots[3].x, 30);
        assert_eq!(scratch.slots[3].tile, 3);
        assert_eq!(scratch.slots[0].pattern_line, 0);
        // ninth sprite is slot 8
        assert_eq!(vdp.status_latch().pending() & (STATUS_SPROVR | 0x1F), STATUS_SPROVR | 4);
    }

    #[test]
    fn test_table_end_marker() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        vdp.vram_write(0x3F00, 10);
        vdp.vram_write(0x3F01, 0xD0);
        vdp.vram_write(0x3F02, 10);
        vdp.select_sprites(12);
        assert_eq!(vdp.sprite_scratch().count, 1);
    }

    #[test]
    fn test_y_wraps_from_top() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        vdp.vram_write(0x3F00, 250);
        vdp.vram_write(0x3F01, 0xD0);
        // y 250 is -6, so line 1 shows sprite row 6
        vdp.select_sprites(1);
        assert_eq!(vdp.sprite_scratch().count, 1);
        assert_eq!(vdp.sprite_scratch().slots[0].pattern_line, 6 << 2);
    }

    #[test]
    fn test_tall_sprite_tiles() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        vdp.write_register(1, 0x42);
        vdp.vram_write(0x3F00, 0);
        vdp.vram_write(0x3F01, 0xD0);
        vdp.vram_write(0x3F81, 0x05);
        vdp.select_sprites(11);
        let slot = vdp.sprite_scratch().slots[0];
        assert_eq!(slot.tile, 0x05);
        assert_eq!(slot.pattern_line, 2 << 2);
        vdp.select_sprites(3);
        assert_eq!(vdp.sprite_scratch().slots[0].tile, 0x04);
    }

    #[test]
    fn test_sprite_shift() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        vdp.write_register(0, 0x0C);
        vdp.vram_write(0x3F00, 0);
        vdp.vram_write(0x3F01, 0xD0);
        vdp.vram_write(0x3F80, 4);
        vdp.select_sprites(1);
        assert_eq!(vdp.sprite_scratch().slots[0].x, -4);
    }

    #[test]
    fn test_tms_selection_caps_at_four() {
        let mut vdp = Vdp::new(VdpConfig::sega315_5124());
        vdp.write_register(1, 0x40);
        // attribute table at 0x1B00
        vdp.write_register(5, 0x36);
        for i in 0..5u16 {
            vdp.vram_write(0x1B00 + i * 4, 20);
            vdp.vram_write(0x1B01 + i * 4, (i * 16) as u8);
            vdp.vram_write(0x1B02 + i * 4, i as u8);
            vdp.vram_write(0x1B03 + i * 4, 0x0F);
        }
        vdp.vram_write(0x1B14, 0xD0);
        vdp.select_sprites(22);
        let scratch = vdp.sprite_scratch();
        assert_eq!(scratch.count, 4);
        assert_eq!(scratch.slots[2].flags, 0x0F);
        assert_eq!(scratch.slots[2].pattern_line, 1);
        // fifth entry sits at byte offset 16
        assert_eq!(vdp.status_latch().pending() & 0x5F, STATUS_SPROVR | 8);
    }

    #[test]
    fn test_overflow_ignored_outside_active_display() {
        let mut vdp = mode4_vdp(VdpConfig::sega315_5246());
        for i in 0..9 {
            vdp.vram_write(0x3F00 + i, 250);
        }
        vdp.vram_write(0x3F09, 0xD0);
        vdp.select_sprites(-1);
        assert_eq!(vdp.status_latch().pending() & STATUS_SPROVR, 0);
    }
}
