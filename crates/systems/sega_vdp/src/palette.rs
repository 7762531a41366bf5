//! Output palettes and CRAM handling.

use crate::mode::DisplayMode;
use crate::quirks::OutputPolicy;
use crate::vdp::Vdp;
use emu_core::video::palette::{pal2bit, pal4bit, rgb};
use emu_core::video::RamPalette;

/// Pens 0-63 are the mode 4 RGB222 colors, 64-79 the fixed TMS9918 colors.
pub const SMS_PALETTE_SIZE: usize = 64 + 16;
/// Every RGB444 value
pub const GG_PALETTE_SIZE: usize = 4096;

/// Pen of the first TMS9918 color
pub const TMS_PEN_BASE: u16 = 64;

const TMS9918_COLORS: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (0, 0, 0),
    (0, 170, 0),
    (0, 255, 0),
    (0, 0, 85),
    (0, 0, 255),
    (85, 0, 0),
    (0, 255, 255),
    (170, 0, 0),
    (255, 0, 0),
    (85, 85, 0),
    (255, 255, 0),
    (0, 85, 0),
    (255, 0, 255),
    (85, 85, 85),
    (255, 255, 255),
];

pub fn sms_output_palette() -> RamPalette {
    RamPalette::from_fn(SMS_PALETTE_SIZE, |i| {
        if i < 64 {
            let c = i as u8;
            rgb(pal2bit(c), pal2bit(c >> 2), pal2bit(c >> 4))
        } else {
            let (r, g, b) = TMS9918_COLORS[i - 64];
            rgb(r, g, b)
        }
    })
}

pub fn game_gear_output_palette() -> RamPalette {
    RamPalette::from_fn(GG_PALETTE_SIZE, |i| {
        rgb(pal4bit(i as u8), pal4bit((i >> 4) as u8), pal4bit((i >> 8) as u8))
    })
}

/// Widen an SMS RGB222 CRAM byte to the handheld's RGB444 pen.
pub fn rgb222_to_rgb444(c: u8) -> u16 {
    let c = c as u16;
    ((c & 0x30) << 6) | ((c & 0x0C) << 4) | ((c & 0x03) << 2)
}

impl Vdp {
    fn game_gear_native(&self) -> bool {
        self.quirks.output == OutputPolicy::GameGear && !self.raster.compat_mode
    }

    /// Rebuild the palette cache from CRAM if CRAM or the mode changed.
    pub(crate) fn update_palette(&mut self) {
        if !self.mem.cram_dirty {
            return;
        }
        self.mem.cram_dirty = false;

        if self.quirks.output == OutputPolicy::GameGear {
            for i in 0..32 {
                self.mem.current_palette[i] = if self.raster.compat_mode {
                    rgb222_to_rgb444(self.mem.cram_read(i))
                } else {
                    (self.mem.cram_read(2 * i) as u16 | (self.mem.cram_read(2 * i + 1) as u16) << 8) & 0x0FFF
                };
            }
            return;
        }

        if self.raster.mode != DisplayMode::Mode4 {
            for (i, pen) in self.mem.current_palette.iter_mut().take(16).enumerate() {
                *pen = TMS_PEN_BASE + i as u16;
            }
            return;
        }
        for i in 0..32 {
            self.mem.current_palette[i] = (self.mem.cram_read(i) & 0x3F) as u16;
        }
    }

    /// Store a data-port byte in CRAM at the current address.
    pub(crate) fn cram_write(&mut self, data: u8) {
        let mask = self.mem.cram_mask as usize;
        if self.game_gear_native() {
            // Even bytes only reach the latch; the odd byte commits the pair
            if self.port.addr & 1 != 0 {
                let address = (self.port.addr as usize & mask) & !1;
                let low = self.port.buffer;
                if low != self.mem.cram[address] || data != self.mem.cram[address + 1] {
                    self.mem.cram[address] = low;
                    self.mem.cram[address + 1] = data;
                    self.mem.cram_dirty = true;
                }
            }
            return;
        }

        let address = self.port.addr as usize & mask;
        if let Some(entry) = self.mem.cram.get_mut(address) {
            if *entry != data {
                *entry = data;
                self.mem.cram_dirty = true;
            }
        }
    }
}
