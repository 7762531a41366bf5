//! Register file and video memories.

use serde::{Deserialize, Serialize};

/// Size of video RAM; addresses wrap at this boundary.
pub const VRAM_SIZE: usize = 0x4000;
pub const VRAM_MASK: u16 = 0x3FFF;

/// The sixteen 8-bit control registers.
///
/// | Reg | Bits used here |
/// |-----|----------------|
/// | 0 | 7 vscroll lock, 6 hscroll lock, 5 mask column 0, 4 line irq, 3 sprite shift, 2 M4, 1 M2 |
/// | 1 | 6 display on, 5 frame irq, 4 M1, 3 M3, 2 M5, 1 tall sprites, 0 zoom |
/// | 2-6 | table bases |
/// | 7 | backdrop / border pen |
/// | 8, 9 | scroll x, y |
/// | 10 | line counter reload |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registers([u8; 16]);

impl Registers {
    /// Values after reset
    pub fn power_on() -> Self {
        let mut regs = Self::default();
        regs.0[0x02] = 0x0E;
        regs.0[0x0A] = 0xFF;
        regs
    }

    pub fn get(&self, index: usize) -> u8 {
        self.0.get(index).copied().unwrap_or(0)
    }

    pub fn set(&mut self, index: usize, value: u8) {
        if let Some(reg) = self.0.get_mut(index) {
            *reg = value;
        }
    }

    pub fn all(&self) -> &[u8; 16] {
        &self.0
    }

    fn bit(&self, index: usize, bit: u8) -> bool {
        self.get(index) & (1 << bit) != 0
    }

    pub fn vscroll_lock_right(&self) -> bool {
        self.bit(0, 7)
    }

    pub fn hscroll_lock_top(&self) -> bool {
        self.bit(0, 6)
    }

    pub fn mask_column0(&self) -> bool {
        self.bit(0, 5)
    }

    pub fn line_irq_enabled(&self) -> bool {
        self.bit(0, 4)
    }

    pub fn sprite_shift_left(&self) -> bool {
        self.bit(0, 3)
    }

    pub fn display_enabled(&self) -> bool {
        self.bit(1, 6)
    }

    pub fn frame_irq_enabled(&self) -> bool {
        self.bit(1, 5)
    }

    pub fn m1(&self) -> bool {
        self.bit(1, 4)
    }

    pub fn m2(&self) -> bool {
        self.bit(0, 1)
    }

    pub fn m3(&self) -> bool {
        self.bit(1, 3)
    }

    pub fn m4(&self) -> bool {
        self.bit(0, 2)
    }

    pub fn m5(&self) -> bool {
        self.bit(1, 2)
    }

    pub fn tall_sprites(&self) -> bool {
        self.bit(1, 1)
    }

    pub fn zoomed_sprites(&self) -> bool {
        self.bit(1, 0)
    }

    /// Low nibble of register 7
    pub fn backdrop_index(&self) -> u8 {
        self.get(7) & 0x0F
    }

    pub fn line_counter_reload(&self) -> u8 {
        self.get(10)
    }
}

/// VRAM, CRAM and the palette cache derived from CRAM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMemory {
    pub vram: Vec<u8>,
    pub cram: Vec<u8>,
    /// Output pens for the 32 palette slots
    pub current_palette: [u16; 32],
    pub cram_dirty: bool,
    pub cram_mask: u8,
}

impl VideoMemory {
    pub fn new(cram_size: usize) -> Self {
        Self {
            vram: vec![0; VRAM_SIZE],
            cram: vec![0; cram_size],
            current_palette: [0; 32],
            cram_dirty: true,
            cram_mask: cram_size.saturating_sub(1) as u8,
        }
    }

    pub fn vram_read(&self, addr: u16) -> u8 {
        self.vram[(addr & VRAM_MASK) as usize]
    }

    pub fn vram_write(&mut self, addr: u16, data: u8) {
        self.vram[(addr & VRAM_MASK) as usize] = data;
    }

    /// Little-endian word, each byte address wrapped independently.
    pub fn vram_read_word(&self, addr: u16) -> u16 {
        self.vram_read(addr) as u16 | (self.vram_read(addr.wrapping_add(1)) as u16) << 8
    }

    pub fn cram_read(&self, index: usize) -> u8 {
        self.cram.get(index).copied().unwrap_or(0)
    }

    /// Clear CRAM and the palette cache. VRAM is left alone.
    pub fn reset_palette(&mut self) {
        self.cram.iter_mut().for_each(|b| *b = 0);
        self.current_palette = [0; 32];
        self.cram_dirty = true;
        self.cram_mask = self.cram.len().saturating_sub(1) as u8;
    }
}
