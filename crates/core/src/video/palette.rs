//! Indexed palettes for retro video hardware.
//!
//! Chips that output pen numbers rather than RGB values resolve them
//! through an [`IndexedPalette`]. [`RamPalette`] is the plain table most
//! chips need; helpers here expand packed channel fields the way the
//! hardware DACs do.

/// Maps pen indices to ARGB8888 colors.
pub trait IndexedPalette {
    /// Color for `index`; out-of-range pens resolve to opaque black.
    fn get_color(&self, index: usize) -> u32;

    fn set_color(&mut self, index: usize, color: u32);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Table-backed palette.
#[derive(Debug, Clone)]
pub struct RamPalette {
    colors: Vec<u32>,
}

impl RamPalette {
    /// `size` entries of opaque black
    pub fn new(size: usize) -> Self {
        Self {
            colors: vec![0xFF000000; size],
        }
    }

    /// Build a palette by evaluating `f` for every pen.
    pub fn from_fn(size: usize, f: impl Fn(usize) -> u32) -> Self {
        Self {
            colors: (0..size).map(f).collect(),
        }
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }
}

impl IndexedPalette for RamPalette {
    fn get_color(&self, index: usize) -> u32 {
        self.colors.get(index).copied().unwrap_or(0xFF000000)
    }

    fn set_color(&mut self, index: usize, color: u32) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }
}

/// Pack 8-bit channels into opaque ARGB8888.
#[inline]
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Expand a 2-bit DAC level to 8 bits (0, 85, 170, 255).
#[inline]
pub fn pal2bit(bits: u8) -> u8 {
    (bits & 0x03) * 0x55
}

/// Expand a 4-bit DAC level to 8 bits.
#[inline]
pub fn pal4bit(bits: u8) -> u8 {
    (bits & 0x0F) * 0x11
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_palette_defaults_to_black() {
        let palette = RamPalette::new(16);
        assert_eq!(palette.len(), 16);
        assert!(!palette.is_empty());
        assert!(palette.colors().iter().all(|&c| c == 0xFF000000));
    }

    #[test]
    fn test_out_of_range_is_black_and_ignored() {
        let mut palette = RamPalette::new(2);
        palette.set_color(5, 0xFFFFFFFF);
        assert_eq!(palette.get_color(5), 0xFF000000);
    }

    #[test]
    fn test_from_fn() {
        let palette = RamPalette::from_fn(4, |i| rgb(pal2bit(i as u8), 0, 0));
        assert_eq!(palette.get_color(0), 0xFF000000);
        assert_eq!(palette.get_color(3), 0xFFFF0000);
    }

    #[test]
    fn test_channel_expansion() {
        assert_eq!(pal2bit(1), 85);
        assert_eq!(pal2bit(2), 170);
        assert_eq!(pal4bit(0x0F), 0xFF);
        assert_eq!(pal4bit(0x08), 0x88);
    }
}
