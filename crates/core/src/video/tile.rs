//! Pattern decoding for tile-based video chips.
//!
//! - **Planar 4bpp rows** (Master System / Game Gear mode 4): each tile row
//!   is four consecutive bytes, one bit plane each, MSB = leftmost pixel.
//! - **1bpp patterns** (TMS9918 family): one byte per row, set bits select
//!   the foreground color.

/// Decodes one 8-pixel tile row into pen values.
pub trait TileDecoder {
    /// Bytes that make up one row of one tile
    fn row_size(&self) -> usize;

    /// Pen of pixel `x` (0 = leftmost) in `row`, which must hold
    /// [`TileDecoder::row_size`] bytes.
    fn decode_pixel(&self, row: &[u8], x: u8) -> u8;

    /// All eight pens of a row, left to right.
    fn decode_row(&self, row: &[u8]) -> [u8; 8] {
        let mut pens = [0u8; 8];
        if row.len() < self.row_size() {
            return pens;
        }
        for (x, pen) in pens.iter_mut().enumerate() {
            *pen = self.decode_pixel(row, x as u8);
        }
        pens
    }
}

/// Four interleaved bit planes per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planar4Bpp;

impl TileDecoder for Planar4Bpp {
    fn row_size(&self) -> usize {
        4
    }

    fn decode_pixel(&self, row: &[u8], x: u8) -> u8 {
        if row.len() < 4 || x > 7 {
            return 0;
        }
        let bit = 7 - x;
        ((row[0] >> bit) & 1)
            | (((row[1] >> bit) & 1) << 1)
            | (((row[2] >> bit) & 1) << 2)
            | (((row[3] >> bit) & 1) << 3)
    }
}

/// Single bit plane; 1 = foreground.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mono1Bpp;

impl TileDecoder for Mono1Bpp {
    fn row_size(&self) -> usize {
        1
    }

    fn decode_pixel(&self, row: &[u8], x: u8) -> u8 {
        match row.first() {
            Some(&bits) if x < 8 => (bits >> (7 - x)) & 1,
            _ => 0,
        }
    }
}
