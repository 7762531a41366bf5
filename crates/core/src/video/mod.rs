//! Building blocks for tile-based video chips: palettes, indexed
//! rasters and pattern decoding.

pub mod bitmap;
pub mod palette;
pub mod tile;

pub use bitmap::IndexedBitmap;
pub use palette::{IndexedPalette, RamPalette};
pub use tile::{Mono1Bpp, Planar4Bpp, TileDecoder};
