//! Per-chip behavioural rules.
//!
//! Each chip revision is one row of function pointers and policy enums; the
//! shared [`crate::Vdp`] consults the row at the points where the revisions
//! disagree.

use crate::config::Variant;
use crate::mode::{self, Decoded, ModeBits};
use crate::registers::Registers;

/// How the first control byte reaches the address register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressLatch {
    /// Goes straight into the low address byte
    Passthrough,
    /// Held in a latch until the second byte arrives
    Latched,
}

/// Where data port writes go for each address mode, and whether they
/// refresh the read buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataWrite {
    /// Modes 0-2 write VRAM, mode 3 writes CRAM; buffer takes the byte
    Legacy,
    /// Modes 0-1 write VRAM, modes 2-3 write CRAM; buffer untouched
    EmbeddedMode4,
}

/// Source of the pixels left of the first whole tile column when the fine
/// horizontal scroll is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column0Fill {
    /// Entry 0 of the palette chosen by bit plane 1 of sprite 0
    Sprite0Plane1,
    /// Entry 0 of the palette chosen by the next background tile
    NextTilePalette,
}

/// Gating of sprite overflow and collision flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteChecks {
    /// Collisions are timed per pixel and masked by the column 0 blank
    Legacy,
    /// Flags only while displaying active lines, found one line early
    EmbeddedMode4,
}

/// Active picture geometry of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Full 256-pixel line
    Sms,
    /// 160x144 window unless running in SMS compatibility mode
    GameGear,
}

#[derive(Debug, Clone, Copy)]
pub struct Quirks {
    pub decode_mode: fn(&Registers) -> Decoded,
    pub extended_height: fn(ModeBits) -> Option<u16>,
    /// Offset of a background row in the name table, given the scrolled line
    pub name_table_row: fn(&Registers, i32) -> u16,
    pub sprite_attr_addr: fn(&Registers, u16) -> u16,
    pub sprite_tile_mask: fn(&Registers, u8) -> u8,
    pub address_latch: AddressLatch,
    pub data_write: DataWrite,
    pub column0: Column0Fill,
    pub sprite_checks: SpriteChecks,
    pub output: OutputPolicy,
}

/// Unused register bits act as extra address lines on the SMS1.
fn name_table_row_masked(regs: &Registers, row: i32) -> u16 {
    let mask = ((regs.get(2) as u16 & 0x01) << 10) | ((regs.get(4) as u16 & 0x03) << 11) | 0x23FF;
    (((row >> 3) << 6) as u16) & mask
}

fn name_table_row_linear(_regs: &Registers, row: i32) -> u16 {
    ((row >> 3) << 6) as u16
}

fn sprite_attr_addr_masked(regs: &Registers, base: u16) -> u16 {
    base & (((regs.get(5) as u16 & 0x01) << 7) | 0x3F7F)
}

fn sprite_attr_addr_linear(_regs: &Registers, base: u16) -> u16 {
    base
}

fn sprite_tile_masked(regs: &Registers, tile: u8) -> u8 {
    tile & (((regs.get(6) & 0x03) << 6) | 0x3F)
}

fn sprite_tile_linear(_regs: &Registers, tile: u8) -> u8 {
    tile
}

impl Quirks {
    pub fn sega315_5124() -> Self {
        Self {
            decode_mode: mode::decode_sms,
            extended_height: mode::no_extended_height,
            name_table_row: name_table_row_masked,
            sprite_attr_addr: sprite_attr_addr_masked,
            sprite_tile_mask: sprite_tile_masked,
            address_latch: AddressLatch::Passthrough,
            data_write: DataWrite::Legacy,
            column0: Column0Fill::Sprite0Plane1,
            sprite_checks: SpriteChecks::Legacy,
            output: OutputPolicy::Sms,
        }
    }

    pub fn sega315_5246() -> Self {
        Self {
            extended_height: mode::extended_height,
            name_table_row: name_table_row_linear,
            sprite_attr_addr: sprite_attr_addr_linear,
            sprite_tile_mask: sprite_tile_linear,
            ..Self::sega315_5124()
        }
    }

    pub fn sega315_5313_mode4() -> Self {
        Self {
            decode_mode: mode::decode_mega_drive,
            extended_height: mode::no_extended_height,
            address_latch: AddressLatch::Latched,
            data_write: DataWrite::EmbeddedMode4,
            column0: Column0Fill::NextTilePalette,
            sprite_checks: SpriteChecks::EmbeddedMode4,
            ..Self::sega315_5246()
        }
    }

    pub fn sega315_5377() -> Self {
        Self {
            output: OutputPolicy::GameGear,
            ..Self::sega315_5246()
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Sega315_5124 => Self::sega315_5124(),
            Variant::Sega315_5246 => Self::sega315_5246(),
            Variant::Sega315_5313Mode4 => Self::sega315_5313_mode4(),
            Variant::Sega315_5377 => Self::sega315_5377(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms1_name_table_mask() {
        let mut regs = Registers::default();
        // bit 0 of register 2 clear: row 8 of the second half is folded
        regs.set(2, 0x0E);
        let q = Quirks::sega315_5124();
        assert_eq!((q.name_table_row)(&regs, 8 * 16), 0x0000);
        regs.set(2, 0x0F);
        assert_eq!((q.name_table_row)(&regs, 8 * 16), 0x0400);
        assert_eq!((Quirks::sega315_5246().name_table_row)(&regs, 8 * 16), 0x0400);
    }

    #[test]
    fn test_sms1_sprite_masks() {
        let mut regs = Registers::default();
        let q = Quirks::sega315_5124();
        assert_eq!((q.sprite_tile_mask)(&regs, 0xFF), 0x3F);
        regs.set(6, 0x03);
        assert_eq!((q.sprite_tile_mask)(&regs, 0xFF), 0xFF);
        assert_eq!((q.sprite_attr_addr)(&regs, 0x3F80), 0x3F00);
        regs.set(5, 0x01);
        assert_eq!((q.sprite_attr_addr)(&regs, 0x3F80), 0x3F80);
    }

    #[test]
    fn test_variant_rows() {
        let md = Quirks::for_variant(Variant::Sega315_5313Mode4);
        assert_eq!(md.address_latch, AddressLatch::Latched);
        assert_eq!(md.data_write, DataWrite::EmbeddedMode4);
        assert_eq!(md.column0, Column0Fill::NextTilePalette);

        let gg = Quirks::for_variant(Variant::Sega315_5377);
        assert_eq!(gg.output, OutputPolicy::GameGear);
        assert_eq!(gg.address_latch, AddressLatch::Passthrough);
        assert_eq!((gg.sprite_tile_mask)(&Registers::default(), 0xFF), 0xFF);
    }
}
