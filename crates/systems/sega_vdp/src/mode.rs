//! Display mode selection from the M1-M5 register bits.

use crate::registers::Registers;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// TMS9918 Graphics I
    Graphics1,
    /// TMS9918 Text, 40 columns of 6 pixels
    Text,
    /// TMS9918 Graphics II
    Graphics2,
    /// TMS9918 Multicolor
    Multicolor,
    /// Sega mode 4
    Mode4,
    /// Mega Drive native mode, not rendered
    Mode5,
}

impl DisplayMode {
    pub fn number(self) -> u8 {
        match self {
            DisplayMode::Graphics1 => 0,
            DisplayMode::Text => 1,
            DisplayMode::Graphics2 => 2,
            DisplayMode::Multicolor => 3,
            DisplayMode::Mode4 => 4,
            DisplayMode::Mode5 => 5,
        }
    }

    /// Modes inherited from the TMS9918
    pub fn is_tms(self) -> bool {
        self.number() < 4
    }
}

/// The four legacy mode bits as laid out in registers 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeBits {
    pub m1: bool,
    pub m2: bool,
    pub m3: bool,
    pub m4: bool,
}

impl ModeBits {
    pub fn from_registers(regs: &Registers) -> Self {
        Self {
            m1: regs.m1(),
            m2: regs.m2(),
            m3: regs.m3(),
            m4: regs.m4(),
        }
    }

    /// Packed as M4 M3 M2 M1, for logging
    pub fn packed(self) -> u8 {
        (self.m4 as u8) << 3 | (self.m3 as u8) << 2 | (self.m2 as u8) << 1 | self.m1 as u8
    }
}

/// Outcome of decoding the mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Mode(DisplayMode),
    /// Combination with no defined mode; the current mode is kept
    Unknown(ModeBits),
}

/// TMS9918 table extended with mode 4.
pub fn decode_sms(regs: &Registers) -> Decoded {
    let bits = ModeBits::from_registers(regs);
    if bits.m4 {
        return Decoded::Mode(DisplayMode::Mode4);
    }
    match (bits.m1, bits.m2, bits.m3) {
        (false, false, false) => Decoded::Mode(DisplayMode::Graphics1),
        (true, false, false) => Decoded::Mode(DisplayMode::Text),
        (false, true, false) => Decoded::Mode(DisplayMode::Graphics2),
        (false, false, true) => Decoded::Mode(DisplayMode::Multicolor),
        _ => Decoded::Unknown(bits),
    }
}

/// Mega Drive: M5 picks the native mode, everything else is mode 4.
pub fn decode_mega_drive(regs: &Registers) -> Decoded {
    if regs.m5() {
        Decoded::Mode(DisplayMode::Mode5)
    } else {
        Decoded::Mode(DisplayMode::Mode4)
    }
}

/// SMS1: mode 4 is always 192 lines.
pub fn no_extended_height(_bits: ModeBits) -> Option<u16> {
    None
}

/// SMS2 and later: M2 with exactly one of M1/M3 selects a taller screen.
pub fn extended_height(bits: ModeBits) -> Option<u16> {
    if !bits.m2 {
        return None;
    }
    match (bits.m1, bits.m3) {
        (true, false) => Some(224),
        (false, true) => Some(240),
        _ => None,
    }
}
