//! Construction-time parameters for the VDP family.
//!
//! The four chips share one implementation; what differs between them is
//! captured here (sizes, timing tables) and in [`crate::quirks::Quirks`]
//! (behavioural rules).

use serde::{Deserialize, Serialize};

/// Pixels per scanline, blanking and sync included
pub const WIDTH: i32 = 342;
/// Lines per NTSC frame
pub const HEIGHT_NTSC: i32 = 262;
/// Lines per PAL frame
pub const HEIGHT_PAL: i32 = 313;

/// First pixel of the left border in the output bitmap
pub const LBORDER_START: i32 = 1 + 2 + 14 + 8;
pub const LBORDER_WIDTH: i32 = 13;
pub const RBORDER_WIDTH: i32 = 15;
/// First pixel of the 256-pixel active area in the output bitmap
pub const ACTIVE_X: i32 = LBORDER_START + LBORDER_WIDTH;
/// First pixel of the right border in the output bitmap
pub const RBORDER_START: i32 = ACTIVE_X + 256;

/// Latest hpos at which a register 1 write still changes the current line's
/// display enable.
pub const DISPLAY_DISABLED_HPOS: i32 = 24;
/// hpos of the per-line processing event. Must stay early: the line
/// counter reload timing depends on it.
pub const DISPLAY_CB_HPOS: i32 = 2;

/// hpos where the active line is drawn, Game Gear window (9 + 2 + 14 + 8 + 13 + 96 / 2)
pub const DRAW_TIME_GG: i32 = 94;
/// hpos where the active line is drawn, full SMS picture (9 + 2 + 14 + 8 + 13)
pub const DRAW_TIME_SMS: i32 = 46;

pub const CRAM_SIZE_SMS: usize = 0x20;
pub const CRAM_SIZE_GG: usize = 0x40;

/// Line counts of the six vertical regions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub vsync: u8,
    pub top_blanking: u8,
    pub top_border: u8,
    pub active: u8,
    pub bottom_border: u8,
    pub bottom_blanking: u8,
}

impl FrameTiming {
    const fn new(t: [u8; 6]) -> Self {
        Self {
            vsync: t[0],
            top_blanking: t[1],
            top_border: t[2],
            active: t[3],
            bottom_border: t[4],
            bottom_blanking: t[5],
        }
    }

    pub const NTSC_192: Self = Self::new([3, 13, 27, 192, 24, 3]);
    pub const NTSC_224: Self = Self::new([3, 13, 11, 224, 8, 3]);
    /// Does not work on real NTSC hardware
    pub const NTSC_240: Self = Self::new([3, 13, 3, 240, 0, 3]);
    pub const PAL_192: Self = Self::new([3, 13, 54, 192, 48, 3]);
    pub const PAL_224: Self = Self::new([3, 13, 38, 224, 32, 3]);
    pub const PAL_240: Self = Self::new([3, 13, 30, 240, 24, 3]);

    /// Profile for a region and active height. Unknown heights fall back to 192.
    pub fn select(pal: bool, active_height: u16) -> Self {
        match (pal, active_height) {
            (false, 224) => Self::NTSC_224,
            (false, 240) => Self::NTSC_240,
            (false, _) => Self::NTSC_192,
            (true, 224) => Self::PAL_224,
            (true, 240) => Self::PAL_240,
            (true, _) => Self::PAL_192,
        }
    }

    /// Screen line of active line 0
    pub fn active_start(&self) -> i32 {
        self.vsync as i32 + self.top_blanking as i32 + self.top_border as i32
    }

    /// First bottom-border line
    pub fn bottom_border_start(&self) -> i32 {
        self.active_start() + self.active as i32
    }

    pub fn total(&self) -> i32 {
        self.bottom_border_start() + self.bottom_border as i32 + self.bottom_blanking as i32
    }
}

/// Horizontal positions at which the chip latches or signals events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTiming {
    pub vint_hpos: i32,
    pub vint_flag_hpos: i32,
    pub hint_hpos: i32,
    /// Not verified on hardware
    pub nmi_hpos: i32,
    pub xscroll_hpos: i32,
    pub vcount_change_hpos: i32,
    pub sprovr_hpos: i32,
    pub sprcol_base_hpos: i32,
}

impl LineTiming {
    const fn new(t: [i32; 8]) -> Self {
        Self {
            vint_hpos: t[0],
            vint_flag_hpos: t[1],
            hint_hpos: t[2],
            nmi_hpos: t[3],
            xscroll_hpos: t[4],
            vcount_change_hpos: t[5],
            sprovr_hpos: t[6],
            sprcol_base_hpos: t[7],
        }
    }

    pub const SMS: Self = Self::new([24, 24, 26, 28, 21, 23, 24, 59]);
    pub const GAME_GEAR: Self = Self::new([26, 26, 27, 28, 24, 28, 26, 62]);
    pub const MEGA_DRIVE: Self = Self::new([26, 26, 27, 28, 25, 28, 26, 62]);
}

/// Chip revisions sharing this implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// SMS1 / Mark III VDP
    Sega315_5124,
    /// SMS2 VDP, adds 224/240-line mode 4
    Sega315_5246,
    /// Mode 4 compatibility of the Mega Drive VDP
    Sega315_5313Mode4,
    /// Game Gear VDP
    Sega315_5377,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Sega315_5124 => "Sega 315-5124 SMS1 VDP",
            Variant::Sega315_5246 => "Sega 315-5246 SMS2 VDP",
            Variant::Sega315_5313Mode4 => "Sega 315-5313 mode 4 VDP",
            Variant::Sega315_5377 => "Sega 315-5377 Gamegear VDP",
        }
    }
}

/// Everything fixed when the chip is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdpConfig {
    pub variant: Variant,
    pub pal: bool,
    pub cram_size: usize,
    /// Added to pen numbers in modes 0-3
    pub palette_offset: u8,
    /// Bits of the second control byte that select a register
    pub reg_num_mask: u8,
    /// Sprite slots up to and including this index are zoomed horizontally
    pub max_sprite_zoom_hcount: i32,
    /// Sprite slots up to and including this count are zoomed vertically
    pub max_sprite_zoom_vcount: i32,
    pub line_timing: LineTiming,
    /// Draw hpos applied on reset
    pub draw_time: i32,
}

impl VdpConfig {
    pub fn sega315_5124() -> Self {
        Self {
            variant: Variant::Sega315_5124,
            pal: false,
            cram_size: CRAM_SIZE_SMS,
            palette_offset: 0x00,
            reg_num_mask: 0x0F,
            max_sprite_zoom_hcount: 4,
            max_sprite_zoom_vcount: 8,
            line_timing: LineTiming::SMS,
            draw_time: DRAW_TIME_SMS,
        }
    }

    pub fn sega315_5246() -> Self {
        Self {
            variant: Variant::Sega315_5246,
            max_sprite_zoom_hcount: 8,
            ..Self::sega315_5124()
        }
    }

    pub fn sega315_5313_mode4() -> Self {
        Self {
            variant: Variant::Sega315_5313Mode4,
            reg_num_mask: 0x1F,
            line_timing: LineTiming::MEGA_DRIVE,
            ..Self::sega315_5246()
        }
    }

    pub fn sega315_5377() -> Self {
        Self {
            variant: Variant::Sega315_5377,
            cram_size: CRAM_SIZE_GG,
            palette_offset: 0x10,
            line_timing: LineTiming::GAME_GEAR,
            draw_time: DRAW_TIME_GG,
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

    pub fn with_pal(mut self, pal: bool) -> Self {
        self.pal = pal;
        self
    }

    pub fn frame_height(&self) -> i32 {
        if self.pal {
            HEIGHT_PAL
        } else {
            HEIGHT_NTSC
        }
    }
}

impl Default for VdpConfig {
    fn default() -> Self {
        Self::sega315_5246()
    }
}
