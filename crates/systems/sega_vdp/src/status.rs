//! Status register and the pending-flag pipeline.
//!
//! Flags are raised into a pending copy first and only become visible in
//! the status byte once the beam reaches the hpos at which the hardware
//! latches them.

use crate::config::LineTiming;
use serde::{Deserialize, Serialize};

pub const STATUS_VINT: u8 = 0x80;
pub const STATUS_SPROVR: u8 = 0x40;
pub const STATUS_SPRCOL: u8 = 0x20;
/// The three flag bits; the low five bits carry the fifth-sprite index
pub const STATUS_FLAGS: u8 = STATUS_VINT | STATUS_SPROVR | STATUS_SPRCOL;
/// Value of both status bytes after reset or a status read
pub const STATUS_IDLE: u8 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLatch {
    status: u8,
    pending: u8,
    pending_sprcol_x: i32,
    pending_hint: bool,
    hint_occurred: bool,
}

impl Default for StatusLatch {
    fn default() -> Self {
        Self {
            status: STATUS_IDLE,
            pending: STATUS_IDLE,
            pending_sprcol_x: 0,
            pending_hint: false,
            hint_occurred: false,
        }
    }
}

impl StatusLatch {
    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn pending(&self) -> u8 {
        self.pending
    }

    pub fn pending_hint(&self) -> bool {
        self.pending_hint
    }

    pub fn hint_occurred(&self) -> bool {
        self.hint_occurred
    }

    /// VINT visible or about to become visible
    pub fn vint_raised(&self) -> bool {
        (self.pending | self.status) & STATUS_VINT != 0
    }

    pub fn vint_visible(&self) -> bool {
        self.status & STATUS_VINT != 0
    }

    pub fn raise_vint(&mut self) {
        self.pending |= STATUS_VINT;
    }

    pub fn raise_hint(&mut self) {
        self.pending_hint = true;
    }

    /// Record an extra sprite on the line. `index` is the sprite's position
    /// in the attribute table (its byte offset in the legacy modes).
    pub fn raise_overflow(&mut self, index: i32) {
        let bits = if index < 14 { (index + 1) / 2 } else { index / 2 };
        self.pending |= STATUS_SPROVR;
        self.pending &= (bits as u8) | STATUS_FLAGS;
    }

    /// Record a sprite collision that becomes visible at `hpos`.
    pub fn raise_collision(&mut self, hpos: i32) {
        self.pending |= STATUS_SPRCOL;
        self.pending_sprcol_x = hpos;
    }

    /// Move every pending flag whose latch point has been reached into the
    /// status byte.
    pub fn commit(&mut self, hpos: i32, timing: &LineTiming) {
        if self.pending_hint && hpos >= timing.hint_hpos {
            self.pending_hint = false;
            self.hint_occurred = true;
        }
        if self.pending & STATUS_VINT != 0 && hpos >= timing.vint_flag_hpos {
            self.status |= STATUS_VINT;
            self.pending &= !STATUS_VINT;
        }
        if self.pending & STATUS_SPROVR != 0 && hpos >= timing.sprovr_hpos {
            self.status |= STATUS_SPROVR;
            self.status &= self.pending | STATUS_FLAGS;
            self.pending |= STATUS_IDLE;
            self.pending &= !STATUS_SPROVR;
        }
        if self.pending & STATUS_SPRCOL != 0 && hpos >= self.pending_sprcol_x {
            self.status |= STATUS_SPRCOL;
            self.pending_sprcol_x = 0;
            self.pending &= !STATUS_SPRCOL;
        }
    }

    /// Status read: return the byte and clear the flags and line interrupt.
    pub fn take(&mut self) -> u8 {
        let value = self.status;
        self.hint_occurred = false;
        self.status = STATUS_IDLE;
        value
    }
}
