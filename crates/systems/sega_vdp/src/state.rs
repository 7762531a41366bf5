//! Save states as JSON values.
//!
//! Everything needed to resume mid-line is stored: registers, memories,
//! latches, the beam and the armed events. The framebuffer is not; it is
//! redrawn within a frame.

use crate::config::Variant;
use crate::ports::PortLatch;
use crate::registers::{Registers, VideoMemory, VRAM_SIZE};
use crate::scheduler::{Beam, EventQueue};
use crate::sprites::SpriteScratch;
use crate::status::StatusLatch;
use crate::vdp::{RasterState, Vdp};
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum VdpError {
    #[error("Invalid save state: {0}")]
    InvalidState(String),
    #[error("Save state decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    variant: Variant,
    registers: Registers,
    memory: VideoMemory,
    status: StatusLatch,
    port: PortLatch,
    raster: RasterState,
    sprites: SpriteScratch,
    beam: Beam,
    events: EventQueue,
    cycle_carry: u64,
}

impl Snapshot {
    /// Reject field values the chip can never reach on its own.
    fn check_ranges(&self) -> Result<(), VdpError> {
        let invalid = |what: &str| Err(VdpError::InvalidState(what.to_string()));
        if self.sprites.count > self.sprites.slots.len() {
            return invalid("sprite count exceeds the line limit");
        }
        if !matches!(self.sprites.height, 8 | 16) || !matches!(self.sprites.zoom_scale, 1 | 2) {
            return invalid("sprite size out of range");
        }
        // paired Game Gear writes touch mask | 1
        if (self.memory.cram_mask as usize | 1) >= self.memory.cram.len() {
            return invalid("CRAM mask exceeds CRAM");
        }
        if !matches!(self.raster.y_pixels, 192 | 224 | 240) {
            return invalid("active height out of range");
        }
        Ok(())
    }
}

impl Vdp {
    pub fn save_state(&self) -> Value {
        let snapshot = Snapshot {
            version: STATE_VERSION,
            variant: self.config.variant,
            registers: self.regs,
            memory: self.mem.clone(),
            status: self.status,
            port: self.port,
            raster: self.raster,
            sprites: self.sprites,
            beam: self.beam,
            events: self.events.clone(),
            cycle_carry: self.cycle_carry,
        };
        serde_json::to_value(snapshot).unwrap_or(Value::Null)
    }

    pub fn load_state(&mut self, state: &Value) -> Result<(), VdpError> {
        let version = state.get("version").and_then(Value::as_u64);
        if version != Some(STATE_VERSION as u64) {
            return Err(VdpError::InvalidState(format!("unsupported version {:?}", version)));
        }
        let snapshot: Snapshot = serde_json::from_value(state.clone())?;

        if snapshot.variant != self.config.variant {
            return Err(VdpError::InvalidState(format!(
                "state is for {}, this chip is {}",
                snapshot.variant.name(),
                self.config.variant.name()
            )));
        }
        if snapshot.memory.vram.len() != VRAM_SIZE || snapshot.memory.cram.len() != self.config.cram_size {
            return Err(VdpError::InvalidState("memory sizes do not match".to_string()));
        }
        if snapshot.beam.width() != self.beam.width() || snapshot.beam.height() != self.beam.height() {
            return Err(VdpError::InvalidState("raster geometry does not match".to_string()));
        }
        snapshot.check_ranges()?;

        self.regs = snapshot.registers;
        self.mem = snapshot.memory;
        self.status = snapshot.status;
        self.port = snapshot.port;
        self.raster = snapshot.raster;
        self.sprites = snapshot.sprites;
        self.beam = snapshot.beam;
        self.events = snapshot.events;
        self.cycle_carry = snapshot.cycle_carry;

        // derived state
        self.mem.cram_dirty = true;
        self.set_frame_timing();

        log(LogCategory::Video, LogLevel::Info, || {
            format!("VDP: state loaded at {}", self.position_string())
        });
        Ok(())
    }
}
