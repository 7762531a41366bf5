//! CPU-facing ports: control, data and the beam counters.

use crate::config::{DISPLAY_DISABLED_HPOS, WIDTH};
use crate::quirks::{AddressLatch, DataWrite};
use crate::vdp::Vdp;
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

/// Address mode set by the second control byte
pub const ADDRMODE_VRAM_READ: u8 = 0;
pub const ADDRMODE_VRAM_WRITE: u8 = 1;
pub const ADDRMODE_REGISTER: u8 = 2;
pub const ADDRMODE_CRAM_WRITE: u8 = 3;

/// Two-byte command state of the control port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLatch {
    /// 16 bits are kept; memory accesses use the low 14
    pub addr: u16,
    pub addrmode: u8,
    /// Read-ahead byte returned by the next data read
    pub buffer: u8,
    pub pending_control_write: bool,
    /// First control byte on chips that hold it back
    pub control_write_data_latch: u8,
}

impl Vdp {
    fn load_vram_addr(&mut self, data: u8) {
        let port = &mut self.port;
        match (self.quirks.address_latch, port.pending_control_write) {
            (AddressLatch::Passthrough, true) => port.addr = (port.addr & 0xFF00) | data as u16,
            (AddressLatch::Passthrough, false) => port.addr = ((data as u16) << 8) | (port.addr & 0x00FF),
            (AddressLatch::Latched, true) => port.control_write_data_latch = data,
            (AddressLatch::Latched, false) => {
                port.addr = ((data as u16) << 8) | port.control_write_data_latch as u16
            }
        }
    }

    /// Control port read: the status byte. Clears the flags, the line
    /// interrupt and a half-written command, and releases the IRQ line.
    pub fn control_read(&mut self) -> u8 {
        self.check_pending_flags();
        let value = self.status.take();
        self.port.pending_control_write = false;
        if self.raster.irq_state {
            self.set_irq(false);
        }
        value
    }

    pub fn control_write(&mut self, data: u8) {
        if !self.port.pending_control_write {
            self.port.pending_control_write = true;
            self.load_vram_addr(data);
            return;
        }

        self.port.pending_control_write = false;
        self.port.addrmode = (data >> 6) & 0x03;
        self.load_vram_addr(data);
        match self.port.addrmode {
            ADDRMODE_VRAM_READ => {
                self.port.buffer = self.mem.vram_read(self.port.addr);
                self.port.addr = self.port.addr.wrapping_add(1);
            }
            ADDRMODE_REGISTER => self.register_write(data),
            _ => {}
        }
    }

    fn register_write(&mut self, data: u8) {
        let reg_num = (data & self.config.reg_num_mask) as usize;
        if reg_num >= 16 {
            log(LogCategory::Ports, LogLevel::Debug, || {
                format!("VDP: write to register {:#04x} ignored", reg_num)
            });
            return;
        }

        let value = (self.port.addr & 0xFF) as u8;
        self.regs.set(reg_num, value);
        log(LogCategory::Ports, LogLevel::Trace, || {
            format!("VDP: R{} = {:#04x} at {}", reg_num, value, self.position_string())
        });

        let hpos = self.beam.hpos();
        match reg_num {
            0 => {
                self.set_display_settings();
                if self.port.addr & 0x02 != 0 {
                    log(LogCategory::Video, LogLevel::Info, || "VDP: overscan enabled".to_string());
                }
            }
            1 => {
                self.set_display_settings();
                if hpos <= DISPLAY_DISABLED_HPOS {
                    self.raster.display_disabled = !self.regs.display_enabled();
                }
            }
            8 => {
                if hpos <= self.config.line_timing.xscroll_hpos {
                    self.raster.reg8copy = value;
                }
            }
            _ => {}
        }

        self.check_pending_flags();

        let touches_irq = (reg_num == 0 && self.status.hint_occurred())
            || (reg_num == 1 && self.status.vint_visible());
        if touches_irq {
            let enabled = if reg_num == 0 {
                self.regs.line_irq_enabled()
            } else {
                self.regs.frame_irq_enabled()
            };
            if !enabled {
                if self.raster.irq_state {
                    self.set_irq(false);
                }
            } else {
                self.set_irq(true);
            }
        }
        self.port.addrmode = ADDRMODE_VRAM_READ;
    }

    /// Data port read: returns the read-ahead buffer and refills it.
    pub fn data_read(&mut self) -> u8 {
        let value = self.port.buffer;
        self.port.pending_control_write = false;
        self.port.buffer = self.mem.vram_read(self.port.addr);
        self.port.addr = self.port.addr.wrapping_add(1);
        value
    }

    pub fn data_write(&mut self, data: u8) {
        self.port.pending_control_write = false;
        match self.quirks.data_write {
            DataWrite::Legacy => {
                match self.port.addrmode {
                    ADDRMODE_CRAM_WRITE => self.cram_write(data),
                    _ => self.mem.vram_write(self.port.addr, data),
                }
                self.port.buffer = data;
            }
            DataWrite::EmbeddedMode4 => match self.port.addrmode {
                ADDRMODE_VRAM_READ | ADDRMODE_VRAM_WRITE => self.mem.vram_write(self.port.addr, data),
                _ => self.cram_write(data),
            },
        }
        self.port.addr = self.port.addr.wrapping_add(1);
    }

    /// V counter as the CPU sees it, relative to active line 0.
    pub fn vcount_read(&self) -> u8 {
        let active_start = self.frame_timing.active_start();
        let mut vpos = self.beam.vpos();
        if self.beam.hpos() < self.config.line_timing.vcount_change_hpos {
            vpos -= 1;
            if vpos < 0 {
                vpos += self.beam.height();
            }
        }
        ((vpos - active_start) & 0xFF) as u8
    }

    pub fn hcount_read(&self) -> u8 {
        self.raster.hcounter
    }

    /// Latch the H counter at the current beam position.
    pub fn hcount_latch(&mut self) {
        self.hcount_latch_at(self.beam.hpos());
    }

    /// Latch the H counter as if the beam were at `hpos`.
    pub fn hcount_latch_at(&mut self, hpos: i32) {
        let mut hclock = hpos - 1;
        if hclock < 0 {
            hclock += WIDTH;
        }
        // 46 dots of the line are spent before the counter reaches 0x00
        self.raster.hcounter = (((hclock - 46) >> 1) & 0xFF) as u8;
    }
}
