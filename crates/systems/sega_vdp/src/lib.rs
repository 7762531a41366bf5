//! Sega 315-5124 family video display processor
//!
//! One implementation covers four chips:
//!
//! - **315-5124**: SMS1 / Mark III, 192-line mode 4 only
//! - **315-5246**: SMS2, adds 224 and 240-line mode 4
//! - **315-5377**: Game Gear, 12-bit CRAM and a 160x144 window
//! - **315-5313**: the mode 4 layer of the Mega Drive VDP
//!
//! The chip owns its beam. The host feeds it time with [`Vdp::run`] or
//! [`Vdp::run_cpu_cycles`], talks to it through the port methods and
//! receives interrupts through [`VdpLines`]. Each line lands in a
//! [`Framebuffer`] of 342 pixels by 262 (NTSC) or 313 (PAL) lines,
//! borders and blanking included.
//!
//! ```rust,ignore
//! use emu_sega_vdp::{Vdp, VdpConfig};
//!
//! let mut vdp = Vdp::new(VdpConfig::sega315_5246());
//! vdp.control_write(0x60);
//! vdp.control_write(0x81);
//! vdp.run_frame();
//! let frame = vdp.framebuffer().frame();
//! ```

pub mod config;
pub mod mode;
pub mod output;
pub mod palette;
pub mod ports;
pub mod quirks;
pub mod registers;
mod render;
pub mod scheduler;
pub mod sprites;
pub mod state;
pub mod status;
mod timing;
mod vdp;

pub use config::{FrameTiming, LineTiming, Variant, VdpConfig};
pub use mode::DisplayMode;
pub use output::Framebuffer;
pub use ports::PortLatch;
pub use registers::Registers;
pub use state::VdpError;
pub use status::StatusLatch;
pub use vdp::{RasterState, Vdp, VdpLines};
