//! Common renderer trait for video chips
//!
//! A chip that produces pictures exposes its latest ARGB frame through
//! [`Renderer`]. Chips that render into an indexed buffer first (see
//! [`crate::video::IndexedBitmap`]) resolve pens to ARGB before handing
//! the frame out.
//!
//! ```rust,ignore
//! use emu_core::renderer::Renderer;
//!
//! let frame = vdp.get_frame();
//! println!("{}x{}", frame.width, frame.height);
//! ```

use crate::types::Frame;

/// Read access to a chip's output picture plus the few controls a frontend needs.
pub trait Renderer {
    /// Latest ARGB8888 frame
    fn get_frame(&self) -> &Frame;

    /// Fill the visible frame with one ARGB color
    fn clear(&mut self, color: u32);

    /// Return the renderer (and usually its chip) to power-on state
    fn reset(&mut self);

    /// Short human-readable name for status bars and logs
    fn name(&self) -> &str;

    /// Whether output is produced on the GPU
    fn is_hardware_accelerated(&self) -> bool {
        false
    }

    /// Change the output size. Fixed-geometry chips may ignore this.
    fn resize(&mut self, width: u32, height: u32);
}
