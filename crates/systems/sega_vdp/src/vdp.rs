//! The VDP device: state, construction, reset and host-facing accessors.

use crate::config::{FrameTiming, Variant, VdpConfig, DRAW_TIME_GG, DRAW_TIME_SMS};
use crate::mode::{Decoded, DisplayMode, ModeBits};
use crate::output::Framebuffer;
use crate::palette::{game_gear_output_palette, sms_output_palette};
use crate::ports::PortLatch;
use crate::quirks::{OutputPolicy, Quirks};
use crate::registers::{Registers, VideoMemory};
use crate::scheduler::{Beam, EventQueue};
use crate::sprites::SpriteScratch;
use crate::status::StatusLatch;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::renderer::Renderer;
use emu_core::types::Frame;
use serde::{Deserialize, Serialize};

/// Output lines of the chip. Every method defaults to doing nothing, so a
/// host only implements the lines it has wired.
pub trait VdpLines {
    /// Interrupt request; `true` asserts, `false` releases
    fn irq(&mut self, _asserted: bool) {}

    /// Composite sync pulse at the start of a line
    fn csync(&mut self) {}

    /// Pause (NMI) pulse, once per frame before the active display
    fn pause(&mut self) {}
}

/// Line-scoped latches and raster bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterState {
    pub mode: DisplayMode,
    /// Active lines of the current mode: 192, 224 or 240
    pub y_pixels: u16,
    pub line_counter: u8,
    pub hcounter: u8,
    pub reg8copy: u8,
    pub reg9copy: u8,
    pub display_disabled: bool,
    pub irq_state: bool,
    pub draw_time: i32,
    /// Game Gear running SMS software
    pub compat_mode: bool,
}

pub struct Vdp {
    pub(crate) config: VdpConfig,
    pub(crate) quirks: Quirks,
    pub(crate) frame_timing: FrameTiming,
    pub(crate) regs: Registers,
    pub(crate) mem: VideoMemory,
    pub(crate) status: StatusLatch,
    pub(crate) port: PortLatch,
    pub(crate) raster: RasterState,
    pub(crate) sprites: SpriteScratch,
    pub(crate) beam: Beam,
    pub(crate) events: EventQueue,
    /// Half pixel clock left over from [`Vdp::run_cpu_cycles`]
    pub(crate) cycle_carry: u64,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) lines: Option<Box<dyn VdpLines>>,
}

impl Vdp {
    pub fn new(config: VdpConfig) -> Self {
        let quirks = Quirks::for_variant(config.variant);
        let palette = match quirks.output {
            OutputPolicy::Sms => sms_output_palette(),
            OutputPolicy::GameGear => game_gear_output_palette(),
        };
        let height = config.frame_height();
        let mut vdp = Self {
            quirks,
            frame_timing: FrameTiming::select(config.pal, 192),
            regs: Registers::power_on(),
            mem: VideoMemory::new(config.cram_size),
            status: StatusLatch::default(),
            port: PortLatch::default(),
            raster: RasterState {
                mode: DisplayMode::Graphics1,
                y_pixels: 192,
                line_counter: 0,
                hcounter: 0,
                reg8copy: 0,
                reg9copy: 0,
                display_disabled: false,
                irq_state: false,
                draw_time: config.draw_time,
                compat_mode: false,
            },
            sprites: SpriteScratch::default(),
            beam: Beam::new(crate::config::WIDTH, height),
            events: EventQueue::default(),
            cycle_carry: 0,
            framebuffer: Framebuffer::new(height, palette),
            lines: None,
            config,
        };
        vdp.reset();
        log(LogCategory::Video, LogLevel::Info, || {
            format!(
                "VDP: {} ({})",
                vdp.config.variant.name(),
                if vdp.config.pal { "PAL" } else { "NTSC" }
            )
        });
        vdp
    }

    pub fn for_variant(variant: Variant) -> Self {
        Self::new(VdpConfig::for_variant(variant))
    }

    /// Connect the host's interrupt, sync and pause lines.
    pub fn set_lines(&mut self, lines: Box<dyn VdpLines>) {
        self.lines = Some(lines);
    }

    pub fn take_lines(&mut self) -> Option<Box<dyn VdpLines>> {
        self.lines.take()
    }

    /// Power-on state. VRAM keeps its contents; the beam keeps its position.
    pub fn reset(&mut self) {
        self.regs = Registers::power_on();
        self.status = StatusLatch::default();
        self.port = PortLatch::default();
        self.raster = RasterState {
            mode: self.raster.mode,
            y_pixels: 192,
            line_counter: 0,
            hcounter: 0,
            reg8copy: 0,
            reg9copy: 0,
            display_disabled: false,
            irq_state: false,
            draw_time: self.config.draw_time,
            compat_mode: false,
        };
        self.sprites = SpriteScratch::default();
        self.cycle_carry = 0;
        self.mem.reset_palette();
        self.set_display_settings();
        self.start_timers();
    }

    /// Re-decode the display mode and height from registers 0 and 1.
    pub(crate) fn set_display_settings(&mut self) {
        self.raster.y_pixels = 192;
        let previous = self.raster.mode;
        match (self.quirks.decode_mode)(&self.regs) {
            Decoded::Mode(mode) => {
                self.raster.mode = mode;
                if mode == DisplayMode::Mode4 {
                    let bits = ModeBits::from_registers(&self.regs);
                    if let Some(height) = (self.quirks.extended_height)(bits) {
                        self.raster.y_pixels = height;
                    }
                }
                if mode == DisplayMode::Mode5 && previous != DisplayMode::Mode5 {
                    log(LogCategory::Stubs, LogLevel::Warn, || {
                        "VDP: switched to unimplemented video mode 5".to_string()
                    });
                }
            }
            Decoded::Unknown(bits) => {
                log(LogCategory::Video, LogLevel::Warn, || {
                    format!(
                        "VDP: unknown video mode (M1 = {}, M2 = {}, M3 = {}, M4 = {})",
                        bits.m1 as u8, bits.m2 as u8, bits.m3 as u8, bits.m4 as u8
                    )
                });
            }
        }
        if previous != self.raster.mode {
            log(LogCategory::Video, LogLevel::Debug, || {
                format!("VDP: mode {} -> {}", previous.number(), self.raster.mode.number())
            });
        }
        self.set_frame_timing();
        self.mem.cram_dirty = true;
    }

    pub(crate) fn set_frame_timing(&mut self) {
        self.frame_timing = FrameTiming::select(self.config.pal, self.raster.y_pixels);
    }

    pub(crate) fn set_irq(&mut self, asserted: bool) {
        log(LogCategory::Interrupts, LogLevel::Debug, || {
            format!("VDP: IRQ {}", if asserted { "asserted" } else { "cleared" })
        });
        self.raster.irq_state = asserted;
        if let Some(lines) = self.lines.as_mut() {
            lines.irq(asserted);
        }
    }

    pub(crate) fn pulse_pause(&mut self) {
        if let Some(lines) = self.lines.as_mut() {
            lines.pause();
        }
    }

    /// Game Gear only: run SMS software with the SMS CRAM layout and a
    /// full-width picture.
    pub fn set_sega315_5124_compatibility_mode(&mut self, compat: bool) {
        if self.quirks.output != OutputPolicy::GameGear {
            log(LogCategory::Stubs, LogLevel::Warn, || {
                format!("VDP: compatibility mode not available on {}", self.config.variant.name())
            });
            return;
        }
        self.raster.compat_mode = compat;
        self.mem.cram_mask = if compat { 0x1F } else { 0x3F };
        self.raster.draw_time = if compat { DRAW_TIME_SMS } else { DRAW_TIME_GG };
        self.mem.cram_dirty = true;
    }

    /// Write a register through the control port.
    pub fn write_register(&mut self, reg: u8, value: u8) {
        self.control_write(value);
        self.control_write(0x80 | reg);
    }

    /// Direct VRAM access for loaders and debuggers.
    pub fn vram_read(&self, addr: u16) -> u8 {
        self.mem.vram_read(addr)
    }

    pub fn vram_write(&mut self, addr: u16, data: u8) {
        self.mem.vram_write(addr, data);
    }

    /// Direct CRAM access for loaders and debuggers.
    pub fn write_cram(&mut self, index: u8, data: u8) {
        if let Some(entry) = self.mem.cram.get_mut(index as usize) {
            *entry = data;
            self.mem.cram_dirty = true;
        }
    }

    pub fn cram(&self) -> &[u8] {
        &self.mem.cram
    }

    pub fn config(&self) -> &VdpConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn status_latch(&self) -> &StatusLatch {
        &self.status
    }

    pub fn port_latch(&self) -> &PortLatch {
        &self.port
    }

    pub fn raster(&self) -> &RasterState {
        &self.raster
    }

    pub fn sprite_scratch(&self) -> &SpriteScratch {
        &self.sprites
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.raster.mode
    }

    pub fn frame_timing(&self) -> FrameTiming {
        self.frame_timing
    }

    pub fn irq_state(&self) -> bool {
        self.raster.irq_state
    }

    /// Palette cache, as output pens
    pub fn current_palette(&self) -> &[u16; 32] {
        &self.mem.current_palette
    }

    /// (vpos, hpos)
    pub fn beam_position(&self) -> (i32, i32) {
        (self.beam.vpos(), self.beam.hpos())
    }

    /// Pixel clocks since power-on
    pub fn dot(&self) -> u64 {
        self.beam.dot()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

impl Renderer for Vdp {
    fn get_frame(&self) -> &Frame {
        self.framebuffer.frame()
    }

    fn clear(&mut self, color: u32) {
        self.framebuffer.clear_color(color);
    }

    fn reset(&mut self) {
        self.framebuffer.clear(0);
    }

    fn name(&self) -> &str {
        self.config.variant.name()
    }

    fn resize(&mut self, width: u32, height: u32) {
        // raster geometry is fixed by the chip
        log(LogCategory::Stubs, LogLevel::Debug, || {
            format!("VDP: resize to {}x{} ignored", width, height)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    pub(crate) struct Probe {
        pub irq: Vec<bool>,
        pub csync: usize,
        pub pause: usize,
    }

    struct ProbeLines(Rc<RefCell<Probe>>);

    impl VdpLines for ProbeLines {
        fn irq(&mut self, asserted: bool) {
            self.0.borrow_mut().irq.push(asserted);
        }

        fn csync(&mut self) {
            self.0.borrow_mut().csync += 1;
        }

        fn pause(&mut self) {
            self.0.borrow_mut().pause += 1;
        }
    }

    fn probed(config: VdpConfig) -> (Vdp, Rc<RefCell<Probe>>) {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut vdp = Vdp::new(config);
        vdp.set_lines(Box::new(ProbeLines(probe.clone())));
        (vdp, probe)
    }

    #[test]
    fn test_reset_state() {
        let vdp = Vdp::new(VdpConfig::sega315_5377());
        assert_eq!(vdp.registers().get(2), 0x0E);
        assert_eq!(vdp.status_latch().status(), 0x1F);
        assert_eq!(vdp.raster().draw_time, DRAW_TIME_GG);
        assert_eq!(vdp.display_mode(), DisplayMode::Graphics1);
        assert_eq!(vdp.cram().len(), 0x40);
        assert!(!vdp.irq_state());
    }

    #[test]
    fn test_reset_keeps_vram() {
        let mut vdp = Vdp::new(VdpConfig::sega315_5246());
        vdp.vram_write(0x2000, 0x77);
        vdp.write_cram(1, 0x3F);
        vdp.write_register(7, 0x05);
        vdp.reset();
        assert_eq!(vdp.vram_read(0x2000), 0x77);
        assert_eq!(vdp.cram()[1], 0);
        assert_eq!(vdp.registers().get(7), 0);
    }

    #[test]
    fn test_extended_heights() {
        let mut vdp = Vdp::new(VdpConfig::sega315_5246());
        vdp.write_register(0, 0x06);
        vdp.write_register(1, 0x10);
        assert_eq!(vdp.raster().y_pixels, 224);
        assert_eq!(vdp.frame_timing(), FrameTiming::NTSC_224);
        vdp.write_register(1, 0x08);
        assert_eq!(vdp.raster().y_pixels, 240);

        let mut sms1 = Vdp::new(VdpConfig::sega315_5124());
        sms1.write_register(0, 0x06);
        sms1.write_register(1, 0x10);
        assert_eq!(sms1.raster().y_pixels, 192);
    }

    #[test]
    fn test_unknown_mode_keeps_previous() {
        let mut vdp = Vdp::new(VdpConfig::sega315_5124());
        vdp.write_register(0, 0x02);
        assert_eq!(vdp.display_mode(), DisplayMode::Graphics2);
        vdp.write_register(1, 0x18);
        assert_eq!(vdp.display_mode(), DisplayMode::Graphics2);
    }

    #[test]
    fn test_compat_mode_only_on_game_gear() {
        let mut gg = Vdp::new(VdpConfig::sega315_5377());
        gg.set_sega315_5124_compatibility_mode(true);
        assert!(gg.raster().compat_mode);
        assert_eq!(gg.raster().draw_time, DRAW_TIME_SMS);

        let mut sms = Vdp::new(VdpConfig::sega315_5246());
        sms.set_sega315_5124_compatibility_mode(true);
        assert!(!sms.raster().compat_mode);
    }

    #[test]
    fn test_frame_irq_reaches_lines() {
        let (mut vdp, probe) = probed(VdpConfig::sega315_5246());
        vdp.write_register(1, 0x60);
        vdp.run_frame();
        let probe = probe.borrow();
        assert_eq!(probe.irq, vec![true]);
        assert_eq!(probe.pause, 1);
        // no pulse on vsync lines 1-3 and the line after
        assert_eq!(probe.csync, 262 - 4);
    }

    #[test]
    fn test_status_read_releases_irq() {
        let (mut vdp, probe) = probed(VdpConfig::sega315_5246());
        vdp.write_register(1, 0x60);
        vdp.run_frame();
        assert!(vdp.irq_state());
        assert_eq!(vdp.control_read() & 0x80, 0x80);
        assert!(!vdp.irq_state());
        assert_eq!(probe.borrow().irq, vec![true, false]);
    }

    #[test]
    fn test_disabling_frame_irq_releases_line() {
        let (mut vdp, probe) = probed(VdpConfig::sega315_5246());
        vdp.write_register(1, 0x60);
        vdp.run_frame();
        vdp.write_register(1, 0x40);
        assert!(!vdp.irq_state());
        assert_eq!(probe.borrow().irq.last(), Some(&false));
    }

    #[test]
    fn test_renderer_trait() {
        let mut vdp = Vdp::new(VdpConfig::sega315_5124().with_pal(true));
        assert_eq!(vdp.get_frame().width, 342);
        assert_eq!(vdp.get_frame().height, 313);
        assert_eq!(Renderer::name(&vdp), "Sega 315-5124 SMS1 VDP");
        vdp.clear(0xFF00FF00);
        assert!(vdp.get_frame().pixels.iter().all(|&p| p == 0xFF00FF00));
        Renderer::reset(&mut vdp);
        assert_eq!(vdp.get_frame().pixels[0], 0xFF000000);
    }
}
