//! Frame-level timing as seen from the CPU side.

use emu_sega_vdp::status::{STATUS_SPROVR, STATUS_VINT};
use emu_sega_vdp::{FrameTiming, Vdp, VdpConfig, VdpLines};
use std::cell::RefCell;
use std::rc::Rc;

const WIDTH: u64 = 342;

#[derive(Default)]
struct Recorder {
    irq: Vec<bool>,
    pause: usize,
}

struct RecorderLines(Rc<RefCell<Recorder>>);

impl VdpLines for RecorderLines {
    fn irq(&mut self, asserted: bool) {
        self.0.borrow_mut().irq.push(asserted);
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pause += 1;
    }
}

fn recorded(config: VdpConfig) -> (Vdp, Rc<RefCell<Recorder>>) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut vdp = Vdp::new(config);
    vdp.set_lines(Box::new(RecorderLines(recorder.clone())));
    (vdp, recorder)
}

#[test]
fn test_vint_once_per_frame() {
    let (mut vdp, recorder) = recorded(VdpConfig::sega315_5246());
    vdp.write_register(1, 0x60);
    for _ in 0..3 {
        vdp.run_frame();
        assert!(vdp.irq_state());
        assert_ne!(vdp.control_read() & STATUS_VINT, 0);
        assert_eq!(vdp.control_read() & STATUS_VINT, 0);
    }
    let recorder = recorder.borrow();
    assert_eq!(recorder.irq, vec![true, false, true, false, true, false]);
    assert_eq!(recorder.pause, 3);
}

#[test]
fn test_vint_position() {
    let config = VdpConfig::sega315_5246();
    let vint_hpos = config.line_timing.vint_hpos as u64;
    let timing = FrameTiming::NTSC_192;
    let vint_line = (timing.bottom_border_start() + 1) as u64;

    let mut vdp = Vdp::new(config);
    vdp.write_register(1, 0x60);
    vdp.run(vint_line * WIDTH + vint_hpos - 1);
    assert!(!vdp.irq_state());
    assert_eq!(vdp.control_read() & STATUS_VINT, 0);

    vdp.run(1);
    assert!(vdp.irq_state());
    assert_eq!(vdp.vcount_read(), 0xC1);
    assert_ne!(vdp.control_read() & STATUS_VINT, 0);
}

#[test]
fn test_vint_flag_without_irq_enable() {
    let (mut vdp, recorder) = recorded(VdpConfig::sega315_5124());
    vdp.write_register(1, 0x40);
    vdp.run_frame();
    assert!(!vdp.irq_state());
    assert!(recorder.borrow().irq.is_empty());
    assert_ne!(vdp.control_read() & STATUS_VINT, 0);
}

#[test]
fn test_enabling_irq_with_flag_set_asserts() {
    let (mut vdp, recorder) = recorded(VdpConfig::sega315_5124());
    vdp.write_register(1, 0x40);
    vdp.run_frame();
    vdp.write_register(1, 0x60);
    assert!(vdp.irq_state());
    assert_eq!(recorder.borrow().irq, vec![true]);
}

#[test]
fn test_line_interrupt_every_reload_plus_one() {
    let (mut vdp, recorder) = recorded(VdpConfig::sega315_5246());
    vdp.write_register(0, 0x10);
    vdp.write_register(1, 0x40);
    vdp.write_register(10, 9);

    let active_start = FrameTiming::NTSC_192.active_start();
    let mut hit_lines = Vec::new();
    for vpos in 0..262 {
        vdp.run(WIDTH);
        if vdp.irq_state() {
            hit_lines.push(vpos - active_start);
            vdp.control_read();
        }
    }

    let expected: Vec<i32> = (0..19).map(|k| 9 + 10 * k).collect();
    assert_eq!(hit_lines, expected);
    assert_eq!(recorder.borrow().irq.len(), 2 * expected.len());
}

#[test]
fn test_line_counter_disabled_irq_stays_low() {
    let mut vdp = Vdp::new(VdpConfig::sega315_5246());
    vdp.write_register(1, 0x40);
    vdp.write_register(10, 0);
    vdp.run_frame();
    assert!(!vdp.irq_state());
}

#[test]
fn test_sprite_overflow_reported() {
    let mut vdp = Vdp::new(VdpConfig::sega315_5246());
    vdp.write_register(0, 0x04);
    vdp.write_register(1, 0x40);
    vdp.write_register(5, 0xFF);
    for i in 0..9u16 {
        vdp.vram_write(0x3F00 + i, 10);
        vdp.vram_write(0x3F80 + i * 2, (i * 16) as u8);
    }
    vdp.vram_write(0x3F09, 0xD0);

    let active_start = FrameTiming::NTSC_192.active_start() as u64;
    vdp.run((active_start + 30) * WIDTH);
    assert_eq!(vdp.control_read(), STATUS_SPROVR | 0x04);
    // read clears the flags
    assert_eq!(vdp.control_read(), 0x1F);
}

#[test]
fn test_pal_frame_length() {
    let mut vdp = Vdp::new(VdpConfig::sega315_5246().with_pal(true));
    vdp.run_frame();
    assert_eq!(vdp.dot(), 342 * 313);
    assert_eq!(vdp.frame_timing(), FrameTiming::PAL_192);
    assert_eq!(vdp.framebuffer().frame().height, 313);
}

#[test]
fn test_cpu_clock_frame() {
    let mut vdp = Vdp::new(VdpConfig::sega315_5124());
    // 228 CPU clocks per line
    vdp.run_cpu_cycles(228 * 262);
    assert_eq!(vdp.beam_position(), (0, 0));
}

#[test]
fn test_line_interrupt_at_hint_hpos() {
    let config = VdpConfig::sega315_5246();
    let hint_hpos = config.line_timing.hint_hpos as u64;
    let mut vdp = Vdp::new(config);
    vdp.write_register(0, 0x10);
    vdp.write_register(1, 0x40);
    vdp.write_register(10, 9);

    // counter reloads to 9 above the active area and underflows on active line 9
    let underflow_line = FrameTiming::NTSC_192.active_start() as u64 + 9;
    vdp.run(underflow_line * WIDTH + hint_hpos - 1);
    assert!(!vdp.irq_state());
    vdp.run(1);
    assert!(vdp.irq_state());
    assert_eq!(vdp.beam_position(), (underflow_line as i32, hint_hpos as i32));
}

#[test]
fn test_sprite_overflow_commits_at_sprovr_hpos() {
    let config = VdpConfig::sega315_5246();
    let sprovr_hpos = config.line_timing.sprovr_hpos as u64;
    let mut vdp = Vdp::new(config);
    vdp.write_register(0, 0x04);
    vdp.write_register(1, 0x40);
    vdp.write_register(5, 0xFF);
    for i in 0..9u16 {
        vdp.vram_write(0x3F00 + i, 10);
        vdp.vram_write(0x3F80 + i * 2, (i * 16) as u8);
    }
    vdp.vram_write(0x3F09, 0xD0);

    // y = 10 first shows on active line 11, selected at the start of that line
    let first_line = FrameTiming::NTSC_192.active_start() as u64 + 11;
    vdp.run(first_line * WIDTH + sprovr_hpos - 1);
    assert_ne!(vdp.status_latch().pending() & STATUS_SPROVR, 0);
    assert_eq!(vdp.control_read(), 0x1F);

    vdp.run(1);
    assert_eq!(vdp.control_read(), STATUS_SPROVR | 0x04);
}
