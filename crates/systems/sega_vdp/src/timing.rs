//! Raster timing: what happens on each line and when.
//!
//! The chip keeps its own beam. [`Vdp::run`] advances it and fires every
//! event that falls due on the way, in time order.

use crate::config::{ACTIVE_X, DISPLAY_CB_HPOS, LBORDER_START, RBORDER_START};
use crate::scheduler::Timer;
use crate::vdp::Vdp;
use emu_core::logging::{log, LogCategory, LogLevel};

impl Vdp {
    /// Advance the beam by `dots` pixel clocks.
    pub fn run(&mut self, dots: u64) {
        let target = self.beam.dot() + dots;
        while let Some((timer, armed)) = self.events.next() {
            if armed.due > target {
                break;
            }
            self.events.take(timer);
            self.beam.set_dot(armed.due);
            if timer.is_periodic() {
                self.events.arm(timer, armed.due + self.beam.width() as u64, armed.param);
            }
            self.fire(timer, armed.param);
        }
        self.beam.set_dot(target);
    }

    /// Advance by CPU clocks. The pixel clock runs at 3/2 the CPU clock;
    /// the odd half dot is carried to the next call.
    pub fn run_cpu_cycles(&mut self, cycles: u64) {
        let half_dots = cycles * 3 + self.cycle_carry;
        self.cycle_carry = half_dots % 2;
        self.run(half_dots / 2);
    }

    /// Run to the start of the next frame.
    pub fn run_frame(&mut self) {
        let frame = self.beam.frame_dots();
        let into = self.beam.dot() % frame;
        self.run(frame - into);
    }

    /// Cancel every event, leaving the chip frozen until [`Vdp::start_timers`].
    pub fn stop_timers(&mut self) {
        self.events.cancel_all();
        log(LogCategory::Timing, LogLevel::Debug, || "VDP: timers stopped".to_string());
    }

    /// Drop one-shot events and arm the two per-line events at their next
    /// occurrence.
    pub fn start_timers(&mut self) {
        self.events.cancel_all();
        let line_due = self.beam.next_hpos(DISPLAY_CB_HPOS);
        let flags_due = self.beam.next_hpos(self.beam.width() - 1);
        self.events.arm(Timer::Line, line_due, 0);
        self.events.arm(Timer::Flags, flags_due, 0);
    }

    fn fire(&mut self, timer: Timer, param: i32) {
        match timer {
            Timer::Line => self.process_line(),
            Timer::Flags => self.check_pending_flags(),
            Timer::Draw => {
                self.update_palette();
                let line = self.beam.vpos() - param;
                self.draw_scanline(param, line);
            }
            Timer::LeftBorder => self.draw_left_border(param),
            Timer::RightBorder => self.draw_right_border(param),
            Timer::Hint => {
                if (self.status.pending_hint() || self.status.hint_occurred()) && self.regs.line_irq_enabled() {
                    log(LogCategory::Interrupts, LogLevel::Trace, || {
                        format!("VDP: line interrupt at {}", self.position_string())
                    });
                    self.set_irq(true);
                }
            }
            Timer::Vint => {
                if self.status.vint_raised() && self.regs.frame_irq_enabled() {
                    log(LogCategory::Interrupts, LogLevel::Trace, || {
                        format!("VDP: frame interrupt at {}", self.position_string())
                    });
                    self.set_irq(true);
                }
            }
            Timer::Nmi => self.pulse_pause(),
        }
    }

    fn arm_on_line(&mut self, timer: Timer, vpos: i32, hpos: i32, param: i32) {
        let due = self.beam.next_pos(vpos, hpos);
        self.events.arm(timer, due, param);
    }

    fn reload_line_counter(&mut self) {
        self.raster.line_counter = self.regs.line_counter_reload();
    }

    /// Count down one line; on underflow reload and schedule the line
    /// interrupt for this line.
    fn tick_line_counter(&mut self, vpos: i32) {
        if self.raster.line_counter == 0 {
            self.reload_line_counter();
            self.arm_on_line(Timer::Hint, vpos, self.config.line_timing.hint_hpos, 0);
            self.status.raise_hint();
        } else {
            self.raster.line_counter -= 1;
        }
    }

    /// Schedule the border fills, evaluate sprites and schedule the draw
    /// for a visible line. `active_start` is the screen line of line 0.
    fn schedule_visible_line(&mut self, vpos: i32, active_start: i32) {
        self.arm_on_line(Timer::LeftBorder, vpos, LBORDER_START, vpos);
        self.arm_on_line(Timer::RightBorder, vpos, RBORDER_START, vpos);
        self.select_sprites(vpos - active_start);
        self.arm_on_line(Timer::Draw, vpos, self.raster.draw_time, active_start);
    }

    /// Per-line work at [`DISPLAY_CB_HPOS`].
    pub(crate) fn process_line(&mut self) {
        let vpos = self.beam.vpos();
        let ft = self.frame_timing;

        // values latched for the rest of the line
        self.raster.display_disabled = !self.regs.display_enabled();
        self.raster.reg8copy = self.regs.get(8);

        // /CSYNC carries no HSYNC pulse in the vsync lines and the one after
        if vpos == 0 || vpos > ft.vsync as i32 + 1 {
            if let Some(lines) = self.lines.as_mut() {
                lines.csync();
            }
        }

        let mut limit = ft.total() - ft.bottom_blanking as i32;
        if vpos >= limit {
            self.reload_line_counter();
            return;
        }

        limit -= ft.bottom_border as i32;
        if vpos >= limit {
            // The first border line still counts like an active line
            if vpos == limit {
                self.tick_line_counter(vpos);
            } else {
                self.reload_line_counter();
            }
            // VINT is raised at the end of the first logical border line
            if vpos == limit + 1 {
                self.arm_on_line(Timer::Vint, vpos, self.config.line_timing.vint_hpos, 0);
                self.status.raise_vint();
                log(LogCategory::Timing, LogLevel::Trace, || format!("VDP: VINT pending, line {}", vpos));
            }
            // drawn through the regular path so sprites collide on the border
            self.schedule_visible_line(vpos, limit - ft.active as i32);
            return;
        }

        limit -= ft.active as i32;
        if vpos >= limit {
            if vpos == limit {
                self.raster.reg9copy = self.regs.get(9);
            }
            self.tick_line_counter(vpos);
            self.schedule_visible_line(vpos, limit);
            return;
        }

        limit -= ft.top_border as i32;
        if vpos >= limit {
            self.reload_line_counter();
            let active_start = limit + ft.top_border as i32;
            if vpos == active_start - 1 {
                self.arm_on_line(Timer::Nmi, vpos, self.config.line_timing.nmi_hpos, 0);
            }
            self.schedule_visible_line(vpos, active_start);
            return;
        }

        self.reload_line_counter();
    }

    /// Commit pending flags as of the current beam position.
    pub(crate) fn check_pending_flags(&mut self) {
        self.check_pending_flags_at(self.beam.hpos());
    }

    pub(crate) fn check_pending_flags_at(&mut self, hpos: i32) {
        let timing = self.config.line_timing;
        self.status.commit(hpos, &timing);
    }

    pub(crate) fn position_string(&self) -> String {
        format!("v{} h{}", self.beam.vpos(), self.beam.hpos())
    }
}
