//! Beam position and the chip's timed events.
//!
//! Time is counted in pixel clocks ("dots") since power-on. Each kind of
//! event owns one slot; arming a slot again replaces whatever it held,
//! so a one-shot can never fire twice for the same arming.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timer {
    /// Per-line bookkeeping, every line at a fixed hpos
    Line,
    /// End-of-line flag commit, every line at the last hpos
    Flags,
    Draw,
    LeftBorder,
    RightBorder,
    Hint,
    Vint,
    Nmi,
}

impl Timer {
    pub const ALL: [Timer; 8] = [
        Timer::Line,
        Timer::Flags,
        Timer::Draw,
        Timer::LeftBorder,
        Timer::RightBorder,
        Timer::Hint,
        Timer::Vint,
        Timer::Nmi,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn is_periodic(self) -> bool {
        matches!(self, Timer::Line | Timer::Flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armed {
    pub due: u64,
    pub param: i32,
    seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQueue {
    slots: [Option<Armed>; 8],
    seq: u64,
}

impl EventQueue {
    pub fn arm(&mut self, timer: Timer, due: u64, param: i32) {
        self.seq += 1;
        self.slots[timer.slot()] = Some(Armed {
            due,
            param,
            seq: self.seq,
        });
    }

    pub fn cancel(&mut self, timer: Timer) {
        self.slots[timer.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; 8];
    }

    pub fn armed(&self, timer: Timer) -> Option<Armed> {
        self.slots[timer.slot()]
    }

    /// Earliest armed event; ties go to the one armed first.
    pub fn next(&self) -> Option<(Timer, Armed)> {
        Timer::ALL
            .iter()
            .filter_map(|&t| self.slots[t.slot()].map(|a| (t, a)))
            .min_by_key(|(_, a)| (a.due, a.seq))
    }

    pub fn take(&mut self, timer: Timer) -> Option<Armed> {
        self.slots[timer.slot()].take()
    }
}

/// Raster position derived from the dot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beam {
    dot: u64,
    width: u32,
    height: u32,
}

impl Beam {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            dot: 0,
            width: width as u32,
            height: height as u32,
        }
    }

    pub fn dot(&self) -> u64 {
        self.dot
    }

    pub fn set_dot(&mut self, dot: u64) {
        self.dot = dot;
    }

    pub fn width(&self) -> i32 {
        self.width as i32
    }

    pub fn height(&self) -> i32 {
        self.height as i32
    }

    pub fn frame_dots(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn hpos(&self) -> i32 {
        (self.dot % self.width as u64) as i32
    }

    pub fn vpos(&self) -> i32 {
        ((self.dot / self.width as u64) % self.height as u64) as i32
    }

    pub fn frame_number(&self) -> u64 {
        self.dot / self.frame_dots()
    }

    /// Dots until the beam next reaches (vpos, hpos). The current position
    /// counts as a full frame away.
    pub fn time_until_pos(&self, vpos: i32, hpos: i32) -> u64 {
        let frame = self.frame_dots();
        let target = (vpos.rem_euclid(self.height as i32) as u64) * self.width as u64
            + hpos.rem_euclid(self.width as i32) as u64;
        let now = self.dot % frame;
        if target > now {
            target - now
        } else {
            frame - now + target
        }
    }

    /// Absolute dot of the next (vpos, hpos)
    pub fn next_pos(&self, vpos: i32, hpos: i32) -> u64 {
        self.dot + self.time_until_pos(vpos, hpos)
    }

    /// Absolute dot of the next time the beam is at `hpos` on any line.
    pub fn next_hpos(&self, hpos: i32) -> u64 {
        let width = self.width as u64;
        let hpos = hpos.rem_euclid(self.width as i32) as u64;
        let now = self.dot % width;
        if hpos > now {
            self.dot + hpos - now
        } else {
            self.dot + width - now + hpos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_position() {
        let mut beam = Beam::new(342, 262);
        beam.set_dot(342 * 10 + 5);
        assert_eq!(beam.vpos(), 10);
        assert_eq!(beam.hpos(), 5);
        beam.set_dot(342 * 262 + 1);
        assert_eq!(beam.vpos(), 0);
        assert_eq!(beam.frame_number(), 1);
    }

    #[test]
    fn test_time_until_pos_wraps_a_frame() {
        let mut beam = Beam::new(342, 262);
        beam.set_dot(342 * 10 + 24);
        assert_eq!(beam.time_until_pos(10, 26), 2);
        assert_eq!(beam.time_until_pos(10, 24), 342 * 262);
        assert_eq!(beam.time_until_pos(11, 0), 342 - 24);
        assert_eq!(beam.time_until_pos(0, 0), 342 * 252 - 24);
    }

    #[test]
    fn test_next_hpos() {
        let mut beam = Beam::new(342, 262);
        beam.set_dot(342 * 3 + 2);
        assert_eq!(beam.next_hpos(341), 342 * 3 + 341);
        assert_eq!(beam.next_hpos(2), 342 * 4 + 2);
    }

    #[test]
    fn test_queue_orders_by_time_then_arming() {
        let mut queue = EventQueue::default();
        queue.arm(Timer::Draw, 50, 43);
        queue.arm(Timer::Hint, 20, 0);
        queue.arm(Timer::Vint, 20, 0);
        let (timer, armed) = queue.next().unwrap();
        assert_eq!(timer, Timer::Hint);
        assert_eq!(armed.due, 20);
        queue.take(Timer::Hint);
        assert_eq!(queue.next().unwrap().0, Timer::Vint);
    }

    #[test]
    fn test_rearm_replaces() {
        let mut queue = EventQueue::default();
        queue.arm(Timer::Nmi, 100, 0);
        queue.arm(Timer::Nmi, 30, 1);
        assert_eq!(queue.armed(Timer::Nmi).unwrap().param, 1);
        queue.take(Timer::Nmi);
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_cancel_all() {
        let mut queue = EventQueue::default();
        for t in Timer::ALL {
            queue.arm(t, 5, 0);
        }
        queue.cancel(Timer::Line);
        assert!(queue.armed(Timer::Line).is_none());
        queue.cancel_all();
        assert!(queue.next().is_none());
        assert!(Timer::Flags.is_periodic());
        assert!(!Timer::Draw.is_periodic());
    }
}
