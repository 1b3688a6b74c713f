//! Deferred wakeups that drive playback and phase changes.
//!
//! The game never waits: it asks a [`Scheduler`] to hand a [`Wakeup`] back to
//! [`Game::fire`](crate::game::Game::fire) after a delay. There is no cancellation. Every
//! wakeup carries the epoch it was scheduled in and the game drops any whose epoch or phase no
//! longer applies.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::note::Note;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Play the pattern note under the cursor, or hand over to the player past the end.
    PlayStep,
    /// Play the win tune note under the cursor, or queue the return to idle past the end.
    WinStep,
    NoteOff(Note),
    ReturnToIdle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wakeup {
    pub epoch: u32,
    pub timer: Timer,
}

pub trait Scheduler {
    /// Deliver `wakeup` to the game once `delay_ms` has elapsed. Must not block.
    fn after(&mut self, delay_ms: u32, wakeup: Wakeup);
}

#[derive(Debug)]
struct Pending {
    due: u64,
    seq: u64,
    wakeup: Wakeup,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    // reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual-clock scheduler. Time only moves when the host pops wakeups; equal due times pop in
/// scheduling order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending wakeup.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|p| p.due)
    }

    /// Pops the earliest wakeup due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<Wakeup> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let next = self.queue.pop()?;
        self.now = self.now.max(next.due);
        Some(next.wakeup)
    }

    /// Moves the clock forward without delivering anything.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, delay_ms: u32, wakeup: Wakeup) {
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Pending {
            due: self.now + u64::from(delay_ms),
            seq,
            wakeup,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wake(timer: Timer) -> Wakeup {
        Wakeup { epoch: 0, timer }
    }

    #[test]
    fn shorter_delays_fire_first() {
        let mut s = ManualScheduler::new();
        s.after(500, wake(Timer::ReturnToIdle));
        s.after(200, wake(Timer::PlayStep));
        assert_eq!(s.pop_due(1_000), Some(wake(Timer::PlayStep)));
        assert_eq!(s.now(), 200);
        assert_eq!(s.pop_due(1_000), Some(wake(Timer::ReturnToIdle)));
        assert_eq!(s.now(), 500);
        assert_eq!(s.pop_due(1_000), None);
    }

    #[test]
    fn equal_delays_keep_scheduling_order() {
        let mut s = ManualScheduler::new();
        s.after(250, wake(Timer::NoteOff(Note::Up)));
        s.after(250, wake(Timer::NoteOff(Note::Down)));
        s.after(250, wake(Timer::WinStep));
        assert_eq!(s.pop_due(250).map(|w| w.timer), Some(Timer::NoteOff(Note::Up)));
        assert_eq!(s.pop_due(250).map(|w| w.timer), Some(Timer::NoteOff(Note::Down)));
        assert_eq!(s.pop_due(250).map(|w| w.timer), Some(Timer::WinStep));
    }

    #[test]
    fn nothing_pops_before_it_is_due() {
        let mut s = ManualScheduler::new();
        s.after(750, wake(Timer::PlayStep));
        assert_eq!(s.pop_due(749), None);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.next_due(), Some(750));
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut s = ManualScheduler::new();
        s.set_now(1_000);
        s.after(10, wake(Timer::PlayStep));
        assert_eq!(s.next_due(), Some(1_010));
    }
}
