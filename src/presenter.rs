//! One-way notifications from the game to whatever draws and plays it.

use crate::note::Note;

/// Progress marker state for one level on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Marker {
    NotDone,
    Current,
    Done,
}

impl Marker {
    /// CSS class used on the timeline circle.
    pub fn class(self) -> &'static str {
        match self {
            Marker::NotDone => "notDone",
            Marker::Current => "now",
            Marker::Done => "done",
        }
    }

    pub fn radius(self) -> u8 {
        match self {
            Marker::Current => 7,
            _ => 5,
        }
    }
}

/// Round about to be played: `level` notes completed so far out of `levels`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round {
    pub level: usize,
    pub levels: usize,
}

impl Round {
    pub fn marker(&self, i: usize) -> Marker {
        if i < self.level {
            Marker::Done
        } else if i == self.level && self.level < self.levels {
            Marker::Current
        } else {
            Marker::NotDone
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = Marker> + '_ {
        (0..self.levels).map(|i| self.marker(i))
    }

    pub fn is_final(&self) -> bool {
        self.level >= self.levels
    }
}

/// Receives game notifications. Implementations must not call back into the game; input goes
/// through the input mapper instead.
pub trait Presenter {
    /// A new game started; every marker is back to not-done.
    fn on_start(&mut self) {}
    fn on_round_begin(&mut self, _round: Round) {}
    fn on_note_on(&mut self, _note: Note) {}
    fn on_note_off(&mut self, _note: Note) {}
    fn on_win(&mut self) {}
    fn on_fail(&mut self) {}
    fn on_return_to_idle(&mut self) {}
}

/// Recorded notification, as captured by the `Vec<Event>` presenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Start,
    RoundBegin(Round),
    NoteOn(Note),
    NoteOff(Note),
    Win,
    Fail,
    ReturnToIdle,
}

impl Presenter for Vec<Event> {
    fn on_start(&mut self) {
        self.push(Event::Start);
    }
    fn on_round_begin(&mut self, round: Round) {
        self.push(Event::RoundBegin(round));
    }
    fn on_note_on(&mut self, note: Note) {
        self.push(Event::NoteOn(note));
    }
    fn on_note_off(&mut self, note: Note) {
        self.push(Event::NoteOff(note));
    }
    fn on_win(&mut self) {
        self.push(Event::Win);
    }
    fn on_fail(&mut self) {
        self.push(Event::Fail);
    }
    fn on_return_to_idle(&mut self) {
        self.push(Event::ReturnToIdle);
    }
}
