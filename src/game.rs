//! Game session state machine.
//!
//! `Idle -> ComputerPlaying -> HumanReplaying -> ComputerPlaying -> ...` until the player
//! either misses a note or the pattern reaches the target length. Both endings pass through
//! `Stopped` and come back to `Idle` on a scheduled wakeup.

use log::{debug, info, warn};

use crate::config::GameConfig;
use crate::note::{Note, WIN_TUNE};
use crate::pattern::{NoteSource, Pattern, RandomNotes};
use crate::presenter::{Presenter, Round};
use crate::scheduler::{ManualScheduler, Scheduler, Timer, Wakeup};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Waiting for a start command.
    Idle,
    /// Playing the pattern back; player input is ignored.
    ComputerPlaying,
    /// Player reproduces the pattern.
    HumanReplaying,
    /// Win tune or failure feedback in progress; always followed by `Idle`.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Won,
    Failed,
}

/// Read-only snapshot for hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameView {
    pub phase: Phase,
    pub level: usize,
    pub levels: usize,
    pub cursor: usize,
}

/// One game session. Owns the pattern, the cursor and the phase; talks to the outside world
/// only through its scheduler and presenter.
pub struct Game<S, P, N = RandomNotes> {
    config: GameConfig,
    scheduler: S,
    presenter: P,
    notes: N,
    pattern: Pattern,
    cursor: usize,
    phase: Phase,
    outcome: Option<Outcome>,
    epoch: u32,
}

impl<S: Scheduler, P: Presenter, N: NoteSource> Game<S, P, N> {
    pub fn new(config: GameConfig, scheduler: S, presenter: P, notes: N) -> Self {
        Self {
            config,
            scheduler,
            presenter,
            notes,
            pattern: Pattern::new(),
            cursor: 0,
            phase: Phase::Idle,
            outcome: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn levels(&self) -> usize {
        self.config.levels()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn view(&self) -> GameView {
        GameView {
            phase: self.phase,
            level: self.pattern.len(),
            levels: self.levels(),
            cursor: self.cursor,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Starts a fresh game. Only valid while idle; otherwise logged and ignored.
    pub fn start_game(&mut self) {
        if self.phase != Phase::Idle {
            warn!("start_game ignored in {:?}", self.phase);
            return;
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.pattern.reset();
        self.cursor = 0;
        self.outcome = None;
        info!("new game, {} levels", self.levels());
        self.presenter.on_start();
        self.begin_round();
    }

    /// Ends the session: back to idle with an empty pattern. Wakeups already scheduled become
    /// no-ops.
    pub fn teardown(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        let was_idle = self.phase == Phase::Idle;
        self.phase = Phase::Idle;
        self.outcome = None;
        self.pattern.reset();
        self.cursor = 0;
        if !was_idle {
            debug!("session torn down mid-game");
            self.presenter.on_return_to_idle();
        }
    }

    pub fn note_press(&mut self, note: Note) {
        if self.phase != Phase::HumanReplaying {
            return;
        }
        let expected = self.pattern.at(self.cursor);
        // Advances on a miss too; clamped so a press after the last note cannot overrun.
        self.cursor = (self.cursor + 1).min(self.pattern.len());
        if expected == Some(note) {
            self.presenter.on_note_on(note);
        } else {
            self.fail(note, expected);
        }
    }

    pub fn note_release(&mut self, note: Note) {
        if self.phase != Phase::HumanReplaying {
            return;
        }
        self.presenter.on_note_off(note);
        // Any release ends the turn once the cursor is at the end, not only the last note's.
        if self.cursor == self.pattern.len() {
            debug!("round {} replayed", self.pattern.len());
            self.begin_round();
        }
    }

    /// Delivers a scheduled wakeup.
    pub fn fire(&mut self, wakeup: Wakeup) {
        if wakeup.epoch != self.epoch {
            debug!("dropping stale {:?} from epoch {}", wakeup.timer, wakeup.epoch);
            return;
        }
        match wakeup.timer {
            Timer::NoteOff(note) => self.presenter.on_note_off(note),
            Timer::PlayStep => self.play_step(),
            Timer::WinStep => self.win_step(),
            Timer::ReturnToIdle => self.return_to_idle(),
        }
    }

    fn schedule(&mut self, delay_ms: u32, timer: Timer) {
        let wakeup = Wakeup {
            epoch: self.epoch,
            timer,
        };
        self.scheduler.after(delay_ms, wakeup);
    }

    fn begin_round(&mut self) {
        self.phase = Phase::ComputerPlaying;
        self.cursor = 0;
        let round = Round {
            level: self.pattern.len(),
            levels: self.levels(),
        };
        self.presenter.on_round_begin(round);

        if round.is_final() {
            info!("pattern of {} completed, playing win tune", round.levels);
            self.phase = Phase::Stopped;
            self.outcome = Some(Outcome::Won);
            self.presenter.on_win();
            self.schedule(self.config.timing.lead_in, Timer::WinStep);
            return;
        }

        let note = self.pattern.append(&mut self.notes);
        debug!("round {}: appended {}", round.level + 1, note);
        self.schedule(self.config.timing.lead_in, Timer::PlayStep);
    }

    fn play_step(&mut self) {
        if self.phase != Phase::ComputerPlaying {
            return;
        }
        let Some(note) = self.pattern.at(self.cursor) else {
            self.phase = Phase::HumanReplaying;
            self.cursor = 0;
            debug!("player's turn, {} notes", self.pattern.len());
            return;
        };
        let timing = self.config.timing;
        self.presenter.on_note_on(note);
        self.schedule(timing.hold, Timer::NoteOff(note));
        self.cursor += 1;
        self.schedule(timing.step, Timer::PlayStep);
    }

    fn win_step(&mut self) {
        if self.phase != Phase::Stopped || self.outcome != Some(Outcome::Won) {
            return;
        }
        let timing = self.config.timing;
        match WIN_TUNE.get(self.cursor).copied() {
            Some(note) => {
                self.presenter.on_note_on(note);
                self.schedule(timing.win_hold, Timer::NoteOff(note));
                self.cursor += 1;
                self.schedule(timing.win_step, Timer::WinStep);
            }
            None => self.schedule(timing.win_outro, Timer::ReturnToIdle),
        }
    }

    fn fail(&mut self, pressed: Note, expected: Option<Note>) {
        info!(
            "wrong note {} (expected {:?}) at level {}",
            pressed,
            expected,
            self.pattern.len()
        );
        self.phase = Phase::Stopped;
        self.outcome = Some(Outcome::Failed);
        self.presenter.on_fail();
        self.schedule(self.config.timing.fail_reset, Timer::ReturnToIdle);
    }

    fn return_to_idle(&mut self) {
        if self.phase != Phase::Stopped {
            return;
        }
        self.phase = Phase::Idle;
        self.outcome = None;
        self.cursor = 0;
        self.presenter.on_return_to_idle();
    }
}

/// Headless driving with a virtual clock.
impl<P: Presenter, N: NoteSource> Game<ManualScheduler, P, N> {
    /// Moves the clock forward by `ms`, delivering every wakeup that comes due, including ones
    /// scheduled along the way.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + ms;
        while let Some(wakeup) = self.scheduler.pop_due(until) {
            self.fire(wakeup);
        }
        self.scheduler.set_now(until);
    }

    /// Delivers wakeups until none are pending, e.g. until the player's turn or idle.
    pub fn settle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            if let Some(wakeup) = self.scheduler.pop_due(due) {
                self.fire(wakeup);
            }
        }
    }
}
