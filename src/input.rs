//! Raw device events to game commands.
//!
//! Held notes are tracked per device so a key's auto-repeat, or a second press of something
//! already down, never reaches the game twice, and so focus loss can release everything.

use crate::error::Result;
use crate::note::Note;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Press(Note),
    Release(Note),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Device {
    Keyboard = 0,
    Pointer = 1,
}

#[derive(Debug, Default)]
pub struct InputMapper {
    // [device][note slot]
    held: [[bool; 4]; 2],
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, note: Note) -> bool {
        self.held.iter().any(|device| device[note.slot()])
    }

    /// `keydown`. `repeat` mirrors `KeyboardEvent.repeat`.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> Option<Command> {
        let note = Note::from_key(key)?;
        if repeat {
            return None;
        }
        self.press(Device::Keyboard, note)
    }

    pub fn key_up(&mut self, key: &str) -> Option<Command> {
        let note = Note::from_key(key)?;
        self.release(Device::Keyboard, note)
    }

    /// `keypress`: Enter or Space starts a game, but only from idle.
    pub fn key_press(&self, key: &str, idle: bool) -> Option<Command> {
        (idle && matches!(key, "Enter" | " ")).then_some(Command::Start)
    }

    pub fn pointer_down(&mut self, zone: &str) -> Result<Option<Command>> {
        let note = Note::from_zone(zone)?;
        Ok(self.press(Device::Pointer, note))
    }

    pub fn pointer_up(&mut self, zone: &str) -> Result<Option<Command>> {
        let note = Note::from_zone(zone)?;
        Ok(self.release(Device::Pointer, note))
    }

    /// Pointer left the zone while pressed; same as letting go.
    pub fn pointer_out(&mut self, zone: &str) -> Result<Option<Command>> {
        self.pointer_up(zone)
    }

    /// Window lost focus: release everything still held.
    pub fn blur(&mut self) -> Vec<Command> {
        let released = Note::ALL
            .into_iter()
            .filter(|note| self.is_held(*note))
            .map(Command::Release)
            .collect();
        self.held = Default::default();
        released
    }

    // A note counts as down while any device holds it, so the game sees one press and one
    // release however many devices are involved.
    fn press(&mut self, device: Device, note: Note) -> Option<Command> {
        let was_held = self.is_held(note);
        self.held[device as usize][note.slot()] = true;
        (!was_held).then_some(Command::Press(note))
    }

    fn release(&mut self, device: Device, note: Note) -> Option<Command> {
        let had = std::mem::take(&mut self.held[device as usize][note.slot()]);
        (had && !self.is_held(note)).then_some(Command::Release(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_presses_once() {
        let mut input = InputMapper::new();
        assert_eq!(
            input.key_down("ArrowLeft", false),
            Some(Command::Press(Note::Left))
        );
        assert_eq!(input.key_down("ArrowLeft", true), None);
        // some platforms never set `repeat`
        assert_eq!(input.key_down("ArrowLeft", false), None);
        assert_eq!(
            input.key_up("ArrowLeft"),
            Some(Command::Release(Note::Left))
        );
        assert_eq!(input.key_up("ArrowLeft"), None);
    }

    #[test]
    fn other_keys_are_not_notes() {
        let mut input = InputMapper::new();
        assert_eq!(input.key_down("a", false), None);
        assert_eq!(input.key_up("Shift"), None);
    }

    #[test]
    fn start_accelerator_only_when_idle() {
        let input = InputMapper::new();
        assert_eq!(input.key_press("Enter", true), Some(Command::Start));
        assert_eq!(input.key_press(" ", true), Some(Command::Start));
        assert_eq!(input.key_press("Enter", false), None);
        assert_eq!(input.key_press("x", true), None);
    }

    #[test]
    fn pointer_out_releases_a_held_zone() {
        let mut input = InputMapper::new();
        assert_eq!(
            input.pointer_down("b4").unwrap(),
            Some(Command::Press(Note::Right))
        );
        assert!(input.is_held(Note::Right));
        assert_eq!(
            input.pointer_out("b4").unwrap(),
            Some(Command::Release(Note::Right))
        );
        // the mouseup that follows the mouseout is swallowed
        assert_eq!(input.pointer_up("b4").unwrap(), None);
    }

    #[test]
    fn unknown_zones_are_rejected() {
        let mut input = InputMapper::new();
        assert!(input.pointer_down("b5").is_err());
        assert!(input.pointer_up("controls").is_err());
    }

    #[test]
    fn key_and_pointer_on_the_same_note_press_once() {
        let mut input = InputMapper::new();
        assert_eq!(
            input.key_down("ArrowDown", false),
            Some(Command::Press(Note::Down))
        );
        assert_eq!(input.pointer_down("b3").unwrap(), None);
        assert_eq!(input.key_up("ArrowDown"), None);
        assert_eq!(
            input.pointer_up("b3").unwrap(),
            Some(Command::Release(Note::Down))
        );
    }

    #[test]
    fn blur_releases_everything_held() {
        let mut input = InputMapper::new();
        input.key_down("ArrowUp", false);
        input.pointer_down("b3").unwrap();
        let released = input.blur();
        assert_eq!(
            released,
            vec![Command::Release(Note::Up), Command::Release(Note::Down)]
        );
        assert!(input.blur().is_empty());
        assert!(!input.is_held(Note::Up));
    }
}
