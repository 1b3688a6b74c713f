//! Pattern store and note generation.

use crate::error::Result;
use crate::note::Note;

/// Supplies the next note appended to the pattern.
pub trait NoteSource {
    fn next_note(&mut self) -> Note;
}

/// xorshift64 generator seeded once from entropy. Notes come from the top two bits of each
/// draw, so every note is equally likely and repeats are allowed.
#[derive(Clone, Debug)]
pub struct RandomNotes {
    state: u64,
}

impl RandomNotes {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Seeds from `crypto.getRandomValues` in the browser, the OS elsewhere.
    pub fn from_entropy() -> Result<Self> {
        let mut seed = [0u8; 8];
        getrandom::getrandom(&mut seed)?;
        Ok(Self::with_seed(u64::from_le_bytes(seed)))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl NoteSource for RandomNotes {
    fn next_note(&mut self) -> Note {
        Note::ALL[(self.next_u64() >> 62) as usize]
    }
}

/// The growing sequence the player must reproduce. Only grows, except on `reset`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    notes: Vec<Note>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.notes.clear();
    }

    /// Draws one note from `source`, appends it and returns it.
    pub fn append(&mut self, source: &mut dyn NoteSource) -> Note {
        let note = source.next_note();
        self.notes.push(note);
        note
    }

    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Note at `i`, or `None` past the end.
    pub fn at(&self, i: usize) -> Option<Note> {
        self.notes.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.notes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_past_the_end_is_none() {
        let mut p = Pattern::new();
        assert_eq!(p.at(0), None);
        p.push(Note::Down);
        assert_eq!(p.at(0), Some(Note::Down));
        assert_eq!(p.at(1), None);
    }

    #[test]
    fn append_grows_by_one_and_reset_clears() {
        let mut p = Pattern::new();
        let mut rng = RandomNotes::with_seed(7);
        for expected_len in 1..=10 {
            let note = p.append(&mut rng);
            assert_eq!(p.len(), expected_len);
            assert_eq!(p.at(expected_len - 1), Some(note));
        }
        p.reset();
        assert!(p.is_empty());
    }

    #[test]
    fn seeded_generators_repeat_their_sequence() {
        let mut a = RandomNotes::with_seed(42);
        let mut b = RandomNotes::with_seed(42);
        for _ in 0..64 {
            assert_eq!(a.next_note(), b.next_note());
        }
    }

    #[test]
    fn zero_seed_still_produces_notes() {
        let mut rng = RandomNotes::with_seed(0);
        let first: Vec<Note> = (0..16).map(|_| rng.next_note()).collect();
        assert!(Note::ALL.iter().any(|n| first.contains(n)));
    }

    #[test]
    fn notes_are_roughly_uniform() {
        let mut rng = RandomNotes::with_seed(0x5EED_CAFE);
        let mut counts = [0usize; 4];
        let draws = 8_000;
        for _ in 0..draws {
            counts[rng.next_note().slot()] += 1;
        }
        // Expected 2000 each; 300 is well over six standard deviations.
        for (slot, count) in counts.iter().enumerate() {
            assert!(
                (1_700..=2_300).contains(count),
                "note {} drawn {} times out of {}",
                slot + 1,
                count,
                draws
            );
        }
    }
}
