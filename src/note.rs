use std::fmt;

use crate::error::{Error, Result};

/// One of the four playable positions. The discriminant is the identifier used by the page
/// (`b1`..`b4` zones, `a1`..`a4` audio cues).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Note {
    Up = 1,
    Left = 2,
    Down = 3,
    Right = 4,
}

/// Tune played once the pattern reaches the target length.
pub const WIN_TUNE: [Note; 7] = [
    Note::Right,
    Note::Down,
    Note::Left,
    Note::Up,
    Note::Left,
    Note::Down,
    Note::Right,
];

impl Note {
    pub const ALL: [Note; 4] = [Note::Up, Note::Left, Note::Down, Note::Right];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Zero-based slot, handy for per-note tables.
    pub fn slot(self) -> usize {
        self as usize - 1
    }

    /// Maps a directional key name (`KeyboardEvent.key`) to its note.
    pub fn from_key(key: &str) -> Option<Note> {
        match key {
            "ArrowUp" => Some(Note::Up),
            "ArrowLeft" => Some(Note::Left),
            "ArrowDown" => Some(Note::Down),
            "ArrowRight" => Some(Note::Right),
            _ => None,
        }
    }

    /// Parses a pointer zone id such as `b3`.
    pub fn from_zone(zone: &str) -> Result<Note> {
        zone.strip_prefix('b')
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(|n| Note::try_from(n).ok())
            .ok_or_else(|| Error::UnknownZone(zone.to_string()))
    }

    pub fn zone_id(self) -> String {
        format!("b{}", self.id())
    }

    pub fn audio_id(self) -> String {
        format!("a{}", self.id())
    }
}

impl TryFrom<u8> for Note {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Note::Up),
            2 => Ok(Note::Left),
            3 => Ok(Note::Down),
            4 => Ok(Note::Right),
            other => Err(Error::InvalidNote(other)),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
