//! Crate error type. Gameplay mismatches are not errors; these only cover input that must be
//! rejected before it reaches the game core.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum Error {
    #[error("note {0} is outside 1..=4")]
    InvalidNote(u8),
    #[error("unknown note zone '{0}'")]
    UnknownZone(String),
    #[error("invalid difficulty preference '{0}'")]
    InvalidDifficulty(String),
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] getrandom::Error),
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
