//! Error types for the loop engine and its collaborators.

use thiserror::Error;

use crate::shared::PadKey;

pub type Result<T> = std::result::Result<T, LoopError>;

/// Broad class of a [`LoopError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A beat, index or pad outside its domain.
    InvalidRange,
    /// The operation is not allowed in the current transport/recording state.
    InvalidState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopError {
    #[error("beat {beat} is outside the loop (0..{total_beats})")]
    BeatOutOfRange { beat: usize, total_beats: usize },

    #[error("no layer at index {index} ({len} layers)")]
    LayerOutOfRange { index: usize, len: usize },

    #[error("no note at index {note} in layer {layer} ({len} notes)")]
    NoteOutOfRange { layer: usize, note: usize, len: usize },

    #[error("pad index {0} is not on the grid")]
    UnknownPad(u8),

    #[error("clock is already running")]
    ClockRunning,

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("bpm cannot change while playing or recording")]
    BpmLocked,
}

impl LoopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoopError::BeatOutOfRange { .. }
            | LoopError::LayerOutOfRange { .. }
            | LoopError::NoteOutOfRange { .. }
            | LoopError::UnknownPad(_) => ErrorKind::InvalidRange,
            LoopError::ClockRunning | LoopError::AlreadyRecording | LoopError::BpmLocked => {
                ErrorKind::InvalidState
            }
        }
    }
}

/// A sound could not be played. Always recovered locally: logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no sound loaded for pad {}", .0.index())]
    NoSound(PadKey),

    #[error("audio command queue is full")]
    QueueFull,

    #[error("audio output is gone")]
    Disconnected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("give the pack a unique name before saving (not \"{0}\")")]
    Unnamed(String),

    #[error("no saved pack named \"{0}\"")]
    UnknownPack(String),
}
