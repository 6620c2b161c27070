// The input plan. Letters are bound here in the TUI only; the engine sees PadKey.
//
// Pads (3 rows of 4):
//   q w e r       //  Pad(0) ... Pad(3)
//   a s d f       //  Pad(4) ... Pad(7)
//   z x c v       //  Pad(8) ... Pad(11)
//   Shift + pad   //  ClearSlot(pad) on the sample/custom packs
//
// Transport:
//   Space         //  TogglePlay
//   b             //  ToggleRecord
//   - / =         //  AdjustBpm(-1 / +1)
//   _ / +         //  AdjustBpm(-10 / +10)
//   p             //  NextPack
//
// Timeline:
//   Up / Down     //  SelectLayer(-1 / +1)
//   Left / Right  //  SelectNote(-1 / +1)
//   [ / ]         //  NudgeNote(-1 / +1)
//   { / }         //  NudgeNote(-BEATS_PER_BAR / +BEATS_PER_BAR)
//   Backspace     //  DeleteNote
//   Delete        //  DeleteLayer
//   0             //  ClearAll
//
// Packs:
//   k             //  SavePack
//   l             //  LoadNextSavedPack
//   K             //  DeleteSavedPack (the one currently loaded)
//
//   Esc           //  Quit
//
// Middle owns all sequencer state; the TUI only renders the DisplayState it hands out.

use serde::{Deserialize, Serialize};

use crate::error::LoopError;
use crate::looper::{Layer, Note};

pub const BARS: usize = 16;
pub const BEATS_PER_BAR: usize = 4;
pub const TOTAL_BEATS: usize = BARS * BEATS_PER_BAR;

pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 200;
pub const DEFAULT_BPM: u32 = 120;

pub const PAD_COLS: usize = 4;
pub const PAD_ROWS: usize = 3;
pub const NUM_PADS: usize = PAD_COLS * PAD_ROWS;

/// One pad of the grid. Indices run row-major, `0..NUM_PADS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PadKey(u8);

impl PadKey {
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUM_PADS).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / PAD_COLS
    }

    pub fn col(self) -> usize {
        self.index() % PAD_COLS
    }

    pub fn all() -> impl Iterator<Item = PadKey> {
        (0..NUM_PADS as u8).map(PadKey)
    }
}

impl TryFrom<u8> for PadKey {
    type Error = LoopError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        PadKey::new(index).ok_or(LoopError::UnknownPad(index))
    }
}

impl From<PadKey> for u8 {
    fn from(key: PadKey) -> u8 {
        key.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Pad(PadKey),
    ClearSlot(PadKey),

    TogglePlay,
    ToggleRecord,
    AdjustBpm(i32),
    NextPack,

    SelectLayer(i32),
    SelectNote(i32),
    NudgeNote(i32),
    DeleteNote,
    DeleteLayer,
    ClearAll,

    SavePack,
    LoadNextSavedPack,
    DeleteSavedPack,

    Quit,
}

/// Everything the TUI needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    pub playing: bool,
    pub recording: bool,
    pub bpm: u32,
    pub current_beat: usize,
    pub pack_label: String,
    pub pad_labels: Vec<String>,
    pub layers: Vec<Layer>,
    pub in_progress: Vec<Note>,
    pub selected_layer: Option<usize>,
    pub selected_note: Option<usize>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_domain_is_twelve_keys() {
        assert_eq!(PadKey::all().count(), 12);
        assert!(PadKey::new(11).is_some());
        assert!(PadKey::new(12).is_none());
        assert_eq!(PadKey::try_from(40), Err(LoopError::UnknownPad(40)));
    }

    #[test]
    fn pad_rows_and_cols() {
        let key = PadKey::new(6).unwrap();
        assert_eq!((key.row(), key.col()), (1, 2));
    }

    #[test]
    fn pad_serializes_as_index_and_rejects_unknown() {
        let key = PadKey::new(3).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "3");
        assert_eq!(serde_json::from_str::<PadKey>("3").unwrap(), key);
        assert!(serde_json::from_str::<PadKey>("99").is_err());
    }
}
