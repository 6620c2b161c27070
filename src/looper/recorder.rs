use std::time::{Duration, Instant};

use crate::error::{LoopError, Result};
use crate::shared::PadKey;

use super::Note;

/// `floor(elapsed / (60000 / bpm ms)) mod total_beats`, in integer nanoseconds.
///
/// Floor rather than round: a hit at time 0 lands on beat 0 and a late hit
/// stays on the beat it was late for.
pub fn quantize(elapsed: Duration, bpm: u32, total_beats: usize) -> usize {
    let beats = elapsed.as_nanos() * u128::from(bpm) / 60_000_000_000;
    (beats % total_beats.max(1) as u128) as usize
}

#[derive(Clone, Debug)]
pub struct RecordingSession {
    started_at: Instant,
    notes: Vec<Note>,
}

impl RecordingSession {
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

#[derive(Clone, Debug, Default)]
pub struct Recorder {
    session: Option<RecordingSession>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn captured(&self) -> &[Note] {
        self.session.as_ref().map(|s| s.notes()).unwrap_or(&[])
    }

    pub fn start_session(&mut self, now: Instant) -> Result<()> {
        if self.session.is_some() {
            return Err(LoopError::AlreadyRecording);
        }
        self.session = Some(RecordingSession { started_at: now, notes: Vec::new() });
        Ok(())
    }

    /// Only meaningful while a session is active; otherwise nothing is recorded.
    pub fn capture(&mut self, key: PadKey, now: Instant, bpm: u32, total_beats: usize) -> Option<Note> {
        let session = self.session.as_mut()?;
        let elapsed = now.saturating_duration_since(session.started_at);
        let note = Note { key, beat: quantize(elapsed, bpm, total_beats) };
        session.notes.push(note);
        Some(note)
    }

    pub fn end_session(&mut self) -> Vec<Note> {
        self.session.take().map(|s| s.notes).unwrap_or_default()
    }
}
