//! The loop engine: beat clock, recorder, layer store and playback, tied
//! together by [`Looper`].
//!
//! Everything runs on the caller's thread. The host loop calls
//! [`Looper::poll`] once per frame; key presses go through
//! [`Looper::trigger`]. Sounds leave through a [`SoundDispatch`] and are never
//! waited on.

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dispatch::SoundDispatch;
use crate::error::{LoopError, Result};
use crate::shared::{BARS, BEATS_PER_BAR, DEFAULT_BPM, MAX_BPM, MIN_BPM, PadKey};

pub mod clock;
pub mod layers;
pub mod playback;
pub mod recorder;

pub use clock::{Clock, beat_interval};
pub use layers::LayerStore;
pub use playback::{PlayMode, PlaybackEngine};
pub use recorder::{Recorder, RecordingSession, quantize};

pub fn clamp_bpm(bpm: u32) -> u32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub key: PadKey,
    pub beat: usize,
}

/// One recording pass, in the order the notes were played.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer {
    notes: Vec<Note>,
}

impl Layer {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopSettings {
    bars: usize,
    beats_per_bar: usize,
    bpm: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self { bars: BARS, beats_per_bar: BEATS_PER_BAR, bpm: DEFAULT_BPM }
    }
}

impl LoopSettings {
    pub fn with_bpm(bpm: u32) -> Self {
        Self { bpm: clamp_bpm(bpm), ..Self::default() }
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    pub fn beats_per_bar(&self) -> usize {
        self.beats_per_bar
    }

    pub fn total_beats(&self) -> usize {
        self.bars * self.beats_per_bar
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn beat_interval(&self) -> Duration {
        beat_interval(self.bpm)
    }
}

/// What gets persisted: structure only (pad + beat), never audio.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSet {
    pub bpm: u32,
    pub layers: Vec<Layer>,
}

#[derive(Debug)]
pub struct Looper {
    settings: LoopSettings,
    store: LayerStore,
    recorder: Recorder,
    playback: PlaybackEngine,
}

impl Default for Looper {
    fn default() -> Self {
        Self::new(LoopSettings::default())
    }
}

impl Looper {
    pub fn new(settings: LoopSettings) -> Self {
        Self {
            settings,
            store: LayerStore::new(settings.total_beats()),
            recorder: Recorder::new(),
            playback: PlaybackEngine::new(),
        }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn bpm(&self) -> u32 {
        self.settings.bpm
    }

    pub fn layers(&self) -> &LayerStore {
        &self.store
    }

    pub fn captured(&self) -> &[Note] {
        self.recorder.captured()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_running()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    pub fn current_beat(&self) -> usize {
        self.playback.current_beat()
    }

    pub fn play_mode(&self) -> Option<PlayMode> {
        self.playback.mode()
    }

    /// Clamps into [MIN_BPM, MAX_BPM] and returns what was applied.
    pub fn set_bpm(&mut self, bpm: u32) -> Result<u32> {
        if self.is_playing() || self.is_recording() {
            return Err(LoopError::BpmLocked);
        }
        self.settings.bpm = clamp_bpm(bpm);
        Ok(self.settings.bpm)
    }

    pub fn play(&mut self, now: Instant) -> Result<()> {
        self.playback.play(&self.settings, now)
    }

    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Record-triggered playback counts as stopped here: toggling it keeps the
    /// loop going after the recording instead of cutting it off.
    pub fn toggle_playback(&mut self, now: Instant) -> Result<()> {
        if matches!(self.play_mode(), Some(PlayMode::Requested)) {
            self.stop();
            Ok(())
        } else {
            self.play(now)
        }
    }

    /// With the loop already playing the session is anchored to the start of
    /// the current pass, so captured beats line up with what is being heard.
    /// Otherwise the clock starts now and stops again at the wrap after the
    /// recording ends.
    pub fn start_recording(&mut self, now: Instant) -> Result<()> {
        if self.recorder.is_active() {
            return Err(LoopError::AlreadyRecording);
        }
        let anchor = match self.playback.cycle_start() {
            Some(cycle_start) => {
                self.playback.recording_started();
                cycle_start
            }
            None => {
                self.playback.start_for_recording(&self.settings, now)?;
                now
            }
        };
        self.recorder.start_session(anchor)?;
        debug!("recording started (layer {})", self.store.len());
        Ok(())
    }

    /// Returns the index of the new layer, if anything was captured.
    pub fn stop_recording(&mut self) -> Option<usize> {
        if !self.recorder.is_active() {
            return None;
        }
        let notes = self.recorder.end_session();
        self.playback.recording_finished();
        if notes.is_empty() {
            debug!("recording ended with nothing captured");
            return None;
        }
        match self.store.append_layer(Layer::new(notes)) {
            Ok(index) => {
                debug!("recorded layer {index}");
                Some(index)
            }
            Err(e) => {
                warn!("dropping recorded layer: {e}");
                None
            }
        }
    }

    pub fn toggle_recording(&mut self, now: Instant) -> Result<Option<usize>> {
        if self.is_recording() {
            Ok(self.stop_recording())
        } else {
            self.start_recording(now).map(|()| None)
        }
    }

    /// A live pad press: plays the sound and, while recording, captures it.
    pub fn trigger(&mut self, key: PadKey, now: Instant, dispatch: &mut dyn SoundDispatch) -> Option<Note> {
        if let Err(e) = dispatch.trigger(key) {
            warn!("pad {}: {e}", key.index());
        }
        self.recorder
            .capture(key, now, self.settings.bpm, self.settings.total_beats())
    }

    /// Fires every tick that has come due. Returns how many fired.
    pub fn poll(&mut self, now: Instant, dispatch: &mut dyn SoundDispatch) -> usize {
        self.playback.poll(now, &self.store, dispatch)
    }

    pub fn append_layer(&mut self, layer: Layer) -> Result<usize> {
        self.store.append_layer(layer)
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<Layer> {
        self.store.delete_layer(index)
    }

    pub fn move_note(&mut self, layer: usize, note: usize, new_beat: usize) -> Result<()> {
        self.store.move_note(layer, note, new_beat)
    }

    pub fn delete_note(&mut self, layer: usize, note: usize) -> Result<Note> {
        self.store.delete_note(layer, note)
    }

    /// Empties every layer, drops any recording in progress and stops playback.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.recorder.end_session();
        self.playback.stop();
        debug!("cleared all layers");
    }

    pub fn snapshot(&self) -> LayerSet {
        LayerSet { bpm: self.settings.bpm, layers: self.store.layers().to_vec() }
    }

    /// Replaces all layers and the tempo. Nothing changes if any note is outside the loop.
    pub fn restore(&mut self, set: LayerSet) -> Result<()> {
        if self.is_playing() || self.is_recording() {
            return Err(LoopError::BpmLocked);
        }
        let mut store = LayerStore::new(self.settings.total_beats());
        for layer in set.layers {
            store.append_layer(layer)?;
        }
        self.store = store;
        self.settings.bpm = clamp_bpm(set.bpm);
        Ok(())
    }
}
